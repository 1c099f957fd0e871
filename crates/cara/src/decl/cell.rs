// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Two-phase declaration storage.
//!
//! A cell is created *declared* (name, id, template names) and becomes
//! *finished* exactly once, when its body is set. Callbacks queued while
//! the cell is declared run right after the body is published.

use crate::{Error, Result};
use parking_lot::Mutex;
use std::sync::OnceLock;

/// Declaration id, unique within the enclosing scope.
pub type DeclId = u64;

type Waiter = Box<dyn FnOnce() + Send>;

pub(crate) struct DeclCell<B> {
    name: String,
    id: DeclId,
    templates: Vec<String>,
    body: OnceLock<B>,
    /// `None` once the body has been published.
    waiting: Mutex<Option<Vec<Waiter>>>,
}

impl<B> DeclCell<B> {
    pub(crate) fn new(name: String, id: DeclId, templates: Vec<String>) -> Self {
        Self {
            name,
            id,
            templates,
            body: OnceLock::new(),
            waiting: Mutex::new(Some(Vec::new())),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn id(&self) -> DeclId {
        self.id
    }

    pub(crate) fn templates(&self) -> &[String] {
        &self.templates
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.body.get().is_some()
    }

    pub(crate) fn body(&self) -> Result<&B> {
        self.body
            .get()
            .ok_or_else(|| Error::NotFinished(self.name.clone()))
    }

    /// Publish the body and run every queued callback.
    pub(crate) fn publish(&self, body: B) -> Result<()> {
        if self.body.set(body).is_err() {
            return Err(Error::AlreadyFinished(self.name.clone()));
        }
        let queued = self.waiting.lock().take().unwrap_or_default();
        if !queued.is_empty() {
            log::debug!(
                "[decl] {} finished, running {} deferred callback(s)",
                self.name,
                queued.len()
            );
        }
        for callback in queued {
            callback();
        }
        Ok(())
    }

    /// Run `callback` once the body is published (immediately if it already is).
    pub(crate) fn when_finished(&self, callback: Waiter) {
        let mut waiting = self.waiting.lock();
        match waiting.as_mut() {
            Some(queue) => queue.push(callback),
            None => {
                drop(waiting);
                callback();
            }
        }
    }
}
