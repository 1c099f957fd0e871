// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{specialization_name, Generic, Substitution, TemplateParam};
use crate::decl::{InterfaceDecl, StructDecl};
use crate::schema::Schema;
use crate::types::Type;
use crate::Result;
use dashmap::DashMap;

/// Specializations by (generic, arguments).
///
/// Entries are never evicted: callers rely on `G[X]` being the same
/// declaration handle every time it is requested.
#[derive(Default)]
pub struct SpecializationCache {
    entries: DashMap<(Generic, Vec<Type>), Type>,
}

impl SpecializationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached specialization of `generic` at `args`, created on first use.
    ///
    /// The copy is declared and cached before its body is built, and the
    /// map guard is released first, so a body that refers back to the same
    /// specialization finds the cached copy. When `generic` is not finished
    /// yet the body is built once it is.
    pub fn get_or_create(
        &self,
        schema: &Schema,
        generic: &Generic,
        args: Vec<Type>,
    ) -> Result<Type> {
        let key = (generic.clone(), args);
        if let Some(hit) = self.entries.get(&key) {
            log::trace!("[generics] cache hit for {}", hit.value());
            return Ok(hit.value().clone());
        }

        let mut created = false;
        let copy = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| {
                created = true;
                declare_copy(generic, &key.1)
            })
            .value()
            .clone();
        if !created {
            return Ok(copy);
        }
        log::debug!("[generics] specializing {}", copy);

        let bindings: Vec<(Type, Type)> = key
            .1
            .iter()
            .enumerate()
            .map(|(index, ty)| {
                (
                    Type::Param(TemplateParam {
                        owner: generic.clone(),
                        index,
                    }),
                    ty.clone(),
                )
            })
            .collect();

        if generic.is_finished() {
            let finished = Substitution::new(schema, bindings).finish_copy(generic, &copy);
            if let Err(e) = finished {
                self.entries.remove(&key);
                return Err(e);
            }
        } else {
            log::debug!(
                "[generics] {} not finished yet, deferring {}",
                generic.name(),
                copy
            );
            let schema = schema.clone();
            let source = generic.clone();
            let target = copy.clone();
            generic.when_finished(move || {
                if let Err(e) = Substitution::new(&schema, bindings).finish_copy(&source, &target) {
                    log::warn!("[generics] failed to finish {}: {}", target, e);
                }
            });
        }
        Ok(copy)
    }
}

fn declare_copy(generic: &Generic, args: &[Type]) -> Type {
    let name = specialization_name(generic, args);
    match generic {
        Generic::Struct(g) => Type::Struct(StructDecl::declare(name, g.id())),
        Generic::Interface(g) => Type::Interface(InterfaceDecl::declare(name, g.id())),
    }
}
