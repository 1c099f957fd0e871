// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-resolution deferred results.
//!
//! A [`Deferred`] is the pending side of a value produced later (usually a
//! remote call result). It resolves exactly once through its
//! [`Completer`]; continuations registered with [`Deferred::on_done`] run
//! on whichever thread completes it. `map_ok` chains a conversion without
//! blocking, which is how pending values flow through field assignment and
//! result packing.
//!
//! A `Deferred` is also a [`Future`], so async callers can simply `.await` it.

use crate::{Error, Result};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

type Callback<T> = Box<dyn FnOnce(Result<T>) + Send>;

enum Slot<T> {
    Pending {
        callbacks: Vec<Callback<T>>,
        wakers: Vec<Waker>,
    },
    Done(Result<T>),
}

/// A value that becomes available later.
pub struct Deferred<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

/// Resolves the paired [`Deferred`]. Dropping it unresolved fails the deferred.
pub struct Completer<T: Clone + Send + 'static> {
    slot: Option<Arc<Mutex<Slot<T>>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone + Send + 'static> Deferred<T> {
    /// Create an unresolved deferred and its completer.
    pub fn pending() -> (Self, Completer<T>) {
        let slot = Arc::new(Mutex::new(Slot::Pending {
            callbacks: Vec::new(),
            wakers: Vec::new(),
        }));
        (
            Self {
                slot: Arc::clone(&slot),
            },
            Completer { slot: Some(slot) },
        )
    }

    pub fn resolved(value: T) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Done(Ok(value)))),
        }
    }

    pub fn failed(error: Error) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::Done(Err(error)))),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Done(_))
    }

    /// The outcome, if already known.
    pub fn try_get(&self) -> Option<Result<T>> {
        match &*self.slot.lock() {
            Slot::Done(result) => Some(result.clone()),
            Slot::Pending { .. } => None,
        }
    }

    /// Run `callback` with the outcome, immediately if already resolved.
    pub fn on_done<F>(&self, callback: F)
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        let mut slot = self.slot.lock();
        match &mut *slot {
            Slot::Pending { callbacks, .. } => callbacks.push(Box::new(callback)),
            Slot::Done(result) => {
                let result = result.clone();
                drop(slot);
                callback(result);
            }
        }
    }

    /// Chain a fallible transformation; failures pass through untouched.
    pub fn map_ok<U, F>(&self, transform: F) -> Deferred<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let (mapped, completer) = Deferred::pending();
        self.on_done(move |result| completer.complete(result.and_then(transform)));
        mapped
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.slot) as *const () as usize
    }
}

impl<T: Clone + Send + 'static> Completer<T> {
    pub fn resolve(self, value: T) {
        self.complete(Ok(value));
    }

    pub fn fail(self, error: Error) {
        self.complete(Err(error));
    }

    pub fn complete(mut self, result: Result<T>) {
        if let Some(slot) = self.slot.take() {
            settle(&slot, result);
        }
    }
}

impl<T: Clone + Send + 'static> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            log::warn!("[deferred] completer dropped before resolving");
            settle(&slot, Err(Error::channel("deferred result abandoned")));
        }
    }
}

fn settle<T: Clone>(slot: &Mutex<Slot<T>>, result: Result<T>) {
    let (callbacks, wakers) = {
        let mut guard = slot.lock();
        match std::mem::replace(&mut *guard, Slot::Done(result.clone())) {
            Slot::Pending { callbacks, wakers } => (callbacks, wakers),
            done @ Slot::Done(_) => {
                *guard = done;
                return;
            }
        }
    };
    for callback in callbacks {
        callback(result.clone());
    }
    for waker in wakers {
        waker.wake();
    }
}

impl<T: Clone + Send + 'static> Future for Deferred<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.lock();
        match &mut *slot {
            Slot::Done(result) => Poll::Ready(result.clone()),
            Slot::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.slot.lock() {
            Slot::Pending { .. } => "pending",
            Slot::Done(Ok(_)) => "resolved",
            Slot::Done(Err(_)) => "failed",
        };
        write!(f, "Deferred({})", state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_resolve_runs_callbacks_once() {
        let (deferred, completer) = Deferred::<u32>::pending();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        deferred.on_done(move |r| {
            assert_eq!(r, Ok(7));
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!deferred.is_done());
        completer.resolve(7);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(deferred.try_get(), Some(Ok(7)));
    }

    #[test]
    fn test_on_done_after_resolution_runs_immediately() {
        let deferred = Deferred::resolved(3u8);
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        deferred.on_done(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_map_ok_chains_and_propagates_failure() {
        let (deferred, completer) = Deferred::<i64>::pending();
        let doubled = deferred.map_ok(|v| Ok(v * 2));
        let rejected = deferred.map_ok(|_| -> Result<i64> { Err(Error::raised("nope")) });
        completer.resolve(21);
        assert_eq!(doubled.try_get(), Some(Ok(42)));
        assert_eq!(rejected.try_get(), Some(Err(Error::raised("nope"))));

        let failed = Deferred::<i64>::failed(Error::channel("down"));
        let mapped = failed.map_ok(|v| Ok(v + 1));
        assert_eq!(mapped.try_get(), Some(Err(Error::channel("down"))));
    }

    #[test]
    fn test_dropped_completer_fails() {
        let (deferred, completer) = Deferred::<u32>::pending();
        drop(completer);
        assert!(matches!(deferred.try_get(), Some(Err(Error::Channel(_)))));
    }

    #[tokio::test]
    async fn test_await_pending_value() {
        let (deferred, completer) = Deferred::<String>::pending();
        let waiter = tokio::spawn(deferred.clone());
        tokio::task::yield_now().await;
        completer.resolve("done".to_string());
        let result = waiter.await.expect("join");
        assert_eq!(result, Ok("done".to_string()));
    }
}
