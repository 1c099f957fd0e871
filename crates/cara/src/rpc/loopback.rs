// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process channel joining two endpoints.
//!
//! Values are marshalled exactly as they would be for a byte codec:
//! encoded with the sender's translation table, decoded with the
//! receiver's. Nothing is shared by reference across the link except what
//! the exposed-object tables hand out.

use super::codec::TranslationTable;
use super::{Call, Channel, ChannelRef, Endpoint, PeerId};
use crate::interface::{Arguments, Function};
use crate::value::Value;
use crate::{Error, Result};
use std::sync::{Arc, OnceLock, Weak};

/// One direction of an in-process link: calls go from `local` to `remote`.
pub struct LoopbackChannel {
    local: Arc<Endpoint>,
    remote: Arc<Endpoint>,
    local_table: TranslationTable,
    remote_table: TranslationTable,
    this: Weak<LoopbackChannel>,
    reverse: OnceLock<Weak<LoopbackChannel>>,
}

impl LoopbackChannel {
    /// Link `a` and `b`; returns the `a -> b` and `b -> a` channels.
    ///
    /// Both halves must be kept alive for callbacks to flow.
    pub fn pair(a: &Arc<Endpoint>, b: &Arc<Endpoint>) -> (Arc<Self>, Arc<Self>) {
        let forward = Self::half(a, b);
        let backward = Self::half(b, a);
        let _ = forward.reverse.set(Arc::downgrade(&backward));
        let _ = backward.reverse.set(Arc::downgrade(&forward));
        log::debug!(
            "[loopback] linked peer {} <-> peer {}",
            a.peer_id(),
            b.peer_id()
        );
        (forward, backward)
    }

    fn half(local: &Arc<Endpoint>, remote: &Arc<Endpoint>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            local: Arc::clone(local),
            remote: Arc::clone(remote),
            local_table: local.translation_table(),
            remote_table: remote.translation_table(),
            this: this.clone(),
            reverse: OnceLock::new(),
        })
    }

    pub fn local(&self) -> &Arc<Endpoint> {
        &self.local
    }

    pub fn remote(&self) -> &Arc<Endpoint> {
        &self.remote
    }

    fn this_ref(&self) -> Result<ChannelRef> {
        let this: Arc<Self> = self
            .this
            .upgrade()
            .ok_or_else(|| Error::channel("loopback channel dropped"))?;
        Ok(this as ChannelRef)
    }

    fn reverse_ref(&self) -> Result<ChannelRef> {
        let reverse: Arc<Self> = self
            .reverse
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| Error::channel("loopback peer link closed"))?;
        Ok(reverse as ChannelRef)
    }

    /// Carry `args` to the remote endpoint, run `handler` there, carry the
    /// result back.
    fn deliver<F>(&self, args: Arguments, handler: F) -> Result<Value>
    where
        F: FnOnce(&Endpoint, Arguments) -> Result<Value>,
    {
        let back = self.reverse_ref()?;
        let to = self.remote.peer_id();
        let positional = args
            .positional
            .into_iter()
            .map(|v| transfer(&self.local_table, &self.remote_table, v, to, &back))
            .collect::<Result<Vec<_>>>()?;
        let mut named = std::collections::BTreeMap::new();
        for (name, v) in args.named {
            named.insert(name, transfer(&self.local_table, &self.remote_table, v, to, &back)?);
        }

        log::debug!(
            "[loopback] peer {} -> peer {} ({} args)",
            self.local.peer_id(),
            to,
            positional.len() + named.len()
        );
        let result = handler(&self.remote, Arguments { positional, named })?;
        self.carry_back(result)
    }

    fn carry_back(&self, result: Value) -> Result<Value> {
        let via = self.this_ref()?;
        let to = self.local.peer_id();
        if let Value::Pending(deferred) = result {
            let from = self.remote_table.clone();
            let into = self.local_table.clone();
            return Ok(Value::Pending(
                deferred.map_ok(move |resolved| transfer(&from, &into, resolved, to, &via)),
            ));
        }
        transfer(&self.remote_table, &self.local_table, result, to, &via)
    }
}

/// Encode on one side, decode on the other.
fn transfer(
    from: &TranslationTable,
    into: &TranslationTable,
    value: Value,
    recipient: PeerId,
    via: &ChannelRef,
) -> Result<Value> {
    let wire = from.encode_value(value, recipient)?;
    into.decode_value(wire, via)
}

impl Channel for LoopbackChannel {
    fn send(&self, call: Call) -> Result<Value> {
        let Call {
            target,
            interface_id,
            method_id,
            args,
            kwargs,
        } = call;
        self.deliver(
            Arguments {
                positional: args,
                named: kwargs,
            },
            move |endpoint, args| {
                endpoint.handle_call(Call {
                    target,
                    interface_id,
                    method_id,
                    args: args.positional,
                    kwargs: args.named,
                })
            },
        )
    }

    fn register_callable(&self, name: &str, function: Function) {
        self.local.register_callable(name, function);
    }

    fn invoke(&self, name: &str, args: Arguments) -> Result<Value> {
        self.deliver(args, |endpoint, args| endpoint.invoke_local(name, args))
    }
}
