// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! A party on the channel graph and its exposed-object table.

use super::codec::{TranslationTable, WireRef};
use super::{Call, ChannelRef, ObjectId, PeerId, RemoteDescriptor};
use crate::config::RuntimeConfig;
use crate::decl::{DeclId, MethodKey};
use crate::interface::{Arguments, Function, InterfaceValue};
use crate::value::Value;
use crate::{Error, Result};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What makes two exposed values the same capability.
///
/// Remote handles are matched by `(owner, remote id)`: each decode of a
/// wire reference builds a new handle for the same object.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Identity {
    Local(usize),
    Remote(PeerId, ObjectId),
}

impl Identity {
    fn of(value: &InterfaceValue) -> Self {
        match value.remote_handle() {
            Some(handle) => Self::Remote(handle.owner, handle.remote_id),
            None => Self::Local(value.identity()),
        }
    }
}

/// Local objects that have crossed the boundary, by id.
///
/// The same object (same identity, same interface) always gets the same
/// id, so capabilities handed out twice stay one capability.
pub struct ExposedObjects {
    by_id: DashMap<ObjectId, InterfaceValue>,
    by_identity: DashMap<(Identity, DeclId), ObjectId>,
    next_id: AtomicU64,
}

impl ExposedObjects {
    pub fn new(first_id: ObjectId) -> Self {
        Self {
            by_id: DashMap::new(),
            by_identity: DashMap::new(),
            next_id: AtomicU64::new(first_id),
        }
    }

    /// Id of `value`, assigned on first exposure.
    pub fn expose(&self, value: &InterfaceValue) -> ObjectId {
        let key = (Identity::of(value), value.decl().id());
        if let Some(id) = self.by_identity.get(&key) {
            return *id;
        }
        *self.by_identity.entry(key).or_insert_with(|| {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            self.by_id.insert(id, value.clone());
            log::debug!("[rpc] exposed {} as object {}", value, id);
            id
        })
    }

    pub fn get(&self, id: ObjectId) -> Result<InterfaceValue> {
        self.by_id
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::UnknownObject(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// One party: exposed objects plus named plain-RPC callables.
pub struct Endpoint {
    peer: PeerId,
    local_tag: u8,
    remote_tag: u8,
    exposed: ExposedObjects,
    callables: DashMap<String, Function>,
}

impl Endpoint {
    pub fn new(peer: PeerId, config: &RuntimeConfig) -> Arc<Self> {
        Arc::new(Self {
            peer,
            local_tag: config.local_interface_tag,
            remote_tag: config.remote_interface_tag,
            exposed: ExposedObjects::new(config.first_object_id),
            callables: DashMap::new(),
        })
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer
    }

    pub fn exposed_objects(&self) -> &ExposedObjects {
        &self.exposed
    }

    pub fn expose(&self, value: &InterfaceValue) -> ObjectId {
        self.exposed.expose(value)
    }

    pub fn exposed(&self, id: ObjectId) -> Result<InterfaceValue> {
        self.exposed.get(id)
    }

    /// Run an incoming call against the exposed object it targets.
    pub fn handle_call(&self, call: Call) -> Result<Value> {
        let target = self.exposed(call.target)?;
        log::debug!(
            "[rpc] peer {} handling object={} interface={:#x} method={}",
            self.peer,
            call.target,
            call.interface_id,
            call.method_id
        );
        target.call(
            MethodKey::Qualified {
                interface: call.interface_id,
                method: call.method_id,
            },
            Arguments {
                positional: call.args,
                named: call.kwargs,
            },
        )
    }

    /// Offer `function` under `name`; a later registration replaces an earlier one.
    pub fn register_callable(&self, name: &str, function: Function) {
        self.callables.insert(name.to_string(), function);
    }

    /// Run a named callable registered on this endpoint.
    pub fn invoke_local(&self, name: &str, args: Arguments) -> Result<Value> {
        let function = self
            .callables
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::unknown_method(&format!("endpoint {}", self.peer), name))?;
        function.call(args)
    }

    /// Translation hooks for this endpoint's two interface tags.
    pub fn translation_table(self: &Arc<Self>) -> TranslationTable {
        let mut table = TranslationTable::new();

        let local = Arc::clone(self);
        let decoder = Arc::clone(self);
        table.insert(
            self.local_tag,
            move |value: &Value, _recipient: PeerId| match value {
                Value::Interface(iv) if iv.is_local() => Ok(Some(
                    WireRef {
                        object: local.expose(iv),
                        owner: local.peer,
                    }
                    .encode(),
                )),
                _ => Ok(None),
            },
            move |data: &[u8], via: &ChannelRef| decoder.decode_ref(data, via),
        );

        let remote = Arc::clone(self);
        let decoder = Arc::clone(self);
        table.insert(
            self.remote_tag,
            move |value: &Value, recipient: PeerId| {
                let Value::Interface(iv) = value else {
                    return Ok(None);
                };
                let Some(handle) = iv.remote_handle() else {
                    return Ok(None);
                };
                let wire = if handle.owner == recipient {
                    // Going home: the owner resolves its own id.
                    WireRef {
                        object: handle.remote_id,
                        owner: recipient,
                    }
                } else {
                    WireRef {
                        object: remote.expose(iv),
                        owner: remote.peer,
                    }
                };
                Ok(Some(wire.encode()))
            },
            move |data: &[u8], via: &ChannelRef| decoder.decode_ref(data, via),
        );

        table
    }

    fn decode_ref(&self, data: &[u8], via: &ChannelRef) -> Result<Value> {
        let wire = WireRef::decode(data)?;
        if wire.owner == self.peer {
            return self.exposed(wire.object).map(Value::Interface);
        }
        Ok(Value::Descriptor(RemoteDescriptor {
            remote_id: wire.object,
            owner: wire.owner,
            channel: via.clone(),
        }))
    }
}
