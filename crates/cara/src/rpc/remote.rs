// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Remote handle descriptors and handles.

use super::{Call, ChannelRef, ObjectId, PeerId};
use crate::decl::DeclId;
use crate::interface::Arguments;
use crate::value::Value;
use crate::Result;
use std::fmt;

/// Opaque reference to an object exposed by `owner`, reachable through `channel`.
#[derive(Clone)]
pub struct RemoteDescriptor {
    pub remote_id: ObjectId,
    pub owner: PeerId,
    pub channel: ChannelRef,
}

impl PartialEq for RemoteDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.remote_id == other.remote_id && self.owner == other.owner
    }
}

impl fmt::Debug for RemoteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteDescriptor")
            .field("remote_id", &self.remote_id)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Channel-backed target of a remote interface value.
pub struct RemoteHandle {
    pub remote_id: ObjectId,
    pub owner: PeerId,
    pub channel: ChannelRef,
}

impl RemoteHandle {
    /// Issue one call message for `(interface_id, method_id)`.
    pub fn call(&self, interface_id: DeclId, method_id: u32, args: Arguments) -> Result<Value> {
        log::debug!(
            "[rpc] call object={} owner={} interface={:#x} method={}",
            self.remote_id,
            self.owner,
            interface_id,
            method_id
        );
        self.channel.send(Call {
            target: self.remote_id,
            interface_id,
            method_id,
            args: args.positional,
            kwargs: args.named,
        })
    }

    pub fn descriptor(&self) -> RemoteDescriptor {
        RemoteDescriptor {
            remote_id: self.remote_id,
            owner: self.owner,
            channel: self.channel.clone(),
        }
    }
}

impl From<RemoteDescriptor> for RemoteHandle {
    fn from(descriptor: RemoteDescriptor) -> Self {
        Self {
            remote_id: descriptor.remote_id,
            owner: descriptor.owner,
            channel: descriptor.channel,
        }
    }
}
