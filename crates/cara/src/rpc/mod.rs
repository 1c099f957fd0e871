// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Remote proxy layer.
//!
//! Interface values cross the boundary by capability: a local object is
//! exposed under a stable id the first time it is sent, and the receiver
//! gets a remote handle addressing that id through the channel it arrived
//! on. Handing a handle back to its owner resolves to the original object.
//!
//! # Overview
//!
//! - [`Channel`]: the transport boundary (`send`, named callables)
//! - [`Endpoint`]: one party, with its exposed-object table
//! - [`TranslationTable`]: codec hook for the two interface tags
//! - [`LoopbackChannel`]: in-process channel pair joining two endpoints
//!
//! # Forwarding
//!
//! When party B forwards a handle it received from A to party C, B
//! exposes the handle itself; C's calls go to B, which relays them to A.
//! The handle B holds keeps addressing A's original object.

mod codec;
mod endpoint;
mod loopback;
mod named;
mod remote;

pub use codec::{TranslationTable, WireRef};
pub use endpoint::{Endpoint, ExposedObjects};
pub use loopback::LoopbackChannel;
pub use named::{register_interface, NamedEndpoint};
pub use remote::{RemoteDescriptor, RemoteHandle};

use crate::decl::DeclId;
use crate::interface::{Arguments, Function};
use crate::value::Value;
use crate::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Identifies a party on the channel graph.
pub type PeerId = u64;

/// Id of an exposed object, unique per exposing endpoint.
pub type ObjectId = u64;

/// One method call message.
#[derive(Debug, Clone)]
pub struct Call {
    pub target: ObjectId,
    pub interface_id: DeclId,
    pub method_id: u32,
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

/// Transport boundary.
///
/// A channel links the local party to one peer. Results may be
/// `Value::Pending`; failures of the peer surface as `Err` (or as a failed
/// pending value).
pub trait Channel: Send + Sync {
    /// Deliver a call to an object exposed by the peer.
    fn send(&self, call: Call) -> Result<Value>;

    /// Offer `function` to the peer under `name`.
    fn register_callable(&self, name: &str, function: Function);

    /// Call a named callable the peer registered.
    fn invoke(&self, name: &str, args: Arguments) -> Result<Value>;
}

/// Shared channel reference.
pub type ChannelRef = Arc<dyn Channel>;
