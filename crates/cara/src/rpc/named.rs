// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Plain named-callable RPC, outside interface object ids.

use super::ChannelRef;
use crate::interface::{Arguments, Function, InterfaceValue, Servant};
use crate::value::Value;
use crate::Result;

/// Register every method of `value` on `channel` as a named callable.
///
/// Superclass methods are registered first so the interface's own
/// methods win on a name clash.
pub fn register_interface(channel: &ChannelRef, value: &InterfaceValue) -> Result<usize> {
    let decl = value.decl();
    let mut count = 0;
    for ancestor in decl.mro()?.into_iter().rev() {
        for method in ancestor.methods()? {
            let bound = value.method((ancestor.id(), method.id))?;
            channel.register_callable(&method.name, Function::from_callable(bound));
            count += 1;
        }
    }
    log::debug!("[rpc] registered {} callable(s) for {}", count, decl.name());
    Ok(count)
}

/// Servant forwarding each method to the peer's callable of the same name.
///
/// Wrapping it as an interface gives a typed view of a plain endpoint.
pub struct NamedEndpoint {
    channel: ChannelRef,
}

impl NamedEndpoint {
    pub fn new(channel: ChannelRef) -> Self {
        Self { channel }
    }
}

impl Servant for NamedEndpoint {
    fn dispatch(&self, method: &str, args: Arguments) -> Result<Value> {
        self.channel.invoke(method, args)
    }
}
