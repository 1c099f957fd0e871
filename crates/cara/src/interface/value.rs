// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::method::{invoke, BoundMethod};
use super::{Arguments, Function, Servant};
use crate::decl::{InterfaceDecl, Method, MethodKey};
use crate::rpc::{RemoteDescriptor, RemoteHandle};
use crate::value::{Key, Value};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What a local interface value dispatches to.
pub enum Implementation {
    /// Single function answering the interface's only method.
    Function(Function),
    /// Functions keyed by method name.
    Table(BTreeMap<String, Function>),
    /// Object answering by method name.
    Object(Arc<dyn Servant>),
}

/// Local implementation object; its address is its identity when exposed.
pub struct LocalObject {
    implementation: Implementation,
}

impl LocalObject {
    pub fn new(implementation: Implementation) -> Self {
        Self { implementation }
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    pub(crate) fn dispatch(
        &self,
        interface: &InterfaceDecl,
        method: &Method,
        args: Arguments,
    ) -> Result<Value> {
        match &self.implementation {
            Implementation::Function(f) => f.call(args),
            Implementation::Table(table) => table
                .get(&method.name)
                .ok_or_else(|| Error::unknown_method(interface.name(), &method.name))?
                .call(args),
            Implementation::Object(servant) => servant.dispatch(&method.name, args),
        }
    }
}

/// Where calls on an interface value go.
#[derive(Clone)]
pub enum Target {
    Local(Arc<LocalObject>),
    Remote(Arc<RemoteHandle>),
}

/// A value of an interface declaration.
#[derive(Clone)]
pub struct InterfaceValue {
    decl: InterfaceDecl,
    target: Target,
}

impl InterfaceValue {
    pub fn local(decl: &InterfaceDecl, implementation: Implementation) -> Self {
        Self {
            decl: decl.clone(),
            target: Target::Local(Arc::new(LocalObject::new(implementation))),
        }
    }

    pub fn remote(decl: &InterfaceDecl, descriptor: RemoteDescriptor) -> Self {
        Self {
            decl: decl.clone(),
            target: Target::Remote(Arc::new(RemoteHandle::from(descriptor))),
        }
    }

    pub fn decl(&self) -> &InterfaceDecl {
        &self.decl
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_local(&self) -> bool {
        matches!(self.target, Target::Local(_))
    }

    pub fn remote_handle(&self) -> Option<&RemoteHandle> {
        match &self.target {
            Target::Remote(handle) => Some(handle),
            Target::Local(_) => None,
        }
    }

    /// Address of the underlying object or handle.
    pub fn identity(&self) -> usize {
        match &self.target {
            Target::Local(object) => Arc::as_ptr(object) as usize,
            Target::Remote(handle) => Arc::as_ptr(handle) as usize,
        }
    }

    /// Call a method by name, id or `(interface id, method id)`.
    pub fn call(&self, key: impl Into<MethodKey>, args: Arguments) -> Result<Value> {
        let (owner, method) = self.decl.resolve(&key.into())?;
        if method.is_generic() {
            return Err(Error::Unspecialized(format!("{}.{}", owner.name(), method.name)));
        }
        invoke(self, owner, method, args)
    }

    /// The method as a callable bound to this value.
    pub fn method(&self, key: impl Into<MethodKey>) -> Result<BoundMethod> {
        let (owner, method) = self.decl.resolve(&key.into())?;
        Ok(BoundMethod::new(self.clone(), owner.clone(), method.clone()))
    }

    /// Mapping from method name (or id) to bound method.
    pub fn to_dict(&self, with_names: bool) -> Result<Value> {
        let mut out = BTreeMap::new();
        for (owner, method) in self.decl.all_methods()? {
            let key = if with_names {
                Key::Name(method.name.clone())
            } else {
                Key::Id(method.id)
            };
            let bound = BoundMethod::new(self.clone(), owner.clone(), method.clone());
            out.entry(key)
                .or_insert_with(|| Value::Function(Function::from_callable(bound)));
        }
        Ok(Value::Map(out))
    }

    pub(crate) fn dispatch_to_target(
        &self,
        owner: &InterfaceDecl,
        method: &Method,
        args: Arguments,
    ) -> Result<Value> {
        match &self.target {
            Target::Local(object) => object.dispatch(&self.decl, method, args),
            Target::Remote(handle) => handle.call(owner.id(), method.id, args),
        }
    }
}

impl Servant for InterfaceValue {
    fn dispatch(&self, method: &str, args: Arguments) -> Result<Value> {
        self.call(method, args)
    }
}

impl PartialEq for InterfaceValue {
    fn eq(&self, other: &Self) -> bool {
        if self.decl != other.decl {
            return false;
        }
        match (&self.target, &other.target) {
            (Target::Local(a), Target::Local(b)) => Arc::ptr_eq(a, b),
            (Target::Remote(a), Target::Remote(b)) => {
                a.remote_id == b.remote_id && a.owner == b.owner
            }
            _ => false,
        }
    }
}

impl fmt::Display for InterfaceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Local(_) => write!(f, "<{} local>", self.decl.name()),
            Target::Remote(h) => write!(f, "<{} remote #{}@{}>", self.decl.name(), h.remote_id, h.owner),
        }
    }
}

impl fmt::Debug for InterfaceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Make `value` a value of `decl`.
///
/// 1. A value of `decl` (or of an interface extending it) is returned as is.
/// 2. A remote descriptor becomes a remote handle.
/// 3. Anything else is wrapped: a bare function only for an interface with
///    at most one method, a mapping of functions by method name, or any
///    servant (including values of unrelated interfaces).
pub fn wrap(decl: &InterfaceDecl, value: Value) -> Result<InterfaceValue> {
    if let Value::Interface(existing) = &value {
        if existing.decl.extends(decl)? {
            return Ok(existing.clone());
        }
    }
    let implementation = match value {
        Value::Descriptor(descriptor) => return Ok(InterfaceValue::remote(decl, descriptor)),
        Value::Function(f) => {
            let count = decl.method_count()?;
            if count > 1 {
                return Err(Error::TooManyMethods {
                    interface: decl.name().to_string(),
                    count,
                });
            }
            Implementation::Function(f)
        }
        Value::Map(entries) => {
            let mut table = BTreeMap::new();
            for (key, entry) in entries {
                let name = match key {
                    Key::Name(name) => name,
                    Key::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Key::Id(id) => decl.resolve(&MethodKey::Id(id))?.1.name.clone(),
                };
                match entry {
                    Value::Function(f) => {
                        table.insert(name, f);
                    }
                    other => return Err(Error::mismatch("Function", other.kind_name())),
                }
            }
            Implementation::Table(table)
        }
        Value::Object(servant) => Implementation::Object(servant),
        Value::Interface(foreign) => Implementation::Object(Arc::new(foreign)),
        other => return Err(Error::mismatch(decl.name(), other.kind_name())),
    };
    Ok(InterfaceValue::local(decl, implementation))
}
