// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interface runtime and method dispatch.
//!
//! An [`InterfaceValue`] is either a local wrapper around a function, a
//! table of functions or an arbitrary [`Servant`], or a remote handle
//! whose every method becomes a channel call. Both paths share argument
//! conversion and result packing.
//!
//! # Example
//!
//! ```rust
//! use cara::builtin::BuiltinKind;
//! use cara::decl::{InterfaceDecl, InterfaceDef, Method};
//! use cara::interface::{wrap, Arguments, Function};
//! use cara::types::Type;
//! use cara::value::Value;
//!
//! let int = Type::Builtin(BuiltinKind::Int64);
//! let adder = InterfaceDecl::declare("Adder", 0x10);
//! adder
//!     .finish(InterfaceDef::new().method(
//!         Method::new(0, "add").param("a", int.clone()).param("b", int.clone()).result("sum", int),
//!     ))
//!     .expect("finish");
//!
//! let add = Function::new(|args: Arguments| {
//!     let a = args.positional[0].as_i64().unwrap_or_default();
//!     let b = args.positional[1].as_i64().unwrap_or_default();
//!     Ok(Value::Int64(a + b))
//! });
//! let value = wrap(&adder, add.into()).expect("wrap");
//! let sum = value.call("add", Arguments::new().arg(2i64).arg(3i64)).expect("call");
//! assert_eq!(sum, Value::Int64(5));
//! ```

mod method;
mod value;

pub use method::{pack_results, BoundMethod};
pub use value::{wrap, Implementation, InterfaceValue, LocalObject, Target};

use crate::value::Value;
use crate::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Something callable with dynamic arguments.
pub trait Callable: Send + Sync {
    fn call(&self, args: Arguments) -> Result<Value>;
}

impl<F> Callable for F
where
    F: Fn(Arguments) -> Result<Value> + Send + Sync,
{
    fn call(&self, args: Arguments) -> Result<Value> {
        self(args)
    }
}

/// An object answering interface methods by name.
///
/// Implemented by user objects wrapped as interfaces, by interface values
/// themselves (so a value of one interface can back another), and by
/// channel-backed proxies.
pub trait Servant: Send + Sync {
    fn dispatch(&self, method: &str, args: Arguments) -> Result<Value>;
}

/// Shared handle to a [`Callable`]; compares by identity.
#[derive(Clone)]
pub struct Function(Arc<dyn Callable>);

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn from_callable(callable: impl Callable + 'static) -> Self {
        Self(Arc::new(callable))
    }

    pub fn call(&self, args: Arguments) -> Result<Value> {
        self.0.call(args)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:#x})", self.addr())
    }
}

/// Positional and named call arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: BTreeMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Argument bound at `index` or under `name`.
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        self.positional.get(index).or_else(|| self.named.get(name))
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests;
