// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values.
//!
//! [`Value`] is the dynamic currency passed through fields, method
//! arguments, results and channels. Typed containers ([`StructValue`],
//! [`ListValue`], [`EnumValue`], [`InterfaceValue`]) sit next to untyped
//! shapes (`Tuple`, `Map`) that the conversion step turns into typed ones.

mod convert;
mod list;
mod structs;

pub use crate::decl::EnumValue;
pub use convert::{convert, to_plain};
pub use list::{ListCache, ListType, ListValue};
pub use structs::StructValue;

use crate::deferred::Deferred;
use crate::interface::{Function, InterfaceValue, Servant};
use crate::rpc::RemoteDescriptor;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Key of an id-keyed or name-keyed mapping.
///
/// Struct containers resolve `Name` and ASCII `Bytes` keys to field ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Id(u32),
    Name(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Name(name) => f.write_str(name),
            Self::Bytes(bytes) => write!(f, "b\"{}\"", bytes.escape_ascii()),
        }
    }
}

impl From<u32> for Key {
    fn from(id: u32) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&[u8]> for Key {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Key {
    fn from(bytes: &[u8; N]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A dynamically typed value.
#[derive(Clone)]
pub enum Value {
    Void,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Data(Vec<u8>),
    Enum(EnumValue),
    Struct(StructValue),
    List(ListValue),
    /// Untyped sequence (tuple results, decoded arrays).
    Tuple(Vec<Value>),
    /// Untyped mapping.
    Map(BTreeMap<Key, Value>),
    Interface(InterfaceValue),
    /// Bare callable, wrappable as a single-method interface.
    Function(Function),
    /// Arbitrary object answering methods by name.
    Object(Arc<dyn Servant>),
    /// Remote object reference decoded from a channel.
    Descriptor(RemoteDescriptor),
    /// Codec extension payload.
    Ext { tag: u8, data: Vec<u8> },
    /// Result not available yet.
    Pending(Deferred<Value>),
}

#[derive(Clone, Copy)]
enum Number {
    Int(i128),
    Float(f64),
}

impl Value {
    /// Build a [`Value::Map`] from key/value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Key>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a [`Value::Tuple`].
    pub fn tuple<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Bool(_) => "Bool",
            Self::Int8(_) => "Int8",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Uint8(_) => "Uint8",
            Self::Uint16(_) => "Uint16",
            Self::Uint32(_) => "Uint32",
            Self::Uint64(_) => "Uint64",
            Self::Float32(_) => "Float32",
            Self::Float64(_) => "Float64",
            Self::Text(_) => "Text",
            Self::Data(_) => "Data",
            Self::Enum(_) => "Enum",
            Self::Struct(_) => "Struct",
            Self::List(_) => "List",
            Self::Tuple(_) => "Tuple",
            Self::Map(_) => "Map",
            Self::Interface(_) => "Interface",
            Self::Function(_) => "Function",
            Self::Object(_) => "Object",
            Self::Descriptor(_) => "Descriptor",
            Self::Ext { .. } => "Ext",
            Self::Pending(_) => "Pending",
        }
    }

    fn number(&self) -> Option<Number> {
        Some(match self {
            Self::Int8(v) => Number::Int((*v).into()),
            Self::Int16(v) => Number::Int((*v).into()),
            Self::Int32(v) => Number::Int((*v).into()),
            Self::Int64(v) => Number::Int((*v).into()),
            Self::Uint8(v) => Number::Int((*v).into()),
            Self::Uint16(v) => Number::Int((*v).into()),
            Self::Uint32(v) => Number::Int((*v).into()),
            Self::Uint64(v) => Number::Int((*v).into()),
            Self::Float32(v) => Number::Float((*v).into()),
            Self::Float64(v) => Number::Float(*v),
            _ => return None,
        })
    }

    /// Integer value of any integer variant.
    pub fn as_i128(&self) -> Option<i128> {
        match self.number()? {
            Number::Int(v) => Some(v),
            Number::Float(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|v| u64::try_from(v).ok())
    }

    /// Numeric value of any integer or float variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self.number()? {
            Number::Int(v) => Some(v as f64),
            Number::Float(v) => Some(v),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<Key, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceValue> {
        match self {
            Self::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Zero, empty, `Void` and `false` are falsy; a struct is truthy when
    /// any slot is stored.
    pub fn is_truthy(&self) -> bool {
        if let Some(number) = self.number() {
            return match number {
                Number::Int(v) => v != 0,
                Number::Float(v) => v != 0.0,
            };
        }
        match self {
            Self::Void => false,
            Self::Bool(b) => *b,
            Self::Text(s) => !s.is_empty(),
            Self::Data(d) => !d.is_empty(),
            Self::Struct(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Tuple(items) => !items.is_empty(),
            Self::Map(m) => !m.is_empty(),
            Self::Ext { data, .. } => !data.is_empty(),
            _ => true,
        }
    }
}

/// Exact integer value of an integral float within `i128` range.
fn integral(f: f64) -> Option<i128> {
    (f.fract() == 0.0 && f.abs() < 1e38).then(|| f as i128)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.number(), other.number()) {
            return match (a, b) {
                (Number::Int(a), Number::Int(b)) => a == b,
                (Number::Float(a), Number::Float(b)) => a == b,
                (Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => {
                    integral(f).is_some_and(|whole| whole == i)
                }
            };
        }
        match (self, other) {
            (Self::Void, Self::Void) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Data(a), Self::Data(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Struct(a), Self::Struct(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Interface(a), Self::Interface(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (Self::Descriptor(a), Self::Descriptor(b)) => a == b,
            (Self::Ext { tag: ta, data: da }, Self::Ext { tag: tb, data: db }) => {
                ta == tb && da == db
            }
            (Self::Pending(a), Self::Pending(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(number) = self.number() {
            // Integral floats hash like the equal integer.
            match number {
                Number::Int(v) => {
                    0u8.hash(state);
                    v.hash(state);
                }
                Number::Float(v) => match integral(v) {
                    Some(whole) => {
                        0u8.hash(state);
                        whole.hash(state);
                    }
                    None => {
                        1u8.hash(state);
                        v.to_bits().hash(state);
                    }
                },
            }
            return;
        }
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(b) => b.hash(state),
            Self::Text(s) => s.hash(state),
            Self::Data(d) => d.hash(state),
            Self::Enum(e) => e.hash(state),
            Self::Struct(s) => s.hash(state),
            Self::List(l) => l.items().hash(state),
            Self::Tuple(items) => items.hash(state),
            Self::Map(m) => {
                for (k, v) in m {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Self::Interface(i) => i.identity().hash(state),
            Self::Function(f) => f.addr().hash(state),
            Self::Object(o) => (Arc::as_ptr(o) as *const () as usize).hash(state),
            Self::Descriptor(d) => {
                d.remote_id.hash(state);
                d.owner.hash(state);
            }
            Self::Ext { tag, data } => {
                tag.hash(state);
                data.hash(state);
            }
            Self::Pending(d) => d.addr().hash(state),
            _ => {}
        }
    }
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl IntoIterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("Void"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int8(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::Uint8(v) => write!(f, "{}", v),
            Self::Uint16(v) => write!(f, "{}", v),
            Self::Uint32(v) => write!(f, "{}", v),
            Self::Uint64(v) => write!(f, "{}", v),
            Self::Float32(v) => write!(f, "{:?}", v),
            Self::Float64(v) => write!(f, "{:?}", v),
            Self::Text(s) => write!(f, "{:?}", s),
            Self::Data(d) => write!(f, "b\"{}\"", d.escape_ascii()),
            Self::Enum(e) => write!(f, "{}", e),
            Self::Struct(s) => write!(f, "{}", s),
            Self::List(l) => write_seq(f, "[", l.items(), "]"),
            Self::Tuple(items) => write_seq(f, "(", items, ")"),
            Self::Map(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Self::Interface(i) => write!(f, "{}", i),
            Self::Function(_) => f.write_str("<function>"),
            Self::Object(_) => f.write_str("<object>"),
            Self::Descriptor(d) => write!(f, "<remote #{}@{}>", d.remote_id, d.owner),
            Self::Ext { tag, data } => write!(f, "Ext({}, {} bytes)", tag, data.len()),
            Self::Pending(_) => f.write_str("<pending>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    String => Text,
    Vec<u8> => Data,
    EnumValue => Enum,
    StructValue => Struct,
    ListValue => List,
    Vec<Value> => Tuple,
    BTreeMap<Key, Value> => Map,
    InterfaceValue => Interface,
    Function => Function,
    RemoteDescriptor => Descriptor,
    Deferred<Value> => Pending,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Data(v.to_vec())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Void
    }
}

impl From<Arc<dyn Servant>> for Value {
    fn from(v: Arc<dyn Servant>) -> Self {
        Self::Object(v)
    }
}
