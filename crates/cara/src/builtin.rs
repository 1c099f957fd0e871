// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builtin type adapters.
//!
//! Conversion to a builtin kind passes the value through untouched. When
//! checking is enabled (debug builds by default) the value is checked
//! against the kind's family and range.

use crate::value::Value;
use crate::{Error, Result};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static CHECK_BUILTINS: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable the builtin checker for this process.
pub fn set_checking(enabled: bool) {
    CHECK_BUILTINS.store(enabled, Ordering::Relaxed);
}

/// Whether the builtin checker is active.
pub fn checking() -> bool {
    CHECK_BUILTINS.load(Ordering::Relaxed)
}

/// Primitive schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    Text,
    Data,
    Void,
    AnyPointer,
}

impl BuiltinKind {
    pub const ALL: [BuiltinKind; 15] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Float32,
        Self::Float64,
        Self::Bool,
        Self::Text,
        Self::Data,
        Self::Void,
        Self::AnyPointer,
    ];

    /// Schema-language name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Uint8 => "Uint8",
            Self::Uint16 => "Uint16",
            Self::Uint32 => "Uint32",
            Self::Uint64 => "Uint64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Bool => "Bool",
            Self::Text => "Text",
            Self::Data => "Data",
            Self::Void => "Void",
            Self::AnyPointer => "AnyPointer",
        }
    }

    /// Look a kind up by its schema-language name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Inclusive integer range, for integer kinds.
    fn int_range(self) -> Option<(i128, i128)> {
        match self {
            Self::Int8 => Some((i8::MIN.into(), i8::MAX.into())),
            Self::Int16 => Some((i16::MIN.into(), i16::MAX.into())),
            Self::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
            Self::Int64 => Some((i64::MIN.into(), i64::MAX.into())),
            Self::Uint8 => Some((0, u8::MAX.into())),
            Self::Uint16 => Some((0, u16::MAX.into())),
            Self::Uint32 => Some((0, u32::MAX.into())),
            Self::Uint64 => Some((0, u64::MAX.into())),
            _ => None,
        }
    }

    /// Zero value produced when a field of this kind was never assigned.
    pub fn zero(self) -> Value {
        match self {
            Self::Int8 => Value::Int8(0),
            Self::Int16 => Value::Int16(0),
            Self::Int32 => Value::Int32(0),
            Self::Int64 => Value::Int64(0),
            Self::Uint8 => Value::Uint8(0),
            Self::Uint16 => Value::Uint16(0),
            Self::Uint32 => Value::Uint32(0),
            Self::Uint64 => Value::Uint64(0),
            Self::Float32 => Value::Float32(0.0),
            Self::Float64 => Value::Float64(0.0),
            Self::Bool => Value::Bool(false),
            Self::Text => Value::Text(String::new()),
            Self::Data => Value::Data(Vec::new()),
            Self::Void | Self::AnyPointer => Value::Void,
        }
    }

    /// Whether `value` belongs to this kind's family.
    pub fn accepts(self, value: &Value) -> bool {
        if let Some((min, max)) = self.int_range() {
            return value.as_i128().is_some_and(|v| v >= min && v <= max);
        }
        match self {
            Self::Float32 | Self::Float64 => matches!(value, Value::Float32(_) | Value::Float64(_)),
            Self::Bool => matches!(value, Value::Bool(_)),
            Self::Text => matches!(value, Value::Text(_)),
            Self::Data => matches!(value, Value::Data(_)),
            _ => true,
        }
    }

    /// Conversion step for builtin kinds: identity, checked when enabled.
    pub fn convert(self, value: Value) -> Result<Value> {
        if checking() && !self.accepts(&value) {
            return Err(Error::mismatch(self.name(), value.kind_name()));
        }
        Ok(value)
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
