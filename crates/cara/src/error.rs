// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the object model, generics engine and remote layer.

use std::fmt;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by declarations, values, interface dispatch and RPC.
///
/// Every variant is a caller-visible, synchronous failure. `Clone` is
/// required because a deferred failure is observed by every continuation
/// chained onto it.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Field name or id does not resolve against the struct declaration.
    UnknownField { decl: String, field: String },

    /// Method name, id or qualified id does not resolve against the interface.
    UnknownMethod { interface: String, method: String },

    /// Ordinal or name does not match any enumerant.
    UnknownEnumerant { decl: String, value: String },

    /// A field was bound both positionally and by name.
    ArgumentConflict { decl: String, field: String },

    /// Keyword argument does not match any declared parameter.
    ParamNotFound { method: String, param: String },

    /// More positional arguments than declared parameters.
    TooManyArguments {
        method: String,
        expected: usize,
        got: usize,
    },

    /// A bare function cannot satisfy an interface with several methods.
    TooManyMethods { interface: String, count: usize },

    /// Callee's return shape does not match the declared results.
    ResultArityMismatch {
        method: String,
        expected: usize,
        got: String,
    },

    /// Template index exceeds the declared template-variable count.
    TemplateOutOfRange {
        decl: String,
        index: usize,
        count: usize,
    },

    /// Filtered sequence lookup matched nothing.
    NotFound(String),

    /// Filtered lookup used on a sequence whose elements are not structs.
    NotStructList(String),

    /// Value cannot be converted to the requested type.
    TypeMismatch { expected: String, got: String },

    /// Interface-typed field read while absent (interfaces have no default).
    NoDefault { decl: String, field: String },

    /// Structural data accessed before the declaration was finished.
    NotFinished(String),

    /// Declaration finished twice.
    AlreadyFinished(String),

    /// Structural data rejected while finishing.
    InvalidDeclaration(String),

    /// Generic method called before its method templates were bound.
    Unspecialized(String),

    /// Exposed-object id not present in the local table.
    UnknownObject(u64),

    /// Transport or marshalling failure reported by a channel.
    Channel(String),

    /// Failure raised inside a method body.
    Raised(String),

    /// Configuration could not be read or parsed.
    Config(String),
}

impl Error {
    /// Failure raised by user code inside a method body.
    pub fn raised(message: impl Into<String>) -> Self {
        Self::Raised(message.into())
    }

    /// Transport failure.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    pub(crate) fn unknown_field(decl: &str, field: impl fmt::Display) -> Self {
        Self::UnknownField {
            decl: decl.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn unknown_method(interface: &str, method: impl fmt::Display) -> Self {
        Self::UnknownMethod {
            interface: interface.to_string(),
            method: method.to_string(),
        }
    }

    pub(crate) fn mismatch(expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { decl, field } => {
                write!(f, "Field {} does not exist on {}", field, decl)
            }
            Self::UnknownMethod { interface, method } => {
                write!(f, "Method {} does not exist on {}", method, interface)
            }
            Self::UnknownEnumerant { decl, value } => {
                write!(f, "{} is not an enumerant of {}", value, decl)
            }
            Self::ArgumentConflict { decl, field } => {
                write!(f, "{} got two values for {}", decl, field)
            }
            Self::ParamNotFound { method, param } => {
                write!(f, "Param {} does not exist for method {}", param, method)
            }
            Self::TooManyArguments {
                method,
                expected,
                got,
            } => write!(
                f,
                "Method {} takes {} positional arguments ({} given)",
                method, expected, got
            ),
            Self::TooManyMethods { interface, count } => write!(
                f,
                "Interface {} has too many methods ({}) to be satisfied by a single function",
                interface, count
            ),
            Self::ResultArityMismatch {
                method,
                expected,
                got,
            } => write!(
                f,
                "Multiple output parameters for {} require a tuple or mapping with {} elements ({} given)",
                method, expected, got
            ),
            Self::TemplateOutOfRange { decl, index, count } => write!(
                f,
                "Template {} out of range for {} ({} declared)",
                index, decl, count
            ),
            Self::NotFound(what) => write!(f, "No element matches {}", what),
            Self::NotStructList(list) => {
                write!(f, "Cannot filter {}: elements are not structs", list)
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, got)
            }
            Self::NoDefault { decl, field } => {
                write!(f, "Interface field {}.{} is not set and has no default", decl, field)
            }
            Self::NotFinished(name) => write!(f, "Declaration {} is not finished", name),
            Self::AlreadyFinished(name) => write!(f, "Declaration {} already finished", name),
            Self::InvalidDeclaration(msg) => write!(f, "Invalid declaration: {}", msg),
            Self::Unspecialized(method) => {
                write!(f, "Generic method {} must be specialized before calling", method)
            }
            Self::UnknownObject(id) => write!(f, "No exposed object with id {}", id),
            Self::Channel(msg) => write!(f, "Channel error: {}", msg),
            Self::Raised(msg) => write!(f, "Method raised: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
