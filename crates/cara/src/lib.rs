// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Cara - runtime object model for schema declarations
//!
//! Dynamic, typed values for a Cap'n Proto style schema language: struct
//! containers keyed by field id, interface objects with method dispatch,
//! generic declarations with identity-stable specialization, and a
//! capability-passing RPC layer that forwards interface handles across
//! several hops.
//!
//! ## Quick Start
//!
//! ```rust
//! use cara::builtin::BuiltinKind;
//! use cara::decl::{Field, StructDecl, StructDef};
//! use cara::types::Type;
//! use cara::value::StructValue;
//! use cara::Result;
//!
//! fn main() -> Result<()> {
//!     let basic = StructDecl::declare("Basic", 0x100);
//!     basic.finish(StructDef::new().field(Field::new(0, "field", Type::Builtin(BuiltinKind::Int32))))?;
//!
//!     let by_name = StructValue::from_entries(&basic, [("field", 1i32)])?;
//!     let by_id = StructValue::from_entries(&basic, [(0u32, 1i32)])?;
//!     assert_eq!(by_name, by_id);
//!     assert_eq!(by_name.to_string(), "Basic({field: 1})");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                            RPC Layer                                |
//! |   Endpoint | ExposedObjects | TranslationTable | LoopbackChannel    |
//! +---------------------------------------------------------------------+
//! |                         Interface Layer                             |
//! |   wrap | InterfaceValue | BoundMethod | argument binding | packing  |
//! +---------------------------------------------------------------------+
//! |                           Value Layer                               |
//! |   StructValue | ListValue | EnumValue | convert | Deferred          |
//! +---------------------------------------------------------------------+
//! |                        Declaration Layer                            |
//! |   StructDecl | EnumDecl | InterfaceDecl | Schema | generics         |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`decl`] - declaration handles, declared first and finished later
//! - [`value`] - runtime values and type-directed conversion
//! - [`interface`] - interface wrapping and method calls
//! - [`generics`] - template variables, partial application, substitution
//! - [`schema`] - list-type and specialization caches
//! - [`rpc`] - remote handles, exposed objects, forwarding

/// Builtin primitive kinds and range-checked conversion.
pub mod builtin;
/// Runtime configuration (interface tags, object ids, checking).
pub mod config;
/// Declaration handles: structs, enums, interfaces, constants, annotations.
pub mod decl;
/// Single-assignment results usable as futures.
pub mod deferred;
/// Crate-wide error type.
pub mod error;
/// Generic declarations and template substitution.
pub mod generics;
/// Interface values, method binding and result packing.
pub mod interface;
/// Remote handles and the capability-passing channel layer.
pub mod rpc;
/// Shared type registries.
pub mod schema;
/// Field and parameter types.
pub mod types;
/// Runtime values.
pub mod value;

pub use decl::{Decl, EnumDecl, InterfaceDecl, StructDecl};
pub use error::{Error, Result};
pub use schema::Schema;
pub use types::Type;
pub use value::{StructValue, Value};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
