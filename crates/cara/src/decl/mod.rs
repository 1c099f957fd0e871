// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema declarations.
//!
//! Every declaration kind is a cheap, clonable handle over a two-phase
//! cell: it is *declared* first (name and id known, usable as a forward
//! reference) and *finished* later with its structural data. Handles
//! compare and hash by identity, so they work as map keys even while the
//! schema graph is still being linked.
//!
//! # Example
//!
//! ```rust
//! use cara::builtin::BuiltinKind;
//! use cara::decl::{Field, StructDecl, StructDef};
//! use cara::types::Type;
//!
//! let basic = StructDecl::declare("Basic", 1);
//! basic
//!     .finish(StructDef::new().field(Field::new(0, "field", Type::Builtin(BuiltinKind::Int32))))
//!     .expect("finish");
//! assert_eq!(basic.field_by_name("field").expect("field").id, 0);
//! ```

macro_rules! decl_handle {
    ($(#[$meta:meta])* $handle:ident, $body:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $handle(std::sync::Arc<$crate::decl::cell::DeclCell<$body>>);

        impl $handle {
            /// Forward-declare: name and id are known, structure is not.
            pub fn declare(name: impl Into<String>, id: $crate::decl::DeclId) -> Self {
                Self(std::sync::Arc::new($crate::decl::cell::DeclCell::new(
                    name.into(),
                    id,
                    Vec::new(),
                )))
            }

            pub fn name(&self) -> &str {
                self.0.name()
            }

            pub fn id(&self) -> $crate::decl::DeclId {
                self.0.id()
            }

            pub fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            /// Run `callback` once this declaration is finished.
            pub fn when_finished(&self, callback: impl FnOnce() + Send + 'static) {
                self.0.when_finished(Box::new(callback));
            }

            pub fn ptr_eq(&self, other: &Self) -> bool {
                std::sync::Arc::ptr_eq(&self.0, &other.0)
            }

            #[allow(dead_code)]
            pub(crate) fn body(&self) -> $crate::Result<&$body> {
                self.0.body()
            }
        }

        impl PartialEq for $handle {
            fn eq(&self, other: &Self) -> bool {
                self.ptr_eq(other)
            }
        }

        impl Eq for $handle {}

        impl std::hash::Hash for $handle {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::ptr::hash(std::sync::Arc::as_ptr(&self.0), state);
            }
        }

        impl std::fmt::Debug for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($handle), self.name())
            }
        }

        impl std::fmt::Display for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

macro_rules! generic_handle {
    ($handle:ident, $variant:ident) => {
        impl $handle {
            /// Forward-declare a parametric declaration with named template variables.
            pub fn declare_generic<S: Into<String>>(
                name: impl Into<String>,
                id: $crate::decl::DeclId,
                templates: impl IntoIterator<Item = S>,
            ) -> Self {
                Self(std::sync::Arc::new($crate::decl::cell::DeclCell::new(
                    name.into(),
                    id,
                    templates.into_iter().map(Into::into).collect(),
                )))
            }

            /// Template variable names, empty for non-generic declarations.
            pub fn templates(&self) -> &[String] {
                self.0.templates()
            }

            pub fn is_generic(&self) -> bool {
                !self.0.templates().is_empty()
            }

            /// Placeholder type for template variable `index`.
            pub fn template(&self, index: usize) -> $crate::Result<$crate::types::Type> {
                let count = self.0.templates().len();
                if index >= count {
                    return Err($crate::Error::TemplateOutOfRange {
                        decl: self.name().to_string(),
                        index,
                        count,
                    });
                }
                Ok($crate::types::Type::Param($crate::generics::TemplateParam {
                    owner: $crate::generics::Generic::$variant(self.clone()),
                    index,
                }))
            }
        }
    };
}

mod cell;
mod consts;
mod enums;
mod interface;
mod structs;

pub use cell::DeclId;
pub use consts::{
    AnnotationDecl, AnnotationDef, AnnotationTarget, AnnotationValue, ConstDecl,
};
pub use enums::{EnumDecl, EnumDef, EnumValue, Enumerant};
pub use interface::{InterfaceDecl, InterfaceDef, Method, MethodKey, Param};
pub use structs::{Field, StructDecl, StructDef};

use crate::types::Type;
use crate::value::Value;
use crate::{Error, Result};
use std::collections::HashMap;

/// Kind-erased declaration handle, used by nested-declaration registries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Decl {
    Struct(StructDecl),
    Enum(EnumDecl),
    Interface(InterfaceDecl),
    Const(ConstDecl),
    Annotation(AnnotationDecl),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Self::Struct(d) => d.name(),
            Self::Enum(d) => d.name(),
            Self::Interface(d) => d.name(),
            Self::Const(d) => d.name(),
            Self::Annotation(d) => d.name(),
        }
    }

    pub fn id(&self) -> DeclId {
        match self {
            Self::Struct(d) => d.id(),
            Self::Enum(d) => d.id(),
            Self::Interface(d) => d.id(),
            Self::Const(d) => d.id(),
            Self::Annotation(d) => d.id(),
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            Self::Struct(d) => d.is_finished(),
            Self::Enum(d) => d.is_finished(),
            Self::Interface(d) => d.is_finished(),
            Self::Const(d) => d.is_finished(),
            Self::Annotation(d) => d.is_finished(),
        }
    }

    /// The declaration as a field/param type, for the kinds that are types.
    pub fn as_type(&self) -> Option<Type> {
        match self {
            Self::Struct(d) => Some(Type::Struct(d.clone())),
            Self::Enum(d) => Some(Type::Enum(d.clone())),
            Self::Interface(d) => Some(Type::Interface(d.clone())),
            Self::Const(_) | Self::Annotation(_) => None,
        }
    }
}

impl From<StructDecl> for Decl {
    fn from(d: StructDecl) -> Self {
        Self::Struct(d)
    }
}

impl From<EnumDecl> for Decl {
    fn from(d: EnumDecl) -> Self {
        Self::Enum(d)
    }
}

impl From<InterfaceDecl> for Decl {
    fn from(d: InterfaceDecl) -> Self {
        Self::Interface(d)
    }
}

impl From<ConstDecl> for Decl {
    fn from(d: ConstDecl) -> Self {
        Self::Const(d)
    }
}

impl From<AnnotationDecl> for Decl {
    fn from(d: AnnotationDecl) -> Self {
        Self::Annotation(d)
    }
}

/// Name -> child declaration table kept by structs and interfaces.
#[derive(Clone, Default)]
pub(crate) struct Nested {
    order: Vec<Decl>,
    by_name: HashMap<String, usize>,
}

impl Nested {
    pub(crate) fn build(owner: &str, decls: Vec<Decl>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(decls.len());
        for (index, decl) in decls.iter().enumerate() {
            if by_name.insert(decl.name().to_string(), index).is_some() {
                return Err(Error::InvalidDeclaration(format!(
                    "{} declares {} twice",
                    owner,
                    decl.name()
                )));
            }
        }
        Ok(Self {
            order: decls,
            by_name,
        })
    }

    pub(crate) fn get(&self, owner: &str, name: &str) -> Result<&Decl> {
        self.by_name
            .get(name)
            .map(|&index| &self.order[index])
            .ok_or_else(|| Error::NotFound(format!("{}.{}", owner, name)))
    }

    pub(crate) fn all(&self) -> &[Decl] {
        &self.order
    }
}

/// First annotation value in `annotations` produced by `decl`.
pub fn find_annotation<'a>(
    annotations: &'a [AnnotationValue],
    decl: &AnnotationDecl,
) -> Option<&'a Value> {
    annotations
        .iter()
        .find(|a| a.decl() == decl)
        .map(AnnotationValue::value)
}
