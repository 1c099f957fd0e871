// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field, parameter and result types.

use crate::builtin::BuiltinKind;
use crate::decl::{EnumDecl, InterfaceDecl, StructDecl};
use crate::generics::{Applied, TemplateParam};
use crate::value::ListType;
use std::fmt;
use std::sync::Arc;

/// Anything a field, param or result can be typed as.
///
/// Declaration variants compare by handle identity; lists and applied
/// generics compare structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Builtin(BuiltinKind),
    Struct(StructDecl),
    Enum(EnumDecl),
    Interface(InterfaceDecl),
    List(ListType),
    /// Template variable of a generic struct or interface.
    Param(TemplateParam),
    /// Template variable of a generic method, by position.
    MethodParam(usize),
    /// Generic declaration with some (or non-concrete) template bindings.
    Applied(Arc<Applied>),
}

impl Type {
    /// False when the type still contains an unbound template variable.
    pub fn is_concrete(&self) -> bool {
        match self {
            Self::Builtin(_) | Self::Struct(_) | Self::Enum(_) | Self::Interface(_) => true,
            Self::List(list) => list.element().is_concrete(),
            Self::Param(_) | Self::MethodParam(_) | Self::Applied(_) => false,
        }
    }

    pub fn as_struct(&self) -> Option<&StructDecl> {
        match self {
            Self::Struct(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceDecl> {
        match self {
            Self::Interface(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDecl> {
        match self {
            Self::Enum(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListType> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }
}

impl From<BuiltinKind> for Type {
    fn from(kind: BuiltinKind) -> Self {
        Self::Builtin(kind)
    }
}

impl From<StructDecl> for Type {
    fn from(decl: StructDecl) -> Self {
        Self::Struct(decl)
    }
}

impl From<EnumDecl> for Type {
    fn from(decl: EnumDecl) -> Self {
        Self::Enum(decl)
    }
}

impl From<InterfaceDecl> for Type {
    fn from(decl: InterfaceDecl) -> Self {
        Self::Interface(decl)
    }
}

impl From<ListType> for Type {
    fn from(list: ListType) -> Self {
        Self::List(list)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(kind) => write!(f, "{}", kind),
            Self::Struct(decl) => f.write_str(decl.name()),
            Self::Enum(decl) => f.write_str(decl.name()),
            Self::Interface(decl) => f.write_str(decl.name()),
            Self::List(list) => write!(f, "List({})", list.element()),
            Self::Param(param) => write!(f, "{}", param),
            Self::MethodParam(index) => write!(f, "${}", index),
            Self::Applied(applied) => write!(f, "{}", applied),
        }
    }
}
