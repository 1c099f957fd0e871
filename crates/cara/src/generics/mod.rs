// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic declarations and template substitution.
//!
//! A struct or interface declared with template variables is a template.
//! Binding every variable to a concrete type yields a specialization,
//! cached so the same arguments always give the same declaration handle.
//! Binding only some (or binding to still-parametric types) yields an
//! [`Applied`] type that further [`Schema::apply`] calls complete.
//!
//! Substitution walks field, parameter and result types plus nested
//! declarations. Copies are registered before their bodies are walked, so
//! self-referential and mutually recursive graphs link back to the copy
//! instead of recursing forever.

mod cache;
mod substitute;

pub use cache::SpecializationCache;
pub(crate) use substitute::Substitution;

use crate::decl::{InterfaceDecl, Method, StructDecl};
use crate::schema::Schema;
use crate::types::Type;
use crate::{Error, Result};
use std::fmt;

/// A declaration that can carry template variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Generic {
    Struct(StructDecl),
    Interface(InterfaceDecl),
}

impl Generic {
    pub fn name(&self) -> &str {
        match self {
            Self::Struct(d) => d.name(),
            Self::Interface(d) => d.name(),
        }
    }

    pub fn templates(&self) -> &[String] {
        match self {
            Self::Struct(d) => d.templates(),
            Self::Interface(d) => d.templates(),
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            Self::Struct(d) => d.is_finished(),
            Self::Interface(d) => d.is_finished(),
        }
    }

    pub fn when_finished(&self, callback: impl FnOnce() + Send + 'static) {
        match self {
            Self::Struct(d) => d.when_finished(callback),
            Self::Interface(d) => d.when_finished(callback),
        }
    }

    pub fn to_type(&self) -> Type {
        match self {
            Self::Struct(d) => Type::Struct(d.clone()),
            Self::Interface(d) => Type::Interface(d.clone()),
        }
    }

    /// The generic behind a declaration type, if it has templates.
    pub fn from_type(ty: &Type) -> Option<Self> {
        match ty {
            Type::Struct(d) if d.is_generic() => Some(Self::Struct(d.clone())),
            Type::Interface(d) if d.is_generic() => Some(Self::Interface(d.clone())),
            _ => None,
        }
    }
}

/// Template variable `index` of `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateParam {
    pub owner: Generic,
    pub index: usize,
}

impl TemplateParam {
    pub fn name(&self) -> &str {
        self.owner
            .templates()
            .get(self.index)
            .map(String::as_str)
            .unwrap_or("?")
    }
}

impl fmt::Display for TemplateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner.name(), self.name())
    }
}

/// Partially applied generic: template index -> bound type, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Applied {
    pub target: Generic,
    pub bindings: Vec<(usize, Type)>,
}

impl Applied {
    /// Template indices still unbound, ascending.
    pub fn unbound(&self) -> Vec<usize> {
        (0..self.target.templates().len())
            .filter(|index| !self.bindings.iter().any(|(bound, _)| bound == index))
            .collect()
    }

    /// Whether every template is bound to a concrete type.
    pub fn is_complete(&self) -> bool {
        self.bindings.len() == self.target.templates().len()
            && self.bindings.iter().all(|(_, ty)| ty.is_concrete())
    }
}

impl fmt::Display for Applied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.target.name())?;
        for (i, (index, ty)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let name = self
                .target
                .templates()
                .get(*index)
                .map(String::as_str)
                .unwrap_or("?");
            write!(f, "{}={}", name, ty)?;
        }
        f.write_str("]")
    }
}

/// Display name of a specialization: `Generic[Arg, ...]`.
pub(crate) fn specialization_name(generic: &Generic, args: &[Type]) -> String {
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("{}[{}]", generic.name(), args.join(", "))
}

impl Method {
    /// Bind every method-level template variable.
    pub fn specialize(&self, schema: &Schema, args: &[Type]) -> Result<Method> {
        let count = self.templates.len();
        if args.len() > count {
            return Err(Error::TemplateOutOfRange {
                decl: self.name.clone(),
                index: args.len() - 1,
                count,
            });
        }
        if args.len() < count {
            return Err(Error::Unspecialized(format!(
                "{} needs {} template argument(s), got {}",
                self.name,
                count,
                args.len()
            )));
        }
        let bindings = args
            .iter()
            .enumerate()
            .map(|(index, ty)| (Type::MethodParam(index), ty.clone()))
            .collect();
        let mut walk = Substitution::new(schema, bindings);
        let mut method = walk.method(self)?;
        method.templates.clear();
        Ok(method)
    }
}
