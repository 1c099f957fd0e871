// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide type registries: list types and generic specializations.
//!
//! A [`Schema`] is a cheap handle; clones share the same caches. Every
//! loaded schema that should agree on `List(X)` and `G[X]` identity has to
//! go through the same `Schema`.
//!
//! # Example
//!
//! ```rust
//! use cara::builtin::BuiltinKind;
//! use cara::decl::{Field, StructDecl, StructDef};
//! use cara::schema::Schema;
//! use cara::types::Type;
//!
//! let schema = Schema::new();
//! let boxed = StructDecl::declare_generic("Box", 7, ["T"]);
//! let t = boxed.template(0).expect("template");
//! boxed
//!     .finish(StructDef::new().field(Field::new(0, "value", t)))
//!     .expect("finish");
//!
//! let int_box = schema
//!     .apply(&Type::Struct(boxed.clone()), &[Type::Builtin(BuiltinKind::Int32)])
//!     .expect("specialize");
//! let again = schema
//!     .apply(&Type::Struct(boxed), &[Type::Builtin(BuiltinKind::Int32)])
//!     .expect("specialize");
//! assert_eq!(int_box, again);
//! ```

use crate::decl::Decl;
use crate::generics::{Applied, Generic, SpecializationCache, Substitution};
use crate::types::Type;
use crate::value::{ListCache, ListType};
use crate::{Error, Result};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Schema {
    lists: Arc<ListCache>,
    specializations: Arc<SpecializationCache>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// `List(element)`, identical for equal element types.
    pub fn list_of(&self, element: Type) -> ListType {
        self.lists.list_of(element)
    }

    pub fn list_type_count(&self) -> usize {
        self.lists.len()
    }

    pub fn specialization_count(&self) -> usize {
        self.specializations.len()
    }

    /// Bind the next template variables of `ty` to `args`.
    ///
    /// `ty` is a generic struct or interface, or an [`Applied`] type whose
    /// remaining variables are filled in order. Binding every variable to
    /// a concrete type gives the cached specialization; anything less
    /// gives an `Applied` type.
    pub fn apply(&self, ty: &Type, args: &[Type]) -> Result<Type> {
        if let Type::Applied(applied) = ty {
            let unbound = applied.unbound();
            if args.len() > unbound.len() {
                return Err(Error::TemplateOutOfRange {
                    decl: applied.target.name().to_string(),
                    index: applied.bindings.len() + args.len() - 1,
                    count: applied.target.templates().len(),
                });
            }
            let mut bindings = applied.bindings.clone();
            bindings.extend(unbound.into_iter().zip(args.iter().cloned()));
            return self.apply_bindings(&applied.target, bindings);
        }

        let Some(generic) = Generic::from_type(ty) else {
            return Err(Error::TemplateOutOfRange {
                decl: ty.to_string(),
                index: args.len().saturating_sub(1),
                count: 0,
            });
        };
        let count = generic.templates().len();
        if args.len() > count {
            return Err(Error::TemplateOutOfRange {
                decl: generic.name().to_string(),
                index: args.len() - 1,
                count,
            });
        }
        let bindings = args.iter().cloned().enumerate().collect();
        self.apply_bindings(&generic, bindings)
    }

    /// Bind template variables of `generic` by index.
    pub(crate) fn apply_bindings(
        &self,
        generic: &Generic,
        mut bindings: Vec<(usize, Type)>,
    ) -> Result<Type> {
        let count = generic.templates().len();
        if let Some((index, _)) = bindings.iter().find(|(index, _)| *index >= count) {
            return Err(Error::TemplateOutOfRange {
                decl: generic.name().to_string(),
                index: *index,
                count,
            });
        }
        bindings.sort_by_key(|(index, _)| *index);
        bindings.dedup_by_key(|(index, _)| *index);

        let applied = Applied {
            target: generic.clone(),
            bindings,
        };
        if !applied.is_complete() {
            return Ok(Type::Applied(Arc::new(applied)));
        }
        let args = applied.bindings.into_iter().map(|(_, ty)| ty).collect();
        self.specializations.get_or_create(self, generic, args)
    }

    /// Specialization of `generic` with every template bound, in order.
    pub fn specialize(&self, generic: &Type, args: &[Type]) -> Result<Type> {
        let ty = self.apply(generic, args)?;
        match &ty {
            Type::Applied(applied) => Err(Error::Unspecialized(applied.to_string())),
            _ => Ok(ty),
        }
    }

    /// Copy of `ty` with every `from` replaced by its `to`, at any depth.
    ///
    /// Declarations unaffected by the replacement are returned as is;
    /// affected ones are copied once per call, so cycles through them stay
    /// cycles in the result.
    pub fn replace_types(&self, ty: &Type, replacements: &[(Type, Type)]) -> Result<Type> {
        if replacements.is_empty() {
            return Ok(ty.clone());
        }
        log::debug!(
            "[schema] replacing {} type(s) under {}",
            replacements.len(),
            ty
        );
        Substitution::new(self, replacements.to_vec()).ty(ty)
    }

    /// Nested declaration `name` of a struct or interface type.
    pub fn nested(&self, ty: &Type, name: &str) -> Result<Decl> {
        match ty {
            Type::Struct(decl) => decl.nested(name).cloned(),
            Type::Interface(decl) => decl.nested(name).cloned(),
            Type::Applied(applied) => Err(Error::Unspecialized(format!(
                "{} has no nested declarations until specialized",
                applied
            ))),
            other => Err(Error::NotFound(format!("{}.{}", other, name))),
        }
    }
}
