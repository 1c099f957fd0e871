// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interface declarations, methods and method resolution.

use super::{AnnotationValue, Decl, DeclId, Nested};
use crate::types::Type;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A method parameter or result slot.
#[derive(Debug, Clone)]
pub struct Param {
    pub id: u32,
    pub name: String,
    pub ty: Type,
    pub annotations: Vec<AnnotationValue>,
}

impl Param {
    pub fn new(id: u32, name: impl Into<String>, ty: Type) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: AnnotationValue) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// An interface method.
#[derive(Debug, Clone)]
pub struct Method {
    pub id: u32,
    pub name: String,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub annotations: Vec<AnnotationValue>,
    /// Method-level template variables, referenced as `Type::MethodParam(index)`.
    pub templates: Vec<String>,
}

impl Method {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            params: Vec::new(),
            results: Vec::new(),
            annotations: Vec::new(),
            templates: Vec::new(),
        }
    }

    /// Append a parameter; its id is its position.
    pub fn param(mut self, name: impl Into<String>, ty: Type) -> Self {
        let id = self.params.len() as u32;
        self.params.push(Param::new(id, name, ty));
        self
    }

    /// Append a result slot; its id is its position.
    pub fn result(mut self, name: impl Into<String>, ty: Type) -> Self {
        let id = self.results.len() as u32;
        self.results.push(Param::new(id, name, ty));
        self
    }

    pub fn generic<S: Into<String>>(mut self, templates: impl IntoIterator<Item = S>) -> Self {
        self.templates = templates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationValue) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.templates.is_empty()
    }

    pub fn param_by_name(&self, name: &str) -> Option<(usize, &Param)> {
        self.params.iter().enumerate().find(|(_, p)| p.name == name)
    }
}

/// How a caller names a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKey {
    Name(String),
    Id(u32),
    /// Method `method` of the interface (or ancestor) whose id is `interface`.
    Qualified { interface: DeclId, method: u32 },
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Id(id) => write!(f, "@{}", id),
            Self::Qualified { interface, method } => write!(f, "{:#x}@{}", interface, method),
        }
    }
}

impl From<&str> for MethodKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for MethodKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<u32> for MethodKey {
    fn from(id: u32) -> Self {
        Self::Id(id)
    }
}

impl From<(DeclId, u32)> for MethodKey {
    fn from((interface, method): (DeclId, u32)) -> Self {
        Self::Qualified { interface, method }
    }
}

/// Structural data for [`InterfaceDecl::finish`].
#[derive(Debug, Clone, Default)]
pub struct InterfaceDef {
    pub methods: Vec<Method>,
    pub superclasses: Vec<InterfaceDecl>,
    pub annotations: Vec<AnnotationValue>,
    pub nested: Vec<Decl>,
}

impl InterfaceDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn extends(mut self, superclass: InterfaceDecl) -> Self {
        self.superclasses.push(superclass);
        self
    }

    pub fn annotation(mut self, annotation: AnnotationValue) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn nested(mut self, decl: impl Into<Decl>) -> Self {
        self.nested.push(decl.into());
        self
    }
}

pub(crate) struct InterfaceBody {
    methods: Vec<Method>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
    superclasses: Vec<InterfaceDecl>,
    annotations: Vec<AnnotationValue>,
    nested: Nested,
}

decl_handle!(
    /// Handle to an interface declaration.
    InterfaceDecl,
    InterfaceBody
);

generic_handle!(InterfaceDecl, Interface);

impl InterfaceDecl {
    pub fn finish(&self, def: InterfaceDef) -> Result<()> {
        if self.is_finished() {
            return Err(Error::AlreadyFinished(self.name().to_string()));
        }
        let mut by_id = HashMap::with_capacity(def.methods.len());
        let mut by_name = HashMap::with_capacity(def.methods.len());
        for (index, method) in def.methods.iter().enumerate() {
            if by_id.insert(method.id, index).is_some()
                || by_name.insert(method.name.clone(), index).is_some()
            {
                return Err(Error::InvalidDeclaration(format!(
                    "{}: duplicate method {} (@{})",
                    self.name(),
                    method.name,
                    method.id
                )));
            }
        }
        let count = def.methods.len();
        self.0.publish(InterfaceBody {
            methods: def.methods,
            by_id,
            by_name,
            superclasses: def.superclasses,
            annotations: def.annotations,
            nested: Nested::build(self.name(), def.nested)?,
        })?;
        log::debug!(
            "[decl] finished interface {} (id={}, {} methods)",
            self.name(),
            self.id(),
            count
        );
        Ok(())
    }

    /// Methods declared directly on this interface.
    pub fn methods(&self) -> Result<&[Method]> {
        Ok(&self.body()?.methods)
    }

    pub fn superclasses(&self) -> Result<&[InterfaceDecl]> {
        Ok(&self.body()?.superclasses)
    }

    pub fn annotations(&self) -> Result<&[AnnotationValue]> {
        Ok(&self.body()?.annotations)
    }

    pub fn nested(&self, name: &str) -> Result<&Decl> {
        self.body()?.nested.get(self.name(), name)
    }

    pub fn nested_decls(&self) -> Result<&[Decl]> {
        Ok(self.body()?.nested.all())
    }

    /// Method resolution order: this interface, then superclasses
    /// depth-first in declared order, each interface once.
    pub fn mro(&self) -> Result<Vec<&InterfaceDecl>> {
        let mut order = Vec::new();
        self.collect_mro(&mut order)?;
        Ok(order)
    }

    fn collect_mro<'a>(&'a self, order: &mut Vec<&'a InterfaceDecl>) -> Result<()> {
        if order.iter().any(|seen| seen.ptr_eq(self)) {
            return Ok(());
        }
        order.push(self);
        for superclass in &self.body()?.superclasses {
            superclass.collect_mro(order)?;
        }
        Ok(())
    }

    /// Whether `other` is this interface or one of its ancestors.
    pub fn extends(&self, other: &InterfaceDecl) -> Result<bool> {
        Ok(self.mro()?.iter().any(|d| d.ptr_eq(other)))
    }

    fn own_by_name(&self, name: &str) -> Result<Option<&Method>> {
        let body = self.body()?;
        Ok(body.by_name.get(name).map(|&i| &body.methods[i]))
    }

    fn own_by_id(&self, id: u32) -> Result<Option<&Method>> {
        let body = self.body()?;
        Ok(body.by_id.get(&id).map(|&i| &body.methods[i]))
    }

    /// Resolve `key` along the MRO; returns the declaring interface too.
    pub fn resolve(&self, key: &MethodKey) -> Result<(&InterfaceDecl, &Method)> {
        for decl in self.mro()? {
            let found = match key {
                MethodKey::Name(name) => decl.own_by_name(name)?,
                MethodKey::Id(id) => decl.own_by_id(*id)?,
                MethodKey::Qualified { interface, method } => {
                    if decl.id() != *interface {
                        continue;
                    }
                    decl.own_by_id(*method)?
                }
            };
            if let Some(method) = found {
                return Ok((decl, method));
            }
        }
        Err(Error::unknown_method(self.name(), key))
    }

    /// Every reachable method, first definition of each name winning, in MRO order.
    pub fn all_methods(&self) -> Result<Vec<(&InterfaceDecl, &Method)>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for decl in self.mro()? {
            for method in decl.methods()? {
                if seen.insert(method.name.as_str()) {
                    out.push((decl, method));
                }
            }
        }
        Ok(out)
    }

    /// Number of distinct methods reachable through this interface.
    pub fn method_count(&self) -> Result<usize> {
        Ok(self.all_methods()?.len())
    }
}
