// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Constant and annotation declarations.

use crate::types::Type;
use crate::value::{convert, Value};
use crate::{Error, Result};

pub(crate) struct ConstBody {
    ty: Type,
    value: Value,
    annotations: Vec<AnnotationValue>,
}

decl_handle!(
    /// Handle to a named constant.
    ConstDecl,
    ConstBody
);

impl ConstDecl {
    /// Finish with the constant's type and value; the value goes through
    /// the conversion step for `ty`.
    pub fn finish(&self, ty: Type, value: Value, annotations: Vec<AnnotationValue>) -> Result<()> {
        if self.is_finished() {
            return Err(Error::AlreadyFinished(self.name().to_string()));
        }
        let value = convert(&ty, value)?;
        self.0.publish(ConstBody {
            ty,
            value,
            annotations,
        })?;
        log::debug!("[decl] finished const {} (id={})", self.name(), self.id());
        Ok(())
    }

    pub fn ty(&self) -> Result<&Type> {
        Ok(&self.body()?.ty)
    }

    pub fn value(&self) -> Result<&Value> {
        Ok(&self.body()?.value)
    }

    pub fn annotations(&self) -> Result<&[AnnotationValue]> {
        Ok(&self.body()?.annotations)
    }
}

/// Schema elements an annotation may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationTarget {
    File,
    Const,
    Enum,
    Enumerant,
    Struct,
    Field,
    Union,
    Group,
    Interface,
    Method,
    Param,
    Annotation,
}

/// Structural data for [`AnnotationDecl::finish`].
#[derive(Debug, Clone)]
pub struct AnnotationDef {
    pub ty: Type,
    /// Empty means every target.
    pub applies_to: Vec<AnnotationTarget>,
    pub annotations: Vec<AnnotationValue>,
}

impl AnnotationDef {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            applies_to: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn applies_to(mut self, target: AnnotationTarget) -> Self {
        self.applies_to.push(target);
        self
    }
}

pub(crate) struct AnnotationBody {
    def: AnnotationDef,
}

decl_handle!(
    /// Handle to an annotation declaration.
    AnnotationDecl,
    AnnotationBody
);

impl AnnotationDecl {
    pub fn finish(&self, def: AnnotationDef) -> Result<()> {
        if self.is_finished() {
            return Err(Error::AlreadyFinished(self.name().to_string()));
        }
        self.0.publish(AnnotationBody { def })?;
        log::debug!("[decl] finished annotation {} (id={})", self.name(), self.id());
        Ok(())
    }

    pub fn ty(&self) -> Result<&Type> {
        Ok(&self.body()?.def.ty)
    }

    pub fn annotations(&self) -> Result<&[AnnotationValue]> {
        Ok(&self.body()?.def.annotations)
    }

    pub fn applies_to(&self, target: AnnotationTarget) -> Result<bool> {
        let targets = &self.body()?.def.applies_to;
        Ok(targets.is_empty() || targets.contains(&target))
    }

    /// Instantiate the annotation with `value` converted to its type.
    pub fn apply(&self, value: impl Into<Value>) -> Result<AnnotationValue> {
        let value = convert(self.ty()?, value.into())?;
        Ok(AnnotationValue {
            decl: self.clone(),
            value,
        })
    }

    /// Like [`apply`](Self::apply), checking `target` is allowed.
    pub fn apply_to(&self, target: AnnotationTarget, value: impl Into<Value>) -> Result<AnnotationValue> {
        if !self.applies_to(target)? {
            return Err(Error::InvalidDeclaration(format!(
                "annotation {} cannot be applied to {:?}",
                self.name(),
                target
            )));
        }
        self.apply(value)
    }
}

/// An annotation instance attached to a declaration, field, method or param.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationValue {
    decl: AnnotationDecl,
    value: Value,
}

impl AnnotationValue {
    pub fn decl(&self) -> &AnnotationDecl {
        &self.decl
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}
