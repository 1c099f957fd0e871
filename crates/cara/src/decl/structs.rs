// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct declarations: fields, union groups and nested declarations.

use super::{AnnotationValue, Decl, Nested};
use crate::types::Type;
use crate::value::{Key, Value};
use crate::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// A struct field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Unique within the owning struct; the field's slot in the id-keyed encoding.
    pub id: u32,
    pub name: String,
    pub ty: Type,
    pub annotations: Vec<AnnotationValue>,
    /// Explicit default; a fresh copy is produced on every read.
    pub default: Option<Value>,
}

impl Field {
    pub fn new(id: u32, name: impl Into<String>, ty: Type) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            annotations: Vec::new(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_annotation(mut self, annotation: AnnotationValue) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Whether a zero value read from an absent slot is kept in the container.
    ///
    /// Builtins are produced on every read; declaration-typed zero values
    /// are cached so later reads observe the same slot.
    pub(crate) fn caches_zero(&self) -> bool {
        self.default.is_none() && matches!(self.ty, Type::Struct(_) | Type::Enum(_) | Type::List(_))
    }
}

/// Structural data for [`StructDecl::finish`].
#[derive(Debug, Clone, Default)]
pub struct StructDef {
    pub fields: Vec<Field>,
    /// Ids of the mutually exclusive union members.
    pub union: Vec<u32>,
    pub annotations: Vec<AnnotationValue>,
    pub nested: Vec<Decl>,
}

impl StructDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a field that belongs to the struct's union.
    pub fn union_field(mut self, field: Field) -> Self {
        self.union.push(field.id);
        self.fields.push(field);
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

pub(crate) struct StructBody {
    /// Sorted by id.
    fields: Vec<Field>,
    by_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
    union: BTreeSet<u32>,
    annotations: Vec<AnnotationValue>,
    nested: Nested,
}

impl StructBody {
    fn build(name: &str, def: StructDef) -> Result<Self> {
        let StructDef {
            mut fields,
            union,
            annotations,
            nested,
        } = def;
        fields.sort_by_key(|f| f.id);

        let mut by_id = HashMap::with_capacity(fields.len());
        let mut by_name = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if by_id.insert(field.id, index).is_some() {
                return Err(Error::InvalidDeclaration(format!(
                    "{}: duplicate field id {}",
                    name, field.id
                )));
            }
            if by_name.insert(field.name.clone(), index).is_some() {
                return Err(Error::InvalidDeclaration(format!(
                    "{}: duplicate field name {}",
                    name, field.name
                )));
            }
        }

        let union: BTreeSet<u32> = union.into_iter().collect();
        if let Some(stray) = union.iter().find(|id| !by_id.contains_key(id)) {
            return Err(Error::InvalidDeclaration(format!(
                "{}: union member {} is not a field",
                name, stray
            )));
        }

        Ok(Self {
            fields,
            by_id,
            by_name,
            union,
            annotations,
            nested: Nested::build(name, nested)?,
        })
    }
}

decl_handle!(
    /// Handle to a struct declaration.
    StructDecl,
    StructBody
);

generic_handle!(StructDecl, Struct);

impl StructDecl {
    /// Attach the structural data. Valid exactly once.
    pub fn finish(&self, def: StructDef) -> Result<()> {
        if self.is_finished() {
            return Err(Error::AlreadyFinished(self.name().to_string()));
        }
        let body = StructBody::build(self.name(), def)?;
        let count = body.fields.len();
        self.0.publish(body)?;
        log::debug!(
            "[decl] finished struct {} (id={}, {} fields)",
            self.name(),
            self.id(),
            count
        );
        Ok(())
    }

    /// Fields in id order.
    pub fn fields(&self) -> Result<&[Field]> {
        Ok(&self.body()?.fields)
    }

    /// Resolve a field by id, name, or ASCII-encoded name.
    pub fn field(&self, key: &Key) -> Result<&Field> {
        match key {
            Key::Id(id) => self.field_by_id(*id),
            Key::Name(name) => self.field_by_name(name),
            Key::Bytes(bytes) => {
                if !bytes.is_ascii() {
                    return Err(Error::unknown_field(self.name(), key));
                }
                let name = String::from_utf8_lossy(bytes);
                self.field_by_name(&name)
            }
        }
    }

    pub fn field_by_id(&self, id: u32) -> Result<&Field> {
        let body = self.body()?;
        body.by_id
            .get(&id)
            .map(|&index| &body.fields[index])
            .ok_or_else(|| Error::unknown_field(self.name(), id))
    }

    pub fn field_by_name(&self, name: &str) -> Result<&Field> {
        let body = self.body()?;
        body.by_name
            .get(name)
            .map(|&index| &body.fields[index])
            .ok_or_else(|| Error::unknown_field(self.name(), name))
    }

    /// Ids of the union members, ascending.
    pub fn union_members(&self) -> Result<&BTreeSet<u32>> {
        Ok(&self.body()?.union)
    }

    pub fn is_union_member(&self, id: u32) -> bool {
        self.body().is_ok_and(|body| body.union.contains(&id))
    }

    pub fn annotations(&self) -> Result<&[AnnotationValue]> {
        Ok(&self.body()?.annotations)
    }

    /// Nested declaration by name.
    pub fn nested(&self, name: &str) -> Result<&Decl> {
        self.body()?.nested.get(self.name(), name)
    }

    pub fn nested_decls(&self) -> Result<&[Decl]> {
        Ok(self.body()?.nested.all())
    }
}
