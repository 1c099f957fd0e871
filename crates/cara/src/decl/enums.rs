// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum declarations and enum values.

use super::AnnotationValue;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// One member of an enum.
#[derive(Debug, Clone)]
pub struct Enumerant {
    pub name: String,
    pub ordinal: u16,
    pub annotations: Vec<AnnotationValue>,
}

impl Enumerant {
    pub fn new(name: impl Into<String>, ordinal: u16) -> Self {
        Self {
            name: name.into(),
            ordinal,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: AnnotationValue) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Structural data for [`EnumDecl::finish`].
#[derive(Debug, Clone, Default)]
pub struct EnumDef {
    pub enumerants: Vec<Enumerant>,
    pub annotations: Vec<AnnotationValue>,
}

impl EnumDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an enumerant whose ordinal is its position.
    pub fn enumerant(mut self, name: impl Into<String>) -> Self {
        let ordinal = self.enumerants.len() as u16;
        self.enumerants.push(Enumerant::new(name, ordinal));
        self
    }

    pub fn with(mut self, enumerant: Enumerant) -> Self {
        self.enumerants.push(enumerant);
        self
    }

    pub fn annotation(mut self, annotation: AnnotationValue) -> Self {
        self.annotations.push(annotation);
        self
    }
}

pub(crate) struct EnumBody {
    enumerants: Vec<Enumerant>,
    by_ordinal: HashMap<u16, usize>,
    by_name: HashMap<String, usize>,
    annotations: Vec<AnnotationValue>,
}

decl_handle!(
    /// Handle to an enum declaration.
    EnumDecl,
    EnumBody
);

impl EnumDecl {
    pub fn finish(&self, def: EnumDef) -> Result<()> {
        if self.is_finished() {
            return Err(Error::AlreadyFinished(self.name().to_string()));
        }
        let mut by_ordinal = HashMap::new();
        let mut by_name = HashMap::new();
        for (index, e) in def.enumerants.iter().enumerate() {
            if by_ordinal.insert(e.ordinal, index).is_some()
                || by_name.insert(e.name.clone(), index).is_some()
            {
                return Err(Error::InvalidDeclaration(format!(
                    "{}: duplicate enumerant {} ({})",
                    self.name(),
                    e.name,
                    e.ordinal
                )));
            }
        }
        self.0.publish(EnumBody {
            enumerants: def.enumerants,
            by_ordinal,
            by_name,
            annotations: def.annotations,
        })?;
        log::debug!("[decl] finished enum {} (id={})", self.name(), self.id());
        Ok(())
    }

    pub fn enumerants(&self) -> Result<&[Enumerant]> {
        Ok(&self.body()?.enumerants)
    }

    pub fn by_ordinal(&self, ordinal: u16) -> Result<&Enumerant> {
        let body = self.body()?;
        body.by_ordinal
            .get(&ordinal)
            .map(|&i| &body.enumerants[i])
            .ok_or_else(|| self.unknown(ordinal))
    }

    pub fn by_name(&self, name: &str) -> Result<&Enumerant> {
        let body = self.body()?;
        body.by_name
            .get(name)
            .map(|&i| &body.enumerants[i])
            .ok_or_else(|| self.unknown(name))
    }

    pub fn annotations(&self) -> Result<&[AnnotationValue]> {
        Ok(&self.body()?.annotations)
    }

    /// Value for the enumerant called `name`.
    pub fn value(&self, name: &str) -> Result<EnumValue> {
        let ordinal = self.by_name(name)?.ordinal;
        Ok(EnumValue {
            decl: self.clone(),
            ordinal,
        })
    }

    /// Value for `ordinal`, which must name an enumerant.
    pub fn from_ordinal(&self, ordinal: u16) -> Result<EnumValue> {
        self.by_ordinal(ordinal)?;
        Ok(EnumValue {
            decl: self.clone(),
            ordinal,
        })
    }

    /// First enumerant: the value of an enum field never assigned.
    pub fn zero(&self) -> Result<EnumValue> {
        let ordinal = self
            .enumerants()?
            .first()
            .map(|e| e.ordinal)
            .ok_or_else(|| Error::InvalidDeclaration(format!("{} has no enumerants", self.name())))?;
        Ok(EnumValue {
            decl: self.clone(),
            ordinal,
        })
    }

    fn unknown(&self, value: impl fmt::Display) -> Error {
        Error::UnknownEnumerant {
            decl: self.name().to_string(),
            value: value.to_string(),
        }
    }
}

/// An enum value; identity is the ordinal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    decl: EnumDecl,
    ordinal: u16,
}

impl EnumValue {
    pub fn decl(&self) -> &EnumDecl {
        &self.decl
    }

    pub fn ordinal(&self) -> u16 {
        self.ordinal
    }

    pub fn enumerant(&self) -> Result<&Enumerant> {
        self.decl.by_ordinal(self.ordinal)
    }

    pub fn name(&self) -> Result<&str> {
        Ok(&self.enumerant()?.name)
    }

    pub fn annotations(&self) -> Result<&[AnnotationValue]> {
        Ok(&self.enumerant()?.annotations)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Ok(name) => write!(f, "{}.{}", self.decl.name(), name),
            Err(_) => write!(f, "{}({})", self.decl.name(), self.ordinal),
        }
    }
}

impl fmt::Debug for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
