// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sequence types and the list-type cache.

use super::convert::convert;
use super::Value;
use crate::config::FIELD_PATH_SEPARATOR;
use crate::types::Type;
use crate::{Error, Result};
use dashmap::DashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

struct ListTypeInner {
    element: Type,
}

/// A sequence type specialized to one element type.
///
/// Handles come from [`ListCache::list_of`], so equal element types share
/// one handle.
#[derive(Clone)]
pub struct ListType(Arc<ListTypeInner>);

impl ListType {
    fn new(element: Type) -> Self {
        Self(Arc::new(ListTypeInner { element }))
    }

    pub fn element(&self) -> &Type {
        &self.0.element
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Build a list, converting every item to the element type.
    pub fn create(&self, items: impl IntoIterator<Item = Value>) -> Result<ListValue> {
        let items = items
            .into_iter()
            .map(|item| convert(self.element(), item))
            .collect::<Result<Vec<_>>>()?;
        Ok(ListValue {
            ty: self.clone(),
            items,
        })
    }
}

impl PartialEq for ListType {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.element() == other.element()
    }
}

impl Eq for ListType {}

impl Hash for ListType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.element().hash(state);
    }
}

impl fmt::Debug for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "List({})", self.element())
    }
}

/// Memoized list types keyed by element type.
#[derive(Default)]
pub struct ListCache {
    types: DashMap<Type, ListType>,
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The list type for `element`, created on first request.
    pub fn list_of(&self, element: Type) -> ListType {
        if let Some(existing) = self.types.get(&element) {
            return existing.clone();
        }
        self.types
            .entry(element.clone())
            .or_insert_with(|| {
                log::debug!("[schema] new list type List({})", element);
                ListType::new(element)
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// A typed sequence value.
#[derive(Clone)]
pub struct ListValue {
    ty: ListType,
    items: Vec<Value>,
}

impl ListValue {
    pub fn new(ty: &ListType) -> Self {
        Self {
            ty: ty.clone(),
            items: Vec::new(),
        }
    }

    pub fn ty(&self) -> &ListType {
        &self.ty
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn index(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn push(&mut self, item: impl Into<Value>) -> Result<()> {
        let item = convert(self.ty.element(), item.into())?;
        self.items.push(item);
        Ok(())
    }

    /// First struct element whose fields match every filter.
    ///
    /// Filter keys may name nested fields with `a__b` paths.
    pub fn get(&self, filters: &[(&str, Value)]) -> Result<&Value> {
        if !matches!(self.ty.element(), Type::Struct(_)) {
            return Err(Error::NotStructList(format!("{:?}", self.ty)));
        }
        for item in &self.items {
            if matches_filters(item, filters)? {
                return Ok(item);
            }
        }
        let wanted: Vec<String> = filters
            .iter()
            .map(|(path, value)| format!("{}={}", path, value))
            .collect();
        Err(Error::NotFound(format!("{:?} where {}", self.ty, wanted.join(", "))))
    }
}

fn matches_filters(item: &Value, filters: &[(&str, Value)]) -> Result<bool> {
    for (path, expected) in filters {
        let mut current = item.clone();
        for segment in path.split(FIELD_PATH_SEPARATOR) {
            current = match &current {
                Value::Struct(s) => s.peek(segment)?,
                other => return Err(Error::mismatch("Struct", other.kind_name())),
            };
        }
        if current != *expected {
            return Ok(false);
        }
    }
    Ok(true)
}

impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<'a> IntoIterator for &'a ListValue {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
