// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Id-keyed struct container.

use super::convert::{convert, to_plain};
use super::{Key, ListValue, Value};
use crate::decl::{Field, StructDecl};
use crate::interface::Arguments;
use crate::types::Type;
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Value of a struct declaration.
///
/// Storage is keyed by field id; names (and ASCII byte names) are aliases
/// resolved through the declaration. Unset fields read as their default.
#[derive(Clone)]
pub struct StructValue {
    decl: StructDecl,
    slots: BTreeMap<u32, Value>,
}

impl StructValue {
    /// Empty instance: every field reads as its default.
    pub fn new(decl: &StructDecl) -> Self {
        Self {
            decl: decl.clone(),
            slots: BTreeMap::new(),
        }
    }

    /// Build from id-, name- or byte-keyed entries.
    pub fn from_entries<K, V>(decl: &StructDecl, entries: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<Key>,
        V: Into<Value>,
    {
        let mut value = Self::new(decl);
        for (key, field_value) in entries {
            value.set(key, field_value)?;
        }
        Ok(value)
    }

    /// Bind positional arguments to fields in id order, then named ones.
    ///
    /// A field bound both ways is an `ArgumentConflict`.
    pub fn create(decl: &StructDecl, args: Arguments) -> Result<Self> {
        let fields = decl.fields()?;
        if args.positional.len() > fields.len() {
            return Err(Error::TooManyArguments {
                method: decl.name().to_string(),
                expected: fields.len(),
                got: args.positional.len(),
            });
        }
        let mut value = Self::new(decl);
        let mut bound = BTreeSet::new();
        for (field, arg) in fields.iter().zip(args.positional) {
            value.set(field.id, arg)?;
            bound.insert(field.id);
        }
        for (name, arg) in args.named {
            let id = decl.field_by_name(&name)?.id;
            if !bound.insert(id) {
                return Err(Error::ArgumentConflict {
                    decl: decl.name().to_string(),
                    field: name,
                });
            }
            value.set(id, arg)?;
        }
        Ok(value)
    }

    pub fn decl(&self) -> &StructDecl {
        &self.decl
    }

    /// Stored slots, by id.
    pub fn slots(&self) -> &BTreeMap<u32, Value> {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read a field, materializing its default when absent.
    ///
    /// A declaration-typed zero value (struct, enum, list) is cached into
    /// the container so later reads observe the same slot. Union members
    /// are never cached on read.
    pub fn get(&mut self, key: impl Into<Key>) -> Result<Value> {
        let field = self.decl.field(&key.into())?;
        if let Some(value) = self.slots.get(&field.id) {
            return Ok(value.clone());
        }
        let value = default_for(&self.decl, field)?;
        if field.caches_zero() && !self.decl.is_union_member(field.id) {
            self.slots.insert(field.id, value.clone());
        }
        Ok(value)
    }

    /// Read a field without caching a default.
    pub fn peek(&self, key: impl Into<Key>) -> Result<Value> {
        let field = self.decl.field(&key.into())?;
        match self.slots.get(&field.id) {
            Some(value) => Ok(value.clone()),
            None => default_for(&self.decl, field),
        }
    }

    /// Mutable access to a field, storing its default first when absent.
    ///
    /// Materializing a union member makes it the active member.
    pub fn get_mut(&mut self, key: impl Into<Key>) -> Result<&mut Value> {
        let field = self.decl.field(&key.into())?;
        let id = field.id;
        if !self.slots.contains_key(&id) {
            let value = default_for(&self.decl, field)?;
            self.clear_union_except(id);
            self.slots.insert(id, value);
        }
        self.slots
            .get_mut(&id)
            .ok_or_else(|| Error::unknown_field(self.decl.name(), id))
    }

    /// Assign a field through the conversion step for its type.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<()> {
        let field = self.decl.field(&key.into())?;
        let id = field.id;
        let value = convert(&field.ty, value.into())?;
        self.clear_union_except(id);
        self.slots.insert(id, value);
        Ok(())
    }

    fn clear_union_except(&mut self, id: u32) {
        if let Ok(members) = self.decl.union_members() {
            if members.contains(&id) {
                self.slots
                    .retain(|slot, _| *slot == id || !members.contains(slot));
            }
        }
    }

    /// Whether a slot is stored (defaults do not count).
    pub fn contains(&self, key: impl Into<Key>) -> Result<bool> {
        let field = self.decl.field(&key.into())?;
        Ok(self.slots.contains_key(&field.id))
    }

    pub fn remove(&mut self, key: impl Into<Key>) -> Result<Option<Value>> {
        let id = self.decl.field(&key.into())?.id;
        Ok(self.slots.remove(&id))
    }

    /// Stored fields in id order.
    pub fn fields(&self) -> Result<Vec<(&Field, &Value)>> {
        self.slots
            .iter()
            .map(|(id, value)| Ok((self.decl.field_by_id(*id)?, value)))
            .collect()
    }

    /// Active union member, if any is stored.
    pub fn which(&self) -> Result<Option<&Field>> {
        let members = self.decl.union_members()?;
        match self.slots.keys().find(|id| members.contains(id)) {
            Some(id) => self.decl.field_by_id(*id).map(Some),
            None => Ok(None),
        }
    }

    /// Plain mapping of the stored fields, recursing into nested values.
    pub fn to_dict(&self, with_names: bool) -> Result<Value> {
        let mut out = BTreeMap::new();
        for (id, value) in &self.slots {
            let key = if with_names {
                Key::Name(self.decl.field_by_id(*id)?.name.clone())
            } else {
                Key::Id(*id)
            };
            out.insert(key, to_plain(value, with_names)?);
        }
        Ok(Value::Map(out))
    }

    /// Replace slots holding an already-resolved pending value by that value.
    pub fn settle(&mut self) {
        for value in self.slots.values_mut() {
            if let Value::Pending(deferred) = value {
                if let Some(Ok(resolved)) = deferred.try_get() {
                    *value = resolved;
                }
            }
        }
    }

    /// Current value of every declared field, defaults included, in id
    /// order. An absent interface field reads as `Void`.
    fn current_values(&self) -> Vec<(u32, Value)> {
        let Ok(fields) = self.decl.fields() else {
            return Vec::new();
        };
        fields
            .iter()
            .map(|field| {
                let value = match self.slots.get(&field.id) {
                    Some(value) => value.clone(),
                    None => default_for(&self.decl, field).unwrap_or(Value::Void),
                };
                (field.id, value)
            })
            .collect()
    }
}

fn default_for(decl: &StructDecl, field: &Field) -> Result<Value> {
    if let Some(default) = &field.default {
        return convert(&field.ty, default.clone());
    }
    Ok(match &field.ty {
        Type::Builtin(kind) => kind.zero(),
        Type::Struct(nested) => Value::Struct(StructValue::new(nested)),
        Type::Enum(e) => Value::Enum(e.zero()?),
        Type::List(list) => Value::List(ListValue::new(list)),
        Type::Interface(_) => {
            return Err(Error::NoDefault {
                decl: decl.name().to_string(),
                field: field.name.clone(),
            })
        }
        Type::Param(_) | Type::MethodParam(_) | Type::Applied(_) => Value::Void,
    })
}

/// Fields are compared by current value, defaults included. A field whose
/// value is falsy on both sides is skipped, so a field explicitly set to
/// zero compares equal to one never set.
impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        if self.decl != other.decl {
            return false;
        }
        self.current_values()
            .into_iter()
            .zip(other.current_values())
            .all(|((_, a), (_, b))| (!a.is_truthy() && !b.is_truthy()) || a == b)
    }
}

impl Hash for StructValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.decl.hash(state);
        // Nested structs are left out: a stored all-zero struct is truthy
        // yet equal to an empty one.
        for (id, value) in self.current_values() {
            if value.is_truthy() && !matches!(value, Value::Struct(_)) {
                id.hash(state);
                value.hash(state);
            }
        }
    }
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({{", self.decl.name())?;
        for (i, (id, value)) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match self.decl.field_by_id(*id) {
                Ok(field) => write!(f, "{}: {}", field.name, value)?,
                Err(_) => write!(f, "{}: {}", id, value)?,
            }
        }
        f.write_str("})")
    }
}

impl fmt::Debug for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
