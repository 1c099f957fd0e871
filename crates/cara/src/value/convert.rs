// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The conversion step shared by field assignment, arguments and results.

use super::{Key, StructValue, Value};
use crate::decl::{EnumDecl, StructDecl};
use crate::interface::wrap;
use crate::types::Type;
use crate::value::ListType;
use crate::{Error, Result};

/// Convert `value` to `ty`.
///
/// A pending value is not awaited: the conversion is chained onto it and
/// a new pending value of the target type is returned at once.
pub fn convert(ty: &Type, value: Value) -> Result<Value> {
    if let Value::Pending(deferred) = value {
        let ty = ty.clone();
        return Ok(Value::Pending(deferred.map_ok(move |v| convert(&ty, v))));
    }
    match ty {
        Type::Builtin(kind) => kind.convert(value),
        Type::Struct(decl) => to_struct(decl, value),
        Type::Enum(decl) => to_enum(decl, value),
        Type::List(list) => to_list(list, value),
        Type::Interface(decl) => wrap(decl, value).map(Value::Interface),
        Type::Param(_) | Type::MethodParam(_) | Type::Applied(_) => Ok(value),
    }
}

fn to_struct(decl: &StructDecl, value: Value) -> Result<Value> {
    match value {
        Value::Struct(s) if s.decl() == decl => Ok(Value::Struct(s)),
        Value::Struct(s) => {
            let entries: Vec<(Key, Value)> = s
                .slots()
                .iter()
                .map(|(id, v)| (Key::Id(*id), v.clone()))
                .collect();
            StructValue::from_entries(decl, entries).map(Value::Struct)
        }
        Value::Map(entries) => StructValue::from_entries(decl, entries).map(Value::Struct),
        Value::Void => Ok(Value::Struct(StructValue::new(decl))),
        other => Err(Error::mismatch(decl.name(), other.kind_name())),
    }
}

fn to_enum(decl: &EnumDecl, value: Value) -> Result<Value> {
    if let Value::Enum(e) = &value {
        if e.decl() == decl {
            return Ok(value);
        }
    }
    if let Value::Text(name) = &value {
        return decl.value(name).map(Value::Enum);
    }
    match value.as_i128() {
        Some(ordinal) => {
            let ordinal = u16::try_from(ordinal).map_err(|_| Error::UnknownEnumerant {
                decl: decl.name().to_string(),
                value: ordinal.to_string(),
            })?;
            decl.from_ordinal(ordinal).map(Value::Enum)
        }
        None => Err(Error::mismatch(decl.name(), value.kind_name())),
    }
}

fn to_list(list: &ListType, value: Value) -> Result<Value> {
    match value {
        Value::List(l) if l.ty() == list => Ok(Value::List(l)),
        Value::List(l) => list.create(l.into_items()).map(Value::List),
        Value::Tuple(items) => list.create(items).map(Value::List),
        Value::Void => list.create(Vec::new()).map(Value::List),
        other => Err(Error::mismatch(format!("{:?}", list), other.kind_name())),
    }
}

/// Plain form of a value: structs and interfaces become mappings, lists
/// become tuples, recursively.
pub fn to_plain(value: &Value, with_names: bool) -> Result<Value> {
    Ok(match value {
        Value::Struct(s) => s.to_dict(with_names)?,
        Value::Interface(i) => i.to_dict(with_names)?,
        Value::List(l) => Value::Tuple(
            l.iter()
                .map(|item| to_plain(item, with_names))
                .collect::<Result<_>>()?,
        ),
        Value::Tuple(items) => Value::Tuple(
            items
                .iter()
                .map(|item| to_plain(item, with_names))
                .collect::<Result<_>>()?,
        ),
        Value::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), to_plain(v, with_names)?)))
                .collect::<Result<_>>()?,
        ),
        other => other.clone(),
    })
}
