// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Arguments, Callable, InterfaceValue};
use crate::decl::{InterfaceDecl, Method};
use crate::schema::Schema;
use crate::types::Type;
use crate::value::{convert, Key, Value};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// A method bound to the interface value it is called on.
#[derive(Clone)]
pub struct BoundMethod {
    value: InterfaceValue,
    owner: InterfaceDecl,
    method: Method,
}

impl BoundMethod {
    pub(crate) fn new(value: InterfaceValue, owner: InterfaceDecl, method: Method) -> Self {
        Self {
            value,
            owner,
            method,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Interface that declares the method (the receiver or an ancestor).
    pub fn owner(&self) -> &InterfaceDecl {
        &self.owner
    }

    /// Bind the method's own template variables.
    pub fn specialize(&self, schema: &Schema, args: &[Type]) -> Result<BoundMethod> {
        Ok(Self {
            value: self.value.clone(),
            owner: self.owner.clone(),
            method: self.method.specialize(schema, args)?,
        })
    }
}

impl Callable for BoundMethod {
    fn call(&self, args: Arguments) -> Result<Value> {
        if self.method.is_generic() {
            return Err(Error::Unspecialized(format!(
                "{}.{}",
                self.owner.name(),
                self.method.name
            )));
        }
        invoke(&self.value, &self.owner, &self.method, args)
    }
}

pub(crate) fn invoke(
    value: &InterfaceValue,
    owner: &InterfaceDecl,
    method: &Method,
    args: Arguments,
) -> Result<Value> {
    let args = bind_arguments(method, args)?;
    let raw = value.dispatch_to_target(owner, method, args)?;
    pack_results(method, raw)
}

/// Match arguments against the declared params, converting each.
fn bind_arguments(method: &Method, args: Arguments) -> Result<Arguments> {
    if args.positional.len() > method.params.len() {
        return Err(Error::TooManyArguments {
            method: method.name.clone(),
            expected: method.params.len(),
            got: args.positional.len(),
        });
    }
    let bound = args.positional.len();
    let positional = method
        .params
        .iter()
        .zip(args.positional)
        .map(|(param, arg)| convert(&param.ty, arg))
        .collect::<Result<Vec<_>>>()?;

    let mut named = BTreeMap::new();
    for (name, arg) in args.named {
        let (index, param) = method.param_by_name(&name).ok_or_else(|| Error::ParamNotFound {
            method: method.name.clone(),
            param: name.clone(),
        })?;
        if index < bound {
            return Err(Error::ArgumentConflict {
                decl: method.name.clone(),
                field: name,
            });
        }
        named.insert(name, convert(&param.ty, arg)?);
    }
    Ok(Arguments { positional, named })
}

/// Reconcile a callee's return value with the declared results.
///
/// - no results: the value passes through;
/// - one result: a single-key mapping named after the result is unboxed,
///   then the value is converted to the result type;
/// - several results: a sequence of the right length is zipped with the
///   result names, a mapping must have exactly the result names as keys.
pub fn pack_results(method: &Method, raw: Value) -> Result<Value> {
    if let Value::Pending(deferred) = raw {
        let method = method.clone();
        return Ok(Value::Pending(
            deferred.map_ok(move |resolved| pack_results(&method, resolved)),
        ));
    }
    match method.results.as_slice() {
        [] => Ok(raw),
        [only] => {
            let raw = match raw {
                Value::Map(mut entries)
                    if entries.len() == 1 && entries.contains_key(&Key::Name(only.name.clone())) =>
                {
                    entries
                        .remove(&Key::Name(only.name.clone()))
                        .unwrap_or(Value::Void)
                }
                other => other,
            };
            convert(&only.ty, raw)
        }
        results => {
            let expected = results.len();
            let mut packed = BTreeMap::new();
            match raw {
                Value::Tuple(items) if items.len() == expected => {
                    for (result, item) in results.iter().zip(items) {
                        packed.insert(Key::Name(result.name.clone()), convert(&result.ty, item)?);
                    }
                }
                Value::List(list) if list.len() == expected => {
                    for (result, item) in results.iter().zip(list.into_items()) {
                        packed.insert(Key::Name(result.name.clone()), convert(&result.ty, item)?);
                    }
                }
                Value::Map(mut entries)
                    if entries.len() == expected
                        && results
                            .iter()
                            .all(|r| entries.contains_key(&Key::Name(r.name.clone()))) =>
                {
                    for result in results {
                        let key = Key::Name(result.name.clone());
                        let item = entries.remove(&key).unwrap_or(Value::Void);
                        packed.insert(key, convert(&result.ty, item)?);
                    }
                }
                other => {
                    return Err(Error::ResultArityMismatch {
                        method: method.name.clone(),
                        expected,
                        got: describe_shape(&other),
                    })
                }
            }
            Ok(Value::Map(packed))
        }
    }
}

fn describe_shape(value: &Value) -> String {
    match value {
        Value::Tuple(items) => format!("tuple of {}", items.len()),
        Value::List(list) => format!("list of {}", list.len()),
        Value::Map(entries) => {
            let keys: Vec<String> = entries.keys().map(ToString::to_string).collect();
            format!("mapping with keys [{}]", keys.join(", "))
        }
        other => other.kind_name().to_string(),
    }
}
