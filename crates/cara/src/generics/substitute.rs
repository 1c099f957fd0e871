// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One substitution pass over a declaration graph.

use super::{Applied, Generic, TemplateParam};
use crate::decl::{
    Decl, Field, InterfaceDecl, InterfaceDef, Method, Param, StructDecl, StructDef,
};
use crate::schema::Schema;
use crate::types::Type;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Replaces every `from` type with its `to` counterpart.
///
/// `from` is usually a template variable but may be any type. Copies of
/// non-generic declarations are memoized for the whole pass and inserted
/// before their bodies are walked, which is what terminates cycles.
pub(crate) struct Substitution<'s> {
    schema: &'s Schema,
    bindings: Vec<(Type, Type)>,
    structs: HashMap<StructDecl, StructDecl>,
    interfaces: HashMap<InterfaceDecl, InterfaceDecl>,
}

impl<'s> Substitution<'s> {
    pub(crate) fn new(schema: &'s Schema, bindings: Vec<(Type, Type)>) -> Self {
        Self {
            schema,
            bindings,
            structs: HashMap::new(),
            interfaces: HashMap::new(),
        }
    }

    fn lookup(&self, ty: &Type) -> Option<&Type> {
        self.bindings
            .iter()
            .find(|(from, _)| from == ty)
            .map(|(_, to)| to)
    }

    pub(crate) fn ty(&mut self, ty: &Type) -> Result<Type> {
        if let Some(to) = self.lookup(ty) {
            return Ok(to.clone());
        }
        match ty {
            Type::Builtin(_) | Type::Enum(_) | Type::Param(_) | Type::MethodParam(_) => {
                Ok(ty.clone())
            }
            Type::List(list) => {
                let element = self.ty(list.element())?;
                if element == *list.element() {
                    Ok(ty.clone())
                } else {
                    Ok(Type::List(self.schema.list_of(element)))
                }
            }
            Type::Struct(decl) => self.struct_type(decl),
            Type::Interface(decl) => self.interface_type(decl),
            Type::Applied(applied) => self.applied(applied),
        }
    }

    /// Bindings in this pass for `generic`'s own template variables.
    fn local_bindings(&self, generic: &Generic) -> Vec<(usize, Type)> {
        self.bindings
            .iter()
            .filter_map(|(from, to)| match from {
                Type::Param(TemplateParam { owner, index }) if owner == generic => {
                    Some((*index, to.clone()))
                }
                _ => None,
            })
            .collect()
    }

    fn generic_type(&mut self, generic: Generic) -> Result<Type> {
        let bound = self.local_bindings(&generic);
        if bound.is_empty() {
            return Ok(generic.to_type());
        }
        self.schema.apply_bindings(&generic, bound)
    }

    fn applied(&mut self, applied: &Applied) -> Result<Type> {
        let bindings = applied
            .bindings
            .iter()
            .map(|(index, ty)| Ok((*index, self.ty(ty)?)))
            .collect::<Result<Vec<_>>>()?;
        self.schema.apply_bindings(&applied.target, bindings)
    }

    fn struct_type(&mut self, decl: &StructDecl) -> Result<Type> {
        if decl.is_generic() {
            return self.generic_type(Generic::Struct(decl.clone()));
        }
        if let Some(copy) = self.structs.get(decl) {
            return Ok(Type::Struct(copy.clone()));
        }
        let ty = Type::Struct(decl.clone());
        if !self.mentions(&ty, &mut HashSet::new()) {
            return Ok(ty);
        }
        let copy = StructDecl::declare(decl.name(), decl.id());
        self.structs.insert(decl.clone(), copy.clone());
        self.copy_struct_body(decl, &copy)?;
        Ok(Type::Struct(copy))
    }

    fn interface_type(&mut self, decl: &InterfaceDecl) -> Result<Type> {
        if decl.is_generic() {
            return self.generic_type(Generic::Interface(decl.clone()));
        }
        if let Some(copy) = self.interfaces.get(decl) {
            return Ok(Type::Interface(copy.clone()));
        }
        let ty = Type::Interface(decl.clone());
        if !self.mentions(&ty, &mut HashSet::new()) {
            return Ok(ty);
        }
        let copy = InterfaceDecl::declare(decl.name(), decl.id());
        self.interfaces.insert(decl.clone(), copy.clone());
        self.copy_interface_body(decl, &copy)?;
        Ok(Type::Interface(copy))
    }

    /// Whether walking `ty` would change anything.
    ///
    /// Unfinished declarations cannot be inspected yet and count as
    /// unaffected.
    fn mentions(&self, ty: &Type, visited: &mut HashSet<Decl>) -> bool {
        if self.lookup(ty).is_some() {
            return true;
        }
        match ty {
            Type::Builtin(_) | Type::Enum(_) | Type::Param(_) | Type::MethodParam(_) => false,
            Type::List(list) => self.mentions(list.element(), visited),
            Type::Applied(applied) => {
                self.mentions(&applied.target.to_type(), visited)
                    || applied.bindings.iter().any(|(_, t)| self.mentions(t, visited))
            }
            Type::Struct(decl) => {
                if decl.is_generic() {
                    return !self.local_bindings(&Generic::Struct(decl.clone())).is_empty();
                }
                if self.structs.contains_key(decl) {
                    return true;
                }
                if !visited.insert(Decl::Struct(decl.clone())) {
                    return false;
                }
                let (Ok(fields), Ok(nested)) = (decl.fields(), decl.nested_decls()) else {
                    return false;
                };
                fields.iter().any(|f| self.mentions(&f.ty, visited))
                    || self.nested_mention(nested, visited)
            }
            Type::Interface(decl) => {
                if decl.is_generic() {
                    return !self.local_bindings(&Generic::Interface(decl.clone())).is_empty();
                }
                if self.interfaces.contains_key(decl) {
                    return true;
                }
                if !visited.insert(Decl::Interface(decl.clone())) {
                    return false;
                }
                let (Ok(methods), Ok(superclasses), Ok(nested)) =
                    (decl.methods(), decl.superclasses(), decl.nested_decls())
                else {
                    return false;
                };
                methods.iter().any(|m| {
                    m.params
                        .iter()
                        .chain(&m.results)
                        .any(|p| self.mentions(&p.ty, visited))
                }) || superclasses
                    .iter()
                    .any(|s| self.mentions(&Type::Interface(s.clone()), visited))
                    || self.nested_mention(nested, visited)
            }
        }
    }

    fn nested_mention(&self, nested: &[Decl], visited: &mut HashSet<Decl>) -> bool {
        nested
            .iter()
            .filter_map(Decl::as_type)
            .any(|ty| self.mentions(&ty, visited))
    }

    fn fields(&mut self, fields: &[Field]) -> Result<Vec<Field>> {
        fields
            .iter()
            .map(|field| {
                Ok(Field {
                    ty: self.ty(&field.ty)?,
                    ..field.clone()
                })
            })
            .collect()
    }

    fn params(&mut self, params: &[Param]) -> Result<Vec<Param>> {
        params
            .iter()
            .map(|param| {
                Ok(Param {
                    ty: self.ty(&param.ty)?,
                    ..param.clone()
                })
            })
            .collect()
    }

    pub(crate) fn method(&mut self, method: &Method) -> Result<Method> {
        Ok(Method {
            params: self.params(&method.params)?,
            results: self.params(&method.results)?,
            ..method.clone()
        })
    }

    fn nested(&mut self, nested: &[Decl]) -> Result<Vec<Decl>> {
        let mut out = Vec::with_capacity(nested.len());
        for decl in nested {
            let replaced = match decl.as_type() {
                Some(ty) => match self.ty(&ty)? {
                    Type::Struct(d) => Decl::Struct(d),
                    Type::Enum(d) => Decl::Enum(d),
                    Type::Interface(d) => Decl::Interface(d),
                    _ => decl.clone(),
                },
                None => decl.clone(),
            };
            out.push(replaced);
        }
        Ok(out)
    }

    pub(crate) fn copy_struct_body(&mut self, source: &StructDecl, target: &StructDecl) -> Result<()> {
        let def = StructDef {
            fields: self.fields(source.fields()?)?,
            union: source.union_members()?.iter().copied().collect(),
            annotations: source.annotations()?.to_vec(),
            nested: self.nested(source.nested_decls()?)?,
        };
        target.finish(def)
    }

    pub(crate) fn copy_interface_body(
        &mut self,
        source: &InterfaceDecl,
        target: &InterfaceDecl,
    ) -> Result<()> {
        let methods = source
            .methods()?
            .iter()
            .map(|m| self.method(m))
            .collect::<Result<Vec<_>>>()?;
        let mut superclasses = Vec::new();
        for superclass in source.superclasses()? {
            superclasses.push(match self.interface_type(superclass)? {
                Type::Interface(d) => d,
                _ => superclass.clone(),
            });
        }
        let def = InterfaceDef {
            methods,
            superclasses,
            annotations: source.annotations()?.to_vec(),
            nested: self.nested(source.nested_decls()?)?,
        };
        target.finish(def)
    }

    /// Finish a freshly declared specialization of `generic`.
    pub(crate) fn finish_copy(&mut self, generic: &Generic, copy: &Type) -> Result<()> {
        match (generic, copy) {
            (Generic::Struct(source), Type::Struct(target)) => self.copy_struct_body(source, target),
            (Generic::Interface(source), Type::Interface(target)) => {
                self.copy_interface_body(source, target)
            }
            _ => Err(Error::InvalidDeclaration(format!(
                "specialization of {} has the wrong kind",
                generic.name()
            ))),
        }
    }
}
