// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::too_many_lines)] // Test code

//! Generic specialization integration tests
//!
//! Identity-stable caching, partial application, cycle-safe substitution
//! and declaration-type replacement.

use cara::builtin::BuiltinKind;
use cara::decl::{Decl, Field, InterfaceDecl, InterfaceDef, Method, StructDecl, StructDef};
use cara::interface::{wrap, Arguments, Function};
use cara::value::Value;
use cara::{Error, Schema, Type};

fn int32() -> Type {
    Type::Builtin(BuiltinKind::Int32)
}

fn text() -> Type {
    Type::Builtin(BuiltinKind::Text)
}

fn boxed() -> StructDecl {
    let decl = StructDecl::declare_generic("Box", 0x200, ["T"]);
    decl.finish(StructDef::new().field(Field::new(0, "item", decl.template(0).expect("T"))))
        .expect("finish Box");
    decl
}

fn struct_of(ty: &Type) -> &StructDecl {
    ty.as_struct().expect("struct type")
}

#[test]
fn test_specialization_is_identity_stable() {
    let schema = Schema::new();
    let generic = Type::Struct(boxed());

    let first = schema.specialize(&generic, &[int32()]).expect("Box[Int32]");
    let second = schema.specialize(&generic, &[int32()]).expect("Box[Int32] again");
    let other = schema.specialize(&generic, &[text()]).expect("Box[Text]");

    assert_eq!(first, second);
    assert!(struct_of(&first).ptr_eq(struct_of(&second)));
    assert_ne!(first, other);
    assert_eq!(first.to_string(), "Box[Int32]");
    assert_eq!(struct_of(&first).id(), 0x200);
    assert!(!struct_of(&first).is_generic());
    assert_eq!(struct_of(&first).field_by_name("item").expect("item").ty, int32());
    assert_eq!(struct_of(&other).field_by_name("item").expect("item").ty, text());
    assert_eq!(schema.specialization_count(), 2);
}

#[test]
fn test_clones_of_a_schema_share_caches() {
    let schema = Schema::new();
    let clone = schema.clone();
    let generic = Type::Struct(boxed());

    let a = schema.specialize(&generic, &[int32()]).expect("specialize");
    let b = clone.specialize(&generic, &[int32()]).expect("specialize via clone");
    assert_eq!(a, b);
    assert!(schema.list_of(int32()).ptr_eq(&clone.list_of(int32())));
}

#[test]
fn test_template_argument_errors() {
    let schema = Schema::new();
    let generic = Type::Struct(boxed());

    assert!(matches!(
        schema.apply(&generic, &[int32(), text()]),
        Err(Error::TemplateOutOfRange { count: 1, .. })
    ));
    assert!(matches!(
        schema.apply(&int32(), &[text()]),
        Err(Error::TemplateOutOfRange { count: 0, .. })
    ));
    assert!(matches!(
        schema.specialize(&generic, &[]),
        Err(Error::Unspecialized(_))
    ));
}

#[test]
fn test_self_referential_generic_links_to_its_copy() {
    let schema = Schema::new();
    let node = StructDecl::declare_generic("Node", 0x210, ["T"]);
    let value = node.template(0).expect("T");
    let next = schema
        .apply(&Type::Struct(node.clone()), &[value.clone()])
        .expect("Node[T]");
    assert!(matches!(next, Type::Applied(_)));
    node.finish(
        StructDef::new()
            .field(Field::new(0, "value", value))
            .field(Field::new(1, "next", next))
            .field(Field::new(2, "children", Type::List(schema.list_of(Type::Struct(node.clone()))))),
    )
    .expect("finish Node");

    let specialized = schema
        .specialize(&Type::Struct(node), &[int32()])
        .expect("Node[Int32]");
    let decl = struct_of(&specialized);
    assert_eq!(decl.field_by_name("value").expect("value").ty, int32());
    assert_eq!(decl.field_by_name("next").expect("next").ty, specialized);

    let children = &decl.field_by_name("children").expect("children").ty;
    assert_eq!(children.as_list().expect("list").element(), &specialized);
    assert!(children
        .as_list()
        .expect("list")
        .ptr_eq(&schema.list_of(specialized.clone())));
}

#[test]
fn test_mutually_recursive_nested_declarations() {
    let schema = Schema::new();
    let tree = StructDecl::declare_generic("Tree", 0x220, ["T"]);
    let branch = StructDecl::declare("Branch", 0x221);
    let leaf = StructDecl::declare("Leaf", 0x222);
    let plain = StructDecl::declare("Plain", 0x223);

    branch
        .finish(
            StructDef::new()
                .field(Field::new(0, "label", tree.template(0).expect("T")))
                .field(Field::new(1, "parent", Type::Struct(tree.clone())))
                .field(Field::new(2, "leaf", Type::Struct(leaf.clone()))),
        )
        .expect("finish Branch");
    leaf.finish(StructDef::new().field(Field::new(0, "owner", Type::Struct(branch.clone()))))
        .expect("finish Leaf");
    plain
        .finish(StructDef::new().field(Field::new(0, "n", int32())))
        .expect("finish Plain");
    tree.finish(
        StructDef::new()
            .field(Field::new(0, "root", Type::Struct(branch.clone())))
            .nested(branch.clone())
            .nested(leaf.clone())
            .nested(plain.clone()),
    )
    .expect("finish Tree");

    let specialized = schema
        .specialize(&Type::Struct(tree), &[text()])
        .expect("Tree[Text]");
    let Decl::Struct(branch_copy) = schema.nested(&specialized, "Branch").expect("Branch") else {
        panic!("Branch is a struct");
    };
    let Decl::Struct(leaf_copy) = schema.nested(&specialized, "Leaf").expect("Leaf") else {
        panic!("Leaf is a struct");
    };

    assert_ne!(branch_copy, branch);
    assert_eq!(branch_copy.field_by_name("label").expect("label").ty, text());
    assert_eq!(branch_copy.field_by_name("parent").expect("parent").ty, specialized);
    assert_eq!(
        branch_copy.field_by_name("leaf").expect("leaf").ty,
        Type::Struct(leaf_copy.clone())
    );
    assert_eq!(
        leaf_copy.field_by_name("owner").expect("owner").ty,
        Type::Struct(branch_copy.clone())
    );
    assert_eq!(
        struct_of(&specialized).field_by_name("root").expect("root").ty,
        Type::Struct(branch_copy)
    );

    // Untouched declarations are shared with the generic.
    assert_eq!(schema.nested(&specialized, "Plain").expect("Plain"), Decl::Struct(plain));
    // The originals keep their template variables.
    assert!(!branch.field_by_name("label").expect("label").ty.is_concrete());
}

#[test]
fn test_partial_application_fills_remaining_slots() {
    let schema = Schema::new();
    let pair = StructDecl::declare_generic("Pair", 0x230, ["A", "B"]);
    pair.finish(
        StructDef::new()
            .field(Field::new(0, "first", pair.template(0).expect("A")))
            .field(Field::new(1, "second", pair.template(1).expect("B"))),
    )
    .expect("finish Pair");
    let generic = Type::Struct(pair.clone());

    let half = schema.apply(&generic, &[int32()]).expect("Pair[Int32]");
    let Type::Applied(applied) = &half else {
        panic!("expected a partial application");
    };
    assert_eq!(applied.unbound(), [1]);
    assert!(matches!(
        schema.specialize(&generic, &[int32()]),
        Err(Error::Unspecialized(_))
    ));

    let full = schema.apply(&half, &[text()]).expect("Pair[Int32, Text]");
    let direct = schema.specialize(&generic, &[int32(), text()]).expect("direct");
    assert_eq!(full, direct);
    assert_eq!(full.to_string(), "Pair[Int32, Text]");
    assert!(matches!(
        schema.apply(&half, &[text(), text()]),
        Err(Error::TemplateOutOfRange { .. })
    ));

    // A still-parametric argument keeps the result partial.
    let other = StructDecl::declare_generic("Other", 0x231, ["U"]);
    let open = schema
        .apply(&generic, &[int32(), other.template(0).expect("U")])
        .expect("Pair[Int32, Other.U]");
    assert!(!open.is_concrete());
    assert!(matches!(schema.nested(&open, "x"), Err(Error::Unspecialized(_))));
}

#[test]
fn test_applied_generic_inside_another_generic() {
    let schema = Schema::new();
    let inner = boxed();
    let wrapper = StructDecl::declare_generic("Wrapper", 0x240, ["U"]);
    let field_ty = schema
        .apply(&Type::Struct(inner.clone()), &[wrapper.template(0).expect("U")])
        .expect("Box[U]");
    wrapper
        .finish(StructDef::new().field(Field::new(0, "inner", field_ty)))
        .expect("finish Wrapper");

    let specialized = schema
        .specialize(&Type::Struct(wrapper), &[int32()])
        .expect("Wrapper[Int32]");
    let expected = schema
        .specialize(&Type::Struct(inner), &[int32()])
        .expect("Box[Int32]");
    assert_eq!(struct_of(&specialized).field_by_name("inner").expect("inner").ty, expected);
}

#[test]
fn test_specializing_before_the_generic_is_finished() {
    let schema = Schema::new();
    let late = StructDecl::declare_generic("Late", 0x250, ["T"]);
    let specialized = schema
        .specialize(&Type::Struct(late.clone()), &[text()])
        .expect("Late[Text]");
    assert!(!struct_of(&specialized).is_finished());

    late.finish(StructDef::new().field(Field::new(0, "item", late.template(0).expect("T"))))
        .expect("finish Late");
    assert!(struct_of(&specialized).is_finished());
    assert_eq!(struct_of(&specialized).field_by_name("item").expect("item").ty, text());
}

#[test]
fn test_generic_interface_methods_are_specialized() {
    let schema = Schema::new();
    let store = InterfaceDecl::declare_generic("Store", 0x260, ["T"]);
    let item = store.template(0).expect("T");
    store
        .finish(
            InterfaceDef::new()
                .method(Method::new(0, "put").param("value", item.clone()))
                .method(Method::new(1, "get").result("value", item)),
        )
        .expect("finish Store");

    let specialized = schema
        .specialize(&Type::Interface(store), &[int32()])
        .expect("Store[Int32]");
    let decl = specialized.as_interface().expect("interface");
    let methods = decl.methods().expect("methods");
    assert_eq!(methods[0].params[0].ty, int32());
    assert_eq!(methods[1].results[0].ty, int32());

    let value = wrap(
        decl,
        Value::map([
            ("put", Value::Function(Function::new(|_| Ok(Value::Void)))),
            ("get", Value::Function(Function::new(|_| Ok(Value::Int64(3))))),
        ]),
    )
    .expect("wrap");
    value.call("put", Arguments::new().arg(1i64)).expect("put");
    assert!(value.call("put", Arguments::new().arg("text")).is_err());
    assert_eq!(value.call("get", Arguments::new()).expect("get"), Value::Int64(3));
}

#[test]
fn test_replace_types_copies_only_affected_declarations() {
    let schema = Schema::new();
    let host = StructDecl::declare("Host", 0x270);
    host.finish(StructDef::new().field(Field::new(0, "n", int32())))
        .expect("finish Host");
    let replacement = StructDecl::declare("HostReplacement", 0x271);
    replacement
        .finish(
            StructDef::new()
                .field(Field::new(0, "n", int32()))
                .field(Field::new(1, "extra", text())),
        )
        .expect("finish HostReplacement");
    let unrelated = StructDecl::declare("Unrelated", 0x272);
    unrelated
        .finish(StructDef::new().field(Field::new(0, "flag", Type::Builtin(BuiltinKind::Bool))))
        .expect("finish Unrelated");

    let root = StructDecl::declare("Root", 0x273);
    root.finish(
        StructDef::new()
            .field(Field::new(0, "host", Type::Struct(host.clone())))
            .field(Field::new(1, "hosts", Type::List(schema.list_of(Type::Struct(host.clone())))))
            .field(Field::new(2, "other", Type::Struct(unrelated.clone())))
            .nested(host.clone())
            .nested(unrelated.clone()),
    )
    .expect("finish Root");

    let pairs = [(Type::Struct(host.clone()), Type::Struct(replacement.clone()))];
    let replaced = schema
        .replace_types(&Type::Struct(root.clone()), &pairs)
        .expect("replace");
    let new_root = struct_of(&replaced);

    assert_ne!(new_root, &root);
    assert_eq!(new_root.name(), "Root");
    assert_eq!(
        new_root.field_by_name("host").expect("host").ty,
        Type::Struct(replacement.clone())
    );
    let hosts = &new_root.field_by_name("hosts").expect("hosts").ty;
    assert!(hosts
        .as_list()
        .expect("list")
        .ptr_eq(&schema.list_of(Type::Struct(replacement.clone()))));
    assert_eq!(
        new_root.nested("HostReplacement").expect("nested"),
        &Decl::Struct(replacement)
    );
    assert_eq!(
        new_root.field_by_name("other").expect("other").ty,
        Type::Struct(unrelated.clone())
    );
    assert_eq!(new_root.nested("Unrelated").expect("nested"), &Decl::Struct(unrelated.clone()));

    // The original graph is untouched.
    assert_eq!(root.field_by_name("host").expect("host").ty, Type::Struct(host));

    // Nothing to replace: the same handle comes back.
    let same = schema
        .replace_types(&Type::Struct(unrelated.clone()), &pairs)
        .expect("replace unrelated");
    assert_eq!(same, Type::Struct(unrelated.clone()));
    assert_eq!(
        schema.replace_types(&Type::Struct(root.clone()), &[]).expect("no pairs"),
        Type::Struct(root)
    );
}
