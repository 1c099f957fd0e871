// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::builtin::BuiltinKind;
use crate::decl::{InterfaceDecl, InterfaceDef, Method, MethodKey};
use crate::deferred::Deferred;
use crate::schema::Schema;
use crate::types::Type;
use crate::value::Key;
use crate::value::Value;
use crate::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn int() -> Type {
    Type::Builtin(BuiltinKind::Int64)
}

fn calculator() -> InterfaceDecl {
    let decl = InterfaceDecl::declare("Calculator", 0x30);
    decl.finish(
        InterfaceDef::new()
            .method(
                Method::new(0, "add")
                    .param("a", int())
                    .param("b", int())
                    .result("sum", int()),
            )
            .method(
                Method::new(1, "divmod")
                    .param("a", int())
                    .param("b", int())
                    .result("quotient", int())
                    .result("remainder", int()),
            )
            .method(Method::new(2, "reset")),
    )
    .expect("finish");
    decl
}

fn arg_i64(args: &Arguments, index: usize, name: &str) -> Result<i64> {
    args.get(index, name)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::raised(format!("missing {}", name)))
}

fn calculator_table() -> Value {
    Value::map([
        (
            "add",
            Value::Function(Function::new(|args: Arguments| {
                Ok(Value::Int64(arg_i64(&args, 0, "a")? + arg_i64(&args, 1, "b")?))
            })),
        ),
        (
            "divmod",
            Value::Function(Function::new(|args: Arguments| {
                let (a, b) = (arg_i64(&args, 0, "a")?, arg_i64(&args, 1, "b")?);
                Ok(Value::tuple([a / b, a % b]))
            })),
        ),
        (
            "reset",
            Value::Function(Function::new(|_args: Arguments| Ok(Value::Void))),
        ),
    ])
}

#[test]
fn test_table_dispatch_converts_and_packs() {
    let value = wrap(&calculator(), calculator_table()).expect("wrap");

    let sum = value
        .call("add", Arguments::new().arg(2i32).kwarg("b", 40i32))
        .expect("add");
    assert_eq!(sum, Value::Int64(42));

    let packed = value
        .call("divmod", Arguments::new().arg(17i64).arg(5i64))
        .expect("divmod");
    assert_eq!(
        packed,
        Value::map([("quotient", Value::Int64(3)), ("remainder", Value::Int64(2))])
    );

    assert_eq!(value.call(2u32, Arguments::new()).expect("reset"), Value::Void);
}

#[test]
fn test_argument_binding_errors() {
    let value = wrap(&calculator(), calculator_table()).expect("wrap");

    let too_many = value.call("add", Arguments::new().arg(1i64).arg(2i64).arg(3i64));
    assert!(matches!(
        too_many,
        Err(Error::TooManyArguments { expected: 2, got: 3, .. })
    ));

    let unknown = value.call("add", Arguments::new().kwarg("c", 1i64));
    assert!(matches!(unknown, Err(Error::ParamNotFound { .. })));

    let twice = value.call("add", Arguments::new().arg(1i64).kwarg("a", 1i64));
    assert!(matches!(twice, Err(Error::ArgumentConflict { .. })));

    let wrong = value.call("add", Arguments::new().arg("one").arg(2i64));
    assert!(matches!(wrong, Err(Error::TypeMismatch { .. })));

    assert!(matches!(
        value.call("missing", Arguments::new()),
        Err(Error::UnknownMethod { .. })
    ));
}

#[test]
fn test_single_function_only_for_single_method_interfaces() {
    let echo = InterfaceDecl::declare("Echo", 0x31);
    echo.finish(InterfaceDef::new().method(Method::new(0, "echo").param("v", int()).result("v", int())))
        .expect("finish");

    let f = Function::new(|args: Arguments| Ok(args.positional[0].clone()));
    let value = wrap(&echo, Value::Function(f.clone())).expect("wrap");
    assert_eq!(
        value.call("echo", Arguments::new().arg(7i64)).expect("echo"),
        Value::Int64(7)
    );

    assert!(matches!(
        wrap(&calculator(), Value::Function(f)),
        Err(Error::TooManyMethods { count: 3, .. })
    ));
}

#[test]
fn test_single_result_mapping_is_unboxed() {
    let decl = InterfaceDecl::declare("Answer", 0x32);
    decl.finish(InterfaceDef::new().method(Method::new(0, "get").result("value", int())))
        .expect("finish");
    let value = wrap(
        &decl,
        Value::Function(Function::new(|_| Ok(Value::map([("value", 42i64)])))),
    )
    .expect("wrap");
    assert_eq!(value.call("get", Arguments::new()).expect("get"), Value::Int64(42));
}

#[test]
fn test_multi_result_shapes() {
    let method = Method::new(0, "pair").result("a", int()).result("b", int());

    let from_map = pack_results(&method, Value::map([("b", 2i64), ("a", 1i64)])).expect("map");
    assert_eq!(from_map, Value::map([("a", 1i64), ("b", 2i64)]));

    let short = pack_results(&method, Value::tuple([1i64]));
    assert!(matches!(
        short,
        Err(Error::ResultArityMismatch { expected: 2, .. })
    ));

    let wrong_keys = pack_results(&method, Value::map([("a", 1i64), ("c", 2i64)]));
    assert!(matches!(wrong_keys, Err(Error::ResultArityMismatch { .. })));

    let scalar = pack_results(&method, Value::Int64(1));
    assert!(matches!(scalar, Err(Error::ResultArityMismatch { .. })));
}

#[test]
fn test_pending_results_are_packed_on_completion() {
    let method = Method::new(0, "pair").result("a", int()).result("b", int());
    let (deferred, completer) = Deferred::<Value>::pending();
    let packed = pack_results(&method, Value::Pending(deferred)).expect("pending");
    let Value::Pending(packed) = packed else {
        panic!("expected a pending value");
    };
    assert!(!packed.is_done());

    completer.resolve(Value::tuple([1i64, 2]));
    assert_eq!(
        packed.try_get().expect("done").expect("ok"),
        Value::map([("a", 1i64), ("b", 2i64)])
    );
}

struct Counter {
    hits: AtomicUsize,
}

impl Servant for Counter {
    fn dispatch(&self, method: &str, _args: Arguments) -> Result<Value> {
        match method {
            "add" => Ok(Value::Int64(self.hits.fetch_add(1, Ordering::SeqCst) as i64)),
            other => Err(Error::raised(format!("no {}", other))),
        }
    }
}

#[test]
fn test_servant_objects_answer_by_name() {
    let servant: Arc<dyn Servant> = Arc::new(Counter {
        hits: AtomicUsize::new(0),
    });
    let value = wrap(&calculator(), Value::Object(servant)).expect("wrap");
    value.call("add", Arguments::new()).expect("first");
    assert_eq!(value.call("add", Arguments::new()).expect("second"), Value::Int64(1));
    assert!(matches!(
        value.call("reset", Arguments::new()),
        Err(Error::Raised(_))
    ));
}

#[test]
fn test_values_of_derived_interfaces_pass_through_wrap() {
    let base = InterfaceDecl::declare("Base", 0x40);
    base.finish(InterfaceDef::new().method(Method::new(0, "ping").result("pong", int())))
        .expect("base");
    let derived = InterfaceDecl::declare("Derived", 0x41);
    derived
        .finish(
            InterfaceDef::new()
                .extends(base.clone())
                .method(Method::new(0, "extra")),
        )
        .expect("derived");

    let value = wrap(
        &derived,
        Value::map([
            ("ping", Value::Function(Function::new(|_| Ok(Value::Int64(1))))),
            ("extra", Value::Function(Function::new(|_| Ok(Value::Void)))),
        ]),
    )
    .expect("wrap");

    let as_base = wrap(&base, Value::Interface(value.clone())).expect("upcast");
    assert_eq!(as_base, value);
    assert_eq!(
        value
            .call(MethodKey::from((0x40, 0)), Arguments::new())
            .expect("qualified"),
        Value::Int64(1)
    );

    // Unrelated interface values are adapted by method name.
    let other = InterfaceDecl::declare("Pinger", 0x42);
    other
        .finish(InterfaceDef::new().method(Method::new(0, "ping").result("pong", int())))
        .expect("other");
    let adapted = wrap(&other, Value::Interface(value)).expect("adapt");
    assert_eq!(adapted.call("ping", Arguments::new()).expect("ping"), Value::Int64(1));
}

#[test]
fn test_to_dict_exposes_bound_methods() {
    let value = wrap(&calculator(), calculator_table()).expect("wrap");
    let dict = value.to_dict(true).expect("dict");
    let methods = dict.as_map().expect("map");
    assert_eq!(methods.len(), 3);
    let Some(Value::Function(add)) = methods.get(&Key::Name("add".into())) else {
        panic!("add missing");
    };
    assert_eq!(
        add.call(Arguments::new().arg(1i64).arg(1i64)).expect("call"),
        Value::Int64(2)
    );
}

#[test]
fn test_generic_methods_need_specialization() {
    let decl = InterfaceDecl::declare("Identity", 0x50);
    decl.finish(
        InterfaceDef::new().method(
            Method::new(0, "id")
                .generic(["T"])
                .param("value", Type::MethodParam(0))
                .result("value", Type::MethodParam(0)),
        ),
    )
    .expect("finish");
    let value = wrap(
        &decl,
        Value::Function(Function::new(|args: Arguments| Ok(args.positional[0].clone()))),
    )
    .expect("wrap");

    assert!(matches!(
        value.call("id", Arguments::new().arg(1i64)),
        Err(Error::Unspecialized(_))
    ));

    let schema = Schema::new();
    let bound = value.method("id").expect("method");
    let text = bound
        .specialize(&schema, &[Type::Builtin(BuiltinKind::Text)])
        .expect("specialize");
    assert!(!text.method().is_generic());
    assert_eq!(
        text.call(Arguments::new().arg("hi")).expect("call"),
        Value::Text("hi".into())
    );
    assert!(text.call(Arguments::new().arg(1i64)).is_err());

    assert!(matches!(
        bound.specialize(&schema, &[int(), int()]),
        Err(Error::TemplateOutOfRange { .. })
    ));
    assert!(matches!(bound.specialize(&schema, &[]), Err(Error::Unspecialized(_))));
}
