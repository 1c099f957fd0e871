// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::cast_possible_wrap)] // Test counters
#![allow(clippy::too_many_lines)] // Test code

//! Remote layer integration tests
//!
//! Three parties on in-process links: A owns an object, B forwards a handle
//! to it, C calls through B.

use cara::builtin::BuiltinKind;
use cara::config::RuntimeConfig;
use cara::decl::{EnumDecl, EnumDef, Field, InterfaceDecl, InterfaceDef, Method, StructDecl, StructDef};
use cara::deferred::{Completer, Deferred};
use cara::interface::{wrap, Arguments, Function, InterfaceValue};
use cara::rpc::{ChannelRef, Endpoint, LoopbackChannel, RemoteDescriptor};
use cara::{Error, Schema, Type, Value};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn int() -> Type {
    Type::Builtin(BuiltinKind::Int64)
}

fn counter_decl() -> InterfaceDecl {
    let decl = InterfaceDecl::declare("Counter", 0x300);
    decl.finish(InterfaceDef::new().method(Method::new(0, "increment").result("total", int())))
        .expect("finish Counter");
    decl
}

fn counter(decl: &InterfaceDecl, hits: &Arc<AtomicUsize>) -> InterfaceValue {
    let hits = Arc::clone(hits);
    wrap(
        decl,
        Value::Function(Function::new(move |_| {
            Ok(Value::Int64(hits.fetch_add(1, Ordering::SeqCst) as i64 + 1))
        })),
    )
    .expect("wrap counter")
}

fn relay_decl(counter: &InterfaceDecl) -> InterfaceDecl {
    let target = Type::Interface(counter.clone());
    let decl = InterfaceDecl::declare("Relay", 0x301);
    decl.finish(
        InterfaceDef::new()
            .method(Method::new(0, "get").result("target", target.clone()))
            .method(
                Method::new(1, "check")
                    .param("target", target)
                    .result("same", Type::Builtin(BuiltinKind::Bool)),
            ),
    )
    .expect("finish Relay");
    decl
}

/// Handle on `client` for an object `owner` exposes, reached over `channel`.
fn handle(
    decl: &InterfaceDecl,
    owner: &Arc<Endpoint>,
    served: &InterfaceValue,
    channel: &Arc<LoopbackChannel>,
) -> InterfaceValue {
    let channel: ChannelRef = channel.clone();
    InterfaceValue::remote(
        decl,
        RemoteDescriptor {
            remote_id: owner.expose(served),
            owner: owner.peer_id(),
            channel,
        },
    )
}

struct Chain {
    a: Arc<Endpoint>,
    b: Arc<Endpoint>,
    hits: Arc<AtomicUsize>,
    /// B's handle on A's counter.
    at_b: InterfaceValue,
    /// C's handle on B's relay.
    relay: InterfaceValue,
    _links: Vec<Arc<LoopbackChannel>>,
}

fn chain() -> Chain {
    let config = RuntimeConfig::default();
    let a = Endpoint::new(1, &config);
    let b = Endpoint::new(2, &config);
    let c = Endpoint::new(3, &config);
    let (b_to_a, a_to_b) = LoopbackChannel::pair(&b, &a);
    let (c_to_b, b_to_c) = LoopbackChannel::pair(&c, &b);

    let decl = counter_decl();
    let hits = Arc::new(AtomicUsize::new(0));
    let at_b = handle(&decl, &a, &counter(&decl, &hits), &b_to_a);

    let relay_decl = relay_decl(&decl);
    let held = at_b.clone();
    let compared = at_b.clone();
    let served = wrap(
        &relay_decl,
        Value::map([
            (
                "get",
                Value::Function(Function::new(move |_| Ok(Value::Interface(held.clone())))),
            ),
            (
                "check",
                Value::Function(Function::new(move |args: Arguments| {
                    let got = args.positional.first().and_then(Value::as_interface);
                    Ok(Value::Bool(got == Some(&compared)))
                })),
            ),
        ]),
    )
    .expect("wrap relay");
    let relay = handle(&relay_decl, &b, &served, &c_to_b);

    Chain {
        a,
        b,
        hits,
        at_b,
        relay,
        _links: vec![b_to_a, a_to_b, c_to_b, b_to_c],
    }
}

#[test]
fn test_forwarded_handle_executes_on_the_owner() {
    let chain = chain();
    let forwarded = chain.relay.call("get", Arguments::new()).expect("get");
    let at_c = forwarded.as_interface().expect("interface").clone();

    assert!(!at_c.is_local());
    let descriptor = at_c.remote_handle().expect("remote").descriptor();
    assert_eq!(descriptor.owner, chain.b.peer_id());

    assert_eq!(at_c.call("increment", Arguments::new()).expect("first"), Value::Int64(1));
    assert_eq!(at_c.call("increment", Arguments::new()).expect("second"), Value::Int64(2));
    assert_eq!(chain.hits.load(Ordering::SeqCst), 2);

    // B exposes its relay and the forwarded handle; A only the counter.
    assert_eq!(chain.b.exposed_objects().len(), 2);
    assert_eq!(chain.a.exposed_objects().len(), 1);

    // B's own handle still reaches the same object.
    assert_eq!(chain.at_b.call("increment", Arguments::new()).expect("direct"), Value::Int64(3));
}

#[test]
fn test_forwarding_twice_reuses_the_exposed_id() {
    let chain = chain();
    let first = chain.relay.call("get", Arguments::new()).expect("first get");
    let second = chain.relay.call("get", Arguments::new()).expect("second get");
    let id = |v: &Value| {
        v.as_interface()
            .and_then(InterfaceValue::remote_handle)
            .map(|h| h.descriptor().remote_id)
    };
    assert_eq!(id(&first), id(&second));
    assert_eq!(chain.b.exposed_objects().len(), 2);
}

#[test]
fn test_handle_returned_to_the_forwarder_closes_the_loop() {
    let chain = chain();
    let at_c = chain.relay.call("get", Arguments::new()).expect("get");
    let same = chain
        .relay
        .call("check", Arguments::new().arg(at_c))
        .expect("check");
    assert_eq!(same, Value::Bool(true));
    assert_eq!(chain.hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_capability_relayed_twice_keeps_one_id() {
    let config = RuntimeConfig::default();
    let a = Endpoint::new(1, &config);
    let b = Endpoint::new(2, &config);
    let c = Endpoint::new(3, &config);
    let (a_to_b, b_to_a) = LoopbackChannel::pair(&a, &b);
    let (b_to_c, c_to_b) = LoopbackChannel::pair(&b, &c);

    let counter_iface = counter_decl();
    let target = Type::Interface(counter_iface.clone());
    let sink_decl = InterfaceDecl::declare("Sink", 0x320);
    sink_decl
        .finish(InterfaceDef::new().method(Method::new(0, "take").param("target", target.clone())))
        .expect("finish Sink");
    let hub_decl = InterfaceDecl::declare("Hub", 0x321);
    hub_decl
        .finish(InterfaceDef::new().method(Method::new(0, "hold").param("target", target)))
        .expect("finish Hub");

    // C keeps every handle it is given.
    let received = Arc::new(Mutex::new(Vec::<InterfaceValue>::new()));
    let kept = Arc::clone(&received);
    let sink = wrap(
        &sink_decl,
        Value::Function(Function::new(move |args: Arguments| {
            if let Some(target) = args.positional.first().and_then(Value::as_interface) {
                kept.lock().push(target.clone());
            }
            Ok(Value::Void)
        })),
    )
    .expect("wrap sink");
    let sink_at_b = handle(&sink_decl, &c, &sink, &b_to_c);

    // B passes whatever it holds on to C.
    let hub = wrap(
        &hub_decl,
        Value::Function(Function::new(move |args: Arguments| sink_at_b.call("take", args))),
    )
    .expect("wrap hub");
    let hub_at_a = handle(&hub_decl, &b, &hub, &a_to_b);

    let hits = Arc::new(AtomicUsize::new(0));
    let x = counter(&counter_iface, &hits);
    hub_at_a
        .call("hold", Arguments::new().arg(x.clone()))
        .expect("first hold");
    hub_at_a.call("hold", Arguments::new().arg(x)).expect("second hold");

    let received = received.lock();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0], received[1]);
    assert_eq!(
        received[0].remote_handle().map(|h| h.remote_id),
        received[1].remote_handle().map(|h| h.remote_id)
    );
    assert_eq!(a.exposed_objects().len(), 1);
    // The hub plus one entry for the relayed counter.
    assert_eq!(b.exposed_objects().len(), 2);

    assert_eq!(
        received[1].call("increment", Arguments::new()).expect("call through B"),
        Value::Int64(1)
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    drop((b_to_a, c_to_b));
}

fn shapes() -> (StructDecl, EnumDecl, InterfaceDecl) {
    let schema = Schema::new();
    let point = StructDecl::declare("Point", 0x310);
    point
        .finish(
            StructDef::new()
                .field(Field::new(0, "x", Type::Builtin(BuiltinKind::Int32)))
                .field(Field::new(1, "y", Type::Builtin(BuiltinKind::Int32))),
        )
        .expect("finish Point");
    let color = EnumDecl::declare("Color", 0x311);
    color
        .finish(EnumDef::new().enumerant("red").enumerant("green").enumerant("blue"))
        .expect("finish Color");
    let painter = InterfaceDecl::declare("Painter", 0x312);
    painter
        .finish(
            InterfaceDef::new()
                .method(
                    Method::new(0, "describe")
                        .param("point", Type::Struct(point.clone()))
                        .param("color", Type::Enum(color.clone()))
                        .param(
                            "tags",
                            Type::List(schema.list_of(Type::Builtin(BuiltinKind::Text))),
                        )
                        .result("summary", Type::Builtin(BuiltinKind::Text)),
                )
                .method(Method::new(1, "later").result("value", int())),
        )
        .expect("finish Painter");
    (point, color, painter)
}

fn describe(args: Arguments) -> cara::Result<Value> {
    let point = args
        .positional
        .first()
        .and_then(Value::as_struct)
        .ok_or_else(|| Error::raised("point missing"))?;
    let color = args
        .positional
        .get(1)
        .and_then(Value::as_enum)
        .ok_or_else(|| Error::raised("color missing"))?;
    let tags = args
        .positional
        .get(2)
        .and_then(Value::as_list)
        .ok_or_else(|| Error::raised("tags missing"))?;
    Ok(Value::Text(format!(
        "{} {} {} {}",
        point.peek("x")?,
        point.peek("y")?,
        color.name()?,
        tags.len()
    )))
}

struct Painting {
    painter: InterfaceValue,
    point: StructDecl,
    pending: Arc<Mutex<Option<Completer<Value>>>>,
    _links: (Arc<LoopbackChannel>, Arc<LoopbackChannel>),
}

fn painting() -> Painting {
    let config = RuntimeConfig::default();
    let client = Endpoint::new(1, &config);
    let server = Endpoint::new(2, &config);
    let (to_server, to_client) = LoopbackChannel::pair(&client, &server);
    let (point, _color, decl) = shapes();

    let pending: Arc<Mutex<Option<Completer<Value>>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&pending);
    let served = wrap(
        &decl,
        Value::map([
            ("describe", Value::Function(Function::new(describe))),
            (
                "later",
                Value::Function(Function::new(move |_| {
                    let (deferred, completer) = Deferred::pending();
                    *slot.lock() = Some(completer);
                    Ok(Value::Pending(deferred))
                })),
            ),
        ]),
    )
    .expect("wrap painter");
    let painter = handle(&decl, &server, &served, &to_server);
    Painting {
        painter,
        point,
        pending,
        _links: (to_server, to_client),
    }
}

#[test]
fn test_structs_enums_and_lists_cross_the_link() {
    let painting = painting();
    let summary = painting
        .painter
        .call(
            "describe",
            Arguments::new()
                .arg(Value::map([("x", 3i32), ("y", 4i32)]))
                .arg("blue")
                .arg(Value::tuple(["a", "b"])),
        )
        .expect("describe");
    assert_eq!(summary, Value::Text("3 4 blue 2".into()));

    let point = cara::StructValue::from_entries(&painting.point, [("x", 1i32)]).expect("point");
    let summary = painting
        .painter
        .call(
            "describe",
            Arguments::new()
                .arg(point)
                .kwarg("color", 0u16)
                .kwarg("tags", Value::tuple(Vec::<Value>::new())),
        )
        .expect("describe with kwargs");
    assert_eq!(summary, Value::Text("1 0 red 0".into()));
}

#[tokio::test]
async fn test_pending_result_resolves_across_the_link() {
    let painting = painting();
    let result = painting.painter.call("later", Arguments::new()).expect("later");
    let Value::Pending(deferred) = result else {
        panic!("expected a pending result");
    };
    assert!(!deferred.is_done());

    let completer = painting.pending.lock().take().expect("completer stored");
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        completer.resolve(Value::Int64(9));
    });
    assert_eq!(deferred.await.expect("resolved"), Value::Int64(9));
}

#[tokio::test]
async fn test_failed_pending_result_surfaces_the_error() {
    let painting = painting();
    let result = painting.painter.call("later", Arguments::new()).expect("later");
    let Value::Pending(deferred) = result else {
        panic!("expected a pending result");
    };
    let completer = painting.pending.lock().take().expect("completer stored");
    completer.fail(Error::raised("boom"));
    assert!(matches!(deferred.await, Err(Error::Raised(_))));
}
