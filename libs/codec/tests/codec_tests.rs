//! # Codec Integration Tests
//!
//! End-to-end behaviour of the public codec API:
//! - Reference round trips through the built-in surrogates for every kind
//! - Identity preservation for shared and cyclic graphs in both profiles
//! - Lazy dependency binding and failure isolation
//! - Property tests over primitive and sequence graphs

mod common;

use codec::{
    CodecEngine, CodecError, Profile, Proxy, ResolutionContext, SchemaRegistry, SurrogateRegistry,
};
use common::{copy_engine, ring, roundtrip, sample_order, wire_engine, FakeRuntime};
use proptest::prelude::*;
use std::sync::Arc;
use types::{
    ActorPath, ActorRef, ClientRef, NullServiceLocator, Reference, ReferenceKind, ServiceKind,
    StreamPath, StreamRef, Value,
};

fn all_reference_kinds(runtime: &FakeRuntime) -> Vec<Reference> {
    let actor_path = ActorPath::new("IOrderGrain", "order-7").unwrap();
    let stream_path = StreamPath::new("sms", "prices:eu").unwrap();
    vec![
        actor_path.clone().into(),
        stream_path.clone().into(),
        ActorRef::new(actor_path, runtime.actors.handle_for("IOrderGrain:order-7")).into(),
        StreamRef::new(stream_path, runtime.streams.handle_for("sms:prices:eu")).into(),
        ClientRef::new("client-1", runtime.actors.handle_for("client-1"))
            .unwrap()
            .into(),
    ]
}

#[test]
fn test_every_reference_kind_roundtrips() {
    let source = FakeRuntime::new();
    let target = FakeRuntime::new();

    for reference in all_reference_kinds(&source) {
        let decoded = roundtrip(&wire_engine(), &target, &reference.clone().into()).unwrap();
        let decoded = decoded.as_reference().unwrap().clone();
        assert_eq!(decoded, reference);

        // Handles come from the decoding runtime, for the same canonical id
        match &decoded {
            Reference::ActorRef(actor) => {
                assert_eq!(actor.handle(), &target.actors.handle_for(&reference.canonical()))
            }
            Reference::StreamRef(stream) => {
                assert_eq!(stream.handle(), &target.streams.handle_for(&reference.canonical()))
            }
            Reference::ClientRef(client) => {
                assert_eq!(client.handle(), &target.actors.handle_for(&reference.canonical()))
            }
            Reference::ActorPath(_) | Reference::StreamPath(_) => {}
        }
    }
}

#[test]
fn test_shared_identity_in_both_profiles() {
    let runtime = FakeRuntime::new();
    for engine in [wire_engine(), copy_engine()] {
        let decoded = roundtrip(&engine, &runtime, &sample_order().into()).unwrap();
        let order = decoded.as_object().unwrap();
        let billing = order.get("billing").unwrap();
        let shipping = order.get("shipping").unwrap();
        assert!(billing.as_object().unwrap().ptr_eq(shipping.as_object().unwrap()));
        assert_eq!(decoded, Value::from(sample_order()));
    }
}

#[test]
fn test_ring_roundtrip_preserves_cycle() {
    let runtime = FakeRuntime::new();
    let source = ring(5);
    for engine in [wire_engine(), copy_engine()] {
        let decoded = roundtrip(&engine, &runtime, &source.clone().into()).unwrap();
        let head = decoded.as_object().unwrap().clone();

        let mut node = head.clone();
        for _ in 0..5 {
            node = node.get("next").unwrap().as_object().unwrap().clone();
        }
        assert!(node.ptr_eq(&head));
        let prev = head.get("prev").unwrap();
        let back = prev.as_object().unwrap().get("next").unwrap();
        assert!(back.as_object().unwrap().ptr_eq(&head));
    }
}

#[test]
fn test_message_without_references_needs_no_services() {
    let engine = wire_engine();
    let bytes = engine.encode(&sample_order().into()).unwrap();
    let context = ResolutionContext::new();
    let decoded = engine
        .decode(&bytes, &context.resolver(&NullServiceLocator))
        .unwrap();
    assert_eq!(decoded, Value::from(sample_order()));
    assert!(!context.is_resolved(ServiceKind::ActorHandleFactory));
}

#[test]
fn test_missing_factory_aborts_whole_decode() {
    let runtime = FakeRuntime::new();
    let order = sample_order();
    order.set("owner", all_reference_kinds(&runtime).remove(2));

    let engine = wire_engine();
    let bytes = engine.encode(&order.into()).unwrap();
    let context = ResolutionContext::new();
    let err = engine
        .decode(&bytes, &context.resolver(&NullServiceLocator))
        .unwrap_err();
    assert_eq!(
        err,
        CodecError::DependencyUnavailable {
            service: ServiceKind::ActorHandleFactory
        }
    );

    // Same context succeeds once the scope provides the factory
    let decoded = engine.decode(&bytes, &context.resolver(&runtime.locator)).unwrap();
    assert!(decoded.as_object().unwrap().get("owner").is_some());
}

#[test]
fn test_reference_without_surrogate_is_unsupported() {
    let mut surrogates = SurrogateRegistry::new();
    surrogates
        .register(
            ReferenceKind::ActorPath,
            1,
            |r: &Reference| Ok(Proxy::new(r.canonical())),
            |p: Proxy, _: &codec::Resolver<'_>| Ok(ActorPath::deserialize(p.canonical())?.into()),
        )
        .unwrap();
    let engine = CodecEngine::new(
        Profile::Wire,
        Arc::new(surrogates),
        Arc::new(SchemaRegistry::new()),
    );

    let stream: Reference = StreamPath::new("sms", "x").unwrap().into();
    let err = engine.encode(&stream.into()).unwrap_err();
    assert!(matches!(
        err,
        CodecError::UnsupportedType { ref type_name, .. } if type_name == "StreamPath"
    ));
}

#[test]
fn test_unknown_proxy_tag_is_decode_error() {
    let runtime = FakeRuntime::new();
    let path: Reference = ActorPath::new("IGrain", "1").unwrap().into();
    let bytes = wire_engine().encode(&path.into()).unwrap();

    // Decoder that knows only stream paths
    let mut surrogates = SurrogateRegistry::new();
    surrogates
        .register(
            ReferenceKind::StreamPath,
            2,
            |r: &Reference| Ok(Proxy::new(r.canonical())),
            |p: Proxy, _: &codec::Resolver<'_>| Ok(StreamPath::deserialize(p.canonical())?.into()),
        )
        .unwrap();
    let engine = CodecEngine::new(
        Profile::Wire,
        Arc::new(surrogates),
        Arc::new(SchemaRegistry::new()),
    );
    let context = ResolutionContext::new();
    let err = engine
        .decode(&bytes, &context.resolver(&runtime.locator))
        .unwrap_err();
    assert!(err.is_decode_error());
}

#[test]
fn test_corrupt_canonical_form_is_decode_error() {
    let runtime = FakeRuntime::new();
    let path: Reference = ActorPath::new("IGrain", "1").unwrap().into();
    let mut bytes = wire_engine().encode(&path.into()).unwrap();
    // Turn "IGrain:1" into "IGrain;1"
    let colon = bytes.iter().rposition(|b| *b == b':').unwrap();
    bytes[colon] = b';';

    let context = ResolutionContext::new();
    let err = wire_engine()
        .decode(&bytes, &context.resolver(&runtime.locator))
        .unwrap_err();
    assert!(err.is_decode_error(), "{err}");
}

#[test]
fn test_concurrent_encode_decode_on_shared_engine() {
    let runtime = Arc::new(FakeRuntime::new());
    let engine = Arc::new(wire_engine());
    let context = Arc::new(ResolutionContext::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let (runtime, engine, context) = (runtime.clone(), engine.clone(), context.clone());
            std::thread::spawn(move || {
                let order = sample_order();
                order.set("id", i as i64);
                order.set("owner", all_reference_kinds(&runtime).remove(2));
                let bytes = engine.encode(&order.clone().into()).unwrap();
                let decoded = engine
                    .decode(&bytes, &context.resolver(&runtime.locator))
                    .unwrap();
                assert_eq!(decoded, Value::from(order));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(context.is_resolved(ServiceKind::ActorHandleFactory));
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::UInt),
        any::<f64>().prop_map(Value::Float),
        ".{0,24}".prop_map(Value::Str),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 8, |inner| {
        proptest::collection::vec(inner, 0..8).prop_map(Value::Seq)
    })
}

proptest! {
    #[test]
    fn prop_acyclic_graphs_roundtrip(value in tree()) {
        let runtime = FakeRuntime::new();
        for engine in [wire_engine(), copy_engine()] {
            let decoded = roundtrip(&engine, &runtime, &value).unwrap();
            prop_assert_eq!(&decoded, &value);
        }
    }

    #[test]
    fn prop_truncation_never_panics(value in tree(), cut in 0usize..64) {
        let engine = wire_engine();
        let bytes = engine.encode(&value).unwrap();
        let cut = cut.min(bytes.len().saturating_sub(1));
        let context = ResolutionContext::new();
        let result = engine.decode(&bytes[..cut], &context.resolver(&NullServiceLocator));
        prop_assert!(result.unwrap_err().is_decode_error());
    }
}
