//! Shared fixtures for codec integration tests

#![allow(dead_code)]

use codec::{CodecEngine, CodecResult, Profile, ResolutionContext};
use std::sync::Arc;
use types::testing::{FakeActorFactory, FakeStreamRegistry};
use types::{Object, Record, ServiceMap, Value};

/// Fake runtime with both services wired
pub struct FakeRuntime {
    pub actors: Arc<FakeActorFactory>,
    pub streams: Arc<FakeStreamRegistry>,
    pub locator: ServiceMap,
}

impl FakeRuntime {
    pub fn new() -> Self {
        let actors = Arc::new(FakeActorFactory::new());
        let streams = Arc::new(FakeStreamRegistry::new());
        let locator = ServiceMap::new()
            .with_actor_factory(actors.clone())
            .with_stream_registry(streams.clone());
        Self {
            actors,
            streams,
            locator,
        }
    }
}

pub fn wire_engine() -> CodecEngine {
    CodecEngine::with_builtin(Profile::Wire).expect("built-in surrogates register")
}

pub fn copy_engine() -> CodecEngine {
    CodecEngine::with_builtin(Profile::Copy).expect("built-in surrogates register")
}

/// Encode with `engine` and decode under `runtime` with a fresh context
pub fn roundtrip(engine: &CodecEngine, runtime: &FakeRuntime, value: &Value) -> CodecResult<Value> {
    let bytes = engine.encode(value)?;
    let context = ResolutionContext::new();
    engine.decode(&bytes, &context.resolver(&runtime.locator))
}

/// Order record with a nested shared customer
pub fn sample_order() -> Object {
    let customer = Object::new(Record::new("Customer").with_field("name", "acme"));
    Object::new(
        Record::new("Order")
            .with_field("id", 42i64)
            .with_field("billing", customer.clone())
            .with_field("shipping", customer)
            .with_field("lines", Value::Seq(vec!["widget".into(), "gadget".into()])),
    )
}

/// Doubly linked ring of `n` nodes
pub fn ring(n: usize) -> Object {
    let nodes: Vec<Object> = (0..n)
        .map(|i| Object::new(Record::new("Node").with_field("index", i as i64)))
        .collect();
    for (i, node) in nodes.iter().enumerate() {
        node.set("next", nodes[(i + 1) % n].clone());
        node.set("prev", nodes[(i + n - 1) % n].clone());
    }
    nodes[0].clone()
}
