//! # Codec Engine
//!
//! Entry point for encoding and decoding message graphs under one profile.
//! An engine is immutable once built and is shared freely between threads;
//! all per-call state (identity tables, layout tables) lives in the encoder
//! or decoder created for that call.

use crate::cloner::GraphCloner;
use crate::constants::Profile;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::CodecResult;
use crate::limits::CodecLimits;
use crate::resolution::Resolver;
use crate::schema::SchemaRegistry;
use crate::surrogate::SurrogateRegistry;
use std::sync::Arc;
use types::Value;

#[derive(Debug, Clone)]
pub struct CodecEngine {
    profile: Profile,
    limits: CodecLimits,
    surrogates: Arc<SurrogateRegistry>,
    schemas: Arc<SchemaRegistry>,
}

impl CodecEngine {
    pub fn new(
        profile: Profile,
        surrogates: Arc<SurrogateRegistry>,
        schemas: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            profile,
            limits: CodecLimits::default(),
            surrogates,
            schemas,
        }
    }

    /// Engine with the built-in surrogates and no schemas
    pub fn with_builtin(profile: Profile) -> CodecResult<Self> {
        Ok(Self::new(
            profile,
            Arc::new(SurrogateRegistry::with_builtin()?),
            Arc::new(SchemaRegistry::new()),
        ))
    }

    pub fn with_limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn limits(&self) -> CodecLimits {
        self.limits
    }

    pub fn surrogates(&self) -> &SurrogateRegistry {
        &self.surrogates
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
        Encoder::new(self.profile, self.limits, &self.surrogates).encode(value)
    }

    /// In-memory copy equivalent to a copy-profile round trip
    ///
    /// References pass through their surrogates and `resolver`, so the copy
    /// fails wherever the round trip would.
    pub fn deep_clone(&self, value: &Value, resolver: &Resolver<'_>) -> CodecResult<Value> {
        GraphCloner::rebinding(self.limits, &self.surrogates, *resolver).clone_value(value)
    }

    /// Decode one payload; `resolver` supplies services to reference surrogates
    pub fn decode(&self, payload: &[u8], resolver: &Resolver<'_>) -> CodecResult<Value> {
        Decoder::new(
            self.profile,
            self.limits,
            &self.surrogates,
            &self.schemas,
            *resolver,
            payload,
        )
        .decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PAYLOAD_HEADER_SIZE;
    use crate::error::CodecError;
    use crate::resolution::ResolutionContext;
    use types::{NullServiceLocator, Object, Record, RecordSchema};

    fn roundtrip(engine: &CodecEngine, value: &Value) -> Value {
        let bytes = engine.encode(value).unwrap();
        let context = ResolutionContext::new();
        engine
            .decode(&bytes, &context.resolver(&NullServiceLocator))
            .unwrap()
    }

    fn engines() -> [CodecEngine; 2] {
        [
            CodecEngine::with_builtin(Profile::Wire).unwrap(),
            CodecEngine::with_builtin(Profile::Copy).unwrap(),
        ]
    }

    #[test]
    fn test_primitives_roundtrip() {
        let value = Value::Seq(vec![
            Value::Null,
            true.into(),
            (-7i64).into(),
            u64::MAX.into(),
            1.5f64.into(),
            "text".into(),
            vec![0u8, 1, 2].into(),
        ]);
        for engine in engines() {
            assert_eq!(roundtrip(&engine, &value), value);
        }
    }

    #[test]
    fn test_shared_object_decodes_to_one_instance() {
        let inner = Object::new(Record::new("Inner").with_field("x", 1i64));
        let outer = Object::new(
            Record::new("Outer")
                .with_field("left", inner.clone())
                .with_field("right", inner),
        );
        for engine in engines() {
            let decoded = roundtrip(&engine, &outer.clone().into());
            let decoded = decoded.as_object().unwrap();
            let left = decoded.get("left").unwrap();
            let right = decoded.get("right").unwrap();
            assert!(left.as_object().unwrap().ptr_eq(right.as_object().unwrap()));
        }
    }

    #[test]
    fn test_cycle_roundtrip() {
        let node = Object::empty("Node");
        node.set("next", node.clone());
        for engine in engines() {
            let decoded = roundtrip(&engine, &node.clone().into());
            let decoded = decoded.as_object().unwrap();
            let next = decoded.get("next").unwrap();
            assert!(next.as_object().unwrap().ptr_eq(decoded));
        }
    }

    #[test]
    fn test_copy_profile_reuses_layouts() {
        let engine = CodecEngine::with_builtin(Profile::Copy).unwrap();
        let one = |n: i64| Value::from(Object::new(Record::new("P").with_field("n", n)));
        let single = engine.encode(&Value::Seq(vec![one(1)])).unwrap();
        let double = engine.encode(&Value::Seq(vec![one(1), one(2)])).unwrap();
        // Second record: tag + layout index + int
        assert_eq!(double.len() - single.len(), 1 + 4 + 9);
    }

    #[test]
    fn test_profile_mismatch_rejected() {
        let wire = CodecEngine::with_builtin(Profile::Wire).unwrap();
        let copy = CodecEngine::with_builtin(Profile::Copy).unwrap();
        let bytes = wire.encode(&Value::Int(1)).unwrap();
        let context = ResolutionContext::new();
        let err = copy
            .decode(&bytes, &context.resolver(&NullServiceLocator))
            .unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_trailing_and_truncated_input_rejected() {
        let engine = CodecEngine::with_builtin(Profile::Wire).unwrap();
        let context = ResolutionContext::new();
        let resolver = context.resolver(&NullServiceLocator);
        let mut bytes = engine.encode(&Value::Str("hello".into())).unwrap();

        let truncated = &bytes[..bytes.len() - 1];
        assert!(engine.decode(truncated, &resolver).unwrap_err().is_decode_error());

        bytes.push(0);
        assert!(engine.decode(&bytes, &resolver).unwrap_err().is_decode_error());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let engine = CodecEngine::with_builtin(Profile::Wire).unwrap();
        let mut bytes = engine.encode(&Value::Null).unwrap();
        bytes[PAYLOAD_HEADER_SIZE] = 0x7f;
        let context = ResolutionContext::new();
        match engine.decode(&bytes, &context.resolver(&NullServiceLocator)) {
            Err(CodecError::Decode { offset, .. }) => assert_eq!(offset, PAYLOAD_HEADER_SIZE),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit_on_encode() {
        let engine = CodecEngine::with_builtin(Profile::Wire)
            .unwrap()
            .with_limits(CodecLimits::new(3, 1024));
        let deep = Value::Seq(vec![Value::Seq(vec![Value::Seq(vec![Value::Seq(vec![])])])]);
        assert!(matches!(
            engine.encode(&deep),
            Err(CodecError::DepthExceeded { limit: 3, .. })
        ));
    }

    #[test]
    fn test_wire_schema_evolution() {
        let v1 = Object::new(Record::new("Quote").with_field("a", 1i64).with_field("b", 2i64));
        let v2 = Object::new(
            Record::new("Quote")
                .with_field("c", 3i64)
                .with_field("b", 2i64)
                .with_field("a", 1i64),
        );

        let mut v2_schemas = SchemaRegistry::new();
        v2_schemas
            .register(
                RecordSchema::new("Quote")
                    .field("a")
                    .field("b")
                    .field_with_default("c", 30i64),
            )
            .unwrap();
        let mut v1_schemas = SchemaRegistry::new();
        v1_schemas
            .register(RecordSchema::new("Quote").field("a").field("b"))
            .unwrap();

        let surrogates = Arc::new(SurrogateRegistry::with_builtin().unwrap());
        let v1_engine = CodecEngine::new(Profile::Wire, surrogates.clone(), Arc::new(v1_schemas));
        let v2_engine = CodecEngine::new(Profile::Wire, surrogates, Arc::new(v2_schemas));

        let upgraded = roundtrip_between(&v1_engine, &v2_engine, &v1.into());
        let upgraded = upgraded.as_object().unwrap().snapshot();
        assert_eq!(upgraded.field_names(), vec!["a", "b", "c"]);
        assert_eq!(upgraded.get("c"), Some(&Value::Int(30)));

        let downgraded = roundtrip_between(&v2_engine, &v1_engine, &v2.into());
        let downgraded = downgraded.as_object().unwrap().snapshot();
        assert_eq!(downgraded.field_names(), vec!["a", "b"]);
        assert_eq!(downgraded.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_object_defaults_are_fresh_per_decode() {
        let mut reader_schemas = SchemaRegistry::new();
        reader_schemas
            .register(
                RecordSchema::new("Quote")
                    .field("a")
                    .field_with_default("meta", Object::new(Record::new("Meta").with_field("n", 1i64))),
            )
            .unwrap();
        let writer = CodecEngine::with_builtin(Profile::Wire).unwrap();
        let reader = CodecEngine::new(
            Profile::Wire,
            Arc::new(SurrogateRegistry::with_builtin().unwrap()),
            Arc::new(reader_schemas),
        );
        let v1: Value = Object::new(Record::new("Quote").with_field("a", 1i64)).into();

        let first = roundtrip_between(&writer, &reader, &v1);
        let first_meta = first.as_object().unwrap().get("meta").unwrap();
        first_meta.as_object().unwrap().set("n", 99i64);

        let second = roundtrip_between(&writer, &reader, &v1);
        let second_meta = second.as_object().unwrap().get("meta").unwrap();
        assert!(!first_meta.as_object().unwrap().ptr_eq(second_meta.as_object().unwrap()));
        assert_eq!(second_meta.as_object().unwrap().get("n"), Some(Value::Int(1)));

        let schema_default = reader.schemas().get("Quote").unwrap().fields()[1].default_value();
        assert_eq!(schema_default.as_object().unwrap().get("n"), Some(Value::Int(1)));
    }

    fn roundtrip_between(from: &CodecEngine, to: &CodecEngine, value: &Value) -> Value {
        let bytes = from.encode(value).unwrap();
        let context = ResolutionContext::new();
        to.decode(&bytes, &context.resolver(&NullServiceLocator))
            .unwrap()
    }
}
