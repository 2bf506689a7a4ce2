//! Serializer construction
//!
//! Registrations accumulate on the builder; the first setup error is kept and
//! returned from [`MessageSerializerBuilder::build`], so a misconfigured
//! serializer is never constructed.

use crate::serializer::MessageSerializer;
use codec::{
    register_builtin, CodecEngine, CodecError, CodecLimits, CodecResult, Profile, Proxy,
    Resolver, SchemaRegistry, SurrogateRegistry,
};
use serializer_config::SerializerSettings;
use std::sync::Arc;
use tracing::debug;
use types::{RecordSchema, Reference, ReferenceKind};

#[derive(Debug)]
pub struct MessageSerializerBuilder {
    surrogates: SurrogateRegistry,
    schemas: SchemaRegistry,
    settings: SerializerSettings,
    error: Option<CodecError>,
}

impl Default for MessageSerializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSerializerBuilder {
    /// Builder preloaded with the built-in reference surrogates
    pub fn new() -> Self {
        let mut builder = Self::empty();
        if let Err(e) = register_builtin(&mut builder.surrogates) {
            builder.error = Some(e);
        }
        builder
    }

    /// Builder with no surrogates registered
    pub fn empty() -> Self {
        Self {
            surrogates: SurrogateRegistry::new(),
            schemas: SchemaRegistry::new(),
            settings: SerializerSettings::default(),
            error: None,
        }
    }

    pub fn surrogate<E, D>(mut self, kind: ReferenceKind, proxy_tag: u8, encode: E, decode: D) -> Self
    where
        E: Fn(&Reference) -> CodecResult<Proxy> + Send + Sync + 'static,
        D: Fn(Proxy, &Resolver<'_>) -> CodecResult<Reference> + Send + Sync + 'static,
    {
        if self.error.is_none() {
            if let Err(e) = self.surrogates.register(kind, proxy_tag, encode, decode) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn schema(mut self, schema: RecordSchema) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.schemas.register(schema) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn settings(mut self, settings: SerializerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> CodecResult<MessageSerializer> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let limits = CodecLimits::new(self.settings.max_depth, self.settings.max_length);
        let surrogates = Arc::new(self.surrogates);
        let schemas = Arc::new(self.schemas);
        debug!(
            surrogates = surrogates.len(),
            schemas = schemas.len(),
            ?limits,
            "Building message serializer"
        );

        let wire = CodecEngine::new(Profile::Wire, surrogates.clone(), schemas.clone())
            .with_limits(limits);
        let copier = CodecEngine::new(Profile::Copy, surrogates, schemas).with_limits(limits);
        Ok(MessageSerializer::from_parts(wire, copier, self.settings))
    }
}
