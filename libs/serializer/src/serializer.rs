//! # Message Serializer
//!
//! ## Purpose
//!
//! The boundary the host runtime talks to. Wraps two codec engines sharing one
//! surrogate and schema registry:
//!
//! - **wire** engine for `serialize` / `deserialize`: version-tolerant records
//! - **copy** engine for `deep_copy` when the round-trip strategy is selected
//!
//! ## Runtime Binding
//!
//! Construction never touches runtime services. Each decode receives the
//! caller's [`ServiceLocator`]; a service is looked up the first time a
//! reference needs it and stays bound for the life of this serializer, even
//! when a later call comes from a different scope. A decode that needs no
//! service succeeds with any locator, including [`NullServiceLocator`].
//!
//! [`NullServiceLocator`]: types::NullServiceLocator

use crate::builder::MessageSerializerBuilder;
use crate::frame::{read_frame, write_frame, write_null, FRAME_HEADER_SIZE};
use crate::metrics::SerializerMetrics;
use bytes::{Buf, Bytes, BytesMut};
use codec::{CodecEngine, CodecError, CodecResult, ResolutionContext};
use serializer_config::{CopyStrategy, SerializerSettings};
use std::sync::Arc;
use tracing::{debug, warn};
use types::{ReferenceKind, ServiceKind, ServiceLocator, Value};

#[derive(Debug)]
pub struct MessageSerializer {
    wire: CodecEngine,
    copier: CodecEngine,
    context: ResolutionContext,
    settings: SerializerSettings,
    metrics: Arc<SerializerMetrics>,
}

impl MessageSerializer {
    /// Serializer with the built-in surrogates and default settings
    pub fn new() -> CodecResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> MessageSerializerBuilder {
        MessageSerializerBuilder::new()
    }

    pub(crate) fn from_parts(
        wire: CodecEngine,
        copier: CodecEngine,
        settings: SerializerSettings,
    ) -> Self {
        Self {
            wire,
            copier,
            context: ResolutionContext::new(),
            settings,
            metrics: SerializerMetrics::new(),
        }
    }

    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    pub fn metrics(&self) -> Arc<SerializerMetrics> {
        self.metrics.clone()
    }

    /// Encode one message as a frame
    pub fn serialize(&self, value: &Value) -> CodecResult<Bytes> {
        let mut buf = BytesMut::new();
        self.serialize_into(value, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Append one frame to `buf`; on error `buf` is left unchanged
    pub fn serialize_into(&self, value: &Value, buf: &mut BytesMut) -> CodecResult<()> {
        if value.is_null() {
            write_null(buf);
            self.metrics.record_null();
            return Ok(());
        }

        let payload = self
            .wire
            .encode(value)
            .and_then(|payload| {
                write_frame(buf, &payload, self.settings.max_frame_bytes)?;
                Ok(payload)
            })
            .map_err(|e| {
                self.metrics.record_encode_failure();
                debug!(error = %e, "Message serialization failed");
                e
            })?;
        self.metrics
            .record_serialized(FRAME_HEADER_SIZE + payload.len());
        Ok(())
    }

    /// Decode exactly one frame occupying all of `bytes`
    pub fn deserialize(&self, bytes: &[u8], locator: &dyn ServiceLocator) -> CodecResult<Value> {
        let mut reader = bytes;
        let decoded = self
            .decode_frame(&mut reader, locator)
            .and_then(|decoded| {
                if reader.is_empty() {
                    return Ok(decoded);
                }
                let consumed = bytes.len() - reader.len();
                Err(CodecError::decode(
                    consumed,
                    format!("{} bytes after the frame", reader.len()),
                    bytes.len(),
                ))
            })
            .map_err(|e| self.decode_failed(e))?;
        Ok(self.record_decoded(decoded))
    }

    /// Decode the next frame from a stream of frames
    pub fn deserialize_from<B: Buf>(
        &self,
        buf: &mut B,
        locator: &dyn ServiceLocator,
    ) -> CodecResult<Value> {
        let decoded = self
            .decode_frame(buf, locator)
            .map_err(|e| self.decode_failed(e))?;
        Ok(self.record_decoded(decoded))
    }

    /// Next frame's value and frame size; `None` for a null frame
    fn decode_frame<B: Buf>(
        &self,
        buf: &mut B,
        locator: &dyn ServiceLocator,
    ) -> CodecResult<Option<(Value, usize)>> {
        match read_frame(buf, self.settings.max_frame_bytes)? {
            None => Ok(None),
            Some(payload) => {
                let value = self
                    .wire
                    .decode(&payload, &self.context.resolver(locator))?;
                Ok(Some((value, FRAME_HEADER_SIZE + payload.len())))
            }
        }
    }

    fn record_decoded(&self, decoded: Option<(Value, usize)>) -> Value {
        match decoded {
            None => {
                self.metrics.record_null();
                Value::Null
            }
            Some((value, frame_len)) => {
                self.metrics.record_deserialized(frame_len);
                value
            }
        }
    }

    fn decode_failed(&self, e: CodecError) -> CodecError {
        self.metrics.record_decode_failure();
        warn!(error = %e, "Message deserialization failed");
        e
    }

    /// Independent copy of `value` preserving shared and cyclic structure
    ///
    /// Both strategies rebind references through `locator` and fail alike;
    /// the clone strategy produces no bytes.
    pub fn deep_copy(&self, value: &Value, locator: &dyn ServiceLocator) -> CodecResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let copy = match self.settings.copy_strategy {
            CopyStrategy::Clone => self
                .copier
                .deep_clone(value, &self.context.resolver(locator)),
            CopyStrategy::RoundTrip => self.copier.encode(value).and_then(|payload| {
                self.copier
                    .decode(&payload, &self.context.resolver(locator))
            }),
        };
        match copy {
            Ok(copy) => {
                self.metrics.record_deep_copy();
                Ok(copy)
            }
            Err(e) => {
                debug!(error = %e, "Deep copy failed");
                Err(e)
            }
        }
    }

    /// Whether this serializer handles messages of the named type
    ///
    /// Every named record type is encodable, with or without a schema.
    /// Reference kinds need a registered surrogate.
    pub fn supports_type(&self, type_name: &str) -> bool {
        if type_name.is_empty() {
            return false;
        }
        match ReferenceKind::from_type_name(type_name) {
            Some(kind) => self.wire.surrogates().contains(kind),
            None => true,
        }
    }

    /// Bind every service `locator` provides ahead of the first decode
    ///
    /// Optional: decodes bind lazily. Returns the number of bound services.
    pub fn ensure_dependencies(&self, locator: &dyn ServiceLocator) -> usize {
        let bound = self.context.resolver(locator).ensure_available();
        debug!(bound, "Runtime services bound");
        bound
    }

    pub fn is_bound(&self, service: ServiceKind) -> bool {
        self.context.is_resolved(service)
    }
}
