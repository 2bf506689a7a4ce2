//! # Message Serializer
//!
//! ## Purpose
//!
//! Serializer facade for actor messages that embed distributed references.
//! Messages are encoded by the reference-aware graph codec and framed with a
//! null marker and a fixed-width length prefix:
//!
//! ```text
//! host runtime → MessageSerializer → CodecEngine ──► surrogates (encode)
//!                      │                  │
//!                   framing               └──► resolution context (decode)
//! ```
//!
//! ## Operations
//!
//! - [`MessageSerializer::serialize`] / [`MessageSerializer::deserialize`]: wire profile, framed
//! - [`MessageSerializer::deep_copy`]: independent copy with identity structure preserved
//! - [`MessageSerializer::supports_type`]: whether a type should be routed here
//!
//! ## Example
//!
//! ```rust
//! use message_serializer::MessageSerializer;
//! use types::{NullServiceLocator, Object, Record, Value};
//!
//! let serializer = MessageSerializer::new().unwrap();
//! let order = Object::new(Record::new("Order").with_field("qty", 5i64));
//!
//! let frame = serializer.serialize(&order.into()).unwrap();
//! let decoded = serializer.deserialize(&frame, &NullServiceLocator).unwrap();
//! assert_eq!(decoded.as_object().unwrap().get("qty"), Some(Value::Int(5)));
//! ```

pub mod builder;
pub mod frame;
pub mod metrics;
pub mod serializer;

pub use builder::MessageSerializerBuilder;
pub use codec::{CodecError, CodecResult, Proxy, Resolver};
pub use metrics::{MetricsSnapshot, SerializerMetrics};
pub use serializer::MessageSerializer;
pub use serializer_config::{CopyStrategy, SerializerSettings};
