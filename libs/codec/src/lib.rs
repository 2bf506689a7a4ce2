//! # Reference-Aware Graph Codec
//!
//! ## Purpose
//!
//! Binary encoding of message graphs that embed distributed references:
//! - Object-graph encoder/decoder with identity preservation for shared and
//!   cyclic nodes
//! - Two profiles: version-tolerant **wire** records tagged by field name, and
//!   positional **copy** records for same-process deep copies
//! - Surrogate registry swapping runtime-bound references for canonical-string
//!   proxies
//! - Resolution context that binds runtime services on first demand
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/serializer
//!     ↑           ↓             ↓
//! References  Encoding       Framing
//! Value graph Surrogates     Null marker
//! Schemas     Resolution     Deep copy
//! ```
//!
//! ## Payload Layout
//!
//! ```text
//! ┌──────────────┬─────────┬─────────┬────────────┐
//! │ magic (u32)  │ version │ profile │ root value │
//! │ "MSG1"       │ u8 = 1  │ u8      │ tagged     │
//! └──────────────┴─────────┴─────────┴────────────┘
//! ```
//!
//! All integers are little-endian. See [`ValueTag`] for the value encoding.
//!
//! ## What This Crate Does NOT Contain
//! - Length-prefixed framing or null markers (belongs in libs/serializer)
//! - Runtime service implementations (supplied by the host)

pub mod buffers;
pub mod builtin;
pub mod cloner;
pub mod constants;
mod decoder;
mod encoder;
pub mod engine;
pub mod error;
pub mod limits;
pub mod resolution;
pub mod schema;
pub mod surrogate;

pub use builtin::{builtin_tag, register_builtin};
pub use cloner::GraphCloner;
pub use constants::{Profile, ValueTag, PAYLOAD_HEADER_SIZE, PAYLOAD_MAGIC, PAYLOAD_VERSION};
pub use engine::CodecEngine;
pub use error::{CodecError, CodecResult};
pub use limits::CodecLimits;
pub use resolution::{ResolutionContext, Resolver};
pub use schema::SchemaRegistry;
pub use surrogate::{DecodeFn, EncodeFn, Proxy, SurrogateHandlers, SurrogateRegistry};
