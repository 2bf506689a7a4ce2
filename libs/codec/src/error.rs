//! Codec errors for graph encoding, decoding and registry setup
//!
//! Setup errors (duplicate or ambiguous registrations) are raised while the
//! registries are assembled and never at encode time. Encode and decode errors
//! abort only the operation in progress; the tables they touched are local to
//! that call.

use thiserror::Error;
use types::{ReferenceError, ReferenceKind, ServiceKind};

/// Serialization errors with diagnostic context
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// Value cannot be encoded: not a primitive, record, or reference with a surrogate
    #[error("Unsupported type '{type_name}': {reason}")]
    UnsupportedType { type_name: String, reason: String },

    /// Malformed input: corrupt framing, unknown tag, truncated buffer
    #[error("Decode error at byte {offset}: {description} (buffer: {buffer_size} bytes)")]
    Decode {
        offset: usize,
        description: String,
        buffer_size: usize,
    },

    /// A decode function needed a runtime service the caller's scope does not provide
    #[error("Dependency unavailable: no {service} in the current service scope")]
    DependencyUnavailable { service: ServiceKind },

    /// Second surrogate registered for the same reference kind
    #[error("Duplicate surrogate for reference kind {kind}")]
    DuplicateSurrogate { kind: ReferenceKind },

    /// Two kinds claim the same proxy tag, so decoded proxies would be ambiguous
    #[error("Ambiguous surrogate: {kind} and {existing} both claim proxy tag {tag:#04x}")]
    AmbiguousSurrogate {
        kind: ReferenceKind,
        existing: ReferenceKind,
        tag: u8,
    },

    /// Second schema registered for the same record type
    #[error("Duplicate schema for record type '{type_name}'")]
    DuplicateSchema { type_name: String },

    /// Graph nesting exceeds the configured depth limit
    #[error("Nesting depth exceeds limit {limit} while {operation}")]
    DepthExceeded { limit: usize, operation: &'static str },

    /// Declared or actual length exceeds a configured limit
    #[error("Length {size} exceeds limit {limit} ({context})")]
    LengthExceeded {
        size: usize,
        limit: usize,
        context: String,
    },

    /// Runtime collaborator refused to bind a reference
    #[error("Reference binding failed: {0}")]
    Reference(#[from] ReferenceError),
}

impl CodecError {
    pub fn unsupported(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(offset: usize, description: impl Into<String>, buffer_size: usize) -> Self {
        Self::Decode {
            offset,
            description: description.into(),
            buffer_size,
        }
    }

    /// Create a Decode error for a buffer that ends before the declared data
    pub fn truncated(offset: usize, need: usize, buffer_size: usize, context: &str) -> Self {
        let available = buffer_size.saturating_sub(offset);
        Self::decode(
            offset,
            format!("truncated {context}: need {need} bytes, {available} available"),
            buffer_size,
        )
    }

    pub fn unknown_tag(offset: usize, tag: u8, buffer_size: usize) -> Self {
        Self::decode(offset, format!("unknown value tag {tag:#04x}"), buffer_size)
    }

    pub fn dependency_unavailable(service: ServiceKind) -> Self {
        Self::DependencyUnavailable { service }
    }

    pub fn length_exceeded(size: usize, limit: usize, context: impl Into<String>) -> Self {
        Self::LengthExceeded {
            size,
            limit,
            context: context.into(),
        }
    }

    /// Rewrite malformed reference input into a decode error at `offset`
    ///
    /// Runtime binding failures keep their own variant.
    pub fn at_offset(self, offset: usize, buffer_size: usize) -> Self {
        match self {
            CodecError::Reference(err) if err.is_malformed() => {
                Self::decode(offset, err.to_string(), buffer_size)
            }
            other => other,
        }
    }

    /// True for errors raised while assembling registries
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            CodecError::DuplicateSurrogate { .. }
                | CodecError::AmbiguousSurrogate { .. }
                | CodecError::DuplicateSchema { .. }
        )
    }

    pub fn is_decode_error(&self) -> bool {
        matches!(self, CodecError::Decode { .. })
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
