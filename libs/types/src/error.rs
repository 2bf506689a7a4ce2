//! Errors raised while parsing or binding distributed references
//!
//! Canonical string forms are validated on both construction and parsing, so a
//! malformed address never reaches a runtime collaborator.

use thiserror::Error;

/// Reference construction and binding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// Canonical form does not follow `<scope>:<id>`
    #[error("Malformed {kind} canonical form '{input}': expected '<scope>:<id>' with both parts non-empty")]
    MalformedPath { kind: &'static str, input: String },

    /// A path component violates the address grammar
    #[error("Invalid {kind} component '{component}': {reason}")]
    InvalidComponent {
        kind: &'static str,
        component: String,
        reason: &'static str,
    },

    /// The runtime collaborator refused to produce a handle
    #[error("Runtime could not bind '{canonical_id}': {reason}")]
    Unresolvable { canonical_id: String, reason: String },
}

impl ReferenceError {
    pub fn malformed_path(kind: &'static str, input: impl Into<String>) -> Self {
        Self::MalformedPath {
            kind,
            input: input.into(),
        }
    }

    pub fn invalid_component(
        kind: &'static str,
        component: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidComponent {
            kind,
            component: component.into(),
            reason,
        }
    }

    /// Create an Unresolvable error for collaborators that cannot bind an address
    pub fn unresolvable(canonical_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unresolvable {
            canonical_id: canonical_id.into(),
            reason: reason.into(),
        }
    }

    /// True when the error describes bad input rather than a runtime failure
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ReferenceError::MalformedPath { .. } | ReferenceError::InvalidComponent { .. }
        )
    }
}

/// Result type for reference operations
pub type ReferenceResult<T> = std::result::Result<T, ReferenceError>;
