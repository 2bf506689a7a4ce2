//! # Codec Limits
//!
//! Bounds applied to both directions so hostile or corrupt input cannot drive
//! unbounded recursion or allocation.

use serde::{Deserialize, Serialize};

/// Encode/decode limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecLimits {
    /// Maximum nesting of sequences and records
    pub max_depth: usize,
    /// Maximum length of a string, byte array or sequence
    pub max_length: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_length: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl CodecLimits {
    pub fn new(max_depth: usize, max_length: usize) -> Self {
        Self {
            max_depth,
            max_length,
        }
    }
}
