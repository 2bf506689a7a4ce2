//! Runtime counters for one serializer instance

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SerializerMetrics {
    /// Non-null messages encoded
    pub messages_serialized: AtomicU64,
    /// Non-null messages decoded
    pub messages_deserialized: AtomicU64,
    /// Null markers written or read; the codec is not involved
    pub null_frames: AtomicU64,
    pub bytes_written: AtomicU64,
    pub bytes_read: AtomicU64,
    pub encode_failures: AtomicU64,
    pub decode_failures: AtomicU64,
    pub deep_copies: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub messages_serialized: u64,
    pub messages_deserialized: u64,
    pub null_frames: u64,
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub encode_failures: u64,
    pub decode_failures: u64,
    pub deep_copies: u64,
}

impl SerializerMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_serialized(&self, frame_bytes: usize) {
        self.messages_serialized.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(frame_bytes as u64, Ordering::Relaxed);
    }

    pub fn record_deserialized(&self, frame_bytes: usize) {
        self.messages_deserialized.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(frame_bytes as u64, Ordering::Relaxed);
    }

    pub fn record_null(&self) {
        self.null_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_encode_failure(&self) {
        self.encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deep_copy(&self) {
        self.deep_copies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_serialized: self.messages_serialized.load(Ordering::Relaxed),
            messages_deserialized: self.messages_deserialized.load(Ordering::Relaxed),
            null_frames: self.null_frames.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            encode_failures: self.encode_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            deep_copies: self.deep_copies.load(Ordering::Relaxed),
        }
    }
}
