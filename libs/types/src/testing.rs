//! Deterministic fake runtime collaborators
//!
//! The fakes memoise one endpoint per canonical id, so the handle produced
//! for an id is always the same allocation and compares equal.

use crate::error::{ReferenceError, ReferenceResult};
use crate::references::{ActorEndpoint, ActorHandle, StreamEndpoint, StreamHandle};
use crate::services::{ActorHandleFactory, StreamRegistry};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeActorEndpoint {
    pub canonical_id: String,
}

impl ActorEndpoint for FakeActorEndpoint {
    fn canonical_id(&self) -> &str {
        &self.canonical_id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeStreamEndpoint {
    pub canonical_id: String,
}

impl StreamEndpoint for FakeStreamEndpoint {
    fn canonical_id(&self) -> &str {
        &self.canonical_id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Actor-handle factory returning one memoised handle per canonical id
#[derive(Debug, Default)]
pub struct FakeActorFactory {
    handles: Mutex<HashMap<String, ActorHandle>>,
    calls: AtomicUsize,
}

impl FakeActorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle this factory produces for `canonical_id`
    pub fn handle_for(&self, canonical_id: &str) -> ActorHandle {
        self.handles
            .lock()
            .entry(canonical_id.to_string())
            .or_insert_with(|| {
                ActorHandle::new(FakeActorEndpoint {
                    canonical_id: canonical_id.to_string(),
                })
            })
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ActorHandleFactory for FakeActorFactory {
    fn create_reference(&self, canonical_id: &str) -> ReferenceResult<ActorHandle> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if canonical_id.is_empty() {
            return Err(ReferenceError::unresolvable(canonical_id, "empty id"));
        }
        Ok(self.handle_for(canonical_id))
    }
}

/// Stream registry returning one memoised handle per canonical id
#[derive(Debug, Default)]
pub struct FakeStreamRegistry {
    handles: Mutex<HashMap<String, StreamHandle>>,
    calls: AtomicUsize,
}

impl FakeStreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_for(&self, canonical_id: &str) -> StreamHandle {
        self.handles
            .lock()
            .entry(canonical_id.to_string())
            .or_insert_with(|| {
                StreamHandle::new(FakeStreamEndpoint {
                    canonical_id: canonical_id.to_string(),
                })
            })
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl StreamRegistry for FakeStreamRegistry {
    fn create_stream_reference(&self, canonical_id: &str) -> ReferenceResult<StreamHandle> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.handle_for(canonical_id))
    }
}
