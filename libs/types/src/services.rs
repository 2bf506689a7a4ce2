//! Runtime Collaborator Contracts
//!
//! Services supplied by the hosting actor runtime. They are needed only to
//! turn a decoded canonical string back into a live handle, so encoders never
//! touch them.

use crate::error::ReferenceResult;
use crate::references::{ActorHandle, StreamHandle};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Produces live actor handles from canonical ids
pub trait ActorHandleFactory: Send + Sync {
    fn create_reference(&self, canonical_id: &str) -> ReferenceResult<ActorHandle>;
}

/// Produces live stream handles from canonical ids
pub trait StreamRegistry: Send + Sync {
    fn create_stream_reference(&self, canonical_id: &str) -> ReferenceResult<StreamHandle>;
}

/// Service kinds a locator can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    ActorHandleFactory,
    StreamRegistry,
}

impl ServiceKind {
    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::ActorHandleFactory => "actor-handle factory",
            ServiceKind::StreamRegistry => "stream registry",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A service instance handed out by a locator
#[derive(Clone)]
pub enum Service {
    ActorHandleFactory(Arc<dyn ActorHandleFactory>),
    StreamRegistry(Arc<dyn StreamRegistry>),
}

impl Service {
    pub fn kind(&self) -> ServiceKind {
        match self {
            Service::ActorHandleFactory(_) => ServiceKind::ActorHandleFactory,
            Service::StreamRegistry(_) => ServiceKind::StreamRegistry,
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service({})", self.kind())
    }
}

/// Ambient service provider of the calling runtime scope
pub trait ServiceLocator: Send + Sync {
    fn get(&self, kind: ServiceKind) -> Option<Service>;
}

/// Locator that provides nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullServiceLocator;

impl ServiceLocator for NullServiceLocator {
    fn get(&self, _kind: ServiceKind) -> Option<Service> {
        None
    }
}

/// Map-backed locator for hosts that wire services by hand
#[derive(Debug, Clone, Default)]
pub struct ServiceMap {
    services: HashMap<ServiceKind, Service>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the service of the given variant's kind
    pub fn with(mut self, service: Service) -> Self {
        self.insert(service);
        self
    }

    pub fn insert(&mut self, service: Service) -> Option<Service> {
        self.services.insert(service.kind(), service)
    }

    pub fn with_actor_factory(self, factory: Arc<dyn ActorHandleFactory>) -> Self {
        self.with(Service::ActorHandleFactory(factory))
    }

    pub fn with_stream_registry(self, registry: Arc<dyn StreamRegistry>) -> Self {
        self.with(Service::StreamRegistry(registry))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceLocator for ServiceMap {
    fn get(&self, kind: ServiceKind) -> Option<Service> {
        self.services.get(&kind).cloned()
    }
}

impl<L: ServiceLocator + ?Sized> ServiceLocator for Arc<L> {
    fn get(&self, kind: ServiceKind) -> Option<Service> {
        (**self).get(kind)
    }
}
