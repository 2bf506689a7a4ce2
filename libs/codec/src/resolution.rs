//! # Resolution Context
//!
//! ## Purpose
//!
//! Lazily acquired runtime services needed to turn decoded proxies back into
//! live references. Each service kind owns a resolve-once cell:
//!
//! ```text
//! Unresolved ──(locator provides service)──► Resolved   (never reset)
//!     │
//!     └──(locator has no provider)──► DependencyUnavailable, cell stays Unresolved
//! ```
//!
//! Concurrent first calls serialise on the cell, so every caller observes the
//! same handle once one resolution wins. A failed resolution is not cached and
//! a later decode may try again.
//!
//! The context is owned by one serializer instance. The service locator is
//! not stored: each decode supplies the caller's locator through a
//! [`Resolver`], and only cells that are still unresolved consult it.

use crate::error::{CodecError, CodecResult};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use types::{ActorHandleFactory, Service, ServiceKind, ServiceLocator, StreamRegistry};

/// Per-serializer cache of runtime services
#[derive(Default)]
pub struct ResolutionContext {
    actor_factory: OnceCell<Arc<dyn ActorHandleFactory>>,
    stream_registry: OnceCell<Arc<dyn StreamRegistry>>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::ActorHandleFactory => self.actor_factory.get().is_some(),
            ServiceKind::StreamRegistry => self.stream_registry.get().is_some(),
        }
    }

    /// Bind this context to a caller's service scope for one operation
    pub fn resolver<'a>(&'a self, locator: &'a dyn ServiceLocator) -> Resolver<'a> {
        Resolver {
            context: self,
            locator,
        }
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field(
                "actor_factory",
                &self.is_resolved(ServiceKind::ActorHandleFactory),
            )
            .field(
                "stream_registry",
                &self.is_resolved(ServiceKind::StreamRegistry),
            )
            .finish()
    }
}

/// A resolution context paired with the caller's service locator
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    context: &'a ResolutionContext,
    locator: &'a dyn ServiceLocator,
}

impl<'a> Resolver<'a> {
    pub fn actor_factory(&self) -> CodecResult<Arc<dyn ActorHandleFactory>> {
        self.context
            .actor_factory
            .get_or_try_init(|| match self.lookup(ServiceKind::ActorHandleFactory)? {
                Service::ActorHandleFactory(factory) => Ok(factory),
                Service::StreamRegistry(_) => Err(self.wrong_variant(ServiceKind::ActorHandleFactory)),
            })
            .cloned()
    }

    pub fn stream_registry(&self) -> CodecResult<Arc<dyn StreamRegistry>> {
        self.context
            .stream_registry
            .get_or_try_init(|| match self.lookup(ServiceKind::StreamRegistry)? {
                Service::StreamRegistry(registry) => Ok(registry),
                Service::ActorHandleFactory(_) => Err(self.wrong_variant(ServiceKind::StreamRegistry)),
            })
            .cloned()
    }

    /// Resolve (or return the cached) service of the given kind
    pub fn get(&self, kind: ServiceKind) -> CodecResult<Service> {
        match kind {
            ServiceKind::ActorHandleFactory => self.actor_factory().map(Service::ActorHandleFactory),
            ServiceKind::StreamRegistry => self.stream_registry().map(Service::StreamRegistry),
        }
    }

    /// Resolve every service kind the locator can provide, ignoring the rest
    pub fn ensure_available(&self) -> usize {
        [ServiceKind::ActorHandleFactory, ServiceKind::StreamRegistry]
            .into_iter()
            .filter(|kind| self.get(*kind).is_ok())
            .count()
    }

    pub fn context(&self) -> &'a ResolutionContext {
        self.context
    }

    fn lookup(&self, kind: ServiceKind) -> CodecResult<Service> {
        match self.locator.get(kind) {
            Some(service) => {
                debug!(service = %kind, "Resolved runtime service");
                Ok(service)
            }
            None => {
                debug!(service = %kind, "Runtime service not available in caller scope");
                Err(CodecError::dependency_unavailable(kind))
            }
        }
    }

    fn wrong_variant(&self, kind: ServiceKind) -> CodecError {
        debug!(service = %kind, "Locator returned a service of another kind");
        CodecError::dependency_unavailable(kind)
    }
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("context", self.context)
            .finish_non_exhaustive()
    }
}
