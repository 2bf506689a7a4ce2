//! # Distributed References
//!
//! ## Purpose
//!
//! Logical addresses (actor and stream paths) and their runtime-bound
//! counterparts (actor, stream and client references). A path is pure data and
//! is fully described by its canonical string. A reference pairs that string
//! with a handle produced by the hosting runtime, which is never written to the
//! wire.
//!
//! ## Canonical Forms
//!
//! ```text
//! ActorPath   "<interface>:<id>"     e.g. "Inventory:warehouse-7"
//! StreamPath  "<provider>:<id>"      e.g. "sms:orders"
//! ActorRef    canonical form of its ActorPath
//! StreamRef   canonical form of its StreamPath
//! ClientRef   the client id
//! ```
//!
//! The scope part (interface or provider) never contains `:`; the id may.

use crate::error::{ReferenceError, ReferenceResult};
use crate::services::{ActorHandleFactory, StreamRegistry};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

const SEPARATOR: char = ':';

fn split_canonical<'a>(kind: &'static str, input: &'a str) -> ReferenceResult<(&'a str, &'a str)> {
    match input.split_once(SEPARATOR) {
        Some((scope, id)) if !scope.is_empty() && !id.is_empty() => Ok((scope, id)),
        _ => Err(ReferenceError::malformed_path(kind, input)),
    }
}

fn validate_scope(kind: &'static str, scope: &str) -> ReferenceResult<()> {
    if scope.is_empty() {
        return Err(ReferenceError::invalid_component(kind, scope, "must not be empty"));
    }
    if scope.contains(SEPARATOR) {
        return Err(ReferenceError::invalid_component(kind, scope, "must not contain ':'"));
    }
    Ok(())
}

fn validate_id(kind: &'static str, id: &str) -> ReferenceResult<()> {
    if id.is_empty() {
        return Err(ReferenceError::invalid_component(kind, id, "must not be empty"));
    }
    Ok(())
}

/// Logical address of an actor, independent of any runtime handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorPath {
    interface: String,
    id: String,
}

impl ActorPath {
    pub const KIND: &'static str = "actor path";

    pub fn new(interface: impl Into<String>, id: impl Into<String>) -> ReferenceResult<Self> {
        let interface = interface.into();
        let id = id.into();
        validate_scope(Self::KIND, &interface)?;
        validate_id(Self::KIND, &id)?;
        Ok(Self { interface, id })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Canonical string form
    pub fn serialize(&self) -> String {
        format!("{}{}{}", self.interface, SEPARATOR, self.id)
    }

    /// Parse a canonical string form
    pub fn deserialize(input: &str) -> ReferenceResult<Self> {
        let (interface, id) = split_canonical(Self::KIND, input)?;
        Self::new(interface, id)
    }
}

impl fmt::Display for ActorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.interface, SEPARATOR, self.id)
    }
}

/// Logical address of a stream, independent of any runtime handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamPath {
    provider: String,
    id: String,
}

impl StreamPath {
    pub const KIND: &'static str = "stream path";

    pub fn new(provider: impl Into<String>, id: impl Into<String>) -> ReferenceResult<Self> {
        let provider = provider.into();
        let id = id.into();
        validate_scope(Self::KIND, &provider)?;
        validate_id(Self::KIND, &id)?;
        Ok(Self { provider, id })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn serialize(&self) -> String {
        format!("{}{}{}", self.provider, SEPARATOR, self.id)
    }

    pub fn deserialize(input: &str) -> ReferenceResult<Self> {
        let (provider, id) = split_canonical(Self::KIND, input)?;
        Self::new(provider, id)
    }
}

impl fmt::Display for StreamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.provider, SEPARATOR, self.id)
    }
}

/// Runtime-side endpoint behind an [`ActorHandle`]
pub trait ActorEndpoint: fmt::Debug + Send + Sync + 'static {
    /// Canonical id the endpoint was created for
    fn canonical_id(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// Runtime-side endpoint behind a [`StreamHandle`]
pub trait StreamEndpoint: fmt::Debug + Send + Sync + 'static {
    fn canonical_id(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// Live, runtime-bound actor handle
///
/// Two handles are equal only when they share the same endpoint allocation.
#[derive(Clone)]
pub struct ActorHandle {
    endpoint: Arc<dyn ActorEndpoint>,
}

impl ActorHandle {
    pub fn new<E: ActorEndpoint>(endpoint: E) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
        }
    }

    pub fn from_arc(endpoint: Arc<dyn ActorEndpoint>) -> Self {
        Self { endpoint }
    }

    pub fn canonical_id(&self) -> &str {
        self.endpoint.canonical_id()
    }

    pub fn endpoint(&self) -> &dyn ActorEndpoint {
        self.endpoint.as_ref()
    }

    /// Downcast to the concrete endpoint type supplied by the runtime
    pub fn downcast_ref<E: ActorEndpoint>(&self) -> Option<&E> {
        self.endpoint.as_any().downcast_ref::<E>()
    }
}

impl PartialEq for ActorHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.endpoint) as *const () == Arc::as_ptr(&other.endpoint) as *const ()
    }
}

impl Eq for ActorHandle {}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActorHandle").field(&self.endpoint).finish()
    }
}

/// Live, runtime-bound stream handle
#[derive(Clone)]
pub struct StreamHandle {
    endpoint: Arc<dyn StreamEndpoint>,
}

impl StreamHandle {
    pub fn new<E: StreamEndpoint>(endpoint: E) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
        }
    }

    pub fn from_arc(endpoint: Arc<dyn StreamEndpoint>) -> Self {
        Self { endpoint }
    }

    pub fn canonical_id(&self) -> &str {
        self.endpoint.canonical_id()
    }

    pub fn endpoint(&self) -> &dyn StreamEndpoint {
        self.endpoint.as_ref()
    }

    pub fn downcast_ref<E: StreamEndpoint>(&self) -> Option<&E> {
        self.endpoint.as_any().downcast_ref::<E>()
    }
}

impl PartialEq for StreamHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.endpoint) as *const () == Arc::as_ptr(&other.endpoint) as *const ()
    }
}

impl Eq for StreamHandle {}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StreamHandle").field(&self.endpoint).finish()
    }
}

/// Actor reference: an actor path bound to a live handle
///
/// Equality is observational: two references to the same path are equal even
/// when they were bound by different runtimes.
#[derive(Debug, Clone)]
pub struct ActorRef {
    path: ActorPath,
    handle: ActorHandle,
}

impl ActorRef {
    pub fn new(path: ActorPath, handle: ActorHandle) -> Self {
        Self { path, handle }
    }

    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    pub fn handle(&self) -> &ActorHandle {
        &self.handle
    }

    pub fn serialize(&self) -> String {
        self.path.serialize()
    }

    /// Rebind a canonical form through the runtime's actor-handle factory
    pub fn deserialize(input: &str, factory: &dyn ActorHandleFactory) -> ReferenceResult<Self> {
        let path = ActorPath::deserialize(input)?;
        let handle = factory.create_reference(input)?;
        Ok(Self { path, handle })
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ActorRef {}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref:{}", self.path)
    }
}

/// Stream reference: a stream path bound to a live handle
#[derive(Debug, Clone)]
pub struct StreamRef {
    path: StreamPath,
    handle: StreamHandle,
}

impl StreamRef {
    pub fn new(path: StreamPath, handle: StreamHandle) -> Self {
        Self { path, handle }
    }

    pub fn path(&self) -> &StreamPath {
        &self.path
    }

    pub fn handle(&self) -> &StreamHandle {
        &self.handle
    }

    pub fn serialize(&self) -> String {
        self.path.serialize()
    }

    pub fn deserialize(input: &str, registry: &dyn StreamRegistry) -> ReferenceResult<Self> {
        let path = StreamPath::deserialize(input)?;
        let handle = registry.create_stream_reference(input)?;
        Ok(Self { path, handle })
    }
}

impl PartialEq for StreamRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for StreamRef {}

impl fmt::Display for StreamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream:{}", self.path)
    }
}

/// Client reference: an external client observer addressed through the
/// actor-handle factory
#[derive(Debug, Clone)]
pub struct ClientRef {
    id: String,
    handle: ActorHandle,
}

impl ClientRef {
    pub const KIND: &'static str = "client reference";

    pub fn new(id: impl Into<String>, handle: ActorHandle) -> ReferenceResult<Self> {
        let id = id.into();
        validate_id(Self::KIND, &id)?;
        Ok(Self { id, handle })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn handle(&self) -> &ActorHandle {
        &self.handle
    }

    pub fn serialize(&self) -> String {
        self.id.clone()
    }

    pub fn deserialize(input: &str, factory: &dyn ActorHandleFactory) -> ReferenceResult<Self> {
        if input.is_empty() {
            return Err(ReferenceError::malformed_path(Self::KIND, input));
        }
        let handle = factory.create_reference(input)?;
        Ok(Self {
            id: input.to_string(),
            handle,
        })
    }
}

impl PartialEq for ClientRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClientRef {}

impl fmt::Display for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client:{}", self.id)
    }
}

/// Tag of the closed reference-kind set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKind {
    ActorPath,
    StreamPath,
    ActorRef,
    StreamRef,
    ClientRef,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 5] = [
        ReferenceKind::ActorPath,
        ReferenceKind::StreamPath,
        ReferenceKind::ActorRef,
        ReferenceKind::StreamRef,
        ReferenceKind::ClientRef,
    ];

    /// Stable type name used by hosts to ask whether a type is handled
    pub fn type_name(self) -> &'static str {
        match self {
            ReferenceKind::ActorPath => "ActorPath",
            ReferenceKind::StreamPath => "StreamPath",
            ReferenceKind::ActorRef => "ActorRef",
            ReferenceKind::StreamRef => "StreamRef",
            ReferenceKind::ClientRef => "ClientRef",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    /// Whether decoding this kind needs runtime services
    pub fn is_runtime_bound(self) -> bool {
        !matches!(self, ReferenceKind::ActorPath | ReferenceKind::StreamPath)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Any value of a registered reference kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    ActorPath(ActorPath),
    StreamPath(StreamPath),
    ActorRef(ActorRef),
    StreamRef(StreamRef),
    ClientRef(ClientRef),
}

impl Reference {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            Reference::ActorPath(_) => ReferenceKind::ActorPath,
            Reference::StreamPath(_) => ReferenceKind::StreamPath,
            Reference::ActorRef(_) => ReferenceKind::ActorRef,
            Reference::StreamRef(_) => ReferenceKind::StreamRef,
            Reference::ClientRef(_) => ReferenceKind::ClientRef,
        }
    }

    /// Canonical string form, the only part of a reference that is serializable
    pub fn canonical(&self) -> String {
        match self {
            Reference::ActorPath(path) => path.serialize(),
            Reference::StreamPath(path) => path.serialize(),
            Reference::ActorRef(actor) => actor.serialize(),
            Reference::StreamRef(stream) => stream.serialize(),
            Reference::ClientRef(client) => client.serialize(),
        }
    }
}

impl From<ActorPath> for Reference {
    fn from(path: ActorPath) -> Self {
        Reference::ActorPath(path)
    }
}

impl From<StreamPath> for Reference {
    fn from(path: StreamPath) -> Self {
        Reference::StreamPath(path)
    }
}

impl From<ActorRef> for Reference {
    fn from(actor: ActorRef) -> Self {
        Reference::ActorRef(actor)
    }
}

impl From<StreamRef> for Reference {
    fn from(stream: StreamRef) -> Self {
        Reference::StreamRef(stream)
    }
}

impl From<ClientRef> for Reference {
    fn from(client: ClientRef) -> Self {
        Reference::ClientRef(client)
    }
}
