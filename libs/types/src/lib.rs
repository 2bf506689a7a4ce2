//! # Reference-Aware Message Types
//!
//! Pure data structures shared by the codec and the serializer facade.
//!
//! ## What This Crate Contains
//!
//! - **Logical addresses**: [`ActorPath`], [`StreamPath`] with stable canonical strings
//! - **Runtime-bound references**: [`ActorRef`], [`StreamRef`], [`ClientRef`] pairing an
//!   address with a live handle
//! - **Collaborator contracts**: [`ActorHandleFactory`], [`StreamRegistry`],
//!   [`ServiceLocator`] implemented by the hosting runtime
//! - **Message graph**: [`Value`], [`Object`], [`Record`] with shared and cyclic nodes
//! - **Schemas**: [`RecordSchema`] describing a decoder's view of a record type
//!
//! ## What This Crate Does NOT Contain
//!
//! - Wire encoding (belongs in `codec`)
//! - Framing, dependency binding or runtime counters (belongs in `message-serializer`)
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → libs/serializer
//!     ↑             ↓              ↓
//!  Pure Data    Wire Rules     Host Boundary
//!  ActorRef     Surrogates     serialize()
//!  Value        Identity       deserialize()
//! ```

pub mod error;
pub mod graph;
pub mod references;
pub mod schema;
pub mod services;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{ReferenceError, ReferenceResult};
pub use graph::{Object, Record, Value};
pub use references::{
    ActorEndpoint, ActorHandle, ActorPath, ActorRef, ClientRef, Reference, ReferenceKind,
    StreamEndpoint, StreamHandle, StreamPath, StreamRef,
};
pub use schema::{FieldSchema, RecordSchema};
pub use services::{
    ActorHandleFactory, NullServiceLocator, Service, ServiceKind, ServiceLocator, ServiceMap,
    StreamRegistry,
};
