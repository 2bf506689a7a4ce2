//! Serializer Configuration
//!
//! Settings for the message serializer and the tracing setup shared by hosts
//! and tests.

pub mod logging;
pub mod settings;

pub use logging::init_tracing;
pub use settings::{CopyStrategy, SerializerSettings, ENV_PREFIX};
