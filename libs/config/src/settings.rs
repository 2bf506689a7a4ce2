//! Serializer Settings
//!
//! Loads serializer settings from an optional TOML file with `MSGSER_`
//! environment overrides. Every field has a default, so an absent file and an
//! empty environment yield a working configuration.
//!
//! ```toml
//! max_frame_bytes = 67108864
//! max_depth = 512
//! max_length = 16777216
//! copy_strategy = "clone"
//! log_level = "info"
//! ```
//!
//! Environment keys use `__` between the prefix-stripped words of nested keys,
//! so snake_case fields map directly: `MSGSER_MAX_DEPTH=64`.

use anyhow::{ensure, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "MSGSER";

/// How deep copies are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyStrategy {
    /// Clone the graph in memory
    #[default]
    Clone,
    /// Encode with the copy profile and decode again
    RoundTrip,
}

/// Tunables of one serializer instance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SerializerSettings {
    /// Largest payload a frame may declare
    pub max_frame_bytes: usize,
    /// Maximum nesting of sequences and records
    pub max_depth: usize,
    /// Maximum length of a string, byte array or sequence
    pub max_length: usize,
    pub copy_strategy: CopyStrategy,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            max_frame_bytes: 64 * 1024 * 1024, // 64MB
            max_depth: 512,
            max_length: 16 * 1024 * 1024,
            copy_strategy: CopyStrategy::Clone,
            log_level: "info".to_string(),
        }
    }
}

impl SerializerSettings {
    /// Load settings from `path` (if any) with `MSGSER_` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load settings using a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("Loading serializer settings from {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to build serializer configuration")?;
        let settings: Self = config
            .try_deserialize()
            .context("Failed to deserialize serializer configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text, without environment overrides
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text).context("Failed to parse serializer settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).context("Failed to render serializer settings")
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_depth > 0, "max_depth must be at least 1");
        ensure!(self.max_length > 0, "max_length must be at least 1");
        ensure!(
            self.max_frame_bytes > 0 && self.max_frame_bytes <= u32::MAX as usize,
            "max_frame_bytes must be between 1 and {}",
            u32::MAX
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_sources() {
        let settings = SerializerSettings::load_with_prefix(None, "MSGSER_TEST_DEFAULTS").unwrap();
        assert_eq!(settings, SerializerSettings::default());
    }

    #[test]
    fn test_load_file_with_partial_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("serializer.toml");
        fs::write(
            &path,
            r#"
max_depth = 64
copy_strategy = "round_trip"
"#,
        )
        .unwrap();

        let settings =
            SerializerSettings::load_with_prefix(Some(&path), "MSGSER_TEST_FILE").unwrap();
        assert_eq!(settings.max_depth, 64);
        assert_eq!(settings.copy_strategy, CopyStrategy::RoundTrip);
        assert_eq!(settings.max_length, SerializerSettings::default().max_length);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("serializer.toml");
        fs::write(&path, "max_depth = 64\nlog_level = \"warn\"\n").unwrap();

        std::env::set_var("MSGSER_TEST_ENV_MAX_DEPTH", "8");
        let settings =
            SerializerSettings::load_with_prefix(Some(&path), "MSGSER_TEST_ENV").unwrap();
        std::env::remove_var("MSGSER_TEST_ENV_MAX_DEPTH");

        assert_eq!(settings.max_depth, 8);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(SerializerSettings::load_with_prefix(Some(&path), "MSGSER_TEST_MISSING").is_err());
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let err = SerializerSettings::from_toml_str("max_depth = 0").unwrap_err();
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let settings = SerializerSettings {
            copy_strategy: CopyStrategy::RoundTrip,
            ..Default::default()
        };
        let text = settings.to_toml_string().unwrap();
        assert_eq!(SerializerSettings::from_toml_str(&text).unwrap(), settings);
    }
}
