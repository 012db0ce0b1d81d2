//! Startup configuration for extension directives
//!
//! Optional directives ship with the crate but stay unregistered until named
//! in a TOML configuration file:
//!
//! ```toml
//! [metadata]
//! name = "site defaults"
//!
//! [directives]
//! extras = ["to-float"]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("unknown extension directive \"{0}\"")]
    UnknownExtension(String),
}

/// Parsed engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Extension directives to register at startup
    pub extras: Vec<String>,
}

/// TOML structure for deserializing configurations
#[derive(Deserialize)]
struct TomlConfig {
    metadata: Option<TomlMetadata>,
    directives: Option<TomlDirectives>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TomlDirectives {
    extras: Option<Vec<String>>,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;

        Ok(EngineConfig {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            extras: parsed
                .directives
                .and_then(|d| d.extras)
                .unwrap_or_default(),
        })
    }
}
