//! Configuration schema (schemaforge.toml)

use crate::naming::NamingMethod;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};

/// Primary key generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdMethod {
    /// Keys are supplied by the application
    None,

    /// Keys are generated by the platform (identity or sequence)
    Native,

    /// Keys are taken from the referenced row of a foreign table
    ForeignTable,
}

impl Default for IdMethod {
    fn default() -> Self {
        Self::Native
    }
}

/// Default serialization format of generated objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    Yaml,
    Json,
    Xml,
    Csv,
}

impl Default for StringFormat {
    fn default() -> Self {
        Self::Yaml
    }
}

/// Database-wide defaults that tables fall back to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub id_method: IdMethod,

    #[serde(default)]
    pub naming_method: NamingMethod,

    #[serde(default)]
    pub string_format: StringFormat,

    /// Index every suffix of composite primary keys
    #[serde(default)]
    pub heavy_indexing: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            id_method: IdMethod::default(),
            naming_method: NamingMethod::default(),
            string_format: StringFormat::default(),
            heavy_indexing: false,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Target platform
    #[serde(default)]
    pub platform: Platform,

    /// Fail on dangling foreign keys instead of reporting them as warnings
    #[serde(default)]
    pub strict_references: bool,

    /// Registry key of the naming strategy
    #[serde(default = "default_naming_strategy")]
    pub naming_strategy: String,

    /// Schema qualifier applied to tables that declare none
    #[serde(default)]
    pub default_schema: Option<String>,

    /// Database-wide defaults
    #[serde(default)]
    pub defaults: Defaults,
}

fn default_naming_strategy() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            strict_references: false,
            naming_strategy: default_naming_strategy(),
            default_schema: None,
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Unknown naming strategy '{name}' (available: {available})")]
    UnknownNamingStrategy { name: String, available: String },
}
