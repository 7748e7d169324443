use std::path::Path;

use serde_json::Value;
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::property::error::PropertyError;

/// Supported configuration document formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Parse a document into its top-level mapping.
    ///
    /// Documents whose root is not a mapping are rejected, since every
    /// top-level entry becomes a property key.
    pub fn parse(&self, data: &str) -> Result<serde_json::Map<String, Value>, PropertyError> {
        let value: Value = match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| {
                PropertyError::DeserializationError {
                    format: "JSON".to_string(),
                    source: Box::new(e),
                }
            })?,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| {
                PropertyError::DeserializationError {
                    format: "YAML".to_string(),
                    source: Box::new(e),
                }
            })?,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| {
                PropertyError::DeserializationError {
                    format: "TOML".to_string(),
                    source: Box::new(e),
                }
            })?,
        };

        match value {
            Value::Object(map) => Ok(map),
            // An empty YAML document parses as null
            Value::Null => Ok(serde_json::Map::new()),
            other => Err(PropertyError::NotAMapping {
                found: kind_of(&other).to_string(),
            }),
        }
    }
}

/// Human-readable kind of a value, for mapping errors
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
