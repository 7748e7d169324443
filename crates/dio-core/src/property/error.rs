//! # Dio Core Property Errors
//!
//! Defines [`PropertyError`], raised while loading configuration documents,
//! writing property values or reading typed sections back out of the store.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedConfigFormat(String),

    #[error("Deserialization from '{format}' failed: {source}")]
    DeserializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Configuration document must be a mapping at its root, found {found}")]
    NotAMapping { found: String },

    #[error("Value for property '{key}' could not be serialized: {source}")]
    SerializationError {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Property '{key}' could not be read as the requested type: {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// Helper for creating Io errors, ensuring path is always included.
impl PropertyError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        PropertyError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
