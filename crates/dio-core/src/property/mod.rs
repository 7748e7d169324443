//! # Dio Core Properties
//!
//! The layered configuration store every condition is evaluated against.
//!
//! - [`PropertyStore`]: defaults plus overrides over dotted keys, with
//!   section assembly for non-leaf lookups.
//! - [`ConfigFormat`]: JSON, YAML and TOML configuration documents.
//! - [`env`]: folding environment variables into properties.
//! - [`error`]: [`PropertyError`](error::PropertyError).
pub mod env;
pub mod error;
pub mod format;
pub mod store;

pub use error::PropertyError;
pub use format::ConfigFormat;
pub use store::{PropertyLayer, PropertyStore, stringify};
