//! # Dio Core Kernel Errors
//!
//! Defines the error types shared by the kernel, the provisioning queue and
//! the lifecycle controller.
//!
//! [`Error`] is the primary enum. Usage errors ([`UsageError`]) signal a
//! programming mistake such as running a controller twice; they are returned
//! rather than panicked, and hosts are expected to treat them as fatal.
use std::error::Error as StdError;
use std::result::Result as StdResult;

use crate::property::error::PropertyError;
use thiserror::Error as ThisError;

/// Custom error type for the Dio core
#[derive(Debug, ThisError)]
pub enum Error {
    /// The controller was driven in a way its contract forbids.
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    /// Configuration could not be loaded, parsed or read back.
    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    /// The active application logger could not be built.
    #[error("Logger error: {message}")]
    Logger {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        component_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>, // Can wrap another kernel error
    },

    /// Error related to registry operations or bean lookup failures.
    #[error("Component registry error during operation '{operation}': {message}")]
    ComponentRegistryError {
        operation: String, // e.g., "RegisterInstance", "Provide"
        component_name: Option<String>,
        message: String,
    },

    /// A prototype or one of its post-construction hooks failed.
    #[error("Failed to construct bean '{bean}': {source}")]
    Construction {
        bean: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The serve loop stopped because of a kernel-internal failure.
    #[error("Serve failed: {0}")]
    Serve(String),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Contract violations by the host program.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum UsageError {
    #[error("controller is already run")]
    AlreadyRunning,
    #[error("cannot enqueue bean '{name}': the provisioning queue is sealed")]
    QueueSealed { name: String },
    #[error("cannot apply plugin '{name}' after the controller has started")]
    PluginAfterStart { name: String },
}

/// Represents a specific phase in the controller's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Provision")]
    Provision,
    #[error("Load")]
    Load,
    #[error("AfterLoad")]
    AfterLoad,
    #[error("Serve")]
    Serve,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wraps any error raised while constructing or initializing `bean`.
    pub fn construction<E>(bean: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::Construction {
            bean: bean.into(),
            source: source.into(),
        }
    }

    /// Builds a [`Error::Logger`] from a message and an optional cause.
    pub fn logger<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::Logger {
            message: message.into(),
            source: source.map(Into::into),
        }
    }

    /// Whether this error represents a programming mistake rather than a
    /// runtime condition.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}
