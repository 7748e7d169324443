//! # Dio Core Kernel
//!
//! The `kernel` module is the dependency-injection engine that the lifecycle
//! controller feeds. It is consumed through the [`Kernel`] trait so it stays
//! replaceable.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Beans**: the [`Bean`](bean::Bean) capability trait with optional
//!   lifecycle hooks, [`BeanHandle`](bean::BeanHandle) for typed lookup and
//!   [`Prototype`](bean::Prototype) for deferred construction.
//! - **Registry**: [`BeanRegistry`](registry::BeanRegistry), constructed beans
//!   by name and by type, in registration order.
//! - **Container**: [`DefaultKernel`](container::DefaultKernel), which loads
//!   prototypes in order and serves until cancelled.
//! - **Core Constants** and **Error Handling** ([`Error`](error::Error),
//!   [`Result`](error::Result)).
pub mod bean;
pub mod constants;
pub mod container;
pub mod error;
pub mod registry;

pub use bean::{Bean, BeanHandle, ConstructContext, Prototype, default_prototype, prototype};
pub use container::{DefaultKernel, Kernel, ServeHandle};
pub use error::{Error, Result, UsageError};
pub use registry::BeanRegistry;
// Test module declaration
#[cfg(test)]
mod tests;
