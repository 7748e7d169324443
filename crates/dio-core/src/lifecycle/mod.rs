//! # Dio Core Lifecycle
//!
//! [`Dio`] is the run-once controller applications are built around. It
//! owns the kernel, the provisioning queue and the [`LifecycleState`], and
//! turns a cancellation token (plus SIGINT/SIGTERM) into a graceful
//! shutdown.
pub mod controller;
mod signal;
pub mod state;

pub use controller::Dio;
pub use state::LifecycleState;
