//! # Dio Core Logging
//!
//! Two logging capabilities meet here:
//!
//! - [`Logger`]: the host application's backend. [`TracingLogger`] is the
//!   default, configured from the `log.*` properties ([`LogProperties`]);
//!   [`MemoryLogger`] captures entries for tests.
//! - [`KernelLog`]: the narrow sink the kernel writes its own diagnostics to.
//!   [`NoopKernelLog`] is installed until the lifecycle starts, after which
//!   [`LoggerBridge`] forwards everything to the active [`Logger`].
pub mod bridge;
pub mod kernel_log;
pub mod logger;
pub mod memory;
pub mod properties;
pub mod tracing_logger;

pub use bridge::LoggerBridge;
pub use kernel_log::{KernelLog, NoopKernelLog};
pub use logger::{LogRecord, Logger, SharedLogger, TraceContext};
pub use memory::{LogEntry, MemoryLogger};
pub use properties::LogProperties;
pub use tracing_logger::TracingLogger;
