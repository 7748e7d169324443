use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::kernel::constants::{BANNER, KERNEL_LOG_TAG};
use crate::logging::kernel_log::KernelLog;
use crate::logging::logger::{Logger, TraceContext};

/// Forwards kernel diagnostics to the host logger under the `[DIO]` tag,
/// without call-site annotation.
#[derive(Debug)]
pub struct LoggerBridge {
    logger: Arc<dyn Logger>,
    debug: AtomicBool,
}

impl LoggerBridge {
    pub fn new(logger: &Arc<dyn Logger>) -> Self {
        println!("{}", BANNER);
        Self {
            logger: logger.named(KERNEL_LOG_TAG).without_caller(),
            debug: AtomicBool::new(true),
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }
}

impl KernelLog for LoggerBridge {
    fn debug_mode(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    fn debug(&self, message: &str) {
        if self.is_debug() {
            self.logger.debug(&TraceContext::background(), message);
        }
    }

    fn info(&self, message: &str) {
        self.logger.info(&TraceContext::background(), message);
    }

    fn warn(&self, message: &str) {
        self.logger.warn(&TraceContext::background(), message);
    }

    /// Logs at error severity, then terminates the process.
    fn fatal(&self, message: &str) {
        self.logger.error(&TraceContext::background(), message);
        std::process::exit(1);
    }
}
