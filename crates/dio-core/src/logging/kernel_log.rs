/// The narrow logging capability the kernel needs for its own diagnostics.
pub trait KernelLog: Send + Sync {
    fn debug_mode(&self, enabled: bool);
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    /// Report an unrecoverable kernel failure. Implementations do not return
    /// control to the kernel in a usable state.
    fn fatal(&self, message: &str);
}

/// Installed before the kernel is configured so nothing is printed ahead of
/// the real logger. Fatal messages still surface, as a panic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopKernelLog;

impl KernelLog for NoopKernelLog {
    fn debug_mode(&self, _enabled: bool) {}

    fn debug(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn fatal(&self, message: &str) {
        panic!("{}", message);
    }
}
