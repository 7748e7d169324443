pub mod kernel;
pub mod lifecycle;
pub mod logging;
pub mod plugin;
pub mod property;
pub mod provisioning;

// Re-export key public types/traits for easier use by the binary and plugins
pub use kernel::error::{Error, Result, UsageError};
pub use kernel::{Bean, BeanHandle, ConstructContext, DefaultKernel, Kernel, Prototype, ServeHandle};
pub use lifecycle::{Dio, LifecycleState};
pub use logging::{KernelLog, Logger, LoggerBridge, TraceContext};
pub use plugin::{Plugin, plugin_fn};
pub use property::{ConfigFormat, PropertyStore};
pub use provisioning::{BeanDescriptor, Condition, ProvisionMode, ProvisioningQueue};

/// Everything an application needs to declare beans and run.
pub mod prelude {
    pub use crate::kernel::{
        Bean, BeanHandle, ConstructContext, Prototype, ServeHandle, default_prototype, prototype,
    };
    pub use crate::lifecycle::Dio;
    pub use crate::logging::{Logger, SharedLogger, TraceContext};
    pub use crate::plugin::{Plugin, plugin_fn};
    pub use crate::property::ConfigFormat;
    pub use crate::provisioning::{BeanDescriptor, Condition};
    pub use crate::{Error, Result};
}

#[cfg(test)]
mod tests;
