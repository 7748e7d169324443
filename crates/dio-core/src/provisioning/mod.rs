//! # Dio Core Provisioning
//!
//! Deferred bean registrations collected while the application is being
//! configured. Each [`BeanDescriptor`] may carry a [`Condition`] over the
//! property store; the [`ProvisioningQueue`] evaluates them once, at start-up,
//! and hands the survivors to the kernel in the order they were enqueued.
pub mod condition;
pub mod descriptor;
pub mod queue;

pub use condition::Condition;
pub use descriptor::{BeanDescriptor, BeanPayload, ProvisionMode};
pub use queue::{PlanEntry, ProvisioningQueue};

#[cfg(test)]
mod tests;
