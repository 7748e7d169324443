use crate::property::PropertyStore;
use crate::provisioning::condition::Condition;
use crate::provisioning::descriptor::{BeanDescriptor, ProvisionMode};

/// Verdict for one queued descriptor, as reported by [`ProvisioningQueue::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub position: usize,
    pub name: String,
    pub type_name: &'static str,
    pub mode: ProvisionMode,
    pub condition: Option<Condition>,
    pub included: bool,
}

/// Ordered buffer of pending bean registrations.
///
/// Nothing is validated on enqueue; duplicate names are the kernel's concern.
/// Conditions are evaluated exactly once, when the queue is flushed.
#[derive(Debug, Default)]
pub struct ProvisioningQueue {
    pending: Vec<BeanDescriptor>,
}

impl ProvisioningQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, descriptor: BeanDescriptor) {
        self.pending.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BeanDescriptor> {
        self.pending.iter()
    }

    /// Evaluate every descriptor without consuming the queue.
    pub fn plan(&self, store: &PropertyStore) -> Vec<PlanEntry> {
        self.pending
            .iter()
            .enumerate()
            .map(|(position, descriptor)| PlanEntry {
                position,
                name: descriptor.name().to_string(),
                type_name: descriptor.type_name(),
                mode: descriptor.mode(),
                condition: descriptor.condition().cloned(),
                included: Self::admits(descriptor, store),
            })
            .collect()
    }

    /// Hand over the descriptors whose conditions hold, in insertion order.
    pub fn flush(self, store: &PropertyStore) -> Vec<BeanDescriptor> {
        self.pending
            .into_iter()
            .filter(|descriptor| {
                let admitted = Self::admits(descriptor, store);
                if !admitted {
                    log::debug!(
                        "Skipping bean '{}': condition {} does not hold",
                        descriptor.label(),
                        descriptor
                            .condition()
                            .map(ToString::to_string)
                            .unwrap_or_default()
                    );
                }
                admitted
            })
            .collect()
    }

    fn admits(descriptor: &BeanDescriptor, store: &PropertyStore) -> bool {
        descriptor
            .condition()
            .is_none_or(|condition| condition.matches(store))
    }
}
