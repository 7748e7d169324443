use std::fmt;

use crate::kernel::bean::{Bean, BeanHandle, Prototype};
use crate::provisioning::condition::Condition;

/// How a descriptor reaches the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionMode {
    /// Already built; installed as-is.
    RegisteredInstance,
    /// Constructed by the kernel during load.
    ProvidedPrototype,
}

impl fmt::Display for ProvisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionMode::RegisteredInstance => f.pad("instance"),
            ProvisionMode::ProvidedPrototype => f.pad("prototype"),
        }
    }
}

#[derive(Debug)]
pub enum BeanPayload {
    Instance(BeanHandle),
    Prototype(Box<dyn Prototype>),
}

/// A deferred bean registration, optionally guarded by a [`Condition`].
///
/// An empty `name` leaves naming to the kernel (resolution by type).
#[derive(Debug)]
pub struct BeanDescriptor {
    name: String,
    payload: BeanPayload,
    condition: Option<Condition>,
}

impl BeanDescriptor {
    pub fn instance<B: Bean>(bean: B) -> Self {
        Self::from_handle(BeanHandle::new(bean))
    }

    pub fn from_handle(handle: BeanHandle) -> Self {
        Self {
            name: String::new(),
            payload: BeanPayload::Instance(handle),
            condition: None,
        }
    }

    pub fn prototype<P: Prototype + 'static>(prototype: P) -> Self {
        Self::from_boxed_prototype(Box::new(prototype))
    }

    pub fn from_boxed_prototype(prototype: Box<dyn Prototype>) -> Self {
        Self {
            name: String::new(),
            payload: BeanPayload::Prototype(prototype),
            condition: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn payload(&self) -> &BeanPayload {
        &self.payload
    }

    pub fn into_parts(self) -> (String, BeanPayload) {
        (self.name, self.payload)
    }

    pub fn mode(&self) -> ProvisionMode {
        match self.payload {
            BeanPayload::Instance(_) => ProvisionMode::RegisteredInstance,
            BeanPayload::Prototype(_) => ProvisionMode::ProvidedPrototype,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.payload {
            BeanPayload::Instance(handle) => handle.type_name(),
            BeanPayload::Prototype(prototype) => prototype.type_name(),
        }
    }

    /// Label for diagnostics: the name, or the type when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            self.type_name()
        } else {
            &self.name
        }
    }
}
