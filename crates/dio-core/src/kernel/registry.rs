use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::kernel::bean::{Bean, BeanHandle};
use crate::kernel::error::{Error, Result};

/// Registry of constructed beans, kept in registration order.
#[derive(Default, Debug)]
pub struct BeanRegistry {
    entries: Vec<(String, BeanHandle)>,
    by_name: HashMap<String, usize>,
}

impl BeanRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bean under `name`. Names are unique.
    pub fn insert(&mut self, name: String, handle: BeanHandle) -> Result<()> {
        if self.by_name.contains_key(&name) {
            return Err(Error::ComponentRegistryError {
                operation: "Register".to_string(),
                component_name: Some(name.clone()),
                message: format!(
                    "a bean named '{}' is already registered ({} conflicts)",
                    name,
                    handle.type_name()
                ),
            });
        }
        self.by_name.insert(name.clone(), self.entries.len());
        self.entries.push((name, handle));
        Ok(())
    }

    /// Get a bean by name.
    pub fn get(&self, name: &str) -> Option<&BeanHandle> {
        self.by_name.get(name).map(|idx| &self.entries[*idx].1)
    }

    /// Get the first registered bean whose concrete type matches.
    pub fn get_by_type_id(&self, type_id: TypeId) -> Option<&BeanHandle> {
        self.entries
            .iter()
            .map(|(_, handle)| handle)
            .find(|handle| handle.type_id() == type_id)
    }

    /// Get a bean by concrete type T.
    pub fn get_concrete<T: Bean>(&self) -> Option<Arc<T>> {
        self.get_by_type_id(TypeId::of::<T>())
            .and_then(|handle| handle.downcast::<T>())
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &BeanHandle)> {
        self.entries
            .iter()
            .map(|(name, handle)| (name.as_str(), handle))
    }

    /// Bean names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
