use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::property::error::PropertyError;
use crate::property::format::ConfigFormat;

/// Which layer of the store a write lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyLayer {
    /// Fallback values, typically installed by plugins and embedded documents
    Default,
    /// Explicit values; always win over defaults
    Override,
}

/// Layered key-value configuration.
///
/// Keys are dotted paths (`log.max-age`). Structured values are flattened on
/// write, and a lookup of a non-leaf key assembles the nested object back from
/// every leaf below it, so `get("log")` and `get("log.dir")` both work no
/// matter how the values were written.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    defaults: BTreeMap<String, Value>,
    overrides: BTreeMap<String, Value>,
}

impl PropertyStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a default value, flattening structured values into dotted keys.
    pub fn set_default<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), PropertyError> {
        self.write(PropertyLayer::Default, key, value)
    }

    /// Set an override value, flattening structured values into dotted keys.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), PropertyError> {
        self.write(PropertyLayer::Override, key, value)
    }

    /// Write a value into the given layer
    pub fn write<T: Serialize>(
        &mut self,
        layer: PropertyLayer,
        key: &str,
        value: T,
    ) -> Result<(), PropertyError> {
        let value = serde_json::to_value(value).map_err(|e| PropertyError::SerializationError {
            key: key.to_string(),
            source: e,
        })?;
        insert_flattened(self.layer_mut(layer), key, value);
        Ok(())
    }

    /// Write every entry of a mapping into the given layer
    pub fn write_map(&mut self, layer: PropertyLayer, map: Map<String, Value>) {
        let target = self.layer_mut(layer);
        for (key, value) in map {
            insert_flattened(target, &key, value);
        }
    }

    fn layer_mut(&mut self, layer: PropertyLayer) -> &mut BTreeMap<String, Value> {
        match layer {
            PropertyLayer::Default => &mut self.defaults,
            PropertyLayer::Override => &mut self.overrides,
        }
    }

    /// Look up a value. Overrides win over defaults; `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key.is_empty() {
            return None;
        }
        if let Some(value) = self.lookup_leaf(key) {
            return Some(value.clone());
        }
        self.section(key)
    }

    /// Whether a value (leaf or section) exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Look up a value and render it with [`stringify`]
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| stringify(&value))
    }

    /// Read a value or section as `T`. A missing key yields `Ok(None)`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PropertyError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| PropertyError::InvalidValue {
                    key: key.to_string(),
                    source: e,
                }),
        }
    }

    /// All keys with a non-null value in either layer, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .defaults
            .iter()
            .chain(self.overrides.iter())
            .filter(|(_, value)| !value.is_null())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Load a configuration document from disk into the given layer.
    /// The format is chosen from the file extension.
    pub fn load_file(&mut self, path: &Path, layer: PropertyLayer) -> Result<(), PropertyError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| PropertyError::UnsupportedConfigFormat(path.display().to_string()))?;
        let content = fs::read_to_string(path)
            .map_err(|e| PropertyError::io(e, "read_to_string", path.to_path_buf()))?;
        self.load_str(&content, format, layer)
    }

    /// Load an in-memory configuration document into the given layer
    pub fn load_str(
        &mut self,
        data: &str,
        format: ConfigFormat,
        layer: PropertyLayer,
    ) -> Result<(), PropertyError> {
        let map = format.parse(data)?;
        self.write_map(layer, map);
        Ok(())
    }

    fn lookup_leaf(&self, key: &str) -> Option<&Value> {
        self.overrides
            .get(key)
            .filter(|value| !value.is_null())
            .or_else(|| self.defaults.get(key).filter(|value| !value.is_null()))
    }

    fn section(&self, prefix: &str) -> Option<Value> {
        let dotted = format!("{}.", prefix);
        let mut merged: BTreeMap<&str, &Value> = BTreeMap::new();
        // Defaults first so overrides replace them leaf by leaf
        for layer in [&self.defaults, &self.overrides] {
            for (key, value) in layer.iter() {
                if let Some(suffix) = key.strip_prefix(dotted.as_str()) {
                    if value.is_null() {
                        continue;
                    }
                    merged.insert(suffix, value);
                }
            }
        }

        if merged.is_empty() {
            return None;
        }
        let mut root = Map::new();
        for (suffix, value) in merged {
            let path: Vec<&str> = suffix.split('.').collect();
            insert_path(&mut root, &path, value.clone());
        }
        Some(Value::Object(root))
    }
}

/// Canonical string form of a property value, used for condition matching.
///
/// Strings are returned verbatim, numbers and booleans use their display
/// form, `null` becomes the empty string and structured values are rendered
/// as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn join_key(prefix: &str, child: &str) -> String {
    if prefix.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", prefix, child)
    }
}

fn insert_flattened(layer: &mut BTreeMap<String, Value>, key: &str, value: Value) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (child, nested) in map {
                insert_flattened(layer, &join_key(key, &child), nested);
            }
        }
        leaf => {
            // A leaf replaces whatever subtree was stored under the same key
            let dotted = format!("{}.", key);
            layer.retain(|existing, _| !existing.starts_with(dotted.as_str()));
            // ...and a scalar stored at an ancestor would shadow the new leaf
            for (idx, _) in key.match_indices('.') {
                layer.remove(&key[..idx]);
            }
            layer.insert(key.to_string(), leaf);
        }
    }
}

fn insert_path(target: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            target.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = target
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}
