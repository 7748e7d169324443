use std::fs;
use std::path::PathBuf;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kernel::constants::{
    DEFAULT_LOG_DIR, DEFAULT_LOG_MAX_AGE, DEFAULT_LOG_NAME_PREFIX, DEFAULT_TRACE_NAME,
    FALLBACK_LOG_MAX_AGE, HOSTNAME_PLACEHOLDER,
};
use crate::kernel::error::Result;
use crate::property::PropertyStore;

/// Settings of the default logging backend, read from the `log.*` namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogProperties {
    pub name: String,
    pub dir: String,
    /// Retention in days
    #[serde(rename = "max-age", deserialize_with = "flexible_i64")]
    pub max_age: i64,
    #[serde(deserialize_with = "flexible_bool")]
    pub debug: bool,
    /// Console output
    #[serde(deserialize_with = "flexible_bool")]
    pub std: bool,
    /// Rolling file output
    #[serde(deserialize_with = "flexible_bool")]
    pub file: bool,
    #[serde(rename = "trace-name")]
    pub trace_name: String,
}

impl Default for LogProperties {
    fn default() -> Self {
        let name = match hostname() {
            Some(host) => format!("{}_{}", DEFAULT_LOG_NAME_PREFIX, host),
            None => DEFAULT_LOG_NAME_PREFIX.to_string(),
        };
        Self {
            name,
            dir: DEFAULT_LOG_DIR.to_string(),
            max_age: DEFAULT_LOG_MAX_AGE,
            debug: true,
            std: true,
            file: true,
            trace_name: DEFAULT_TRACE_NAME.to_string(),
        }
    }
}

impl LogProperties {
    /// Read `log.*` from the store and apply the backend's fallbacks.
    pub fn from_store(store: &PropertyStore) -> Result<Self> {
        let props = store.get_as::<LogProperties>("log")?.unwrap_or_default();
        Ok(props.normalized())
    }

    /// Fill in what the configuration left unusable: an empty name becomes
    /// `log`, `@hostname` is substituted, a non-positive retention becomes
    /// 7 days, and the console is forced on when no output is enabled.
    pub fn normalized(mut self) -> Self {
        if self.name.is_empty() {
            self.name = "log".to_string();
        }
        if self.name.contains(HOSTNAME_PLACEHOLDER) {
            let host = hostname().unwrap_or_default();
            self.name = self.name.replace(HOSTNAME_PLACEHOLDER, &host);
        }
        if self.max_age <= 0 {
            self.max_age = FALLBACK_LOG_MAX_AGE;
        }
        if !self.file && !self.std {
            self.std = true;
        }
        self
    }

    pub fn dir_path(&self) -> PathBuf {
        PathBuf::from(&self.dir)
    }

    /// The defaults as a property value, ready for `set_default("log", ..)`.
    pub fn default_value() -> Value {
        serde_json::to_value(Self::default()).unwrap_or(Value::Null)
    }
}

/// Host name from the environment, falling back to `/etc/hostname`.
pub fn hostname() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .chain(fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}

// Environment-sourced properties arrive as strings; accept both forms.
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid boolean '{}'", other))),
        },
        other => Err(de::Error::custom(format!("invalid boolean {}", other))),
    }
}

fn flexible_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| de::Error::custom(format!("invalid integer {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("invalid integer '{}'", s))),
        other => Err(de::Error::custom(format!("invalid integer {}", other))),
    }
}
