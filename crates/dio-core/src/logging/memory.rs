use std::sync::{Arc, Mutex};

use log::Level;

use crate::kernel::constants::DEFAULT_TRACE_NAME;
use crate::logging::logger::{LogRecord, Logger};

/// One captured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub logger: String,
    pub trace_id: Option<String>,
    pub message: String,
    pub caller: Option<String>,
}

/// Logger that keeps every entry in memory. Derived loggers share the buffer.
#[derive(Debug, Clone)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    name: String,
    with_caller: bool,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            name: String::new(),
            with_caller: true,
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether an entry at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|entry| entry.level == level && entry.message.contains(needle))
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn named(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(Self {
            name: name.to_string(),
            ..self.clone()
        })
    }

    fn without_caller(&self) -> Arc<dyn Logger> {
        Arc::new(Self {
            with_caller: false,
            ..self.clone()
        })
    }

    fn trace_name(&self) -> &str {
        DEFAULT_TRACE_NAME
    }

    fn log(&self, record: &LogRecord<'_>) {
        let entry = LogEntry {
            level: record.level,
            logger: self.name.clone(),
            trace_id: record.ctx.trace_id().map(str::to_string),
            message: record.render_message(),
            caller: record
                .caller
                .filter(|_| self.with_caller)
                .map(|location| format!("{}:{}", location.file(), location.line())),
        };
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }
}
