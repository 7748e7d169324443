#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::kernel::bean::Bean;
use crate::kernel::container::{DefaultKernel, ServeHandle};
use crate::kernel::error::Result;
use crate::lifecycle::Dio;
use crate::logging::MemoryLogger;

/// Shared journal of lifecycle hooks, as `"<hook>:<bean>"`.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Beans that reached `initialized`, in order.
    pub fn initialized(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_prefix("init:").map(str::to_string))
            .collect()
    }
}

/// A bean that writes each lifecycle hook to a [`Journal`].
#[derive(Debug)]
pub struct Tracked {
    pub name: String,
    pub journal: Journal,
}

impl Tracked {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl Bean for Tracked {
    async fn initialized(&self, _handle: &ServeHandle) -> Result<()> {
        self.journal.push(format!("init:{}", self.name));
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.journal.push(format!("destroy:{}", self.name));
        Ok(())
    }
}

/// A controller over the default kernel that logs to memory.
pub fn quiet_dio() -> (Dio, MemoryLogger) {
    let memory = MemoryLogger::new();
    let mut dio = Dio::with_kernel(Box::new(DefaultKernel::new()));
    dio.set_logger(Arc::new(memory.clone()))
        .expect("set_logger during configuration");
    (dio, memory)
}

pub fn cancelled() -> CancellationToken {
    let token = CancellationToken::new();
    token.cancel();
    token
}
