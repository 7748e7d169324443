use std::any::TypeId;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::kernel::bean::{BeanHandle, ConstructContext, Prototype};
use crate::kernel::constants::{DEFAULT_SHUTDOWN_GRACE, SHUTDOWN_TIMEOUT_PROPERTY};
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::registry::BeanRegistry;
use crate::logging::{KernelLog, NoopKernelLog};
use crate::property::PropertyStore;

/// The dependency-injection engine the lifecycle controller drives.
///
/// The controller only ever talks to the kernel through this trait, so a
/// different engine (or a recording fake in tests) can stand in for
/// [`DefaultKernel`].
#[async_trait]
pub trait Kernel: Send + Sync {
    fn properties(&self) -> &PropertyStore;

    fn properties_mut(&mut self) -> &mut PropertyStore;

    /// Swap the sink for the kernel's own diagnostics.
    fn install_logger(&mut self, log: Arc<dyn KernelLog>);

    /// Install an already-built bean. An empty name resolves by type.
    fn register_instance(&mut self, name: &str, instance: BeanHandle) -> Result<()>;

    /// Queue a prototype for construction during [`load`](Kernel::load).
    fn provide(&mut self, name: &str, prototype: Box<dyn Prototype>) -> Result<()>;

    /// Construct every provided prototype and run post-construction hooks.
    async fn load(&mut self) -> Result<()>;

    /// Block until `shutdown` is cancelled or the kernel decides to stop, then
    /// release every bean.
    async fn serve(&mut self, shutdown: CancellationToken) -> Result<()>;

    /// Release every bean after a start that failed before serving began.
    /// Background work watching the [`ServeHandle`] is stopped first.
    async fn abort(&mut self);

    fn get_bean(&self, name: &str) -> Option<BeanHandle>;

    fn get_by_type_id(&self, type_id: TypeId) -> Option<BeanHandle>;
}

/// Given to beans so background work can observe, request or fail the serve
/// loop.
#[derive(Debug, Clone)]
pub struct ServeHandle {
    stop: CancellationToken,
    faults: mpsc::UnboundedSender<String>,
}

impl ServeHandle {
    /// Ask the kernel to stop serving and shut down gracefully.
    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    /// Report a fatal runtime failure; `serve` returns it as [`Error::Serve`].
    pub fn fail(&self, reason: impl Display) {
        // The receiver lives as long as the kernel; a send error means serving already ended
        let _ = self.faults.send(reason.to_string());
    }

    /// Whether serving has ended or a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Resolves once serving ends or a stop was requested.
    pub async fn stopped(&self) {
        self.stop.cancelled().await
    }

    /// Token cancelled together with the serve loop, for spawned tasks.
    pub fn token(&self) -> CancellationToken {
        self.stop.clone()
    }
}

/// Sequential kernel: prototypes are built in the order they were provided,
/// each seeing every bean registered or built before it.
pub struct DefaultKernel {
    properties: PropertyStore,
    registry: BeanRegistry,
    prototypes: Vec<(String, Box<dyn Prototype>)>,
    log: Arc<dyn KernelLog>,
    loaded: bool,
    released: bool,
    shutdown_grace: Option<Duration>,
    handle: ServeHandle,
    faults: Option<mpsc::UnboundedReceiver<String>>,
}

impl DefaultKernel {
    /// Creates a kernel with an empty property store and a no-op log.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            properties: PropertyStore::new(),
            registry: BeanRegistry::new(),
            prototypes: Vec::new(),
            log: Arc::new(NoopKernelLog),
            loaded: false,
            released: false,
            shutdown_grace: None,
            handle: ServeHandle {
                stop: CancellationToken::new(),
                faults: tx,
            },
            faults: Some(rx),
        }
    }

    /// Fix the shutdown grace period instead of reading it from properties.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = Some(grace);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn registry(&self) -> &BeanRegistry {
        &self.registry
    }

    pub fn serve_handle(&self) -> &ServeHandle {
        &self.handle
    }

    /// Explicit value, else `app.shutdown-timeout` seconds, else the default.
    pub fn shutdown_grace(&self) -> Duration {
        if let Some(grace) = self.shutdown_grace {
            return grace;
        }
        self.properties
            .get_string(SHUTDOWN_TIMEOUT_PROPERTY)
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SHUTDOWN_GRACE)
    }

    fn resolve_name(name: &str, handle: &BeanHandle) -> String {
        if name.is_empty() {
            handle.default_name()
        } else {
            name.to_string()
        }
    }

    /// Destroy beans in reverse registration order within the grace period.
    /// Runs at most once.
    async fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let grace = self.shutdown_grace();
        let beans: Vec<(String, BeanHandle)> = self
            .registry
            .iter()
            .rev()
            .map(|(name, handle)| (name.to_string(), handle.clone()))
            .collect();
        self.log.info(&format!("Shutting down {} beans...", beans.len()));

        let log = self.log.clone();
        let destroy_all = async move {
            for (name, handle) in beans {
                log.debug(&format!("Destroying bean '{}'", name));
                if let Err(e) = handle.bean().destroy().await {
                    log.warn(&format!("Error destroying bean '{}': {}", name, e));
                }
            }
        };

        match tokio::time::timeout(grace, destroy_all).await {
            Ok(()) => self.log.info("Shutdown complete."),
            Err(_) => self.log.warn(&format!(
                "Shutdown did not finish within {:?}, forcing shutdown",
                grace
            )),
        }
    }
}

impl Default for DefaultKernel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Kernel for DefaultKernel {
    fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    fn install_logger(&mut self, log: Arc<dyn KernelLog>) {
        self.log = log;
    }

    fn register_instance(&mut self, name: &str, instance: BeanHandle) -> Result<()> {
        let resolved = Self::resolve_name(name, &instance);
        self.log.debug(&format!(
            "Registering instance '{}' ({})",
            resolved,
            instance.type_name()
        ));
        self.registry.insert(resolved, instance)
    }

    fn provide(&mut self, name: &str, prototype: Box<dyn Prototype>) -> Result<()> {
        if self.loaded {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Provision,
                component_name: Some(prototype.type_name().to_string()),
                message: "cannot provide a prototype after the kernel has loaded".to_string(),
                source: None,
            });
        }
        self.log
            .debug(&format!("Providing prototype {}", prototype.type_name()));
        self.prototypes.push((name.to_string(), prototype));
        Ok(())
    }

    async fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Load,
                component_name: None,
                message: "kernel already loaded".to_string(),
                source: None,
            });
        }
        self.loaded = true;

        let prototypes = std::mem::take(&mut self.prototypes);
        self.log
            .info(&format!("Constructing {} prototypes...", prototypes.len()));
        for (name, prototype) in prototypes {
            let handle = {
                let ctx = ConstructContext::new(
                    &name,
                    &self.properties,
                    &self.registry,
                    &self.log,
                    &self.handle,
                );
                prototype.construct(&ctx).map_err(|e| {
                    let label = if name.is_empty() { prototype.type_name() } else { name.as_str() };
                    Error::construction(label, e)
                })?
            };
            let resolved = Self::resolve_name(&name, &handle);
            handle
                .bean()
                .after_properties_set()
                .map_err(|e| Error::construction(resolved.as_str(), e))?;
            self.log.debug(&format!(
                "Constructed bean '{}' ({})",
                resolved,
                handle.type_name()
            ));
            self.registry.insert(resolved, handle)?;
        }

        let beans: Vec<(String, BeanHandle)> = self
            .registry
            .iter()
            .map(|(name, handle)| (name.to_string(), handle.clone()))
            .collect();
        for (name, handle) in beans {
            handle
                .bean()
                .initialized(&self.handle)
                .await
                .map_err(|e| Error::construction(name.as_str(), e))?;
        }
        self.log
            .info(&format!("Loaded {} beans.", self.registry.len()));
        Ok(())
    }

    async fn serve(&mut self, shutdown: CancellationToken) -> Result<()> {
        if !self.loaded {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Serve,
                component_name: None,
                message: "serve called before load".to_string(),
                source: None,
            });
        }
        let mut faults = self.faults.take().ok_or_else(|| Error::KernelLifecycleError {
            phase: KernelLifecyclePhase::Serve,
            component_name: None,
            message: "serve already called".to_string(),
            source: None,
        })?;

        self.log.info("Serving until shutdown is requested.");
        let stop = self.handle.stop.clone();
        let outcome = tokio::select! {
            _ = shutdown.cancelled() => {
                self.log.info("Shutdown signal received.");
                Ok(())
            }
            _ = stop.cancelled() => {
                self.log.info("Stop requested by a bean.");
                Ok(())
            }
            fault = faults.recv() => match fault {
                Some(reason) => Err(Error::Serve(reason)),
                None => Ok(()),
            },
        };

        // Background work watching the handle winds down before beans are destroyed
        self.handle.stop.cancel();
        self.shutdown().await;
        outcome
    }

    async fn abort(&mut self) {
        self.log.warn("Start aborted, releasing beans.");
        self.handle.stop.cancel();
        self.shutdown().await;
    }

    fn get_bean(&self, name: &str) -> Option<BeanHandle> {
        self.registry.get(name).cloned()
    }

    fn get_by_type_id(&self, type_id: TypeId) -> Option<BeanHandle> {
        self.registry.get_by_type_id(type_id).cloned()
    }
}
