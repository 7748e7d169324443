use std::any::TypeId;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::kernel::bean::{Bean, BeanHandle, Prototype};
use crate::kernel::constants::{APP_NAME, APP_VERSION, LOGGER_BEAN_NAME};
use crate::kernel::container::{DefaultKernel, Kernel};
use crate::kernel::error::{Error, KernelLifecyclePhase, Result, UsageError};
use crate::lifecycle::signal;
use crate::lifecycle::state::LifecycleState;
use crate::logging::{
    KernelLog, LogProperties, Logger, LoggerBridge, SharedLogger, TraceContext, TracingLogger,
};
use crate::plugin::Plugin;
use crate::property::env::migrate_env;
use crate::property::format::kind_of;
use crate::property::{ConfigFormat, PropertyError, PropertyLayer, PropertyStore};
use crate::provisioning::{BeanDescriptor, BeanPayload, Condition, PlanEntry, ProvisioningQueue};

type AfterLoadHook = Box<dyn FnOnce(&Dio) -> Result<()> + Send + Sync>;

/// Run-once application controller.
///
/// A `Dio` collects properties and bean registrations while it is
/// [`Configuring`](LifecycleState::Configuring), then [`run`](Dio::run) seals
/// the provisioning queue, installs the logger, hands the surviving beans to
/// the kernel, loads the graph and serves until cancelled. Every instance is
/// independent; nothing is process-global.
///
/// ```no_run
/// use dio_core::prelude::*;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Debug, Default)]
/// struct DevTools;
/// impl Bean for DevTools {}
///
/// # async fn start() -> dio_core::Result<()> {
/// let mut dio = Dio::new();
/// dio.set_property("app.env", "dev")?
///     .provide_on_property(default_prototype::<DevTools>(), "app.env", "dev", false)?;
/// dio.run(CancellationToken::new()).await
/// # }
/// ```
pub struct Dio {
    kernel: Box<dyn Kernel>,
    queue: ProvisioningQueue,
    state: LifecycleState,
    logger: Option<Arc<dyn Logger>>,
    after_load: Vec<AfterLoadHook>,
    plugins: Vec<String>,
}

impl Dio {
    /// A controller over a fresh [`DefaultKernel`], with the `log.*` defaults
    /// installed.
    pub fn new() -> Self {
        Self::with_kernel(Box::new(DefaultKernel::new()))
    }

    pub fn with_kernel(mut kernel: Box<dyn Kernel>) -> Self {
        let mut defaults = Map::new();
        defaults.insert("log".to_string(), LogProperties::default_value());
        kernel
            .properties_mut()
            .write_map(PropertyLayer::Default, defaults);
        Self {
            kernel,
            queue: ProvisioningQueue::new(),
            state: LifecycleState::Configuring,
            logger: None,
            after_load: Vec::new(),
            plugins: Vec::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn kernel(&self) -> &dyn Kernel {
        self.kernel.as_ref()
    }

    pub fn properties(&self) -> &PropertyStore {
        self.kernel.properties()
    }

    /// Names of the plugins applied so far, in order.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    // ---- properties ----

    pub fn set_default_property<T: Serialize>(&mut self, key: &str, value: T) -> Result<&mut Self> {
        self.kernel.properties_mut().set_default(key, value)?;
        Ok(self)
    }

    /// Write every top-level entry of `values` (a map or struct) as a default.
    pub fn set_default_properties<T: Serialize>(&mut self, values: T) -> Result<&mut Self> {
        let map = to_mapping(values)?;
        self.kernel
            .properties_mut()
            .write_map(PropertyLayer::Default, map);
        Ok(self)
    }

    pub fn set_property<T: Serialize>(&mut self, key: &str, value: T) -> Result<&mut Self> {
        self.kernel.properties_mut().set(key, value)?;
        Ok(self)
    }

    /// Write every top-level entry of `values` (a map or struct) as an override.
    pub fn set_properties<T: Serialize>(&mut self, values: T) -> Result<&mut Self> {
        let map = to_mapping(values)?;
        self.kernel
            .properties_mut()
            .write_map(PropertyLayer::Override, map);
        Ok(self)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties().contains(key)
    }

    pub fn get_property(&self, key: &str) -> Option<Value> {
        self.properties().get(key)
    }

    pub fn get_property_string(&self, key: &str) -> Option<String> {
        self.properties().get_string(key)
    }

    /// Deserialize the value or section at `prefix`.
    pub fn get_properties<T: DeserializeOwned>(&self, prefix: &str) -> Result<Option<T>> {
        Ok(self.properties().get_as(prefix)?)
    }

    /// Load a configuration file as overrides.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        self.load_file(path.as_ref(), PropertyLayer::Override)
    }

    /// Load a configuration file as defaults.
    pub fn load_default_config(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        self.load_file(path.as_ref(), PropertyLayer::Default)
    }

    pub fn load_config_str(&mut self, data: &str, format: ConfigFormat) -> Result<&mut Self> {
        self.kernel
            .properties_mut()
            .load_str(data, format, PropertyLayer::Override)?;
        Ok(self)
    }

    /// Load an embedded configuration document as defaults.
    pub fn load_default_config_str(&mut self, data: &str, format: ConfigFormat) -> Result<&mut Self> {
        self.kernel
            .properties_mut()
            .load_str(data, format, PropertyLayer::Default)?;
        Ok(self)
    }

    fn load_file(&mut self, path: &Path, layer: PropertyLayer) -> Result<&mut Self> {
        log::debug!("Loading configuration from {}", path.display());
        self.kernel.properties_mut().load_file(path, layer)?;
        Ok(self)
    }

    /// Copy the process environment into the overrides (`APP_WEB_PORT` ->
    /// `app.web.port`).
    pub fn auto_migrate_env(&mut self) -> Result<&mut Self> {
        self.migrate_env_from(std::env::vars())
    }

    pub fn migrate_env_from<I>(&mut self, vars: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let count = migrate_env(self.kernel.properties_mut(), vars);
        log::debug!("Migrated {} environment variables into properties", count);
        Ok(self)
    }

    // ---- beans ----

    /// Queue a descriptor. Fails once `run` has started.
    pub fn enqueue(&mut self, descriptor: BeanDescriptor) -> Result<&mut Self> {
        if !self.state.is_configuring() {
            return Err(UsageError::QueueSealed {
                name: descriptor.label().to_string(),
            }
            .into());
        }
        self.queue.enqueue(descriptor);
        Ok(self)
    }

    /// Register an already-built bean, named by type.
    pub fn register_bean<B: Bean>(&mut self, bean: B) -> Result<&mut Self> {
        self.enqueue(BeanDescriptor::instance(bean))
    }

    pub fn register_named_bean<B: Bean>(&mut self, name: &str, bean: B) -> Result<&mut Self> {
        self.enqueue(BeanDescriptor::instance(bean).named(name))
    }

    pub fn provide<P: Prototype + 'static>(&mut self, prototype: P) -> Result<&mut Self> {
        self.enqueue(BeanDescriptor::prototype(prototype))
    }

    pub fn provide_named<P: Prototype + 'static>(
        &mut self,
        name: &str,
        prototype: P,
    ) -> Result<&mut Self> {
        self.enqueue(BeanDescriptor::prototype(prototype).named(name))
    }

    /// Provide `prototype` only when `key` equals `value` at start-up.
    pub fn provide_on_property<P: Prototype + 'static>(
        &mut self,
        prototype: P,
        key: &str,
        value: &str,
        case_sensitive: bool,
    ) -> Result<&mut Self> {
        let condition = Condition::on_property(key, value).case_sensitive(case_sensitive);
        self.enqueue(BeanDescriptor::prototype(prototype).when(condition))
    }

    pub fn provide_named_on_property<P: Prototype + 'static>(
        &mut self,
        name: &str,
        prototype: P,
        key: &str,
        value: &str,
        case_sensitive: bool,
    ) -> Result<&mut Self> {
        let condition = Condition::on_property(key, value).case_sensitive(case_sensitive);
        self.enqueue(BeanDescriptor::prototype(prototype).named(name).when(condition))
    }

    /// Provide `prototype` only when `key` does not equal `value` at start-up.
    pub fn provide_not_on_property<P: Prototype + 'static>(
        &mut self,
        prototype: P,
        key: &str,
        value: &str,
        case_sensitive: bool,
    ) -> Result<&mut Self> {
        let condition = Condition::not_on_property(key, value).case_sensitive(case_sensitive);
        self.enqueue(BeanDescriptor::prototype(prototype).when(condition))
    }

    pub fn provide_named_not_on_property<P: Prototype + 'static>(
        &mut self,
        name: &str,
        prototype: P,
        key: &str,
        value: &str,
        case_sensitive: bool,
    ) -> Result<&mut Self> {
        let condition = Condition::not_on_property(key, value).case_sensitive(case_sensitive);
        self.enqueue(BeanDescriptor::prototype(prototype).named(name).when(condition))
    }

    /// Provide every prototype under the same condition.
    pub fn provide_all_on_property<I>(
        &mut self,
        key: &str,
        value: &str,
        case_sensitive: bool,
        prototypes: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Box<dyn Prototype>>,
    {
        let condition = Condition::on_property(key, value).case_sensitive(case_sensitive);
        for prototype in prototypes {
            self.enqueue(BeanDescriptor::from_boxed_prototype(prototype).when(condition.clone()))?;
        }
        Ok(self)
    }

    // ---- branching ----

    /// Run `f` now if `key` equals `value` in the current properties.
    pub fn on_property<F>(&mut self, key: &str, value: &str, case_sensitive: bool, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Dio) -> Result<()>,
    {
        let condition = Condition::on_property(key, value).case_sensitive(case_sensitive);
        self.branch(condition, f)
    }

    /// Run `f` now if `key` does not equal `value` in the current properties.
    pub fn not_on_property<F>(&mut self, key: &str, value: &str, case_sensitive: bool, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Dio) -> Result<()>,
    {
        let condition = Condition::not_on_property(key, value).case_sensitive(case_sensitive);
        self.branch(condition, f)
    }

    fn branch<F>(&mut self, condition: Condition, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Dio) -> Result<()>,
    {
        if condition.matches(self.properties()) {
            f(self)?;
        }
        Ok(self)
    }

    // ---- lifecycle ----

    /// Use `logger` instead of building one from `log.*`.
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) -> Result<&mut Self> {
        self.logger = Some(logger);
        Ok(self)
    }

    /// Register a callback run after the kernel has loaded, before serving.
    pub fn after_load<F>(&mut self, callback: F) -> Result<&mut Self>
    where
        F: FnOnce(&Dio) -> Result<()> + Send + Sync + 'static,
    {
        self.after_load.push(Box::new(callback));
        Ok(self)
    }

    /// Apply a plugin's configuration to this controller.
    pub fn use_plugin<P: Plugin>(&mut self, plugin: P) -> Result<&mut Self> {
        if !self.state.is_configuring() {
            return Err(UsageError::PluginAfterStart {
                name: plugin.name().to_string(),
            }
            .into());
        }
        log::debug!("Applying plugin '{}'", plugin.name());
        plugin.configure(self)?;
        self.plugins.push(plugin.name().to_string());
        Ok(self)
    }

    /// What `run` would hand to the kernel given the current properties.
    pub fn plan(&self) -> Vec<PlanEntry> {
        self.queue.plan(self.properties())
    }

    // ---- lookup ----

    pub fn get_bean(&self, name: &str) -> Option<BeanHandle> {
        self.kernel.get_bean(name)
    }

    pub fn get_by_type<T: Bean>(&self) -> Option<Arc<T>> {
        self.kernel
            .get_by_type_id(TypeId::of::<T>())
            .and_then(|handle| handle.downcast::<T>())
    }

    /// The active logger. `None` until `run` has resolved it, unless one was
    /// set explicitly.
    pub fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.logger.clone()
    }

    /// Start the application and serve until `ctx` is cancelled, a process
    /// signal arrives or the kernel stops.
    ///
    /// May be called once. A second call fails with
    /// [`UsageError::AlreadyRunning`] without touching the kernel. Logger,
    /// provisioning, load and serve failures are returned; once the logger is
    /// up they are also logged at error severity.
    pub async fn run(&mut self, ctx: CancellationToken) -> Result<()> {
        if !self.state.is_configuring() {
            return Err(UsageError::AlreadyRunning.into());
        }
        self.state = LifecycleState::Running;
        let outcome = self.start(ctx).await;
        self.state = LifecycleState::Terminal;
        outcome
    }

    async fn start(&mut self, ctx: CancellationToken) -> Result<()> {
        let logger = self.resolve_logger()?;
        let bridge = Arc::new(LoggerBridge::new(&logger));
        if let Some(debug) = self.properties().get_as::<LogProperties>("log").ok().flatten() {
            bridge.debug_mode(debug.debug);
        }
        let kernel_log: Arc<dyn KernelLog> = bridge;
        self.kernel.install_logger(kernel_log.clone());
        kernel_log.info(&format!("Starting {} v{}", APP_NAME, APP_VERSION));

        let shutdown = ctx.child_token();
        let listener = signal::spawn_listener(shutdown.clone(), kernel_log.clone());
        let outcome = self.boot_and_serve(logger.clone(), shutdown).await;
        listener.abort();

        if let Err(e) = &outcome {
            logger.error(&TraceContext::background(), &format!("{} stopped: {}", APP_NAME, e));
        }
        outcome
    }

    fn resolve_logger(&mut self) -> Result<Arc<dyn Logger>> {
        if let Some(logger) = &self.logger {
            return Ok(logger.clone());
        }
        let props = LogProperties::from_store(self.properties())?;
        let tracing_logger = TracingLogger::from_properties(&props)?;
        if let Err(e) = tracing_logger.install_global() {
            log::debug!("Keeping the existing global subscriber: {}", e);
        }
        let logger: Arc<dyn Logger> = Arc::new(tracing_logger);
        self.logger = Some(logger.clone());
        Ok(logger)
    }

    async fn boot_and_serve(&mut self, logger: Arc<dyn Logger>, shutdown: CancellationToken) -> Result<()> {
        if let Err(e) = self.boot(logger).await {
            self.kernel.abort().await;
            return Err(e);
        }
        self.kernel.serve(shutdown).await
    }

    /// Hand the logger and surviving beans to the kernel, load it and run the
    /// after-load callbacks.
    async fn boot(&mut self, logger: Arc<dyn Logger>) -> Result<()> {
        self.kernel
            .register_instance(LOGGER_BEAN_NAME, BeanHandle::new(SharedLogger::new(logger)))?;

        let queue = std::mem::take(&mut self.queue);
        let survivors = queue.flush(self.kernel.properties());
        for descriptor in survivors {
            let (name, payload) = descriptor.into_parts();
            match payload {
                BeanPayload::Instance(handle) => self.kernel.register_instance(&name, handle)?,
                BeanPayload::Prototype(prototype) => self.kernel.provide(&name, prototype)?,
            }
        }

        self.kernel.load().await?;

        for callback in std::mem::take(&mut self.after_load) {
            callback(self).map_err(|e| Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::AfterLoad,
                component_name: None,
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;
        }
        Ok(())
    }
}

impl Default for Dio {
    fn default() -> Self {
        Self::new()
    }
}

fn to_mapping<T: Serialize>(values: T) -> Result<Map<String, Value>> {
    let value = serde_json::to_value(values).map_err(|e| PropertyError::SerializationError {
        key: String::new(),
        source: e,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(Error::Property(PropertyError::NotAMapping {
            found: kind_of(&other).to_string(),
        })),
    }
}
