use std::any::{Any, TypeId};
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::container::ServeHandle;
use crate::kernel::error::{Error, Result};
use crate::kernel::registry::BeanRegistry;
use crate::logging::KernelLog;
use crate::property::PropertyStore;

/// A unit of application state or behavior managed by the kernel.
///
/// Every lifecycle hook is optional. The kernel calls them in this order:
/// `after_properties_set` right after the bean is built, `initialized` once
/// the whole graph is loaded, and `destroy` in reverse order at shutdown.
#[async_trait]
pub trait Bean: Any + Send + Sync + Debug {
    /// Name to register under when the bean was provided without one.
    fn bean_name(&self) -> Option<&str> {
        None
    }

    fn after_properties_set(&self) -> Result<()> {
        Ok(())
    }

    /// Called after every bean is constructed. Long-running work (listeners,
    /// tickers) should be spawned here and watch `handle` for the stop signal.
    async fn initialized(&self, _handle: &ServeHandle) -> Result<()> {
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        Ok(())
    }
}

/// A constructed bean together with the type information needed for typed
/// lookup.
#[derive(Clone)]
pub struct BeanHandle {
    bean: Arc<dyn Bean>,
    any: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl BeanHandle {
    pub fn new<B: Bean>(bean: B) -> Self {
        Self::from_arc(Arc::new(bean))
    }

    pub fn from_arc<B: Bean>(bean: Arc<B>) -> Self {
        let any: Arc<dyn Any + Send + Sync> = bean.clone();
        Self {
            bean,
            any,
            type_id: TypeId::of::<B>(),
            type_name: std::any::type_name::<B>(),
        }
    }

    pub fn bean(&self) -> &Arc<dyn Bean> {
        &self.bean
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the bean as its concrete type, if it is a `T`.
    pub fn downcast<T: Bean>(&self) -> Option<Arc<T>> {
        self.any.clone().downcast::<T>().ok()
    }

    /// Name used when the bean was registered without one: the bean's own
    /// `bean_name`, else its short type name in lower camel case.
    pub fn default_name(&self) -> String {
        match self.bean.bean_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_bean_name(self.type_name),
        }
    }
}

impl Debug for BeanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanHandle")
            .field("type_name", &self.type_name)
            .field("bean", &self.bean)
            .finish()
    }
}

/// `my_app::web::WebContainer<T>` -> `webContainer`
pub fn default_bean_name(type_name: &str) -> String {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    let short = without_generics.rsplit("::").next().unwrap_or(without_generics);
    let mut chars = short.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A template the kernel constructs during load.
pub trait Prototype: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<BeanHandle>;
}

impl Debug for dyn Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prototype({})", self.type_name())
    }
}

/// Closure-backed [`Prototype`]. Build one with [`prototype`].
pub struct FnPrototype<F, B> {
    factory: F,
    _marker: PhantomData<fn() -> B>,
}

impl<F, B> Prototype for FnPrototype<F, B>
where
    F: Fn(&ConstructContext<'_>) -> Result<B> + Send + Sync,
    B: Bean,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<B>()
    }

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<BeanHandle> {
        (self.factory)(ctx).map(BeanHandle::new)
    }
}

/// Wrap a factory closure as a prototype.
///
/// ```
/// use dio_core::kernel::bean::{prototype, Bean};
///
/// #[derive(Debug)]
/// struct Greeter { greeting: String }
/// impl Bean for Greeter {}
///
/// let proto = prototype(|ctx| {
///     let greeting = ctx.property_string("app.greeting").unwrap_or_else(|| "hello".into());
///     Ok(Greeter { greeting })
/// });
/// # let _ = proto;
/// ```
pub fn prototype<F, B>(factory: F) -> FnPrototype<F, B>
where
    F: Fn(&ConstructContext<'_>) -> Result<B> + Send + Sync,
    B: Bean,
{
    FnPrototype {
        factory,
        _marker: PhantomData,
    }
}

/// Prototype for beans that need nothing but their `Default` value.
pub fn default_prototype<B: Bean + Default>() -> FnPrototype<fn(&ConstructContext<'_>) -> Result<B>, B> {
    fn build<B: Bean + Default>(_ctx: &ConstructContext<'_>) -> Result<B> {
        Ok(B::default())
    }
    prototype(build::<B> as fn(&ConstructContext<'_>) -> Result<B>)
}

/// What a prototype sees while it is being constructed.
pub struct ConstructContext<'a> {
    bean_name: &'a str,
    properties: &'a PropertyStore,
    registry: &'a BeanRegistry,
    log: &'a Arc<dyn KernelLog>,
    handle: &'a ServeHandle,
}

impl<'a> ConstructContext<'a> {
    pub(crate) fn new(
        bean_name: &'a str,
        properties: &'a PropertyStore,
        registry: &'a BeanRegistry,
        log: &'a Arc<dyn KernelLog>,
        handle: &'a ServeHandle,
    ) -> Self {
        Self {
            bean_name,
            properties,
            registry,
            log,
            handle,
        }
    }

    /// Name the bean was provided under; empty when resolved by type.
    pub fn bean_name(&self) -> &str {
        self.bean_name
    }

    pub fn properties(&self) -> &PropertyStore {
        self.properties
    }

    pub fn property_string(&self, key: &str) -> Option<String> {
        self.properties.get_string(key)
    }

    /// Look up an already constructed bean by name.
    pub fn get_bean(&self, name: &str) -> Option<Arc<dyn Bean>> {
        self.registry.get(name).map(|handle| handle.bean().clone())
    }

    /// Look up an already constructed bean by type.
    pub fn get<T: Bean>(&self) -> Option<Arc<T>> {
        self.registry.get_concrete::<T>()
    }

    /// Like [`get`](Self::get), but a missing dependency is an error.
    pub fn require<T: Bean>(&self) -> Result<Arc<T>> {
        self.get::<T>().ok_or_else(|| Error::ComponentRegistryError {
            operation: "Require".to_string(),
            component_name: Some(std::any::type_name::<T>().to_string()),
            message: format!(
                "no bean of this type has been constructed before '{}'",
                self.bean_name
            ),
        })
    }

    pub fn log(&self) -> &Arc<dyn KernelLog> {
        self.log
    }

    pub fn serve_handle(&self) -> &ServeHandle {
        self.handle
    }
}
