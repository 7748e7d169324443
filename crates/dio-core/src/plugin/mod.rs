//! # Dio Core Plugins
//!
//! A plugin packages a reusable slice of configuration: default properties,
//! conditional beans and after-load callbacks applied to a [`Dio`] in one
//! call to [`Dio::use_plugin`].
use crate::kernel::error::Result;
use crate::lifecycle::Dio;

pub trait Plugin {
    /// Name reported in diagnostics and by [`Dio::plugins`].
    fn name(&self) -> &str;

    /// Apply this plugin's configuration. Runs immediately, during the
    /// configuration phase.
    fn configure(&self, dio: &mut Dio) -> Result<()>;
}

/// Closure-backed [`Plugin`]. Build one with [`plugin_fn`].
pub struct FnPlugin<F> {
    name: String,
    configure: F,
}

impl<F> Plugin for FnPlugin<F>
where
    F: Fn(&mut Dio) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, dio: &mut Dio) -> Result<()> {
        (self.configure)(dio)
    }
}

pub fn plugin_fn<F>(name: impl Into<String>, configure: F) -> FnPlugin<F>
where
    F: Fn(&mut Dio) -> Result<()>,
{
    FnPlugin {
        name: name.into(),
        configure,
    }
}
