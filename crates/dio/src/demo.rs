use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dio_core::plugin::FnPlugin;
use dio_core::prelude::*;

/// Interval between heartbeats when `app.heartbeat.interval-ms` is unset
const DEFAULT_HEARTBEAT_MS: u64 = 1000;

/// Logs a line at a fixed interval until the application stops.
#[derive(Debug)]
pub struct Heartbeat {
    interval: Duration,
    logger: Arc<dyn Logger>,
}

#[async_trait]
impl Bean for Heartbeat {
    async fn initialized(&self, handle: &ServeHandle) -> Result<()> {
        let handle = handle.clone();
        let logger = self.logger.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut beats: u64 = 0;
            loop {
                tokio::select! {
                    _ = handle.stopped() => break,
                    _ = ticker.tick() => {
                        beats += 1;
                        logger.debug(&TraceContext::background(), &format!("heartbeat #{}", beats));
                    }
                }
            }
        });
        Ok(())
    }
}

/// Present only in development.
#[derive(Debug, Default)]
pub struct DevTools;

#[async_trait]
impl Bean for DevTools {
    fn bean_name(&self) -> Option<&str> {
        Some("devTools")
    }

    async fn initialized(&self, _handle: &ServeHandle) -> Result<()> {
        log::info!("Development tools enabled");
        Ok(())
    }
}

/// Present everywhere except development; refuses an empty `app.name`.
#[derive(Debug)]
pub struct ProdGuard {
    app_name: String,
}

#[async_trait]
impl Bean for ProdGuard {
    fn after_properties_set(&self) -> Result<()> {
        if self.app_name.trim().is_empty() {
            return Err(Error::Other("app.name must not be empty outside development".to_string()));
        }
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        log::info!("Releasing production resources for '{}'", self.app_name);
        Ok(())
    }
}

fn configure(dio: &mut Dio) -> Result<()> {
    dio.set_default_property("app.name", "dio-demo")?
        .set_default_property("app.env", "prod")?
        .provide_named_on_property(
            "heartbeat",
            prototype(|ctx| {
                let interval = ctx
                    .property_string("app.heartbeat.interval-ms")
                    .and_then(|ms| ms.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_HEARTBEAT_MS);
                let logger = ctx.require::<SharedLogger>()?.logger().named("heartbeat");
                Ok(Heartbeat {
                    interval: Duration::from_millis(interval.max(1)),
                    logger,
                })
            }),
            "app.heartbeat.enabled",
            "true",
            false,
        )?
        .provide_on_property(default_prototype::<DevTools>(), "app.env", "dev", false)?
        .provide_named_not_on_property(
            "prodGuard",
            prototype(|ctx| {
                Ok(ProdGuard {
                    app_name: ctx.property_string("app.name").unwrap_or_default(),
                })
            }),
            "app.env",
            "dev",
            false,
        )?;
    Ok(())
}

/// Demo beans: a heartbeat behind `app.heartbeat.enabled`, dev tools for
/// `app.env=dev` and a production guard everywhere else.
pub fn demo_plugin() -> FnPlugin<fn(&mut Dio) -> Result<()>> {
    plugin_fn("demo", configure as fn(&mut Dio) -> Result<()>)
}
