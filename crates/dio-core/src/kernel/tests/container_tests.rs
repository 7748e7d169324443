use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::kernel::bean::{Bean, BeanHandle, prototype};
use crate::kernel::container::{DefaultKernel, Kernel, ServeHandle};
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};

type Events = Arc<Mutex<Vec<String>>>;

fn events() -> Events {
    Arc::new(Mutex::new(Vec::new()))
}

fn recorded(events: &Events) -> Vec<String> {
    events.lock().unwrap().clone()
}

/// Records every lifecycle hook it receives.
#[derive(Debug)]
struct Recorder {
    name: String,
    events: Events,
}

impl Recorder {
    fn new(name: &str, events: &Events) -> Self {
        Self {
            name: name.to_string(),
            events: events.clone(),
        }
    }

    fn push(&self, hook: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:{}", hook, self.name));
    }
}

#[async_trait]
impl Bean for Recorder {
    fn after_properties_set(&self) -> Result<()> {
        self.push("set");
        Ok(())
    }

    async fn initialized(&self, _handle: &ServeHandle) -> Result<()> {
        self.push("init");
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.push("destroy");
        Ok(())
    }
}

#[derive(Debug)]
struct Config {
    port: u16,
}

impl Bean for Config {}

#[derive(Debug)]
struct Server {
    port: u16,
}

impl Bean for Server {}

#[tokio::test]
async fn test_load_constructs_in_provide_order() -> Result<()> {
    let log = events();
    let mut kernel = DefaultKernel::new();
    kernel.register_instance("boot", BeanHandle::new(Recorder::new("boot", &log)))?;

    let first = log.clone();
    kernel.provide("one", Box::new(prototype(move |_ctx| Ok(Recorder::new("one", &first)))))?;
    let second = log.clone();
    kernel.provide("two", Box::new(prototype(move |_ctx| Ok(Recorder::new("two", &second)))))?;

    kernel.load().await?;

    assert_eq!(
        recorded(&log),
        vec!["set:one", "set:two", "init:boot", "init:one", "init:two"]
    );
    assert_eq!(kernel.registry().names(), vec!["boot", "one", "two"]);
    Ok(())
}

#[tokio::test]
async fn test_prototype_sees_earlier_beans_and_properties() -> Result<()> {
    let mut kernel = DefaultKernel::new();
    kernel.properties_mut().set("web.port", 8080)?;
    kernel.provide(
        "",
        Box::new(prototype(|ctx| {
            let port = ctx
                .property_string("web.port")
                .and_then(|p| p.parse().ok())
                .unwrap_or(80);
            Ok(Config { port })
        })),
    )?;
    kernel.provide(
        "",
        Box::new(prototype(|ctx| {
            let config = ctx.require::<Config>()?;
            Ok(Server { port: config.port })
        })),
    )?;

    kernel.load().await?;

    let server = kernel.get_bean("server").expect("unnamed bean resolves to its type name");
    assert_eq!(server.downcast::<Server>().map(|s| s.port), Some(8080));
    Ok(())
}

#[tokio::test]
async fn test_missing_dependency_fails_load() {
    let mut kernel = DefaultKernel::new();
    kernel
        .provide(
            "server",
            Box::new(prototype(|ctx| {
                let config = ctx.require::<Config>()?;
                Ok(Server { port: config.port })
            })),
        )
        .unwrap();

    let err = kernel.load().await.unwrap_err();
    match err {
        Error::Construction { bean, .. } => assert_eq!(bean, "server"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_provide_after_load_is_rejected() {
    let mut kernel = DefaultKernel::new();
    kernel.load().await.unwrap();

    let err = kernel
        .provide("late", Box::new(prototype(|_ctx| Ok(Config { port: 1 }))))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::KernelLifecycleError { phase: KernelLifecyclePhase::Provision, .. }
    ));

    // Instances can still be installed directly
    kernel
        .register_instance("late", BeanHandle::new(Config { port: 1 }))
        .unwrap();
    assert!(kernel.get_bean("late").is_some());

    assert!(kernel.load().await.is_err(), "load runs once");
}

#[tokio::test]
async fn test_serve_requires_load() {
    let mut kernel = DefaultKernel::new();
    let err = kernel.serve(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::KernelLifecycleError { phase: KernelLifecyclePhase::Serve, .. }
    ));
}

#[tokio::test]
async fn test_cancel_destroys_in_reverse_order() -> Result<()> {
    let log = events();
    let mut kernel = DefaultKernel::new();
    kernel.register_instance("a", BeanHandle::new(Recorder::new("a", &log)))?;
    kernel.register_instance("b", BeanHandle::new(Recorder::new("b", &log)))?;
    kernel.load().await?;
    let handle = kernel.serve_handle().clone();

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });
    kernel.serve(shutdown).await?;

    let tail: Vec<String> = recorded(&log).into_iter().skip(2).collect();
    assert_eq!(tail, vec!["destroy:b", "destroy:a"]);
    assert!(handle.is_stopped(), "background work is told to stop");
    assert!(kernel.serve(CancellationToken::new()).await.is_err(), "serve runs once");
    Ok(())
}

/// Stops or fails the serve loop from a background task.
#[derive(Debug)]
struct Ticker {
    fail: bool,
}

#[async_trait]
impl Bean for Ticker {
    async fn initialized(&self, handle: &ServeHandle) -> Result<()> {
        let handle = handle.clone();
        let fail = self.fail;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if fail {
                handle.fail("listener crashed");
            } else {
                handle.request_stop();
            }
        });
        Ok(())
    }
}

#[tokio::test]
async fn test_bean_can_request_stop() -> Result<()> {
    let mut kernel = DefaultKernel::new();
    kernel.register_instance("ticker", BeanHandle::new(Ticker { fail: false }))?;
    kernel.load().await?;

    // Never cancelled from outside
    kernel.serve(CancellationToken::new()).await
}

#[tokio::test]
async fn test_bean_failure_ends_serve_with_error() -> Result<()> {
    let mut kernel = DefaultKernel::new();
    kernel.register_instance("ticker", BeanHandle::new(Ticker { fail: true }))?;
    kernel.load().await?;

    let err = kernel.serve(CancellationToken::new()).await.unwrap_err();
    match err {
        Error::Serve(reason) => assert_eq!(reason, "listener crashed"),
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

/// Fails its post-load hook.
#[derive(Debug)]
struct BrokenInit;

#[async_trait]
impl Bean for BrokenInit {
    async fn initialized(&self, _handle: &ServeHandle) -> Result<()> {
        Err(Error::Other("port already in use".to_string()))
    }
}

#[tokio::test]
async fn test_abort_after_failed_load_releases_initialized_beans() -> Result<()> {
    let log = events();
    let mut kernel = DefaultKernel::new();
    kernel.register_instance("a", BeanHandle::new(Recorder::new("a", &log)))?;
    kernel.register_instance("b", BeanHandle::new(Recorder::new("b", &log)))?;
    kernel.register_instance("broken", BeanHandle::new(BrokenInit))?;
    let handle = kernel.serve_handle().clone();

    let err = kernel.load().await.unwrap_err();
    assert!(matches!(err, Error::Construction { ref bean, .. } if bean == "broken"));
    assert!(!handle.is_stopped());

    kernel.abort().await;
    kernel.abort().await;

    assert!(handle.is_stopped(), "background work is told to stop");
    let destroyed: Vec<String> = recorded(&log)
        .into_iter()
        .filter(|e| e.starts_with("destroy:"))
        .collect();
    assert_eq!(destroyed, vec!["destroy:b", "destroy:a"]);
    Ok(())
}

#[derive(Debug)]
struct SlowClose;

#[async_trait]
impl Bean for SlowClose {
    async fn destroy(&self) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_shutdown_is_bounded_by_grace_period() -> Result<()> {
    let mut kernel = DefaultKernel::new().with_shutdown_grace(Duration::from_millis(50));
    kernel.register_instance("slow", BeanHandle::new(SlowClose))?;
    kernel.load().await?;

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let started = Instant::now();
    kernel.serve(shutdown).await?;
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[test]
fn test_shutdown_grace_resolution() -> Result<()> {
    let mut kernel = DefaultKernel::new();
    assert_eq!(kernel.shutdown_grace(), Duration::from_secs(30));

    kernel.properties_mut().set("app.shutdown-timeout", "5")?;
    assert_eq!(kernel.shutdown_grace(), Duration::from_secs(5));

    let kernel = kernel.with_shutdown_grace(Duration::from_secs(1));
    assert_eq!(kernel.shutdown_grace(), Duration::from_secs(1));
    Ok(())
}
