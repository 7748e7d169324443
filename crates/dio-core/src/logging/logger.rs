use std::fmt::{Debug, Display};
use std::panic::Location;
use std::sync::Arc;

use async_trait::async_trait;
use log::Level;
use uuid::Uuid;

use crate::kernel::bean::Bean;
use crate::kernel::constants::LOGGER_BEAN_NAME;

/// Correlation data carried alongside a log call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: Option<String>,
}

impl TraceContext {
    /// A context with no trace id
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_trace_id(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
        }
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

/// A single log call as seen by a [`Logger`] implementation.
pub struct LogRecord<'a> {
    pub ctx: &'a TraceContext,
    pub level: Level,
    pub message: &'a str,
    pub fields: &'a [(&'a str, &'a dyn Display)],
    pub caller: Option<&'static Location<'static>>,
}

impl LogRecord<'_> {
    /// `message key=value key=value`
    pub fn render_message(&self) -> String {
        let mut line = self.message.to_string();
        for (key, value) in self.fields {
            line.push_str(&format!(" {}={}", key, value));
        }
        line
    }
}

/// The host application's logging backend.
///
/// Implementations only need [`log`](Logger::log) plus the derivation
/// methods; the level helpers capture their call site so backends can
/// annotate entries with it.
pub trait Logger: Send + Sync + Debug {
    /// Derive a logger whose entries carry `name` as a tag.
    fn named(&self, name: &str) -> Arc<dyn Logger>;

    /// Derive a logger that never annotates entries with a call site.
    fn without_caller(&self) -> Arc<dyn Logger>;

    /// Name of the request header carrying the trace id.
    fn trace_name(&self) -> &str;

    fn log(&self, record: &LogRecord<'_>);

    #[track_caller]
    fn debug(&self, ctx: &TraceContext, message: &str) {
        self.log_at(ctx, Level::Debug, message, &[], Location::caller());
    }

    #[track_caller]
    fn info(&self, ctx: &TraceContext, message: &str) {
        self.log_at(ctx, Level::Info, message, &[], Location::caller());
    }

    #[track_caller]
    fn warn(&self, ctx: &TraceContext, message: &str) {
        self.log_at(ctx, Level::Warn, message, &[], Location::caller());
    }

    #[track_caller]
    fn error(&self, ctx: &TraceContext, message: &str) {
        self.log_at(ctx, Level::Error, message, &[], Location::caller());
    }

    /// Log with structured key/value fields.
    #[track_caller]
    fn log_with(
        &self,
        ctx: &TraceContext,
        level: Level,
        message: &str,
        fields: &[(&str, &dyn Display)],
    ) {
        self.log_at(ctx, level, message, fields, Location::caller());
    }

    #[doc(hidden)]
    fn log_at(
        &self,
        ctx: &TraceContext,
        level: Level,
        message: &str,
        fields: &[(&str, &dyn Display)],
        caller: &'static Location<'static>,
    ) {
        self.log(&LogRecord {
            ctx,
            level,
            message,
            fields,
            caller: Some(caller),
        });
    }

    /// Ensure the context carries a trace id, minting a fresh one if needed.
    fn trace(&self, ctx: &TraceContext) -> TraceContext {
        match ctx.trace_id() {
            Some(_) => ctx.clone(),
            None => TraceContext::with_trace_id(Uuid::new_v4().to_string()),
        }
    }

    /// Pin a caller-supplied trace id (e.g. read from the trace header).
    fn trace_with(&self, _ctx: &TraceContext, trace_id: &str) -> TraceContext {
        TraceContext::with_trace_id(trace_id)
    }
}

/// The active logger, registered as a bean so other beans can depend on it.
#[derive(Debug, Clone)]
pub struct SharedLogger {
    logger: Arc<dyn Logger>,
}

impl SharedLogger {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }
}

#[async_trait]
impl Bean for SharedLogger {
    fn bean_name(&self) -> Option<&str> {
        Some(LOGGER_BEAN_NAME)
    }
}
