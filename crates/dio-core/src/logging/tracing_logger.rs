use std::fs;
use std::io::IsTerminal;
use std::sync::Arc;

use log::Level;
use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, fmt};

use crate::kernel::error::{Error, Result};
use crate::logging::logger::{LogRecord, Logger};
use crate::logging::properties::LogProperties;

/// Default logging backend built from [`LogProperties`].
///
/// Entries go to the console and/or two daily rolling files
/// (`<name>.<date>.log` with everything at the enabled level, and
/// `<name>_error.<date>.log` with errors only). The subscriber is private to
/// this logger; call [`install_global`](TracingLogger::install_global) to make
/// it the process-wide default.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    dispatch: Dispatch,
    name: Option<String>,
    with_caller: bool,
    trace_name: String,
}

impl TracingLogger {
    pub fn from_properties(props: &LogProperties) -> Result<Self> {
        let level = if props.debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };

        let console = props.std.then(|| {
            fmt::layer()
                .with_target(false)
                .with_ansi(std::io::stdout().is_terminal())
                .with_writer(std::io::stdout)
        });

        let (file, error_file) = if props.file {
            let dir = props.dir_path();
            fs::create_dir_all(&dir).map_err(|e| {
                Error::logger(
                    format!("cannot create log directory '{}'", dir.display()),
                    Some(e),
                )
            })?;
            let retention = props.max_age.max(1) as usize;
            let open = |prefix: String| {
                RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .filename_prefix(prefix)
                    .filename_suffix("log")
                    .max_log_files(retention)
                    .build(&dir)
                    .map_err(|e| {
                        Error::logger(
                            format!("cannot open log file in '{}'", dir.display()),
                            Some(e),
                        )
                    })
            };
            let all = open(props.name.clone())?;
            let errors = open(format!("{}_error", props.name))?;
            (
                Some(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(all),
                ),
                Some(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(errors)
                        .with_filter(LevelFilter::ERROR),
                ),
            )
        } else {
            (None, None)
        };

        let subscriber = tracing_subscriber::registry()
            .with(level)
            .with(console)
            .with(file)
            .with(error_file);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            name: None,
            with_caller: props.debug,
            trace_name: props.trace_name.clone(),
        })
    }

    /// Make this logger's subscriber the global default and route the `log`
    /// facade into it. Fails if another global subscriber is already set.
    pub fn install_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone()).map_err(|e| {
            Error::logger("a global tracing subscriber is already installed", Some(e))
        })?;
        tracing_log::LogTracer::init()
            .map_err(|e| Error::logger("a global `log` logger is already installed", Some(e)))?;
        Ok(())
    }

    fn render(&self, record: &LogRecord<'_>) -> String {
        let mut line = String::new();
        if let Some(name) = self.name.as_deref() {
            line.push_str(name);
            line.push(' ');
        }
        if let Some(trace_id) = record.ctx.trace_id() {
            line.push_str(&format!("[{}] ", trace_id));
        }
        line.push_str(&record.render_message());
        if self.with_caller {
            if let Some(caller) = record.caller {
                line.push_str(&format!(" ({}:{})", caller.file(), caller.line()));
            }
        }
        line
    }
}

impl Logger for TracingLogger {
    fn named(&self, name: &str) -> Arc<dyn Logger> {
        let name = match self.name.as_deref() {
            Some(existing) if !existing.is_empty() => format!("{}.{}", existing, name),
            _ => name.to_string(),
        };
        Arc::new(Self {
            name: Some(name),
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
        &self.trace_name
    }

    fn log(&self, record: &LogRecord<'_>) {
        let line = self.render(record);
        tracing::dispatcher::with_default(&self.dispatch, || match record.level {
            Level::Error => tracing::error!("{}", line),
            Level::Warn => tracing::warn!("{}", line),
            Level::Info => tracing::info!("{}", line),
            Level::Debug => tracing::debug!("{}", line),
            Level::Trace => tracing::trace!("{}", line),
        });
    }
}
