use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "Dio";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tag attached to every kernel diagnostic forwarded by the logger bridge
pub const KERNEL_LOG_TAG: &str = "[DIO]";

/// Name under which the active application logger is registered as a bean
pub const LOGGER_BEAN_NAME: &str = "log";

/// Default request header carrying the trace id
pub const DEFAULT_TRACE_NAME: &str = "X-Request-Id";

/// Prefix of the default logger name; the host name is appended
pub const DEFAULT_LOG_NAME_PREFIX: &str = "dio_app";

/// Default log directory
pub const DEFAULT_LOG_DIR: &str = "./logs";

/// Default log retention in days
pub const DEFAULT_LOG_MAX_AGE: i64 = 30;

/// Retention used when the configured value is not positive
pub const FALLBACK_LOG_MAX_AGE: i64 = 7;

/// Placeholder in `log.name` replaced by the host name
pub const HOSTNAME_PLACEHOLDER: &str = "@hostname";

/// Property overriding the shutdown grace period, in seconds
pub const SHUTDOWN_TIMEOUT_PROPERTY: &str = "app.shutdown-timeout";

/// Window given to beans to release their resources once serving stops
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Separator folded into `.` when environment variables become properties
pub const ENV_KEY_SEPARATOR: char = '_';

/// Start-up banner printed when the logger bridge is installed
pub const BANNER: &str = r" ____    ______   _____
/\  _`\ /\__  _\ /\  __`\
\ \ \/\ \/_/\ \/ \ \ \/\ \
 \ \ \ \ \ \ \ \  \ \ \ \ \
  \ \ \_\ \ \_\ \__\ \ \_\ \
   \ \____/ /\_____\\ \_____\
    \/___/  \/_____/ \/_____/";
