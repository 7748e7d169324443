use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::logging::KernelLog;

/// Cancel `token` on the first SIGINT or SIGTERM.
///
/// The listener exits on its own once the token is cancelled by anything
/// else; abort the returned handle to stop it earlier.
pub(crate) fn spawn_listener(token: CancellationToken, log: Arc<dyn KernelLog>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            signal = shutdown_signal(log.as_ref()) => {
                log.info(&format!("Received {}, initiating graceful shutdown", signal));
                token.cancel();
            }
        }
    })
}

async fn shutdown_signal(log: &dyn KernelLog) -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log.warn(&format!("Failed to listen for interrupt signal: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log.warn(&format!("Failed to listen for terminate signal: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
