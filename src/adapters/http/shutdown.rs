//! Graceful shutdown trigger for the HTTP server.

use std::future::Future;

use tokio::signal;

/// Which signal ended the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
///
/// Pass to `axum::serve(..).with_graceful_shutdown` so in-flight webhooks
/// finish before the process exits.
pub async fn shutdown_signal() {
    let signal = wait_for_shutdown(interrupt(), terminate()).await;
    tracing::info!(signal = ?signal, "Shutdown signal received, draining connections");
}

async fn wait_for_shutdown(
    interrupt: impl Future<Output = ()>,
    terminate: impl Future<Output = ()>,
) -> ShutdownSignal {
    tokio::select! {
        _ = interrupt => ShutdownSignal::Interrupt,
        _ = terminate => ShutdownSignal::Terminate,
    }
}

async fn interrupt() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn terminate_alone_triggers_shutdown() {
        let (tx, rx) = oneshot::channel::<()>();
        tx.send(()).unwrap();

        let signal = wait_for_shutdown(pending(), async {
            let _ = rx.await;
        })
        .await;

        assert_eq!(signal, ShutdownSignal::Terminate);
    }

    #[tokio::test]
    async fn interrupt_alone_triggers_shutdown() {
        let signal = wait_for_shutdown(async {}, pending()).await;

        assert_eq!(signal, ShutdownSignal::Interrupt);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sigterm_handler_installs_without_resolving() {
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(20), terminate()).await;

        assert!(result.is_err());
    }
}
