use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::routes::{build, RelayState};

/// Binds `addr` and serves the relay until Ctrl-C or SIGTERM.
pub async fn serve(addr: SocketAddr, state: Arc<RelayState>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("SwasthyaAI relay running at http://{}", listener.local_addr()?);
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

/// Serves the relay on an already-bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: Arc<RelayState>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Relay stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
