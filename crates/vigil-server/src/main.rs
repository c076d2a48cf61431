//! vigil server
//!
//! - `GET /`        : greeting, counts `http_requests_total`
//! - `GET /health`  : probe target
//! - `GET /metrics` : Prometheus text exposition

use tracing_subscriber::{fmt, EnvFilter};

use vigil_core::error::VigilError;
use vigil_server::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<(), VigilError> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = config::load()?;
    let listen = cfg.listen_addr()?;

    // Duplicate metric registration aborts startup here.
    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| VigilError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "vigil-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| VigilError::Internal(format!("server failed: {e}")))?;

    tracing::info!("vigil-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
