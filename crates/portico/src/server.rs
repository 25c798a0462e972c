//! Gateway HTTP server.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::api::{create_router, AppState};

/// Server configuration.
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub state: AppState,
}

/// Run the gateway until Ctrl-C.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(config.state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    portico_telemetry::log_listening!(
        addr = %listener.local_addr()?,
        "gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    portico_telemetry::log_shutdown!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received, draining connections"),
        Err(e) => {
            // Without a signal handler the server runs until killed.
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}
