//! HTTP API: axum router over the ledger service.
//!
//! - `routes.rs`: handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: error → status mapping

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;

use crate::application::LedgerService;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router.
pub fn router(service: Arc<LedgerService>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/accounts/:id/transactions",
            post(routes::submit_transaction),
        )
        .route("/accounts/:id/statement", get(routes::get_statement))
        .with_state(service)
}

/// Serve the API on an already-bound listener until Ctrl-C / SIGTERM.
pub async fn serve(listener: TcpListener, service: Arc<LedgerService>) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
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
                tracing::error!("failed to listen for SIGTERM: {e}");
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
    tracing::info!("shutdown signal received");
}
