//! HTTP server: webhook route and health probe on a single port.

use crate::config::Config;
use crate::webhook::{handle_request, Acknowledgment, BotContext, InboundRequest, WebhookError};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Build the router for `ctx`: `GET /` health and `POST <webhookPath>`.
pub fn router(ctx: Arc<BotContext>) -> Router {
    let webhook_path = match ctx.config.server.webhook_path.trim() {
        p if p.starts_with('/') => p.to_string(),
        p => format!("/{}", p),
    };
    Router::new()
        .route("/", get(health_http))
        .route(&webhook_path, post(line_webhook))
        .with_state(ctx)
}

/// Resolve credentials, bind, and serve until SIGINT/SIGTERM.
pub async fn run_server(config: Config) -> Result<()> {
    let ctx = Arc::new(BotContext::from_config(config)?);
    let server = &ctx.config.server;
    let bind_addr = format!("{}:{}", server.bind.trim(), server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!(
        "listening on {} (webhook {}, ack mode {:?})",
        bind_addr,
        server.webhook_path,
        server.ack_mode
    );

    axum::serve(listener, router(ctx.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;
    log::info!("server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
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
                log::error!("failed to install SIGTERM handler: {}", e);
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
    log::info!("shutdown signal received, draining connections");
}

/// POST <webhookPath>: LINE webhook delivery.
async fn line_webhook(
    State(ctx): State<Arc<BotContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Acknowledgment, WebhookError> {
    let mut req = InboundRequest::new(body.to_vec());
    for (name, value) in headers.iter() {
        if let Ok(v) = value.to_str() {
            req = req.with_header(name.as_str(), v);
        }
    }
    handle_request(&ctx, req).await
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(ctx): State<Arc<BotContext>>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": ctx.config.server.port,
    }))
}
