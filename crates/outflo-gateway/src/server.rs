// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. There is no authentication
//! layer: auth is an external collaborator in front of this service.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use outflo_agent::{AgentController, CallRunner};
use outflo_core::OutfloError;
use outflo_core::traits::StorageAdapter;
use outflo_dispatch::DispatchOrchestrator;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::sse::{self, AuditEvent};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub storage: Arc<dyn StorageAdapter>,
    pub orchestrator: Arc<DispatchOrchestrator>,
    pub controller: AgentController,
    /// Runner spawned per started agent.
    pub runner: Arc<CallRunner>,
    /// Chunk size handed to the ingestion committer.
    pub ingest_batch_size: usize,
    /// New audit rows pushed to SSE subscribers.
    pub audit_tx: broadcast::Sender<AuditEvent>,
    /// Cancelled on shutdown; call runners inherit child tokens.
    pub shutdown: CancellationToken,
}

/// Gateway server configuration (mirrors GatewayConfig from outflo-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router over the shared state.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/leads/import", post(handlers::post_leads_import))
        .route("/v1/leads", get(handlers::get_leads))
        .route("/v1/campaigns", post(handlers::post_campaigns))
        .route("/v1/campaigns/{id}", get(handlers::get_campaign))
        .route(
            "/v1/campaigns/{id}/recipients",
            put(handlers::put_campaign_recipients),
        )
        .route(
            "/v1/campaigns/{id}/schedule",
            post(handlers::post_campaign_schedule),
        )
        .route(
            "/v1/campaigns/{id}/dispatch",
            post(handlers::post_campaign_dispatch),
        )
        .route("/v1/agents", post(handlers::post_agents))
        .route("/v1/agents", get(handlers::get_agents))
        .route("/v1/agents/{id}", get(handlers::get_agent))
        .route("/v1/agents/{id}", delete(handlers::delete_agent))
        .route("/v1/agents/{id}/start", post(handlers::post_agent_start))
        .route("/v1/agents/{id}/pause", post(handlers::post_agent_pause))
        .route("/v1/agents/{id}/resume", post(handlers::post_agent_resume))
        .route("/v1/agents/{id}/reset", post(handlers::post_agent_reset))
        .route("/v1/logs/campaigns", get(handlers::get_campaign_logs))
        .route("/v1/agents/{id}/logs", get(handlers::get_agent_logs))
        .route("/v1/logs/stream", get(sse::stream_logs))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until `shutdown` fires.
///
/// Also spawns the audit tailer that feeds `/v1/logs/stream`.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), OutfloError> {
    let shutdown = state.shutdown.clone();
    sse::spawn_audit_tailer(state.storage.clone(), state.audit_tx.clone(), shutdown.clone());

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| OutfloError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| OutfloError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8780,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("8780"));
    }
}
