// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `outflo serve` command implementation.
//!
//! Opens storage, registers the dry-run channel adapters, and runs the
//! gateway until ctrl-c.

use std::sync::Arc;
use std::time::Duration;

use outflo_agent::{AgentController, CallRunner, RunnerSettings};
use outflo_config::model::OutfloConfig;
use outflo_core::OutfloError;
use outflo_core::traits::StorageAdapter;
use outflo_core::types::Channel;
use outflo_dispatch::{ChannelRegistry, DispatchOrchestrator, DispatchSettings, DryRunChannel};
use outflo_gateway::{GatewayState, ServerConfig};
use outflo_storage::SqliteStorage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber from the configured log level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("outflo={log_level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Runs the `outflo serve` command.
pub async fn run_serve(config: OutfloConfig) -> Result<(), OutfloError> {
    init_tracing(&config.service.log_level);
    info!(service = %config.service.name, "starting outflo");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = storage;

    // Every channel gets a dry-run adapter; real providers are external
    // collaborators that replace these at the registry seam.
    let mut registry = ChannelRegistry::new();
    for channel in [Channel::Email, Channel::Sms, Channel::Whatsapp, Channel::Ai] {
        registry.register(Arc::new(DryRunChannel::new(channel)));
    }
    let registry = Arc::new(registry);

    let orchestrator = Arc::new(DispatchOrchestrator::new(
        storage.clone(),
        registry.clone(),
        DispatchSettings {
            inter_send_delay: Duration::from_millis(config.dispatch.inter_send_delay_ms),
            redispatch_failed: config.dispatch.redispatch_failed,
        },
    ));

    let voice = registry.get(Channel::Ai)?;
    let runner = Arc::new(CallRunner::new(
        storage.clone(),
        voice,
        RunnerSettings {
            call_interval: Duration::from_millis(config.agent.call_interval_ms),
            script_template: config.agent.script_template.clone(),
        },
    ));

    let shutdown = CancellationToken::new();
    let (audit_tx, _) = broadcast::channel(256);

    let state = GatewayState {
        storage: storage.clone(),
        orchestrator,
        controller: AgentController::new(storage.clone()),
        runner,
        ingest_batch_size: config.ingest.batch_size,
        audit_tx,
        shutdown: shutdown.clone(),
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let ctrlc_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            ctrlc_shutdown.cancel();
        }
    });

    outflo_gateway::start_server(&server_config, state).await?;

    storage.close().await?;
    info!("outflo stopped");
    Ok(())
}
