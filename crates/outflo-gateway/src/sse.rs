// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events tail of the audit log.
//!
//! A background tailer polls the append-only audit tables for rows beyond
//! the last seen IDs and broadcasts them; `GET /v1/logs/stream` subscribes
//! and pushes each row as one SSE event.
//!
//! SSE event format:
//! ```text
//! event: campaign_log
//! data: {"id": 7, "campaign_id": "...", ...}
//!
//! event: agent_call_log
//! data: {"id": 12, "agent_id": "...", ...}
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::StreamExt;
use futures::stream::Stream;
use outflo_core::traits::StorageAdapter;
use outflo_core::types::{AgentCallLog, CampaignLog};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::server::GatewayState;

const TAIL_INTERVAL: Duration = Duration::from_secs(1);

/// One new audit row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEvent {
    CampaignLog(CampaignLog),
    AgentCallLog(AgentCallLog),
}

impl AuditEvent {
    fn event_name(&self) -> &'static str {
        match self {
            AuditEvent::CampaignLog(_) => "campaign_log",
            AuditEvent::AgentCallLog(_) => "agent_call_log",
        }
    }
}

/// Spawn the audit tailer task.
///
/// Polls both audit tables, remembers the highest ID seen per table, and
/// broadcasts anything newer in ascending order. Send errors (no
/// subscribers) are expected and ignored.
pub fn spawn_audit_tailer(
    storage: Arc<dyn StorageAdapter>,
    tx: broadcast::Sender<AuditEvent>,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        // Start past existing rows so subscribers only see new entries.
        let mut last_campaign_id = match storage.list_campaign_logs(None).await {
            Ok(logs) => logs.first().map(|l| l.id).unwrap_or(0),
            Err(_) => 0,
        };
        let mut last_call_id = match storage.list_call_logs_after(0).await {
            Ok(logs) => logs.last().map(|l| l.id).unwrap_or(0),
            Err(_) => 0,
        };

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep(TAIL_INTERVAL) => {}
            }

            match storage.list_campaign_logs(None).await {
                Ok(logs) => {
                    let mut fresh: Vec<CampaignLog> =
                        logs.into_iter().filter(|l| l.id > last_campaign_id).collect();
                    fresh.sort_by_key(|l| l.id);
                    for log in fresh {
                        last_campaign_id = log.id;
                        let _ = tx.send(AuditEvent::CampaignLog(log));
                    }
                }
                Err(e) => warn!(error = %e, "audit tailer campaign query failed"),
            }

            match storage.list_call_logs_after(last_call_id).await {
                Ok(logs) => {
                    for log in logs {
                        last_call_id = log.id;
                        let _ = tx.send(AuditEvent::AgentCallLog(log));
                    }
                }
                Err(e) => warn!(error = %e, "audit tailer call query failed"),
            }
        }
    });
}

/// GET /v1/logs/stream
pub async fn stream_logs(
    State(state): State<GatewayState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.audit_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(Event::default().event(event.event_name()).data(data)))
            }
            // Lagged subscribers just miss events; the GET endpoints
            // remain the source of truth.
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
