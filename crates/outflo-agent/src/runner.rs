// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellable call loop for a running agent.
//!
//! The runner re-reads the agent from storage on every iteration, so status
//! changes made concurrently (pause, reset, delete) take effect before the
//! next call. Cancellation between calls leaves already-written call logs
//! valid: the cursor and the log move together in `advance`.

use std::sync::Arc;
use std::time::Duration;

use outflo_core::OutfloError;
use outflo_core::traits::{ChannelAdapter, StorageAdapter};
use outflo_core::types::{AgentStatus, AiAgent, MessageContent, Recipient, SendOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::controller::AgentController;

/// Runner tunables, mapped from `[agent]` config by the binary.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Pause between consecutive calls.
    pub call_interval: Duration,
    /// Script template; `{name}` and `{business_type}` are substituted
    /// from the agent before each call.
    pub script_template: String,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            call_interval: Duration::from_millis(1000),
            script_template:
                "Hello, this is {name} calling on behalf of a {business_type} business."
                    .to_string(),
        }
    }
}

/// Substitute agent fields into the script template.
pub fn render_script(template: &str, agent: &AiAgent) -> String {
    template
        .replace("{name}", &agent.name)
        .replace("{business_type}", &agent.business_type)
}

/// Drives one agent's calls while it stays `running`.
pub struct CallRunner {
    storage: Arc<dyn StorageAdapter>,
    controller: AgentController,
    voice: Arc<dyn ChannelAdapter>,
    settings: RunnerSettings,
}

impl CallRunner {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        voice: Arc<dyn ChannelAdapter>,
        settings: RunnerSettings,
    ) -> Self {
        let controller = AgentController::new(storage.clone());
        Self {
            storage,
            controller,
            voice,
            settings,
        }
    }

    /// Run until the agent stops being `running`, its list is exhausted, or
    /// the token is cancelled.
    pub async fn run(&self, agent_id: &str, token: CancellationToken) -> Result<(), OutfloError> {
        info!(agent_id, "call runner started");
        loop {
            if token.is_cancelled() {
                info!(agent_id, "call runner cancelled");
                return Ok(());
            }

            let Some(agent) = self.storage.get_agent(agent_id).await? else {
                info!(agent_id, "agent gone, call runner stopping");
                return Ok(());
            };
            if agent.status != AgentStatus::Running {
                info!(agent_id, status = %agent.status, "agent not running, call runner stopping");
                return Ok(());
            }
            if agent.is_exhausted() {
                // Running with nothing left to call only happens for an
                // empty lead list; close it out.
                self.storage
                    .update_agent_cursor(agent_id, agent.current_index, AgentStatus::Completed)
                    .await?;
                info!(agent_id, "lead list exhausted, agent completed");
                return Ok(());
            }

            let phone = agent.lead_list[agent.current_index].clone();
            let script = render_script(&self.settings.script_template, &agent);

            let outcome = if phone.trim().is_empty() {
                SendOutcome::Skipped
            } else {
                self.place_call(&agent, &phone, &script).await
            };
            self.controller.advance(agent_id, outcome, &script).await?;

            tokio::select! {
                _ = token.cancelled() => {
                    info!(agent_id, "call runner cancelled");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.settings.call_interval) => {}
            }
        }
    }

    async fn place_call(&self, agent: &AiAgent, phone: &str, script: &str) -> SendOutcome {
        let recipient = Recipient {
            lead_id: phone.to_string(),
            name: String::new(),
            email: None,
            phone: Some(phone.to_string()),
        };
        let content = MessageContent {
            subject: None,
            body: script.to_string(),
        };
        match self.voice.send(&recipient, &content).await {
            Ok(delivery) if delivery.delivered => SendOutcome::Delivered,
            Ok(_) => SendOutcome::Failed,
            Err(e) => {
                warn!(agent_id = %agent.id, phone, error = %e, "voice call failed");
                SendOutcome::Failed
            }
        }
    }
}
