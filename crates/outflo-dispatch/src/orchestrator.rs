// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign dispatch orchestrator.
//!
//! Drives a campaign through draft -> scheduled -> running -> sent | failed,
//! invoking the channel adapter once per recipient, strictly sequentially.
//! Per-recipient failures are recorded, never propagated: one dispatch
//! invocation always produces exactly one audit log row once it passes its
//! gates.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use outflo_core::OutfloError;
use outflo_core::traits::StorageAdapter;
use outflo_core::types::{
    Campaign, CampaignStatus, Channel, DeliveryStatus, DispatchResult, MessageContent, Recipient,
    ScheduleStatus, SendOutcome,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::registry::ChannelRegistry;

/// Orchestrator tunables, mapped from `[dispatch]` config by the binary.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Pause between consecutive sends. The throttle is part of the
    /// contract: sends are never parallelized.
    pub inter_send_delay: Duration,
    /// Whether a campaign in `failed` may be dispatched again.
    pub redispatch_failed: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            inter_send_delay: Duration::from_millis(500),
            redispatch_failed: true,
        }
    }
}

/// Per-invocation counts surfaced to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCounts {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// What one dispatch invocation did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub success: bool,
    pub message: String,
    pub counts: DispatchCounts,
    pub results: Vec<DispatchResult>,
}

/// Coordinates the campaign store, the channel registry, and the audit log.
pub struct DispatchOrchestrator {
    storage: Arc<dyn StorageAdapter>,
    registry: Arc<ChannelRegistry>,
    settings: DispatchSettings,
}

impl DispatchOrchestrator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        registry: Arc<ChannelRegistry>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            storage,
            registry,
            settings,
        }
    }

    async fn load_campaign(&self, id: &str) -> Result<Campaign, OutfloError> {
        self.storage
            .get_campaign(id)
            .await?
            .ok_or_else(|| OutfloError::Validation(format!("campaign {id} not found")))
    }

    /// Schedule a draft campaign for `when`.
    pub async fn schedule(
        &self,
        campaign_id: &str,
        when: DateTime<Utc>,
    ) -> Result<(), OutfloError> {
        let campaign = self.load_campaign(campaign_id).await?;
        if campaign.status != CampaignStatus::Draft {
            return Err(OutfloError::Precondition(format!(
                "campaign {campaign_id} is {}, only draft campaigns can be scheduled",
                campaign.status
            )));
        }
        self.storage.set_campaign_schedule(campaign_id, when).await?;
        info!(campaign_id, scheduled_at = %when, "campaign scheduled");
        Ok(())
    }

    /// Replace the campaign's recipient set. The one write path for
    /// membership: atomic-by-replacement, never a merge.
    pub async fn replace_recipients(
        &self,
        campaign_id: &str,
        lead_ids: &[String],
    ) -> Result<(), OutfloError> {
        self.load_campaign(campaign_id).await?;
        self.storage.replace_recipients(campaign_id, lead_ids).await
    }

    /// Flag an `ai` campaign as running. Places no calls: the agent
    /// controller executes asynchronously.
    pub async fn start_ai_campaign(&self, campaign_id: &str) -> Result<DispatchReport, OutfloError> {
        let campaign = self.load_campaign(campaign_id).await?;
        if campaign.channel != Channel::Ai {
            return Err(OutfloError::Validation(format!(
                "campaign {campaign_id} is on channel {}, not ai",
                campaign.channel
            )));
        }
        self.check_dispatch_gate(&campaign)?;

        let recipients = self.storage.get_recipients(campaign_id).await?;
        if recipients.is_empty() {
            return Err(OutfloError::Precondition(format!(
                "campaign {campaign_id} has no leads"
            )));
        }

        self.storage
            .mark_campaign_started(campaign_id, Utc::now())
            .await?;
        info!(campaign_id, "ai campaign started");
        Ok(DispatchReport {
            success: true,
            message: "AI campaign started".to_string(),
            counts: DispatchCounts::default(),
            results: Vec::new(),
        })
    }

    fn check_dispatch_gate(&self, campaign: &Campaign) -> Result<(), OutfloError> {
        match campaign.status {
            CampaignStatus::Sent => Err(OutfloError::Precondition(format!(
                "campaign {} already sent",
                campaign.id
            ))),
            CampaignStatus::Running => Err(OutfloError::Precondition(format!(
                "campaign {} is already running",
                campaign.id
            ))),
            CampaignStatus::Failed if !self.settings.redispatch_failed => {
                Err(OutfloError::Precondition(format!(
                    "campaign {} failed and re-dispatch is disabled",
                    campaign.id
                )))
            }
            _ => Ok(()),
        }
    }

    /// Dispatch a campaign to its assigned recipients.
    pub async fn dispatch(
        &self,
        campaign_id: &str,
        content: &MessageContent,
    ) -> Result<DispatchReport, OutfloError> {
        let campaign = self.load_campaign(campaign_id).await?;
        self.check_dispatch_gate(&campaign)?;

        let recipients = self.storage.get_recipients(campaign_id).await?;
        if recipients.is_empty() {
            return Err(OutfloError::Precondition(format!(
                "campaign {campaign_id} has no leads"
            )));
        }

        if campaign.channel == Channel::Ai {
            return self.start_ai_campaign(campaign_id).await;
        }

        if content.body.trim().is_empty() {
            return Err(OutfloError::Precondition(format!(
                "campaign {campaign_id} has no content"
            )));
        }

        let adapter = self.registry.get(campaign.channel)?;
        self.storage
            .mark_campaign_started(campaign_id, Utc::now())
            .await?;

        let mut counts = DispatchCounts::default();
        let mut results = Vec::with_capacity(recipients.len());
        let total = recipients.len();

        for (i, lead) in recipients.iter().enumerate() {
            let recipient = Recipient::from(lead);
            let mut result = DispatchResult {
                campaign_id: campaign_id.to_string(),
                recipient_id: recipient.lead_id.clone(),
                channel: campaign.channel,
                outcome: SendOutcome::Skipped,
                error: None,
            };

            if !has_required_contact(campaign.channel, &recipient) {
                counts.skipped += 1;
                result.error = Some("missing contact field".to_string());
                results.push(result);
                continue;
            }

            match adapter.send(&recipient, content).await {
                Ok(delivery) if delivery.delivered => {
                    counts.sent += 1;
                    result.outcome = SendOutcome::Delivered;
                }
                Ok(delivery) => {
                    counts.failed += 1;
                    result.outcome = SendOutcome::Failed;
                    result.error = delivery.error_code;
                }
                Err(e) => {
                    warn!(campaign_id, recipient = %recipient.lead_id, error = %e, "send failed");
                    counts.failed += 1;
                    result.outcome = SendOutcome::Failed;
                    result.error = Some(e.to_string());
                }
            }
            results.push(result);

            if i + 1 < total && !self.settings.inter_send_delay.is_zero() {
                tokio::time::sleep(self.settings.inter_send_delay).await;
            }
        }

        // All-skipped means nothing was attempted, which counts as failure.
        let delivery_status = if counts.sent + counts.failed == 0 {
            DeliveryStatus::Failed
        } else if counts.failed == 0 {
            DeliveryStatus::Sent
        } else if counts.sent == 0 {
            DeliveryStatus::Failed
        } else {
            DeliveryStatus::Partial
        };

        self.storage
            .insert_campaign_log(campaign_id, total as i64, delivery_status, campaign.channel)
            .await?;

        let (status, schedule_status) = match delivery_status {
            DeliveryStatus::Failed => (CampaignStatus::Failed, ScheduleStatus::Failed),
            _ => (CampaignStatus::Sent, ScheduleStatus::Completed),
        };
        self.storage
            .update_campaign_status(campaign_id, status, schedule_status)
            .await?;

        info!(
            campaign_id,
            %delivery_status,
            sent = counts.sent,
            failed = counts.failed,
            skipped = counts.skipped,
            "dispatch finished"
        );

        let success = delivery_status != DeliveryStatus::Failed;
        let message = match delivery_status {
            DeliveryStatus::Sent => format!("campaign sent to {} recipients", counts.sent),
            DeliveryStatus::Partial => format!(
                "campaign partially sent: {} delivered, {} failed",
                counts.sent, counts.failed
            ),
            DeliveryStatus::Failed => "campaign delivery failed".to_string(),
        };

        Ok(DispatchReport {
            success,
            message,
            counts,
            results,
        })
    }
}

/// Whether the recipient carries the contact field this channel needs.
fn has_required_contact(channel: Channel, recipient: &Recipient) -> bool {
    match channel {
        Channel::Email => recipient
            .email
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty()),
        Channel::Sms | Channel::Whatsapp | Channel::Ai => recipient
            .phone
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty()),
    }
}
