// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Outflo workspace.
//!
//! Status enums serialize as lowercase strings both in JSON payloads and in
//! the SQLite TEXT columns that persist them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Outbound channel a campaign dispatches through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
    Ai,
}

/// Identifies the type of adapter in the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Lifecycle status of a lead. Ingestion only ever writes `new`; downstream
/// workflows move leads forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Valid,
    Assigned,
    Contacted,
    Converted,
}

/// A persisted contact owned by a client.
///
/// Uniqueness invariant: no two leads owned by the same owner share the same
/// non-empty email or the same non-empty phone. Enforced by partial unique
/// indexes in storage; see `outflo-storage/migrations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

/// Forward-only lifecycle status of a campaign:
/// draft -> scheduled -> running -> sent | failed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Running,
    Sent,
    Failed,
}

/// Schedule-facing status, tracked alongside [`CampaignStatus`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Draft,
    Scheduled,
    Active,
    Completed,
    Failed,
}

/// A persisted outbound campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub channel: Channel,
    /// Reference to the campaign's content (template id, script id, ...).
    pub content_ref: Option<String>,
    pub status: CampaignStatus,
    pub schedule_status: ScheduleStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Content handed to a channel adapter for one send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
}

/// The dispatch view of a lead: just what an adapter needs to reach it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub lead_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&Lead> for Recipient {
    fn from(lead: &Lead) -> Self {
        Self {
            lead_id: lead.id.clone(),
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
        }
    }
}

/// Result reported by a channel adapter for one send attempt.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub delivered: bool,
    pub error_code: Option<String>,
}

/// Outcome recorded for one recipient within a dispatch invocation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SendOutcome {
    Delivered,
    Failed,
    Skipped,
}

/// Per-recipient send record. Transient: aggregated into one [`CampaignLog`]
/// per dispatch invocation, returned to the caller, never persisted row-wise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub campaign_id: String,
    pub recipient_id: String,
    pub channel: Channel,
    pub outcome: SendOutcome,
    #[serde(default)]
    pub error: Option<String>,
}

/// Aggregate delivery status of one dispatch invocation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Partial,
}

/// Audit record for one send batch. Exactly one row per dispatch invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignLog {
    pub id: i64,
    pub campaign_id: String,
    pub total_recipients: i64,
    pub delivery_status: DeliveryStatus,
    pub message_type: Channel,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle status of an AI voice agent:
/// pending -> running <-> inactive -> completed, with reset back to pending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Pending,
    Running,
    Inactive,
    Completed,
}

/// An AI voice agent with a cursor over an ordered lead list.
///
/// Invariant: `current_index <= lead_list.len()`, and
/// `current_index == lead_list.len()` implies `status == completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAgent {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub status: AgentStatus,
    pub business_type: String,
    pub voice_style: String,
    /// Ordered phone numbers to call. Persisted as a JSON array column.
    pub lead_list: Vec<String>,
    pub current_index: usize,
    pub created_at: DateTime<Utc>,
}

impl AiAgent {
    /// Count of callable (non-blank) entries in the lead list.
    ///
    /// Recomputed on every call: the list can be edited between reads, so
    /// the total is never cached.
    pub fn total_leads(&self) -> usize {
        self.lead_list.iter().filter(|p| !p.trim().is_empty()).count()
    }

    /// True once the cursor has passed the last entry.
    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.lead_list.len()
    }
}

/// Audit record for one agent call attempt. Append-only; retained after the
/// owning agent is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCallLog {
    pub id: i64,
    pub agent_id: String,
    pub phone: String,
    pub status: SendOutcome,
    pub script: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn channel_display_and_parse_round_trip() {
        for channel in [Channel::Email, Channel::Sms, Channel::Whatsapp, Channel::Ai] {
            let s = channel.to_string();
            assert_eq!(Channel::from_str(&s).unwrap(), channel);
        }
        assert_eq!(Channel::Whatsapp.to_string(), "whatsapp");
    }

    #[test]
    fn status_enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&CampaignStatus::Scheduled).unwrap(),
            "\"scheduled\""
        );
        assert_eq!(
            serde_json::to_string(&DeliveryStatus::Partial).unwrap(),
            "\"partial\""
        );
        assert_eq!(
            serde_json::to_string(&AgentStatus::Inactive).unwrap(),
            "\"inactive\""
        );
    }

    #[test]
    fn total_leads_counts_non_blank_entries() {
        let agent = AiAgent {
            id: "a1".into(),
            owner_id: "o1".into(),
            name: "caller".into(),
            status: AgentStatus::Pending,
            business_type: "retail".into(),
            voice_style: "neutral".into(),
            lead_list: vec!["555-0001".into(), "  ".into(), "555-0002".into(), "".into()],
            current_index: 0,
            created_at: Utc::now(),
        };
        assert_eq!(agent.total_leads(), 2);
        assert!(!agent.is_exhausted());
    }

    #[test]
    fn recipient_from_lead_carries_contact_fields() {
        let lead = Lead {
            id: "l1".into(),
            owner_id: "o1".into(),
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            phone: None,
            source: None,
            status: LeadStatus::New,
            created_at: Utc::now(),
        };
        let recipient = Recipient::from(&lead);
        assert_eq!(recipient.lead_id, "l1");
        assert_eq!(recipient.email.as_deref(), Some("ada@example.com"));
        assert!(recipient.phone.is_none());
    }
}
