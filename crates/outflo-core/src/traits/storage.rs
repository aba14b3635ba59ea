// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the lead, campaign, agent, and audit stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::OutfloError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AgentCallLog, AgentStatus, AiAgent, Campaign, CampaignLog, CampaignStatus, Channel,
    DeliveryStatus, Lead, LeadStatus, ScheduleStatus, SendOutcome,
};

/// Adapter for the persistence backend.
///
/// One trait covers all four stores (leads, campaigns, agents, audit logs):
/// they share a database and a single-writer connection, and the engines in
/// `outflo-ingest`, `outflo-dispatch`, and `outflo-agent` each hold one
/// `Arc<dyn StorageAdapter>`.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, PRAGMAs).
    async fn initialize(&self) -> Result<(), OutfloError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), OutfloError>;

    // --- Lead store ---

    async fn create_lead(&self, lead: &Lead) -> Result<(), OutfloError>;

    /// Advisory per-owner duplicate check: matches an existing lead whose
    /// non-empty email equals `email` OR whose non-empty phone equals
    /// `phone` (either match counts). The partial unique indexes remain the
    /// authoritative guard under concurrent ingestion.
    async fn find_duplicate(
        &self,
        owner_id: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Lead>, OutfloError>;

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, OutfloError>;

    async fn list_leads(&self, owner_id: &str) -> Result<Vec<Lead>, OutfloError>;

    async fn update_lead_status(&self, id: &str, status: LeadStatus) -> Result<(), OutfloError>;

    // --- Campaign store ---

    async fn create_campaign(&self, campaign: &Campaign) -> Result<(), OutfloError>;

    async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, OutfloError>;

    async fn set_campaign_schedule(
        &self,
        id: &str,
        when: DateTime<Utc>,
    ) -> Result<(), OutfloError>;

    async fn update_campaign_status(
        &self,
        id: &str,
        status: CampaignStatus,
        schedule_status: ScheduleStatus,
    ) -> Result<(), OutfloError>;

    async fn mark_campaign_started(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), OutfloError>;

    /// Replaces the campaign's recipient set wholesale
    /// (delete-all-then-reinsert in one transaction, never a merge).
    async fn replace_recipients(
        &self,
        campaign_id: &str,
        lead_ids: &[String],
    ) -> Result<(), OutfloError>;

    /// Resolves the campaign's recipient set in assignment order.
    async fn get_recipients(&self, campaign_id: &str) -> Result<Vec<Lead>, OutfloError>;

    // --- Agent store ---

    async fn create_agent(&self, agent: &AiAgent) -> Result<(), OutfloError>;

    async fn get_agent(&self, id: &str) -> Result<Option<AiAgent>, OutfloError>;

    async fn list_agents(&self, owner_id: &str) -> Result<Vec<AiAgent>, OutfloError>;

    async fn update_agent_status(
        &self,
        id: &str,
        status: AgentStatus,
    ) -> Result<(), OutfloError>;

    /// Moves the cursor and status together so the
    /// `current_index == len implies completed` invariant holds in storage.
    async fn update_agent_cursor(
        &self,
        id: &str,
        current_index: usize,
        status: AgentStatus,
    ) -> Result<(), OutfloError>;

    /// Removes the agent row. Call logs are retained: audit history
    /// survives agent deletion by contract.
    async fn delete_agent(&self, id: &str) -> Result<(), OutfloError>;

    // --- Audit store (append-only) ---

    async fn insert_campaign_log(
        &self,
        campaign_id: &str,
        total_recipients: i64,
        delivery_status: DeliveryStatus,
        message_type: Channel,
    ) -> Result<i64, OutfloError>;

    /// Campaign logs, newest first, optionally filtered to one campaign.
    async fn list_campaign_logs(
        &self,
        campaign_id: Option<&str>,
    ) -> Result<Vec<CampaignLog>, OutfloError>;

    async fn insert_call_log(
        &self,
        agent_id: &str,
        phone: &str,
        status: SendOutcome,
        script: &str,
    ) -> Result<i64, OutfloError>;

    /// Call logs for one agent, newest first.
    async fn list_call_logs(&self, agent_id: &str) -> Result<Vec<AgentCallLog>, OutfloError>;

    /// Call logs across all agents with an ID greater than `after`,
    /// ascending. Used by audit-log tailers.
    async fn list_call_logs_after(&self, after: i64) -> Result<Vec<AgentCallLog>, OutfloError>;
}
