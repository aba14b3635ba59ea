// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use outflo_core::OutfloError;
use outflo_core::traits::{PluginAdapter, StorageAdapter};
use outflo_core::types::{
    AdapterType, AgentCallLog, AgentStatus, AiAgent, Campaign, CampaignLog, CampaignStatus,
    Channel, DeliveryStatus, HealthStatus, Lead, LeadStatus, ScheduleStatus, SendOutcome,
};
use outflo_config::model::StorageConfig;
use tokio::sync::OnceCell;
use tracing::info;

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The connection opens lazily on [`StorageAdapter::initialize`]; every store
/// method before that fails with a precondition error rather than panicking.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, OutfloError> {
        self.db
            .get()
            .ok_or_else(|| OutfloError::Precondition("storage not initialized".to_string()))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, OutfloError> {
        let db = match self.db.get() {
            Some(db) => db,
            None => return Ok(HealthStatus::Unhealthy("not initialized".to_string())),
        };
        let probe = db
            .connection()
            .call(|conn| {
                let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
                Ok::<_, rusqlite::Error>(one)
            })
            .await;
        match probe {
            Ok(1) => Ok(HealthStatus::Healthy),
            Ok(n) => Ok(HealthStatus::Degraded(format!("probe returned {n}"))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), OutfloError> {
        self.close().await
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), OutfloError> {
        self.db
            .get_or_try_init(|| async {
                let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
                info!(path = %self.config.database_path, "sqlite storage initialized");
                Ok::<_, OutfloError>(db)
            })
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), OutfloError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }

    async fn create_lead(&self, lead: &Lead) -> Result<(), OutfloError> {
        queries::leads::create_lead(self.db()?, lead).await
    }

    async fn find_duplicate(
        &self,
        owner_id: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<Lead>, OutfloError> {
        queries::leads::find_duplicate(self.db()?, owner_id, email, phone).await
    }

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>, OutfloError> {
        queries::leads::get_lead(self.db()?, id).await
    }

    async fn list_leads(&self, owner_id: &str) -> Result<Vec<Lead>, OutfloError> {
        queries::leads::list_leads(self.db()?, owner_id).await
    }

    async fn update_lead_status(&self, id: &str, status: LeadStatus) -> Result<(), OutfloError> {
        queries::leads::update_lead_status(self.db()?, id, status).await
    }

    async fn create_campaign(&self, campaign: &Campaign) -> Result<(), OutfloError> {
        queries::campaigns::create_campaign(self.db()?, campaign).await
    }

    async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, OutfloError> {
        queries::campaigns::get_campaign(self.db()?, id).await
    }

    async fn set_campaign_schedule(
        &self,
        id: &str,
        when: DateTime<Utc>,
    ) -> Result<(), OutfloError> {
        queries::campaigns::set_campaign_schedule(self.db()?, id, when).await
    }

    async fn update_campaign_status(
        &self,
        id: &str,
        status: CampaignStatus,
        schedule_status: ScheduleStatus,
    ) -> Result<(), OutfloError> {
        queries::campaigns::update_campaign_status(self.db()?, id, status, schedule_status).await
    }

    async fn mark_campaign_started(
        &self,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), OutfloError> {
        queries::campaigns::mark_campaign_started(self.db()?, id, at).await
    }

    async fn replace_recipients(
        &self,
        campaign_id: &str,
        lead_ids: &[String],
    ) -> Result<(), OutfloError> {
        queries::campaigns::replace_recipients(self.db()?, campaign_id, lead_ids).await
    }

    async fn get_recipients(&self, campaign_id: &str) -> Result<Vec<Lead>, OutfloError> {
        queries::campaigns::get_recipients(self.db()?, campaign_id).await
    }

    async fn create_agent(&self, agent: &AiAgent) -> Result<(), OutfloError> {
        queries::agents::create_agent(self.db()?, agent).await
    }

    async fn get_agent(&self, id: &str) -> Result<Option<AiAgent>, OutfloError> {
        queries::agents::get_agent(self.db()?, id).await
    }

    async fn list_agents(&self, owner_id: &str) -> Result<Vec<AiAgent>, OutfloError> {
        queries::agents::list_agents(self.db()?, owner_id).await
    }

    async fn update_agent_status(
        &self,
        id: &str,
        status: AgentStatus,
    ) -> Result<(), OutfloError> {
        queries::agents::update_agent_status(self.db()?, id, status).await
    }

    async fn update_agent_cursor(
        &self,
        id: &str,
        current_index: usize,
        status: AgentStatus,
    ) -> Result<(), OutfloError> {
        queries::agents::update_agent_cursor(self.db()?, id, current_index, status).await
    }

    async fn delete_agent(&self, id: &str) -> Result<(), OutfloError> {
        queries::agents::delete_agent(self.db()?, id).await
    }

    async fn insert_campaign_log(
        &self,
        campaign_id: &str,
        total_recipients: i64,
        delivery_status: DeliveryStatus,
        message_type: Channel,
    ) -> Result<i64, OutfloError> {
        queries::logs::insert_campaign_log(
            self.db()?,
            campaign_id,
            total_recipients,
            delivery_status,
            message_type,
        )
        .await
    }

    async fn list_campaign_logs(
        &self,
        campaign_id: Option<&str>,
    ) -> Result<Vec<CampaignLog>, OutfloError> {
        queries::logs::list_campaign_logs(self.db()?, campaign_id).await
    }

    async fn insert_call_log(
        &self,
        agent_id: &str,
        phone: &str,
        status: SendOutcome,
        script: &str,
    ) -> Result<i64, OutfloError> {
        queries::logs::insert_call_log(self.db()?, agent_id, phone, status, script).await
    }

    async fn list_call_logs(&self, agent_id: &str) -> Result<Vec<AgentCallLog>, OutfloError> {
        queries::logs::list_call_logs(self.db()?, agent_id).await
    }

    async fn list_call_logs_after(&self, after: i64) -> Result<Vec<AgentCallLog>, OutfloError> {
        queries::logs::list_call_logs_after(self.db()?, after).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn storage_at(dir: &tempfile::TempDir) -> SqliteStorage {
        SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("adapter.db").to_string_lossy().into_owned(),
            wal_mode: true,
        })
    }

    #[tokio::test]
    async fn uninitialized_storage_fails_with_precondition() {
        let dir = tempdir().unwrap();
        let storage = storage_at(&dir);
        let err = storage.get_lead("l1").await.unwrap_err();
        assert!(matches!(err, OutfloError::Precondition(_)));
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = storage_at(&dir);
        storage.initialize().await.unwrap();
        storage.initialize().await.unwrap();
        assert!(storage.get_lead("missing").await.unwrap().is_none());
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn health_check_reports_lifecycle() {
        let dir = tempdir().unwrap();
        let storage = storage_at(&dir);
        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
