// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI agent lifecycle controller.
//!
//! Owns the per-agent cursor over an ordered lead list. Every control
//! operation is idempotent with respect to being called twice in the same
//! logical state: pausing an inactive agent is a no-op, not an error.

use std::sync::Arc;

use outflo_core::OutfloError;
use outflo_core::traits::StorageAdapter;
use outflo_core::types::{AgentStatus, AiAgent, SendOutcome};
use tracing::{debug, info};

/// Controls agent status transitions and call-by-call progression.
#[derive(Clone)]
pub struct AgentController {
    storage: Arc<dyn StorageAdapter>,
}

impl AgentController {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    async fn load(&self, agent_id: &str) -> Result<AiAgent, OutfloError> {
        self.storage
            .get_agent(agent_id)
            .await?
            .ok_or_else(|| OutfloError::Validation(format!("agent {agent_id} not found")))
    }

    /// Move a pending or paused agent to `running`. Idempotent when already
    /// running; a completed agent must be reset first.
    pub async fn start(&self, agent_id: &str) -> Result<(), OutfloError> {
        let agent = self.load(agent_id).await?;
        match agent.status {
            AgentStatus::Running => Ok(()),
            AgentStatus::Completed => Err(OutfloError::Precondition(format!(
                "agent {agent_id} is completed, reset it to start again"
            ))),
            AgentStatus::Pending | AgentStatus::Inactive => {
                self.storage
                    .update_agent_status(agent_id, AgentStatus::Running)
                    .await?;
                info!(agent_id, "agent started");
                Ok(())
            }
        }
    }

    /// `running -> inactive`. No-op in every other state.
    pub async fn pause(&self, agent_id: &str) -> Result<(), OutfloError> {
        let agent = self.load(agent_id).await?;
        if agent.status == AgentStatus::Running {
            self.storage
                .update_agent_status(agent_id, AgentStatus::Inactive)
                .await?;
            info!(agent_id, "agent paused");
        }
        Ok(())
    }

    /// `inactive -> running`. No-op in every other state.
    pub async fn resume(&self, agent_id: &str) -> Result<(), OutfloError> {
        let agent = self.load(agent_id).await?;
        if agent.status == AgentStatus::Inactive {
            self.storage
                .update_agent_status(agent_id, AgentStatus::Running)
                .await?;
            info!(agent_id, "agent resumed");
        }
        Ok(())
    }

    /// Rewind the cursor to zero and the status to `pending`, from any
    /// state including `completed`. Destructive by contract.
    pub async fn reset(&self, agent_id: &str) -> Result<(), OutfloError> {
        self.load(agent_id).await?;
        self.storage
            .update_agent_cursor(agent_id, 0, AgentStatus::Pending)
            .await?;
        info!(agent_id, "agent reset");
        Ok(())
    }

    /// Record one call attempt and move the cursor forward.
    ///
    /// Writes one call log regardless of the call's outcome, then advances.
    /// Reaching the end of the lead list transitions to `completed`. Called
    /// on an already-exhausted agent it is a no-op: no log, no cursor move.
    /// Returns whether the cursor moved.
    pub async fn advance(
        &self,
        agent_id: &str,
        outcome: SendOutcome,
        script: &str,
    ) -> Result<bool, OutfloError> {
        let agent = self.load(agent_id).await?;
        if agent.is_exhausted() {
            debug!(agent_id, "advance past end ignored");
            return Ok(false);
        }

        let phone = agent.lead_list[agent.current_index].clone();
        self.storage
            .insert_call_log(agent_id, &phone, outcome, script)
            .await?;

        let next = agent.current_index + 1;
        let status = if next >= agent.lead_list.len() {
            AgentStatus::Completed
        } else {
            AgentStatus::Running
        };
        self.storage
            .update_agent_cursor(agent_id, next, status)
            .await?;
        debug!(agent_id, index = next, %status, %outcome, "agent advanced");
        Ok(true)
    }

    /// Remove the agent. Call logs are retained by contract; deleting an
    /// agent that is already gone is a no-op, like the other control ops.
    pub async fn delete(&self, agent_id: &str) -> Result<(), OutfloError> {
        if self.storage.get_agent(agent_id).await?.is_none() {
            debug!(agent_id, "delete of missing agent ignored");
            return Ok(());
        }
        self.storage.delete_agent(agent_id).await?;
        info!(agent_id, "agent deleted");
        Ok(())
    }

    /// `(current_index, total_leads)`, with the total recomputed from
    /// non-blank entries on every call.
    pub fn progress(agent: &AiAgent) -> (usize, usize) {
        (agent.current_index, agent.total_leads())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use outflo_test_utils::TempStorage;

    async fn setup(leads: &[&str]) -> (TempStorage, AgentController) {
        let temp = TempStorage::new().await;
        let storage = temp.storage();
        storage
            .create_agent(&AiAgent {
                id: "a1".to_string(),
                owner_id: "o1".to_string(),
                name: "Robin".to_string(),
                status: AgentStatus::Pending,
                business_type: "plumbing".to_string(),
                voice_style: "friendly".to_string(),
                lead_list: leads.iter().map(|s| s.to_string()).collect(),
                current_index: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let controller = AgentController::new(temp.storage());
        (temp, controller)
    }

    #[tokio::test]
    async fn advance_to_completion_and_beyond() {
        let (temp, controller) = setup(&["555-0001", "555-0002"]).await;
        let storage = temp.storage();

        assert!(controller.advance("a1", SendOutcome::Delivered, "hi").await.unwrap());
        let agent = storage.get_agent("a1").await.unwrap().unwrap();
        assert_eq!(agent.current_index, 1);
        assert_eq!(agent.status, AgentStatus::Running);

        assert!(controller.advance("a1", SendOutcome::Failed, "hi").await.unwrap());
        let agent = storage.get_agent("a1").await.unwrap().unwrap();
        assert_eq!(agent.current_index, 2);
        assert_eq!(agent.status, AgentStatus::Completed);

        // Past the end: no cursor move, no new log.
        assert!(!controller.advance("a1", SendOutcome::Delivered, "hi").await.unwrap());
        let agent = storage.get_agent("a1").await.unwrap().unwrap();
        assert_eq!(agent.current_index, 2);
        assert_eq!(storage.list_call_logs("a1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn every_advance_writes_a_log_regardless_of_outcome() {
        let (temp, controller) = setup(&["555-0001", "555-0002"]).await;
        controller.advance("a1", SendOutcome::Failed, "s1").await.unwrap();
        controller.advance("a1", SendOutcome::Skipped, "s2").await.unwrap();

        let logs = temp.storage().list_call_logs("a1").await.unwrap();
        assert_eq!(logs.len(), 2);
        // Newest first.
        assert_eq!(logs[0].phone, "555-0002");
        assert_eq!(logs[0].status, SendOutcome::Skipped);
        assert_eq!(logs[1].status, SendOutcome::Failed);
    }

    #[tokio::test]
    async fn reset_discards_progress_from_any_state() {
        let (temp, controller) = setup(&["555-0001"]).await;
        controller.advance("a1", SendOutcome::Delivered, "hi").await.unwrap();

        let agent = temp.storage().get_agent("a1").await.unwrap().unwrap();
        assert_eq!(agent.status, AgentStatus::Completed);

        controller.reset("a1").await.unwrap();
        let agent = temp.storage().get_agent("a1").await.unwrap().unwrap();
        assert_eq!(agent.current_index, 0);
        assert_eq!(agent.status, AgentStatus::Pending);
    }

    #[tokio::test]
    async fn start_is_idempotent_and_rejects_completed() {
        let (temp, controller) = setup(&["555-0001"]).await;
        controller.start("a1").await.unwrap();
        controller.start("a1").await.unwrap();
        assert_eq!(
            temp.storage().get_agent("a1").await.unwrap().unwrap().status,
            AgentStatus::Running
        );

        controller.advance("a1", SendOutcome::Delivered, "hi").await.unwrap();
        let err = controller.start("a1").await.unwrap_err();
        assert!(matches!(err, OutfloError::Precondition(_)));
    }

    #[tokio::test]
    async fn pause_and_resume_are_state_toggles() {
        let (temp, controller) = setup(&["555-0001"]).await;

        // Pausing a pending agent is a no-op.
        controller.pause("a1").await.unwrap();
        assert_eq!(
            temp.storage().get_agent("a1").await.unwrap().unwrap().status,
            AgentStatus::Pending
        );

        controller.start("a1").await.unwrap();
        controller.pause("a1").await.unwrap();
        controller.pause("a1").await.unwrap();
        assert_eq!(
            temp.storage().get_agent("a1").await.unwrap().unwrap().status,
            AgentStatus::Inactive
        );

        controller.resume("a1").await.unwrap();
        controller.resume("a1").await.unwrap();
        assert_eq!(
            temp.storage().get_agent("a1").await.unwrap().unwrap().status,
            AgentStatus::Running
        );
    }

    #[tokio::test]
    async fn delete_keeps_call_logs() {
        let (temp, controller) = setup(&["555-0001"]).await;
        controller.advance("a1", SendOutcome::Delivered, "hi").await.unwrap();
        controller.delete("a1").await.unwrap();

        let storage = temp.storage();
        assert!(storage.get_agent("a1").await.unwrap().is_none());
        assert_eq!(storage.list_call_logs("a1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_temp, controller) = setup(&["555-0001"]).await;
        controller.delete("a1").await.unwrap();
        controller.delete("a1").await.unwrap();
        controller.delete("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn progress_recounts_blank_entries() {
        let (temp, _controller) = setup(&["555-0001", "", "555-0002"]).await;
        let agent = temp.storage().get_agent("a1").await.unwrap().unwrap();
        assert_eq!(AgentController::progress(&agent), (0, 2));
    }
}
