// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit logs: campaign dispatch batches and agent call attempts.

use outflo_core::OutfloError;
use outflo_core::types::{AgentCallLog, CampaignLog, Channel, DeliveryStatus, SendOutcome};
use rusqlite::params;

use crate::database::Database;
use crate::queries::{parse_kind, parse_ts};

fn map_campaign_log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CampaignLog> {
    Ok(CampaignLog {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        total_recipients: row.get(2)?,
        delivery_status: parse_kind(3, row.get::<_, String>(3)?)?,
        message_type: parse_kind(4, row.get::<_, String>(4)?)?,
        created_at: parse_ts(5, row.get::<_, String>(5)?)?,
    })
}

fn map_call_log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentCallLog> {
    Ok(AgentCallLog {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        phone: row.get(2)?,
        status: parse_kind(3, row.get::<_, String>(3)?)?,
        script: row.get(4)?,
        created_at: parse_ts(5, row.get::<_, String>(5)?)?,
    })
}

/// Append one campaign dispatch audit row and return its ID.
pub async fn insert_campaign_log(
    db: &Database,
    campaign_id: &str,
    total_recipients: i64,
    delivery_status: DeliveryStatus,
    message_type: Channel,
) -> Result<i64, OutfloError> {
    let campaign_id = campaign_id.to_string();
    let delivery_status = delivery_status.to_string();
    let message_type = message_type.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO campaign_logs (campaign_id, total_recipients, delivery_status, message_type)
                 VALUES (?1, ?2, ?3, ?4)",
                params![campaign_id, total_recipients, delivery_status, message_type],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List campaign logs, newest first, optionally filtered to one campaign.
pub async fn list_campaign_logs(
    db: &Database,
    campaign_id: Option<&str>,
) -> Result<Vec<CampaignLog>, OutfloError> {
    let campaign_id = campaign_id.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, campaign_id, total_recipients, delivery_status, message_type, created_at
                 FROM campaign_logs
                 WHERE ?1 IS NULL OR campaign_id = ?1
                 ORDER BY id DESC",
            )?;
            let rows = stmt.query_map(params![campaign_id], map_campaign_log_row)?;
            let mut logs = Vec::new();
            for row in rows {
                logs.push(row?);
            }
            Ok(logs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append one agent call audit row and return its ID.
pub async fn insert_call_log(
    db: &Database,
    agent_id: &str,
    phone: &str,
    status: SendOutcome,
    script: &str,
) -> Result<i64, OutfloError> {
    let agent_id = agent_id.to_string();
    let phone = phone.to_string();
    let status = status.to_string();
    let script = script.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO agent_call_logs (agent_id, phone, status, script)
                 VALUES (?1, ?2, ?3, ?4)",
                params![agent_id, phone, status, script],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List one agent's call logs, newest first.
pub async fn list_call_logs(db: &Database, agent_id: &str) -> Result<Vec<AgentCallLog>, OutfloError> {
    let agent_id = agent_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, agent_id, phone, status, script, created_at
                 FROM agent_call_logs
                 WHERE agent_id = ?1
                 ORDER BY id DESC",
            )?;
            let rows = stmt.query_map(params![agent_id], map_call_log_row)?;
            let mut logs = Vec::new();
            for row in rows {
                logs.push(row?);
            }
            Ok(logs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Call logs across all agents newer than `after`, ascending. Tailer query.
pub async fn list_call_logs_after(
    db: &Database,
    after: i64,
) -> Result<Vec<AgentCallLog>, OutfloError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, agent_id, phone, status, script, created_at
                 FROM agent_call_logs
                 WHERE id > ?1
                 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![after], map_call_log_row)?;
            let mut logs = Vec::new();
            for row in rows {
                logs.push(row?);
            }
            Ok(logs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn campaign_log_roundtrips_with_generated_timestamp() {
        let (db, _dir) = setup_db().await;
        let id = insert_campaign_log(&db, "c1", 3, DeliveryStatus::Partial, Channel::Email)
            .await
            .unwrap();
        assert!(id > 0);

        let logs = list_campaign_logs(&db, Some("c1")).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].total_recipients, 3);
        assert_eq!(logs[0].delivery_status, DeliveryStatus::Partial);
        assert_eq!(logs[0].message_type, Channel::Email);
    }

    #[tokio::test]
    async fn campaign_logs_filter_and_order_newest_first() {
        let (db, _dir) = setup_db().await;
        insert_campaign_log(&db, "c1", 1, DeliveryStatus::Sent, Channel::Sms)
            .await
            .unwrap();
        insert_campaign_log(&db, "c2", 2, DeliveryStatus::Failed, Channel::Sms)
            .await
            .unwrap();
        insert_campaign_log(&db, "c1", 4, DeliveryStatus::Sent, Channel::Sms)
            .await
            .unwrap();

        let all = list_campaign_logs(&db, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].id > all[1].id && all[1].id > all[2].id);

        let only_c1 = list_campaign_logs(&db, Some("c1")).await.unwrap();
        assert_eq!(only_c1.len(), 2);
        assert_eq!(only_c1[0].total_recipients, 4);
    }

    #[tokio::test]
    async fn call_logs_survive_without_agent_row() {
        let (db, _dir) = setup_db().await;
        // No agents row exists for "a1"; the log table has no foreign key.
        insert_call_log(&db, "a1", "555-0001", SendOutcome::Delivered, "Hello")
            .await
            .unwrap();
        insert_call_log(&db, "a1", "555-0002", SendOutcome::Failed, "Hello")
            .await
            .unwrap();

        let logs = list_call_logs(&db, "a1").await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].phone, "555-0002");
        assert_eq!(logs[0].status, SendOutcome::Failed);
    }

    #[tokio::test]
    async fn call_log_tail_is_ascending_and_cross_agent() {
        let (db, _dir) = setup_db().await;
        let a = insert_call_log(&db, "a1", "555-0001", SendOutcome::Delivered, "s")
            .await
            .unwrap();
        let b = insert_call_log(&db, "a2", "555-0002", SendOutcome::Delivered, "s")
            .await
            .unwrap();

        let tail = list_call_logs_after(&db, 0).await.unwrap();
        assert_eq!(tail.iter().map(|l| l.id).collect::<Vec<_>>(), vec![a, b]);

        let tail = list_call_logs_after(&db, a).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].agent_id, "a2");
    }
}
