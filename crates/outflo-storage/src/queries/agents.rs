// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI agent store operations. The lead list persists as a JSON array column.

use outflo_core::OutfloError;
use outflo_core::types::{AgentStatus, AiAgent};
use rusqlite::params;

use crate::database::Database;
use crate::queries::{parse_kind, parse_ts, to_ts};

fn map_agent_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AiAgent> {
    let lead_list: String = row.get(6)?;
    let lead_list: Vec<String> = serde_json::from_str(&lead_list).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(AiAgent {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_kind(3, row.get::<_, String>(3)?)?,
        business_type: row.get(4)?,
        voice_style: row.get(5)?,
        lead_list,
        current_index: row.get::<_, i64>(7)? as usize,
        created_at: parse_ts(8, row.get::<_, String>(8)?)?,
    })
}

const AGENT_COLUMNS: &str =
    "id, owner_id, name, status, business_type, voice_style, lead_list, current_index, created_at";

/// Insert a new agent.
pub async fn create_agent(db: &Database, agent: &AiAgent) -> Result<(), OutfloError> {
    let a = agent.clone();
    let lead_list = serde_json::to_string(&a.lead_list)
        .map_err(|e| OutfloError::Internal(format!("lead list serialization: {e}")))?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO agents (id, owner_id, name, status, business_type, voice_style,
                     lead_list, current_index, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    a.id,
                    a.owner_id,
                    a.name,
                    a.status.to_string(),
                    a.business_type,
                    a.voice_style,
                    lead_list,
                    a.current_index as i64,
                    to_ts(&a.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_write_err)
}

/// Get an agent by ID.
pub async fn get_agent(db: &Database, id: &str) -> Result<Option<AiAgent>, OutfloError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], map_agent_row);
            match result {
                Ok(agent) => Ok(Some(agent)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all agents for one owner, newest first.
pub async fn list_agents(db: &Database, owner_id: &str) -> Result<Vec<AiAgent>, OutfloError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {AGENT_COLUMNS} FROM agents
                 WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], map_agent_row)?;
            let mut agents = Vec::new();
            for row in rows {
                agents.push(row?);
            }
            Ok(agents)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update just the agent's lifecycle status.
pub async fn update_agent_status(
    db: &Database,
    id: &str,
    status: AgentStatus,
) -> Result<(), OutfloError> {
    let id = id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE agents SET status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update the agent's call cursor and status in one write, so a crash
/// between the two can never be observed.
pub async fn update_agent_cursor(
    db: &Database,
    id: &str,
    current_index: usize,
    status: AgentStatus,
) -> Result<(), OutfloError> {
    let id = id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE agents SET current_index = ?1, status = ?2 WHERE id = ?3",
                params![current_index as i64, status, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete an agent. Call logs are intentionally left behind.
pub async fn delete_agent(db: &Database, id: &str) -> Result<(), OutfloError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM agents WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_agent(id: &str, leads: &[&str]) -> AiAgent {
        AiAgent {
            id: id.to_string(),
            owner_id: "o1".to_string(),
            name: "caller".to_string(),
            status: AgentStatus::Pending,
            business_type: "plumbing".to_string(),
            voice_style: "friendly".to_string(),
            lead_list: leads.iter().map(|s| s.to_string()).collect(),
            current_index: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_get_agent_roundtrips_lead_list() {
        let (db, _dir) = setup_db().await;
        create_agent(&db, &make_agent("a1", &["555-0001", "555-0002"]))
            .await
            .unwrap();

        let got = get_agent(&db, "a1").await.unwrap().unwrap();
        assert_eq!(got.lead_list, vec!["555-0001", "555-0002"]);
        assert_eq!(got.current_index, 0);
        assert_eq!(got.status, AgentStatus::Pending);
    }

    #[tokio::test]
    async fn cursor_and_status_update_together() {
        let (db, _dir) = setup_db().await;
        create_agent(&db, &make_agent("a1", &["555-0001", "555-0002"]))
            .await
            .unwrap();

        update_agent_cursor(&db, "a1", 2, AgentStatus::Completed).await.unwrap();
        let got = get_agent(&db, "a1").await.unwrap().unwrap();
        assert_eq!(got.current_index, 2);
        assert_eq!(got.status, AgentStatus::Completed);
        assert!(got.is_exhausted());
    }

    #[tokio::test]
    async fn delete_agent_removes_row() {
        let (db, _dir) = setup_db().await;
        create_agent(&db, &make_agent("a1", &[])).await.unwrap();
        delete_agent(&db, "a1").await.unwrap();
        assert!(get_agent(&db, "a1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_agents_is_scoped_per_owner() {
        let (db, _dir) = setup_db().await;
        create_agent(&db, &make_agent("a1", &[])).await.unwrap();
        let mut other = make_agent("a2", &[]);
        other.owner_id = "o2".to_string();
        create_agent(&db, &other).await.unwrap();

        let listed = list_agents(&db, "o1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a1");
    }
}
