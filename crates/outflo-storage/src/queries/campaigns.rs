// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign store operations, including wholesale recipient replacement.

use chrono::{DateTime, Utc};
use outflo_core::OutfloError;
use outflo_core::types::{Campaign, CampaignStatus, Lead, ScheduleStatus};
use rusqlite::params;

use crate::database::Database;
use crate::queries::{parse_kind, parse_ts, to_ts};

fn map_campaign_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        channel: parse_kind(4, row.get::<_, String>(4)?)?,
        content_ref: row.get(5)?,
        status: parse_kind(6, row.get::<_, String>(6)?)?,
        schedule_status: parse_kind(7, row.get::<_, String>(7)?)?,
        scheduled_at: row
            .get::<_, Option<String>>(8)?
            .map(|s| parse_ts(8, s))
            .transpose()?,
        started_at: row
            .get::<_, Option<String>>(9)?
            .map(|s| parse_ts(9, s))
            .transpose()?,
        created_at: parse_ts(10, row.get::<_, String>(10)?)?,
    })
}

const CAMPAIGN_COLUMNS: &str = "id, owner_id, title, description, channel, content_ref, \
     status, schedule_status, scheduled_at, started_at, created_at";

/// Insert a new campaign.
pub async fn create_campaign(db: &Database, campaign: &Campaign) -> Result<(), OutfloError> {
    let c = campaign.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO campaigns (id, owner_id, title, description, channel, content_ref,
                     status, schedule_status, scheduled_at, started_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    c.id,
                    c.owner_id,
                    c.title,
                    c.description,
                    c.channel.to_string(),
                    c.content_ref,
                    c.status.to_string(),
                    c.schedule_status.to_string(),
                    c.scheduled_at.as_ref().map(to_ts),
                    c.started_at.as_ref().map(to_ts),
                    to_ts(&c.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_write_err)
}

/// Get a campaign by ID.
pub async fn get_campaign(db: &Database, id: &str) -> Result<Option<Campaign>, OutfloError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], map_campaign_row);
            match result {
                Ok(campaign) => Ok(Some(campaign)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a schedule: `scheduled_at` plus the scheduled status pair.
pub async fn set_campaign_schedule(
    db: &Database,
    id: &str,
    when: DateTime<Utc>,
) -> Result<(), OutfloError> {
    let id = id.to_string();
    let when = to_ts(&when);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE campaigns
                 SET scheduled_at = ?1, status = 'scheduled', schedule_status = 'scheduled'
                 WHERE id = ?2",
                params![when, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update both lifecycle status columns together.
pub async fn update_campaign_status(
    db: &Database,
    id: &str,
    status: CampaignStatus,
    schedule_status: ScheduleStatus,
) -> Result<(), OutfloError> {
    let id = id.to_string();
    let status = status.to_string();
    let schedule_status = schedule_status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE campaigns SET status = ?1, schedule_status = ?2 WHERE id = ?3",
                params![status, schedule_status, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag a campaign as running with its start time recorded.
pub async fn mark_campaign_started(
    db: &Database,
    id: &str,
    at: DateTime<Utc>,
) -> Result<(), OutfloError> {
    let id = id.to_string();
    let at = to_ts(&at);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE campaigns
                 SET status = 'running', schedule_status = 'active', started_at = ?1
                 WHERE id = ?2",
                params![at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace the campaign's recipient set wholesale.
///
/// Delete-all-then-reinsert inside one transaction: assignment is
/// atomic-by-replacement, never a merge.
pub async fn replace_recipients(
    db: &Database,
    campaign_id: &str,
    lead_ids: &[String],
) -> Result<(), OutfloError> {
    let campaign_id = campaign_id.to_string();
    let lead_ids = lead_ids.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM campaign_recipients WHERE campaign_id = ?1",
                params![campaign_id],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO campaign_recipients (campaign_id, lead_id, position)
                     VALUES (?1, ?2, ?3)",
                )?;
                for (position, lead_id) in lead_ids.iter().enumerate() {
                    stmt.execute(params![campaign_id, lead_id, position as i64])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_write_err)
}

/// Resolve the campaign's recipients in assignment order.
pub async fn get_recipients(db: &Database, campaign_id: &str) -> Result<Vec<Lead>, OutfloError> {
    let campaign_id = campaign_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.owner_id, l.name, l.email, l.phone, l.source, l.status, l.created_at
                 FROM campaign_recipients cr
                 JOIN leads l ON l.id = cr.lead_id
                 WHERE cr.campaign_id = ?1
                 ORDER BY cr.position ASC",
            )?;
            let rows = stmt.query_map(params![campaign_id], crate::queries::leads::map_lead_row)?;
            let mut leads = Vec::new();
            for row in rows {
                leads.push(row?);
            }
            Ok(leads)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use outflo_core::types::{Channel, LeadStatus};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_campaign(id: &str, channel: Channel) -> Campaign {
        Campaign {
            id: id.to_string(),
            owner_id: "o1".to_string(),
            title: "spring launch".to_string(),
            description: None,
            channel,
            content_ref: Some("tpl-1".to_string()),
            status: CampaignStatus::Draft,
            schedule_status: ScheduleStatus::Draft,
            scheduled_at: None,
            started_at: None,
            created_at: Utc::now(),
        }
    }

    async fn insert_lead(db: &Database, id: &str) {
        crate::queries::leads::create_lead(
            db,
            &outflo_core::types::Lead {
                id: id.to_string(),
                owner_id: "o1".to_string(),
                name: format!("lead {id}"),
                email: Some(format!("{id}@x.com")),
                phone: None,
                source: None,
                status: LeadStatus::New,
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn create_and_get_campaign_roundtrips() {
        let (db, _dir) = setup_db().await;
        create_campaign(&db, &make_campaign("c1", Channel::Email)).await.unwrap();

        let got = get_campaign(&db, "c1").await.unwrap().unwrap();
        assert_eq!(got.channel, Channel::Email);
        assert_eq!(got.status, CampaignStatus::Draft);
        assert!(got.scheduled_at.is_none());
    }

    #[tokio::test]
    async fn schedule_updates_status_pair() {
        let (db, _dir) = setup_db().await;
        create_campaign(&db, &make_campaign("c1", Channel::Sms)).await.unwrap();
        let when = Utc::now();
        set_campaign_schedule(&db, "c1", when).await.unwrap();

        let got = get_campaign(&db, "c1").await.unwrap().unwrap();
        assert_eq!(got.status, CampaignStatus::Scheduled);
        assert_eq!(got.schedule_status, ScheduleStatus::Scheduled);
        assert!(got.scheduled_at.is_some());
    }

    #[tokio::test]
    async fn replace_recipients_is_wholesale() {
        let (db, _dir) = setup_db().await;
        create_campaign(&db, &make_campaign("c1", Channel::Email)).await.unwrap();
        for id in ["l1", "l2", "l3"] {
            insert_lead(&db, id).await;
        }

        replace_recipients(&db, "c1", &["l1".into(), "l2".into()]).await.unwrap();
        let first: Vec<String> = get_recipients(&db, "c1")
            .await
            .unwrap()
            .iter()
            .map(|l| l.id.clone())
            .collect();
        assert_eq!(first, vec!["l1", "l2"]);

        // Second assignment replaces, not merges.
        replace_recipients(&db, "c1", &["l3".into()]).await.unwrap();
        let second: Vec<String> = get_recipients(&db, "c1")
            .await
            .unwrap()
            .iter()
            .map(|l| l.id.clone())
            .collect();
        assert_eq!(second, vec!["l3"]);
    }

    #[tokio::test]
    async fn recipients_preserve_assignment_order() {
        let (db, _dir) = setup_db().await;
        create_campaign(&db, &make_campaign("c1", Channel::Email)).await.unwrap();
        for id in ["l1", "l2", "l3"] {
            insert_lead(&db, id).await;
        }

        replace_recipients(&db, "c1", &["l3".into(), "l1".into(), "l2".into()])
            .await
            .unwrap();
        let order: Vec<String> = get_recipients(&db, "c1")
            .await
            .unwrap()
            .iter()
            .map(|l| l.id.clone())
            .collect();
        assert_eq!(order, vec!["l3", "l1", "l2"]);
    }

    #[tokio::test]
    async fn mark_started_records_timestamp() {
        let (db, _dir) = setup_db().await;
        create_campaign(&db, &make_campaign("c1", Channel::Ai)).await.unwrap();
        mark_campaign_started(&db, "c1", Utc::now()).await.unwrap();

        let got = get_campaign(&db, "c1").await.unwrap().unwrap();
        assert_eq!(got.status, CampaignStatus::Running);
        assert_eq!(got.schedule_status, ScheduleStatus::Active);
        assert!(got.started_at.is_some());
    }
}
