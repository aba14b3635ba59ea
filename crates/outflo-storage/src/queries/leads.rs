// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead store CRUD operations.

use outflo_core::OutfloError;
use outflo_core::types::{Lead, LeadStatus};
use rusqlite::params;

use crate::database::Database;
use crate::queries::{none_if_blank, parse_kind, parse_ts, to_ts};

pub(crate) fn map_lead_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        source: row.get(5)?,
        status: parse_kind(6, row.get::<_, String>(6)?)?,
        created_at: parse_ts(7, row.get::<_, String>(7)?)?,
    })
}

const LEAD_COLUMNS: &str = "id, owner_id, name, email, phone, source, status, created_at";

/// Insert a new lead. A unique-index hit surfaces as `OutfloError::Conflict`.
pub async fn create_lead(db: &Database, lead: &Lead) -> Result<(), OutfloError> {
    let lead = lead.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO leads (id, owner_id, name, email, phone, source, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    lead.id,
                    lead.owner_id,
                    lead.name,
                    none_if_blank(lead.email),
                    none_if_blank(lead.phone),
                    lead.source,
                    lead.status.to_string(),
                    to_ts(&lead.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_write_err)
}

/// Advisory duplicate check: an existing lead for `owner_id` matching the
/// candidate's non-empty email OR non-empty phone (either match counts).
pub async fn find_duplicate(
    db: &Database,
    owner_id: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<Lead>, OutfloError> {
    let owner_id = owner_id.to_string();
    let email = none_if_blank(email.map(str::to_string));
    let phone = none_if_blank(phone.map(str::to_string));
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LEAD_COLUMNS} FROM leads
                 WHERE owner_id = ?1
                   AND ((?2 IS NOT NULL AND email = ?2) OR (?3 IS NOT NULL AND phone = ?3))
                 LIMIT 1"
            ))?;
            let result = stmt.query_row(params![owner_id, email, phone], map_lead_row);
            match result {
                Ok(lead) => Ok(Some(lead)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a lead by ID.
pub async fn get_lead(db: &Database, id: &str) -> Result<Option<Lead>, OutfloError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], map_lead_row);
            match result {
                Ok(lead) => Ok(Some(lead)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all leads for one owner, newest first.
pub async fn list_leads(db: &Database, owner_id: &str) -> Result<Vec<Lead>, OutfloError> {
    let owner_id = owner_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LEAD_COLUMNS} FROM leads
                 WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![owner_id], map_lead_row)?;
            let mut leads = Vec::new();
            for row in rows {
                leads.push(row?);
            }
            Ok(leads)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a lead's lifecycle status.
pub async fn update_lead_status(
    db: &Database,
    id: &str,
    status: LeadStatus,
) -> Result<(), OutfloError> {
    let id = id.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE leads SET status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use outflo_core::OutfloError;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_lead(id: &str, owner: &str, email: Option<&str>, phone: Option<&str>) -> Lead {
        Lead {
            id: id.to_string(),
            owner_id: owner.to_string(),
            name: format!("lead {id}"),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            source: Some("csv".to_string()),
            status: LeadStatus::New,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_get_lead_roundtrips() {
        let (db, _dir) = setup_db().await;
        let lead = make_lead("l1", "owner-1", Some("a@x.com"), None);
        create_lead(&db, &lead).await.unwrap();

        let got = get_lead(&db, "l1").await.unwrap().unwrap();
        assert_eq!(got.owner_id, "owner-1");
        assert_eq!(got.email.as_deref(), Some("a@x.com"));
        assert!(got.phone.is_none());
        assert_eq!(got.status, LeadStatus::New);
    }

    #[tokio::test]
    async fn find_duplicate_matches_on_either_field() {
        let (db, _dir) = setup_db().await;
        create_lead(&db, &make_lead("l1", "o1", Some("a@x.com"), Some("555-1111")))
            .await
            .unwrap();

        // Same phone, different email: still a duplicate.
        let dup = find_duplicate(&db, "o1", Some("b@x.com"), Some("555-1111"))
            .await
            .unwrap();
        assert!(dup.is_some());

        // Same email only.
        let dup = find_duplicate(&db, "o1", Some("a@x.com"), None).await.unwrap();
        assert!(dup.is_some());

        // Neither matches.
        let dup = find_duplicate(&db, "o1", Some("c@x.com"), Some("555-9999"))
            .await
            .unwrap();
        assert!(dup.is_none());
    }

    #[tokio::test]
    async fn find_duplicate_is_scoped_per_owner() {
        let (db, _dir) = setup_db().await;
        create_lead(&db, &make_lead("l1", "o1", Some("a@x.com"), Some("555-1111")))
            .await
            .unwrap();

        let dup = find_duplicate(&db, "o2", Some("a@x.com"), Some("555-1111"))
            .await
            .unwrap();
        assert!(dup.is_none(), "dedup must not cross owners");
    }

    #[tokio::test]
    async fn unique_index_reports_conflict() {
        let (db, _dir) = setup_db().await;
        create_lead(&db, &make_lead("l1", "o1", Some("a@x.com"), None))
            .await
            .unwrap();

        let err = create_lead(&db, &make_lead("l2", "o1", Some("a@x.com"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, OutfloError::Conflict(_)));
    }

    #[tokio::test]
    async fn same_contact_different_owner_inserts() {
        let (db, _dir) = setup_db().await;
        create_lead(&db, &make_lead("l1", "o1", Some("a@x.com"), Some("555-1111")))
            .await
            .unwrap();
        create_lead(&db, &make_lead("l2", "o2", Some("a@x.com"), Some("555-1111")))
            .await
            .unwrap();

        assert_eq!(list_leads(&db, "o1").await.unwrap().len(), 1);
        assert_eq!(list_leads(&db, "o2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_contact_fields_do_not_collide() {
        let (db, _dir) = setup_db().await;
        // Two leads with no email must not trip the email unique index.
        create_lead(&db, &make_lead("l1", "o1", None, Some("555-0001")))
            .await
            .unwrap();
        create_lead(&db, &make_lead("l2", "o1", None, Some("555-0002")))
            .await
            .unwrap();
        assert_eq!(list_leads(&db, "o1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_lead_status_works() {
        let (db, _dir) = setup_db().await;
        create_lead(&db, &make_lead("l1", "o1", Some("a@x.com"), None))
            .await
            .unwrap();
        update_lead_status(&db, "l1", LeadStatus::Assigned).await.unwrap();
        let got = get_lead(&db, "l1").await.unwrap().unwrap();
        assert_eq!(got.status, LeadStatus::Assigned);
    }
}
