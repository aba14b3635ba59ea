// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dedup-and-insert step: commits valid candidate rows to the lead store.

use chrono::Utc;
use outflo_core::OutfloError;
use outflo_core::traits::StorageAdapter;
use outflo_core::types::{Lead, LeadStatus};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::parser::CandidateRow;

/// Counts reported back to the caller after a commit pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
    /// First per-row store error encountered, for the caller's summary.
    pub first_error: Option<String>,
}

/// Commit valid candidates for one owner, strictly in input order.
///
/// Processing is chunked by `batch_size` purely to bound in-flight duplicate
/// checks; chunks have no transactional meaning, so a crash mid-pass leaves
/// already-inserted rows committed (at-least-once).
///
/// Per row: the advisory duplicate check runs first; a hit counts as
/// duplicate and skips the insert. An insert that still trips the unique
/// index also counts as duplicate, since the index is the authoritative
/// check. Any other store error is recorded and processing continues.
pub async fn commit(
    storage: &dyn StorageAdapter,
    owner_id: &str,
    candidates: &[CandidateRow],
    source_override: Option<&str>,
    batch_size: usize,
) -> Result<CommitOutcome, OutfloError> {
    let batch_size = batch_size.max(1);
    let mut outcome = CommitOutcome::default();

    for chunk in candidates.chunks(batch_size) {
        for row in chunk.iter().filter(|r| r.is_valid()) {
            let email = Some(row.email.as_str()).filter(|s| !s.is_empty());
            let phone = Some(row.phone.as_str()).filter(|s| !s.is_empty());

            match storage.find_duplicate(owner_id, email, phone).await {
                Ok(Some(existing)) => {
                    debug!(owner_id, existing_id = %existing.id, "duplicate candidate skipped");
                    outcome.duplicates += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(owner_id, error = %e, "duplicate check failed");
                    outcome.failed += 1;
                    outcome.first_error.get_or_insert_with(|| e.to_string());
                    continue;
                }
            }

            let lead = Lead {
                id: Uuid::new_v4().to_string(),
                owner_id: owner_id.to_string(),
                name: row.name.clone(),
                email: email.map(str::to_string),
                phone: phone.map(str::to_string),
                source: source_override
                    .map(str::to_string)
                    .or_else(|| Some(row.source.clone()).filter(|s| !s.is_empty())),
                status: LeadStatus::New,
                created_at: Utc::now(),
            };

            match storage.create_lead(&lead).await {
                Ok(()) => outcome.inserted += 1,
                // The unique index caught a race the advisory check missed.
                Err(OutfloError::Conflict(_)) => outcome.duplicates += 1,
                Err(e) => {
                    warn!(owner_id, error = %e, "lead insert failed");
                    outcome.failed += 1;
                    outcome.first_error.get_or_insert_with(|| e.to_string());
                }
            }
        }
    }

    debug!(
        owner_id,
        inserted = outcome.inserted,
        duplicates = outcome.duplicates,
        failed = outcome.failed,
        "commit pass finished"
    );
    Ok(outcome)
}
