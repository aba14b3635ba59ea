// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV lead ingestion: parse, validate headers, dedup, commit.
//!
//! The pipeline is parse → header gate → commit. [`import`] wires the three
//! steps together the way the gateway and the `import` subcommand consume
//! them.

pub mod committer;
pub mod parser;

pub use committer::{CommitOutcome, commit};
pub use parser::{CandidateRow, InvalidReason, ParsedSheet, missing_headers, parse};

use outflo_core::OutfloError;
use outflo_core::traits::StorageAdapter;

/// Run the full ingestion pipeline over raw CSV text.
///
/// Fails fast on missing required headers (nothing inserted) and on input
/// with no valid rows.
pub async fn import(
    storage: &dyn StorageAdapter,
    owner_id: &str,
    raw: &str,
    source_override: Option<&str>,
    batch_size: usize,
) -> Result<CommitOutcome, OutfloError> {
    let sheet = parse(raw)?;

    let missing = missing_headers(&sheet);
    if !missing.is_empty() {
        return Err(OutfloError::Validation(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let valid: Vec<CandidateRow> = sheet.valid_rows().cloned().collect();
    if valid.is_empty() {
        return Err(OutfloError::Validation("no valid leads found".to_string()));
    }

    commit(storage, owner_id, &valid, source_override, batch_size).await
}
