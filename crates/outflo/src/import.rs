// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `outflo import` command implementation.
//!
//! One-shot CSV ingestion from the CLI, printing the commit outcome.

use std::path::Path;
use std::sync::Arc;

use outflo_config::model::OutfloConfig;
use outflo_core::OutfloError;
use outflo_core::traits::StorageAdapter;
use outflo_storage::SqliteStorage;

/// Runs the `outflo import` command.
pub async fn run_import(
    config: &OutfloConfig,
    owner_id: &str,
    file: &Path,
    source: Option<&str>,
) -> Result<(), OutfloError> {
    let raw = std::fs::read_to_string(file).map_err(|e| {
        OutfloError::Validation(format!("cannot read {}: {e}", file.display()))
    })?;

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let source = source.or(config.ingest.default_source.as_deref());
    let outcome = outflo_ingest::import(
        storage.as_ref(),
        owner_id,
        &raw,
        source,
        config.ingest.batch_size,
    )
    .await?;

    println!(
        "imported {} leads ({} duplicates, {} failed)",
        outcome.inserted, outcome.duplicates, outcome.failed
    );
    if let Some(first_error) = &outcome.first_error {
        println!("first error: {first_error}");
    }

    storage.close().await?;
    Ok(())
}
