// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database storage harness.
//!
//! Opens a migrated SQLite store in a temp directory that lives as long as
//! the harness value. Panics on setup failure: this is test-only code.

use std::sync::Arc;

use outflo_config::model::StorageConfig;
use outflo_core::traits::StorageAdapter;
use outflo_storage::SqliteStorage;
use tempfile::TempDir;

/// An initialized SQLite storage adapter backed by a temp directory.
pub struct TempStorage {
    storage: Arc<SqliteStorage>,
    _dir: TempDir,
}

impl TempStorage {
    /// Create and initialize a fresh store.
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("outflo.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.expect("initialize storage");
        Self {
            storage: Arc::new(storage),
            _dir: dir,
        }
    }

    /// The storage adapter, as the trait object engines consume.
    pub fn storage(&self) -> Arc<dyn StorageAdapter> {
        self.storage.clone()
    }
}
