// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use outflo_core::OutfloError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Handle to the single SQLite connection.
///
/// `Database` IS the single writer: every query module accepts `&Database`
/// and goes through [`Connection::call`], which serializes closures on one
/// background thread and eliminates SQLITE_BUSY errors under concurrency.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if necessary) the database at `path`, apply PRAGMAs,
    /// and run pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, OutfloError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| OutfloError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = Connection::open(path).await.map_err(|e| OutfloError::Storage {
            source: Box::new(e),
        })?;

        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(crate::migrations::run_migrations)
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(e) => e,
                e => OutfloError::Storage {
                    source: Box::new(e),
                },
            })?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL so pending writes reach the main database file.
    pub async fn close(&self) -> Result<(), OutfloError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the shared storage error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> OutfloError {
    OutfloError::Storage {
        source: Box::new(e),
    }
}

/// Map a write error, classifying unique-constraint violations as
/// [`OutfloError::Conflict`] so ingestion can count them as duplicates.
pub(crate) fn map_write_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> OutfloError {
    if let tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(code, ref msg)) = e {
        if code.code == rusqlite::ErrorCode::ConstraintViolation {
            return OutfloError::Conflict(
                msg.clone()
                    .unwrap_or_else(|| "unique constraint violation".to_string()),
            );
        }
    }
    map_tr_err(e)
}
