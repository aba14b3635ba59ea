// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Outflo campaign platform.

use thiserror::Error;

/// The primary error type used across all Outflo adapter traits and core operations.
///
/// Failures are scoped: a `Channel` error concerns one send attempt, a
/// `Storage` error one query, a `Validation` or `Precondition` error one
/// caller request. Nothing in this taxonomy is fatal to the process.
#[derive(Debug, Error)]
pub enum OutfloError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (provider failure, unreachable recipient, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input rejected before anything was persisted (missing headers, empty
    /// file, no valid rows).
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation rejected in the current state; no state change occurred
    /// (no recipients, no content, campaign already sent).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A storage write lost to an existing row (unique constraint hit).
    /// Ingestion counts these as duplicates rather than failures.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Requested adapter was not found in the registry.
    #[error("adapter not found: {adapter_type}/{name}")]
    AdapterNotFound { adapter_type: String, name: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
