// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Outflo campaign platform.
//!
//! One database file holds the lead, campaign, agent, and audit stores. All
//! access goes through a single tokio-rusqlite connection whose background
//! thread serializes writes; [`SqliteStorage`] implements the
//! [`outflo_core::traits::StorageAdapter`] contract on top of it.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
