// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Outflo integration tests.
//!
//! Provides mock adapters and harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock channel adapter with scripted per-recipient outcomes
//! - [`TempStorage`] - Initialized temp-database storage adapter

pub mod harness;
pub mod mock_channel;

pub use harness::TempStorage;
pub use mock_channel::MockChannel;
