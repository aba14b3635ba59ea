// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign dispatch: channel registry, dry-run adapter, and the
//! lifecycle-enforcing orchestrator.

pub mod dryrun;
pub mod orchestrator;
pub mod registry;

pub use dryrun::DryRunChannel;
pub use orchestrator::{DispatchCounts, DispatchOrchestrator, DispatchReport, DispatchSettings};
pub use registry::ChannelRegistry;
