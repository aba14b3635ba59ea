// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI voice agent control: lifecycle transitions, call-by-call progression,
//! and the cancellable call runner.

pub mod controller;
pub mod runner;

pub use controller::AgentController;
pub use runner::{CallRunner, RunnerSettings, render_script};
