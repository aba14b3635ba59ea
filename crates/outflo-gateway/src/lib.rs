// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Outflo platform.
//!
//! REST surface for lead import, campaign scheduling and dispatch, agent
//! control, and the audit-log read surface with SSE tailing. There is no
//! auth layer here by design.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{GatewayState, ServerConfig, build_router, start_server};
pub use sse::AuditEvent;
