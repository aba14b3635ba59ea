// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait: the abstract boundary to an external email, SMS,
//! WhatsApp, or voice provider.

use async_trait::async_trait;

use crate::error::OutfloError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Channel, Delivery, MessageContent, Recipient};

/// Adapter for one outbound channel.
///
/// The dispatch orchestrator assumes nothing about a provider beyond this
/// boundary: adapters are swappable, and the only response shape is
/// [`Delivery`]. An `Err` return and a `Delivery { delivered: false, .. }`
/// are both recorded as a failed send for that recipient.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// The channel this adapter serves.
    fn channel(&self) -> Channel;

    /// Sends one message to one recipient.
    async fn send(
        &self,
        recipient: &Recipient,
        content: &MessageContent,
    ) -> Result<Delivery, OutfloError>;
}
