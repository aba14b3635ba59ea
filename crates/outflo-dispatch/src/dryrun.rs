// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log-only channel adapter.
//!
//! Stands in for a real provider: every send is logged and reported
//! delivered. The default adapter set in `outflo serve` is all dry-run.

use async_trait::async_trait;
use outflo_core::OutfloError;
use outflo_core::traits::{ChannelAdapter, PluginAdapter};
use outflo_core::types::{AdapterType, Channel, Delivery, HealthStatus, MessageContent, Recipient};
use tracing::info;

/// A channel adapter that delivers nowhere.
pub struct DryRunChannel {
    channel: Channel,
}

impl DryRunChannel {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl PluginAdapter for DryRunChannel {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, OutfloError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OutfloError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for DryRunChannel {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(
        &self,
        recipient: &Recipient,
        content: &MessageContent,
    ) -> Result<Delivery, OutfloError> {
        info!(
            channel = %self.channel,
            recipient = %recipient.lead_id,
            subject = content.subject.as_deref().unwrap_or(""),
            "dry-run send"
        );
        Ok(Delivery {
            delivered: true,
            error_code: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_always_delivers() {
        let adapter = DryRunChannel::new(Channel::Email);
        let recipient = Recipient {
            lead_id: "l1".into(),
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            phone: None,
        };
        let delivery = adapter
            .send(&recipient, &MessageContent {
                subject: Some("hi".into()),
                body: "hello".into(),
            })
            .await
            .unwrap();
        assert!(delivery.delivered);
        assert!(delivery.error_code.is_none());
    }
}
