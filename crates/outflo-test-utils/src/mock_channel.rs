// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic dispatch testing.
//!
//! `MockChannel` implements `ChannelAdapter` with scripted per-recipient
//! failures and captured sends for assertion in tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use outflo_core::OutfloError;
use outflo_core::traits::{ChannelAdapter, PluginAdapter};
use outflo_core::types::{
    AdapterType, Channel, Delivery, HealthStatus, MessageContent, Recipient,
};

/// A channel adapter that delivers in memory.
///
/// By default every send succeeds; [`MockChannel::fail_for`] scripts a
/// failed delivery for specific lead IDs, and [`MockChannel::error_for`]
/// scripts an adapter error (an `Err`, not a `delivered=false`).
pub struct MockChannel {
    channel: Channel,
    fail: HashSet<String>,
    error: HashSet<String>,
    calls: Mutex<Vec<Recipient>>,
}

impl MockChannel {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            fail: HashSet::new(),
            error: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script a `delivered=false` outcome for this lead ID.
    pub fn fail_for(mut self, lead_id: &str) -> Self {
        self.fail.insert(lead_id.to_string());
        self
    }

    /// Script an adapter error for this lead ID.
    pub fn error_for(mut self, lead_id: &str) -> Self {
        self.error.insert(lead_id.to_string());
        self
    }

    /// All recipients passed to `send()`, in call order.
    pub fn calls(&self) -> Vec<Recipient> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
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
impl ChannelAdapter for MockChannel {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(
        &self,
        recipient: &Recipient,
        _content: &MessageContent,
    ) -> Result<Delivery, OutfloError> {
        self.calls.lock().unwrap().push(recipient.clone());

        if self.error.contains(&recipient.lead_id) {
            return Err(OutfloError::Channel {
                message: format!("scripted error for {}", recipient.lead_id),
                source: None,
            });
        }
        if self.fail.contains(&recipient.lead_id) {
            return Ok(Delivery {
                delivered: false,
                error_code: Some("mock_failure".to_string()),
            });
        }
        Ok(Delivery {
            delivered: true,
            error_code: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(id: &str) -> Recipient {
        Recipient {
            lead_id: id.to_string(),
            name: "Ada".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: None,
        }
    }

    #[tokio::test]
    async fn unscripted_sends_deliver() {
        let mock = MockChannel::new(Channel::Email);
        let delivery = mock
            .send(&recipient("l1"), &MessageContent::default())
            .await
            .unwrap();
        assert!(delivery.delivered);
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn scripted_failure_is_not_delivered() {
        let mock = MockChannel::new(Channel::Email).fail_for("l1");
        let delivery = mock
            .send(&recipient("l1"), &MessageContent::default())
            .await
            .unwrap();
        assert!(!delivery.delivered);
        assert_eq!(delivery.error_code.as_deref(), Some("mock_failure"));
    }

    #[tokio::test]
    async fn scripted_error_is_an_err() {
        let mock = MockChannel::new(Channel::Email).error_for("l1");
        let err = mock
            .send(&recipient("l1"), &MessageContent::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OutfloError::Channel { .. }));
        // The call is still captured.
        assert_eq!(mock.calls().len(), 1);
    }
}
