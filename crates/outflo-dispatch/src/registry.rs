// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter registry.

use std::collections::HashMap;
use std::sync::Arc;

use outflo_core::OutfloError;
use outflo_core::traits::ChannelAdapter;
use outflo_core::types::Channel;
use tracing::info;

/// Maps each [`Channel`] to the adapter that delivers on it.
///
/// Registration happens once at startup; dispatch only ever reads, so the
/// map needs no interior locking.
#[derive(Default)]
pub struct ChannelRegistry {
    adapters: HashMap<Channel, Arc<dyn ChannelAdapter>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for its channel, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn ChannelAdapter>) {
        let channel = adapter.channel();
        info!(%channel, adapter = adapter.name(), "channel adapter registered");
        self.adapters.insert(channel, adapter);
    }

    /// Look up the adapter for a channel.
    pub fn get(&self, channel: Channel) -> Result<Arc<dyn ChannelAdapter>, OutfloError> {
        self.adapters
            .get(&channel)
            .cloned()
            .ok_or_else(|| OutfloError::AdapterNotFound {
                adapter_type: "channel".to_string(),
                name: channel.to_string(),
            })
    }

    /// Channels with a registered adapter.
    pub fn channels(&self) -> Vec<Channel> {
        self.adapters.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dryrun::DryRunChannel;

    #[test]
    fn lookup_of_unregistered_channel_fails() {
        let registry = ChannelRegistry::new();
        assert!(matches!(
            registry.get(Channel::Email),
            Err(OutfloError::AdapterNotFound { .. })
        ));
    }

    #[test]
    fn registered_adapter_is_returned() {
        let mut registry = ChannelRegistry::new();
        registry.register(Arc::new(DryRunChannel::new(Channel::Sms)));
        let adapter = registry.get(Channel::Sms).unwrap();
        assert_eq!(adapter.channel(), Channel::Sms);
    }
}
