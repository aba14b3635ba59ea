// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Outflo campaign platform.
//!
//! This crate provides the foundational trait definitions, error type, and
//! domain types used throughout the Outflo workspace: leads, campaigns,
//! AI voice agents, audit log records, and the adapter traits that the
//! storage and channel backends implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::OutfloError;
pub use types::{AdapterType, Channel, DeliveryStatus, HealthStatus, SendOutcome};

pub use traits::{ChannelAdapter, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = OutfloError::Config("test".into());
        let _storage = OutfloError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = OutfloError::Channel {
            message: "test".into(),
            source: None,
        };
        let _validation = OutfloError::Validation("missing headers".into());
        let _precondition = OutfloError::Precondition("campaign already sent".into());
        let _not_found = OutfloError::AdapterNotFound {
            adapter_type: "Channel".into(),
            name: "email".into(),
        };
        let _timeout = OutfloError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = OutfloError::Internal("test".into());
    }

    #[test]
    fn precondition_errors_render_with_context() {
        let err = OutfloError::Precondition("campaign has no leads".into());
        assert_eq!(err.to_string(), "precondition failed: campaign has no leads");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Compile-time check that the adapter traits are reachable from the
        // crate root.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
    }
}
