// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Outflo campaign platform.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Outflo configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutfloConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// CSV ingestion settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Campaign dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// AI voice agent settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "outflo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("outflo").join("outflo.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "outflo.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// CSV ingestion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Commit chunk size. Bounds the number of in-flight duplicate-check
    /// queries per chunk; has no transactional meaning.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Source label applied to leads whose rows carry no `source` column.
    #[serde(default)]
    pub default_source: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            default_source: None,
        }
    }
}

fn default_batch_size() -> usize {
    50
}

/// Campaign dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Minimum interval between consecutive sends within one dispatch, in
    /// milliseconds. A throttle for downstream channel rate limits, not a
    /// performance knob.
    #[serde(default = "default_inter_send_delay_ms")]
    pub inter_send_delay_ms: u64,

    /// Whether a campaign in `failed` status may be dispatched again.
    #[serde(default = "default_redispatch_failed")]
    pub redispatch_failed: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            inter_send_delay_ms: default_inter_send_delay_ms(),
            redispatch_failed: default_redispatch_failed(),
        }
    }
}

fn default_inter_send_delay_ms() -> u64 {
    500
}

fn default_redispatch_failed() -> bool {
    true
}

/// AI voice agent configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Interval between consecutive agent calls, in milliseconds.
    #[serde(default = "default_call_interval_ms")]
    pub call_interval_ms: u64,

    /// Call script template. `{name}` and `{business_type}` placeholders are
    /// filled per agent.
    #[serde(default = "default_script_template")]
    pub script_template: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            call_interval_ms: default_call_interval_ms(),
            script_template: default_script_template(),
        }
    }
}

fn default_call_interval_ms() -> u64 {
    1000
}

fn default_script_template() -> String {
    "Hello, this is {name} calling on behalf of a {business_type} business.".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8780
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = OutfloConfig::default();
        assert_eq!(config.service.name, "outflo");
        assert_eq!(config.ingest.batch_size, 50);
        assert_eq!(config.dispatch.inter_send_delay_ms, 500);
        assert!(config.dispatch.redispatch_failed);
        assert_eq!(config.gateway.port, 8780);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[ingest]
batch_size = 10
"#;
        let config: OutfloConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ingest.batch_size, 10);
        assert_eq!(config.dispatch.inter_send_delay_ms, 500);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[dispatch]
inter_send_delay = 100
"#;
        assert!(toml::from_str::<OutfloConfig>(toml_str).is_err());
    }
}
