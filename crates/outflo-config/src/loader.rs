// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./outflo.toml` > `~/.config/outflo/outflo.toml` > `/etc/outflo/outflo.toml`
//! with environment variable overrides via `OUTFLO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OutfloConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/outflo/outflo.toml` (system-wide)
/// 3. `~/.config/outflo/outflo.toml` (user XDG config)
/// 4. `./outflo.toml` (local directory)
/// 5. `OUTFLO_*` environment variables
pub fn load_config() -> Result<OutfloConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OutfloConfig::default()))
        .merge(Toml::file("/etc/outflo/outflo.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("outflo/outflo.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("outflo.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<OutfloConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OutfloConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OutfloConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OutfloConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `OUTFLO_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("OUTFLO_").map(|key| {
        // The key arrives with the prefix stripped but its case preserved, so
        // lowercase before matching section prefixes.
        // Example: OUTFLO_DISPATCH_INTER_SEND_DELAY_MS -> "dispatch.inter_send_delay_ms"
        let key_str = key.as_str().to_lowercase();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("ingest_", "ingest.", 1)
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("agent_", "agent.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[dispatch]
inter_send_delay_ms = 25

[storage]
database_path = "/tmp/outflo-test.db"
"#,
        )
        .unwrap();
        assert_eq!(config.dispatch.inter_send_delay_ms, 25);
        assert_eq!(config.storage.database_path, "/tmp/outflo-test.db");
        // Untouched sections keep defaults.
        assert_eq!(config.ingest.batch_size, 50);
    }

    #[test]
    fn env_vars_map_to_dotted_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("OUTFLO_INGEST_BATCH_SIZE", "7");
            jail.set_env("OUTFLO_GATEWAY_PORT", "9000");
            let config: OutfloConfig = Figment::new()
                .merge(Serialized::defaults(OutfloConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.ingest.batch_size, 7);
            assert_eq!(config.gateway.port, 9000);
            Ok(())
        });
    }
}
