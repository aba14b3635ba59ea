// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `outflo doctor` command implementation.
//!
//! Runs diagnostic checks against the Outflo environment to identify
//! configuration and database issues before `serve` is started.

use std::io::IsTerminal;
use std::time::Instant;

use outflo_config::model::OutfloConfig;
use outflo_config::validate_config;
use outflo_core::OutfloError;
use outflo_core::traits::{PluginAdapter, StorageAdapter};
use outflo_core::types::HealthStatus;
use outflo_storage::SqliteStorage;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: std::time::Duration,
}

/// Run the `outflo doctor` command.
///
/// With `--plain`, disables colored output.
pub async fn run_doctor(config: &OutfloConfig, plain: bool) -> Result<(), OutfloError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config),
        check_database(config).await,
        check_integrity(&config.storage.database_path).await,
    ];

    println!();
    println!("  outflo doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let line = match result.status {
            CheckStatus::Pass => {
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "✓".green(),
                        result.name,
                        result.message
                    )
                } else {
                    format!(
                        "    [OK]   {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
            CheckStatus::Warn => {
                warn_count += 1;
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "!".yellow(),
                        result.name,
                        result.message.yellow()
                    )
                } else {
                    format!(
                        "    [WARN] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
            CheckStatus::Fail => {
                fail_count += 1;
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "✗".red(),
                        result.name,
                        result.message.red()
                    )
                } else {
                    format!(
                        "    [FAIL] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
        };
        println!("{line}");
    }

    println!();
    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

/// Check configuration validates without errors.
fn check_config(config: &OutfloConfig) -> CheckResult {
    let start = Instant::now();
    match validate_config(config) {
        Ok(()) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Pass,
            message: "valid".to_string(),
            duration: start.elapsed(),
        },
        Err(errors) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Fail,
            message: format!("{} error(s)", errors.len()),
            duration: start.elapsed(),
        },
    }
}

/// Check the database opens, migrates, and answers a health probe.
async fn check_database(config: &OutfloConfig) -> CheckResult {
    let start = Instant::now();
    let path = std::path::Path::new(&config.storage.database_path);
    let existed = path.exists();

    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Fail,
            message: format!("open failed: {e}"),
            duration: start.elapsed(),
        };
    }

    let result = match storage.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult {
            name: "Database".to_string(),
            status: if existed {
                CheckStatus::Pass
            } else {
                CheckStatus::Warn
            },
            message: if existed {
                "connected, migrations applied".to_string()
            } else {
                "created new database".to_string()
            },
            duration: start.elapsed(),
        },
        Ok(status) => CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Warn,
            message: format!("{status:?}"),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Fail,
            message: format!("probe failed: {e}"),
            duration: start.elapsed(),
        },
    };
    let _ = storage.close().await;
    result
}

/// Run SQLite's integrity check against the database file.
async fn check_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let path = db_path.to_string();

    let outcome = tokio::task::spawn_blocking(move || -> Result<String, rusqlite::Error> {
        let conn = rusqlite::Connection::open(&path)?;
        conn.query_row("PRAGMA integrity_check", [], |row| row.get::<_, String>(0))
    })
    .await;

    match outcome {
        Ok(Ok(answer)) if answer == "ok" => CheckResult {
            name: "Integrity".to_string(),
            status: CheckStatus::Pass,
            message: "ok".to_string(),
            duration: start.elapsed(),
        },
        Ok(Ok(answer)) => CheckResult {
            name: "Integrity".to_string(),
            status: CheckStatus::Fail,
            message: answer,
            duration: start.elapsed(),
        },
        Ok(Err(e)) => CheckResult {
            name: "Integrity".to_string(),
            status: CheckStatus::Fail,
            message: format!("check failed: {e}"),
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "Integrity".to_string(),
            status: CheckStatus::Fail,
            message: format!("check panicked: {e}"),
            duration: start.elapsed(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn doctor_passes_on_a_fresh_temp_database() {
        let dir = tempdir().unwrap();
        let mut config = OutfloConfig::default();
        config.storage.database_path =
            dir.path().join("doctor.db").to_string_lossy().into_owned();

        let result = check_database(&config).await;
        // A brand-new database is a warning, not a failure.
        assert_eq!(result.status, CheckStatus::Warn);

        let result = check_integrity(&config.storage.database_path).await;
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn default_config_is_valid() {
        let result = check_config(&OutfloConfig::default());
        assert_eq!(result.status, CheckStatus::Pass);
    }
}
