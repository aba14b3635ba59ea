// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment deserialization failures into miette diagnostics.
//!
//! Unknown keys get a Jaro-Winkler "did you mean" hint and a source span
//! pointing at the offending line of the TOML file that supplied the key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity floor below which a typo gets no suggestion. Jaro-Winkler at
/// 0.75 still catches `batch_sze` and `log_lvl` without suggesting for
/// arbitrary garbage.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// One rendered-ready configuration problem.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(outflo::config::unknown_key), help("{hint}"))]
    UnknownKey {
        key: String,
        /// Precomputed help line: suggestion (when one clears the
        /// threshold) plus the section's valid keys.
        hint: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid value for `{key}`: found {found}")]
    #[diagnostic(code(outflo::config::invalid_value), help("expected {expected}"))]
    InvalidValue {
        key: String,
        found: String,
        expected: String,
    },

    #[error("validation error: {message}")]
    #[diagnostic(code(outflo::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(outflo::config::other))]
    Other(String),
}

/// Flatten a figment error (which may aggregate several failures) into one
/// [`ConfigError`] per failure.
///
/// `toml_sources` carries `(path, content)` pairs for every TOML file that
/// participated in the merge, so unknown-key errors can be annotated with
/// the exact line that introduced the key.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| convert_one(e, toml_sources))
        .collect()
}

fn convert_one(error: figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let valid: Vec<&str> = expected.to_vec();
            let hint = match closest_key(field, &valid) {
                Some(best) => format!("did you mean `{best}`? Valid keys: {}", valid.join(", ")),
                None => format!("valid keys: {}", valid.join(", ")),
            };
            let (span, src) = locate(&error, field, toml_sources);
            ConfigError::UnknownKey {
                key: field.clone(),
                hint,
                span,
                src,
            }
        }
        Kind::InvalidType(found, expected) => ConfigError::InvalidValue {
            key: dotted_path(&error),
            found: found.to_string(),
            expected: expected.clone(),
        },
        Kind::InvalidValue(found, expected) => ConfigError::InvalidValue {
            key: dotted_path(&error),
            found: found.to_string(),
            expected: expected.clone(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

fn dotted_path(error: &figment::Error) -> String {
    error
        .path
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Pick the valid key most similar to `unknown`, if any clears the floor.
fn closest_key<'a>(unknown: &str, valid: &[&'a str]) -> Option<&'a str> {
    valid
        .iter()
        .map(|k| (*k, strsim::jaro_winkler(unknown, k)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(k, _)| k)
}

/// Resolve the span of `field` inside whichever merged TOML file figment
/// attributes the error to.
fn locate(
    error: &figment::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(metadata) = error.metadata.as_ref() else {
        return (None, None);
    };
    let Some(figment::Source::File(path)) = metadata.source.as_ref() else {
        return (None, None);
    };
    let path = path.display().to_string();
    let Some((_, content)) = toml_sources.iter().find(|(p, _)| *p == path) else {
        return (None, None);
    };

    let section = error.path.first().map(ToString::to_string);
    match key_span(content, section.as_deref(), field) {
        Some(span) => (Some(span), Some(NamedSource::new(path, content.clone()))),
        None => (None, None),
    }
}

/// Byte span of `key = ...` within `section` (or before any section header
/// when `section` is `None`), walking lines and tracking table headers so a
/// same-named key in a different table never matches.
fn key_span(content: &str, section: Option<&str>, key: &str) -> Option<SourceSpan> {
    let mut offset = 0usize;
    let mut in_section = section.is_none();

    for line in content.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('[') {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            in_section = section == Some(header);
        } else if in_section && trimmed.starts_with(key) {
            let rest = &trimmed[key.len()..];
            if rest.trim_start().starts_with('=') {
                let indent = line.len() - trimmed.len();
                return Some(SourceSpan::new((offset + indent).into(), key.len()));
            }
        }

        offset += line.len() + 1;
    }

    None
}

/// Render every diagnostic through miette's graphical handler to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        if handler.render_report(&mut out, error as &dyn Diagnostic).is_err() {
            out.push_str(&format!("error: {error}\n"));
        }
    }
    eprint!("{out}");
}
