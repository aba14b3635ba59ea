// SPDX-FileCopyrightText: 2026 Outflo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV parsing and candidate validation.
//!
//! Parsing is tolerant (ragged rows pad, blank lines skip) but the header
//! check is fail-fast: a sheet missing a required column never reaches the
//! commit step.

use outflo_core::OutfloError;
use serde::{Deserialize, Serialize};

const REQUIRED_HEADERS: [&str; 3] = ["name", "email", "phone"];

/// Why a candidate row cannot be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidReason {
    #[serde(rename = "missing both")]
    MissingBoth,
    #[serde(rename = "missing email")]
    MissingEmail,
    #[serde(rename = "missing phone")]
    MissingPhone,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvalidReason::MissingBoth => "missing both",
            InvalidReason::MissingEmail => "missing email",
            InvalidReason::MissingPhone => "missing phone",
        };
        f.write_str(s)
    }
}

/// One parsed row. Transient: produced here, consumed by the committer,
/// never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: String,
    pub invalid_reason: Option<InvalidReason>,
}

impl CandidateRow {
    /// A row is committable iff at least one contact field is non-empty.
    pub fn is_valid(&self) -> bool {
        !matches!(self.invalid_reason, Some(InvalidReason::MissingBoth))
    }
}

/// Parsed sheet: lower-cased trimmed headers plus all candidate rows.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<CandidateRow>,
}

impl ParsedSheet {
    /// Rows that pass validation, in input order.
    pub fn valid_rows(&self) -> impl Iterator<Item = &CandidateRow> {
        self.rows.iter().filter(|r| r.is_valid())
    }
}

/// Parse newline-delimited comma-separated text into candidate rows.
///
/// Headers are lower-cased and trimmed. Ragged rows pad with empty strings.
/// Blank lines are skipped. Empty input is a validation error.
pub fn parse(raw: &str) -> Result<ParsedSheet, OutfloError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| OutfloError::Validation(format!("unreadable header row: {e}")))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(OutfloError::Validation("no rows found".to_string()));
    }

    let field_at = |record: &csv::StringRecord, name: &str| -> String {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| record.get(i))
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| OutfloError::Validation(format!("bad row: {e}")))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let email = field_at(&record, "email");
        let phone = field_at(&record, "phone");
        let invalid_reason = match (email.is_empty(), phone.is_empty()) {
            (true, true) => Some(InvalidReason::MissingBoth),
            (true, false) => Some(InvalidReason::MissingEmail),
            (false, true) => Some(InvalidReason::MissingPhone),
            (false, false) => None,
        };
        rows.push(CandidateRow {
            name: field_at(&record, "name"),
            email,
            phone,
            source: field_at(&record, "source"),
            invalid_reason,
        });
    }

    if rows.is_empty() {
        return Err(OutfloError::Validation("no rows found".to_string()));
    }

    Ok(ParsedSheet { headers, rows })
}

/// Required headers missing from the sheet, in canonical order.
///
/// A non-empty result aborts ingestion before any insert.
pub fn missing_headers(sheet: &ParsedSheet) -> Vec<String> {
    REQUIRED_HEADERS
        .iter()
        .filter(|required| !sheet.headers.iter().any(|h| h == *required))
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_case_insensitively() {
        let sheet = parse("Name,EMAIL,Phone\nAda,a@x.com,555-0001\n").unwrap();
        assert_eq!(sheet.headers, vec!["name", "email", "phone"]);
        assert_eq!(sheet.rows.len(), 1);
        assert!(sheet.rows[0].is_valid());
    }

    #[test]
    fn classifies_missing_contact_fields() {
        let sheet = parse("name,email,phone\nA,a@x.com,\nB,,555-1111\nC,,\n").unwrap();
        assert_eq!(sheet.rows[0].invalid_reason, Some(InvalidReason::MissingPhone));
        assert!(sheet.rows[0].is_valid());
        assert_eq!(sheet.rows[1].invalid_reason, Some(InvalidReason::MissingEmail));
        assert!(sheet.rows[1].is_valid());
        assert_eq!(sheet.rows[2].invalid_reason, Some(InvalidReason::MissingBoth));
        assert!(!sheet.rows[2].is_valid());
        assert_eq!(sheet.valid_rows().count(), 2);
    }

    #[test]
    fn ragged_rows_pad_with_empty_strings() {
        let sheet = parse("name,email,phone,source\nAda,a@x.com\n").unwrap();
        let row = &sheet.rows[0];
        assert_eq!(row.email, "a@x.com");
        assert_eq!(row.phone, "");
        assert_eq!(row.source, "");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let sheet = parse("name,email,phone\nAda,a@x.com,\n,,\n\nBo,,555-2\n").unwrap();
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn empty_input_is_a_validation_error() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, OutfloError::Validation(_)));
        let err = parse("name,email,phone\n").unwrap_err();
        assert!(matches!(err, OutfloError::Validation(_)));
    }

    #[test]
    fn missing_header_list_is_exact() {
        let sheet = parse("name,email\nAda,a@x.com\n").unwrap();
        assert_eq!(missing_headers(&sheet), vec!["phone"]);

        let sheet = parse("source\ncsv\n").unwrap();
        assert_eq!(missing_headers(&sheet), vec!["name", "email", "phone"]);
    }

    #[test]
    fn values_are_trimmed() {
        let sheet = parse("name, email ,phone\n  Ada ,  a@x.com , \n").unwrap();
        assert_eq!(sheet.rows[0].name, "Ada");
        assert_eq!(sheet.rows[0].email, "a@x.com");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // Simple unquoted fields: no commas, quotes, or line breaks.
        fn field() -> impl Strategy<Value = String> {
            "[a-zA-Z0-9@. _-]{0,12}"
        }

        proptest! {
            #[test]
            fn classification_tracks_contact_fields(
                name in field(),
                email in field(),
                phone in field(),
            ) {
                let raw = format!("name,email,phone\n{name},{email},{phone}\n");
                let Ok(sheet) = parse(&raw) else {
                    // The only parse failure for a single data row is the
                    // blank-line skip leaving no rows behind.
                    prop_assert!(
                        name.trim().is_empty()
                            && email.trim().is_empty()
                            && phone.trim().is_empty()
                    );
                    return Ok(());
                };
                prop_assert_eq!(sheet.rows.len(), 1);
                let row = &sheet.rows[0];
                let expected = match (email.trim().is_empty(), phone.trim().is_empty()) {
                    (true, true) => Some(InvalidReason::MissingBoth),
                    (true, false) => Some(InvalidReason::MissingEmail),
                    (false, true) => Some(InvalidReason::MissingPhone),
                    (false, false) => None,
                };
                prop_assert_eq!(row.invalid_reason, expected);
                prop_assert_eq!(row.is_valid(), !phone.trim().is_empty() || !email.trim().is_empty());
            }

            #[test]
            fn parse_never_panics(raw in "[a-zA-Z0-9@.,\n _-]{0,200}") {
                let _ = parse(&raw);
            }
        }
    }
}
