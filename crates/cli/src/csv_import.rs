// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV parsing and validation for bulk factor import.
//!
//! Every row is validated before anything is written. A file with a single
//! bad row imports nothing.

use clinic_tariff_domain::{
    ComponentKind, EffectivePeriod, FactorDraft, FinancialYear, TariffTier, parse_decimal,
    parse_iso_date, validate_factor_draft,
};
use csv::StringRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use time::Date;

use crate::error::CliError;

/// Required CSV column headers (case-insensitive, normalized).
const REQUIRED_HEADERS: &[&str] = &[
    "kind",
    "hashtagged",
    "financial_year",
    "value",
    "effective_from",
];

/// Optional column: an empty or missing value means open-ended.
const EFFECTIVE_TO: &str = "effective_to";

/// Validation errors for one CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// Every problem found on the row.
    pub errors: Vec<String>,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row_number, self.errors.join("; "))
    }
}

/// A validated row, ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// The row number (1-based, excluding header).
    pub row_number: usize,
    /// The factor to create.
    pub draft: FactorDraft,
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Validates that all required headers are present in the CSV.
fn validate_headers(headers: &StringRecord) -> Result<HashMap<String, usize>, CliError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !header_map.contains_key(*required))
        .collect();

    if !missing.is_empty() {
        return Err(CliError::InvalidCsvFormat {
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

/// Parses one field, recording a row error on failure.
fn parse_field<T>(
    raw: Option<String>,
    field_name: &str,
    errors: &mut Vec<String>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    let Some(value) = raw else {
        errors.push(format!("{field_name}: required field is missing or empty"));
        return None;
    };

    match parse(&value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(format!("{field_name}: {e}"));
            None
        }
    }
}

/// Parses a CSV row into a validated factor draft.
fn parse_csv_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<FactorDraft, Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    let get_field = |name: &str| -> Option<String> {
        header_map
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let kind: Option<ComponentKind> =
        parse_field(get_field("kind"), "kind", &mut errors, |raw| {
            ComponentKind::from_str(raw).map_err(|e| e.to_string())
        });
    let tier: Option<TariffTier> =
        parse_field(get_field("hashtagged"), "hashtagged", &mut errors, |raw| {
            TariffTier::from_str(raw).map_err(|e| e.to_string())
        });
    let financial_year: Option<FinancialYear> = parse_field(
        get_field("financial_year"),
        "financial_year",
        &mut errors,
        |raw| {
            let year: i64 = raw
                .parse::<i64>()
                .map_err(|_| format!("invalid number '{raw}'"))?;
            FinancialYear::new(year).map_err(|e| e.to_string())
        },
    );
    let value: Option<Decimal> = parse_field(get_field("value"), "value", &mut errors, |raw| {
        parse_decimal(raw).map_err(|e| e.to_string())
    });
    let effective_from: Option<Date> = parse_field(
        get_field("effective_from"),
        "effective_from",
        &mut errors,
        |raw| parse_iso_date(raw).map_err(|e| e.to_string()),
    );
    let effective_to: Option<Date> = match get_field(EFFECTIVE_TO) {
        Some(raw) => match parse_iso_date(&raw) {
            Ok(date) => Some(date),
            Err(e) => {
                errors.push(format!("{EFFECTIVE_TO}: {e}"));
                None
            }
        },
        None => None,
    };

    let (Some(kind), Some(tier), Some(financial_year), Some(value), Some(from)) =
        (kind, tier, financial_year, value, effective_from)
    else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let period: EffectivePeriod = match EffectivePeriod::new(from, effective_to) {
        Ok(period) => period,
        Err(e) => {
            errors.push(format!("{EFFECTIVE_TO}: {e}"));
            return Err(errors);
        }
    };

    let draft: FactorDraft = FactorDraft {
        kind,
        tier,
        financial_year,
        value,
        period,
    };

    if let Err(e) = validate_factor_draft(&draft) {
        errors.push(format!("validation: {e}"));
        return Err(errors);
    }

    Ok(draft)
}

/// Parses and validates a factor CSV.
///
/// Rows that declare the same `(kind, tier, financial year, effective_from)`
/// as an earlier row are rejected as duplicates.
///
/// # Arguments
///
/// * `csv_content` - The raw CSV content as a string
///
/// # Errors
///
/// Returns `CliError::InvalidCsvFormat` if the headers are unusable, and
/// `CliError::InvalidRows` listing every bad row if any row fails.
pub fn parse_factor_csv(csv_content: &str) -> Result<Vec<ImportRow>, CliError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(csv_content.as_bytes());

    // Get and validate headers
    let headers: StringRecord = reader
        .headers()
        .map_err(|e| CliError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();

    let header_map: HashMap<String, usize> = validate_headers(&headers)?;

    let mut rows: Vec<ImportRow> = Vec::new();
    let mut row_errors: Vec<RowError> = Vec::new();
    let mut seen: HashMap<(ComponentKind, TariffTier, FinancialYear, Date), usize> =
        HashMap::new();

    for (idx, result) in reader.records().enumerate() {
        let row_number: usize = idx + 1;

        let record: StringRecord = match result {
            Ok(rec) => rec,
            Err(e) => {
                row_errors.push(RowError {
                    row_number,
                    errors: vec![format!("CSV parse error: {e}")],
                });
                continue;
            }
        };

        match parse_csv_row(&record, &header_map) {
            Ok(draft) => {
                let key = (
                    draft.kind,
                    draft.tier,
                    draft.financial_year,
                    draft.period.from(),
                );
                if let Some(first) = seen.get(&key) {
                    row_errors.push(RowError {
                        row_number,
                        errors: vec![format!("duplicate of row {first}")],
                    });
                    continue;
                }
                seen.insert(key, row_number);
                rows.push(ImportRow { row_number, draft });
            }
            Err(errors) => row_errors.push(RowError { row_number, errors }),
        }
    }

    if !row_errors.is_empty() {
        return Err(CliError::InvalidRows { errors: row_errors });
    }

    if rows.is_empty() {
        return Err(CliError::InvalidCsvFormat {
            reason: String::from("CSV contains no data rows"),
        });
    }

    Ok(rows)
}
