// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clinic_tariff::EngineError;
use clinic_tariff_domain::DomainError;
use clinic_tariff_persistence::PersistenceError;
use thiserror::Error;

use crate::csv_import::RowError;

/// Errors reported by the command-line tool.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// The configuration file is invalid.
    #[error("Invalid configuration in {path}: {source}")]
    Config { path: String, source: EngineError },

    /// The CSV file is structurally invalid.
    #[error("Invalid CSV format: {reason}")]
    InvalidCsvFormat { reason: String },

    /// One or more CSV rows failed validation. Nothing was imported.
    #[error("{} invalid row(s); nothing was imported", errors.len())]
    InvalidRows { errors: Vec<RowError> },

    /// The pre-flight factor check found gaps.
    #[error("{missing} required factor(s) missing")]
    ValidationFailed { missing: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}
