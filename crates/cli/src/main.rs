// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod commands;
mod csv_import;
mod error;

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use clinic_tariff::{EngineConfig, TariffEngine};
use clinic_tariff_domain::parse_iso_date;
use clinic_tariff_persistence::Persistence;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::Date;
use tracing::info;

use crate::error::CliError;

/// Clinic Tariff - price clinical services from the versioned factor table
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to a JSON engine configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate the price of a service from its components
    Calculate(PricingArgs),
    /// Price a service, using its flat price when it has no components
    Quote(PricingArgs),
    /// Freeze every factor of a financial year
    Freeze {
        /// The financial year to freeze (e.g. 1405)
        financial_year: i64,
        #[command(flatten)]
        audit: AuditArgs,
    },
    /// Show the freeze state of a financial year
    Status {
        /// The financial year (defaults to the current one)
        financial_year: Option<i64>,
    },
    /// Check that every required factor resolves
    Validate {
        /// The date to check (defaults to today)
        #[arg(long, value_parser = parse_date)]
        as_of: Option<Date>,
    },
    /// Show the financial year of a date
    YearOf {
        /// A Gregorian date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: Date,
    },
    /// Import factors from a CSV file
    ImportFactors {
        /// CSV with headers kind, hashtagged, financial_year, value, effective_from, effective_to
        path: PathBuf,
        /// Validate only; create nothing
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        audit: AuditArgs,
    },
}

/// Inputs of a price calculation.
#[derive(clap::Args, Debug, Clone)]
pub struct PricingArgs {
    /// The catalog id of the service
    service_id: i64,
    /// The department the service is performed in
    #[arg(long)]
    department: Option<i64>,
    /// The date to price on (defaults to today)
    #[arg(long, value_parser = parse_date)]
    as_of: Option<Date>,
    /// Price in this financial year instead of the year of the pricing date
    #[arg(long)]
    financial_year: Option<i64>,
}

/// Who performs an audited command, and why.
#[derive(clap::Args, Debug, Clone)]
pub struct AuditArgs {
    /// The operator performing the change
    #[arg(long)]
    actor: String,
    /// An external reference for the change (ticket, request id)
    #[arg(long, default_value = "cli")]
    cause_id: String,
    /// Why the change is made
    #[arg(long, default_value = "Command-line operation")]
    reason: String,
}

fn parse_date(value: &str) -> Result<Date, String> {
    parse_iso_date(value).map_err(|e| e.to_string())
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let text: String = read_file(path)?;
    EngineConfig::from_json(&text).map_err(|source| CliError::Config {
        path: path.display().to_string(),
        source,
    })
}

fn open_persistence(database: Option<&Path>) -> Result<Persistence, CliError> {
    let persistence: Persistence = if let Some(db_path) = database {
        info!("Using file-based database at: {}", db_path.display());
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    Ok(persistence)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    // year-of needs neither a database nor configuration
    if let Command::YearOf { date } = args.command {
        return print_json(&commands::year_of(date));
    }

    let config: EngineConfig = load_config(args.config.as_deref())?;
    let persistence: Persistence = open_persistence(args.database.as_deref())?;
    let engine: TariffEngine<Persistence> =
        TariffEngine::with_system_clock(Arc::new(persistence), config)?;

    match args.command {
        Command::Calculate(pricing) => print_json(&commands::calculate(&engine, &pricing)?),
        Command::Quote(pricing) => print_json(&commands::quote(&engine, &pricing)?),
        Command::Freeze {
            financial_year,
            audit,
        } => print_json(&commands::freeze(&engine, financial_year, &audit)?),
        Command::Status { financial_year } => {
            print_json(&commands::status(&engine, financial_year)?)
        }
        Command::Validate { as_of } => {
            let (report, failure) = commands::validate(&engine, as_of)?;
            print_json(&report)?;
            failure.map_or(Ok(()), Err)
        }
        Command::ImportFactors {
            path,
            dry_run,
            audit,
        } => {
            let content: String = read_file(&path)?;
            match commands::import_factors(&engine, &content, &audit, dry_run) {
                Ok(summary) => print_json(&summary),
                Err(CliError::InvalidRows { errors }) => {
                    for row_error in &errors {
                        eprintln!("{row_error}");
                    }
                    Err(CliError::InvalidRows { errors })
                }
                Err(e) => Err(e),
            }
        }
        Command::YearOf { date } => print_json(&commands::year_of(date)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing clinic tariff engine");

    run(args)?;
    Ok(())
}
