// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Build, lint and test entry points for the tariff workspace.
//!
//! - `cargo xtask ci` runs everything CI runs
//! - `cargo xtask verify-migrations` applies, reverts and reapplies the
//!   tariff schema and fails if the second pass differs from the first

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::BTreeMap;
use std::{io, process::Output};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context, eyre::eyre};
use diesel::sql_types::Text;
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the persistence crate maps.
const TARIFF_TABLES: [&str; 7] = [
    "audit_events",
    "department_service_overrides",
    "departments",
    "factors",
    "financial_year_freezes",
    "service_components",
    "services",
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Lint, build, test and verify migrations
    CI,

    /// Build every target
    #[command(visible_alias = "b")]
    Build,

    /// Run clippy, rustdoc and rustfmt checks
    #[command(visible_alias = "l")]
    Lint,

    /// Apply clippy suggestions
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Reformat the workspace
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run unit and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Check that the migrations apply, revert and reapply cleanly
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => {
                lint()?;
                build()?;
                test()?;
                verify_migrations()
            }
            Self::Build => build(),
            Self::Lint => lint(),
            Self::FixClippy => run_cargo(&[
                "clippy",
                "--all-targets",
                "--fix",
                "--allow-dirty",
                "--allow-staged",
            ]),
            Self::FixFormatting => run_cargo_nightly(&["fmt", "--all"]),
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

fn build() -> Result<()> {
    run_cargo(&["build", "--workspace", "--all-targets"])
}

fn lint() -> Result<()> {
    run_cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    cmd("cargo", ["doc", "--workspace", "--no-deps"])
        .env("RUSTDOCFLAGS", "-D warnings")
        .run_with_trace()?;
    run_cargo_nightly(&["fmt", "--all", "--check"])
}

fn test() -> Result<()> {
    run_cargo(&["test", "--workspace", "--all-targets"])?;
    run_cargo(&["test", "--workspace", "--doc"])
}

fn run_cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

fn run_cargo_nightly(args: &[&str]) -> Result<()> {
    cmd("cargo", args)
        // set by cargo when running an xtask; it would pin the stable toolchain
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

#[derive(QueryableByName)]
struct SchemaObject {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Text)]
    sql: String,
}

/// Table and index definitions keyed by object name.
type SchemaSnapshot = BTreeMap<String, String>;

fn snapshot_schema(conn: &mut SqliteConnection) -> Result<SchemaSnapshot> {
    let objects: Vec<SchemaObject> = diesel::sql_query(
        "SELECT name, sql FROM sqlite_master \
         WHERE type IN ('table', 'index') AND sql IS NOT NULL \
         AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' \
         ORDER BY name",
    )
    .load(conn)
    .wrap_err("failed to read sqlite_master")?;

    Ok(objects
        .into_iter()
        .map(|object| (object.name, object.sql))
        .collect())
}

/// Applies every migration to an in-memory database, checks the tariff
/// tables exist, reverts everything, reapplies, and compares both passes.
fn verify_migrations() -> Result<()> {
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("failed to open in-memory SQLite database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("failed to enable foreign keys")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to apply migrations: {e}"))?;
    let applied: SchemaSnapshot = snapshot_schema(&mut conn)?;

    let missing: Vec<&str> = TARIFF_TABLES
        .into_iter()
        .filter(|table| !applied.contains_key(*table))
        .collect();
    if !missing.is_empty() {
        return Err(eyre!("migrations do not create tables {missing:?}"));
    }

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to revert migrations: {e}"))?;
    let reverted: SchemaSnapshot = snapshot_schema(&mut conn)?;
    if !reverted.is_empty() {
        return Err(eyre!(
            "objects left after revert: {:?}",
            reverted.keys().collect::<Vec<_>>()
        ));
    }

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to reapply migrations: {e}"))?;
    let reapplied: SchemaSnapshot = snapshot_schema(&mut conn)?;

    for (name, sql) in &applied {
        match reapplied.get(name) {
            Some(again) if again == sql => {}
            Some(again) => {
                return Err(eyre!(
                    "{name} changed on reapply\n  first: {sql}\n  again: {again}"
                ));
            }
            None => return Err(eyre!("{name} was not recreated")),
        }
    }
    if let Some(extra) = reapplied.keys().find(|name| !applied.contains_key(*name)) {
        return Err(eyre!("{extra} only exists after reapplying"));
    }

    tracing::info!(objects = applied.len(), "migrations round-trip cleanly");
    Ok(())
}

/// Logs a `duct::Expression` before running it.
trait ExpressionExt {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
