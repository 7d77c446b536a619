// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the clinic tariff engine.
//!
//! This crate stores the catalog, the versioned factor table, per-year
//! freeze records and the audit log in `SQLite` through Diesel, and
//! implements the engine's [`TariffStore`] and [`FactorWriter`] traits.
//!
//! ## Storage conventions
//!
//! - Decimals are stored as text so no value passes through floating point
//! - Dates are `YYYY-MM-DD`, timestamps RFC 3339
//! - Flags are `0`/`1` integers
//!
//! ## Testing Philosophy
//!
//! - Every test gets its own shared in-memory database (`new_in_memory`)
//! - Migrations are embedded and applied on open
//! - Foreign key enforcement is verified at start-up
//!
//! [`TariffStore`]: clinic_tariff::TariffStore
//! [`FactorWriter`]: clinic_tariff::FactorWriter

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use clinic_tariff_audit::AuditEvent;
use clinic_tariff_domain::{
    DepartmentId, DepartmentOverride, Factor, FinancialYear, Service, ServiceComponent, ServiceId,
    TariffTier, validate_service,
};
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod tariff_store;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

use backend::PersistenceBackend;

/// `SQLite` persistence adapter.
///
/// The connection sits behind a mutex so one adapter can be shared between
/// threads (the engine traits are `Sync`). Every public method holds the
/// lock for the duration of its statements.
pub struct Persistence {
    conn: Mutex<SqliteConnection>,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name: String = format!("memdb_tariff_{db_id}");
        let shared_memory_url: String = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        // Enable WAL mode for better read concurrency
        backend::sqlite::enable_wal_mode(&mut conn)?;

        conn.verify_foreign_key_enforcement()?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` with exclusive access to the connection.
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    ) -> Result<T, PersistenceError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| PersistenceError::ConnectionPoisoned)?;
        f(&mut *conn)
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&self) -> Result<(), PersistenceError> {
        self.with_conn(|conn| conn.verify_foreign_key_enforcement())
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Creates a department.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the insert fails.
    pub fn create_department(&self, name: &str) -> Result<DepartmentId, PersistenceError> {
        let id: i64 = self.with_conn(|conn| mutations::catalog::insert_department(conn, name))?;
        Ok(DepartmentId::new(id)?)
    }

    /// Looks up a department by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_department(&self, name: &str) -> Result<Option<DepartmentId>, PersistenceError> {
        let id: Option<i64> =
            self.with_conn(|conn| queries::catalog::find_department_id(conn, name))?;
        Ok(id.map(DepartmentId::new).transpose()?)
    }

    /// Creates a service with its components in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidService` if a live component has a
    /// non-positive coefficient, a kind has more than one live component, or
    /// the flat price is not positive. Returns an error if any insert fails.
    /// Nothing is written in either case.
    pub fn create_service(
        &self,
        title: &str,
        tier: TariffTier,
        components: &[ServiceComponent],
        flat_price: Option<Decimal>,
    ) -> Result<ServiceId, PersistenceError> {
        self.with_conn(|conn| {
            conn.immediate_transaction(|conn| {
                let service_id: ServiceId = ServiceId::new(mutations::catalog::insert_service(
                    conn, title, tier, flat_price,
                )?)?;
                let service: Service = Service::new(
                    service_id,
                    title.to_string(),
                    tier,
                    components.to_vec(),
                    flat_price,
                );
                validate_service(&service).map_err(PersistenceError::InvalidService)?;

                for component in components {
                    mutations::catalog::insert_component(conn, service_id.value(), component)?;
                }
                Ok(service_id)
            })
        })
    }

    /// Adds a component to an existing service.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidService` if the service would break
    /// the catalog rules with the component added. Returns an error if the
    /// service does not exist or the insert fails.
    pub fn add_component(
        &self,
        service_id: ServiceId,
        component: &ServiceComponent,
    ) -> Result<i64, PersistenceError> {
        self.with_conn(|conn| {
            conn.immediate_transaction(|conn| {
                if let Some(service) = queries::catalog::find_service(conn, service_id.value())? {
                    let mut components: Vec<ServiceComponent> =
                        queries::catalog::find_components(conn, service_id.value())?;
                    components.push(component.clone());
                    validate_service(&service.with_components(components))
                        .map_err(PersistenceError::InvalidService)?;
                }
                mutations::catalog::insert_component(conn, service_id.value(), component)
            })
        })
    }

    /// Stores a department override for a service.
    ///
    /// # Errors
    ///
    /// Returns an error if a live pairing already exists or the insert fails.
    pub fn create_override(&self, pairing: &DepartmentOverride) -> Result<i64, PersistenceError> {
        self.with_conn(|conn| mutations::catalog::insert_override(conn, pairing))
    }

    /// Soft-deletes a department override.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn delete_override(&self, override_id: i64) -> Result<bool, PersistenceError> {
        self.with_conn(|conn| mutations::catalog::delete_override(conn, override_id))
    }

    // ========================================================================
    // Factors & Audit
    // ========================================================================

    /// Lists every factor row of a financial year, including retired and
    /// frozen rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_factors(
        &self,
        financial_year: FinancialYear,
    ) -> Result<Vec<Factor>, PersistenceError> {
        self.with_conn(|conn| queries::factors::list_factors(conn, financial_year))
    }

    /// Retrieves audit events in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_audit_timeline(
        &self,
        financial_year: Option<FinancialYear>,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        self.with_conn(|conn| queries::audit::get_audit_timeline(conn, financial_year))
    }
}
