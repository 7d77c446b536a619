// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator interfaces the engine reads rate data through.
//!
//! Stores return raw rows. All active, deleted, frozen and date filtering
//! happens in the engine so every backend resolves factors identically.

use clinic_tariff_audit::AuditEvent;
use clinic_tariff_domain::{
    ComponentKind, DepartmentId, DepartmentOverride, Factor, FinancialYear, FrozenStamp, Service,
    ServiceComponent, ServiceId, TariffTier, YearFreeze,
};
use rust_decimal::Decimal;
use thiserror::Error;

/// A failure reported by a storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct StoreError {
    /// The store operation that failed.
    pub operation: &'static str,
    /// The backend's description of the failure.
    pub message: String,
}

impl StoreError {
    /// Creates a new `StoreError`.
    #[must_use]
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// The result of a bulk freeze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeWrite {
    /// How many factor rows received a frozen stamp in this call.
    pub frozen_rows: u64,
    /// The per-year record as stored after the call.
    pub year_freeze: YearFreeze,
    /// Whether this call created the per-year record.
    pub newly_recorded: bool,
}

/// Read access to the catalog and rate tables, plus the freeze primitive.
pub trait TariffStore: Send + Sync {
    /// Loads a service header. The returned service carries no components;
    /// use [`TariffStore::find_components`] for those.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_service(&self, service_id: ServiceId) -> Result<Option<Service>, StoreError>;

    /// Loads every component of a service, including inactive and deleted rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_components(&self, service_id: ServiceId) -> Result<Vec<ServiceComponent>, StoreError>;

    /// Loads every factor row of one `(kind, tier, financial year)` group.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn factor_candidates(
        &self,
        kind: ComponentKind,
        tier: TariffTier,
        financial_year: FinancialYear,
    ) -> Result<Vec<Factor>, StoreError>;

    /// Counts live factor rows of any kind and tier for a financial year.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn count_factors(&self, financial_year: FinancialYear) -> Result<u64, StoreError>;

    /// Loads the override row for a `(service, department)` pairing, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_override(
        &self,
        service_id: ServiceId,
        department_id: DepartmentId,
    ) -> Result<Option<DepartmentOverride>, StoreError>;

    /// Loads the explicit per-year freeze record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn year_freeze(&self, financial_year: FinancialYear) -> Result<Option<YearFreeze>, StoreError>;

    /// Returns the earliest frozen stamp carried by a live factor row of the
    /// year. Rows frozen before per-year records existed are found this way.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn row_freeze_stamp(
        &self,
        financial_year: FinancialYear,
    ) -> Result<Option<FrozenStamp>, StoreError>;

    /// Freezes a financial year.
    ///
    /// Implementations must, atomically:
    /// - record the per-year freeze unless one already exists
    /// - stamp every live factor row of the year that has no frozen stamp
    ///
    /// Rows must be filtered on "not yet frozen" at update time so that
    /// concurrent calls never stamp a row twice.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn freeze_factors(
        &self,
        financial_year: FinancialYear,
        stamp: &FrozenStamp,
    ) -> Result<FreezeWrite, StoreError>;

    /// Appends an audit event and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn append_audit_event(&self, event: &AuditEvent) -> Result<i64, StoreError>;
}

/// Mutation access to the factor table.
///
/// Updates are conditional on the row not being frozen; they return `false`
/// when no row was changed.
pub trait FactorWriter: TariffStore {
    /// Loads a single factor row by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_factor(&self, factor_id: i64) -> Result<Option<Factor>, StoreError>;

    /// Inserts a new factor row and returns its id.
    ///
    /// An open row is written only while its financial year is unfrozen, checked
    /// atomically with the write. Returns `None` when the year was frozen
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert_factor(&self, factor: &Factor) -> Result<Option<i64>, StoreError>;

    /// Replaces the value of an unfrozen factor row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn update_factor_value(&self, factor_id: i64, value: Decimal) -> Result<bool, StoreError>;

    /// Marks an unfrozen factor row inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn deactivate_factor(&self, factor_id: i64) -> Result<bool, StoreError>;
}
