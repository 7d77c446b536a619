// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Factor table queries.
//!
//! These return raw rows. Selection of the effective factor happens in the
//! engine.

use clinic_tariff_domain::{ComponentKind, Factor, FinancialYear, TariffTier};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{FactorRow, encode_flag};
use crate::diesel_schema::factors;
use crate::error::PersistenceError;

/// Loads every row of one `(kind, tier, financial year)` group.
///
/// # Errors
///
/// Returns an error if the query fails or a row is invalid.
pub fn factor_candidates(
    conn: &mut SqliteConnection,
    kind: ComponentKind,
    tier: TariffTier,
    financial_year: FinancialYear,
) -> Result<Vec<Factor>, PersistenceError> {
    let rows: Vec<FactorRow> = factors::table
        .filter(factors::kind.eq(kind.as_str()))
        .filter(factors::is_hashtagged.eq(encode_flag(tier.is_hashtagged())))
        .filter(factors::financial_year.eq(i32::from(financial_year.value())))
        .order(factors::factor_id.asc())
        .select(FactorRow::as_select())
        .load(conn)?;

    rows.into_iter().map(FactorRow::into_factor).collect()
}

/// Loads every row of a financial year, regardless of kind or state.
///
/// # Errors
///
/// Returns an error if the query fails or a row is invalid.
pub fn list_factors(
    conn: &mut SqliteConnection,
    financial_year: FinancialYear,
) -> Result<Vec<Factor>, PersistenceError> {
    let rows: Vec<FactorRow> = factors::table
        .filter(factors::financial_year.eq(i32::from(financial_year.value())))
        .order(factors::factor_id.asc())
        .select(FactorRow::as_select())
        .load(conn)?;

    rows.into_iter().map(FactorRow::into_factor).collect()
}

/// Loads a single factor row.
///
/// # Errors
///
/// Returns an error if the query fails or the row is invalid.
pub fn get_factor(
    conn: &mut SqliteConnection,
    factor_id: i64,
) -> Result<Option<Factor>, PersistenceError> {
    let row: Option<FactorRow> = factors::table
        .find(factor_id)
        .select(FactorRow::as_select())
        .first(conn)
        .optional()?;

    row.map(FactorRow::into_factor).transpose()
}

/// Counts live rows of any kind and tier in a financial year.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_live_factors(
    conn: &mut SqliteConnection,
    financial_year: FinancialYear,
) -> Result<u64, PersistenceError> {
    let count: i64 = factors::table
        .filter(factors::financial_year.eq(i32::from(financial_year.value())))
        .filter(factors::is_active.eq(1))
        .filter(factors::is_deleted.eq(0))
        .count()
        .get_result(conn)?;

    u64::try_from(count)
        .map_err(|_| PersistenceError::QueryFailed(format!("Negative row count: {count}")))
}
