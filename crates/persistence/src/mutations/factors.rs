// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Factor table mutations.
//!
//! Updates only touch rows without a frozen stamp. The filter is part of the
//! `UPDATE` statement, so a freeze that lands between the caller's checks
//! and the write still wins. Inserts re-check the year's freeze inside the
//! same immediate transaction for the same reason.

use clinic_tariff_domain::Factor;
use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::backend::PersistenceBackend;
use crate::data_models::NewFactorRow;
use crate::diesel_schema::factors;
use crate::error::PersistenceError;
use crate::queries::freeze::{row_freeze_stamp, year_freeze};

/// Inserts a factor row and returns its id.
///
/// Returns `None` without writing when an open row targets a frozen
/// financial year, whether frozen by its year record or by a frozen live
/// row. Rows that already carry a frozen stamp are written as given.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_factor(
    conn: &mut SqliteConnection,
    factor: &Factor,
) -> Result<Option<i64>, PersistenceError> {
    let row: NewFactorRow = NewFactorRow::from_factor(factor)?;

    conn.immediate_transaction(|conn| {
        if !factor.is_frozen()
            && (year_freeze(conn, factor.financial_year)?.is_some()
                || row_freeze_stamp(conn, factor.financial_year)?.is_some())
        {
            return Ok(None);
        }

        diesel::insert_into(factors::table)
            .values(&row)
            .execute(conn)?;

        conn.get_last_insert_rowid().map(Some)
    })
}

/// Replaces the value of an unfrozen, undeleted row.
///
/// Returns `false` when no row matched.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_factor_value(
    conn: &mut SqliteConnection,
    factor_id: i64,
    value: Decimal,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        factors::table
            .find(factor_id)
            .filter(factors::frozen_at.is_null())
            .filter(factors::is_deleted.eq(0)),
    )
    .set(factors::value.eq(value.to_string()))
    .execute(conn)?;

    Ok(updated > 0)
}

/// Marks an unfrozen row inactive.
///
/// Returns `false` when no row matched.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn deactivate_factor(conn: &mut SqliteConnection, factor_id: i64) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        factors::table
            .find(factor_id)
            .filter(factors::frozen_at.is_null())
            .filter(factors::is_deleted.eq(0)),
    )
    .set(factors::is_active.eq(0))
    .execute(conn)?;

    Ok(updated > 0)
}
