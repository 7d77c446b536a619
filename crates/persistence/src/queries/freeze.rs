// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Freeze record queries.

use clinic_tariff_domain::{FinancialYear, FreezeState, FrozenStamp, YearFreeze};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{YearFreezeRow, decode_freeze};
use crate::diesel_schema::{factors, financial_year_freezes};
use crate::error::PersistenceError;

/// Loads the per-year freeze record.
///
/// # Errors
///
/// Returns an error if the query fails or the row is invalid.
pub fn year_freeze(
    conn: &mut SqliteConnection,
    financial_year: FinancialYear,
) -> Result<Option<YearFreeze>, PersistenceError> {
    let row: Option<YearFreezeRow> = financial_year_freezes::table
        .find(i32::from(financial_year.value()))
        .select(YearFreezeRow::as_select())
        .first(conn)
        .optional()?;

    row.map(YearFreezeRow::into_year_freeze).transpose()
}

/// Returns the earliest frozen stamp on a live factor row of the year.
///
/// Stamps are compared as instants, not as stored text, since rows may
/// carry different UTC offsets.
///
/// # Errors
///
/// Returns an error if the query fails or a stamp is invalid.
pub fn row_freeze_stamp(
    conn: &mut SqliteConnection,
    financial_year: FinancialYear,
) -> Result<Option<FrozenStamp>, PersistenceError> {
    let stamps: Vec<(Option<String>, Option<String>)> = factors::table
        .filter(factors::financial_year.eq(i32::from(financial_year.value())))
        .filter(factors::is_active.eq(1))
        .filter(factors::is_deleted.eq(0))
        .filter(factors::frozen_at.is_not_null())
        .select((factors::frozen_at, factors::frozen_by))
        .load(conn)?;

    let mut frozen: Vec<FrozenStamp> = Vec::with_capacity(stamps.len());
    for (frozen_at, frozen_by) in stamps {
        if let FreezeState::Frozen(stamp) = decode_freeze("factors", frozen_at, frozen_by)? {
            frozen.push(stamp);
        }
    }

    Ok(frozen.into_iter().min_by_key(|stamp| stamp.at))
}
