// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Financial-year freeze.

use clinic_tariff::FreezeWrite;
use clinic_tariff_domain::{FinancialYear, FrozenStamp, YearFreeze};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::data_models::{YearFreezeRow, encode_timestamp};
use crate::diesel_schema::{factors, financial_year_freezes};
use crate::error::PersistenceError;

/// Freezes a financial year in one immediate transaction.
///
/// The per-year record is inserted only if absent (the year is its primary
/// key). Live factor rows of the year without a frozen stamp receive
/// `stamp`; rows that already carry one are left untouched.
///
/// # Errors
///
/// Returns an error if any statement fails; nothing is written in that case.
pub fn freeze_financial_year(
    conn: &mut SqliteConnection,
    financial_year: FinancialYear,
    stamp: &FrozenStamp,
) -> Result<FreezeWrite, PersistenceError> {
    let year: i32 = i32::from(financial_year.value());
    let frozen_at: String = encode_timestamp(stamp.at)?;
    let frozen_by: &str = stamp.by.value();

    conn.immediate_transaction(|conn| {
        let inserted: usize = diesel::insert_or_ignore_into(financial_year_freezes::table)
            .values((
                financial_year_freezes::financial_year.eq(year),
                financial_year_freezes::frozen_at.eq(&frozen_at),
                financial_year_freezes::frozen_by.eq(frozen_by),
            ))
            .execute(conn)?;

        let year_freeze: YearFreeze = financial_year_freezes::table
            .find(year)
            .select(YearFreezeRow::as_select())
            .first(conn)?
            .into_year_freeze()?;

        let frozen_rows: usize = diesel::update(
            factors::table
                .filter(factors::financial_year.eq(year))
                .filter(factors::is_active.eq(1))
                .filter(factors::is_deleted.eq(0))
                .filter(factors::frozen_at.is_null()),
        )
        .set((
            factors::frozen_at.eq(&frozen_at),
            factors::frozen_by.eq(frozen_by),
        ))
        .execute(conn)?;

        debug!(
            financial_year = year,
            frozen_rows,
            newly_recorded = inserted > 0,
            "Froze financial year rows"
        );

        Ok(FreezeWrite {
            frozen_rows: u64::try_from(frozen_rows).unwrap_or(u64::MAX),
            year_freeze,
            newly_recorded: inserted > 0,
        })
    })
}
