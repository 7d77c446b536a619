// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Solar (Jalali) calendar arithmetic.
//!
//! Financial years are solar years: a financial year starts on Nowruz (1
//! Farvardin) and ends on the last day of Esfand. Every place that needs the
//! financial year of a date goes through [`financial_year_of`] so that factor
//! lookups and freeze checks always agree.
//!
//! The conversion uses the 33-year arithmetic cycle and is exact for every
//! Gregorian date between 1900 and 2200, the span `FinancialYear::MIN` and
//! `FinancialYear::MAX` are drawn from.

use crate::error::DomainError;
use crate::types::FinancialYear;
use serde::{Deserialize, Serialize};
use time::Date;

/// Days elapsed in a common Gregorian year before the first of each month.
const GREGORIAN_DAYS_BEFORE_MONTH: [i64; 12] =
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// A date in the solar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolarDate {
    year: i32,
    month: u8,
    day: u8,
}

impl SolarDate {
    /// Converts a Gregorian date into the solar calendar.
    ///
    /// This is a total function: every representable `Date` maps to a solar date.
    #[must_use]
    pub fn from_gregorian(date: Date) -> Self {
        let gregorian_year: i64 = i64::from(date.year());
        let month_index: usize = usize::from(u8::from(date.month())) - 1;
        let leap_reference_year: i64 = if month_index > 1 {
            gregorian_year + 1
        } else {
            gregorian_year
        };

        let mut days: i64 = 355_666
            + 365 * gregorian_year
            + (leap_reference_year + 3).div_euclid(4)
            - (leap_reference_year + 99).div_euclid(100)
            + (leap_reference_year + 399).div_euclid(400)
            + i64::from(date.day())
            + GREGORIAN_DAYS_BEFORE_MONTH[month_index];

        let mut year: i64 = -1595 + 33 * days.div_euclid(12_053);
        days = days.rem_euclid(12_053);
        year += 4 * days.div_euclid(1461);
        days = days.rem_euclid(1461);
        if days > 365 {
            year += (days - 1).div_euclid(365);
            days = (days - 1).rem_euclid(365);
        }

        let (month, day): (i64, i64) = if days < 186 {
            (1 + days / 31, 1 + days % 31)
        } else {
            (7 + (days - 186) / 30, 1 + (days - 186) % 30)
        };

        Self {
            // A `Date` spans at most +-9999 years, so the solar year fits
            year: i32::try_from(year).unwrap_or(i32::MAX),
            month: u8::try_from(month).unwrap_or(1),
            day: u8::try_from(day).unwrap_or(1),
        }
    }

    /// Converts this solar date back into the Gregorian calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the range `time::Date` supports.
    pub fn to_gregorian(self) -> Result<Date, DomainError> {
        let solar_year: i64 = i64::from(self.year) + 1595;
        let month: i64 = i64::from(self.month);
        let month_offset: i64 = if month < 7 {
            31 * (month - 1)
        } else {
            (month - 7) * 30 + 186
        };

        let mut days: i64 = -355_668
            + 365 * solar_year
            + solar_year.div_euclid(33) * 8
            + (solar_year.rem_euclid(33) + 3).div_euclid(4)
            + i64::from(self.day)
            + month_offset;

        let mut gregorian_year: i64 = 400 * days.div_euclid(146_097);
        days = days.rem_euclid(146_097);
        if days > 36_524 {
            days -= 1;
            gregorian_year += 100 * days.div_euclid(36_524);
            days = days.rem_euclid(36_524);
            if days >= 365 {
                days += 1;
            }
        }
        gregorian_year += 4 * days.div_euclid(1461);
        days = days.rem_euclid(1461);
        if days > 365 {
            gregorian_year += (days - 1).div_euclid(365);
            days = (days - 1).rem_euclid(365);
        }

        let overflow = || DomainError::DateArithmeticOverflow {
            operation: format!(
                "converting solar date {}-{}-{} to the Gregorian calendar",
                self.year, self.month, self.day
            ),
        };
        let year: i32 = i32::try_from(gregorian_year).map_err(|_| overflow())?;
        let ordinal: u16 = u16::try_from(days + 1).map_err(|_| overflow())?;
        Date::from_ordinal_date(year, ordinal).map_err(|_| overflow())
    }

    /// Returns the solar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the solar month (1-12).
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Returns the day of the month (1-31).
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }
}

/// Returns the financial year a Gregorian date falls in.
///
/// Every date between 1900 and 2200 maps to its exact solar year. Dates
/// outside that span map to `FinancialYear::MIN` or `FinancialYear::MAX`, so
/// the result is always a year `FinancialYear::new` accepts.
#[must_use]
pub fn financial_year_of(date: Date) -> FinancialYear {
    let year: i32 = SolarDate::from_gregorian(date)
        .year()
        .clamp(i32::from(FinancialYear::MIN), i32::from(FinancialYear::MAX));
    FinancialYear::from_solar_year(u16::try_from(year).unwrap_or(FinancialYear::MIN))
}

impl FinancialYear {
    /// Returns the Gregorian date of the first day (Nowruz) of this financial year.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be represented.
    pub fn first_day(self) -> Result<Date, DomainError> {
        SolarDate {
            year: i32::from(self.value()),
            month: 1,
            day: 1,
        }
        .to_gregorian()
    }

    /// Returns the Gregorian date of the last day of this financial year.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be represented.
    pub fn last_day(self) -> Result<Date, DomainError> {
        self.next()
            .first_day()?
            .previous_day()
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("calculating the last day of financial year {self}"),
            })
    }
}
