// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Versioned, effective-dated tariff factors.

use crate::error::DomainError;
use crate::freeze::FreezeState;
use crate::types::{ComponentKind, FinancialYear, TariffTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

/// An inclusive date range. An open end means the range never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePeriod {
    from: Date,
    to: Option<Date>,
}

impl EffectivePeriod {
    /// Creates a new `EffectivePeriod`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEffectivePeriod` if `to` is before `from`.
    pub fn new(from: Date, to: Option<Date>) -> Result<Self, DomainError> {
        match to {
            Some(end) if end < from => Err(DomainError::InvalidEffectivePeriod { from, to: end }),
            _ => Ok(Self { from, to }),
        }
    }

    /// Creates a period with no end date.
    #[must_use]
    pub const fn open_ended(from: Date) -> Self {
        Self { from, to: None }
    }

    /// Returns the inclusive start date.
    #[must_use]
    pub const fn from(&self) -> Date {
        self.from
    }

    /// Returns the inclusive end date, if bounded.
    #[must_use]
    pub const fn to(&self) -> Option<Date> {
        self.to
    }

    /// Returns whether `date` falls inside this period (both ends inclusive).
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        date >= self.from && self.to.is_none_or(|end| date <= end)
    }
}

/// A versioned coefficient value for one `(kind, tier, financial year)` group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    /// The identifier assigned by storage. `None` if not persisted.
    pub factor_id: Option<i64>,
    /// Which component this factor multiplies.
    pub kind: ComponentKind,
    /// The tariff tier. Professional factors are always `Standard`.
    pub tier: TariffTier,
    /// The financial year this factor belongs to.
    pub financial_year: FinancialYear,
    /// The multiplier.
    pub value: Decimal,
    /// When the factor applies.
    pub period: EffectivePeriod,
    /// Whether the factor is active.
    pub is_active: bool,
    /// Whether the factor has been soft-deleted.
    pub is_deleted: bool,
    /// Row-level freeze stamp.
    pub freeze: FreezeState,
}

impl Factor {
    /// Returns whether this row is live: active and not deleted.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    /// Returns whether this row carries a frozen stamp.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.freeze.is_frozen()
    }

    /// Returns whether this row may be selected for a lookup on `as_of`.
    ///
    /// Only live, unfrozen rows whose period covers `as_of` qualify.
    #[must_use]
    pub fn is_applicable_on(&self, as_of: Date) -> bool {
        self.is_live() && !self.is_frozen() && self.period.contains(as_of)
    }
}

/// A factor that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorDraft {
    /// Which component this factor multiplies.
    pub kind: ComponentKind,
    /// The tariff tier.
    pub tier: TariffTier,
    /// The financial year.
    pub financial_year: FinancialYear,
    /// The multiplier.
    pub value: Decimal,
    /// When the factor applies.
    pub period: EffectivePeriod,
}

impl FactorDraft {
    /// Converts the draft into an active, open factor without an id.
    #[must_use]
    pub const fn into_factor(self) -> Factor {
        Factor {
            factor_id: None,
            kind: self.kind,
            tier: self.tier,
            financial_year: self.financial_year,
            value: self.value,
            period: self.period,
            is_active: true,
            is_deleted: false,
            freeze: FreezeState::Open,
        }
    }
}
