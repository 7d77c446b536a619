// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Effective-dated factor lookup.

use crate::error::EngineError;
use crate::store::TariffStore;
use clinic_tariff_domain::{ComponentKind, Factor, FinancialYear, TariffTier};
use time::Date;
use tracing::debug;

/// Resolves the single effective factor for a group and date.
pub struct FactorRegistry<'a> {
    store: &'a dyn TariffStore,
    include_frozen: bool,
}

impl<'a> FactorRegistry<'a> {
    /// Creates a registry reading from `store`. Frozen rows are never selected.
    #[must_use]
    pub const fn new(store: &'a dyn TariffStore) -> Self {
        Self {
            store,
            include_frozen: false,
        }
    }

    /// Creates a registry that also selects frozen rows.
    ///
    /// Only used when frozen years may still be priced.
    #[must_use]
    pub const fn including_frozen(store: &'a dyn TariffStore) -> Self {
        Self {
            store,
            include_frozen: true,
        }
    }

    /// Resolves the effective factor for `(kind, tier, financial_year)` on `as_of`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingFactor` if no row applies, or
    /// `EngineError::Store` if the store fails.
    pub fn resolve(
        &self,
        kind: ComponentKind,
        tier: TariffTier,
        financial_year: FinancialYear,
        as_of: Date,
    ) -> Result<Factor, EngineError> {
        self.try_resolve(kind, tier, financial_year, as_of)?
            .ok_or(EngineError::MissingFactor {
                kind,
                tier,
                financial_year,
                as_of,
            })
    }

    /// Like [`FactorRegistry::resolve`], but reports absence as `None`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` if the store fails.
    pub fn try_resolve(
        &self,
        kind: ComponentKind,
        tier: TariffTier,
        financial_year: FinancialYear,
        as_of: Date,
    ) -> Result<Option<Factor>, EngineError> {
        let candidates: Vec<Factor> = self.store.factor_candidates(kind, tier, financial_year)?;
        let selected: Option<&Factor> = if self.include_frozen {
            select_effective_including_frozen(&candidates, kind, tier, financial_year, as_of)
        } else {
            select_effective(&candidates, kind, tier, financial_year, as_of)
        };

        debug!(
            %kind,
            %tier,
            %financial_year,
            %as_of,
            candidates = candidates.len(),
            factor_id = ?selected.and_then(|f| f.factor_id),
            "Resolved factor"
        );

        Ok(selected.cloned())
    }
}

/// Selects the effective factor among `candidates`.
///
/// A row qualifies when its kind, tier and financial year match exactly, it
/// is active, not deleted, not frozen, and its period contains `as_of`. The
/// qualifying row with the latest effective-from date wins. Rows starting on
/// the same date are ordered by id, so the most recently stored row wins.
#[must_use]
pub fn select_effective(
    candidates: &[Factor],
    kind: ComponentKind,
    tier: TariffTier,
    financial_year: FinancialYear,
    as_of: Date,
) -> Option<&Factor> {
    latest_start(
        candidates
            .iter()
            .filter(|f| f.kind == kind && f.tier == tier && f.financial_year == financial_year)
            .filter(|f| f.is_applicable_on(as_of)),
    )
}

/// Like [`select_effective`], but frozen rows also qualify.
#[must_use]
pub fn select_effective_including_frozen(
    candidates: &[Factor],
    kind: ComponentKind,
    tier: TariffTier,
    financial_year: FinancialYear,
    as_of: Date,
) -> Option<&Factor> {
    latest_start(
        candidates
            .iter()
            .filter(|f| f.kind == kind && f.tier == tier && f.financial_year == financial_year)
            .filter(|f| f.is_live() && f.period.contains(as_of)),
    )
}

fn latest_start<'f>(factors: impl Iterator<Item = &'f Factor>) -> Option<&'f Factor> {
    factors.max_by_key(|f| (f.period.from(), f.factor_id))
}
