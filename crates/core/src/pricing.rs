// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pricing mode selection.
//!
//! A calculation runs in exactly one mode, chosen once before any factor is
//! read:
//!
//! - `FactorTable`: factors come from the versioned registry
//! - `LegacyFixed`: factors are fixed constants; only chosen when legacy
//!   fallback is configured and the financial year has no factor rows at all

use crate::error::EngineError;
use crate::store::TariffStore;
use clinic_tariff_domain::{ComponentKind, FinancialYear, TariffTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fixed factor constants for the legacy pricing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegacyTariff {
    /// Technical factor for `Standard` services.
    pub standard_technical: Decimal,
    /// Technical factor for `Hashtagged` services.
    pub hashtagged_technical: Decimal,
    /// Professional factor for every service.
    pub professional: Decimal,
}

impl LegacyTariff {
    /// Returns the constant for a component of `kind` on a service of `tier`.
    #[must_use]
    pub const fn value_for(&self, kind: ComponentKind, tier: TariffTier) -> Decimal {
        match (kind, tier) {
            (ComponentKind::Technical, TariffTier::Standard) => self.standard_technical,
            (ComponentKind::Technical, TariffTier::Hashtagged) => self.hashtagged_technical,
            (ComponentKind::Professional, _) => self.professional,
        }
    }
}

impl Default for LegacyTariff {
    fn default() -> Self {
        Self {
            standard_technical: Decimal::new(31_000, 0),
            hashtagged_technical: Decimal::new(65_000, 0),
            professional: Decimal::new(41_000, 0),
        }
    }
}

/// How factor values are obtained for one calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum PricingMode {
    /// Resolve factors from the versioned registry.
    FactorTable,
    /// Use fixed constants.
    LegacyFixed(LegacyTariff),
}

impl PricingMode {
    /// Chooses the pricing mode for a financial year.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` if counting factor rows fails.
    pub fn select(
        store: &dyn TariffStore,
        legacy_fallback: Option<&LegacyTariff>,
        financial_year: FinancialYear,
    ) -> Result<Self, EngineError> {
        let Some(legacy) = legacy_fallback else {
            return Ok(Self::FactorTable);
        };

        if store.count_factors(financial_year)? > 0 {
            return Ok(Self::FactorTable);
        }

        warn!(
            %financial_year,
            "No factor rows for financial year, using legacy fixed tariff"
        );
        Ok(Self::LegacyFixed(*legacy))
    }

    /// Returns the mode name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FactorTable => "FactorTable",
            Self::LegacyFixed(_) => "LegacyFixed",
        }
    }
}

impl std::fmt::Display for PricingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
