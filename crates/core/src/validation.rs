// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Pre-flight check that every required factor can be resolved.

use crate::clock::Clock;
use crate::error::EngineError;
use crate::freeze::{FreezeManager, FrozenYearPolicy};
use crate::registry::FactorRegistry;
use crate::store::TariffStore;
use clinic_tariff_domain::{ComponentKind, Factor, FinancialYear, TariffTier, financial_year_of};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

/// Which factors exist for a financial year on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorValidationReport {
    /// The financial year checked.
    pub financial_year: FinancialYear,
    /// The date checked.
    pub as_of: Date,
    /// Whether all three required factors resolve.
    pub is_valid: bool,
    /// One human-readable reason per missing factor.
    pub missing: Vec<String>,
    /// The resolved professional factor value.
    pub professional: Option<Decimal>,
    /// The resolved hashtagged technical factor value.
    pub technical_hashtagged: Option<Decimal>,
    /// The resolved standard technical factor value.
    pub technical_standard: Option<Decimal>,
}

impl FactorValidationReport {
    /// Returns whether a professional factor was found.
    #[must_use]
    pub const fn found_professional(&self) -> bool {
        self.professional.is_some()
    }

    /// Returns whether a hashtagged technical factor was found.
    #[must_use]
    pub const fn found_technical_hashtagged(&self) -> bool {
        self.technical_hashtagged.is_some()
    }

    /// Returns whether a standard technical factor was found.
    #[must_use]
    pub const fn found_technical_standard(&self) -> bool {
        self.technical_standard.is_some()
    }
}

/// Checks that the canonical factor combinations are defined.
///
/// Factors are looked up the way the calculator looks them up, so under
/// `FrozenYearPolicy::AllowCalculation` a frozen year still validates.
pub struct ValidationReporter<'a> {
    store: &'a dyn TariffStore,
    clock: &'a dyn Clock,
    policy: FrozenYearPolicy,
}

impl<'a> ValidationReporter<'a> {
    /// Creates a new `ValidationReporter`.
    #[must_use]
    pub const fn new(
        store: &'a dyn TariffStore,
        clock: &'a dyn Clock,
        policy: FrozenYearPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Resolves the professional factor and both technical tiers for the
    /// financial year of `as_of` (today when omitted).
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` if the store fails. Missing factors are
    /// reported, not returned as errors.
    pub fn validate_required_factors(
        &self,
        as_of: Option<Date>,
    ) -> Result<FactorValidationReport, EngineError> {
        let as_of: Date = as_of.unwrap_or_else(|| self.clock.today());
        let financial_year: FinancialYear = financial_year_of(as_of);
        let registry: FactorRegistry<'_> =
            FreezeManager::new(self.store, self.clock, self.policy).factor_registry();

        let mut missing: Vec<String> = Vec::new();
        let mut resolve =
            |kind: ComponentKind, tier: TariffTier| -> Result<Option<Decimal>, EngineError> {
                let factor: Option<Factor> =
                    registry.try_resolve(kind, tier, financial_year, as_of)?;
                if factor.is_none() {
                    missing.push(
                        EngineError::MissingFactor {
                            kind,
                            tier,
                            financial_year,
                            as_of,
                        }
                        .to_string(),
                    );
                }
                Ok(factor.map(|f| f.value))
            };

        let professional: Option<Decimal> =
            resolve(ComponentKind::Professional, TariffTier::Standard)?;
        let technical_hashtagged: Option<Decimal> =
            resolve(ComponentKind::Technical, TariffTier::Hashtagged)?;
        let technical_standard: Option<Decimal> =
            resolve(ComponentKind::Technical, TariffTier::Standard)?;

        Ok(FactorValidationReport {
            financial_year,
            as_of,
            is_valid: missing.is_empty(),
            missing,
            professional,
            technical_hashtagged,
            technical_standard,
        })
    }
}
