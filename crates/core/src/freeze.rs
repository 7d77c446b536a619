// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Financial year freeze lifecycle.
//!
//! A year is frozen once its per-year record exists. Rows frozen before
//! per-year records were kept still close their year. `Open -> Frozen` is the
//! only transition and nothing here reopens a year.

use crate::clock::Clock;
use crate::error::EngineError;
use crate::registry::FactorRegistry;
use crate::store::{FreezeWrite, TariffStore};
use clinic_tariff_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clinic_tariff_domain::{ActorId, FinancialYear, FreezeState, FrozenStamp};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What a frozen year means for price calculation.
///
/// Factor edits are always rejected for frozen years. This policy only
/// decides whether prices may still be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrozenYearPolicy {
    /// Refuse to calculate prices for a frozen year.
    #[default]
    BlockCalculation,
    /// Keep calculating prices for a frozen year.
    AllowCalculation,
}

/// The result of a freeze call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreezeOutcome {
    /// The year that was frozen.
    pub financial_year: FinancialYear,
    /// Factor rows stamped by this call. Informational only; concurrent
    /// callers may each see a partial count.
    pub frozen_count: u64,
    /// The year's freeze stamp. On a repeat call this is the original stamp.
    pub stamp: FrozenStamp,
    /// Whether this call moved the year from `Open` to `Frozen`.
    pub newly_frozen_year: bool,
    /// The audit event recorded for this call.
    pub audit_event: AuditEvent,
}

/// Freezes financial years and gates work on frozen years.
pub struct FreezeManager<'a> {
    store: &'a dyn TariffStore,
    clock: &'a dyn Clock,
    policy: FrozenYearPolicy,
}

impl<'a> FreezeManager<'a> {
    /// Creates a new `FreezeManager`.
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

    /// Returns the freeze state of a financial year.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` if the store fails.
    pub fn freeze_state(&self, financial_year: FinancialYear) -> Result<FreezeState, EngineError> {
        if let Some(record) = self.store.year_freeze(financial_year)? {
            return Ok(FreezeState::Frozen(record.stamp));
        }

        Ok(self
            .store
            .row_freeze_stamp(financial_year)?
            .map_or(FreezeState::Open, FreezeState::Frozen))
    }

    /// Returns whether a financial year is frozen.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` if the store fails.
    pub fn is_frozen(&self, financial_year: FinancialYear) -> Result<bool, EngineError> {
        Ok(self.freeze_state(financial_year)?.is_frozen())
    }

    /// Checks whether a price may be calculated for a financial year.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::FrozenYear` if the year is frozen and the policy
    /// blocks calculation.
    pub fn guard_calculation(&self, financial_year: FinancialYear) -> Result<(), EngineError> {
        match self.policy {
            FrozenYearPolicy::AllowCalculation => Ok(()),
            FrozenYearPolicy::BlockCalculation => self.guard_mutation(financial_year),
        }
    }

    /// Returns whether frozen factor rows may be used to price.
    #[must_use]
    pub const fn frozen_rows_selectable(&self) -> bool {
        matches!(self.policy, FrozenYearPolicy::AllowCalculation)
    }

    /// Returns the factor registry every pricing-side lookup goes through.
    ///
    /// Frozen rows are selected only when the policy lets frozen years price,
    /// so the calculator and the pre-flight check always see the same rows.
    #[must_use]
    pub const fn factor_registry(&self) -> FactorRegistry<'a> {
        if self.frozen_rows_selectable() {
            FactorRegistry::including_frozen(self.store)
        } else {
            FactorRegistry::new(self.store)
        }
    }

    /// Checks whether rate data of a financial year may be changed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::FrozenYear` if the year is frozen.
    pub fn guard_mutation(&self, financial_year: FinancialYear) -> Result<(), EngineError> {
        if self.is_frozen(financial_year)? {
            return Err(EngineError::FrozenYear { financial_year });
        }
        Ok(())
    }

    /// Freezes a financial year.
    ///
    /// Records the per-year freeze if it does not exist yet and stamps every
    /// live, unfrozen factor row of the year. Calling this again is safe: rows
    /// added since the last call are frozen, already frozen rows are not
    /// counted again.
    ///
    /// # Arguments
    ///
    /// * `financial_year` - The year to freeze
    /// * `actor` - Who is freezing the year
    /// * `cause` - Why the year is being frozen
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` if the store fails.
    pub fn freeze(
        &self,
        financial_year: FinancialYear,
        actor: &ActorId,
        cause: Cause,
    ) -> Result<FreezeOutcome, EngineError> {
        let before: FreezeState = self.freeze_state(financial_year)?;
        let requested: FrozenStamp = FrozenStamp::new(self.clock.now(), actor.clone());

        let write: FreezeWrite = self.store.freeze_factors(financial_year, &requested)?;
        let after: FreezeState = FreezeState::Frozen(write.year_freeze.stamp.clone());

        let action: Action = Action::new(
            String::from("FreezeFinancialYear"),
            Some(format!(
                "Froze {} factor rows of financial year {financial_year}",
                write.frozen_rows
            )),
        );
        let audit_event: AuditEvent = AuditEvent::new(
            Actor::operator(actor),
            cause,
            action,
            StateSnapshot::json(&before),
            StateSnapshot::json(&after),
        )
        .for_financial_year(financial_year);
        let event_id: i64 = self.store.append_audit_event(&audit_event)?;

        if write.frozen_rows == 0 {
            warn!(%financial_year, "Freeze stamped no factor rows");
        }
        info!(
            %financial_year,
            actor = %actor,
            frozen_count = write.frozen_rows,
            newly_frozen_year = write.newly_recorded,
            "Froze financial year"
        );

        Ok(FreezeOutcome {
            financial_year,
            frozen_count: write.frozen_rows,
            stamp: write.year_freeze.stamp,
            newly_frozen_year: write.newly_recorded,
            audit_event: audit_event.with_event_id(event_id),
        })
    }
}
