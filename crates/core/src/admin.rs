// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Administrative changes to the factor table.
//!
//! Every change is refused once the factor's financial year is frozen, and
//! every successful change is recorded as an audit event.

use crate::clock::Clock;
use crate::error::EngineError;
use crate::freeze::{FreezeManager, FrozenYearPolicy};
use crate::store::FactorWriter;
use clinic_tariff_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clinic_tariff_domain::{
    ActorId, Factor, FactorDraft, validate_factor_draft, validate_factor_value,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

/// The result of a successful factor change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorChange {
    /// The factor as stored after the change.
    pub factor: Factor,
    /// The audit event recorded for the change.
    pub audit_event: AuditEvent,
}

/// Creates, revises and retires factors.
pub struct FactorAdministration<'a, W: FactorWriter> {
    store: &'a W,
    clock: &'a dyn Clock,
}

impl<'a, W: FactorWriter> FactorAdministration<'a, W> {
    /// Creates a new `FactorAdministration`.
    #[must_use]
    pub const fn new(store: &'a W, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Stores a new factor.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The draft violates a domain rule
    /// - The draft's financial year is frozen
    /// - The store fails
    pub fn create_factor(
        &self,
        draft: FactorDraft,
        actor: &ActorId,
        cause: Cause,
    ) -> Result<FactorChange, EngineError> {
        validate_factor_draft(&draft)?;
        self.freeze_manager().guard_mutation(draft.financial_year)?;

        let mut factor: Factor = draft.into_factor();
        let Some(factor_id) = self.store.insert_factor(&factor)? else {
            return Err(EngineError::FrozenYear {
                financial_year: factor.financial_year,
            });
        };
        factor.factor_id = Some(factor_id);

        let action: Action = Action::new(
            String::from("CreateFactor"),
            Some(format!(
                "Created {} {} factor {factor_id} for financial year {}",
                factor.kind, factor.tier, factor.financial_year
            )),
        );
        let audit_event: AuditEvent =
            self.record(actor, cause, action, StateSnapshot::absent(), &factor)?;

        info!(
            factor_id,
            kind = %factor.kind,
            tier = %factor.tier,
            financial_year = %factor.financial_year,
            value = %factor.value,
            "Created factor"
        );

        Ok(FactorChange {
            factor,
            audit_event,
        })
    }

    /// Replaces the value of a factor.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No live factor has `factor_id`
    /// - The factor or its financial year is frozen
    /// - The factor has been retired
    /// - The value is not positive
    /// - The store fails
    pub fn revise_factor_value(
        &self,
        factor_id: i64,
        value: Decimal,
        actor: &ActorId,
        cause: Cause,
    ) -> Result<FactorChange, EngineError> {
        let current: Factor = self.load_mutable(factor_id)?;
        validate_factor_value(current.kind, value)?;

        // The store re-checks the frozen stamp, so a concurrent freeze wins
        if !self.store.update_factor_value(factor_id, value)? {
            return Err(EngineError::FrozenYear {
                financial_year: current.financial_year,
            });
        }

        let mut revised: Factor = current.clone();
        revised.value = value;

        let action: Action = Action::new(
            String::from("ReviseFactor"),
            Some(format!(
                "Revised factor {factor_id} from {} to {value}",
                current.value
            )),
        );
        let audit_event: AuditEvent =
            self.record(actor, cause, action, StateSnapshot::json(&current), &revised)?;

        info!(factor_id, old = %current.value, new = %value, "Revised factor");

        Ok(FactorChange {
            factor: revised,
            audit_event,
        })
    }

    /// Deactivates a factor so it is no longer selected.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No live factor has `factor_id`
    /// - The factor or its financial year is frozen
    /// - The factor has already been retired
    /// - The store fails
    pub fn retire_factor(
        &self,
        factor_id: i64,
        actor: &ActorId,
        cause: Cause,
    ) -> Result<FactorChange, EngineError> {
        let current: Factor = self.load_mutable(factor_id)?;

        if !self.store.deactivate_factor(factor_id)? {
            return Err(EngineError::FrozenYear {
                financial_year: current.financial_year,
            });
        }

        let mut retired: Factor = current.clone();
        retired.is_active = false;

        let action: Action = Action::new(
            String::from("RetireFactor"),
            Some(format!("Retired factor {factor_id}")),
        );
        let audit_event: AuditEvent =
            self.record(actor, cause, action, StateSnapshot::json(&current), &retired)?;

        info!(factor_id, "Retired factor");

        Ok(FactorChange {
            factor: retired,
            audit_event,
        })
    }

    fn freeze_manager(&self) -> FreezeManager<'a> {
        // Mutation is blocked for frozen years under every policy
        FreezeManager::new(self.store, self.clock, FrozenYearPolicy::BlockCalculation)
    }

    fn load_mutable(&self, factor_id: i64) -> Result<Factor, EngineError> {
        let factor: Factor = self
            .store
            .get_factor(factor_id)?
            .filter(|f| !f.is_deleted)
            .ok_or(EngineError::FactorNotFound { factor_id })?;

        if factor.is_frozen() {
            return Err(EngineError::FrozenYear {
                financial_year: factor.financial_year,
            });
        }
        self.freeze_manager().guard_mutation(factor.financial_year)?;

        if !factor.is_active {
            return Err(EngineError::invalid_input(
                "factor_id",
                format!("factor {factor_id} has been retired"),
            ));
        }

        Ok(factor)
    }

    fn record(
        &self,
        actor: &ActorId,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: &Factor,
    ) -> Result<AuditEvent, EngineError> {
        let audit_event: AuditEvent = AuditEvent::new(
            Actor::operator(actor),
            cause,
            action,
            before,
            StateSnapshot::json(after),
        )
        .for_financial_year(after.financial_year);
        let event_id: i64 = self.store.append_audit_event(&audit_event)?;
        Ok(audit_event.with_event_id(event_id))
    }
}
