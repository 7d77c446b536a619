// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::admin::{FactorAdministration, FactorChange};
use crate::calculator::{CalculationRequest, CalculationResult, PriceCalculator, Quote};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::freeze::{FreezeManager, FreezeOutcome};
use crate::overrides::{OverrideResolver, ResolvedOverrides};
use crate::registry::FactorRegistry;
use crate::store::{FactorWriter, TariffStore};
use crate::validation::{FactorValidationReport, ValidationReporter};
use clinic_tariff_audit::Cause;
use clinic_tariff_domain::{
    ActorId, ComponentKind, DepartmentId, Factor, FactorDraft, FinancialYear, FreezeState,
    Service, ServiceId, TariffTier, financial_year_of,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use time::Date;

/// The tariff engine: one handle over a store, a clock and a configuration.
///
/// The engine holds no mutable state of its own and may be shared between
/// threads.
pub struct TariffEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<S> Clone for TariffEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<S: TariffStore> TariffEngine<S> {
    /// Creates a new `TariffEngine`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Creates an engine using the wall clock at the configured offset.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` if the configured offset is out of range.
    pub fn with_system_clock(store: Arc<S>, config: EngineConfig) -> Result<Self, EngineError> {
        let clock: Arc<dyn Clock> = Arc::new(config.system_clock()?);
        Ok(Self::new(store, clock, config))
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns today's date according to the engine clock.
    #[must_use]
    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Returns the current financial year.
    #[must_use]
    pub fn current_financial_year(&self) -> FinancialYear {
        financial_year_of(self.today())
    }

    /// Resolves the effective factor for a group on a date, selecting frozen
    /// rows only when the frozen-year policy lets frozen years price.
    ///
    /// # Errors
    ///
    /// See [`FactorRegistry::resolve`].
    pub fn resolve_factor(
        &self,
        kind: ComponentKind,
        tier: TariffTier,
        financial_year: FinancialYear,
        as_of: Date,
    ) -> Result<Factor, EngineError> {
        let registry: FactorRegistry<'_> = self.freeze_manager().factor_registry();
        registry.resolve(kind, tier, financial_year, as_of)
    }

    /// Resolves department overrides for a service.
    ///
    /// # Errors
    ///
    /// See [`OverrideResolver::resolve`].
    pub fn resolve_overrides(
        &self,
        service_id: ServiceId,
        department_id: Option<DepartmentId>,
    ) -> Result<ResolvedOverrides, EngineError> {
        OverrideResolver::new(&*self.store).resolve(service_id, department_id)
    }

    /// Calculates the price of a service.
    ///
    /// # Errors
    ///
    /// See [`PriceCalculator::calculate`].
    pub fn calculate(
        &self,
        service: &Service,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, EngineError> {
        self.calculator().calculate(service, request)
    }

    /// Loads a service by id and calculates its price.
    ///
    /// # Errors
    ///
    /// See [`PriceCalculator::calculate_by_id`].
    pub fn calculate_by_id(
        &self,
        service_id: ServiceId,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, EngineError> {
        self.calculator().calculate_by_id(service_id, request)
    }

    /// Loads a service by id and quotes it.
    ///
    /// # Errors
    ///
    /// See [`PriceCalculator::quote`].
    pub fn quote(
        &self,
        service_id: ServiceId,
        request: &CalculationRequest,
    ) -> Result<Quote, EngineError> {
        let calculator: PriceCalculator<'_> = self.calculator();
        let service: Service = calculator.load_service(service_id)?;
        calculator.quote(&service, request)
    }

    /// Freezes a financial year.
    ///
    /// # Errors
    ///
    /// See [`FreezeManager::freeze`].
    pub fn freeze(
        &self,
        financial_year: FinancialYear,
        actor: &ActorId,
        cause: Cause,
    ) -> Result<FreezeOutcome, EngineError> {
        self.freeze_manager().freeze(financial_year, actor, cause)
    }

    /// Returns whether a financial year is frozen.
    ///
    /// # Errors
    ///
    /// See [`FreezeManager::is_frozen`].
    pub fn is_frozen(&self, financial_year: FinancialYear) -> Result<bool, EngineError> {
        self.freeze_manager().is_frozen(financial_year)
    }

    /// Returns the freeze state of a financial year.
    ///
    /// # Errors
    ///
    /// See [`FreezeManager::freeze_state`].
    pub fn freeze_state(&self, financial_year: FinancialYear) -> Result<FreezeState, EngineError> {
        self.freeze_manager().freeze_state(financial_year)
    }

    /// Checks that every required factor resolves on `as_of`.
    ///
    /// # Errors
    ///
    /// See [`ValidationReporter::validate_required_factors`].
    pub fn validate_required_factors(
        &self,
        as_of: Option<Date>,
    ) -> Result<FactorValidationReport, EngineError> {
        ValidationReporter::new(&*self.store, &*self.clock, self.config.frozen_year_policy)
            .validate_required_factors(as_of)
    }

    fn calculator(&self) -> PriceCalculator<'_> {
        PriceCalculator::new(&*self.store, &*self.clock, &self.config)
    }

    fn freeze_manager(&self) -> FreezeManager<'_> {
        FreezeManager::new(
            &*self.store,
            &*self.clock,
            self.config.frozen_year_policy,
        )
    }
}

impl<S: FactorWriter> TariffEngine<S> {
    /// Stores a new factor.
    ///
    /// # Errors
    ///
    /// See [`FactorAdministration::create_factor`].
    pub fn create_factor(
        &self,
        draft: FactorDraft,
        actor: &ActorId,
        cause: Cause,
    ) -> Result<FactorChange, EngineError> {
        self.administration().create_factor(draft, actor, cause)
    }

    /// Replaces the value of a factor.
    ///
    /// # Errors
    ///
    /// See [`FactorAdministration::revise_factor_value`].
    pub fn revise_factor_value(
        &self,
        factor_id: i64,
        value: Decimal,
        actor: &ActorId,
        cause: Cause,
    ) -> Result<FactorChange, EngineError> {
        self.administration()
            .revise_factor_value(factor_id, value, actor, cause)
    }

    /// Retires a factor.
    ///
    /// # Errors
    ///
    /// See [`FactorAdministration::retire_factor`].
    pub fn retire_factor(
        &self,
        factor_id: i64,
        actor: &ActorId,
        cause: Cause,
    ) -> Result<FactorChange, EngineError> {
        self.administration().retire_factor(factor_id, actor, cause)
    }

    fn administration(&self) -> FactorAdministration<'_, S> {
        FactorAdministration::new(&*self.store, &*self.clock)
    }
}
