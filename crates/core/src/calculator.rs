// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Price calculation.
//!
//! `total = technical coefficient * technical factor
//!        + professional coefficient * professional factor`
//!
//! Failures are checked in a fixed order: frozen year, missing components,
//! missing professional factor, missing technical factor. A failed
//! calculation never yields a partial price.

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::freeze::FreezeManager;
use crate::overrides::{AppliedOverride, OverrideResolver, ResolvedOverrides};
use crate::pricing::PricingMode;
use crate::registry::FactorRegistry;
use crate::store::TariffStore;
use clinic_tariff_domain::{
    ComponentKind, DepartmentId, DomainError, Factor, FinancialYear, Service, ServiceComponent,
    ServiceId, TariffTier, financial_year_of, validate_component,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::debug;

/// Optional inputs of a price calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The department the service is performed in.
    pub department_id: Option<DepartmentId>,
    /// The date to price on. Defaults to today.
    pub as_of: Option<Date>,
    /// The financial year to price in. Defaults to the year of `as_of`.
    pub financial_year: Option<FinancialYear>,
}

impl CalculationRequest {
    /// Creates a request priced today, without a department.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            department_id: None,
            as_of: None,
            financial_year: None,
        }
    }

    /// Returns this request scoped to a department.
    #[must_use]
    pub const fn in_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    /// Returns this request priced on `date`.
    #[must_use]
    pub const fn on(mut self, date: Date) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Returns this request priced in an explicit financial year.
    ///
    /// The year may differ from the natural year of the pricing date, which
    /// allows historical recomputation.
    #[must_use]
    pub const fn for_financial_year(mut self, financial_year: FinancialYear) -> Self {
        self.financial_year = Some(financial_year);
        self
    }
}

/// Where a final factor value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorSource {
    /// The versioned factor registry.
    Registry,
    /// The legacy fixed constants.
    Legacy,
    /// A department override.
    Override,
}

/// The priced breakdown of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLine {
    /// The component kind.
    pub kind: ComponentKind,
    /// The component's coefficient.
    pub coefficient: Decimal,
    /// The factor from the registry or the legacy constants.
    pub base_factor: Decimal,
    /// The registry row the base factor came from.
    pub registry_factor_id: Option<i64>,
    /// The factor actually applied.
    pub final_factor: Decimal,
    /// Where `final_factor` came from.
    pub source: FactorSource,
    /// `coefficient * final_factor`.
    pub amount: Decimal,
}

/// A computed price and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// The priced service.
    pub service_id: ServiceId,
    /// The service's tariff tier.
    pub tier: TariffTier,
    /// The department, if one was given.
    pub department_id: Option<DepartmentId>,
    /// The pricing date.
    pub as_of: Date,
    /// The financial year the factors were taken from.
    pub financial_year: FinancialYear,
    /// The mode factors were obtained in.
    pub pricing_mode: PricingMode,
    /// The technical line.
    pub technical: ComponentLine,
    /// The professional line.
    pub professional: ComponentLine,
    /// The technical amount.
    pub technical_amount: Decimal,
    /// The professional amount.
    pub professional_amount: Decimal,
    /// The price.
    pub total: Decimal,
    /// Which axes a department override replaced.
    pub applied_override: AppliedOverride,
}

/// A price for a service, computed or taken from its flat price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Quote {
    /// A price computed from factors.
    Computed(CalculationResult),
    /// The service's flat price. Only used for services without components.
    FlatPrice {
        /// The priced service.
        service_id: ServiceId,
        /// The flat price.
        price: Decimal,
    },
}

impl Quote {
    /// Returns the quoted price.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        match self {
            Self::Computed(result) => result.total,
            Self::FlatPrice { price, .. } => *price,
        }
    }
}

/// A factor value before overrides are applied.
struct BaseFactor {
    value: Decimal,
    factor_id: Option<i64>,
    source: FactorSource,
}

impl From<Factor> for BaseFactor {
    fn from(factor: Factor) -> Self {
        Self {
            value: factor.value,
            factor_id: factor.factor_id,
            source: FactorSource::Registry,
        }
    }
}

/// Computes service prices.
pub struct PriceCalculator<'a> {
    store: &'a dyn TariffStore,
    clock: &'a dyn Clock,
    config: &'a EngineConfig,
}

impl<'a> PriceCalculator<'a> {
    /// Creates a new `PriceCalculator`.
    #[must_use]
    pub const fn new(
        store: &'a dyn TariffStore,
        clock: &'a dyn Clock,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Loads a service together with all of its components.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` if the service does not exist, or
    /// `EngineError::Store` if the store fails.
    pub fn load_service(&self, service_id: ServiceId) -> Result<Service, EngineError> {
        let service: Service = self.store.find_service(service_id)?.ok_or_else(|| {
            EngineError::invalid_input("service_id", format!("service {service_id} does not exist"))
        })?;
        let components: Vec<ServiceComponent> = self.store.find_components(service_id)?;
        Ok(service.with_components(components))
    }

    /// Calculates the price of a service.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The financial year is frozen and the policy blocks calculation
    /// - The service lacks exactly one live component of either kind
    /// - A component coefficient is not positive
    /// - No professional or technical factor applies
    /// - An override value is not positive
    /// - The store fails
    pub fn calculate(
        &self,
        service: &Service,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, EngineError> {
        let (as_of, financial_year) = self.resolve_period(request);
        let service_id: ServiceId = service.service_id();
        let tier: TariffTier = service.tier();

        // Frozen years are checked before anything else
        self.freeze_manager().guard_calculation(financial_year)?;

        let technical_component: &ServiceComponent =
            single_component(service, ComponentKind::Technical)?;
        let professional_component: &ServiceComponent =
            single_component(service, ComponentKind::Professional)?;

        let pricing_mode: PricingMode = PricingMode::select(
            self.store,
            self.config.legacy_fallback.as_ref(),
            financial_year,
        )?;

        // Professional factors are never tiered
        let professional_base: BaseFactor = self.base_factor(
            pricing_mode,
            ComponentKind::Professional,
            TariffTier::Standard,
            financial_year,
            as_of,
        )?;
        let technical_base: BaseFactor = self.base_factor(
            pricing_mode,
            ComponentKind::Technical,
            tier,
            financial_year,
            as_of,
        )?;

        let overrides: ResolvedOverrides =
            OverrideResolver::new(self.store).resolve(service_id, request.department_id)?;

        let technical: ComponentLine = price_line(
            technical_component,
            &technical_base,
            overrides.technical,
        )?;
        let professional: ComponentLine = price_line(
            professional_component,
            &professional_base,
            overrides.professional,
        )?;
        let total: Decimal = technical
            .amount
            .checked_add(professional.amount)
            .ok_or_else(|| amount_overflow(service_id))?;

        debug!(
            %service_id,
            %tier,
            %financial_year,
            %as_of,
            mode = %pricing_mode,
            %total,
            "Calculated price"
        );

        Ok(CalculationResult {
            service_id,
            tier,
            department_id: request.department_id,
            as_of,
            financial_year,
            pricing_mode,
            technical_amount: technical.amount,
            professional_amount: professional.amount,
            technical,
            professional,
            total,
            applied_override: overrides.applied(),
        })
    }

    /// Loads a service by id and calculates its price.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` if the service does not exist, or
    /// any error of [`PriceCalculator::calculate`].
    pub fn calculate_by_id(
        &self,
        service_id: ServiceId,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, EngineError> {
        let service: Service = self.load_service(service_id)?;
        self.calculate(&service, request)
    }

    /// Quotes a service.
    ///
    /// Services with live components are calculated. A service without any
    /// live component is quoted at its flat price. A service with only some of
    /// its components is an error, never a flat price.
    ///
    /// # Errors
    ///
    /// Returns any error of [`PriceCalculator::calculate`], or
    /// `EngineError::MissingComponent` if a component-less service has no
    /// flat price.
    pub fn quote(
        &self,
        service: &Service,
        request: &CalculationRequest,
    ) -> Result<Quote, EngineError> {
        if service.components().iter().any(ServiceComponent::is_live) {
            return self.calculate(service, request).map(Quote::Computed);
        }

        let (_, financial_year) = self.resolve_period(request);
        self.freeze_manager().guard_calculation(financial_year)?;

        match service.flat_price() {
            Some(price) if price > Decimal::ZERO => Ok(Quote::FlatPrice {
                service_id: service.service_id(),
                price,
            }),
            Some(price) => Err(DomainError::NonPositiveFlatPrice(price).into()),
            None => Err(EngineError::MissingComponent {
                service_id: service.service_id(),
                kind: ComponentKind::Technical,
                found: 0,
            }),
        }
    }

    fn resolve_period(&self, request: &CalculationRequest) -> (Date, FinancialYear) {
        let as_of: Date = request.as_of.unwrap_or_else(|| self.clock.today());
        let financial_year: FinancialYear = request
            .financial_year
            .unwrap_or_else(|| financial_year_of(as_of));
        (as_of, financial_year)
    }

    fn freeze_manager(&self) -> FreezeManager<'a> {
        FreezeManager::new(self.store, self.clock, self.config.frozen_year_policy)
    }

    fn base_factor(
        &self,
        pricing_mode: PricingMode,
        kind: ComponentKind,
        tier: TariffTier,
        financial_year: FinancialYear,
        as_of: Date,
    ) -> Result<BaseFactor, EngineError> {
        match pricing_mode {
            PricingMode::FactorTable => {
                let registry: FactorRegistry<'_> = self.freeze_manager().factor_registry();
                registry
                    .resolve(kind, tier, financial_year, as_of)
                    .map(BaseFactor::from)
            }
            PricingMode::LegacyFixed(tariff) => Ok(BaseFactor {
                value: tariff.value_for(kind, tier),
                factor_id: None,
                source: FactorSource::Legacy,
            }),
        }
    }
}

fn single_component(
    service: &Service,
    kind: ComponentKind,
) -> Result<&ServiceComponent, EngineError> {
    let live: Vec<&ServiceComponent> = service.live_components(kind).collect();
    match live.as_slice() {
        [component] => {
            validate_component(component)?;
            Ok(*component)
        }
        _ => Err(EngineError::MissingComponent {
            service_id: service.service_id(),
            kind,
            found: live.len(),
        }),
    }
}

fn price_line(
    component: &ServiceComponent,
    base: &BaseFactor,
    override_value: Option<Decimal>,
) -> Result<ComponentLine, EngineError> {
    // An override replaces the factor outright
    let (final_factor, source) = match override_value {
        Some(value) => (value, FactorSource::Override),
        None => (base.value, base.source),
    };
    let amount: Decimal = component
        .coefficient
        .checked_mul(final_factor)
        .ok_or_else(|| {
            EngineError::invalid_input(
                "coefficient",
                format!("{} amount exceeds the decimal range", component.kind),
            )
        })?;

    Ok(ComponentLine {
        kind: component.kind,
        coefficient: component.coefficient,
        base_factor: base.value,
        registry_factor_id: base.factor_id,
        final_factor,
        source,
        amount,
    })
}

fn amount_overflow(service_id: ServiceId) -> EngineError {
    EngineError::invalid_input(
        "service_id",
        format!("total for service {service_id} exceeds the decimal range"),
    )
}
