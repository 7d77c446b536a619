// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    EngineConfig, FactorWriter, FixedClock, FreezeWrite, StoreError, TariffEngine, TariffStore,
};
use clinic_tariff_audit::{AuditEvent, Cause};
use clinic_tariff_domain::{
    ActorId, ComponentKind, DepartmentId, DepartmentOverride, EffectivePeriod, Factor,
    FinancialYear, FreezeState, FrozenStamp, Service, ServiceComponent, ServiceId, TariffTier,
    YearFreeze,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use time::{Date, Month};

#[derive(Default)]
struct MemoryState {
    services: BTreeMap<ServiceId, Service>,
    components: BTreeMap<ServiceId, Vec<ServiceComponent>>,
    factors: Vec<Factor>,
    overrides: Vec<DepartmentOverride>,
    year_freezes: BTreeMap<FinancialYear, YearFreeze>,
    audit_events: Vec<AuditEvent>,
    next_id: i64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// An in-memory `TariffStore` for engine tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every subsequent store call fail.
    pub fn fail_from_now_on(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::new(operation, "database is locked"));
        }
        Ok(())
    }

    pub fn add_service(&self, service: &Service) {
        let mut state = self.state.lock().unwrap();
        state
            .components
            .insert(service.service_id(), service.components().to_vec());
        state.services.insert(
            service.service_id(),
            service.clone().with_components(Vec::new()),
        );
    }

    pub fn add_factor(&self, mut factor: Factor) -> i64 {
        let mut state = self.state.lock().unwrap();
        let factor_id: i64 = state.allocate_id();
        factor.factor_id = Some(factor_id);
        state.factors.push(factor);
        factor_id
    }

    pub fn add_override(&self, pairing: DepartmentOverride) {
        self.state.lock().unwrap().overrides.push(pairing);
    }

    pub fn factor(&self, factor_id: i64) -> Factor {
        self.state
            .lock()
            .unwrap()
            .factors
            .iter()
            .find(|f| f.factor_id == Some(factor_id))
            .cloned()
            .unwrap()
    }

    pub fn frozen_row_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .factors
            .iter()
            .filter(|f| f.is_frozen())
            .count()
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.lock().unwrap().audit_events.clone()
    }
}

impl TariffStore for MemoryStore {
    fn find_service(&self, service_id: ServiceId) -> Result<Option<Service>, StoreError> {
        self.check("find_service")?;
        Ok(self.state.lock().unwrap().services.get(&service_id).cloned())
    }

    fn find_components(&self, service_id: ServiceId) -> Result<Vec<ServiceComponent>, StoreError> {
        self.check("find_components")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .components
            .get(&service_id)
            .cloned()
            .unwrap_or_default())
    }

    fn factor_candidates(
        &self,
        kind: ComponentKind,
        tier: TariffTier,
        financial_year: FinancialYear,
    ) -> Result<Vec<Factor>, StoreError> {
        self.check("factor_candidates")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .factors
            .iter()
            .filter(|f| f.kind == kind && f.tier == tier && f.financial_year == financial_year)
            .cloned()
            .collect())
    }

    fn count_factors(&self, financial_year: FinancialYear) -> Result<u64, StoreError> {
        self.check("count_factors")?;
        let count: usize = self
            .state
            .lock()
            .unwrap()
            .factors
            .iter()
            .filter(|f| f.financial_year == financial_year && f.is_live())
            .count();
        Ok(u64::try_from(count).unwrap())
    }

    fn find_override(
        &self,
        service_id: ServiceId,
        department_id: DepartmentId,
    ) -> Result<Option<DepartmentOverride>, StoreError> {
        self.check("find_override")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .overrides
            .iter()
            .find(|o| o.service_id == service_id && o.department_id == department_id)
            .cloned())
    }

    fn year_freeze(&self, financial_year: FinancialYear) -> Result<Option<YearFreeze>, StoreError> {
        self.check("year_freeze")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .year_freezes
            .get(&financial_year)
            .cloned())
    }

    fn row_freeze_stamp(
        &self,
        financial_year: FinancialYear,
    ) -> Result<Option<FrozenStamp>, StoreError> {
        self.check("row_freeze_stamp")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .factors
            .iter()
            .filter(|f| f.financial_year == financial_year && f.is_live())
            .filter_map(|f| f.freeze.stamp().cloned())
            .min_by_key(|stamp| stamp.at))
    }

    fn freeze_factors(
        &self,
        financial_year: FinancialYear,
        stamp: &FrozenStamp,
    ) -> Result<FreezeWrite, StoreError> {
        self.check("freeze_factors")?;
        let mut state = self.state.lock().unwrap();

        let newly_recorded: bool = !state.year_freezes.contains_key(&financial_year);
        let year_freeze: YearFreeze = state
            .year_freezes
            .entry(financial_year)
            .or_insert_with(|| YearFreeze {
                financial_year,
                stamp: stamp.clone(),
            })
            .clone();

        let mut frozen_rows: u64 = 0;
        for factor in state
            .factors
            .iter_mut()
            .filter(|f| f.financial_year == financial_year && f.is_live() && !f.is_frozen())
        {
            factor.freeze = FreezeState::Frozen(stamp.clone());
            frozen_rows += 1;
        }

        Ok(FreezeWrite {
            frozen_rows,
            year_freeze,
            newly_recorded,
        })
    }

    fn append_audit_event(&self, event: &AuditEvent) -> Result<i64, StoreError> {
        self.check("append_audit_event")?;
        let mut state = self.state.lock().unwrap();
        let event_id: i64 = state.allocate_id();
        state
            .audit_events
            .push(event.clone().with_event_id(event_id));
        Ok(event_id)
    }
}

impl FactorWriter for MemoryStore {
    fn get_factor(&self, factor_id: i64) -> Result<Option<Factor>, StoreError> {
        self.check("get_factor")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .factors
            .iter()
            .find(|f| f.factor_id == Some(factor_id))
            .cloned())
    }

    fn insert_factor(&self, factor: &Factor) -> Result<Option<i64>, StoreError> {
        self.check("insert_factor")?;
        let mut state = self.state.lock().unwrap();
        let frozen: bool = state.year_freezes.contains_key(&factor.financial_year)
            || state
                .factors
                .iter()
                .any(|f| f.financial_year == factor.financial_year && f.is_live() && f.is_frozen());
        if frozen && !factor.is_frozen() {
            return Ok(None);
        }

        let mut factor: Factor = factor.clone();
        let factor_id: i64 = state.allocate_id();
        factor.factor_id = Some(factor_id);
        state.factors.push(factor);
        Ok(Some(factor_id))
    }

    fn update_factor_value(&self, factor_id: i64, value: Decimal) -> Result<bool, StoreError> {
        self.check("update_factor_value")?;
        let mut state = self.state.lock().unwrap();
        let Some(factor) = state
            .factors
            .iter_mut()
            .find(|f| f.factor_id == Some(factor_id) && !f.is_frozen())
        else {
            return Ok(false);
        };
        factor.value = value;
        Ok(true)
    }

    fn deactivate_factor(&self, factor_id: i64) -> Result<bool, StoreError> {
        self.check("deactivate_factor")?;
        let mut state = self.state.lock().unwrap();
        let Some(factor) = state
            .factors
            .iter_mut()
            .find(|f| f.factor_id == Some(factor_id) && !f.is_frozen())
        else {
            return Ok(false);
        };
        factor.is_active = false;
        Ok(true)
    }
}

pub fn date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).unwrap()
}

/// 2026-10-19, in financial year 1405.
pub fn today() -> Date {
    date(2026, Month::October, 19)
}

/// 2026-03-21, Nowruz of 1405.
pub fn nowruz_1405() -> Date {
    date(2026, Month::March, 21)
}

pub fn year(value: i64) -> FinancialYear {
    FinancialYear::new(value).unwrap()
}

pub fn service_id(value: i64) -> ServiceId {
    ServiceId::new(value).unwrap()
}

pub fn department_id(value: i64) -> DepartmentId {
    DepartmentId::new(value).unwrap()
}

pub fn create_test_actor() -> ActorId {
    ActorId::new("finance-01").unwrap()
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Finance request"))
}

pub fn create_service(
    id: i64,
    tier: TariffTier,
    technical_coefficient: Decimal,
    professional_coefficient: Decimal,
) -> Service {
    Service::new(
        service_id(id),
        format!("Service {id}"),
        tier,
        vec![
            ServiceComponent::new(ComponentKind::Technical, technical_coefficient),
            ServiceComponent::new(ComponentKind::Professional, professional_coefficient),
        ],
        None,
    )
}

pub fn create_factor(
    kind: ComponentKind,
    tier: TariffTier,
    financial_year: i64,
    value: Decimal,
    from: Date,
    to: Option<Date>,
) -> Factor {
    Factor {
        factor_id: None,
        kind,
        tier,
        financial_year: year(financial_year),
        value,
        period: EffectivePeriod::new(from, to).unwrap(),
        is_active: true,
        is_deleted: false,
        freeze: FreezeState::Open,
    }
}

pub fn create_override(
    service: i64,
    department: i64,
    technical_factor: Option<Decimal>,
    professional_factor: Option<Decimal>,
) -> DepartmentOverride {
    DepartmentOverride {
        override_id: None,
        service_id: service_id(service),
        department_id: department_id(department),
        technical_factor,
        professional_factor,
        is_active: true,
        is_deleted: false,
    }
}

/// Seeds the three canonical 1405 factors, open-ended from Nowruz.
/// Returns `(technical standard, technical hashtagged, professional)` ids.
pub fn seed_1405_factors(store: &MemoryStore) -> (i64, i64, i64) {
    let technical_standard: i64 = store.add_factor(create_factor(
        ComponentKind::Technical,
        TariffTier::Standard,
        1405,
        dec!(31000),
        nowruz_1405(),
        None,
    ));
    let technical_hashtagged: i64 = store.add_factor(create_factor(
        ComponentKind::Technical,
        TariffTier::Hashtagged,
        1405,
        dec!(65000),
        nowruz_1405(),
        None,
    ));
    let professional: i64 = store.add_factor(create_factor(
        ComponentKind::Professional,
        TariffTier::Standard,
        1405,
        dec!(41000),
        nowruz_1405(),
        None,
    ));
    (technical_standard, technical_hashtagged, professional)
}

pub fn create_engine(store: &Arc<MemoryStore>) -> TariffEngine<MemoryStore> {
    create_engine_with(store, EngineConfig::default())
}

pub fn create_engine_with(
    store: &Arc<MemoryStore>,
    config: EngineConfig,
) -> TariffEngine<MemoryStore> {
    TariffEngine::new(Arc::clone(store), Arc::new(FixedClock::on(today())), config)
}
