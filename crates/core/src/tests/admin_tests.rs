// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    MemoryStore, create_engine, create_test_actor, create_test_cause, date, nowruz_1405,
    seed_1405_factors, today, year,
};
use crate::{
    EngineConfig, EngineError, FactorChange, FactorWriter, FixedClock, FreezeWrite, StoreError,
    TariffEngine, TariffStore,
};
use clinic_tariff_audit::AuditEvent;
use clinic_tariff_domain::{
    ComponentKind, DepartmentId, DepartmentOverride, DomainError, EffectivePeriod, Factor,
    FactorDraft, FinancialYear, FrozenStamp, Service, ServiceComponent, ServiceId, TariffTier,
    YearFreeze,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use time::{Month, OffsetDateTime};

/// Freezes the target year just before every insert, as a concurrent
/// `freeze` landing between the engine's own check and its write would.
struct FreezeBeforeInsertStore {
    inner: Arc<MemoryStore>,
}

impl TariffStore for FreezeBeforeInsertStore {
    fn find_service(&self, service_id: ServiceId) -> Result<Option<Service>, StoreError> {
        self.inner.find_service(service_id)
    }

    fn find_components(&self, service_id: ServiceId) -> Result<Vec<ServiceComponent>, StoreError> {
        self.inner.find_components(service_id)
    }

    fn factor_candidates(
        &self,
        kind: ComponentKind,
        tier: TariffTier,
        financial_year: FinancialYear,
    ) -> Result<Vec<Factor>, StoreError> {
        self.inner.factor_candidates(kind, tier, financial_year)
    }

    fn count_factors(&self, financial_year: FinancialYear) -> Result<u64, StoreError> {
        self.inner.count_factors(financial_year)
    }

    fn find_override(
        &self,
        service_id: ServiceId,
        department_id: DepartmentId,
    ) -> Result<Option<DepartmentOverride>, StoreError> {
        self.inner.find_override(service_id, department_id)
    }

    fn year_freeze(&self, financial_year: FinancialYear) -> Result<Option<YearFreeze>, StoreError> {
        self.inner.year_freeze(financial_year)
    }

    fn row_freeze_stamp(
        &self,
        financial_year: FinancialYear,
    ) -> Result<Option<FrozenStamp>, StoreError> {
        self.inner.row_freeze_stamp(financial_year)
    }

    fn freeze_factors(
        &self,
        financial_year: FinancialYear,
        stamp: &FrozenStamp,
    ) -> Result<FreezeWrite, StoreError> {
        self.inner.freeze_factors(financial_year, stamp)
    }

    fn append_audit_event(&self, event: &AuditEvent) -> Result<i64, StoreError> {
        self.inner.append_audit_event(event)
    }
}

impl FactorWriter for FreezeBeforeInsertStore {
    fn get_factor(&self, factor_id: i64) -> Result<Option<Factor>, StoreError> {
        self.inner.get_factor(factor_id)
    }

    fn insert_factor(&self, factor: &Factor) -> Result<Option<i64>, StoreError> {
        let stamp: FrozenStamp = FrozenStamp::new(OffsetDateTime::UNIX_EPOCH, create_test_actor());
        self.inner.freeze_factors(factor.financial_year, &stamp)?;
        self.inner.insert_factor(factor)
    }

    fn update_factor_value(&self, factor_id: i64, value: Decimal) -> Result<bool, StoreError> {
        self.inner.update_factor_value(factor_id, value)
    }

    fn deactivate_factor(&self, factor_id: i64) -> Result<bool, StoreError> {
        self.inner.deactivate_factor(factor_id)
    }
}

fn technical_draft() -> FactorDraft {
    FactorDraft {
        kind: ComponentKind::Technical,
        tier: TariffTier::Standard,
        financial_year: year(1405),
        value: dec!(33000),
        period: EffectivePeriod::open_ended(date(2026, Month::September, 23)),
    }
}

#[test]
fn test_create_factor_stores_and_audits() {
    let store = MemoryStore::new();
    let engine = create_engine(&store);

    let change: FactorChange = engine
        .create_factor(technical_draft(), &create_test_actor(), create_test_cause())
        .unwrap();

    let factor_id: i64 = change.factor.factor_id.unwrap();
    assert_eq!(store.factor(factor_id), change.factor);
    assert_eq!(change.audit_event.action.name, "CreateFactor");
    assert_eq!(change.audit_event.before.data, "none");
    assert_eq!(change.audit_event.financial_year, Some(year(1405)));
    assert_eq!(store.audit_events().len(), 1);
}

#[test]
fn test_created_factor_is_resolved() {
    let store = MemoryStore::new();
    seed_1405_factors(&store);
    let engine = create_engine(&store);
    engine
        .create_factor(technical_draft(), &create_test_actor(), create_test_cause())
        .unwrap();

    let resolved: Factor = engine
        .resolve_factor(
            ComponentKind::Technical,
            TariffTier::Standard,
            year(1405),
            today(),
        )
        .unwrap();
    assert_eq!(resolved.value, dec!(33000));
}

#[test]
fn test_create_factor_rejects_invalid_drafts() {
    let store = MemoryStore::new();
    let engine = create_engine(&store);

    let mut tiered: FactorDraft = technical_draft();
    tiered.kind = ComponentKind::Professional;
    tiered.tier = TariffTier::Hashtagged;
    assert_eq!(
        engine.create_factor(tiered, &create_test_actor(), create_test_cause()),
        Err(EngineError::Domain(DomainError::TieredProfessionalFactor))
    );

    let mut wrong_year: FactorDraft = technical_draft();
    wrong_year.financial_year = year(1406);
    assert!(matches!(
        engine.create_factor(wrong_year, &create_test_actor(), create_test_cause()),
        Err(EngineError::Domain(
            DomainError::FactorOutsideFinancialYear { .. }
        ))
    ));

    assert!(store.audit_events().is_empty());
}

#[test]
fn test_create_factor_in_frozen_year_is_rejected() {
    let store = MemoryStore::new();
    let engine = create_engine(&store);
    engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();

    assert_eq!(
        engine.create_factor(technical_draft(), &create_test_actor(), create_test_cause()),
        Err(EngineError::FrozenYear {
            financial_year: year(1405)
        })
    );
}

#[test]
fn test_freeze_racing_create_factor_leaves_no_open_row() {
    let inner = MemoryStore::new();
    seed_1405_factors(&inner);
    let engine: TariffEngine<FreezeBeforeInsertStore> = TariffEngine::new(
        Arc::new(FreezeBeforeInsertStore {
            inner: Arc::clone(&inner),
        }),
        Arc::new(FixedClock::on(today())),
        EngineConfig::default(),
    );

    assert_eq!(
        engine.create_factor(technical_draft(), &create_test_actor(), create_test_cause()),
        Err(EngineError::FrozenYear {
            financial_year: year(1405)
        })
    );
    assert!(engine.is_frozen(year(1405)).unwrap());
    assert_eq!(inner.count_factors(year(1405)).unwrap(), 3);
    assert_eq!(inner.frozen_row_count(), 3);
    assert!(inner.audit_events().is_empty());
}

#[test]
fn test_revise_factor_value() {
    let store = MemoryStore::new();
    let (technical_id, _, _) = seed_1405_factors(&store);
    let engine = create_engine(&store);

    let change: FactorChange = engine
        .revise_factor_value(
            technical_id,
            dec!(32000),
            &create_test_actor(),
            create_test_cause(),
        )
        .unwrap();

    assert_eq!(change.factor.value, dec!(32000));
    assert_eq!(store.factor(technical_id).value, dec!(32000));
    assert_eq!(change.audit_event.action.name, "ReviseFactor");
    assert!(change.audit_event.before.data.contains("31000"));
    assert!(change.audit_event.after.data.contains("32000"));
}

#[test]
fn test_revise_rejects_non_positive_value() {
    let store = MemoryStore::new();
    let (technical_id, _, _) = seed_1405_factors(&store);
    let engine = create_engine(&store);

    assert!(matches!(
        engine.revise_factor_value(
            technical_id,
            dec!(-5),
            &create_test_actor(),
            create_test_cause()
        ),
        Err(EngineError::Domain(DomainError::NonPositiveFactorValue { .. }))
    ));
    assert_eq!(store.factor(technical_id).value, dec!(31000));
}

#[test]
fn test_frozen_factor_cannot_be_revised_or_retired() {
    let store = MemoryStore::new();
    let (technical_id, _, _) = seed_1405_factors(&store);
    let engine = create_engine(&store);
    engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();

    let frozen: EngineError = EngineError::FrozenYear {
        financial_year: year(1405),
    };
    assert_eq!(
        engine.revise_factor_value(
            technical_id,
            dec!(1),
            &create_test_actor(),
            create_test_cause()
        ),
        Err(frozen.clone())
    );
    assert_eq!(
        engine.retire_factor(technical_id, &create_test_actor(), create_test_cause()),
        Err(frozen)
    );
    assert_eq!(store.factor(technical_id).value, dec!(31000));
}

#[test]
fn test_retired_factor_is_no_longer_resolved() {
    let store = MemoryStore::new();
    let (_, _, professional_id) = seed_1405_factors(&store);
    let engine = create_engine(&store);

    let change: FactorChange = engine
        .retire_factor(professional_id, &create_test_actor(), create_test_cause())
        .unwrap();
    assert!(!change.factor.is_active);

    assert!(matches!(
        engine.resolve_factor(
            ComponentKind::Professional,
            TariffTier::Standard,
            year(1405),
            nowruz_1405(),
        ),
        Err(EngineError::MissingFactor { .. })
    ));

    // A retired factor cannot be revised
    assert!(matches!(
        engine.revise_factor_value(
            professional_id,
            dec!(42000),
            &create_test_actor(),
            create_test_cause()
        ),
        Err(EngineError::InvalidInput { .. })
    ));
}

#[test]
fn test_unknown_factor() {
    let store = MemoryStore::new();
    let engine = create_engine(&store);

    assert_eq!(
        engine.retire_factor(404, &create_test_actor(), create_test_cause()),
        Err(EngineError::FactorNotFound { factor_id: 404 })
    );
}
