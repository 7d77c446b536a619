// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    MemoryStore, create_engine, create_factor, create_service, create_test_actor,
    create_test_cause, nowruz_1405, seed_1405_factors, year,
};
use crate::{CalculationRequest, EngineError, FreezeOutcome};
use clinic_tariff_domain::{
    ActorId, ComponentKind, FreezeState, FrozenStamp, TariffTier,
};
use rust_decimal_macros::dec;
use time::OffsetDateTime;

#[test]
fn test_freeze_stamps_every_live_row_of_the_year() {
    let store = MemoryStore::new();
    seed_1405_factors(&store);
    store.add_factor(create_factor(
        ComponentKind::Technical,
        TariffTier::Standard,
        1404,
        dec!(28000),
        time::macros::date!(2025 - 03 - 21),
        None,
    ));
    let engine = create_engine(&store);

    let outcome: FreezeOutcome = engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();

    assert_eq!(outcome.frozen_count, 3);
    assert!(outcome.newly_frozen_year);
    assert_eq!(outcome.stamp.by, create_test_actor());
    assert_eq!(store.frozen_row_count(), 3);
    assert!(engine.is_frozen(year(1405)).unwrap());
    assert!(!engine.is_frozen(year(1404)).unwrap());
}

#[test]
fn test_second_freeze_is_a_no_op() {
    let store = MemoryStore::new();
    seed_1405_factors(&store);
    let engine = create_engine(&store);

    let first: FreezeOutcome = engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();
    let other_actor: ActorId = ActorId::new("auditor").unwrap();
    let second: FreezeOutcome = engine
        .freeze(year(1405), &other_actor, create_test_cause())
        .unwrap();

    assert_eq!(second.frozen_count, 0);
    assert!(!second.newly_frozen_year);
    // The year keeps its original stamp
    assert_eq!(second.stamp, first.stamp);
}

#[test]
fn test_repeat_freeze_catches_rows_added_later() {
    let store = MemoryStore::new();
    seed_1405_factors(&store);
    let engine = create_engine(&store);
    engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();

    // Written directly, bypassing the freeze gate
    let late: i64 = store.add_factor(create_factor(
        ComponentKind::Technical,
        TariffTier::Standard,
        1405,
        dec!(33000),
        nowruz_1405(),
        None,
    ));

    let outcome: FreezeOutcome = engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();

    assert_eq!(outcome.frozen_count, 1);
    assert!(store.factor(late).is_frozen());
}

#[test]
fn test_freeze_of_empty_year_still_closes_it() {
    let store = MemoryStore::new();
    let engine = create_engine(&store);

    let outcome: FreezeOutcome = engine
        .freeze(year(1406), &create_test_actor(), create_test_cause())
        .unwrap();

    assert_eq!(outcome.frozen_count, 0);
    assert!(outcome.newly_frozen_year);
    assert!(engine.is_frozen(year(1406)).unwrap());
}

#[test]
fn test_frozen_year_blocks_calculation_regardless_of_factors() {
    let store = MemoryStore::new();
    seed_1405_factors(&store);
    let engine = create_engine(&store);
    engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();

    let service = create_service(1, TariffTier::Standard, dec!(2), dec!(1));
    assert_eq!(
        engine.calculate(&service, &CalculationRequest::new()),
        Err(EngineError::FrozenYear {
            financial_year: year(1405)
        })
    );
}

#[test]
fn test_row_level_freeze_closes_the_year() {
    let store = MemoryStore::new();
    let mut frozen = create_factor(
        ComponentKind::Professional,
        TariffTier::Standard,
        1405,
        dec!(41000),
        nowruz_1405(),
        None,
    );
    let stamp: FrozenStamp = FrozenStamp::new(OffsetDateTime::UNIX_EPOCH, create_test_actor());
    frozen.freeze = FreezeState::Frozen(stamp.clone());
    store.add_factor(frozen);
    let engine = create_engine(&store);

    assert!(engine.is_frozen(year(1405)).unwrap());
    assert_eq!(
        engine.freeze_state(year(1405)).unwrap(),
        FreezeState::Frozen(stamp)
    );
}

#[test]
fn test_retired_frozen_row_does_not_close_the_year() {
    let store = MemoryStore::new();
    let mut frozen = create_factor(
        ComponentKind::Professional,
        TariffTier::Standard,
        1405,
        dec!(41000),
        nowruz_1405(),
        None,
    );
    frozen.is_active = false;
    frozen.freeze = FreezeState::Frozen(FrozenStamp::new(
        OffsetDateTime::UNIX_EPOCH,
        create_test_actor(),
    ));
    store.add_factor(frozen);
    let engine = create_engine(&store);

    assert_eq!(engine.freeze_state(year(1405)).unwrap(), FreezeState::Open);
}

#[test]
fn test_every_freeze_call_is_audited() {
    let store = MemoryStore::new();
    seed_1405_factors(&store);
    let engine = create_engine(&store);

    let outcome: FreezeOutcome = engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();
    engine
        .freeze(year(1405), &create_test_actor(), create_test_cause())
        .unwrap();

    let events = store.audit_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], outcome.audit_event);
    assert_eq!(events[0].action.name, "FreezeFinancialYear");
    assert_eq!(events[0].financial_year, Some(year(1405)));
    assert_eq!(events[0].actor.id, "finance-01");
    assert!(events[0].before.data.contains("Open"));
    assert!(events[0].after.data.contains("Frozen"));
}

#[test]
fn test_concurrent_freezes_converge() {
    let store = MemoryStore::new();
    seed_1405_factors(&store);
    let engine = create_engine(&store);

    let outcomes: Vec<FreezeOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|_| {
                scope.spawn(|| {
                    engine
                        .freeze(year(1405), &create_test_actor(), create_test_cause())
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let total: u64 = outcomes.iter().map(|o| o.frozen_count).sum();
    let newly: usize = outcomes.iter().filter(|o| o.newly_frozen_year).count();

    assert_eq!(total, 3);
    assert_eq!(newly, 1);
    assert_eq!(store.frozen_row_count(), 3);
    assert!(outcomes.iter().all(|o| o.stamp == outcomes[0].stamp));
}
