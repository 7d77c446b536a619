// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;
use crate::tests::{
    create_factor, create_persistence, default_stamp, frozen_stamp, insert_legacy_factor,
    seed_1405_factors, year,
};
use clinic_tariff::{FactorWriter, FreezeWrite, TariffStore};
use clinic_tariff_domain::{ComponentKind, Factor, FreezeState, FrozenStamp, TariffTier};
use rust_decimal_macros::dec;
use std::sync::Arc;
use time::macros::{date, datetime};

#[test]
fn test_freeze_records_year_and_stamps_live_rows() {
    let persistence: Persistence = create_persistence();
    let (technical_standard, _, _) = seed_1405_factors(&persistence);
    persistence.deactivate_factor(technical_standard).unwrap();

    let write: FreezeWrite = persistence
        .freeze_factors(year(1405), &default_stamp())
        .unwrap();

    assert!(write.newly_recorded);
    assert_eq!(write.frozen_rows, 2);
    assert_eq!(write.year_freeze.financial_year, year(1405));
    assert_eq!(write.year_freeze.stamp, default_stamp());
    // Retired rows keep their open state
    assert_eq!(
        persistence.get_factor(technical_standard).unwrap().unwrap().freeze,
        FreezeState::Open
    );
}

#[test]
fn test_second_freeze_keeps_the_original_record() {
    let persistence: Persistence = create_persistence();
    seed_1405_factors(&persistence);
    persistence
        .freeze_factors(year(1405), &default_stamp())
        .unwrap();

    let later: FrozenStamp = frozen_stamp(datetime!(2027-03-02 8:00 +3:30), "auditor");
    let write: FreezeWrite = persistence.freeze_factors(year(1405), &later).unwrap();

    assert!(!write.newly_recorded);
    assert_eq!(write.frozen_rows, 0);
    assert_eq!(write.year_freeze.stamp, default_stamp());
    assert_eq!(
        persistence.year_freeze(year(1405)).unwrap().unwrap().stamp,
        default_stamp()
    );
}

#[test]
fn test_repeat_freeze_stamps_rows_added_after_the_first() {
    let persistence: Persistence = create_persistence();
    seed_1405_factors(&persistence);
    persistence
        .freeze_factors(year(1405), &default_stamp())
        .unwrap();
    let late: i64 = insert_legacy_factor(
        &persistence,
        &create_factor(
            ComponentKind::Technical,
            TariffTier::Standard,
            1405,
            dec!(33000),
            date!(2026 - 09 - 23),
            None,
        ),
    );

    let later: FrozenStamp = frozen_stamp(datetime!(2027-03-02 8:00 +3:30), "auditor");
    let write: FreezeWrite = persistence.freeze_factors(year(1405), &later).unwrap();

    assert_eq!(write.frozen_rows, 1);
    assert_eq!(
        persistence.get_factor(late).unwrap().unwrap().freeze,
        FreezeState::Frozen(later)
    );
}

#[test]
fn test_freeze_leaves_other_years_open() {
    let persistence: Persistence = create_persistence();
    seed_1405_factors(&persistence);
    let other: i64 = persistence
        .insert_factor(&create_factor(
            ComponentKind::Professional,
            TariffTier::Standard,
            1404,
            dec!(38000),
            date!(2025 - 03 - 21),
            None,
        ))
        .unwrap()
        .unwrap();

    persistence
        .freeze_factors(year(1405), &default_stamp())
        .unwrap();

    assert!(persistence.year_freeze(year(1404)).unwrap().is_none());
    assert!(!persistence.get_factor(other).unwrap().unwrap().is_frozen());
}

#[test]
fn test_freeze_of_empty_year_still_records_it() {
    let persistence: Persistence = create_persistence();

    let write: FreezeWrite = persistence
        .freeze_factors(year(1406), &default_stamp())
        .unwrap();

    assert!(write.newly_recorded);
    assert_eq!(write.frozen_rows, 0);
    assert!(persistence.year_freeze(year(1406)).unwrap().is_some());
}

#[test]
fn test_row_freeze_stamp_reports_earliest_instant() {
    let persistence: Persistence = create_persistence();
    // 10:00 +03:30 is 06:30 UTC, earlier than 09:00 UTC despite sorting later as text
    let mut early: Factor = create_factor(
        ComponentKind::Technical,
        TariffTier::Standard,
        1403,
        dec!(25000),
        date!(2024 - 03 - 20),
        None,
    );
    early.freeze = FreezeState::Frozen(frozen_stamp(
        datetime!(2025-03-10 10:00 +3:30),
        "legacy-admin",
    ));
    let mut late: Factor = early.clone();
    late.kind = ComponentKind::Professional;
    late.freeze = FreezeState::Frozen(frozen_stamp(datetime!(2025-03-10 9:00 UTC), "other"));
    persistence.insert_factor(&late).unwrap();
    persistence.insert_factor(&early).unwrap();

    let stamp: FrozenStamp = persistence.row_freeze_stamp(year(1403)).unwrap().unwrap();

    assert_eq!(stamp.by.value(), "legacy-admin");
    assert!(persistence.year_freeze(year(1403)).unwrap().is_none());
}

#[test]
fn test_row_freeze_stamp_is_none_for_open_year() {
    let persistence: Persistence = create_persistence();
    seed_1405_factors(&persistence);

    assert!(persistence.row_freeze_stamp(year(1405)).unwrap().is_none());
}

#[test]
fn test_concurrent_freezes_stamp_each_row_once() {
    let persistence: Arc<Persistence> = Arc::new(create_persistence());
    seed_1405_factors(&persistence);

    let writes: Vec<FreezeWrite> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let persistence: &Persistence = &persistence;
                scope.spawn(move || {
                    let stamp: FrozenStamp = frozen_stamp(
                        datetime!(2027-03-01 9:30 +3:30) + time::Duration::minutes(n),
                        "finance-01",
                    );
                    persistence.freeze_factors(year(1405), &stamp).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(writes.iter().map(|w| w.frozen_rows).sum::<u64>(), 3);
    assert_eq!(writes.iter().filter(|w| w.newly_recorded).count(), 1);
    let recorded: FrozenStamp = persistence.year_freeze(year(1405)).unwrap().unwrap().stamp;
    assert!(writes.iter().all(|w| w.year_freeze.stamp == recorded));
}

#[test]
fn test_open_row_is_refused_in_recorded_frozen_year() {
    let persistence: Persistence = create_persistence();
    seed_1405_factors(&persistence);
    persistence
        .freeze_factors(year(1405), &default_stamp())
        .unwrap();

    let inserted: Option<i64> = persistence
        .insert_factor(&create_factor(
            ComponentKind::Technical,
            TariffTier::Standard,
            1405,
            dec!(33000),
            date!(2026 - 09 - 23),
            None,
        ))
        .unwrap();

    assert!(inserted.is_none());
    assert_eq!(persistence.count_factors(year(1405)).unwrap(), 3);
}

#[test]
fn test_open_row_is_refused_beside_frozen_legacy_rows() {
    let persistence: Persistence = create_persistence();
    let mut legacy: Factor = create_factor(
        ComponentKind::Professional,
        TariffTier::Standard,
        1403,
        dec!(25000),
        date!(2024 - 03 - 20),
        None,
    );
    legacy.freeze = FreezeState::Frozen(default_stamp());
    persistence.insert_factor(&legacy).unwrap().unwrap();

    let mut open: Factor = legacy.clone();
    open.kind = ComponentKind::Technical;
    open.freeze = FreezeState::Open;

    assert!(persistence.insert_factor(&open).unwrap().is_none());
    assert!(persistence.year_freeze(year(1403)).unwrap().is_none());
}
