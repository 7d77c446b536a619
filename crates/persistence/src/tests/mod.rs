// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod freeze_tests;
mod initialization_tests;

use crate::Persistence;
use crate::backend::PersistenceBackend;
use crate::data_models::NewFactorRow;
use crate::diesel_schema::factors;
use clinic_tariff::FactorWriter;
use clinic_tariff_audit::Cause;
use clinic_tariff_domain::{
    ActorId, ComponentKind, EffectivePeriod, Factor, FinancialYear, FreezeState, FrozenStamp,
    ServiceComponent, ServiceId, TariffTier,
};
use diesel::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

pub fn year(value: i64) -> FinancialYear {
    FinancialYear::new(value).unwrap()
}

pub fn nowruz_1405() -> Date {
    date!(2026 - 03 - 21)
}

pub fn create_test_actor() -> ActorId {
    ActorId::new("finance-01").unwrap()
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-789"), String::from("Rate table maintenance"))
}

pub fn frozen_stamp(at: OffsetDateTime, by: &str) -> FrozenStamp {
    FrozenStamp::new(at, ActorId::new(by).unwrap())
}

pub fn default_stamp() -> FrozenStamp {
    frozen_stamp(datetime!(2027-03-01 9:30 +3:30), "finance-01")
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

/// Opens an empty in-memory database.
pub fn create_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// Creates a service with one technical and one professional component.
pub fn create_priced_service(
    persistence: &Persistence,
    tier: TariffTier,
    technical: Decimal,
    professional: Decimal,
) -> ServiceId {
    persistence
        .create_service(
            "Ultrasound",
            tier,
            &[
                ServiceComponent::new(ComponentKind::Technical, technical),
                ServiceComponent::new(ComponentKind::Professional, professional),
            ],
            None,
        )
        .unwrap()
}

/// Inserts the canonical 1405 factors: technical standard 31000,
/// technical hashtagged 65000 and professional 41000.
pub fn seed_1405_factors(persistence: &Persistence) -> (i64, i64, i64) {
    let technical_standard: i64 = persistence
        .insert_factor(&create_factor(
            ComponentKind::Technical,
            TariffTier::Standard,
            1405,
            dec!(31000),
            nowruz_1405(),
            None,
        ))
        .unwrap()
        .unwrap();
    let technical_hashtagged: i64 = persistence
        .insert_factor(&create_factor(
            ComponentKind::Technical,
            TariffTier::Hashtagged,
            1405,
            dec!(65000),
            nowruz_1405(),
            None,
        ))
        .unwrap()
        .unwrap();
    let professional: i64 = persistence
        .insert_factor(&create_factor(
            ComponentKind::Professional,
            TariffTier::Standard,
            1405,
            dec!(41000),
            nowruz_1405(),
            None,
        ))
        .unwrap()
        .unwrap();

    (technical_standard, technical_hashtagged, professional)
}

/// Writes a factor row straight to the table, skipping the frozen-year
/// check. Stands in for rows left open in a frozen year by older imports.
pub fn insert_legacy_factor(persistence: &Persistence, factor: &Factor) -> i64 {
    persistence
        .with_conn(|conn| {
            diesel::insert_into(factors::table)
                .values(NewFactorRow::from_factor(factor)?)
                .execute(conn)?;
            conn.get_last_insert_rowid()
        })
        .unwrap()
}
