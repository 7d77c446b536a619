// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use crate::AuditArgs;
use clinic_tariff::{EngineConfig, FixedClock, TariffEngine};
use clinic_tariff_persistence::Persistence;
use std::sync::Arc;
use time::macros::date;

pub fn create_engine() -> TariffEngine<Persistence> {
    TariffEngine::new(
        Arc::new(Persistence::new_in_memory().unwrap()),
        Arc::new(FixedClock::on(date!(2026 - 10 - 19))),
        EngineConfig::default(),
    )
}

pub fn create_audit_args() -> AuditArgs {
    AuditArgs {
        actor: String::from("finance-01"),
        cause_id: String::from("req-1405"),
        reason: String::from("Annual tariff circular"),
    }
}

pub const VALID_CSV: &str = "\
Kind, Hashtagged, Financial Year, Value, Effective From, Effective To
Technical,false,1405,31000,2026-03-21,
Technical,true,1405,65000,2026-03-21,
Professional,false,1405,41000,2026-03-21,2027-03-20
";
