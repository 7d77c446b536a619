// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod catalog;
mod error;
mod factor;
mod freeze;
mod solar_calendar;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{DepartmentOverride, Service, ServiceComponent};
pub use error::DomainError;
pub use factor::{EffectivePeriod, Factor, FactorDraft};
pub use freeze::{FreezeState, FrozenStamp, YearFreeze};
pub use solar_calendar::{SolarDate, financial_year_of};
pub use types::{ActorId, ComponentKind, DepartmentId, FinancialYear, ServiceId, TariffTier};
pub use validation::{
    parse_decimal, parse_iso_date, validate_component, validate_factor_draft,
    validate_factor_value, validate_override, validate_service,
};
