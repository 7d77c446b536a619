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

//! The clinic tariff engine.
//!
//! Prices a clinical service as
//! `technical coefficient * technical factor + professional coefficient * professional factor`,
//! where factors are versioned by solar financial year, selected by effective
//! date, replaceable per department, and closed by a one-way year freeze.
//!
//! The engine reads all data through [`TariffStore`]. It holds no state of
//! its own between calls.

mod admin;
mod calculator;
mod clock;
mod config;
mod engine;
mod error;
mod freeze;
mod overrides;
mod pricing;
mod registry;
mod store;
mod validation;

#[cfg(test)]
mod tests;

pub use admin::{FactorAdministration, FactorChange};
pub use calculator::{
    CalculationRequest, CalculationResult, ComponentLine, FactorSource, PriceCalculator, Quote,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DEFAULT_UTC_OFFSET_MINUTES, EngineConfig};
pub use engine::TariffEngine;
pub use error::EngineError;
pub use freeze::{FreezeManager, FreezeOutcome, FrozenYearPolicy};
pub use overrides::{AppliedOverride, OverrideResolver, ResolvedOverrides};
pub use pricing::{LegacyTariff, PricingMode};
pub use registry::{FactorRegistry, select_effective, select_effective_including_frozen};
pub use store::{FactorWriter, FreezeWrite, StoreError, TariffStore};
pub use validation::{FactorValidationReport, ValidationReporter};
