// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::store::StoreError;
use clinic_tariff_domain::{ComponentKind, DomainError, FinancialYear, ServiceId, TariffTier};
use thiserror::Error;
use time::Date;

/// Errors returned by the tariff engine.
///
/// Every variant carries enough context to tell an operator what to fix.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A caller supplied an unusable value.
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        /// The offending input.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The service does not expose exactly one live component of `kind`.
    #[error(
        "Service {service_id} has {found} live {kind} components; exactly one is required"
    )]
    MissingComponent {
        /// The service being priced.
        service_id: ServiceId,
        /// The missing or duplicated component kind.
        kind: ComponentKind,
        /// How many live components of that kind were found.
        found: usize,
    },

    /// No applicable rate exists for the requested group.
    #[error(
        "No active {kind} factor for tier {tier} in financial year {financial_year} effective on {as_of}"
    )]
    MissingFactor {
        /// The factor kind.
        kind: ComponentKind,
        /// The tariff tier.
        tier: TariffTier,
        /// The financial year searched.
        financial_year: FinancialYear,
        /// The lookup date.
        as_of: Date,
    },

    /// The financial year is closed.
    #[error("Financial year {financial_year} is frozen")]
    FrozenYear {
        /// The frozen financial year.
        financial_year: FinancialYear,
    },

    /// No factor row has the given id.
    #[error("Factor {factor_id} not found")]
    FactorNotFound {
        /// The unknown id.
        factor_id: i64,
    },

    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    Domain(#[from] DomainError),

    /// The storage collaborator failed.
    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Creates an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Returns whether retrying the same call could succeed.
    ///
    /// Only storage failures are transient. Everything else stems from
    /// missing configuration or a closed period.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
