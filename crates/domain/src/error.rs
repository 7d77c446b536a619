// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{ComponentKind, FinancialYear};
use rust_decimal::Decimal;
use time::Date;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A service identifier was zero or negative.
    InvalidServiceId(i64),
    /// A department identifier was zero or negative.
    InvalidDepartmentId(i64),
    /// An actor identifier was empty.
    InvalidActorId,
    /// A component kind string could not be parsed.
    InvalidComponentKind(String),
    /// A coefficient was zero or negative.
    NonPositiveCoefficient {
        /// The component kind carrying the coefficient.
        kind: ComponentKind,
        /// The rejected value.
        value: Decimal,
    },
    /// A factor value was zero or negative.
    NonPositiveFactorValue {
        /// The factor kind.
        kind: ComponentKind,
        /// The rejected value.
        value: Decimal,
    },
    /// An override value was zero or negative.
    NonPositiveOverrideValue {
        /// The overridden axis.
        kind: ComponentKind,
        /// The rejected value.
        value: Decimal,
    },
    /// An effective period ends before it starts.
    InvalidEffectivePeriod {
        /// The inclusive start date.
        from: Date,
        /// The inclusive end date.
        to: Date,
    },
    /// Professional factors are not tiered.
    TieredProfessionalFactor,
    /// The effective-from date of a factor falls outside its financial year.
    FactorOutsideFinancialYear {
        /// The financial year the factor was declared for.
        financial_year: FinancialYear,
        /// The financial year the effective-from date maps to.
        effective_year: FinancialYear,
    },
    /// A financial year value is outside the supported solar range.
    InvalidFinancialYear(i64),
    /// A service defines more than one live component of the same kind.
    DuplicateComponent {
        /// The duplicated kind.
        kind: ComponentKind,
        /// How many live components of that kind exist.
        count: usize,
    },
    /// An override row carries neither override value.
    EmptyOverride,
    /// A flat price was zero or negative.
    NonPositiveFlatPrice(Decimal),
    /// Failed to parse a date from a string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to parse a decimal from a string.
    DecimalParseError {
        /// The invalid decimal string.
        value: String,
        /// The parsing error message.
        error: String,
    },
    /// A tier flag value was not recognised.
    InvalidTier(String),
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidServiceId(id) => write!(f, "Invalid service id: {id}"),
            Self::InvalidDepartmentId(id) => write!(f, "Invalid department id: {id}"),
            Self::InvalidActorId => write!(f, "Actor id must not be empty"),
            Self::InvalidComponentKind(kind) => write!(f, "Invalid component kind: {kind}"),
            Self::NonPositiveCoefficient { kind, value } => {
                write!(f, "{kind} coefficient must be positive, got {value}")
            }
            Self::NonPositiveFactorValue { kind, value } => {
                write!(f, "{kind} factor value must be positive, got {value}")
            }
            Self::NonPositiveOverrideValue { kind, value } => {
                write!(f, "{kind} override value must be positive, got {value}")
            }
            Self::InvalidEffectivePeriod { from, to } => {
                write!(f, "Effective period ends ({to}) before it starts ({from})")
            }
            Self::TieredProfessionalFactor => {
                write!(f, "Professional factors must use the Standard tier")
            }
            Self::FactorOutsideFinancialYear {
                financial_year,
                effective_year,
            } => write!(
                f,
                "Factor declared for financial year {financial_year} starts in financial year {effective_year}"
            ),
            Self::InvalidFinancialYear(year) => write!(f, "Invalid financial year: {year}"),
            Self::DuplicateComponent { kind, count } => write!(
                f,
                "Service has {count} live {kind} components; at most one is allowed"
            ),
            Self::EmptyOverride => write!(
                f,
                "Override must replace at least one of the technical or professional factors"
            ),
            Self::NonPositiveFlatPrice(price) => {
                write!(f, "Flat price must be positive, got {price}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::DecimalParseError { value, error } => {
                write!(f, "Failed to parse decimal '{value}': {error}")
            }
            Self::InvalidTier(value) => write!(f, "Invalid tariff tier: {value}"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
