// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::catalog::{DepartmentOverride, Service, ServiceComponent};
use crate::error::DomainError;
use crate::factor::FactorDraft;
use crate::solar_calendar::financial_year_of;
use crate::types::{ComponentKind, FinancialYear, TariffTier};
use rust_decimal::Decimal;
use std::str::FromStr;
use time::Date;
use time::macros::format_description;

/// Validates a single service component.
///
/// # Errors
///
/// Returns an error if the coefficient is zero or negative.
pub fn validate_component(component: &ServiceComponent) -> Result<(), DomainError> {
    if component.coefficient <= Decimal::ZERO {
        return Err(DomainError::NonPositiveCoefficient {
            kind: component.kind,
            value: component.coefficient,
        });
    }
    Ok(())
}

/// Validates a service intended for factor-based pricing.
///
/// Every live component must have a positive coefficient and no kind may
/// have more than one live component. A flat price, when present, must be
/// positive.
///
/// # Errors
///
/// Returns the first rule violation found.
pub fn validate_service(service: &Service) -> Result<(), DomainError> {
    for component in service.components().iter().filter(|c| c.is_live()) {
        validate_component(component)?;
    }

    for kind in ComponentKind::ALL {
        let count: usize = service.live_components(kind).count();
        if count > 1 {
            return Err(DomainError::DuplicateComponent { kind, count });
        }
    }

    match service.flat_price() {
        Some(price) if price <= Decimal::ZERO => Err(DomainError::NonPositiveFlatPrice(price)),
        _ => Ok(()),
    }
}

/// Validates a factor before it is stored.
///
/// # Errors
///
/// Returns an error if:
/// - The value is zero or negative
/// - A professional factor is declared for the hashtagged tier
/// - The effective-from date falls in a different financial year
pub fn validate_factor_draft(draft: &FactorDraft) -> Result<(), DomainError> {
    validate_factor_value(draft.kind, draft.value)?;

    if draft.kind == ComponentKind::Professional && draft.tier != TariffTier::Standard {
        return Err(DomainError::TieredProfessionalFactor);
    }

    let effective_year: FinancialYear = financial_year_of(draft.period.from());
    if effective_year != draft.financial_year {
        return Err(DomainError::FactorOutsideFinancialYear {
            financial_year: draft.financial_year,
            effective_year,
        });
    }

    Ok(())
}

/// Validates a factor value.
///
/// # Errors
///
/// Returns an error if the value is zero or negative.
pub fn validate_factor_value(kind: ComponentKind, value: Decimal) -> Result<(), DomainError> {
    if value <= Decimal::ZERO {
        return Err(DomainError::NonPositiveFactorValue { kind, value });
    }
    Ok(())
}

/// Validates a department override.
///
/// # Errors
///
/// Returns an error if neither value is set or a set value is not positive.
pub fn validate_override(pairing: &DepartmentOverride) -> Result<(), DomainError> {
    if pairing.technical_factor.is_none() && pairing.professional_factor.is_none() {
        return Err(DomainError::EmptyOverride);
    }

    for kind in ComponentKind::ALL {
        match pairing.value_for(kind) {
            Some(value) if value <= Decimal::ZERO => {
                return Err(DomainError::NonPositiveOverrideValue { kind, value });
            }
            _ => {}
        }
    }

    Ok(())
}

/// Parses an ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_iso_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Parses a decimal amount.
///
/// # Errors
///
/// Returns `DomainError::DecimalParseError` if the string is not a decimal.
pub fn parse_decimal(value: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(value.trim()).map_err(|e| DomainError::DecimalParseError {
        value: value.to_string(),
        error: e.to_string(),
    })
}
