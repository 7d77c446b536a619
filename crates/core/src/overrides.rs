// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Department-specific factor replacements.

use crate::error::EngineError;
use crate::store::TariffStore;
use clinic_tariff_domain::{
    ComponentKind, DepartmentId, DepartmentOverride, DomainError, ServiceId, validate_override,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which factor axes an override replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppliedOverride {
    /// Both factors came from the registry or the legacy constants.
    #[default]
    None,
    /// Only the technical factor was replaced.
    Technical,
    /// Only the professional factor was replaced.
    Professional,
    /// Both factors were replaced.
    Both,
}

impl AppliedOverride {
    /// Returns whether any axis was replaced.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns the variant name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Technical => "Technical",
            Self::Professional => "Professional",
            Self::Both => "Both",
        }
    }
}

impl std::fmt::Display for AppliedOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Replacement factor values for one pricing call. Each axis is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedOverrides {
    /// Replacement technical factor.
    pub technical: Option<Decimal>,
    /// Replacement professional factor.
    pub professional: Option<Decimal>,
}

impl ResolvedOverrides {
    /// No replacement on either axis.
    pub const NONE: Self = Self {
        technical: None,
        professional: None,
    };

    /// Returns the replacement for `kind`, if any.
    #[must_use]
    pub const fn value_for(&self, kind: ComponentKind) -> Option<Decimal> {
        match kind {
            ComponentKind::Technical => self.technical,
            ComponentKind::Professional => self.professional,
        }
    }

    /// Returns which axes carry a replacement.
    #[must_use]
    pub const fn applied(&self) -> AppliedOverride {
        match (self.technical.is_some(), self.professional.is_some()) {
            (false, false) => AppliedOverride::None,
            (true, false) => AppliedOverride::Technical,
            (false, true) => AppliedOverride::Professional,
            (true, true) => AppliedOverride::Both,
        }
    }
}

impl From<&DepartmentOverride> for ResolvedOverrides {
    fn from(pairing: &DepartmentOverride) -> Self {
        Self {
            technical: pairing.technical_factor,
            professional: pairing.professional_factor,
        }
    }
}

/// Looks up department overrides for a service.
pub struct OverrideResolver<'a> {
    store: &'a dyn TariffStore,
}

impl<'a> OverrideResolver<'a> {
    /// Creates a resolver reading from `store`.
    #[must_use]
    pub const fn new(store: &'a dyn TariffStore) -> Self {
        Self { store }
    }

    /// Resolves the replacement values for `service_id` in `department_id`.
    ///
    /// Without a department, or without a live pairing, nothing is replaced.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Domain` if a live pairing carries a non-positive
    /// value, or `EngineError::Store` if the store fails.
    pub fn resolve(
        &self,
        service_id: ServiceId,
        department_id: Option<DepartmentId>,
    ) -> Result<ResolvedOverrides, EngineError> {
        let Some(department_id) = department_id else {
            return Ok(ResolvedOverrides::NONE);
        };

        let pairing: Option<DepartmentOverride> = self
            .store
            .find_override(service_id, department_id)?
            .filter(DepartmentOverride::is_live);

        let Some(pairing) = pairing else {
            return Ok(ResolvedOverrides::NONE);
        };

        // A live pairing with no values simply replaces nothing
        match validate_override(&pairing) {
            Ok(()) | Err(DomainError::EmptyOverride) => Ok(ResolvedOverrides::from(&pairing)),
            Err(err) => Err(err.into()),
        }
    }
}
