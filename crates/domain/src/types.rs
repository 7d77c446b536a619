// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifies a clinical service in the catalog.
///
/// Service ids are assigned by the catalog and are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ServiceId(i64);

impl ServiceId {
    /// Creates a new `ServiceId`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidServiceId` if `value` is zero or negative.
    pub const fn new(value: i64) -> Result<Self, DomainError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidServiceId(value))
        }
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ServiceId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceId> for i64 {
    fn from(id: ServiceId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a clinic department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct DepartmentId(i64);

impl DepartmentId {
    /// Creates a new `DepartmentId`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDepartmentId` if `value` is zero or negative.
    pub const fn new(value: i64) -> Result<Self, DomainError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidDepartmentId(value))
        }
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for DepartmentId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DepartmentId> for i64 {
    fn from(id: DepartmentId) -> Self {
        id.0
    }
}

impl std::fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the person or process performing an administrative action.
///
/// Actor ids are trimmed and must not be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    /// Creates a new `ActorId`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidActorId` if the trimmed value is empty.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidActorId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the actor id.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActorId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ActorId> for String {
    fn from(id: ActorId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The priced portion of a service a component or factor applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// The technical (facility and equipment) portion.
    Technical,
    /// The professional (clinician) portion.
    Professional,
}

impl ComponentKind {
    /// Both kinds, technical first.
    pub const ALL: [Self; 2] = [Self::Technical, Self::Professional];

    /// Converts this kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "Technical",
            Self::Professional => "Professional",
        }
    }
}

impl FromStr for ComponentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technical" => Ok(Self::Technical),
            "professional" => Ok(Self::Professional),
            _ => Err(DomainError::InvalidComponentKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The tariff tier a service is classified into by national tariff regulation.
///
/// Hashtagged services are priced with a separate technical factor. The
/// professional factor is never tiered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TariffTier {
    /// Regular services.
    #[default]
    Standard,
    /// Services carrying the hashtag marker.
    Hashtagged,
}

impl TariffTier {
    /// Maps the stored hashtag flag to a tier.
    #[must_use]
    pub const fn from_hashtag(is_hashtagged: bool) -> Self {
        if is_hashtagged {
            Self::Hashtagged
        } else {
            Self::Standard
        }
    }

    /// Returns the stored hashtag flag for this tier.
    #[must_use]
    pub const fn is_hashtagged(self) -> bool {
        matches!(self, Self::Hashtagged)
    }

    /// Converts this tier to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Hashtagged => "Hashtagged",
        }
    }
}

impl FromStr for TariffTier {
    type Err = DomainError;

    /// Accepts tier names as well as the boolean spellings used by tariff sheets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "false" | "0" | "no" => Ok(Self::Standard),
            "hashtagged" | "true" | "1" | "yes" | "#" => Ok(Self::Hashtagged),
            _ => Err(DomainError::InvalidTier(s.to_string())),
        }
    }
}

impl std::fmt::Display for TariffTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial year: the solar calendar year rates are versioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct FinancialYear(u16);

impl FinancialYear {
    /// The earliest solar year this system accepts: the year of 1900-01-01.
    pub const MIN: u16 = 1278;
    /// The latest solar year this system accepts: the year of 2200-12-31.
    pub const MAX: u16 = 1579;

    /// Creates a new `FinancialYear`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFinancialYear` if the year is outside
    /// `MIN..=MAX`.
    pub fn new(year: i64) -> Result<Self, DomainError> {
        u16::try_from(year)
            .ok()
            .filter(|y| (Self::MIN..=Self::MAX).contains(y))
            .map(Self)
            .ok_or(DomainError::InvalidFinancialYear(year))
    }

    /// Creates a `FinancialYear` without range validation.
    ///
    /// Used by the calendar mapper, which clamps into `MIN..=MAX` first.
    #[must_use]
    pub(crate) const fn from_solar_year(year: u16) -> Self {
        Self(year)
    }

    /// Returns the solar year number.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns the following financial year.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<i64> for FinancialYear {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FinancialYear> for u16 {
    fn from(year: FinancialYear) -> Self {
        year.0
    }
}

impl std::fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
