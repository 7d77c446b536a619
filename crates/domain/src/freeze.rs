// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Freeze lifecycle of financial-year rate data.
//!
//! A financial year is either `Open` or `Frozen`. The only transition is
//! `Open -> Frozen`; a frozen stamp is never removed.

use crate::types::{ActorId, FinancialYear};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Who froze a year (or row) and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenStamp {
    /// The moment the freeze was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    /// The actor who performed the freeze.
    pub by: ActorId,
}

impl FrozenStamp {
    /// Creates a new `FrozenStamp`.
    #[must_use]
    pub const fn new(at: OffsetDateTime, by: ActorId) -> Self {
        Self { at, by }
    }
}

/// Freeze state of a financial year or of a single factor row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state")]
pub enum FreezeState {
    /// Rates may still be edited.
    #[default]
    Open,
    /// Rates are closed.
    Frozen(FrozenStamp),
}

impl FreezeState {
    /// Returns whether this state is frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        matches!(self, Self::Frozen(_))
    }

    /// Returns the frozen stamp, if any.
    #[must_use]
    pub const fn stamp(&self) -> Option<&FrozenStamp> {
        match self {
            Self::Open => None,
            Self::Frozen(stamp) => Some(stamp),
        }
    }

    /// Checks if a transition from this state to another is valid.
    ///
    /// `Open -> Frozen` is the only valid transition.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (Self::Open, Self::Frozen(_)))
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Frozen(_) => "Frozen",
        }
    }
}

impl std::fmt::Display for FreezeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The explicit, per-year freeze record.
///
/// At most one record exists per financial year; it is written exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearFreeze {
    /// The frozen financial year.
    pub financial_year: FinancialYear,
    /// Who froze it and when.
    pub stamp: FrozenStamp,
}
