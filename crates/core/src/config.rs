// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::clock::SystemClock;
use crate::error::EngineError;
use crate::freeze::FrozenYearPolicy;
use crate::pricing::LegacyTariff;
use serde::{Deserialize, Serialize};
use time::UtcOffset;

/// The local offset of the clinic's calendar day: UTC+03:30.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 210;

/// Engine behaviour that varies between deployments.
///
/// Loaded from JSON. Every field is optional:
///
/// ```json
/// {
///   "frozen_year_policy": "block_calculation",
///   "legacy_fallback": { "standard_technical": "31000" },
///   "utc_offset_minutes": 210
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Whether frozen years may still be priced.
    pub frozen_year_policy: FrozenYearPolicy,
    /// Constants used for years without any factor rows. `None` disables the
    /// legacy mode entirely.
    pub legacy_fallback: Option<LegacyTariff>,
    /// Offset from UTC used to decide "today".
    pub utc_offset_minutes: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frozen_year_policy: FrozenYearPolicy::default(),
            legacy_fallback: None,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` if the JSON is malformed or names
    /// an unknown field.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| EngineError::invalid_input("config", e.to_string()))?;
        config.utc_offset()?;
        Ok(config)
    }

    /// Returns the configured UTC offset.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` if the offset is out of range.
    pub fn utc_offset(&self) -> Result<UtcOffset, EngineError> {
        let seconds: i32 = self.utc_offset_minutes.checked_mul(60).ok_or_else(|| {
            EngineError::invalid_input("utc_offset_minutes", "offset is out of range")
        })?;
        UtcOffset::from_whole_seconds(seconds)
            .map_err(|e| EngineError::invalid_input("utc_offset_minutes", e.to_string()))
    }

    /// Returns a wall clock at the configured offset.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` if the offset is out of range.
    pub fn system_clock(&self) -> Result<SystemClock, EngineError> {
        Ok(SystemClock::with_offset(self.utc_offset()?))
    }
}
