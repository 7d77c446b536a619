// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and the conversions between stored columns and domain values.
//!
//! Decimals are stored as text, dates as `YYYY-MM-DD`, timestamps as
//! RFC 3339 and flags as `0`/`1` integers.

use clinic_tariff_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clinic_tariff_domain::{
    ActorId, ComponentKind, DepartmentId, DepartmentOverride, EffectivePeriod, Factor,
    FinancialYear, FreezeState, FrozenStamp, Service, ServiceComponent, ServiceId, TariffTier,
    YearFreeze, parse_decimal, parse_iso_date,
};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};

use crate::diesel_schema::{
    audit_events, department_service_overrides, factors, financial_year_freezes,
    service_components, services,
};
use crate::error::PersistenceError;

/// A row of the `services` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ServiceRow {
    pub service_id: i64,
    pub title: String,
    pub is_hashtagged: i32,
    pub flat_price: Option<String>,
}

impl ServiceRow {
    /// Converts the row into a service header without components.
    ///
    /// # Errors
    ///
    /// Returns an error if a column holds an invalid value.
    pub fn into_service(self) -> Result<Service, PersistenceError> {
        let flat_price: Option<Decimal> = self
            .flat_price
            .as_deref()
            .map(|raw| decode_decimal("services", raw))
            .transpose()?;

        Ok(Service::new(
            ServiceId::new(self.service_id)?,
            self.title,
            TariffTier::from_hashtag(decode_flag(self.is_hashtagged)),
            Vec::new(),
            flat_price,
        ))
    }
}

/// A row of the `service_components` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = service_components)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ComponentRow {
    pub component_id: i64,
    pub service_id: i64,
    pub kind: String,
    pub coefficient: String,
    pub is_active: i32,
    pub is_deleted: i32,
}

impl ComponentRow {
    /// Converts the row into a domain component.
    ///
    /// # Errors
    ///
    /// Returns an error if a column holds an invalid value.
    pub fn into_component(self) -> Result<ServiceComponent, PersistenceError> {
        Ok(ServiceComponent {
            component_id: Some(self.component_id),
            kind: ComponentKind::from_str(&self.kind)?,
            coefficient: decode_decimal("service_components", &self.coefficient)?,
            is_active: decode_flag(self.is_active),
            is_deleted: decode_flag(self.is_deleted),
        })
    }
}

/// A row of the `factors` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = factors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FactorRow {
    pub factor_id: i64,
    pub kind: String,
    pub is_hashtagged: i32,
    pub financial_year: i32,
    pub value: String,
    pub effective_from: String,
    pub effective_to: Option<String>,
    pub is_active: i32,
    pub is_deleted: i32,
    pub frozen_at: Option<String>,
    pub frozen_by: Option<String>,
}

impl FactorRow {
    /// Converts the row into a domain factor.
    ///
    /// # Errors
    ///
    /// Returns an error if a column holds an invalid value.
    pub fn into_factor(self) -> Result<Factor, PersistenceError> {
        let from: Date = parse_iso_date(&self.effective_from)?;
        let to: Option<Date> = self
            .effective_to
            .as_deref()
            .map(parse_iso_date)
            .transpose()?;

        Ok(Factor {
            factor_id: Some(self.factor_id),
            kind: ComponentKind::from_str(&self.kind)?,
            tier: TariffTier::from_hashtag(decode_flag(self.is_hashtagged)),
            financial_year: FinancialYear::new(i64::from(self.financial_year))?,
            value: decode_decimal("factors", &self.value)?,
            period: EffectivePeriod::new(from, to)?,
            is_active: decode_flag(self.is_active),
            is_deleted: decode_flag(self.is_deleted),
            freeze: decode_freeze("factors", self.frozen_at, self.frozen_by)?,
        })
    }
}

/// A new row for the `factors` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = factors)]
pub struct NewFactorRow {
    pub kind: String,
    pub is_hashtagged: i32,
    pub financial_year: i32,
    pub value: String,
    pub effective_from: String,
    pub effective_to: Option<String>,
    pub is_active: i32,
    pub is_deleted: i32,
    pub frozen_at: Option<String>,
    pub frozen_by: Option<String>,
}

impl NewFactorRow {
    /// Builds the insertable row for `factor`. Any id on `factor` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the freeze timestamp cannot be formatted.
    pub fn from_factor(factor: &Factor) -> Result<Self, PersistenceError> {
        let (frozen_at, frozen_by): (Option<String>, Option<String>) = match factor.freeze.stamp()
        {
            Some(stamp) => (
                Some(encode_timestamp(stamp.at)?),
                Some(stamp.by.value().to_string()),
            ),
            None => (None, None),
        };

        Ok(Self {
            kind: factor.kind.as_str().to_string(),
            is_hashtagged: encode_flag(factor.tier.is_hashtagged()),
            financial_year: i32::from(factor.financial_year.value()),
            value: factor.value.to_string(),
            effective_from: factor.period.from().to_string(),
            effective_to: factor.period.to().map(|d| d.to_string()),
            is_active: encode_flag(factor.is_active),
            is_deleted: encode_flag(factor.is_deleted),
            frozen_at,
            frozen_by,
        })
    }
}

/// A row of the `department_service_overrides` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = department_service_overrides)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OverrideRow {
    pub override_id: i64,
    pub service_id: i64,
    pub department_id: i64,
    pub technical_factor: Option<String>,
    pub professional_factor: Option<String>,
    pub is_active: i32,
    pub is_deleted: i32,
}

impl OverrideRow {
    /// Converts the row into a domain override.
    ///
    /// # Errors
    ///
    /// Returns an error if a column holds an invalid value.
    pub fn into_override(self) -> Result<DepartmentOverride, PersistenceError> {
        let table: &'static str = "department_service_overrides";
        Ok(DepartmentOverride {
            override_id: Some(self.override_id),
            service_id: ServiceId::new(self.service_id)?,
            department_id: DepartmentId::new(self.department_id)?,
            technical_factor: self
                .technical_factor
                .as_deref()
                .map(|raw| decode_decimal(table, raw))
                .transpose()?,
            professional_factor: self
                .professional_factor
                .as_deref()
                .map(|raw| decode_decimal(table, raw))
                .transpose()?,
            is_active: decode_flag(self.is_active),
            is_deleted: decode_flag(self.is_deleted),
        })
    }
}

/// A row of the `financial_year_freezes` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = financial_year_freezes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct YearFreezeRow {
    pub financial_year: i32,
    pub frozen_at: String,
    pub frozen_by: String,
}

impl YearFreezeRow {
    /// Converts the row into the per-year freeze record.
    ///
    /// # Errors
    ///
    /// Returns an error if a column holds an invalid value.
    pub fn into_year_freeze(self) -> Result<YearFreeze, PersistenceError> {
        Ok(YearFreeze {
            financial_year: FinancialYear::new(i64::from(self.financial_year))?,
            stamp: FrozenStamp::new(
                decode_timestamp("financial_year_freezes", &self.frozen_at)?,
                ActorId::new(&self.frozen_by)?,
            ),
        })
    }
}

/// A row of the `audit_events` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditEventRow {
    pub event_id: i64,
    pub financial_year: Option<i32>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
}

impl AuditEventRow {
    /// Reconstructs the audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON column cannot be deserialized.
    pub fn into_audit_event(self) -> Result<AuditEvent, PersistenceError> {
        let actor: Actor = serde_json::from_str(&self.actor_json)?;
        let cause: Cause = serde_json::from_str(&self.cause_json)?;
        let action: Action = serde_json::from_str(&self.action_json)?;
        let before: StateSnapshot = serde_json::from_str(&self.before_snapshot_json)?;
        let after: StateSnapshot = serde_json::from_str(&self.after_snapshot_json)?;

        let event: AuditEvent =
            AuditEvent::new(actor, cause, action, before, after).with_event_id(self.event_id);

        match self.financial_year {
            Some(year) => Ok(event.for_financial_year(FinancialYear::new(i64::from(year))?)),
            None => Ok(event),
        }
    }
}

/// Decodes a `0`/`1` flag column.
#[must_use]
pub const fn decode_flag(value: i32) -> bool {
    value != 0
}

/// Encodes a flag column.
#[must_use]
pub fn encode_flag(value: bool) -> i32 {
    i32::from(value)
}

/// Decodes a decimal stored as text.
///
/// # Errors
///
/// Returns an error if the text is not a decimal.
pub fn decode_decimal(table: &'static str, raw: &str) -> Result<Decimal, PersistenceError> {
    parse_decimal(raw).map_err(|e| PersistenceError::invalid_row(table, e.to_string()))
}

/// Formats a timestamp as RFC 3339.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented.
pub fn encode_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    at.format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses an RFC 3339 timestamp column.
///
/// # Errors
///
/// Returns an error if the text is not RFC 3339.
pub fn decode_timestamp(table: &'static str, raw: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|e| PersistenceError::invalid_row(table, format!("timestamp {raw:?}: {e}")))
}

/// Decodes the `frozen_at`/`frozen_by` column pair.
///
/// # Errors
///
/// Returns an error if only one of the pair is set or a value is invalid.
pub fn decode_freeze(
    table: &'static str,
    frozen_at: Option<String>,
    frozen_by: Option<String>,
) -> Result<FreezeState, PersistenceError> {
    match (frozen_at, frozen_by) {
        (None, None) => Ok(FreezeState::Open),
        (Some(at), Some(by)) => Ok(FreezeState::Frozen(FrozenStamp::new(
            decode_timestamp(table, &at)?,
            ActorId::new(&by)?,
        ))),
        _ => Err(PersistenceError::invalid_row(
            table,
            "frozen_at and frozen_by must be set together",
        )),
    }
}
