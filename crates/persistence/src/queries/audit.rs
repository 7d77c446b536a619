// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use clinic_tariff_audit::AuditEvent;
use clinic_tariff_domain::FinancialYear;
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Retrieves audit events in insertion order.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `financial_year` - Restrict to events about this year; `None` for all
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn get_audit_timeline(
    conn: &mut SqliteConnection,
    financial_year: Option<FinancialYear>,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let mut query = audit_events::table
        .select(AuditEventRow::as_select())
        .order(audit_events::event_id.asc())
        .into_boxed();

    if let Some(year) = financial_year {
        query = query.filter(audit_events::financial_year.eq(i32::from(year.value())));
    }

    let rows: Vec<AuditEventRow> = query.load(conn)?;
    rows.into_iter()
        .map(AuditEventRow::into_audit_event)
        .collect()
}
