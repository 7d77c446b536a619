// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog queries.

use clinic_tariff_domain::{DepartmentOverride, Service, ServiceComponent};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{ComponentRow, OverrideRow, ServiceRow};
use crate::diesel_schema::{department_service_overrides, departments, service_components, services};
use crate::error::PersistenceError;

/// Loads a service header by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is invalid.
pub fn find_service(
    conn: &mut SqliteConnection,
    service_id: i64,
) -> Result<Option<Service>, PersistenceError> {
    let row: Option<ServiceRow> = services::table
        .find(service_id)
        .select(ServiceRow::as_select())
        .first(conn)
        .optional()?;

    row.map(ServiceRow::into_service).transpose()
}

/// Loads every component of a service in catalog order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is invalid.
pub fn find_components(
    conn: &mut SqliteConnection,
    service_id: i64,
) -> Result<Vec<ServiceComponent>, PersistenceError> {
    let rows: Vec<ComponentRow> = service_components::table
        .filter(service_components::service_id.eq(service_id))
        .order(service_components::component_id.asc())
        .select(ComponentRow::as_select())
        .load(conn)?;

    rows.into_iter().map(ComponentRow::into_component).collect()
}

/// Loads the override for a `(service, department)` pairing.
///
/// A live row is preferred; otherwise the most recent retired row is
/// returned so the caller can see the pairing exists but does not apply.
///
/// # Errors
///
/// Returns an error if the query fails or the row is invalid.
pub fn find_override(
    conn: &mut SqliteConnection,
    service_id: i64,
    department_id: i64,
) -> Result<Option<DepartmentOverride>, PersistenceError> {
    let row: Option<OverrideRow> = department_service_overrides::table
        .filter(department_service_overrides::service_id.eq(service_id))
        .filter(department_service_overrides::department_id.eq(department_id))
        .order((
            department_service_overrides::is_deleted.asc(),
            department_service_overrides::is_active.desc(),
            department_service_overrides::override_id.desc(),
        ))
        .select(OverrideRow::as_select())
        .first(conn)
        .optional()?;

    row.map(OverrideRow::into_override).transpose()
}

/// Looks up a department id by name.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_department_id(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<i64>, PersistenceError> {
    Ok(departments::table
        .filter(departments::name.eq(name))
        .select(departments::department_id)
        .first::<i64>(conn)
        .optional()?)
}
