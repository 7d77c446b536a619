// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog maintenance.
//!
//! The engine only reads the catalog; these writes exist for loading
//! catalog data and for fixtures.

use clinic_tariff_domain::{DepartmentOverride, ServiceComponent, TariffTier};
use diesel::SqliteConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::backend::PersistenceBackend;
use crate::data_models::encode_flag;
use crate::diesel_schema::{department_service_overrides, departments, service_components, services};
use crate::error::PersistenceError;

/// Inserts a department and returns its id.
///
/// # Errors
///
/// Returns an error if the name is already taken or the insert fails.
pub fn insert_department(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(departments::table)
        .values(departments::name.eq(name))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Inserts a service header and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_service(
    conn: &mut SqliteConnection,
    title: &str,
    tier: TariffTier,
    flat_price: Option<Decimal>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(services::table)
        .values((
            services::title.eq(title),
            services::is_hashtagged.eq(encode_flag(tier.is_hashtagged())),
            services::flat_price.eq(flat_price.map(|price| price.to_string())),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Inserts a component for a service and returns its id.
///
/// # Errors
///
/// Returns an error if the service does not exist or the insert fails.
pub fn insert_component(
    conn: &mut SqliteConnection,
    service_id: i64,
    component: &ServiceComponent,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(service_components::table)
        .values((
            service_components::service_id.eq(service_id),
            service_components::kind.eq(component.kind.as_str()),
            service_components::coefficient.eq(component.coefficient.to_string()),
            service_components::is_active.eq(encode_flag(component.is_active)),
            service_components::is_deleted.eq(encode_flag(component.is_deleted)),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Inserts a department override and returns its id.
///
/// # Errors
///
/// Returns an error if a live pairing already exists, a referenced row is
/// missing, or the insert fails.
pub fn insert_override(
    conn: &mut SqliteConnection,
    pairing: &DepartmentOverride,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(department_service_overrides::table)
        .values((
            department_service_overrides::service_id.eq(pairing.service_id.value()),
            department_service_overrides::department_id.eq(pairing.department_id.value()),
            department_service_overrides::technical_factor
                .eq(pairing.technical_factor.map(|v| v.to_string())),
            department_service_overrides::professional_factor
                .eq(pairing.professional_factor.map(|v| v.to_string())),
            department_service_overrides::is_active.eq(encode_flag(pairing.is_active)),
            department_service_overrides::is_deleted.eq(encode_flag(pairing.is_deleted)),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Soft-deletes an override row.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn delete_override(conn: &mut SqliteConnection, override_id: i64) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(department_service_overrides::table.find(override_id))
        .set(department_service_overrides::is_deleted.eq(1))
        .execute(conn)?;

    Ok(updated > 0)
}
