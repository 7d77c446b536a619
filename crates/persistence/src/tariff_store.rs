// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Engine collaborator traits backed by `SQLite`.

use clinic_tariff::{FactorWriter, FreezeWrite, StoreError, TariffStore};
use clinic_tariff_audit::AuditEvent;
use clinic_tariff_domain::{
    ComponentKind, DepartmentId, DepartmentOverride, Factor, FinancialYear, FrozenStamp, Service,
    ServiceComponent, ServiceId, TariffTier, YearFreeze,
};
use rust_decimal::Decimal;

use crate::{Persistence, mutations, queries};

impl TariffStore for Persistence {
    fn find_service(&self, service_id: ServiceId) -> Result<Option<Service>, StoreError> {
        self.with_conn(|conn| queries::catalog::find_service(conn, service_id.value()))
            .map_err(|e| e.into_store_error("find_service"))
    }

    fn find_components(&self, service_id: ServiceId) -> Result<Vec<ServiceComponent>, StoreError> {
        self.with_conn(|conn| queries::catalog::find_components(conn, service_id.value()))
            .map_err(|e| e.into_store_error("find_components"))
    }

    fn factor_candidates(
        &self,
        kind: ComponentKind,
        tier: TariffTier,
        financial_year: FinancialYear,
    ) -> Result<Vec<Factor>, StoreError> {
        self.with_conn(|conn| queries::factors::factor_candidates(conn, kind, tier, financial_year))
            .map_err(|e| e.into_store_error("factor_candidates"))
    }

    fn count_factors(&self, financial_year: FinancialYear) -> Result<u64, StoreError> {
        self.with_conn(|conn| queries::factors::count_live_factors(conn, financial_year))
            .map_err(|e| e.into_store_error("count_factors"))
    }

    fn find_override(
        &self,
        service_id: ServiceId,
        department_id: DepartmentId,
    ) -> Result<Option<DepartmentOverride>, StoreError> {
        self.with_conn(|conn| {
            queries::catalog::find_override(conn, service_id.value(), department_id.value())
        })
        .map_err(|e| e.into_store_error("find_override"))
    }

    fn year_freeze(&self, financial_year: FinancialYear) -> Result<Option<YearFreeze>, StoreError> {
        self.with_conn(|conn| queries::freeze::year_freeze(conn, financial_year))
            .map_err(|e| e.into_store_error("year_freeze"))
    }

    fn row_freeze_stamp(
        &self,
        financial_year: FinancialYear,
    ) -> Result<Option<FrozenStamp>, StoreError> {
        self.with_conn(|conn| queries::freeze::row_freeze_stamp(conn, financial_year))
            .map_err(|e| e.into_store_error("row_freeze_stamp"))
    }

    fn freeze_factors(
        &self,
        financial_year: FinancialYear,
        stamp: &FrozenStamp,
    ) -> Result<FreezeWrite, StoreError> {
        self.with_conn(|conn| mutations::freeze::freeze_financial_year(conn, financial_year, stamp))
            .map_err(|e| e.into_store_error("freeze_factors"))
    }

    fn append_audit_event(&self, event: &AuditEvent) -> Result<i64, StoreError> {
        self.with_conn(|conn| mutations::audit::persist_audit_event(conn, event))
            .map_err(|e| e.into_store_error("append_audit_event"))
    }
}

impl FactorWriter for Persistence {
    fn get_factor(&self, factor_id: i64) -> Result<Option<Factor>, StoreError> {
        self.with_conn(|conn| queries::factors::get_factor(conn, factor_id))
            .map_err(|e| e.into_store_error("get_factor"))
    }

    fn insert_factor(&self, factor: &Factor) -> Result<Option<i64>, StoreError> {
        self.with_conn(|conn| mutations::factors::insert_factor(conn, factor))
            .map_err(|e| e.into_store_error("insert_factor"))
    }

    fn update_factor_value(&self, factor_id: i64, value: Decimal) -> Result<bool, StoreError> {
        self.with_conn(|conn| mutations::factors::update_factor_value(conn, factor_id, value))
            .map_err(|e| e.into_store_error("update_factor_value"))
    }

    fn deactivate_factor(&self, factor_id: i64) -> Result<bool, StoreError> {
        self.with_conn(|conn| mutations::factors::deactivate_factor(conn, factor_id))
            .map_err(|e| e.into_store_error("deactivate_factor"))
    }
}
