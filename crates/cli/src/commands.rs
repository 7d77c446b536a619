// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command implementations.
//!
//! Each command returns a serializable report; `main` prints it as JSON.

use clinic_tariff::{
    CalculationRequest, CalculationResult, EngineError, FactorChange, FactorValidationReport,
    FreezeOutcome, Quote, TariffEngine, TariffStore,
};
use clinic_tariff_audit::Cause;
use clinic_tariff_domain::{
    ActorId, DepartmentId, FinancialYear, FreezeState, FrozenStamp, ServiceId, SolarDate,
    financial_year_of,
};
use clinic_tariff_persistence::Persistence;
use serde::Serialize;
use time::Date;
use tracing::info;

use crate::csv_import::{ImportRow, parse_factor_csv};
use crate::error::CliError;
use crate::{AuditArgs, PricingArgs};

/// Freeze status of one financial year.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub financial_year: FinancialYear,
    pub state: &'static str,
    pub frozen: Option<FrozenStamp>,
    pub live_factor_rows: u64,
    pub first_day: Date,
    pub last_day: Date,
}

/// The solar calendar position of a Gregorian date.
#[derive(Debug, Clone, Serialize)]
pub struct YearOfReport {
    pub date: Date,
    pub financial_year: FinancialYear,
    pub solar_date: String,
}

/// Outcome of a factor import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub dry_run: bool,
    pub validated_rows: usize,
    pub created_factor_ids: Vec<i64>,
}

impl PricingArgs {
    /// Builds the engine request from the command-line flags.
    ///
    /// # Errors
    ///
    /// Returns an error if an id or year is out of range.
    pub fn to_request(&self) -> Result<(ServiceId, CalculationRequest), CliError> {
        let service_id: ServiceId = ServiceId::new(self.service_id)?;
        let mut request: CalculationRequest = CalculationRequest::new();
        if let Some(department) = self.department {
            request = request.in_department(DepartmentId::new(department)?);
        }
        if let Some(as_of) = self.as_of {
            request = request.on(as_of);
        }
        if let Some(year) = self.financial_year {
            request = request.for_financial_year(FinancialYear::new(year)?);
        }
        Ok((service_id, request))
    }
}

impl AuditArgs {
    /// Returns the validated actor and the cause for audited commands.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor id is empty.
    pub fn actor_and_cause(&self) -> Result<(ActorId, Cause), CliError> {
        let actor: ActorId = ActorId::new(&self.actor)?;
        let cause: Cause = Cause::new(self.cause_id.clone(), self.reason.clone());
        Ok((actor, cause))
    }
}

/// Prices a service through the factor table or legacy constants.
///
/// # Errors
///
/// Returns any engine error unchanged.
pub fn calculate(
    engine: &TariffEngine<Persistence>,
    args: &PricingArgs,
) -> Result<CalculationResult, CliError> {
    let (service_id, request) = args.to_request()?;
    Ok(engine.calculate_by_id(service_id, &request)?)
}

/// Prices a service, falling back to its flat price when it has no components.
///
/// # Errors
///
/// Returns any engine error unchanged.
pub fn quote(engine: &TariffEngine<Persistence>, args: &PricingArgs) -> Result<Quote, CliError> {
    let (service_id, request) = args.to_request()?;
    Ok(engine.quote(service_id, &request)?)
}

/// Freezes a financial year.
///
/// # Errors
///
/// Returns an error if the year or actor is invalid or the store fails.
pub fn freeze(
    engine: &TariffEngine<Persistence>,
    financial_year: i64,
    audit: &AuditArgs,
) -> Result<FreezeOutcome, CliError> {
    let financial_year: FinancialYear = FinancialYear::new(financial_year)?;
    let (actor, cause) = audit.actor_and_cause()?;
    Ok(engine.freeze(financial_year, &actor, cause)?)
}

/// Reports the freeze state of a financial year (the current one by default).
///
/// # Errors
///
/// Returns an error if the year is invalid or the store fails.
pub fn status(
    engine: &TariffEngine<Persistence>,
    financial_year: Option<i64>,
) -> Result<StatusReport, CliError> {
    let financial_year: FinancialYear = match financial_year {
        Some(year) => FinancialYear::new(year)?,
        None => engine.current_financial_year(),
    };

    let state: FreezeState = engine.freeze_state(financial_year)?;
    let live_factor_rows: u64 = engine
        .store()
        .count_factors(financial_year)
        .map_err(EngineError::from)?;

    Ok(StatusReport {
        financial_year,
        state: state.as_str(),
        frozen: state.stamp().cloned(),
        live_factor_rows,
        first_day: financial_year.first_day()?,
        last_day: financial_year.last_day()?,
    })
}

/// Runs the pre-flight factor check.
///
/// Returns the report together with an error when factors are missing, so
/// the caller can print the report and still exit unsuccessfully.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn validate(
    engine: &TariffEngine<Persistence>,
    as_of: Option<Date>,
) -> Result<(FactorValidationReport, Option<CliError>), CliError> {
    let report: FactorValidationReport = engine.validate_required_factors(as_of)?;
    let failure: Option<CliError> = (!report.is_valid).then(|| CliError::ValidationFailed {
        missing: report.missing.len(),
    });
    Ok((report, failure))
}

/// Maps a Gregorian date to its financial year.
#[must_use]
pub fn year_of(date: Date) -> YearOfReport {
    let solar: SolarDate = SolarDate::from_gregorian(date);
    YearOfReport {
        date,
        financial_year: financial_year_of(date),
        solar_date: format!(
            "{:04}-{:02}-{:02}",
            solar.year(),
            solar.month(),
            solar.day()
        ),
    }
}

/// Imports factors from CSV content.
///
/// Every row is validated first; rows are created through the engine only
/// when all of them pass. Creation stops at the first engine error (for
/// example a frozen year), leaving earlier rows in place.
///
/// # Errors
///
/// Returns the row errors if validation fails, or the first engine error.
pub fn import_factors(
    engine: &TariffEngine<Persistence>,
    csv_content: &str,
    audit: &AuditArgs,
    dry_run: bool,
) -> Result<ImportSummary, CliError> {
    let rows: Vec<ImportRow> = parse_factor_csv(csv_content)?;
    let (actor, cause) = audit.actor_and_cause()?;

    if dry_run {
        info!(rows = rows.len(), "Factor import validated (dry run)");
        return Ok(ImportSummary {
            dry_run,
            validated_rows: rows.len(),
            created_factor_ids: Vec::new(),
        });
    }

    let mut created_factor_ids: Vec<i64> = Vec::with_capacity(rows.len());
    for row in &rows {
        let change: FactorChange = engine.create_factor(row.draft.clone(), &actor, cause.clone())?;
        if let Some(id) = change.factor.factor_id {
            created_factor_ids.push(id);
        }
    }

    info!(created = created_factor_ids.len(), "Imported factors");

    Ok(ImportSummary {
        dry_run,
        validated_rows: rows.len(),
        created_factor_ids,
    })
}
