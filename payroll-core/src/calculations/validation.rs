//! Request validation.
//!
//! Every problem in a request is collected before anything is reported, so
//! callers see all of them at once.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::calculations::solver::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_PRECISION, MAX_ITERATIONS, MAX_PRECISION, MIN_ITERATIONS,
    SolverSettings,
};
use crate::error::{PayrollError, ValidationErrors};
use crate::models::{
    CalculationContext, GrossToNetRequest, NetToGrossRequest, PersonalDetails, SalaryRequest,
};

/// Earliest tax year a request may name.
pub const MIN_REQUEST_YEAR: i32 = 2024;

pub const BOTH_SALARIES_GIVEN: &str = "Cannot specify both gross and net salary";
pub const NO_SALARY_GIVEN: &str = "Either gross or net salary must be specified";

/// Validates requests relative to a reference date.
///
/// The date supplies the default year and month and the upper end of the
/// accepted year range (`MIN_REQUEST_YEAR..=year + 1`).
#[derive(Debug, Clone, Copy)]
pub struct RequestValidator {
    today: NaiveDate,
}

impl RequestValidator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn max_year(&self) -> i32 {
        self.today.year() + 1
    }

    /// Returns the gross salary and a context with defaults filled in.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::Validation`] listing every invalid field.
    pub fn validate_gross_to_net(
        &self,
        request: &GrossToNetRequest,
    ) -> Result<(Decimal, CalculationContext), PayrollError> {
        let mut errors = ValidationErrors::new();
        check_amount(request.gross_salary, "Gross salary", &mut errors);
        self.check_details(&request.details, &mut errors);
        errors.into_result()?;

        let gross = request.gross_salary.unwrap_or_default();
        Ok((gross, self.context(&request.details)))
    }

    /// Returns the net salary, a context with defaults filled in, and the
    /// solver settings.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::Validation`] listing every invalid field.
    pub fn validate_net_to_gross(
        &self,
        request: &NetToGrossRequest,
    ) -> Result<(Decimal, CalculationContext, SolverSettings), PayrollError> {
        let mut errors = ValidationErrors::new();
        check_amount(request.net_salary, "Net salary", &mut errors);
        self.check_details(&request.details, &mut errors);
        check_solver(request.max_iterations, request.precision, &mut errors);
        errors.into_result()?;

        let net = request.net_salary.unwrap_or_default();
        let settings = SolverSettings {
            max_iterations: request
                .max_iterations
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
            precision: request.precision.unwrap_or(DEFAULT_PRECISION),
        };
        Ok((net, self.context(&request.details), settings))
    }

    /// Checks a dispatcher request as a whole.
    ///
    /// Exactly one of gross and net salary must be present; the remaining
    /// fields are checked together with that rule.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::Validation`] listing every problem found.
    pub fn validate_salary_request(
        &self,
        request: &SalaryRequest,
    ) -> Result<(), PayrollError> {
        let mut errors = ValidationErrors::new();

        match (request.gross_salary, request.net_salary) {
            (Some(_), Some(_)) => errors.push(BOTH_SALARIES_GIVEN),
            (None, None) => errors.push(NO_SALARY_GIVEN),
            (Some(gross), None) => check_amount(Some(gross), "Gross salary", &mut errors),
            (None, Some(net)) => {
                check_amount(Some(net), "Net salary", &mut errors);
                check_solver(request.max_iterations, request.precision, &mut errors);
            }
        }
        self.check_details(&request.details, &mut errors);

        errors.into_result()
    }

    fn check_details(
        &self,
        details: &PersonalDetails,
        errors: &mut ValidationErrors,
    ) {
        if let Some(year) = details.year {
            if !(MIN_REQUEST_YEAR..=self.max_year()).contains(&year) {
                errors.push(format!(
                    "Year must be between {MIN_REQUEST_YEAR} and {}",
                    self.max_year()
                ));
            }
        }

        if let Some(month) = details.month {
            if !(1..=12).contains(&month) {
                errors.push("Month must be between 1 and 12");
            }
        }

        if details.dependent_count.is_some_and(|count| count < 0) {
            errors.push("Dependent count cannot be negative");
        }

        // A disabled employee without a degree gets no disability deduction.
        if details
            .disability_degree
            .is_some_and(|degree| !(1..=3).contains(&degree))
        {
            errors.push("Disability degree must be 1, 2 or 3");
        }
    }

    fn context(
        &self,
        details: &PersonalDetails,
    ) -> CalculationContext {
        let year = details.year.unwrap_or_else(|| self.today.year());
        let month = details
            .month
            .and_then(|m| u32::try_from(m).ok())
            .unwrap_or_else(|| self.today.month());

        CalculationContext {
            is_married: details.is_married.unwrap_or(false),
            dependent_count: details
                .dependent_count
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            is_disabled: details.is_disabled.unwrap_or(false),
            disability_degree: details.disability_degree.and_then(|d| u8::try_from(d).ok()),
            ..CalculationContext::new(year, month)
        }
    }
}

fn check_amount(
    amount: Option<Decimal>,
    label: &str,
    errors: &mut ValidationErrors,
) {
    match amount {
        None => errors.push(format!("{label} is required")),
        Some(value) if value < Decimal::ZERO => errors.push(format!("{label} cannot be negative")),
        Some(_) => {}
    }
}

fn check_solver(
    max_iterations: Option<i32>,
    precision: Option<Decimal>,
    errors: &mut ValidationErrors,
) {
    let iteration_range = i64::from(MIN_ITERATIONS)..=i64::from(MAX_ITERATIONS);
    if max_iterations.is_some_and(|n| !iteration_range.contains(&i64::from(n))) {
        errors.push(format!(
            "Max iterations must be between {MIN_ITERATIONS} and {MAX_ITERATIONS}"
        ));
    }

    if precision.is_some_and(|p| p <= Decimal::ZERO || p > MAX_PRECISION) {
        errors.push(format!(
            "Precision must be greater than 0 and at most {MAX_PRECISION}"
        ));
    }
}
