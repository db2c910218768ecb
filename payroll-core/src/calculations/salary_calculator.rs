//! Gross-to-net and net-to-gross salary calculations.
//!
//! [`SalaryCalculator`] validates requests, looks up the configuration for
//! the requested year and runs the [`TaxCalculator`] deduction stack. The
//! net-to-gross direction inverts that stack with a [`BisectionSolver`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use payroll_core::{GrossToNetRequest, SalaryCalculator, TaxConfigurationRegistry};
//!
//! let calculator = SalaryCalculator::new(Arc::new(TaxConfigurationRegistry::with_defaults()))
//!     .with_reference_date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
//!
//! let result = calculator
//!     .calculate_gross_to_net(&GrossToNetRequest::new(dec!(50000)))
//!     .unwrap();
//!
//! assert_eq!(result.net_salary, dec!(36242.88));
//! ```

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, instrument};

use crate::calculations::common::{clamp, round_half_up};
use crate::calculations::solver::{BisectionSolver, SearchInterval, SolverSettings};
use crate::calculations::tax_calculator::TaxCalculator;
use crate::calculations::validation::RequestValidator;
use crate::error::PayrollError;
use crate::models::{
    CalculationContext, GrossToNetRequest, NetToGrossRequest, SalaryBreakdown,
    SalaryCalculationResult, SalaryLimits, SalaryRequest, TaxConfiguration,
};
use crate::registry::TaxConfigurationRegistry;

/// Search interval for net-to-gross, as multiples of the target net.
const LOWER_BOUND_FACTOR: Decimal = dec!(1.1);
const UPPER_BOUND_FACTOR: Decimal = dec!(2.0);
const INITIAL_GUESS_FACTOR: Decimal = dec!(1.3);

/// Share of the SGK ceiling reported as the highest net salary.
const MAX_NET_RATIO: Decimal = dec!(0.7);

/// Salary calculator bound to a configuration registry.
///
/// Cloning is cheap; clones share the registry.
#[derive(Debug, Clone)]
pub struct SalaryCalculator {
    registry: Arc<TaxConfigurationRegistry>,
    reference_date: Option<NaiveDate>,
}

impl SalaryCalculator {
    /// Calculator that defaults year and month from the local date.
    pub fn new(registry: Arc<TaxConfigurationRegistry>) -> Self {
        Self {
            registry,
            reference_date: None,
        }
    }

    /// Fixes the date used for defaulting year and month and for the
    /// accepted year range.
    pub fn with_reference_date(
        mut self,
        date: NaiveDate,
    ) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn registry(&self) -> &Arc<TaxConfigurationRegistry> {
        &self.registry
    }

    /// Calculates deductions, net pay and employer cost for a gross salary.
    ///
    /// # Errors
    ///
    /// * [`PayrollError::Validation`] for an invalid request.
    /// * [`PayrollError::UnsupportedYear`] if the year is not registered.
    /// * [`PayrollError::SalaryLimit`] above the annualized salary ceiling.
    #[instrument(level = "debug", skip_all)]
    pub fn calculate_gross_to_net(
        &self,
        request: &GrossToNetRequest,
    ) -> Result<SalaryCalculationResult, PayrollError> {
        let (gross, context) = self.validator().validate_gross_to_net(request)?;
        let config = self.registry.get_configuration(context.year)?;

        gross_to_net(&config, round_half_up(gross), &context)
    }

    /// Finds the gross salary that yields the requested net salary.
    ///
    /// # Errors
    ///
    /// * [`PayrollError::Validation`] for an invalid request.
    /// * [`PayrollError::UnsupportedYear`] if the year is not registered.
    /// * [`PayrollError::SalaryLimit`] if even the lowest candidate gross
    ///   exceeds the salary ceiling.
    /// * [`PayrollError::Convergence`] if the iteration budget runs out.
    #[instrument(level = "debug", skip_all)]
    pub fn calculate_net_to_gross(
        &self,
        request: &NetToGrossRequest,
    ) -> Result<SalaryCalculationResult, PayrollError> {
        let (net, context, settings) = self.validator().validate_net_to_gross(request)?;
        let config = self.registry.get_configuration(context.year)?;

        solve_net_to_gross(&config, net, &context, settings)
    }

    /// Dispatches to gross-to-net or net-to-gross depending on which amount
    /// the request carries.
    ///
    /// # Errors
    ///
    /// [`PayrollError::Validation`] unless exactly one amount is given, plus
    /// anything the chosen direction returns.
    pub fn calculate_salary(
        &self,
        request: &SalaryRequest,
    ) -> Result<SalaryCalculationResult, PayrollError> {
        self.validator().validate_salary_request(request)?;

        if request.gross_salary.is_some() {
            self.calculate_gross_to_net(&request.gross_to_net())
        } else {
            self.calculate_net_to_gross(&request.net_to_gross())
        }
    }

    /// Salary range supported for `year`.
    ///
    /// # Errors
    ///
    /// [`PayrollError::UnsupportedYear`] if the year is not registered.
    pub fn get_salary_limits(
        &self,
        year: i32,
    ) -> Result<SalaryLimits, PayrollError> {
        let config = self.registry.get_configuration(year)?;

        Ok(SalaryLimits {
            min_gross_salary: config.minimum_wage.gross,
            max_gross_salary: config.sgk.upper_limit,
            min_net_salary: config.minimum_wage.net,
            max_net_salary: round_half_up(config.sgk.upper_limit * MAX_NET_RATIO),
        })
    }

    fn validator(&self) -> RequestValidator {
        let today = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        RequestValidator::new(today)
    }
}

/// Runs the deduction stack for an already validated gross salary.
///
/// Components are summed exactly and rounded once: `total_deductions` and
/// `employer_cost` come from the exact sums, so the reported components may
/// differ from them by a kuruş. Deductions grow by less than one kuruş per
/// kuruş of gross, so net pay over whole-kuruş gross never decreases.
///
/// # Errors
///
/// * [`PayrollError::NegativeSalary`] or [`PayrollError::SalaryLimit`] when
///   the gross is outside the accepted range.
/// * [`PayrollError::InvalidConfiguration`] if `config` has no brackets.
pub fn gross_to_net(
    config: &TaxConfiguration,
    gross_salary: Decimal,
    context: &CalculationContext,
) -> Result<SalaryCalculationResult, PayrollError> {
    let calculator = TaxCalculator::new(config);
    calculator.validate_salary_limits(gross_salary)?;

    let month = Decimal::from(context.month);
    let context = CalculationContext {
        cumulative_income: gross_salary * month,
        ..context.clone()
    };

    let sgk = calculator.calculate_sgk_contributions(gross_salary);
    let taxable_income = gross_salary - sgk.employee_share - sgk.unemployment_employee;
    let income_tax = calculator.calculate_income_tax(taxable_income, &context)?;
    let stamp_tax = calculator.calculate_stamp_tax(gross_salary);

    let total_deductions = round_half_up(
        sgk.employee_share + sgk.unemployment_employee + income_tax.tax + stamp_tax.stamp_tax,
    );
    let net_salary = gross_salary - total_deductions;
    let employer_cost =
        gross_salary + round_half_up(sgk.employer_share + sgk.unemployment_employer);

    let reported_tax = round_half_up(income_tax.tax);

    Ok(SalaryCalculationResult {
        year: context.year,
        month: context.month,
        gross_salary,
        net_salary,
        sgk_employee_share: round_half_up(sgk.employee_share),
        unemployment_insurance: round_half_up(sgk.unemployment_employee),
        income_tax: reported_tax,
        stamp_tax: round_half_up(stamp_tax.stamp_tax),
        total_deductions,
        employer_cost,
        employer_sgk_share: round_half_up(sgk.employer_share),
        employer_unemployment_insurance: round_half_up(sgk.unemployment_employer),
        iterations: None,
        breakdown: SalaryBreakdown {
            taxable_income: round_half_up(taxable_income),
            applied_tax_bracket: income_tax.applied_bracket,
            minimum_wage_exemption: round_half_up(stamp_tax.minimum_wage_exemption),
            minimum_living_allowance: round_half_up(income_tax.minimum_living_allowance),
            disability_deduction: round_half_up(income_tax.disability_deduction),
            effective_tax_rate: income_tax.effective_rate,
            cumulative_income: context.cumulative_income,
            cumulative_tax: reported_tax * month,
        },
    })
}

/// Bisects for the gross salary whose net is within `settings.precision`
/// of `net_salary`.
///
/// The search starts at `1.3 × net` inside `[1.1 × net, 2 × net]`, with the
/// upper bound capped at the salary ceiling. Candidates are rounded to kuruş
/// before they are evaluated.
///
/// # Errors
///
/// * [`PayrollError::SalaryLimit`] if `1.1 × net` is above the ceiling.
/// * [`PayrollError::Convergence`] if the iteration budget runs out.
pub fn solve_net_to_gross(
    config: &TaxConfiguration,
    net_salary: Decimal,
    context: &CalculationContext,
    settings: SolverSettings,
) -> Result<SalaryCalculationResult, PayrollError> {
    let ceiling = TaxCalculator::new(config).salary_ceiling();

    let lower = net_salary * LOWER_BOUND_FACTOR;
    if lower > ceiling {
        return Err(PayrollError::SalaryLimit {
            gross: round_half_up(lower),
            ceiling,
        });
    }
    let upper = (net_salary * UPPER_BOUND_FACTOR).min(ceiling);
    let interval = SearchInterval {
        lower,
        upper,
        initial_guess: clamp(net_salary * INITIAL_GUESS_FACTOR, lower, upper),
    };

    let solution = BisectionSolver::new(settings).solve(net_salary, interval, |guess| {
        let result = gross_to_net(config, round_half_up(guess), context)?;
        Ok((result.net_salary, result))
    })?;

    debug!(
        net_salary = %net_salary,
        gross_salary = %solution.output.gross_salary,
        iterations = solution.iterations,
        "net-to-gross converged"
    );

    Ok(SalaryCalculationResult {
        iterations: Some(solution.iterations),
        ..solution.output
    })
}
