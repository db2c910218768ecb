//! Income tax, SGK contribution and stamp tax calculations for one tax year.
//!
//! # Deduction Stack
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | SGK base: gross clamped to `[lower_limit, upper_limit]` |
//! | 2    | Employee SGK and unemployment shares: base × rate |
//! | 3    | Taxable income: gross − employee SGK − employee unemployment |
//! | 4    | Adjusted income: taxable − minimum living allowance − disability deduction (minimum 0) |
//! | 5    | Income tax: cumulative tax of the applied bracket + rate × portion inside it |
//! | 6    | Stamp tax: rate × gross, or rate × (gross − minimum wage) when exempt |
//!
//! Every step is monotonically non-decreasing in gross salary, which the
//! net-to-gross solver depends on.
//!
//! Amounts are exact. Rounding to kuruş happens once, when a salary result
//! is reported.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::TaxCalculator;
//! use payroll_core::defaults::configuration_2025;
//! use payroll_core::CalculationContext;
//!
//! let config = configuration_2025();
//! let calculator = TaxCalculator::new(&config);
//!
//! let sgk = calculator.calculate_sgk_contributions(dec!(50000));
//! assert_eq!(sgk.employee_share, dec!(7000));
//!
//! let context = CalculationContext::new(2025, 1);
//! let income_tax = calculator.calculate_income_tax(dec!(42500), &context).unwrap();
//! assert_eq!(income_tax.tax, dec!(6075.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{clamp, max, round_rate};
use crate::error::{ConfigurationError, PayrollError};
use crate::models::{CalculationContext, TaxBracket, TaxConfiguration};
use crate::registry::minimum_wage_exempt_for_stamp_tax;

/// Number of months the salary ceiling is annualized over.
const MONTHS_PER_YEAR: u32 = 12;

/// Result of [`TaxCalculator::calculate_income_tax`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub tax: Decimal,
    pub applied_bracket: TaxBracket,
    /// `tax / adjusted_income`, zero when nothing was taxable.
    pub effective_rate: Decimal,
    /// Income the brackets were applied to.
    pub adjusted_income: Decimal,
    pub minimum_living_allowance: Decimal,
    pub disability_deduction: Decimal,
}

/// Employee and employer social security shares for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgkContributions {
    pub employee_share: Decimal,
    pub employer_share: Decimal,
    pub unemployment_employee: Decimal,
    pub unemployment_employer: Decimal,
    /// Gross salary clamped to the SGK floor and ceiling.
    pub sgk_base: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampTaxResult {
    pub stamp_tax: Decimal,
    /// Stamp tax waived on the portion of gross up to the minimum wage.
    pub minimum_wage_exemption: Decimal,
}

/// Stateless deduction calculator bound to a single year's configuration.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    config: &'a TaxConfiguration,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(config: &'a TaxConfiguration) -> Self {
        Self { config }
    }

    pub fn configuration(&self) -> &'a TaxConfiguration {
        self.config
    }

    /// Calculates monthly income tax on `taxable_income`.
    ///
    /// The minimum living allowance (by marital status and dependents) and
    /// the disability deduction are subtracted first; the remainder is taxed
    /// progressively.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidConfiguration`] if the configuration
    /// has no tax brackets.
    pub fn calculate_income_tax(
        &self,
        taxable_income: Decimal,
        context: &CalculationContext,
    ) -> Result<IncomeTaxResult, PayrollError> {
        let minimum_living_allowance = self
            .config
            .minimum_living_allowance
            .amount_for(context.is_married, context.dependent_count);
        let disability_deduction = self.disability_deduction(context);

        let adjusted_income = max(
            taxable_income - minimum_living_allowance - disability_deduction,
            Decimal::ZERO,
        );

        let (raw_tax, bracket) = self.bracket_tax(adjusted_income)?;
        let tax = max(raw_tax, Decimal::ZERO);

        let effective_rate = if adjusted_income.is_zero() {
            Decimal::ZERO
        } else {
            round_rate(tax / adjusted_income)
        };

        debug!(
            adjusted_income = %adjusted_income,
            bracket_min = %bracket.min_amount,
            rate = %bracket.rate,
            tax = %tax,
            "applied income tax bracket"
        );

        Ok(IncomeTaxResult {
            tax,
            applied_bracket: bracket.clone(),
            effective_rate,
            adjusted_income,
            minimum_living_allowance,
            disability_deduction,
        })
    }

    /// Unrounded tax on `adjusted_income` and the bracket it falls in.
    ///
    /// The applied bracket is the highest one whose `min_amount` lies below
    /// the income; zero income falls in the first bracket.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidConfiguration`] if there are no brackets.
    pub fn bracket_tax(
        &self,
        adjusted_income: Decimal,
    ) -> Result<(Decimal, &'a TaxBracket), PayrollError> {
        let brackets: &'a [TaxBracket] = &self.config.tax_brackets;
        let first = brackets.first().ok_or(ConfigurationError::NoTaxBrackets)?;

        let bracket = brackets
            .iter()
            .rev()
            .find(|b| b.min_amount < adjusted_income)
            .unwrap_or(first);

        let portion = adjusted_income - bracket.min_amount;
        let portion = match bracket.width() {
            Some(width) => portion.min(width),
            None => portion,
        };

        Ok((bracket.cumulative_tax + bracket.rate * portion, bracket))
    }

    /// Calculates employee and employer SGK and unemployment shares.
    ///
    /// The base is clamped to the SGK floor and ceiling, so contributions do
    /// not move with salary outside that range.
    pub fn calculate_sgk_contributions(
        &self,
        gross_salary: Decimal,
    ) -> SgkContributions {
        let sgk = &self.config.sgk;
        let sgk_base = clamp(gross_salary, sgk.lower_limit, sgk.upper_limit);

        if sgk_base != gross_salary {
            debug!(
                gross_salary = %gross_salary,
                sgk_base = %sgk_base,
                "SGK base clamped to contribution limits"
            );
        }

        SgkContributions {
            employee_share: sgk_base * sgk.employee_rate,
            employer_share: sgk_base * sgk.employer_rate,
            unemployment_employee: sgk_base * sgk.unemployment_employee_rate,
            unemployment_employer: sgk_base * sgk.unemployment_employer_rate,
            sgk_base,
        }
    }

    /// Calculates stamp tax on `gross_salary`.
    ///
    /// From 2024 on, only the portion above the minimum wage gross is taxed.
    pub fn calculate_stamp_tax(
        &self,
        gross_salary: Decimal,
    ) -> StampTaxResult {
        let rate = self.config.stamp_tax_rate;
        let gross_salary = max(gross_salary, Decimal::ZERO);

        if minimum_wage_exempt_for_stamp_tax(self.config.year) {
            let minimum_wage = self.config.minimum_wage.gross;
            let taxable = max(gross_salary - minimum_wage, Decimal::ZERO);
            StampTaxResult {
                stamp_tax: taxable * rate,
                minimum_wage_exemption: gross_salary.min(minimum_wage) * rate,
            }
        } else {
            StampTaxResult {
                stamp_tax: gross_salary * rate,
                minimum_wage_exemption: Decimal::ZERO,
            }
        }
    }

    /// Highest accepted monthly gross salary: twelve times the SGK ceiling.
    pub fn salary_ceiling(&self) -> Decimal {
        self.config.sgk.upper_limit * Decimal::from(MONTHS_PER_YEAR)
    }

    /// Rejects negative gross salaries and those above [`Self::salary_ceiling`].
    ///
    /// # Errors
    ///
    /// * [`PayrollError::NegativeSalary`] for a negative amount.
    /// * [`PayrollError::SalaryLimit`] above the ceiling.
    pub fn validate_salary_limits(
        &self,
        gross_salary: Decimal,
    ) -> Result<(), PayrollError> {
        if gross_salary < Decimal::ZERO {
            return Err(PayrollError::NegativeSalary(gross_salary));
        }

        let ceiling = self.salary_ceiling();
        if gross_salary > ceiling {
            return Err(PayrollError::SalaryLimit {
                gross: gross_salary,
                ceiling,
            });
        }

        Ok(())
    }

    fn disability_deduction(
        &self,
        context: &CalculationContext,
    ) -> Decimal {
        match (context.is_disabled, context.disability_degree) {
            (true, Some(degree)) => self.config.disability_deduction_for(degree),
            _ => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::defaults::configuration_2025;

    fn single_context() -> CalculationContext {
        CalculationContext::new(2025, 1)
    }

    // =========================================================================
    // calculate_income_tax tests
    // =========================================================================

    #[test]
    fn income_tax_applies_first_bracket_after_allowance() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator
            .calculate_income_tax(dec!(42500.00), &single_context())
            .unwrap();

        assert_eq!(result.minimum_living_allowance, dec!(2000.00));
        assert_eq!(result.adjusted_income, dec!(40500.00));
        assert_eq!(result.tax, dec!(6075.00));
        assert_eq!(result.applied_bracket, config.tax_brackets[0]);
        assert_eq!(result.effective_rate, dec!(0.15));
    }

    #[test]
    fn income_tax_uses_married_allowance_and_children() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);
        let context = CalculationContext {
            is_married: true,
            dependent_count: 2,
            ..single_context()
        };

        let result = calculator.calculate_income_tax(dec!(42500.00), &context).unwrap();

        assert_eq!(result.minimum_living_allowance, dec!(3500.00));
        assert_eq!(result.tax, dec!(5850.00));
    }

    #[test]
    fn income_tax_subtracts_disability_deduction() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);
        let context = CalculationContext {
            is_disabled: true,
            disability_degree: Some(1),
            ..single_context()
        };

        let result = calculator.calculate_income_tax(dec!(42500.00), &context).unwrap();

        assert_eq!(result.disability_deduction, dec!(9900.00));
        assert_eq!(result.adjusted_income, dec!(30600.00));
        assert_eq!(result.tax, dec!(4590.00));
    }

    #[test]
    fn income_tax_ignores_degree_when_not_disabled() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);
        let context = CalculationContext {
            is_disabled: false,
            disability_degree: Some(1),
            ..single_context()
        };

        let result = calculator.calculate_income_tax(dec!(42500.00), &context).unwrap();

        assert_eq!(result.disability_deduction, Decimal::ZERO);
    }

    #[test]
    fn income_tax_is_zero_when_allowance_exceeds_income() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator
            .calculate_income_tax(dec!(1000.00), &single_context())
            .unwrap();

        assert_eq!(result.adjusted_income, Decimal::ZERO);
        assert_eq!(result.tax, Decimal::ZERO);
        assert_eq!(result.effective_rate, Decimal::ZERO);
        assert_eq!(result.applied_bracket, config.tax_brackets[0]);
    }

    #[test]
    fn income_tax_in_second_bracket_carries_first_bracket_tax() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator
            .calculate_income_tax(dec!(200000.00), &single_context())
            .unwrap();

        // 23,700 + 20% x (198,000 - 158,000)
        assert_eq!(result.tax, dec!(31700.00));
        assert_eq!(result.applied_bracket, config.tax_brackets[1]);
        assert_eq!(result.effective_rate, dec!(0.1601));
    }

    #[test]
    fn income_tax_in_unbounded_top_bracket() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator
            .calculate_income_tax(dec!(5002000.00), &single_context())
            .unwrap();

        // 1,378,000 + 40% x (5,000,000 - 4,300,000)
        assert_eq!(result.tax, dec!(1658000.00));
        assert_eq!(result.applied_bracket.max_amount, None);
    }

    #[test]
    fn income_tax_at_boundary_stays_in_lower_bracket() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator
            .calculate_income_tax(dec!(160000.00), &single_context())
            .unwrap();

        assert_eq!(result.adjusted_income, dec!(158000.00));
        assert_eq!(result.tax, dec!(23700.00));
        assert_eq!(result.applied_bracket, config.tax_brackets[0]);
    }

    #[test]
    fn income_tax_requires_brackets() {
        let mut config = configuration_2025();
        config.tax_brackets.clear();
        let calculator = TaxCalculator::new(&config);

        let result = calculator.calculate_income_tax(dec!(42500.00), &single_context());

        assert_eq!(
            result.unwrap_err(),
            PayrollError::InvalidConfiguration(ConfigurationError::NoTaxBrackets)
        );
    }

    // =========================================================================
    // bracket_tax continuity tests
    // =========================================================================

    #[test]
    fn bracket_tax_is_continuous_at_every_boundary() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        for pair in config.tax_brackets.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let boundary = upper.min_amount;

            let (at_boundary, bracket) = calculator.bracket_tax(boundary).unwrap();
            assert_eq!(bracket, lower);
            assert_eq!(lower.cumulative_tax_at_max(), Some(upper.cumulative_tax));
            assert_eq!(at_boundary, upper.cumulative_tax);

            let step = dec!(0.01);
            let (above, bracket) = calculator.bracket_tax(boundary + step).unwrap();
            assert_eq!(bracket, upper);
            assert_eq!(above - at_boundary, upper.rate * step);
        }
    }

    #[test]
    fn bracket_tax_is_non_decreasing() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);
        let mut previous = Decimal::ZERO;

        for step in 0..=60 {
            let income = Decimal::from(step * 100_000);
            let (tax, _) = calculator.bracket_tax(income).unwrap();
            assert!(tax >= previous, "tax fell at {income}");
            previous = tax;
        }
    }

    // =========================================================================
    // calculate_sgk_contributions tests
    // =========================================================================

    #[test]
    fn sgk_contributions_apply_rates_inside_limits() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator.calculate_sgk_contributions(dec!(50000.00));

        assert_eq!(
            result,
            SgkContributions {
                employee_share: dec!(7000.00),
                employer_share: dec!(10375.00),
                unemployment_employee: dec!(500.00),
                unemployment_employer: dec!(1000.00),
                sgk_base: dec!(50000.00),
            }
        );
    }

    #[test]
    fn sgk_base_is_raised_to_lower_limit() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator.calculate_sgk_contributions(dec!(10000.00));

        assert_eq!(result.sgk_base, config.sgk.lower_limit);
        assert_eq!(result.employee_share, dec!(3640.77));
        assert_eq!(result.unemployment_employee, dec!(260.055));
    }

    #[test]
    fn sgk_base_is_capped_at_upper_limit() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator.calculate_sgk_contributions(dec!(300000.00));

        assert_eq!(result.sgk_base, config.sgk.upper_limit);
        assert_eq!(result.employee_share, dec!(27305.775));
    }

    // =========================================================================
    // calculate_stamp_tax tests
    // =========================================================================

    #[test]
    fn stamp_tax_exempts_minimum_wage_portion() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator.calculate_stamp_tax(dec!(50000.00));

        assert_eq!(result.stamp_tax, dec!(182.118255));
        assert_eq!(result.minimum_wage_exemption, dec!(197.381745));
    }

    #[test]
    fn stamp_tax_is_zero_below_minimum_wage() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator.calculate_stamp_tax(dec!(20000.00));

        assert_eq!(result.stamp_tax, Decimal::ZERO);
        assert_eq!(result.minimum_wage_exemption, dec!(151.80));
    }

    #[test]
    fn stamp_tax_taxes_full_gross_before_exemption_year() {
        let config = TaxConfiguration {
            year: 2023,
            ..configuration_2025()
        };
        let calculator = TaxCalculator::new(&config);

        let result = calculator.calculate_stamp_tax(dec!(50000.00));

        assert_eq!(result.stamp_tax, dec!(379.50));
        assert_eq!(result.minimum_wage_exemption, Decimal::ZERO);
    }

    // =========================================================================
    // validate_salary_limits tests
    // =========================================================================

    #[test]
    fn salary_limits_accept_ceiling() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        assert_eq!(calculator.salary_ceiling(), dec!(2340495.00));
        assert_eq!(calculator.validate_salary_limits(dec!(2340495.00)), Ok(()));
        assert_eq!(calculator.validate_salary_limits(Decimal::ZERO), Ok(()));
    }

    #[test]
    fn salary_limits_reject_amount_above_ceiling() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator.validate_salary_limits(dec!(2340495.01));

        assert_eq!(
            result,
            Err(PayrollError::SalaryLimit {
                gross: dec!(2340495.01),
                ceiling: dec!(2340495.00),
            })
        );
    }

    #[test]
    fn salary_limits_reject_negative_amount() {
        let config = configuration_2025();
        let calculator = TaxCalculator::new(&config);

        let result = calculator.validate_salary_limits(dec!(-1));

        assert_eq!(result, Err(PayrollError::NegativeSalary(dec!(-1))));
    }
}
