use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::models::{DisabilityDeduction, MinimumLivingAllowance, MinimumWage, SgkRates, TaxBracket};

/// Every rate, limit and table needed to run payroll for one calendar year.
///
/// Instances are built once, validated, and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxConfiguration {
    pub year: i32,
    pub tax_brackets: Vec<TaxBracket>,
    pub sgk: SgkRates,
    pub minimum_wage: MinimumWage,
    pub minimum_living_allowance: MinimumLivingAllowance,
    pub disability_deductions: Vec<DisabilityDeduction>,
    pub stamp_tax_rate: Decimal,
}

impl TaxConfiguration {
    /// Allowance for a disability degree, zero when the degree has no entry.
    pub fn disability_deduction_for(
        &self,
        degree: u8,
    ) -> Decimal {
        self.disability_deductions
            .iter()
            .find(|d| d.degree == degree)
            .map(|d| d.amount)
            .unwrap_or(Decimal::ZERO)
    }

    /// Checks the invariants the calculators rely on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if:
    /// - there are no brackets, or they are not ascending and contiguous
    /// - a bracket other than the last is unbounded, or the last is bounded
    /// - a bracket's `cumulative_tax` does not match the brackets below it
    /// - any rate lies outside `[0, 1]`
    /// - the SGK lower limit is negative or above the upper limit
    /// - a disability degree is not 1, 2 or 3
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.validate_brackets()?;
        self.validate_rates()?;

        if self.sgk.lower_limit < Decimal::ZERO || self.sgk.lower_limit > self.sgk.upper_limit {
            return Err(ConfigurationError::InvalidSgkLimits {
                lower: self.sgk.lower_limit,
                upper: self.sgk.upper_limit,
            });
        }

        if let Some(d) = self
            .disability_deductions
            .iter()
            .find(|d| !(1..=3).contains(&d.degree))
        {
            return Err(ConfigurationError::InvalidDisabilityDegree(d.degree));
        }

        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), ConfigurationError> {
        let (last, rest) = self
            .tax_brackets
            .split_last()
            .ok_or(ConfigurationError::NoTaxBrackets)?;

        if let Some(max) = last.max_amount {
            return Err(ConfigurationError::BoundedTopBracket(max));
        }

        let first = &self.tax_brackets[0];
        if first.cumulative_tax != Decimal::ZERO {
            return Err(ConfigurationError::CumulativeTaxMismatch {
                min_amount: first.min_amount,
                expected: Decimal::ZERO,
                actual: first.cumulative_tax,
            });
        }

        for (index, bracket) in rest.iter().enumerate() {
            let next = &self.tax_brackets[index + 1];
            let max = bracket
                .max_amount
                .ok_or(ConfigurationError::UnboundedInnerBracket(bracket.min_amount))?;

            if max <= bracket.min_amount || max != next.min_amount {
                return Err(ConfigurationError::BracketGap {
                    max_amount: max,
                    next_min_amount: next.min_amount,
                });
            }

            let expected = bracket.cumulative_tax + bracket.rate * (next.min_amount - bracket.min_amount);
            if expected != next.cumulative_tax {
                return Err(ConfigurationError::CumulativeTaxMismatch {
                    min_amount: next.min_amount,
                    expected,
                    actual: next.cumulative_tax,
                });
            }
        }

        Ok(())
    }

    fn validate_rates(&self) -> Result<(), ConfigurationError> {
        let rates = [
            ("stamp tax", self.stamp_tax_rate),
            ("SGK employee", self.sgk.employee_rate),
            ("SGK employer", self.sgk.employer_rate),
            ("SGK employer discounted", self.sgk.employer_discounted_rate),
            ("unemployment employee", self.sgk.unemployment_employee_rate),
            ("unemployment employer", self.sgk.unemployment_employer_rate),
            ("short-term insurance", self.sgk.short_term_insurance_rate),
        ];
        let bracket_rates = self
            .tax_brackets
            .iter()
            .map(|b| ("income tax bracket", b.rate));

        for (name, rate) in rates.into_iter().chain(bracket_rates) {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ConfigurationError::InvalidRate { name, rate });
            }
        }

        Ok(())
    }
}
