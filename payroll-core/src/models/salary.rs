//! Request and result records exchanged with callers of the salary calculator.
//!
//! Field names serialize in camelCase so the records can be passed around as
//! JSON payloads unchanged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::TaxBracket;

/// Optional personal and period details shared by every request type.
///
/// Integer fields are signed so out-of-range input reaches validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<i32>,
    #[serde(default)]
    pub is_married: Option<bool>,
    #[serde(default)]
    pub dependent_count: Option<i32>,
    #[serde(default)]
    pub is_disabled: Option<bool>,
    #[serde(default)]
    pub disability_degree: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrossToNetRequest {
    pub gross_salary: Option<Decimal>,
    #[serde(flatten)]
    pub details: PersonalDetails,
}

impl GrossToNetRequest {
    pub fn new(gross_salary: Decimal) -> Self {
        Self {
            gross_salary: Some(gross_salary),
            details: PersonalDetails::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetToGrossRequest {
    pub net_salary: Option<Decimal>,
    #[serde(flatten)]
    pub details: PersonalDetails,
    #[serde(default)]
    pub max_iterations: Option<i32>,
    #[serde(default)]
    pub precision: Option<Decimal>,
}

impl NetToGrossRequest {
    pub fn new(net_salary: Decimal) -> Self {
        Self {
            net_salary: Some(net_salary),
            ..Default::default()
        }
    }
}

/// Dispatcher input: exactly one of `gross_salary` and `net_salary` is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRequest {
    #[serde(default)]
    pub gross_salary: Option<Decimal>,
    #[serde(default)]
    pub net_salary: Option<Decimal>,
    #[serde(flatten)]
    pub details: PersonalDetails,
    #[serde(default)]
    pub max_iterations: Option<i32>,
    #[serde(default)]
    pub precision: Option<Decimal>,
}

impl SalaryRequest {
    pub fn gross_to_net(&self) -> GrossToNetRequest {
        GrossToNetRequest {
            gross_salary: self.gross_salary,
            details: self.details.clone(),
        }
    }

    pub fn net_to_gross(&self) -> NetToGrossRequest {
        NetToGrossRequest {
            net_salary: self.net_salary,
            details: self.details.clone(),
            max_iterations: self.max_iterations,
            precision: self.precision,
        }
    }
}

/// Intermediate values behind the headline figures of a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    /// Gross minus the employee SGK and unemployment shares.
    pub taxable_income: Decimal,
    pub applied_tax_bracket: TaxBracket,
    /// Stamp tax waived on the portion of gross up to the minimum wage.
    pub minimum_wage_exemption: Decimal,
    pub minimum_living_allowance: Decimal,
    pub disability_deduction: Decimal,
    /// Income tax divided by the income the brackets were applied to.
    pub effective_tax_rate: Decimal,
    /// Year-to-date income approximated as `gross * month`.
    pub cumulative_income: Decimal,
    /// Year-to-date income tax approximated as `income_tax * month`.
    pub cumulative_tax: Decimal,
}

/// Full result of a gross-to-net or net-to-gross calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryCalculationResult {
    pub year: i32,
    pub month: u32,
    pub gross_salary: Decimal,
    pub net_salary: Decimal,
    pub sgk_employee_share: Decimal,
    pub unemployment_insurance: Decimal,
    pub income_tax: Decimal,
    pub stamp_tax: Decimal,
    pub total_deductions: Decimal,
    pub employer_cost: Decimal,
    pub employer_sgk_share: Decimal,
    pub employer_unemployment_insurance: Decimal,
    /// Solver iterations spent, only set for net-to-gross results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    pub breakdown: SalaryBreakdown,
}

impl SalaryCalculationResult {
    /// Distance between the net salary and `target_net`.
    ///
    /// A net-to-gross search that ends on a collapsed interval returns its
    /// last candidate, which can land further from the target than the
    /// requested precision.
    pub fn net_miss(
        &self,
        target_net: Decimal,
    ) -> Decimal {
        (self.net_salary - target_net).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryLimits {
    pub min_gross_salary: Decimal,
    pub max_gross_salary: Decimal,
    pub min_net_salary: Decimal,
    pub max_net_salary: Decimal,
}
