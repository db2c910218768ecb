use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-request inputs the tax calculator needs besides the amounts.
///
/// `cumulative_income` approximates year-to-date income as
/// `gross * month`; there is no month-by-month bracket carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationContext {
    pub year: i32,
    pub month: u32,
    pub cumulative_income: Decimal,
    pub cumulative_tax: Decimal,
    pub is_married: bool,
    pub dependent_count: u32,
    pub is_disabled: bool,
    pub disability_degree: Option<u8>,
}

impl CalculationContext {
    /// Context for a single unmarried employee without dependents.
    pub fn new(
        year: i32,
        month: u32,
    ) -> Self {
        Self {
            year,
            month,
            cumulative_income: Decimal::ZERO,
            cumulative_tax: Decimal::ZERO,
            is_married: false,
            dependent_count: 0,
            is_disabled: false,
            disability_degree: None,
        }
    }
}
