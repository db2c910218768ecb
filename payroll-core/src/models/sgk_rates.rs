use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Social security (SGK) and unemployment insurance rates for a year.
///
/// `lower_limit` and `upper_limit` clamp the monthly contribution base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SgkRates {
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
    pub employer_discounted_rate: Decimal,
    pub unemployment_employee_rate: Decimal,
    pub unemployment_employer_rate: Decimal,
    pub short_term_insurance_rate: Decimal,
    pub lower_limit: Decimal,
    pub upper_limit: Decimal,
}

impl SgkRates {
    pub fn limits(&self) -> SgkLimits {
        SgkLimits {
            lower_limit: self.lower_limit,
            upper_limit: self.upper_limit,
        }
    }
}

/// Floor and ceiling of the SGK contribution base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SgkLimits {
    pub lower_limit: Decimal,
    pub upper_limit: Decimal,
}
