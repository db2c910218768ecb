use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax-free allowance deducted from taxable income before brackets apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimumLivingAllowance {
    pub single: Decimal,
    pub married: Decimal,
    pub per_child: Decimal,
}

impl MinimumLivingAllowance {
    /// Allowance for the given marital status and number of dependents.
    pub fn amount_for(
        &self,
        is_married: bool,
        dependent_count: u32,
    ) -> Decimal {
        let base = if is_married { self.married } else { self.single };
        base + self.per_child * Decimal::from(dependent_count)
    }
}

/// Extra tax-free allowance for one disability degree (1 is the most severe).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisabilityDeduction {
    pub degree: u8,
    pub amount: Decimal,
}
