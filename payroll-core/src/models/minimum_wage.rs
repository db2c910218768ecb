use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Statutory minimum wage figures for a year (monthly gross/net).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimumWage {
    pub gross: Decimal,
    pub net: Decimal,
    pub daily: Decimal,
    pub hourly: Decimal,
}
