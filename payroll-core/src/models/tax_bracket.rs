use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of the progressive income-tax schedule.
///
/// `cumulative_tax` is the total tax owed at `min_amount`, i.e. the sum of
/// every lower bracket taxed in full. A `max_amount` of `None` marks the
/// unbounded top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub min_amount: Decimal,
    pub max_amount: Option<Decimal>,
    pub rate: Decimal,
    pub cumulative_tax: Decimal,
}

impl TaxBracket {
    /// Width of the bracket, `None` for the unbounded top bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.max_amount.map(|max| max - self.min_amount)
    }

    /// Tax owed at `min_amount` of the bracket directly above this one.
    pub fn cumulative_tax_at_max(&self) -> Option<Decimal> {
        self.width().map(|width| self.cumulative_tax + self.rate * width)
    }
}

/// Fills in `cumulative_tax` for an ascending list of brackets.
///
/// Only `min_amount` and `rate` are read; the first bracket starts at zero
/// and each following bracket carries the full tax of the one below it.
pub fn derive_cumulative_tax(brackets: &mut [TaxBracket]) {
    let mut carried = Decimal::ZERO;
    let mut previous: Option<(Decimal, Decimal)> = None;

    for bracket in brackets.iter_mut() {
        if let Some((min_amount, rate)) = previous {
            carried += rate * (bracket.min_amount - min_amount);
        }
        bracket.cumulative_tax = carried;
        previous = Some((bracket.min_amount, bracket.rate));
    }
}
