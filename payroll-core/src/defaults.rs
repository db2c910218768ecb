//! Built-in tax year configurations.
//!
//! | Year | Brackets (TL, annual)                                        | Min. wage gross |
//! |------|--------------------------------------------------------------|-----------------|
//! | 2025 | 158,000 / 330,000 / 1,200,000 / 4,300,000 at 15-20-27-35-40% | 26,005.50       |

use rust_decimal_macros::dec;

use crate::models::{
    DisabilityDeduction, MinimumLivingAllowance, MinimumWage, SgkRates, TaxBracket,
    TaxConfiguration,
};

pub const DEFAULT_YEAR: i32 = 2025;

/// Configuration for calendar year 2025.
pub fn configuration_2025() -> TaxConfiguration {
    TaxConfiguration {
        year: 2025,
        tax_brackets: vec![
            TaxBracket {
                min_amount: dec!(0),
                max_amount: Some(dec!(158000)),
                rate: dec!(0.15),
                cumulative_tax: dec!(0),
            },
            TaxBracket {
                min_amount: dec!(158000),
                max_amount: Some(dec!(330000)),
                rate: dec!(0.20),
                cumulative_tax: dec!(23700),
            },
            TaxBracket {
                min_amount: dec!(330000),
                max_amount: Some(dec!(1200000)),
                rate: dec!(0.27),
                cumulative_tax: dec!(58100),
            },
            TaxBracket {
                min_amount: dec!(1200000),
                max_amount: Some(dec!(4300000)),
                rate: dec!(0.35),
                cumulative_tax: dec!(293000),
            },
            TaxBracket {
                min_amount: dec!(4300000),
                max_amount: None,
                rate: dec!(0.40),
                cumulative_tax: dec!(1378000),
            },
        ],
        sgk: SgkRates {
            employee_rate: dec!(0.14),
            employer_rate: dec!(0.2075),
            employer_discounted_rate: dec!(0.1575),
            unemployment_employee_rate: dec!(0.01),
            unemployment_employer_rate: dec!(0.02),
            short_term_insurance_rate: dec!(0.0225),
            lower_limit: dec!(26005.50),
            // 7.5 x minimum wage gross
            upper_limit: dec!(195041.25),
        },
        minimum_wage: MinimumWage {
            gross: dec!(26005.50),
            net: dec!(22104.67),
            daily: dec!(866.85),
            hourly: dec!(115.58),
        },
        minimum_living_allowance: MinimumLivingAllowance {
            single: dec!(2000.00),
            married: dec!(2500.00),
            per_child: dec!(500.00),
        },
        disability_deductions: vec![
            DisabilityDeduction {
                degree: 1,
                amount: dec!(9900.00),
            },
            DisabilityDeduction {
                degree: 2,
                amount: dec!(5700.00),
            },
            DisabilityDeduction {
                degree: 3,
                amount: dec!(2400.00),
            },
        ],
        stamp_tax_rate: dec!(0.00759),
    }
}
