mod allowances;
mod calculation_context;
mod minimum_wage;
mod salary;
mod sgk_rates;
mod tax_bracket;
mod tax_configuration;

pub use allowances::{DisabilityDeduction, MinimumLivingAllowance};
pub use calculation_context::CalculationContext;
pub use minimum_wage::MinimumWage;
pub use salary::{
    GrossToNetRequest, NetToGrossRequest, PersonalDetails, SalaryBreakdown,
    SalaryCalculationResult, SalaryLimits, SalaryRequest,
};
pub use sgk_rates::{SgkLimits, SgkRates};
pub use tax_bracket::{TaxBracket, derive_cumulative_tax};
pub use tax_configuration::TaxConfiguration;
