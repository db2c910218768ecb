//! Payroll calculations.
//!
//! [`TaxCalculator`] holds the per-year deduction rules, [`SalaryCalculator`]
//! turns requests into full results on top of it, and [`BisectionSolver`]
//! inverts the gross-to-net function for net-to-gross requests.

pub mod common;
pub mod salary_calculator;
pub mod solver;
pub mod tax_calculator;
pub mod validation;

pub use salary_calculator::{SalaryCalculator, gross_to_net, solve_net_to_gross};
pub use solver::{BisectionSolver, SearchInterval, Solution, SolverSettings};
pub use tax_calculator::{IncomeTaxResult, SgkContributions, StampTaxResult, TaxCalculator};
pub use validation::RequestValidator;
