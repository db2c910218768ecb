pub mod calculations;
pub mod defaults;
pub mod error;
pub mod models;
pub mod registry;

pub use calculations::SalaryCalculator;
pub use error::{ConfigurationError, PayrollError, ValidationErrors};
pub use models::*;
pub use registry::TaxConfigurationRegistry;
