//! Error types returned by the payroll engine.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

/// Every failure a payroll calculation can report to its caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollError {
    /// One or more request fields are missing or out of range.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// No configuration is registered for the requested tax year.
    #[error("tax year {0} is not supported")]
    UnsupportedYear(i32),

    /// The net-to-gross solver ran out of iterations.
    #[error("net-to-gross calculation did not converge after {iterations} iterations")]
    Convergence { iterations: u32 },

    /// Gross salary is negative.
    #[error("gross salary cannot be negative, got {0}")]
    NegativeSalary(Decimal),

    /// Gross salary is above the annualized SGK ceiling.
    #[error("gross salary {gross} exceeds the maximum of {ceiling}")]
    SalaryLimit { gross: Decimal, ceiling: Decimal },

    /// A registered configuration is internally inconsistent.
    #[error("invalid tax configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),
}

impl PayrollError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Validation problems collected from a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        message: impl Into<String>,
    ) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn contains(
        &self,
        message: &str,
    ) -> bool {
        self.0.iter().any(|m| m == message)
    }

    /// `Ok(())` when nothing was collected, otherwise a [`PayrollError::Validation`].
    pub fn into_result(self) -> Result<(), PayrollError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(PayrollError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

/// Inconsistencies detected by [`crate::TaxConfiguration::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no tax brackets configured")]
    NoTaxBrackets,

    #[error("top tax bracket must be unbounded, found maximum {0}")]
    BoundedTopBracket(Decimal),

    #[error("only the top tax bracket may be unbounded, bracket starting at {0} has no maximum")]
    UnboundedInnerBracket(Decimal),

    #[error("tax brackets are not contiguous: bracket ends at {max_amount}, next starts at {next_min_amount}")]
    BracketGap {
        max_amount: Decimal,
        next_min_amount: Decimal,
    },

    #[error("cumulative tax at {min_amount} should be {expected}, found {actual}")]
    CumulativeTaxMismatch {
        min_amount: Decimal,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("{name} rate must be between 0 and 1, got {rate}")]
    InvalidRate { name: &'static str, rate: Decimal },

    #[error("SGK lower limit {lower} must be non-negative and not above upper limit {upper}")]
    InvalidSgkLimits { lower: Decimal, upper: Decimal },

    #[error("disability degree must be 1, 2 or 3, got {0}")]
    InvalidDisabilityDegree(u8),

    #[error("configuration for {actual} registered under year {expected}")]
    YearMismatch { expected: i32, actual: i32 },
}
