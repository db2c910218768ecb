//! File-based tax configurations and logging setup for the `payroll` binary.

pub mod loader;
pub mod logging;

pub use loader::{ConfigurationDocument, ConfigurationLoader, ConfigurationLoaderError, TaxBracketRecord};
