//! Per-year registry of tax configurations.
//!
//! Years are registered either eagerly with a finished [`TaxConfiguration`]
//! or lazily with a builder closure. Lazily registered years are built on
//! first access, validated, and cached for the lifetime of the registry.
//!
//! ```
//! use payroll_core::TaxConfigurationRegistry;
//!
//! let registry = TaxConfigurationRegistry::with_defaults();
//! let config = registry.get_configuration(2025).unwrap();
//!
//! assert_eq!(config.year, 2025);
//! assert!(registry.get_configuration(1999).is_err());
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::defaults::{self, DEFAULT_YEAR};
use crate::error::{ConfigurationError, PayrollError};
use crate::models::{MinimumWage, SgkLimits, TaxConfiguration};

/// First year in which wages up to the minimum wage are exempt from stamp tax.
pub const STAMP_TAX_EXEMPTION_START_YEAR: i32 = 2024;

/// Whether the minimum-wage stamp tax exemption applies in `year`.
pub fn minimum_wage_exempt_for_stamp_tax(year: i32) -> bool {
    year >= STAMP_TAX_EXEMPTION_START_YEAR
}

type ConfigurationBuilder = Box<dyn Fn() -> TaxConfiguration + Send + Sync>;

/// Registry of tax configurations keyed by calendar year.
///
/// Safe to share between threads. Lock order is always `cache` before
/// `builders`.
pub struct TaxConfigurationRegistry {
    builders: RwLock<HashMap<i32, ConfigurationBuilder>>,
    cache: RwLock<HashMap<i32, Arc<TaxConfiguration>>>,
}

impl TaxConfigurationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            builders: RwLock::new(HashMap::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with every built-in year registered lazily.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register_builder(DEFAULT_YEAR, defaults::configuration_2025);
        registry
    }

    /// Register a builder that is run the first time `year` is requested.
    ///
    /// Replaces any configuration previously registered for the year.
    pub fn register_builder<F>(
        &self,
        year: i32,
        builder: F,
    ) where
        F: Fn() -> TaxConfiguration + Send + Sync + 'static,
    {
        let mut cache = write(&self.cache);
        let mut builders = write(&self.builders);
        cache.remove(&year);
        builders.insert(year, Box::new(builder));
        debug!(year, "registered lazy tax configuration");
    }

    /// Register a finished configuration for `year`.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::InvalidConfiguration`] if the configuration
    /// belongs to another year or fails [`TaxConfiguration::validate`].
    pub fn register_year(
        &self,
        year: i32,
        configuration: TaxConfiguration,
    ) -> Result<(), PayrollError> {
        if configuration.year != year {
            return Err(ConfigurationError::YearMismatch {
                expected: year,
                actual: configuration.year,
            }
            .into());
        }
        configuration.validate()?;

        let mut cache = write(&self.cache);
        let mut builders = write(&self.builders);
        builders.remove(&year);
        cache.insert(year, Arc::new(configuration));
        info!(year, "registered tax configuration");
        Ok(())
    }

    /// Every year that can be requested, ascending.
    pub fn registered_years(&self) -> Vec<i32> {
        let mut years: BTreeSet<i32> = read(&self.cache).keys().copied().collect();
        years.extend(read(&self.builders).keys().copied());
        years.into_iter().collect()
    }

    /// Configuration for `year`, building and caching it on first access.
    ///
    /// # Errors
    ///
    /// * [`PayrollError::UnsupportedYear`] if nothing is registered for `year`.
    /// * [`PayrollError::InvalidConfiguration`] if a lazily built configuration
    ///   is inconsistent.
    pub fn get_configuration(
        &self,
        year: i32,
    ) -> Result<Arc<TaxConfiguration>, PayrollError> {
        if let Some(config) = read(&self.cache).get(&year) {
            return Ok(Arc::clone(config));
        }

        let mut cache = write(&self.cache);
        // Another thread may have built it while we waited for the lock.
        if let Some(config) = cache.get(&year) {
            return Ok(Arc::clone(config));
        }

        let builders = read(&self.builders);
        let builder = builders
            .get(&year)
            .ok_or(PayrollError::UnsupportedYear(year))?;

        let configuration = builder();
        if configuration.year != year {
            return Err(ConfigurationError::YearMismatch {
                expected: year,
                actual: configuration.year,
            }
            .into());
        }
        configuration.validate()?;

        info!(year, brackets = configuration.tax_brackets.len(), "constructed tax configuration");
        let configuration = Arc::new(configuration);
        cache.insert(year, Arc::clone(&configuration));
        Ok(configuration)
    }

    pub fn get_sgk_limits(
        &self,
        year: i32,
    ) -> Result<SgkLimits, PayrollError> {
        Ok(self.get_configuration(year)?.sgk.limits())
    }

    pub fn get_minimum_wage(
        &self,
        year: i32,
    ) -> Result<MinimumWage, PayrollError> {
        Ok(self.get_configuration(year)?.minimum_wage.clone())
    }

    /// Policy check, independent of whether `year` is registered.
    pub fn is_minimum_wage_exempt_for_stamp_tax(
        &self,
        year: i32,
    ) -> bool {
        minimum_wage_exempt_for_stamp_tax(year)
    }
}

impl Default for TaxConfigurationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaxConfigurationRegistry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("TaxConfigurationRegistry")
            .field("years", &self.registered_years())
            .finish()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
