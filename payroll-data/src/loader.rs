use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use payroll_core::{
    ConfigurationError, DisabilityDeduction, MinimumLivingAllowance, MinimumWage, PayrollError,
    SgkRates, TaxBracket, TaxConfiguration, TaxConfigurationRegistry, derive_cumulative_tax,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading a tax configuration from files.
#[derive(Debug, Error)]
pub enum ConfigurationLoaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("no tax brackets found for year {0}")]
    NoBracketsForYear(i32),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    #[error("registration failed: {0}")]
    Registry(#[from] PayrollError),
}

impl From<csv::Error> for ConfigurationLoaderError {
    fn from(err: csv::Error) -> Self {
        ConfigurationLoaderError::CsvParse(err.to_string())
    }
}

/// Year-level settings read from the TOML file.
///
/// Decimal values may be written as strings (`"0.14"`) or numbers.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConfigurationDocument {
    pub year: i32,
    pub stamp_tax_rate: Decimal,
    pub sgk: SgkSection,
    pub minimum_wage: MinimumWageSection,
    pub minimum_living_allowance: AllowanceSection,
    #[serde(default)]
    pub disability_deductions: Vec<DisabilityRecord>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SgkSection {
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
    pub employer_discounted_rate: Decimal,
    pub unemployment_employee_rate: Decimal,
    pub unemployment_employer_rate: Decimal,
    pub short_term_insurance_rate: Decimal,
    pub lower_limit: Decimal,
    pub upper_limit: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MinimumWageSection {
    pub gross: Decimal,
    pub net: Decimal,
    pub daily: Decimal,
    pub hourly: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AllowanceSection {
    pub single: Decimal,
    pub married: Decimal,
    pub per_child: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DisabilityRecord {
    pub degree: u8,
    pub amount: Decimal,
}

/// A single record from the tax brackets CSV file.
///
/// - `tax_year`: the year the bracket belongs to
/// - `min_amount`: lower bound of the bracket
/// - `max_amount`: upper bound (empty for the unbounded top bracket)
/// - `rate`: marginal rate as a decimal (e.g., 0.15 for 15%)
/// - `cumulative_tax`: tax owed on everything below `min_amount` (empty to derive it)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub min_amount: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_amount: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub cumulative_tax: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for tax configurations stored as a TOML document plus a CSV of
/// brackets.
///
/// A brackets CSV may hold several years; only the rows for the document's
/// year are used.
pub struct ConfigurationLoader;

impl ConfigurationLoader {
    /// Parse the TOML document.
    pub fn parse_document(text: &str) -> Result<ConfigurationDocument, ConfigurationLoaderError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse tax bracket records from a CSV reader.
    pub fn parse_brackets<R: Read>(
        reader: R
    ) -> Result<Vec<TaxBracketRecord>, ConfigurationLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Combine a document and bracket records into a validated configuration.
    ///
    /// Brackets are sorted by `min_amount`. If any row for the year leaves
    /// `cumulative_tax` empty, cumulative tax is derived for every bracket.
    pub fn build(
        document: ConfigurationDocument,
        records: &[TaxBracketRecord],
    ) -> Result<TaxConfiguration, ConfigurationLoaderError> {
        let year = document.year;
        let mut year_records: Vec<&TaxBracketRecord> =
            records.iter().filter(|r| r.tax_year == year).collect();
        if year_records.is_empty() {
            return Err(ConfigurationLoaderError::NoBracketsForYear(year));
        }
        year_records.sort_by(|a, b| a.min_amount.cmp(&b.min_amount));

        let derive = year_records.iter().any(|r| r.cumulative_tax.is_none());
        let mut tax_brackets: Vec<TaxBracket> = year_records
            .iter()
            .map(|r| TaxBracket {
                min_amount: r.min_amount,
                max_amount: r.max_amount,
                rate: r.rate,
                cumulative_tax: r.cumulative_tax.unwrap_or_default(),
            })
            .collect();
        if derive {
            debug!(year, "deriving cumulative tax for brackets");
            derive_cumulative_tax(&mut tax_brackets);
        }

        let ConfigurationDocument {
            year,
            stamp_tax_rate,
            sgk,
            minimum_wage,
            minimum_living_allowance,
            disability_deductions,
        } = document;

        let configuration = TaxConfiguration {
            year,
            tax_brackets,
            sgk: SgkRates {
                employee_rate: sgk.employee_rate,
                employer_rate: sgk.employer_rate,
                employer_discounted_rate: sgk.employer_discounted_rate,
                unemployment_employee_rate: sgk.unemployment_employee_rate,
                unemployment_employer_rate: sgk.unemployment_employer_rate,
                short_term_insurance_rate: sgk.short_term_insurance_rate,
                lower_limit: sgk.lower_limit,
                upper_limit: sgk.upper_limit,
            },
            minimum_wage: MinimumWage {
                gross: minimum_wage.gross,
                net: minimum_wage.net,
                daily: minimum_wage.daily,
                hourly: minimum_wage.hourly,
            },
            minimum_living_allowance: MinimumLivingAllowance {
                single: minimum_living_allowance.single,
                married: minimum_living_allowance.married,
                per_child: minimum_living_allowance.per_child,
            },
            disability_deductions: disability_deductions
                .into_iter()
                .map(|d| DisabilityDeduction {
                    degree: d.degree,
                    amount: d.amount,
                })
                .collect(),
            stamp_tax_rate,
        };

        configuration.validate()?;
        Ok(configuration)
    }

    /// Read both files and build a validated configuration.
    pub fn load(
        toml_path: &Path,
        csv_path: &Path,
    ) -> Result<TaxConfiguration, ConfigurationLoaderError> {
        let document = Self::parse_document(&fs::read_to_string(toml_path)?)?;
        let records = Self::parse_brackets(File::open(csv_path)?)?;

        let configuration = Self::build(document, &records)?;
        info!(
            year = configuration.year,
            brackets = configuration.tax_brackets.len(),
            config = %toml_path.display(),
            "loaded tax configuration"
        );
        Ok(configuration)
    }

    /// Load a configuration from files and register it.
    ///
    /// Returns the registered year. A year already present in the registry
    /// is replaced.
    pub fn register_into(
        registry: &TaxConfigurationRegistry,
        toml_path: &Path,
        csv_path: &Path,
    ) -> Result<i32, ConfigurationLoaderError> {
        let configuration = Self::load(toml_path, csv_path)?;
        let year = configuration.year;
        registry.register_year(year, configuration)?;
        Ok(year)
    }
}
