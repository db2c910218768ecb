//! Integration tests for loading tax years from files and calculating with them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use payroll_core::{
    GrossToNetRequest, NetToGrossRequest, PayrollError, PersonalDetails, SalaryCalculator,
    SalaryRequest, TaxConfigurationRegistry,
};
use payroll_data::{ConfigurationLoader, ConfigurationLoaderError};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn test_data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join(name)
}

/// Registry with the built-in years plus 2024 from the test data files.
fn setup_registry() -> Arc<TaxConfigurationRegistry> {
    let registry = TaxConfigurationRegistry::with_defaults();
    let year = ConfigurationLoader::register_into(
        &registry,
        &test_data("config_2024.toml"),
        &test_data("brackets_2024.csv"),
    )
    .expect("Failed to register 2024");
    assert_eq!(year, 2024);

    Arc::new(registry)
}

fn setup_calculator() -> SalaryCalculator {
    SalaryCalculator::new(setup_registry())
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
}

fn details_2024() -> PersonalDetails {
    PersonalDetails {
        year: Some(2024),
        month: Some(1),
        ..Default::default()
    }
}

#[test]
fn test_load_2024_configuration() {
    let configuration = ConfigurationLoader::load(
        &test_data("config_2024.toml"),
        &test_data("brackets_2024.csv"),
    )
    .expect("Failed to load");

    assert_eq!(configuration.year, 2024);
    assert_eq!(configuration.tax_brackets.len(), 5);
    assert_eq!(configuration.tax_brackets[1].cumulative_tax, dec!(16500));
    assert_eq!(configuration.tax_brackets[4].max_amount, None);
    assert_eq!(configuration.minimum_wage.gross, dec!(20002.50));
    assert_eq!(configuration.sgk.upper_limit, dec!(150018.75));
}

#[test]
fn test_registered_years_include_loaded_year() {
    let registry = setup_registry();

    assert_eq!(registry.registered_years(), vec![2024, 2025]);
}

#[test]
fn test_gross_to_net_with_loaded_year() {
    let calculator = setup_calculator();
    let request = GrossToNetRequest {
        gross_salary: Some(dec!(50000)),
        details: details_2024(),
    };

    let result = calculator
        .calculate_gross_to_net(&request)
        .expect("Failed to calculate");

    assert_eq!(result.year, 2024);
    assert_eq!(result.sgk_employee_share, dec!(7000.00));
    assert_eq!(result.unemployment_insurance, dec!(500.00));
    assert_eq!(result.income_tax, dec!(6075.00));
    assert_eq!(result.stamp_tax, dec!(227.68));
    assert_eq!(result.net_salary, dec!(36197.32));
    assert_eq!(result.employer_cost, dec!(61375.00));
    assert_eq!(result.breakdown.minimum_wage_exemption, dec!(151.82));
}

#[test]
fn test_gross_to_net_uses_loaded_disability_deduction() {
    let calculator = setup_calculator();
    let request = GrossToNetRequest {
        gross_salary: Some(dec!(200000)),
        details: PersonalDetails {
            is_disabled: Some(true),
            disability_degree: Some(1),
            ..details_2024()
        },
    };

    let result = calculator
        .calculate_gross_to_net(&request)
        .expect("Failed to calculate");

    assert_eq!(result.sgk_employee_share, dec!(21002.63));
    assert_eq!(result.breakdown.disability_deduction, dec!(6900.00));
    assert_eq!(result.breakdown.applied_tax_bracket.rate, dec!(0.20));
    assert_eq!(result.income_tax, dec!(28219.44));
    assert_eq!(result.net_salary, dec!(147911.57));
}

#[test]
fn test_net_to_gross_with_loaded_year() {
    let calculator = setup_calculator();
    let request = NetToGrossRequest {
        net_salary: Some(dec!(30000)),
        details: PersonalDetails {
            month: Some(2),
            is_married: Some(true),
            dependent_count: Some(1),
            ..details_2024()
        },
        ..Default::default()
    };

    let result = calculator
        .calculate_net_to_gross(&request)
        .expect("Failed to calculate");

    assert!((result.net_salary - dec!(30000)).abs() <= dec!(0.01));
    assert!((result.gross_salary - dec!(41121.52)).abs() <= dec!(0.05));
    assert!(result.iterations.is_some());
}

#[test]
fn test_calculate_json_request_file() {
    let calculator = setup_calculator();
    let text = std::fs::read_to_string(test_data("request_net.json")).expect("Failed to read");
    let request: SalaryRequest = serde_json::from_str(&text).expect("Failed to parse");

    let result = calculator.calculate_salary(&request).expect("Failed to calculate");

    assert_eq!(result.year, 2024);
    assert_eq!(result.month, 2);
    assert!((result.net_salary - dec!(30000)).abs() <= dec!(0.01));
}

#[test]
fn test_salary_limits_for_loaded_year() {
    let calculator = setup_calculator();

    let limits = calculator.get_salary_limits(2024).expect("Failed to get limits");

    assert_eq!(limits.min_gross_salary, dec!(20002.50));
    assert_eq!(limits.min_net_salary, dec!(17002.12));
    assert_eq!(limits.max_gross_salary, dec!(150018.75));
    assert_eq!(limits.max_net_salary, dec!(105013.13));
}

#[test]
fn test_gross_above_loaded_ceiling_is_rejected() {
    let calculator = setup_calculator();
    let request = GrossToNetRequest {
        gross_salary: Some(dec!(2000000)),
        details: details_2024(),
    };

    let err = calculator
        .calculate_gross_to_net(&request)
        .expect_err("Should exceed ceiling");

    assert_eq!(
        err,
        PayrollError::SalaryLimit {
            gross: dec!(2000000),
            ceiling: dec!(1800225.00),
        }
    );
}

#[test]
fn test_load_missing_file() {
    let result = ConfigurationLoader::load(
        &test_data("config_1999.toml"),
        &test_data("brackets_2024.csv"),
    );

    let err = result.expect_err("Should fail for missing file");
    assert!(matches!(err, ConfigurationLoaderError::Io(_)));
}

#[test]
fn test_built_in_and_loaded_years_coexist() {
    let calculator = setup_calculator();
    let request = GrossToNetRequest {
        gross_salary: Some(dec!(50000)),
        details: PersonalDetails {
            year: Some(2025),
            month: Some(1),
            ..Default::default()
        },
    };

    // 2025 is built in; 2024 came from files. Both work side by side.
    let result = calculator.calculate_gross_to_net(&request).expect("Failed to calculate");
    assert_eq!(result.net_salary, dec!(36242.88));

    let err = calculator
        .get_salary_limits(2023)
        .expect_err("Should be unsupported");
    assert_eq!(err, PayrollError::UnsupportedYear(2023));
}
