use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use payroll_core::calculations::solver::DEFAULT_PRECISION;
use payroll_core::{
    GrossToNetRequest, NetToGrossRequest, PersonalDetails, SalaryCalculationResult,
    SalaryCalculator, SalaryLimits, SalaryRequest, TaxConfigurationRegistry,
};
use payroll_data::{ConfigurationLoader, logging};
use rust_decimal::Decimal;
use serde::Serialize;

/// Turkish payroll calculator: gross-to-net, net-to-gross and salary limits.
///
/// Tax year 2025 is built in. Other years can be added with pairs of
/// `--config <TOML> --brackets <CSV>`.
#[derive(Parser, Debug)]
#[command(name = "payroll")]
#[command(version, about, long_about = None)]
struct Args {
    /// Log filter, a level ("debug") or an EnvFilter directive; overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// TOML file with the settings of an extra tax year
    #[arg(long, global = true)]
    config: Vec<PathBuf>,

    /// CSV file with the tax brackets for the matching --config
    #[arg(long, global = true)]
    brackets: Vec<PathBuf>,

    /// Print results as pretty JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate net pay and employer cost from a gross salary
    GrossToNet {
        /// Monthly gross salary
        #[arg(long)]
        gross: Decimal,

        #[command(flatten)]
        details: DetailArgs,
    },

    /// Find the gross salary that yields a net salary
    NetToGross {
        /// Monthly net salary
        #[arg(long)]
        net: Decimal,

        #[command(flatten)]
        details: DetailArgs,

        /// Iteration budget for the search (10 to 200)
        #[arg(long)]
        max_iterations: Option<i32>,

        /// Accepted distance from the target net (greater than 0, at most 10)
        #[arg(long)]
        precision: Option<Decimal>,
    },

    /// Run a JSON salary request carrying either grossSalary or netSalary
    Calculate {
        /// Path to the request file
        #[arg(long)]
        request: PathBuf,
    },

    /// Show the salary range supported for a year
    Limits {
        /// Tax year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// List registered tax years
    Years,
}

#[derive(clap::Args, Debug)]
struct DetailArgs {
    /// Tax year (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,

    /// Month 1-12 (defaults to the current month)
    #[arg(long)]
    month: Option<i32>,

    #[arg(long, default_value_t = false)]
    married: bool,

    /// Number of dependent children
    #[arg(long)]
    dependents: Option<i32>,

    /// Disability degree 1-3; implies a disabled employee
    #[arg(long)]
    disability_degree: Option<i32>,
}

impl From<DetailArgs> for PersonalDetails {
    fn from(args: DetailArgs) -> Self {
        PersonalDetails {
            year: args.year,
            month: args.month,
            is_married: Some(args.married),
            dependent_count: args.dependents,
            is_disabled: Some(args.disability_degree.is_some()),
            disability_degree: args.disability_degree,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref())?;

    let registry = Arc::new(TaxConfigurationRegistry::with_defaults());
    register_files(&registry, &args.config, &args.brackets)?;
    let calculator = SalaryCalculator::new(Arc::clone(&registry));

    match args.command {
        Command::GrossToNet { gross, details } => {
            let request = GrossToNetRequest {
                gross_salary: Some(gross),
                details: details.into(),
            };
            let result = calculator
                .calculate_gross_to_net(&request)
                .context("Gross-to-net calculation failed")?;
            print_result(&result, args.json)
        }
        Command::NetToGross {
            net,
            details,
            max_iterations,
            precision,
        } => {
            let request = NetToGrossRequest {
                net_salary: Some(net),
                details: details.into(),
                max_iterations,
                precision,
            };
            let result = calculator
                .calculate_net_to_gross(&request)
                .context("Net-to-gross calculation failed")?;
            print_result(&result, args.json)?;
            report_net_miss(&result, net, precision, args.json);
            Ok(())
        }
        Command::Calculate { request } => {
            let text = fs::read_to_string(&request)
                .with_context(|| format!("Failed to open: {}", request.display()))?;
            let salary_request: SalaryRequest = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse request: {}", request.display()))?;
            let result = calculator
                .calculate_salary(&salary_request)
                .context("Salary calculation failed")?;
            print_result(&result, args.json)?;
            if let Some(net) = salary_request.net_salary {
                report_net_miss(&result, net, salary_request.precision, args.json);
            }
            Ok(())
        }
        Command::Limits { year } => {
            let year = year.unwrap_or_else(|| Local::now().year());
            let limits = calculator
                .get_salary_limits(year)
                .with_context(|| format!("Failed to get salary limits for {year}"))?;
            print_limits(year, &limits, args.json)
        }
        Command::Years => {
            let years = registry.registered_years();
            if args.json {
                print_json(&years)
            } else {
                for year in years {
                    println!("{year}");
                }
                Ok(())
            }
        }
    }
}

fn register_files(
    registry: &TaxConfigurationRegistry,
    configs: &[PathBuf],
    brackets: &[PathBuf],
) -> Result<()> {
    if configs.len() != brackets.len() {
        bail!(
            "--config and --brackets must be given in pairs ({} config, {} brackets)",
            configs.len(),
            brackets.len()
        );
    }

    for (config, csv) in configs.iter().zip(brackets) {
        ConfigurationLoader::register_into(registry, config, csv).with_context(|| {
            format!(
                "Failed to load tax configuration from {} and {}",
                config.display(),
                csv.display()
            )
        })?;
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn print_row(
    label: &str,
    value: impl std::fmt::Display,
) {
    println!("{label:<32}{value:>16}");
}

fn print_result(
    result: &SalaryCalculationResult,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(result);
    }

    let breakdown = &result.breakdown;
    println!("Payroll for {}-{:02}", result.year, result.month);
    print_row("Gross salary", result.gross_salary);
    print_row("SGK employee share", result.sgk_employee_share);
    print_row("Unemployment insurance", result.unemployment_insurance);
    print_row("Income tax", result.income_tax);
    print_row("Stamp tax", result.stamp_tax);
    print_row("Total deductions", result.total_deductions);
    print_row("Net salary", result.net_salary);
    println!();
    print_row("Employer SGK share", result.employer_sgk_share);
    print_row("Employer unemployment", result.employer_unemployment_insurance);
    print_row("Employer cost", result.employer_cost);
    println!();
    print_row("Taxable income", breakdown.taxable_income);
    print_row("Minimum living allowance", breakdown.minimum_living_allowance);
    print_row("Disability deduction", breakdown.disability_deduction);
    print_row("Applied bracket rate", breakdown.applied_tax_bracket.rate);
    print_row("Effective tax rate", breakdown.effective_tax_rate);
    print_row("Minimum wage exemption", breakdown.minimum_wage_exemption);
    if let Some(iterations) = result.iterations {
        print_row("Solver iterations", iterations);
    }
    Ok(())
}

/// Shows how far a net-to-gross result landed from the requested net.
///
/// The row is skipped in JSON mode; a miss beyond the precision is always
/// reported on stderr.
fn report_net_miss(
    result: &SalaryCalculationResult,
    target_net: Decimal,
    precision: Option<Decimal>,
    json: bool,
) {
    let miss = result.net_miss(target_net);
    if !json {
        print_row("Distance from target net", miss);
    }

    let precision = precision.unwrap_or(DEFAULT_PRECISION);
    if miss > precision {
        eprintln!(
            "warning: net salary {} misses the target {target_net} by {miss} (precision {precision})",
            result.net_salary
        );
    }
}

fn print_limits(
    year: i32,
    limits: &SalaryLimits,
    json: bool,
) -> Result<()> {
    if json {
        return print_json(limits);
    }

    println!("Salary limits for {year}");
    print_row("Minimum gross salary", limits.min_gross_salary);
    print_row("Maximum gross salary", limits.max_gross_salary);
    print_row("Minimum net salary", limits.min_net_salary);
    print_row("Maximum net salary", limits.max_net_salary);
    Ok(())
}
