//! Bisection search used to invert the gross-to-net function.
//!
//! Net pay has no closed-form inverse: the SGK floor and ceiling, the
//! bracket boundaries and the stamp tax exemption all add breakpoints.
//! Because net pay never decreases as gross pay grows, halving a bracketing
//! interval is enough to find the gross that yields a target net.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PayrollError;

pub const DEFAULT_MAX_ITERATIONS: u32 = 50;
pub const MIN_ITERATIONS: u32 = 10;
pub const MAX_ITERATIONS: u32 = 200;
pub const DEFAULT_PRECISION: Decimal = dec!(0.01);
pub const MAX_PRECISION: Decimal = dec!(10);

/// Iteration budget and tolerance for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    pub max_iterations: u32,
    /// Largest accepted distance between the computed and the target value.
    pub precision: Decimal,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Interval to search and the first point to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchInterval {
    pub lower: Decimal,
    pub upper: Decimal,
    pub initial_guess: Decimal,
}

/// Value found by [`BisectionSolver::solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution<T> {
    pub output: T,
    /// Evaluations spent, including the final one after an interval collapse.
    pub iterations: u32,
}

/// Bisection over a monotonically non-decreasing function.
#[derive(Debug, Clone, Copy, Default)]
pub struct BisectionSolver {
    settings: SolverSettings,
}

impl BisectionSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> SolverSettings {
        self.settings
    }

    /// Searches `interval` for an input whose value is within `precision` of `target`.
    ///
    /// `evaluate` maps an input to its value plus whatever output the caller
    /// wants back for the accepted input. The search stops early when the
    /// value is close enough; when the interval shrinks below `precision`
    /// the midpoint is evaluated once more and returned as is.
    ///
    /// # Errors
    ///
    /// * [`PayrollError::Convergence`] if `max_iterations` evaluations never
    ///   got within `precision`.
    /// * Any error returned by `evaluate`.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use payroll_core::calculations::{BisectionSolver, SearchInterval, SolverSettings};
    ///
    /// let solver = BisectionSolver::new(SolverSettings::default());
    /// let interval = SearchInterval {
    ///     lower: dec!(0),
    ///     upper: dec!(1000),
    ///     initial_guess: dec!(300),
    /// };
    ///
    /// let solution = solver
    ///     .solve(dec!(250), interval, |x| Ok((x / dec!(2), x)))
    ///     .unwrap();
    ///
    /// assert!((solution.output - dec!(500)).abs() <= dec!(0.02));
    /// ```
    pub fn solve<T, F>(
        &self,
        target: Decimal,
        interval: SearchInterval,
        mut evaluate: F,
    ) -> Result<Solution<T>, PayrollError>
    where
        F: FnMut(Decimal) -> Result<(Decimal, T), PayrollError>,
    {
        let SolverSettings {
            max_iterations,
            precision,
        } = self.settings;
        let SearchInterval {
            mut lower,
            mut upper,
            initial_guess: mut guess,
        } = interval;

        for iteration in 1..=max_iterations {
            let (value, output) = evaluate(guess)?;
            let difference = value - target;

            debug!(
                iteration,
                guess = %guess,
                value = %value,
                difference = %difference,
                "bisection step"
            );

            if difference.abs() <= precision {
                return Ok(Solution {
                    output,
                    iterations: iteration,
                });
            }

            if difference > Decimal::ZERO {
                upper = guess;
            } else {
                lower = guess;
            }
            guess = (lower + upper) / Decimal::TWO;

            if upper - lower < precision {
                let (value, output) = evaluate(guess)?;
                let difference = value - target;
                if difference.abs() > precision {
                    warn!(
                        target = %target,
                        guess = %guess,
                        difference = %difference,
                        "search interval collapsed without reaching target"
                    );
                }
                return Ok(Solution {
                    output,
                    iterations: iteration + 1,
                });
            }
        }

        Err(PayrollError::Convergence {
            iterations: max_iterations,
        })
    }
}
