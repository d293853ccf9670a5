//! Mass-budget bookkeeping for the coagulation solver.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;

use crate::error::{DiskError, DiskResult};

/// Column mass below which a budget is treated as empty (kg/m²)
const EMPTY_COLUMN: f64 = 1.0e-300;

/// Expected versus realized column mass over one interval (kg/m²).
///
/// `expected = initial + source − outflux`, and the error is the relative
/// mismatch with `actual` in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct MassBudget {
    pub initial: f64,
    pub source: f64,
    pub outflux: f64,
    pub expected: f64,
    pub actual: f64,
    pub error_percent: f64,
}

impl MassBudget {
    pub fn new(initial: f64, source: f64, outflux: f64, actual: f64) -> Self {
        let expected = initial + source - outflux;
        // Relative to the expected mass; an emptied column falls back to the realized one
        let reference = if expected > EMPTY_COLUMN { expected } else { actual.abs() };
        let error_percent = if !actual.is_finite() {
            f64::INFINITY
        } else if reference > EMPTY_COLUMN {
            100.0 * (actual - expected).abs() / reference
        } else {
            0.0
        };
        Self {
            initial,
            source,
            outflux,
            expected,
            actual,
            error_percent: if error_percent.is_finite() { error_percent } else { f64::INFINITY },
        }
    }

    /// Budget of an interval in which nothing happened.
    pub fn unchanged(mass: f64) -> Self {
        Self::new(mass, 0.0, 0.0, mass)
    }

    pub fn within(&self, tolerance_percent: f64) -> bool {
        self.error_percent <= tolerance_percent
    }

    /// Budget of `self` followed by `next`.
    pub fn chain(&self, next: &MassBudget) -> Self {
        Self::new(
            self.initial,
            self.source + next.source,
            self.outflux + next.outflux,
            next.actual,
        )
    }
}

/// Retry and tolerance settings for the coagulation solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct SolverConfig {
    /// Allowed mass-budget error in percent
    pub tolerance_percent: f64,
    /// Halvings of the substep before giving up
    pub max_halvings: usize,
    /// Substeps allowed within one call
    pub max_substeps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: 0.5,
            max_halvings: 12,
            max_substeps: 10_000,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> DiskResult<()> {
        if !(self.tolerance_percent.is_finite() && self.tolerance_percent > 0.0) {
            return Err(DiskError::configuration(
                "solver.tolerance_percent",
                "must be positive and finite",
            ));
        }
        if self.max_substeps == 0 {
            return Err(DiskError::configuration("solver.max_substeps", "must be at least 1"));
        }
        Ok(())
    }
}
