//! Error taxonomy for the disk engine.
//!
//! Every fallible operation returns [`DiskResult`]. Geometry and input errors
//! are raised before any state is touched; a mass-budget violation is raised
//! only after the bounded step-halving retry has been exhausted.

use thiserror::Error;

/// Result alias used throughout the crate
pub type DiskResult<T> = Result<T, DiskError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiskError {
    // ========================================================================
    // Fatal, not retried
    // ========================================================================
    /// Invalid grid or kernel geometry (edges, scale height, matrix shapes)
    #[error("geometry error: {message}")]
    Geometry { message: String },

    /// Non-physical input value (non-positive size, density, velocity, mass)
    #[error("invalid input: {field} = {value}: {message}")]
    InvalidInput {
        field: &'static str,
        value: f64,
        message: String,
    },

    /// Inconsistent or out-of-range configuration
    #[error("configuration error in `{field}`: {message}")]
    Configuration { field: &'static str, message: String },

    // ========================================================================
    // Fatal after bounded retries
    // ========================================================================
    /// The solver could not keep the mass budget within tolerance
    #[error(
        "mass budget violated: error {error_percent:.4}% exceeds {tolerance_percent}% \
         after {halvings} halvings (dt = {dt_seconds:.3e} s)"
    )]
    MassBudgetViolation {
        error_percent: f64,
        tolerance_percent: f64,
        halvings: usize,
        dt_seconds: f64,
    },
}

impl DiskError {
    pub fn geometry(message: impl Into<String>) -> Self {
        Self::Geometry {
            message: message.into(),
        }
    }

    pub fn invalid_input(field: &'static str, value: f64, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            value,
            message: message.into(),
        }
    }

    pub fn configuration(field: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            field,
            message: message.into(),
        }
    }

    /// True for errors that the orchestration layer may treat as a clean stop
    /// of the run rather than a programming or setup mistake.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::MassBudgetViolation { .. })
    }
}

/// Require a finite, strictly positive value.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> DiskResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DiskError::invalid_input(field, value, "must be finite and > 0"))
    }
}
