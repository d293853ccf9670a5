//! Relative impact speeds from orbital excitation.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::Velocity;

use crate::error::{DiskError, DiskResult};

/// Prescription for the mean relative speed between colliding grains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum RelativeVelocityLaw {
    /// Low-e, low-i dispersion limit: v = v_K √(1.25 e² + i²)
    Ohtsuki,
    /// Encounters near periapsis of an eccentric orbit: v = v_K / √(1 − e)
    #[default]
    Pericenter,
}

impl RelativeVelocityLaw {
    /// Evaluate the law for eccentricity `e`, inclination `i` (rad) and local
    /// Keplerian speed `v_k`.
    ///
    /// # Errors
    /// [`DiskError::InvalidInput`] for negative `v_k`, negative `e` or `i`,
    /// or `e >= 1` under the pericenter law.
    pub fn relative_velocity(&self, e: f64, i: f64, v_k: Velocity) -> DiskResult<Velocity> {
        let vk = v_k.to_meters_per_sec();
        if !(vk.is_finite() && vk >= 0.0) {
            return Err(DiskError::invalid_input("v_k", vk, "must be non-negative"));
        }
        if !(e.is_finite() && e >= 0.0) {
            return Err(DiskError::invalid_input("e", e, "must be non-negative"));
        }
        if !(i.is_finite() && i >= 0.0) {
            return Err(DiskError::invalid_input("i", i, "must be non-negative"));
        }

        let v = match self {
            Self::Ohtsuki => vk * (1.25 * e * e + i * i).sqrt(),
            Self::Pericenter => {
                if e >= 1.0 {
                    return Err(DiskError::invalid_input(
                        "e",
                        e,
                        "eccentricity must be < 1 for the pericenter law",
                    ));
                }
                vk / (1.0 - e).sqrt().max(1.0e-8)
            }
        };
        Ok(Velocity::from_meters_per_sec(v))
    }

    /// Stable identifier used in cache keys
    pub fn id(&self) -> u8 {
        match self {
            Self::Ohtsuki => 0,
            Self::Pericenter => 1,
        }
    }
}
