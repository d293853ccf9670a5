//! Eccentricity and inclination of the colliding population.
//!
//! # Physics
//!
//! In a self-regulated ring the velocity dispersion settles where viscous
//! shear heating balances inelastic collisional cooling. With restitution
//! coefficient ε and a wake enhancement factor f_wake the balance reads
//!
//! ```text
//! c_eq² = f_wake τ / (1 − ε²)
//! ```
//!
//! Away from equilibrium the eccentricity relaxes exponentially on a damping
//! time t_damp.
//!
//! # References
//! - Ohtsuki (1999) - "Evolution of particle velocity dispersion in a
//!   circumplanetary disk"
//! - Salmon et al. (2010) - "Long-term and large-scale viscous evolution of
//!   dense planetary rings"

use std::f64::consts::FRAC_PI_2;

use rand::Rng;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Length, Time, Velocity, MARS_RADIUS_M};

use crate::error::{ensure_positive, DiskError, DiskResult};

/// Restitution coefficient used by the equilibrium solver
pub const DEFAULT_RESTITUTION: f64 = 0.5;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1.0e-6;
const MIN_KERNEL_ECCENTRICITY: f64 = 1.0e-8;
const MAX_ECCENTRICITY: f64 = 0.999_999;

/// Eccentricity and inclination (rad) fed to the collision kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalExcitation {
    pub eccentricity: f64,
    pub inclination: f64,
}

/// Source of the e/i pair used by the kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum ExcitationMode {
    /// Use the configured (or sampled, or relaxed) e and i
    #[default]
    Configured,
    /// Derive e from the equilibrium dispersion, i = e/2
    WyattEquilibrium,
}

/// Equilibrium velocity dispersion by damped fixed-point iteration.
///
/// `restitution` may depend on the current dispersion; it is clamped to
/// `[0, 1)` before use.
pub fn equilibrium_dispersion<F>(tau: f64, guess: f64, f_wake: f64, restitution: F) -> DiskResult<f64>
where
    F: Fn(f64) -> f64,
{
    if !(tau.is_finite() && tau >= 0.0) {
        return Err(DiskError::invalid_input("tau", tau, "must be non-negative"));
    }
    if !(f_wake >= 1.0) {
        return Err(DiskError::invalid_input("f_wake", f_wake, "must be >= 1"));
    }

    let mut c = guess.max(1.0e-6);
    for iteration in 0..MAX_ITERATIONS {
        let eps = restitution(c).clamp(0.0, 1.0 - 1.0e-6);
        let c_new = (f_wake * tau / (1.0 - eps * eps).max(1.0e-12)).sqrt();
        log::trace!("c_eq iteration {iteration}: c={c:.6e} eps={eps:.3} c_new={c_new:.6e}");
        if (c_new - c).abs() <= TOLERANCE * c_new.max(1.0) {
            return Ok(c_new);
        }
        c = 0.5 * (c + c_new);
    }
    Err(DiskError::invalid_input(
        "tau",
        tau,
        "equilibrium dispersion did not converge",
    ))
}

/// Relax `e` towards `e_eq`: e_eq + (e − e_eq) exp(−dt/t_damp).
pub fn relax_eccentricity(e: f64, e_eq: f64, t_damp: Time, dt: Time) -> DiskResult<f64> {
    let t_damp = ensure_positive("t_damp", t_damp.to_seconds())?;
    let factor = (-dt.to_seconds() / t_damp).exp();
    Ok(e_eq + (e - e_eq) * factor)
}

/// Kernel e/i for the selected mode.
///
/// Under [`ExcitationMode::WyattEquilibrium`] the dispersion is converted to
/// an eccentricity through the local Keplerian speed; if the solver fails
/// the configured values are kept.
pub fn kernel_excitation(
    mode: ExcitationMode,
    configured: OrbitalExcitation,
    tau: f64,
    v_k: Velocity,
    f_wake: f64,
) -> OrbitalExcitation {
    match mode {
        ExcitationMode::Configured => configured,
        ExcitationMode::WyattEquilibrium => {
            let vk = v_k.to_meters_per_sec().max(1.0e-12);
            match equilibrium_dispersion(
                tau.max(0.0),
                configured.eccentricity,
                f_wake.max(1.0),
                |_| DEFAULT_RESTITUTION,
            ) {
                Ok(c_eq) if c_eq > 0.0 => {
                    let e = (c_eq / vk).max(MIN_KERNEL_ECCENTRICITY);
                    OrbitalExcitation {
                        eccentricity: e,
                        inclination: 0.5 * e,
                    }
                }
                _ => {
                    log::warn!("equilibrium dispersion unavailable at tau={tau:.3e}; using configured e/i");
                    configured
                }
            }
        }
    }
}

// ============================================================================
// Initial sampling
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum OffsetDistribution {
    #[default]
    Uniform,
    LogUniform,
}

/// How the initial eccentricity is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EccentricitySampling {
    #[default]
    Fixed,
    /// Pericenter grazes the planet at `R_p + Δr`, Δr drawn in meters
    PlanetClearance {
        dr_min_m: f64,
        dr_max_m: f64,
        #[serde(default)]
        distribution: OffsetDistribution,
    },
}

/// How the initial inclination is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InclinationSampling {
    #[default]
    Fixed,
    /// Uniform draw in `[tilt − spread, tilt + spread]` clipped to `[0, π/2]`
    ObserverTilt { tilt_deg: f64, spread_deg: f64 },
}

/// Draw the initial e/i. Fixed modes return `fixed` unchanged.
pub fn sample_initial_excitation(
    fixed: OrbitalExcitation,
    eccentricity: EccentricitySampling,
    inclination: InclinationSampling,
    orbital_radius: Length,
    rng: &mut ChaChaRng,
) -> DiskResult<OrbitalExcitation> {
    let mut out = fixed;

    if let EccentricitySampling::PlanetClearance {
        dr_min_m,
        dr_max_m,
        distribution,
    } = eccentricity
    {
        if dr_min_m > dr_max_m {
            return Err(DiskError::configuration(
                "dynamics.eccentricity_sampling",
                "dr_min_m must not exceed dr_max_m",
            ));
        }
        let dr = match distribution {
            OffsetDistribution::Uniform if dr_min_m < dr_max_m => rng.gen_range(dr_min_m..dr_max_m),
            OffsetDistribution::Uniform => dr_min_m,
            OffsetDistribution::LogUniform => {
                ensure_positive("dr_min_m", dr_min_m)?;
                if dr_min_m < dr_max_m {
                    rng.gen_range(dr_min_m.ln()..dr_max_m.ln()).exp()
                } else {
                    dr_min_m
                }
            }
        };
        let e = 1.0 - (MARS_RADIUS_M + dr) / orbital_radius.to_m();
        let clamped = e.clamp(0.0, MAX_ECCENTRICITY);
        if (clamped - e).abs() > 1.0e-12 {
            log::warn!("sampled eccentricity {e:.6} clamped to {clamped:.6}");
        }
        out.eccentricity = clamped;
    }

    if let InclinationSampling::ObserverTilt {
        tilt_deg,
        spread_deg,
    } = inclination
    {
        let center = tilt_deg.to_radians();
        let spread = spread_deg.to_radians();
        let i = if spread > 0.0 {
            let lower = (center - spread).max(0.0);
            let upper = (center + spread).min(FRAC_PI_2);
            if lower >= upper {
                lower
            } else {
                rng.gen_range(lower..upper)
            }
        } else {
            center
        };
        out.inclination = i.clamp(0.0, FRAC_PI_2);
    }

    Ok(out)
}
