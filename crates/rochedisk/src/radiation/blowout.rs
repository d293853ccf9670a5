//! Radiation pressure from the hot Martian surface and the blow-out size.
//!
//! # Physics
//!
//! A grain of radius s and bulk density ρ at any distance from Mars feels
//! the ratio of radiation pressure to gravity
//!
//! ```text
//! β(s) = 3 L ⟨Q_pr⟩ / (16 π c G M ρ s),   L = 4π R² σ T⁴
//! ```
//!
//! which is independent of orbital radius since both forces fall as r⁻².
//! Grains with β ≥ ½ released from circular orbits are unbound; the
//! blow-out size a_blow is the radius where β crosses ½.
//!
//! # References
//! - Burns, Lamy & Soter (1979) - "Radiation forces on small particles"
//! - Hyodo, Genda & Charnoz (2018) - "Fate of the Martian dust disk"

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Density, Length, Temperature};

use crate::constants::{BLOWOUT_BETA, G, MARS_MASS_KG, MARS_RADIUS_M, SIGMA_SB, SPEED_OF_LIGHT};
use crate::error::{ensure_positive, DiskResult};

/// Size bounds (m) and sample count of the log search for the β = ½ crossing
const SEARCH_MIN_M: f64 = 1.0e-9;
const SEARCH_MAX_M: f64 = 1.0e-2;
const SEARCH_SAMPLES: usize = 256;

/// Planck-mean radiation pressure efficiency ⟨Q_pr⟩(s, T).
pub trait RadiationEfficiency {
    fn q_pr(&self, size: Length, temperature: Temperature) -> f64;
}

/// Grey body: one efficiency at every size and temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct ConstantEfficiency(pub f64);

impl Default for ConstantEfficiency {
    fn default() -> Self {
        Self(1.0)
    }
}

impl RadiationEfficiency for ConstantEfficiency {
    fn q_pr(&self, _size: Length, _temperature: Temperature) -> f64 {
        self.0
    }
}

/// Any `Fn(size, T) -> Q_pr`, e.g. an interpolated Mie table.
impl<F> RadiationEfficiency for F
where
    F: Fn(Length, Temperature) -> f64,
{
    fn q_pr(&self, size: Length, temperature: Temperature) -> f64 {
        self(size, temperature)
    }
}

/// Mars luminosity L = 4π R² σ T⁴ (W).
pub fn mars_luminosity(temperature: Temperature) -> f64 {
    4.0 * PI * MARS_RADIUS_M.powi(2) * SIGMA_SB * temperature.to_kelvin().powi(4)
}

/// β for one grain.
pub fn beta(
    size: Length,
    bulk_density: Density,
    temperature: Temperature,
    efficiency: &impl RadiationEfficiency,
) -> DiskResult<f64> {
    let s = ensure_positive("size", size.to_m())?;
    let rho = ensure_positive("bulk_density", bulk_density.to_kg_per_m3())?;
    ensure_positive("temperature", temperature.to_kelvin())?;
    Ok(beta_unchecked(s, rho, temperature, efficiency))
}

fn beta_unchecked(s: f64, rho: f64, temperature: Temperature, efficiency: &impl RadiationEfficiency) -> f64 {
    let q_pr = efficiency.q_pr(Length::from_meters(s), temperature);
    3.0 * mars_luminosity(temperature) * q_pr / (16.0 * PI * SPEED_OF_LIGHT * G * MARS_MASS_KG * rho * s)
}

/// Blow-out radius where β falls through ½.
///
/// β is sampled on a logarithmic grid over [1 nm, 1 cm]; the crossing on the
/// descending branch after the β maximum is linearly interpolated. Returns
/// `Ok(None)` when β never exceeds ½ (no blow-out at this temperature).
pub fn blowout_radius(
    bulk_density: Density,
    temperature: Temperature,
    efficiency: &impl RadiationEfficiency,
) -> DiskResult<Option<Length>> {
    let rho = ensure_positive("bulk_density", bulk_density.to_kg_per_m3())?;
    ensure_positive("temperature", temperature.to_kelvin())?;

    let log_min = SEARCH_MIN_M.ln();
    let step = (SEARCH_MAX_M.ln() - log_min) / (SEARCH_SAMPLES - 1) as f64;
    let sizes: Vec<f64> = (0..SEARCH_SAMPLES)
        .map(|k| (log_min + step * k as f64).exp())
        .collect();
    let betas: Vec<f64> = sizes
        .iter()
        .map(|&s| beta_unchecked(s, rho, temperature, efficiency))
        .collect();

    let Some((peak, &beta_max)) = betas
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
    else {
        return Ok(None);
    };
    if !(beta_max > BLOWOUT_BETA) {
        return Ok(None);
    }

    let crossing = betas[peak..].iter().position(|&b| b <= BLOWOUT_BETA);
    let Some(offset) = crossing else {
        // Still above ½ at the top of the search range
        return Ok(Some(Length::from_meters(SEARCH_MAX_M)));
    };
    let j = peak + offset;
    let (s1, s2) = (sizes[j - 1], sizes[j]);
    let (b1, b2) = (betas[j - 1], betas[j]);
    let s = s1 + (BLOWOUT_BETA - b1) * (s2 - s1) / (b2 - b1);
    Ok(Some(Length::from_meters(s)))
}

/// Grey-body equilibrium temperature of a grain at `distance` from Mars,
/// T_d = T_M √(R_M / 2r) for an isothermal sphere.
pub fn grain_temperature(mars_temperature: Temperature, distance: Length) -> Temperature {
    let ratio = (MARS_RADIUS_M / (2.0 * distance.to_m())).max(0.0);
    Temperature::from_kelvin(mars_temperature.to_kelvin() * ratio.sqrt())
}

/// Radiation-pressure settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct RadiationConfig {
    /// Remove grains below a_blow on the orbital timescale
    pub blowout_enabled: bool,
    /// Grey-body ⟨Q_pr⟩
    pub q_pr: f64,
    /// Multiplier on the blow-out residence time 1/Ω
    pub chi_blow: f64,
}

impl Default for RadiationConfig {
    fn default() -> Self {
        Self {
            blowout_enabled: true,
            q_pr: 1.0,
            chi_blow: 1.0,
        }
    }
}

impl RadiationConfig {
    pub fn efficiency(&self) -> ConstantEfficiency {
        ConstantEfficiency(self.q_pr)
    }
}
