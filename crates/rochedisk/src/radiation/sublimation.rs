//! Sublimation erosion and the non-collisional sinks built on it.
//!
//! # Physics
//!
//! The Hertz–Knudsen–Langmuir law gives the net evaporative mass flux from
//! a surface at temperature T
//!
//! ```text
//! J = α_evap (P_sat − P_gas) √(μ / (2π R T)),   log₁₀(P_sat / Pa) = A − B / T
//! ```
//!
//! A sphere then shrinks as ds/dt = −J/ρ and leaves bin k at the rate
//! 3|ds/dt|/s_k (the e-folding rate of its mass). Grains smaller than
//! s_sink = η t_ref J/ρ disappear within a fraction η of the reference time.
//!
//! When no vapour-pressure fit is available a logistic placeholder
//! J = exp((T − T_sub)/ΔT) keeps the interface smooth and monotonic.
//!
//! # References
//! - Langmuir (1913) - "The vapor pressure of metallic tungsten"
//! - Kimura et al. (2002) - "Sublimation of dust grains near the Sun"

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Density, Length, MassFlux, Temperature, Time, Velocity};

use crate::constants::R_GAS;
use crate::error::{ensure_positive, DiskResult};

/// Mass-flux law.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum SublimationMode {
    /// exp((T − T_sub)/ΔT)
    #[default]
    Logistic,
    /// Hertz–Knudsen–Langmuir with a Clausius–Clapeyron vapour pressure
    Hkl,
    /// HKL flux turned into a grain lifetime ρ s_ref / J
    HklTimescale,
}

/// Sublimation material parameters (SiO vapour over silicate by default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct SublimationParams {
    pub mode: SublimationMode,
    /// Evaporation coefficient α_evap
    pub alpha_evap: f64,
    /// Molar mass of the vapour (kg/mol)
    pub molar_mass: f64,
    /// Clausius–Clapeyron A (log₁₀ Pa)
    pub psat_a: f64,
    /// Clausius–Clapeyron B (K)
    pub psat_b: f64,
    /// Ambient vapour pressure (Pa)
    pub p_gas: f64,
    /// Logistic midpoint (K)
    pub t_sub_k: f64,
    /// Logistic width (K)
    pub delta_t_k: f64,
    /// Fraction of t_ref defining an instantaneous sink
    pub eta_instant: f64,
}

impl Default for SublimationParams {
    fn default() -> Self {
        Self {
            mode: SublimationMode::Logistic,
            alpha_evap: 0.007,
            molar_mass: 0.044_084_9,
            psat_a: 13.613,
            psat_b: 17_850.0,
            p_gas: 0.0,
            t_sub_k: 1300.0,
            delta_t_k: 50.0,
            eta_instant: 0.1,
        }
    }
}

impl SublimationParams {
    /// Saturation vapour pressure (Pa).
    pub fn saturation_pressure(&self, temperature: Temperature) -> f64 {
        10f64.powf(self.psat_a - self.psat_b / temperature.to_kelvin())
    }

    /// Net mass flux J(T) leaving the grain surface.
    pub fn mass_flux(&self, temperature: Temperature) -> DiskResult<MassFlux> {
        let t = ensure_positive("temperature", temperature.to_kelvin())?;
        let j = match self.mode {
            SublimationMode::Hkl | SublimationMode::HklTimescale => {
                let excess = (self.saturation_pressure(temperature) - self.p_gas).max(0.0);
                self.alpha_evap * excess * (self.molar_mass / (2.0 * PI * R_GAS * t)).sqrt()
            }
            SublimationMode::Logistic => ((t - self.t_sub_k) / self.delta_t_k.max(1.0)).exp(),
        };
        Ok(MassFlux::from_kg_per_m2_s(j))
    }

    /// Erosion speed |ds/dt| = J/ρ.
    pub fn erosion_speed(&self, temperature: Temperature, bulk_density: Density) -> DiskResult<Velocity> {
        let rho = ensure_positive("bulk_density", bulk_density.to_kg_per_m3())?;
        let j = self.mass_flux(temperature)?.to_kg_per_m2_s();
        Ok(Velocity::from_meters_per_sec(j.max(0.0) / rho))
    }

    /// Instantaneous-sink size s_sink = η t_ref J/ρ.
    pub fn sink_size(&self, temperature: Temperature, bulk_density: Density, t_ref: Time) -> DiskResult<Length> {
        ensure_positive("t_ref", t_ref.to_seconds())?;
        let speed = self.erosion_speed(temperature, bulk_density)?;
        Ok(Length::from_meters(
            self.eta_instant * t_ref.to_seconds() * speed.to_meters_per_sec(),
        ))
    }
}

/// Per-bin removal rate 3|ds/dt|/s_k (s⁻¹) for the given bin centers (m).
pub fn sublimation_sink_rates(sizes: &[f64], erosion_speed: Velocity) -> Vec<f64> {
    let ds_dt = erosion_speed.to_meters_per_sec().abs();
    sizes
        .iter()
        .map(|&s| if s > 0.0 { 3.0 * ds_dt / s } else { 0.0 })
        .collect()
}

/// Epstein-like drag stopping time t = ρ_p s / (ρ_g c_s).
pub fn gas_drag_timescale(size: Length, bulk_density: Density, gas_density: f64, sound_speed: Velocity) -> DiskResult<Time> {
    let s = ensure_positive("size", size.to_m())?;
    let rho_p = ensure_positive("bulk_density", bulk_density.to_kg_per_m3())?;
    let rho_g = ensure_positive("gas_density", gas_density)?;
    let c_s = ensure_positive("sound_speed", sound_speed.to_meters_per_sec())?;
    Ok(Time::from_seconds(rho_p * s / (rho_g * c_s)))
}

/// Non-collisional sink switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct SinkConfig {
    pub sublimation_enabled: bool,
    pub sublimation: SublimationParams,
    pub gas_drag_enabled: bool,
    /// Ambient gas density (kg/m³)
    pub gas_density: f64,
    /// Gas sound speed (m/s)
    pub gas_sound_speed: f64,
    /// Representative size for the bulk sink timescale (m)
    pub reference_size_m: f64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            sublimation_enabled: false,
            sublimation: SublimationParams::default(),
            gas_drag_enabled: false,
            gas_density: 0.0,
            gas_sound_speed: 500.0,
            reference_size_m: 1.0e-6,
        }
    }
}

/// Sink inputs for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkRates {
    /// Per-bin implicit sink rates (s⁻¹), sublimation and bulk sinks combined
    pub per_bin: Vec<f64>,
    /// s_sink, when sublimation is active
    pub sink_size: Option<Length>,
    /// Shortest bulk sink timescale, when any bulk sink is active
    pub timescale: Option<Time>,
}

impl SinkConfig {
    /// Shortest active bulk sink timescale, `None` when all sinks are off.
    ///
    /// HKL-timescale mode contributes ρ s_ref / J; the other sublimation
    /// modes contribute η t_ref once their sink size is positive.
    pub fn total_timescale(
        &self,
        temperature: Temperature,
        bulk_density: Density,
        t_ref: Time,
    ) -> DiskResult<Option<Time>> {
        let mut times = Vec::new();
        if self.sublimation_enabled {
            let params = &self.sublimation;
            match params.mode {
                SublimationMode::HklTimescale => {
                    let j = params.mass_flux(temperature)?.to_kg_per_m2_s();
                    if j > 0.0 {
                        times.push(bulk_density.to_kg_per_m3() * self.reference_size_m / j);
                    }
                }
                _ => {
                    if params.sink_size(temperature, bulk_density, t_ref)?.to_m() > 0.0 {
                        times.push(params.eta_instant * t_ref.to_seconds());
                    }
                }
            }
        }
        if self.gas_drag_enabled && self.gas_density > 0.0 {
            let t = gas_drag_timescale(
                Length::from_meters(self.reference_size_m),
                bulk_density,
                self.gas_density,
                Velocity::from_meters_per_sec(self.gas_sound_speed),
            )?;
            times.push(t.to_seconds());
        }
        Ok(times
            .into_iter()
            .filter(|t| *t > 0.0)
            .reduce(f64::min)
            .map(Time::from_seconds))
    }

    /// Per-bin sink rates for the bins at `sizes` (m).
    ///
    /// HKL mode erodes each bin at 3|ds/dt|/s_k; the timescale modes apply
    /// one bulk rate to every bin.
    pub fn rates(
        &self,
        sizes: &[f64],
        temperature: Temperature,
        bulk_density: Density,
        t_ref: Time,
    ) -> DiskResult<SinkRates> {
        let mut per_bin = vec![0.0; sizes.len()];
        let mut sink_size = None;

        if self.sublimation_enabled && self.sublimation.mode == SublimationMode::Hkl {
            let speed = self.sublimation.erosion_speed(temperature, bulk_density)?;
            for (rate, sub) in per_bin.iter_mut().zip(sublimation_sink_rates(sizes, speed)) {
                *rate += sub;
            }
            sink_size = Some(self.sublimation.sink_size(temperature, bulk_density, t_ref)?);
        }

        let bulk = SinkConfig {
            sublimation_enabled: self.sublimation_enabled && self.sublimation.mode != SublimationMode::Hkl,
            ..*self
        };
        let timescale = bulk.total_timescale(temperature, bulk_density, t_ref)?;
        if let Some(t) = timescale {
            let rate = 1.0 / t.to_seconds();
            per_bin.iter_mut().for_each(|r| *r += rate);
        }
        if sink_size.is_none() && bulk.sublimation_enabled {
            sink_size = Some(self.sublimation.sink_size(temperature, bulk_density, t_ref)?);
        }

        Ok(SinkRates {
            per_bin,
            sink_size,
            timescale,
        })
    }
}
