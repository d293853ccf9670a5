//! Mars-facing surface temperature as a function of time.
//!
//! # Physics
//!
//! After the giant impact the outer layer of Mars radiates as a slab of
//! thickness d, density ρ and heat capacity c_p. Solving
//! d ρ c_p dT/dt = −σ T⁴ gives
//!
//! ```text
//! T(t) = (T₀⁻³ + 3σ t / (d ρ c_p))^(−1/3)
//! ```
//!
//! # References
//! - Hyodo, Genda & Charnoz (2018) - "Fate of the Martian dust disk"

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Temperature, Time};

use crate::constants::SIGMA_SB;
use crate::error::{DiskError, DiskResult};
use crate::radiation::interpolate_clamped;

/// Surface temperature seen by the disk at time `t` since the run started.
pub trait TemperatureDriver {
    fn temperature(&self, time: Time) -> DiskResult<Temperature>;
}

/// Radiating-slab cooling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct SlabCooling {
    pub initial_k: f64,
    /// Slab thickness (m)
    pub depth_m: f64,
    /// Slab density (kg/m³)
    pub density: f64,
    /// Heat capacity (J kg⁻¹ K⁻¹)
    pub heat_capacity: f64,
}

impl Default for SlabCooling {
    fn default() -> Self {
        Self {
            initial_k: 4000.0,
            depth_m: 1.0e5,
            density: 3000.0,
            heat_capacity: 1000.0,
        }
    }
}

impl SlabCooling {
    fn coefficient(&self) -> f64 {
        3.0 * SIGMA_SB / (self.depth_m * self.density * self.heat_capacity)
    }

    /// Time for the surface to cool from T₀ to `target`; zero if `target ≥ T₀`.
    pub fn time_to_reach(&self, target: Temperature) -> DiskResult<Time> {
        let t_target = target.to_kelvin();
        if !(t_target > 0.0) {
            return Err(DiskError::invalid_input(
                "target_temperature",
                t_target,
                "must be positive",
            ));
        }
        let delta = t_target.powi(-3) - self.initial_k.powi(-3);
        Ok(Time::from_seconds((delta / self.coefficient()).max(0.0)))
    }
}

impl TemperatureDriver for SlabCooling {
    fn temperature(&self, time: Time) -> DiskResult<Temperature> {
        let t = time.to_seconds();
        if t < 0.0 {
            return Err(DiskError::invalid_input("time", t, "must be non-negative"));
        }
        let base = self.initial_k.powi(-3) + self.coefficient() * t;
        Ok(Temperature::from_kelvin(base.powf(-1.0 / 3.0)))
    }
}

/// Configured temperature history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TemperatureModel {
    Constant {
        value_k: f64,
    },
    /// Linear interpolation in time, held at the end values outside the table
    Table {
        time_s: Vec<f64>,
        temperature_k: Vec<f64>,
    },
    SlabCooling(SlabCooling),
}

impl Default for TemperatureModel {
    fn default() -> Self {
        Self::Constant { value_k: 2000.0 }
    }
}

impl TemperatureModel {
    pub fn validate(&self) -> DiskResult<()> {
        let positive = |t: f64| t.is_finite() && t > 0.0;
        match self {
            Self::Constant { value_k } if positive(*value_k) => Ok(()),
            Self::Constant { .. } => Err(DiskError::configuration(
                "temperature.value_k",
                "temperature must be positive and finite",
            )),
            Self::Table {
                time_s,
                temperature_k,
            } => {
                if time_s.is_empty() || time_s.len() != temperature_k.len() {
                    return Err(DiskError::configuration(
                        "temperature",
                        "table needs matching, non-empty time and temperature columns",
                    ));
                }
                if time_s.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(DiskError::configuration(
                        "temperature.time_s",
                        "times must be strictly increasing",
                    ));
                }
                if !temperature_k.iter().all(|t| positive(*t)) {
                    return Err(DiskError::configuration(
                        "temperature.temperature_k",
                        "temperatures must be positive and finite",
                    ));
                }
                Ok(())
            }
            Self::SlabCooling(slab) => {
                let params = [slab.initial_k, slab.depth_m, slab.density, slab.heat_capacity];
                if params.iter().all(|p| positive(*p)) {
                    Ok(())
                } else {
                    Err(DiskError::configuration(
                        "temperature",
                        "slab cooling parameters must be positive",
                    ))
                }
            }
        }
    }
}

impl TemperatureDriver for TemperatureModel {
    fn temperature(&self, time: Time) -> DiskResult<Temperature> {
        match self {
            Self::Constant { value_k } => Ok(Temperature::from_kelvin(*value_k)),
            Self::Table {
                time_s,
                temperature_k,
            } => {
                if time_s.is_empty() || time_s.len() != temperature_k.len() {
                    return Err(DiskError::configuration(
                        "temperature",
                        "temperature table is malformed",
                    ));
                }
                let t = interpolate_clamped(time_s, temperature_k, time.to_seconds());
                Ok(Temperature::from_kelvin(t))
            }
            Self::SlabCooling(slab) => slab.temperature(time),
        }
    }
}
