//! Raw production-rate laws and the multipliers applied on top of them.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Length, Temperature, Time};

use crate::error::{DiskError, DiskResult};
use crate::radiation::interpolate_clamped;

/// Keeps the power law finite at t = t₀
const POWER_LAW_EPS: f64 = 1.0e-12;

/// Production rate per unit area before mixing (kg m⁻² s⁻¹).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SupplyRate {
    Const {
        rate_kg_m2_s: f64,
    },
    /// A (t − t₀)^index
    PowerLaw {
        amplitude_kg_m2_s: f64,
        t0_s: f64,
        index: f64,
    },
    /// Linear in time; bilinear when radii are given (rows indexed by time)
    Table {
        time_s: Vec<f64>,
        #[serde(default)]
        radius_m: Vec<f64>,
        rate_kg_m2_s: Vec<Vec<f64>>,
    },
    /// First piece with `t_start ≤ t < t_end`; zero outside every piece
    Piecewise { pieces: Vec<SupplyPiece> },
}

impl Default for SupplyRate {
    fn default() -> Self {
        Self::Const { rate_kg_m2_s: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct SupplyPiece {
    pub t_start_s: f64,
    pub t_end_s: f64,
    pub rate: SupplyRate,
}

impl SupplyRate {
    pub fn validate(&self) -> DiskResult<()> {
        match self {
            Self::Const { rate_kg_m2_s } if rate_kg_m2_s.is_finite() => Ok(()),
            Self::Const { .. } => Err(DiskError::configuration("supply.rate", "rate must be finite")),
            Self::PowerLaw {
                amplitude_kg_m2_s,
                t0_s,
                index,
            } => {
                if [amplitude_kg_m2_s, t0_s, index].iter().all(|v| v.is_finite()) {
                    Ok(())
                } else {
                    Err(DiskError::configuration("supply.rate", "power-law parameters must be finite"))
                }
            }
            Self::Table {
                time_s,
                radius_m,
                rate_kg_m2_s,
            } => {
                let columns = radius_m.len().max(1);
                let shape_ok = !time_s.is_empty()
                    && rate_kg_m2_s.len() == time_s.len()
                    && rate_kg_m2_s.iter().all(|row| row.len() == columns);
                if !shape_ok {
                    return Err(DiskError::configuration(
                        "supply.rate.rate_kg_m2_s",
                        "table must have one row per time and one column per radius",
                    ));
                }
                let increasing = |xs: &[f64]| xs.windows(2).all(|w| w[1] > w[0]);
                if !increasing(time_s) || !increasing(radius_m) {
                    return Err(DiskError::configuration(
                        "supply.rate",
                        "table axes must be strictly increasing",
                    ));
                }
                Ok(())
            }
            Self::Piecewise { pieces } => {
                for piece in pieces {
                    if !(piece.t_end_s > piece.t_start_s) {
                        return Err(DiskError::configuration(
                            "supply.rate.pieces",
                            "each piece needs t_end_s > t_start_s",
                        ));
                    }
                    piece.rate.validate()?;
                }
                Ok(())
            }
        }
    }

    /// Raw rate at `time` and orbital `radius`; may be negative.
    pub fn raw(&self, time: Time, radius: Length) -> f64 {
        let t = time.to_seconds();
        match self {
            Self::Const { rate_kg_m2_s } => *rate_kg_m2_s,
            Self::PowerLaw {
                amplitude_kg_m2_s,
                t0_s,
                index,
            } => {
                let t0 = t0_s.max(0.0);
                let elapsed = (t - t0).max(0.0) + POWER_LAW_EPS;
                amplitude_kg_m2_s * elapsed.powf(*index)
            }
            Self::Table {
                time_s,
                radius_m,
                rate_kg_m2_s,
            } => table_lookup(time_s, radius_m, rate_kg_m2_s, t, radius.to_m()),
            Self::Piecewise { pieces } => pieces
                .iter()
                .find(|p| p.t_start_s <= t && t < p.t_end_s)
                .map_or(0.0, |p| p.rate.raw(time, radius)),
        }
    }
}

fn table_lookup(times: &[f64], radii: &[f64], rates: &[Vec<f64>], t: f64, r: f64) -> f64 {
    if times.is_empty() || rates.len() != times.len() {
        return 0.0;
    }
    if radii.len() < 2 {
        let column: Vec<f64> = rates.iter().map(|row| row.first().copied().unwrap_or(0.0)).collect();
        return interpolate_clamped(times, &column, t);
    }
    // Interpolate each radius column in time, then across radius
    let at_time: Vec<f64> = (0..radii.len())
        .map(|c| {
            let column: Vec<f64> = rates.iter().map(|row| row.get(c).copied().unwrap_or(0.0)).collect();
            interpolate_clamped(times, &column, t)
        })
        .collect();
    interpolate_clamped(radii, &at_time, r)
}

/// Temperature dependence of the supply, `clamp(s_ref (T/T_ref)^n, floor, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct TemperatureScaling {
    pub enabled: bool,
    pub reference_k: f64,
    pub exponent: f64,
    pub scale_at_reference: f64,
    pub floor: f64,
    pub cap: f64,
}

impl Default for TemperatureScaling {
    fn default() -> Self {
        Self {
            enabled: false,
            reference_k: 1800.0,
            exponent: 1.0,
            scale_at_reference: 1.0,
            floor: 0.0,
            cap: 10.0,
        }
    }
}

impl TemperatureScaling {
    pub fn factor(&self, temperature: Temperature) -> f64 {
        if !self.enabled {
            return 1.0;
        }
        let ratio = temperature.to_kelvin() / self.reference_k;
        let raw = self.scale_at_reference * ratio.powf(self.exponent);
        if raw.is_finite() {
            raw.clamp(self.floor, self.cap)
        } else {
            self.floor
        }
    }
}

/// What happens as a finite supply reservoir runs dry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Depletion {
    /// Full rate until the reservoir is empty
    #[default]
    HardStop,
    /// Linear ramp-down once less than `fraction` of the total remains
    Taper { fraction: f64 },
}

/// Finite supply budget, as a column (kg/m²).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct FiniteReservoir {
    /// `None` keeps the supply unlimited
    pub mass_total_kg_m2: Option<f64>,
    pub depletion: Depletion,
}

impl FiniteReservoir {
    /// Multiplier on the rate for `remaining` mass left.
    pub fn taper_factor(&self, remaining: f64) -> f64 {
        let Some(total) = self.mass_total_kg_m2 else {
            return 1.0;
        };
        if remaining <= 0.0 {
            return 0.0;
        }
        match self.depletion {
            Depletion::HardStop => 1.0,
            Depletion::Taper { fraction } => {
                let knee = fraction * total;
                if knee > 0.0 && remaining < knee {
                    remaining / knee
                } else {
                    1.0
                }
            }
        }
    }
}
