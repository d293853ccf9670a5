//! Bulk phase of the disk material.
//!
//! Between the glass transition and the liquidus the melt fraction rises
//! linearly from 0 to 1. Once half the material is molten the disk is
//! liquid-dominated: grains stick rather than fragment, and the surface
//! supply is switched off.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::Temperature;

use crate::error::{DiskError, DiskResult};

/// Melt fraction at which the material counts as liquid-dominated
const LIQUID_DOMINATED_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    Solid,
    LiquidDominated,
}

/// Phase classification with the melt fraction behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct PhaseDecision {
    pub state: PhaseState,
    pub melt_fraction: f64,
}

impl PhaseDecision {
    pub fn solid() -> Self {
        Self {
            state: PhaseState::Solid,
            melt_fraction: 0.0,
        }
    }

    pub fn is_liquid_dominated(&self) -> bool {
        self.state == PhaseState::LiquidDominated
    }
}

/// Phase of the disk material at temperature `T`.
pub trait PhaseModel {
    fn phase(&self, temperature: Temperature) -> DiskResult<PhaseDecision>;
}

/// Linear melt fraction between T_glass and T_liquidus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct ThresholdPhase {
    pub enabled: bool,
    pub glass_k: f64,
    pub liquidus_k: f64,
}

impl Default for ThresholdPhase {
    fn default() -> Self {
        Self {
            enabled: false,
            glass_k: 1475.0,
            liquidus_k: 1986.0,
        }
    }
}

impl ThresholdPhase {
    pub fn validate(&self) -> DiskResult<()> {
        if !(self.glass_k > 0.0 && self.liquidus_k > self.glass_k) {
            return Err(DiskError::configuration(
                "material.phase",
                "need 0 < glass_k < liquidus_k",
            ));
        }
        Ok(())
    }

    pub fn melt_fraction(&self, temperature: Temperature) -> f64 {
        let t = temperature.to_kelvin();
        ((t - self.glass_k) / (self.liquidus_k - self.glass_k)).clamp(0.0, 1.0)
    }
}

impl PhaseModel for ThresholdPhase {
    fn phase(&self, temperature: Temperature) -> DiskResult<PhaseDecision> {
        let t = temperature.to_kelvin();
        if !(t.is_finite() && t > 0.0) {
            return Err(DiskError::invalid_input("temperature", t, "must be positive and finite"));
        }
        if !self.enabled {
            return Ok(PhaseDecision::solid());
        }
        let melt_fraction = self.melt_fraction(temperature);
        let state = if melt_fraction >= LIQUID_DOMINATED_FRACTION {
            PhaseState::LiquidDominated
        } else {
            PhaseState::Solid
        };
        Ok(PhaseDecision { state, melt_fraction })
    }
}
