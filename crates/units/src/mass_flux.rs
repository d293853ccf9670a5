use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use crate::surface_density::SurfaceDensity;
use crate::time::Time;

/// Areal mass rate in kg m⁻² s⁻¹.
///
/// Supply into the surface layer, blow-out outflow and sink losses are all
/// expressed per unit disk area.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MassFlux(f64);

impl MassFlux {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_kg_per_m2_s(value: f64) -> Self {
        Self(value)
    }

    /// From g cm⁻² s⁻¹ (1 g cm⁻² s⁻¹ = 10 kg m⁻² s⁻¹).
    pub fn from_grams_per_cm2_s(value: f64) -> Self {
        Self(value * 10.0)
    }

    pub fn to_kg_per_m2_s(&self) -> f64 {
        self.0
    }

    pub fn to_grams_per_cm2_s(&self) -> f64 {
        self.0 * 0.1
    }

    /// Column accumulated over `dt` at this rate.
    pub fn over(&self, dt: Time) -> SurfaceDensity {
        SurfaceDensity::from_kg_per_m2(self.0 * dt.to_seconds())
    }

    /// Clamp a negative rate to zero.
    pub fn non_negative(self) -> Self {
        Self(self.0.max(0.0))
    }
}

impl Add for MassFlux {
    type Output = MassFlux;

    fn add(self, rhs: MassFlux) -> MassFlux {
        MassFlux(self.0 + rhs.0)
    }
}

impl Sub for MassFlux {
    type Output = MassFlux;

    fn sub(self, rhs: MassFlux) -> MassFlux {
        MassFlux(self.0 - rhs.0)
    }
}

impl Mul<f64> for MassFlux {
    type Output = MassFlux;

    fn mul(self, rhs: f64) -> MassFlux {
        MassFlux(self.0 * rhs)
    }
}
