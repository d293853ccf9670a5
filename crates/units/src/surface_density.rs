use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

use crate::mass_flux::MassFlux;
use crate::time::Time;

/// A physical surface density quantity using f64 precision.
///
/// The `SurfaceDensity` struct represents the column density of solids
/// (mass per area) with kilograms per square meter as the base unit. The
/// optically-thin surface layer of a Roche-limit disk typically carries
/// Σ ~ 1e-6–1e2 kg/m².
///
/// # Examples
///
/// ```rust
/// use units::SurfaceDensity;
///
/// let sigma = SurfaceDensity::from_grams_per_cm2(1.0);
/// assert_eq!(sigma.to_kg_per_m2(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SurfaceDensity(f64); // Base unit: kg/m²

impl SurfaceDensity {
    /// Creates a zero surface density value
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `SurfaceDensity` from a value in kilograms per square meter.
    pub fn from_kg_per_m2(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `SurfaceDensity` from a value in grams per square centimeter.
    ///
    /// 1 g/cm² = 10 kg/m²
    ///
    /// # Examples
    ///
    /// ```rust
    /// use units::SurfaceDensity;
    ///
    /// let sigma = SurfaceDensity::from_grams_per_cm2(0.1);
    /// assert_eq!(sigma.to_kg_per_m2(), 1.0);
    /// ```
    pub fn from_grams_per_cm2(value: f64) -> Self {
        Self(value * 10.0)
    }

    /// Returns the surface density in kg/m².
    pub fn to_kg_per_m2(&self) -> f64 {
        self.0
    }

    /// Returns the surface density in g/cm².
    pub fn to_grams_per_cm2(&self) -> f64 {
        self.0 * 0.1
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Power-law scaling Σ × ratio^(-power).
    ///
    /// Used for radial profiles Σ(r) = Σ₀ (r/r₀)^(-p).
    pub fn power_law_scaling(&self, ratio: f64, power: f64) -> Self {
        Self(self.0 * ratio.powf(-power))
    }
}

impl Add for SurfaceDensity {
    type Output = SurfaceDensity;

    fn add(self, rhs: SurfaceDensity) -> SurfaceDensity {
        SurfaceDensity(self.0 + rhs.0)
    }
}

impl Sub for SurfaceDensity {
    type Output = SurfaceDensity;

    fn sub(self, rhs: SurfaceDensity) -> SurfaceDensity {
        SurfaceDensity(self.0 - rhs.0)
    }
}

impl Mul<f64> for SurfaceDensity {
    type Output = SurfaceDensity;

    fn mul(self, rhs: f64) -> SurfaceDensity {
        SurfaceDensity(self.0 * rhs)
    }
}

impl Div<f64> for SurfaceDensity {
    type Output = SurfaceDensity;

    fn div(self, rhs: f64) -> SurfaceDensity {
        SurfaceDensity(self.0 / rhs)
    }
}

impl Div for SurfaceDensity {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}

/// Dividing a column by a time gives the flux that drains it in that time
impl Div<Time> for SurfaceDensity {
    type Output = MassFlux;

    fn div(self, rhs: Time) -> MassFlux {
        MassFlux::from_kg_per_m2_s(self.0 / rhs.to_seconds())
    }
}

impl Mul<SurfaceDensity> for f64 {
    type Output = SurfaceDensity;

    fn mul(self, rhs: SurfaceDensity) -> SurfaceDensity {
        rhs * self
    }
}
