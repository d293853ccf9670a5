use std::ops::{Add, Div, Mul, Sub};

use crate::angular_velocity::AngularVelocity;
use crate::length::Length;
use crate::mass::Mass;

/// Newtonian gravitational constant in m³ kg⁻¹ s⁻²
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// Circular Keplerian velocity v_K = √(GM/r)
///
/// # Arguments
/// * `central_mass` - Mass of the planet
/// * `radius` - Orbital radius
///
/// # Examples
/// ```
/// use units::{keplerian_velocity, Length, Mass};
///
/// let v = keplerian_velocity(Mass::from_mars_masses(1.0), Length::from_mars_radii(2.0));
/// // ~2.5 km/s at two Mars radii
/// assert!((v.to_km_per_sec() - 2.51).abs() < 0.02);
/// ```
pub fn keplerian_velocity(central_mass: Mass, radius: Length) -> Velocity {
    Velocity((GRAVITATIONAL_CONSTANT * central_mass.to_kg() / radius.to_m()).sqrt())
}

/// Speed in m/s
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Velocity(f64); // Base unit: m/s

impl Velocity {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_meters_per_sec(value: f64) -> Self {
        Self(value)
    }

    pub fn from_km_per_sec(value: f64) -> Self {
        Self(value * 1.0e3)
    }

    pub fn from_cm_per_sec(value: f64) -> Self {
        Self(value * 1.0e-2)
    }

    pub fn to_meters_per_sec(&self) -> f64 {
        self.0
    }

    pub fn to_km_per_sec(&self) -> f64 {
        self.0 * 1.0e-3
    }

    pub fn to_cm_per_sec(&self) -> f64 {
        self.0 * 1.0e2
    }

    /// Angular frequency of a circular orbit with this speed at `radius`.
    pub fn orbital_frequency(&self, radius: Length) -> AngularVelocity {
        AngularVelocity::from_rad_per_sec(self.0 / radius.to_m())
    }
}

impl Add for Velocity {
    type Output = Velocity;

    fn add(self, rhs: Velocity) -> Velocity {
        Velocity(self.0 + rhs.0)
    }
}

impl Sub for Velocity {
    type Output = Velocity;

    fn sub(self, rhs: Velocity) -> Velocity {
        Velocity(self.0 - rhs.0)
    }
}

impl Mul<f64> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f64) -> Velocity {
        Velocity(self.0 * rhs)
    }
}

impl Div<f64> for Velocity {
    type Output = Velocity;

    fn div(self, rhs: f64) -> Velocity {
        Velocity(self.0 / rhs)
    }
}
