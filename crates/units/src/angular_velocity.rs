use std::f64::consts::TAU;

use crate::time::Time;

/// Angular velocity in rad/s
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AngularVelocity(f64);

impl AngularVelocity {
    pub fn from_rad_per_sec(value: f64) -> Self {
        Self(value)
    }

    pub fn to_rad_per_sec(&self) -> f64 {
        self.0
    }

    /// Orbital period 2π/Ω
    pub fn period(&self) -> Time {
        Time::from_seconds(TAU / self.0)
    }

    /// Dynamical time 1/Ω, the blow-out residence time of unbound grains
    pub fn inverse(&self) -> Time {
        Time::from_seconds(1.0 / self.0)
    }
}
