use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

pub const KM_TO_M: f64 = 1.0e3;
pub const CM_TO_M: f64 = 1.0e-2;
pub const MICRON_TO_M: f64 = 1.0e-6;

/// Mean radius of Mars in meters: 1 R_M = 3389.5 km
pub const MARS_RADIUS_M: f64 = 3.3895e6;

/// A physical length quantity using f64 precision.
///
/// The `Length` struct stores meters. Grain radii span microns to meters and
/// orbital radii a few Mars radii, so both ends have dedicated constructors.
///
/// # Examples
///
/// ```rust
/// use units::Length;
///
/// let grain = Length::from_microns(1.5);
/// let orbit = Length::from_mars_radii(2.0);
///
/// assert!((grain.to_m() - 1.5e-6).abs() < 1e-18);
/// assert!(orbit.to_km() > 6000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Length(f64); // Base unit: meters

impl Length {
    /// Creates a zero length value
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `Length` from a value in meters.
    pub fn from_meters(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Length` from a value in kilometers.
    pub fn from_km(value: f64) -> Self {
        Self(value * KM_TO_M)
    }

    /// Creates a new `Length` from a value in centimeters.
    pub fn from_cm(value: f64) -> Self {
        Self(value * CM_TO_M)
    }

    /// Creates a new `Length` from a value in microns.
    pub fn from_microns(value: f64) -> Self {
        Self(value * MICRON_TO_M)
    }

    /// Creates a new `Length` from a value in Mars radii.
    pub fn from_mars_radii(value: f64) -> Self {
        Self(value * MARS_RADIUS_M)
    }

    /// Returns the length in meters.
    pub fn to_m(&self) -> f64 {
        self.0
    }

    /// Converts the length to kilometers.
    pub fn to_km(&self) -> f64 {
        self.0 / KM_TO_M
    }

    /// Converts the length to centimeters.
    pub fn to_cm(&self) -> f64 {
        self.0 / CM_TO_M
    }

    /// Converts the length to microns.
    pub fn to_microns(&self) -> f64 {
        self.0 / MICRON_TO_M
    }

    /// Converts the length to Mars radii.
    pub fn to_mars_radii(&self) -> f64 {
        self.0 / MARS_RADIUS_M
    }

    /// Returns the minimum of two lengths.
    pub fn min(self, other: Self) -> Self {
        if self.0 < other.0 {
            self
        } else {
            other
        }
    }

    /// Returns the maximum of two lengths.
    pub fn max(self, other: Self) -> Self {
        if self.0 > other.0 {
            self
        } else {
            other
        }
    }

    /// Raise to integer power (returns dimensionless f64 for dimensional consistency)
    pub fn powi(&self, n: i32) -> f64 {
        self.0.powi(n)
    }

    pub fn powf(&self, n: f64) -> f64 {
        self.0.powf(n)
    }

    pub fn ln(&self) -> f64 {
        self.0.ln()
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl Mul<f64> for Length {
    type Output = Length;

    fn mul(self, rhs: f64) -> Length {
        Length(self.0 * rhs)
    }
}

impl Div<f64> for Length {
    type Output = Length;

    fn div(self, rhs: f64) -> Length {
        Length(self.0 / rhs)
    }
}

/// Division of Length by Length returns a dimensionless ratio
impl Div for Length {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}

impl Mul<Length> for f64 {
    type Output = Length;

    fn mul(self, rhs: Length) -> Length {
        rhs * self
    }
}
