use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Mass of Mars in kilograms (6.4171 × 10²³ kg)
pub const MARS_MASS_KG: f64 = 6.4171e23;

/// Mass of the Earth in kilograms
const EARTH_MASS_KG: f64 = 5.972e24;

/// A physical mass quantity using f64 precision.
///
/// Base unit is the kilogram. Disk budgets are usually quoted as a fraction of
/// the planet mass, so Mars masses are supported directly.
///
/// # Examples
///
/// ```rust
/// use units::Mass;
///
/// let grain = Mass::from_grams(1.0e-9);
/// let disk = Mass::from_mars_masses(1.0e-5);
///
/// assert!((grain.to_kg() - 1.0e-12).abs() < 1e-24);
/// assert!(disk.to_kg() > 6.0e18);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Mass(f64); // Base unit: kg

impl Mass {
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `Mass` from a value in kilograms.
    pub fn from_kg(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Mass` from a value in grams.
    pub fn from_grams(value: f64) -> Self {
        Self(value * 1.0e-3)
    }

    /// Creates a new `Mass` from a value in Mars masses.
    pub fn from_mars_masses(value: f64) -> Self {
        Self(value * MARS_MASS_KG)
    }

    /// Creates a new `Mass` from a value in Earth masses.
    pub fn from_earth_masses(value: f64) -> Self {
        Self(value * EARTH_MASS_KG)
    }

    pub fn to_kg(&self) -> f64 {
        self.0
    }

    pub fn to_grams(&self) -> f64 {
        self.0 * 1.0e3
    }

    /// Converts the mass to Mars masses.
    ///
    /// ```rust
    /// use units::Mass;
    ///
    /// let m = Mass::from_mars_masses(0.25);
    /// assert!((m.to_mars_masses() - 0.25).abs() < 1e-15);
    /// ```
    pub fn to_mars_masses(&self) -> f64 {
        self.0 / MARS_MASS_KG
    }

    pub fn to_earth_masses(&self) -> f64 {
        self.0 / EARTH_MASS_KG
    }
}

impl Add for Mass {
    type Output = Mass;

    fn add(self, rhs: Mass) -> Mass {
        Mass(self.0 + rhs.0)
    }
}

impl Sub for Mass {
    type Output = Mass;

    fn sub(self, rhs: Mass) -> Mass {
        Mass(self.0 - rhs.0)
    }
}

impl Mul<f64> for Mass {
    type Output = Mass;

    fn mul(self, rhs: f64) -> Mass {
        Mass(self.0 * rhs)
    }
}

impl Div<f64> for Mass {
    type Output = Mass;

    fn div(self, rhs: f64) -> Mass {
        Mass(self.0 / rhs)
    }
}

/// Division of Mass by Mass returns a dimensionless ratio
impl Div for Mass {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}

impl Mul<Mass> for f64 {
    type Output = Mass;

    fn mul(self, rhs: Mass) -> Mass {
        rhs * self
    }
}
