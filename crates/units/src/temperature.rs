use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Stefan–Boltzmann constant in W m⁻² K⁻⁴
pub const STEFAN_BOLTZMANN: f64 = 5.670374419e-8;

/// A physical temperature quantity using f64 precision.
///
/// The `Temperature` struct represents temperature with Kelvin as the base unit.
/// In the Roche-limit problem it is the planet's effective surface temperature,
/// which drives both the radiation pressure on grains and their sublimation.
///
/// # Examples
///
/// ```rust
/// use units::Temperature;
///
/// let hot_mars = Temperature::from_kelvin(2000.0);
/// let flux = hot_mars.blackbody_flux();
/// assert!(flux > 9.0e5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Temperature(f64); // Base unit: Kelvin

impl Temperature {
    /// Creates a new `Temperature` from a value in Kelvin.
    ///
    /// # Arguments
    ///
    /// * `value` - The temperature in Kelvin
    ///
    /// # Examples
    ///
    /// ```rust
    /// use units::Temperature;
    ///
    /// let glass_transition = Temperature::from_kelvin(1475.0);
    /// let liquidus = Temperature::from_kelvin(1986.0);
    /// assert!(glass_transition < liquidus);
    /// ```
    pub fn from_kelvin(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Temperature` from a value in Celsius.
    ///
    /// Converts Celsius to Kelvin: K = °C + 273.15
    pub fn from_celsius(value: f64) -> Self {
        Self(value + 273.15)
    }

    /// Returns the temperature in Kelvin.
    pub fn to_kelvin(&self) -> f64 {
        self.0
    }

    /// Converts the temperature to Celsius.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use units::Temperature;
    ///
    /// let temp = Temperature::from_kelvin(273.15);
    /// assert!((temp.to_celsius() - 0.0).abs() < 0.01);
    /// ```
    pub fn to_celsius(&self) -> f64 {
        self.0 - 273.15
    }

    /// Emergent blackbody flux σT⁴ in W/m².
    pub fn blackbody_flux(&self) -> f64 {
        STEFAN_BOLTZMANN * self.0.powi(4)
    }

    /// Raise to integer power
    pub fn powi(&self, n: i32) -> f64 {
        self.0.powi(n)
    }

    /// Power function
    pub fn powf(&self, n: f64) -> f64 {
        self.0.powf(n)
    }
}

impl Add for Temperature {
    type Output = Temperature;

    fn add(self, rhs: Temperature) -> Temperature {
        Temperature(self.0 + rhs.0)
    }
}

impl Sub for Temperature {
    type Output = Temperature;

    fn sub(self, rhs: Temperature) -> Temperature {
        Temperature(self.0 - rhs.0)
    }
}

impl Mul<f64> for Temperature {
    type Output = Temperature;

    fn mul(self, rhs: f64) -> Temperature {
        Temperature(self.0 * rhs)
    }
}

impl Div<f64> for Temperature {
    type Output = Temperature;

    fn div(self, rhs: f64) -> Temperature {
        Temperature(self.0 / rhs)
    }
}

/// Division of Temperature by Temperature returns a dimensionless ratio
impl Div for Temperature {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}
