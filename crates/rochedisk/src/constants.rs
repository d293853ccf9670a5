//! Physical and numerical constants (SI).

pub use units::GRAVITATIONAL_CONSTANT as G;
pub use units::{MARS_MASS_KG, MARS_RADIUS_M};

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;

/// Stefan–Boltzmann constant (W m⁻² K⁻⁴)
pub const SIGMA_SB: f64 = 5.670374419e-8;

/// Molar gas constant (J mol⁻¹ K⁻¹)
pub const R_GAS: f64 = 8.314462618;

/// Radiation-to-gravity ratio above which grains are unbound
pub const BLOWOUT_BETA: f64 = 0.5;

/// Default bulk density of basaltic grains (kg/m³)
pub const DEFAULT_BULK_DENSITY: f64 = 3000.0;

/// Lower clamp on the vertical scale height used by the collision kernel (m)
pub const MIN_SCALE_HEIGHT: f64 = 1.0e-6;

/// Floor for the inclination when forming the scale height
pub const MIN_INCLINATION: f64 = 1.0e-6;

/// Optical depth below which the surface layer is treated as empty
pub const TAU_MIN: f64 = 1.0e-12;

/// Floor on relative velocity inside the fragment model (m/s)
pub const MIN_IMPACT_VELOCITY: f64 = 1.0e-12;
