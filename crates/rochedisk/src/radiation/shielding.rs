//! Self-shielding of the surface layer.
//!
//! The opacity κ of the size distribution is reduced by a shielding factor
//! Φ(τ) ∈ [0, 1], giving κ_eff = Φ κ. The column that is optically thick
//! along the irradiation path is Σ_τ=1 = 1/κ_eff. Optical depth along the
//! line of sight to Mars is the vertical τ times a geometric path factor.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Opacity, SurfaceDensity};

use crate::error::{DiskError, DiskResult};

/// Self-shielding factor Φ(τ).
pub trait ShieldingFactor {
    fn phi(&self, tau: f64) -> f64;
}

/// Φ independent of τ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantShielding(pub f64);

impl ShieldingFactor for ConstantShielding {
    fn phi(&self, _tau: f64) -> f64 {
        self.0
    }
}

/// Φ(τ) interpolated linearly from a table, held constant past either end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedShielding {
    tau: Vec<f64>,
    phi: Vec<f64>,
}

impl TabulatedShielding {
    pub fn new(tau: Vec<f64>, phi: Vec<f64>) -> DiskResult<Self> {
        if tau.is_empty() || tau.len() != phi.len() {
            return Err(DiskError::configuration(
                "optical_depth.shielding",
                "Φ table needs matching, non-empty τ and Φ columns",
            ));
        }
        if tau.windows(2).any(|w| w[1] <= w[0]) {
            return Err(DiskError::configuration(
                "optical_depth.shielding",
                "Φ table τ values must be strictly increasing",
            ));
        }
        Ok(Self { tau, phi })
    }
}

impl ShieldingFactor for TabulatedShielding {
    fn phi(&self, tau: f64) -> f64 {
        interpolate_clamped(&self.tau, &self.phi, tau)
    }
}

/// Piecewise-linear lookup, clamped to the end values outside the table.
pub(crate) fn interpolate_clamped(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let last = xs.len() - 1;
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[last] {
        return ys[last];
    }
    let upper = xs.partition_point(|v| *v <= x);
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let w = (x - x0) / (x1 - x0);
    ys[upper - 1] * (1.0 - w) + ys[upper] * w
}

/// Configured shielding law.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ShieldingModel {
    /// Φ = 1
    #[default]
    Off,
    Constant { phi: f64 },
    Table { tau: Vec<f64>, phi: Vec<f64> },
}

impl ShieldingModel {
    pub fn validate(&self) -> DiskResult<()> {
        match self {
            Self::Off => Ok(()),
            Self::Constant { phi } if (0.0..=1.0).contains(phi) => Ok(()),
            Self::Constant { .. } => Err(DiskError::configuration(
                "optical_depth.shielding.phi",
                "Φ must lie within [0, 1]",
            )),
            Self::Table { tau, phi } => TabulatedShielding::new(tau.clone(), phi.clone()).map(|_| ()),
        }
    }
}

impl ShieldingFactor for ShieldingModel {
    fn phi(&self, tau: f64) -> f64 {
        match self {
            Self::Off => 1.0,
            Self::Constant { phi } => *phi,
            Self::Table { tau: xs, phi: ys } if !xs.is_empty() && xs.len() == ys.len() => {
                interpolate_clamped(xs, ys, tau)
            }
            Self::Table { .. } => 1.0,
        }
    }
}

/// κ_eff = clip(Φ(τ), 0, 1) κ.
pub fn effective_opacity(kappa: Opacity, tau: f64, shielding: &impl ShieldingFactor) -> Opacity {
    let phi = shielding.phi(tau);
    let phi = if phi.is_finite() { phi.clamp(0.0, 1.0) } else { 1.0 };
    Opacity::from_m2_per_kg(phi * kappa.to_m2_per_kg())
}

/// Σ_τ=1 = 1/κ_eff; `None` (unbounded) for a non-positive or non-finite κ_eff.
pub fn tau_unity_column(kappa_eff: Opacity) -> Option<SurfaceDensity> {
    let k = kappa_eff.to_m2_per_kg();
    if k.is_finite() && k > 0.0 {
        Some(SurfaceDensity::from_kg_per_m2(1.0 / k))
    } else {
        None
    }
}

/// Vertical-to-Mars path conversion τ_los = τ_vert · factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LineOfSight {
    /// factor = path_multiplier / (H/r)
    AspectRatio { h_over_r: f64, path_multiplier: f64 },
    /// factor = 1
    Vertical,
}

impl Default for LineOfSight {
    fn default() -> Self {
        Self::AspectRatio {
            h_over_r: 1.0,
            path_multiplier: 1.0,
        }
    }
}

impl LineOfSight {
    pub fn factor(&self) -> f64 {
        match self {
            Self::AspectRatio {
                h_over_r,
                path_multiplier,
            } if *h_over_r > 0.0 => path_multiplier / h_over_r,
            Self::AspectRatio { .. } | Self::Vertical => 1.0,
        }
    }
}
