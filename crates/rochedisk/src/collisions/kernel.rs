//! Pairwise collision-rate matrix.
//!
//! # Physics
//!
//! For grains in bins i and j with radii s_i, s_j the rate coefficient per
//! unit number surface density of both partners is
//!
//! ```text
//! C_ij = π (s_i + s_j)² v_ij / (√(2π) H_ij (1 + δ_ij)),   H_ij = √(H_i² + H_j²)
//! ```
//!
//! The geometric cross-section times the impact speed is divided by the
//! effective vertical thickness of the layer; the 1/(1+δ_ij) factor avoids
//! double counting identical pairs. The loss rate of a single grain in bin i
//! is then Σ_j (1 + δ_ij) C_ij n_j.
//!
//! # References
//! - Krivov et al. (2006) - "Dust distributions in debris disks"
//! - Thébault & Augereau (2007) - "Collisional processes in debris discs"

use std::f64::consts::PI;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Length, Time, Velocity};

use crate::constants::{MIN_INCLINATION, MIN_SCALE_HEIGHT};
use crate::error::{DiskError, DiskResult};
use crate::grid::SizeGrid;

/// Vertical scale height prescription.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScaleHeightMode {
    /// H = h_factor · i · r
    InclinationScaled { h_factor: f64 },
    /// H = (H/a) · r
    FixedAspect { h_over_a: f64 },
}

impl Default for ScaleHeightMode {
    fn default() -> Self {
        Self::InclinationScaled { h_factor: 1.0 }
    }
}

impl ScaleHeightMode {
    /// Scale height in meters, clamped to [`MIN_SCALE_HEIGHT`].
    pub fn scale_height(&self, inclination: f64, orbital_radius: Length) -> f64 {
        let r = orbital_radius.to_m();
        let h = match self {
            Self::InclinationScaled { h_factor } => h_factor * inclination.max(MIN_INCLINATION) * r,
            Self::FixedAspect { h_over_a } => h_over_a * r,
        };
        if h.is_finite() {
            h.max(MIN_SCALE_HEIGHT)
        } else {
            MIN_SCALE_HEIGHT
        }
    }

    /// Bits of the multiplier, for cache keys
    pub fn factor_bits(&self) -> u64 {
        match self {
            Self::InclinationScaled { h_factor } => h_factor.to_bits(),
            Self::FixedAspect { h_over_a } => h_over_a.to_bits() ^ 1,
        }
    }
}

/// Impact speed for every pair, as one value or a full matrix (m/s).
#[derive(Debug, Clone, PartialEq)]
pub enum RelativeVelocity {
    Scalar(Velocity),
    PerPair(DMatrix<f64>),
}

impl RelativeVelocity {
    /// Speed for pair (i, j) in m/s
    pub fn at(&self, i: usize, j: usize) -> f64 {
        match self {
            Self::Scalar(v) => v.to_meters_per_sec(),
            Self::PerPair(m) => m[(i, j)],
        }
    }

    /// Hash-friendly fingerprint of the velocity input
    pub fn fingerprint(&self) -> u64 {
        match self {
            Self::Scalar(v) => v.to_meters_per_sec().to_bits(),
            Self::PerPair(m) => m
                .iter()
                .fold(0xcbf2_9ce4_8422_2325_u64, |h, v| {
                    (h ^ v.to_bits()).wrapping_mul(0x0100_0000_01b3)
                }),
        }
    }
}

/// Symmetric collision-rate matrix `C[i,j]` (m² s⁻¹).
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionKernel {
    matrix: DMatrix<f64>,
}

impl CollisionKernel {
    /// Build the kernel for `grid` with per-bin scale heights `scale_heights` (m).
    ///
    /// # Errors
    /// [`DiskError::Geometry`] when `H_eff` is non-positive or non-finite,
    /// when a velocity is negative or non-finite, or when input shapes do
    /// not match the grid.
    pub fn build(grid: &SizeGrid, velocity: &RelativeVelocity, scale_heights: &[f64]) -> DiskResult<Self> {
        let n = grid.n_bins();
        if scale_heights.len() != n {
            return Err(DiskError::geometry(format!(
                "scale height vector has {} entries, grid has {n} bins",
                scale_heights.len()
            )));
        }
        if let RelativeVelocity::PerPair(m) = velocity {
            if m.nrows() != n || m.ncols() != n {
                return Err(DiskError::geometry(format!(
                    "velocity matrix is {}x{}, grid has {n} bins",
                    m.nrows(),
                    m.ncols()
                )));
            }
        }

        let sizes = grid.centers();
        let sqrt_2pi = (2.0 * PI).sqrt();
        let mut matrix = DMatrix::zeros(n, n);

        for i in 0..n {
            for j in i..n {
                let v = velocity.at(i, j);
                if !(v.is_finite() && v >= 0.0) {
                    return Err(DiskError::geometry(format!(
                        "relative velocity for pair ({i}, {j}) is {v}"
                    )));
                }
                let h_ij = (scale_heights[i].powi(2) + scale_heights[j].powi(2)).sqrt();
                let delta = if i == j { 2.0 } else { 1.0 };
                let h_eff = sqrt_2pi * h_ij * delta;
                if !(h_eff.is_finite() && h_eff > 0.0) {
                    return Err(DiskError::geometry(format!(
                        "effective scale height for pair ({i}, {j}) is {h_eff}"
                    )));
                }

                let c = PI * (sizes[i] + sizes[j]).powi(2) * v / h_eff;
                matrix[(i, j)] = c;
                matrix[(j, i)] = c;
            }
        }

        Ok(Self { matrix })
    }

    /// Kernel with one scale height for every bin.
    pub fn build_uniform(grid: &SizeGrid, velocity: &RelativeVelocity, scale_height: f64) -> DiskResult<Self> {
        Self::build(grid, velocity, &vec![scale_height; grid.n_bins()])
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn n_bins(&self) -> usize {
        self.matrix.nrows()
    }

    /// Per-grain loss rate Σ_j (1 + δ_ij) C_ij n_j (s⁻¹)
    pub fn loss_rates(&self, number: &[f64]) -> Vec<f64> {
        let n = self.n_bins();
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let w = if i == j { 2.0 } else { 1.0 };
                        w * self.matrix[(i, j)] * number[j]
                    })
                    .sum()
            })
            .collect()
    }

    /// Collision time of each bin, `1 / loss rate`; infinite where nothing collides.
    pub fn collision_times(&self, number: &[f64]) -> Vec<f64> {
        self.loss_rates(number)
            .into_iter()
            .map(|r| if r > 0.0 { 1.0 / r } else { f64::INFINITY })
            .collect()
    }

    /// Shortest finite collision time across bins
    pub fn minimum_collision_time(&self, number: &[f64]) -> Option<Time> {
        self.collision_times(number)
            .into_iter()
            .filter(|t| t.is_finite())
            .reduce(f64::min)
            .map(Time::from_seconds)
    }
}
