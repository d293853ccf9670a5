//! Largest-remnant scaling and the fragment redistribution tensor.
//!
//! # Physics
//!
//! A collision between masses m_i and m_j at speed v delivers the specific
//! impact energy
//!
//! ```text
//! Q_R = μ v² / (2 M),   μ = m_i m_j / M,   M = m_i + m_j
//! ```
//!
//! The largest remnant keeps the fraction f_LR = clip(½ (2 − Q_R / Q*_D), 0, 1)
//! of the total mass: a merger when Q_R → 0, half the mass at the
//! catastrophic threshold and nothing above 2 Q*_D. The rest is spread over
//! the bins at or below the remnant bin following dM/ds ∝ s^(-α).
//!
//! The tensor stores number yields: `Y[k, i, j]` grains of bin k per (i, j)
//! collision, built so that Σ_k Y[k, i, j] m_k = m_i + m_j exactly.
//!
//! # References
//! - Leinhardt & Stewart (2012) - "Collisions between gravity-dominated bodies"
//! - Thébault & Augereau (2007) - "Collisional processes in debris discs"

use std::f64::consts::PI;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Density, Length, Mass, SpecificEnergy, Velocity};

use super::kernel::{CollisionKernel, RelativeVelocity};
use super::qstar::DisruptionThreshold;
use crate::constants::MIN_IMPACT_VELOCITY;
use crate::error::{ensure_positive, DiskError, DiskResult};
use crate::grid::SizeGrid;
use crate::psd::power_law_integral;

/// Which bin receives the largest remnant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum RemnantBinning {
    /// Always the larger parent's bin, `max(i, j)`
    #[default]
    ParentBin,
    /// The bin of the remnant's own radius, capped at the larger parent
    RemnantSize,
}

/// Fragmentation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct FragmentModel {
    /// Slope α of the fragment mass distribution dM/ds ∝ s^(-α)
    pub alpha: f64,
    pub remnant_binning: RemnantBinning,
}

impl Default for FragmentModel {
    fn default() -> Self {
        Self {
            alpha: 3.5,
            remnant_binning: RemnantBinning::ParentBin,
        }
    }
}

/// Specific impact energy Q_R = μ v² / (2 M).
pub fn specific_impact_energy(m1: Mass, m2: Mass, velocity: Velocity) -> DiskResult<SpecificEnergy> {
    let total = m1.to_kg() + m2.to_kg();
    if !(total.is_finite() && total > 0.0) {
        return Err(DiskError::invalid_input(
            "total_mass",
            total,
            "colliding pair must have positive mass",
        ));
    }
    let mu = m1.to_kg() * m2.to_kg() / total;
    let v = velocity.to_meters_per_sec();
    Ok(SpecificEnergy::from_j_per_kg(0.5 * mu * v * v / total))
}

/// Largest-remnant mass fraction f_LR = clip(½ (2 − Q_R/Q*), 0, 1).
pub fn largest_remnant_fraction(q_r: SpecificEnergy, q_star: SpecificEnergy) -> DiskResult<f64> {
    ensure_positive("q_star", q_star.to_j_per_kg())?;
    Ok((0.5 * (2.0 - q_r / q_star)).clamp(0.0, 1.0))
}

/// Number-yield tensor `Y[k, i, j]`, stored as one symmetric matrix per target bin.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentTensor {
    slices: Vec<DMatrix<f64>>,
    /// Pairs whose remnant fell below the smallest bin and was clamped into it
    resolution_clamped: usize,
}

impl FragmentTensor {
    /// Build the tensor on `grid`.
    ///
    /// Pairs with zero impact speed merge (f_LR = 1) without consulting Q*.
    ///
    /// # Errors
    /// [`DiskError::InvalidInput`] for a non-positive bulk density or a
    /// non-positive pair mass; [`DiskError::Configuration`] for an unusable
    /// Q* table; [`DiskError::Geometry`] if a velocity matrix does not match
    /// the grid.
    pub fn build(
        grid: &SizeGrid,
        bulk_density: Density,
        velocity: &RelativeVelocity,
        qstar: &DisruptionThreshold,
        model: &FragmentModel,
    ) -> DiskResult<Self> {
        let rho = ensure_positive("bulk_density", bulk_density.to_kg_per_m3())?;
        qstar.validate()?;
        let n = grid.n_bins();
        if let RelativeVelocity::PerPair(m) = velocity {
            if m.nrows() != n || m.ncols() != n {
                return Err(DiskError::geometry("velocity matrix does not match grid"));
            }
        }

        let sizes = grid.centers();
        let masses = grid.masses(bulk_density);
        let weights = redistribution_weights(grid.edges(), model.alpha);

        let mut slices = vec![DMatrix::zeros(n, n); n];
        let mut resolution_clamped = 0;

        for i in 0..n {
            for j in i..n {
                let m_tot = masses[i] + masses[j];
                if !(m_tot.is_finite() && m_tot > 0.0) {
                    return Err(DiskError::invalid_input(
                        "total_mass",
                        m_tot,
                        "colliding pair must have positive mass",
                    ));
                }
                let parent = j;

                let v_raw = velocity.at(i, j);
                let f_lr = if v_raw > 0.0 {
                    let v = v_raw.max(MIN_IMPACT_VELOCITY);
                    let mu = masses[i] * masses[j] / m_tot;
                    let q_r = 0.5 * mu * v * v / m_tot;
                    let q_star = qstar.evaluate_si(sizes[parent], rho, v / 1.0e3);
                    if q_star > 0.0 && q_star.is_finite() {
                        (0.5 * (2.0 - q_r / q_star)).clamp(0.0, 1.0)
                    } else {
                        0.0
                    }
                } else {
                    1.0
                };

                let k_lr = match model.remnant_binning {
                    RemnantBinning::ParentBin => parent,
                    RemnantBinning::RemnantSize if f_lr <= 0.0 => parent,
                    RemnantBinning::RemnantSize => {
                        let s_lr = (f_lr * m_tot * 3.0 / (4.0 * PI * rho)).cbrt();
                        match grid.bin_index(Length::from_meters(s_lr)) {
                            Some(k) => k.min(parent),
                            None if s_lr > grid.max_size().to_m() => parent,
                            None => {
                                resolution_clamped += 1;
                                0
                            }
                        }
                    }
                };

                let mut mass_fraction = vec![0.0; k_lr + 1];
                mass_fraction[k_lr] += f_lr;
                let remainder = 1.0 - f_lr;
                if remainder > 0.0 {
                    for (k, w) in weights[k_lr].iter().enumerate() {
                        mass_fraction[k] += remainder * w;
                    }
                }

                for (k, frac) in mass_fraction.into_iter().enumerate() {
                    if frac > 0.0 {
                        let y = frac * m_tot / masses[k];
                        slices[k][(i, j)] = y;
                        slices[k][(j, i)] = y;
                    }
                }
            }
        }

        if resolution_clamped > 0 {
            log::warn!(
                "{resolution_clamped} remnant(s) smaller than the grid; clamped into the smallest bin"
            );
        }

        Ok(Self {
            slices,
            resolution_clamped,
        })
    }

    pub fn n_bins(&self) -> usize {
        self.slices.len()
    }

    /// Y[k, i, j]
    pub fn yield_at(&self, k: usize, i: usize, j: usize) -> f64 {
        self.slices[k][(i, j)]
    }

    /// Yields into bin `k` for every pair
    pub fn slice(&self, k: usize) -> &DMatrix<f64> {
        &self.slices[k]
    }

    pub fn resolution_clamped(&self) -> usize {
        self.resolution_clamped
    }

    /// Relative residual |Σ_k Y[k,i,j] m_k − (m_i + m_j)| / (m_i + m_j)
    pub fn mass_residual(&self, i: usize, j: usize, masses: &[f64]) -> f64 {
        let produced: f64 = (0..self.n_bins())
            .map(|k| self.slices[k][(i, j)] * masses[k])
            .sum();
        let m_tot = masses[i] + masses[j];
        (produced - m_tot).abs() / m_tot
    }

    /// Explicit gain Gain_k = Σ_{i≤j} Y[k,i,j] C_ij n_i n_j (m⁻² s⁻¹)
    pub fn gain(&self, kernel: &CollisionKernel, number: &[f64]) -> Vec<f64> {
        let n = self.n_bins();
        let c = kernel.matrix();

        // Collision rate per pair, counted once
        let mut pair_rates = Vec::with_capacity(n * (n + 1) / 2);
        for i in 0..n {
            for j in i..n {
                let rate = c[(i, j)] * number[i] * number[j];
                if rate > 0.0 {
                    pair_rates.push((i, j, rate));
                }
            }
        }

        self.slices
            .iter()
            .map(|y| pair_rates.iter().map(|&(i, j, r)| y[(i, j)] * r).sum())
            .collect()
    }
}

/// Normalized mass weights ∫_bin s^(-α) ds over bins `0..=k_lr`, for every `k_lr`.
fn redistribution_weights(edges: &[f64], alpha: f64) -> Vec<Vec<f64>> {
    let n = edges.len() - 1;
    let integrals: Vec<f64> = (0..n)
        .map(|k| {
            let w = power_law_integral(edges[k], edges[k + 1], alpha);
            if w.is_finite() && w > 0.0 {
                w
            } else {
                0.0
            }
        })
        .collect();

    (0..n)
        .map(|k_lr| {
            let total: f64 = integrals[..=k_lr].iter().sum();
            if total > 0.0 {
                integrals[..=k_lr].iter().map(|w| w / total).collect()
            } else {
                // Degenerate slope: put everything in the remnant bin
                let mut w = vec![0.0; k_lr + 1];
                w[k_lr] = 1.0;
                w
            }
        })
        .collect()
}
