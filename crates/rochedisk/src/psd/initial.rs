//! Initial-condition laws for the size distribution.
//!
//! # Variants
//!
//! - **MonoDisperse**: all mass in the bin containing one size
//! - **PowerLaw**: dN/ds ∝ s^(-q) truncated to `[s_min, s_max]`
//! - **LognormalMixture**: weighted sum of lognormal peaks in dM/d ln s
//!
//! Every law produces a shape; [`build_initial_psd`] then rescales it to the
//! requested column density.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Density, Length, SurfaceDensity};

use crate::error::{ensure_positive, DiskError, DiskResult};
use crate::grid::SizeGrid;
use crate::psd::ParticleSizeDistribution;

/// One lognormal component of a mixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct LognormalComponent {
    /// Relative mass weight (normalized across the mixture)
    pub weight: f64,
    /// Median size (m)
    pub median_m: f64,
    /// Width in ln(s)
    pub sigma_ln: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum InitialPsd {
    MonoDisperse { size_m: f64 },
    PowerLaw { q: f64, s_min_m: f64, s_max_m: f64 },
    LognormalMixture { components: Vec<LognormalComponent> },
}

impl Default for InitialPsd {
    fn default() -> Self {
        Self::PowerLaw {
            q: 3.5,
            s_min_m: 1.0e-6,
            s_max_m: 3.0,
        }
    }
}

impl InitialPsd {
    /// Unnormalized number density per bin for this law.
    pub fn shape(&self, grid: &SizeGrid, bulk_density: Density) -> DiskResult<Vec<f64>> {
        let n = grid.n_bins();
        let mut number = vec![0.0; n];

        match self {
            Self::MonoDisperse { size_m } => {
                ensure_positive("initial.size_m", *size_m)?;
                let k = grid.clamped_index(Length::from_meters(*size_m));
                number[k] = 1.0;
            }
            Self::PowerLaw { q, s_min_m, s_max_m } => {
                ensure_positive("initial.s_min_m", *s_min_m)?;
                if s_max_m <= s_min_m {
                    return Err(DiskError::invalid_input(
                        "initial.s_max_m",
                        *s_max_m,
                        "must exceed s_min_m",
                    ));
                }
                let edges = grid.edges();
                for (k, slot) in number.iter_mut().enumerate() {
                    let a = edges[k].max(*s_min_m);
                    let b = edges[k + 1].min(*s_max_m);
                    if b > a {
                        *slot = power_law_integral(a, b, *q);
                    }
                }
            }
            Self::LognormalMixture { components } => {
                if components.is_empty() {
                    return Err(DiskError::configuration(
                        "initial.components",
                        "lognormal mixture needs at least one component",
                    ));
                }
                let masses = grid.masses(bulk_density);
                let edges = grid.edges();
                for c in components {
                    ensure_positive("initial.median_m", c.median_m)?;
                    ensure_positive("initial.sigma_ln", c.sigma_ln)?;
                    if c.weight < 0.0 {
                        return Err(DiskError::invalid_input(
                            "initial.weight",
                            c.weight,
                            "must be non-negative",
                        ));
                    }
                }
                let total_weight: f64 = components.iter().map(|c| c.weight).sum();
                for (k, slot) in number.iter_mut().enumerate() {
                    let ln_s = grid.centers()[k].ln();
                    let d_ln = (edges[k + 1] / edges[k]).ln();
                    let dm: f64 = components
                        .iter()
                        .map(|c| {
                            let z = (ln_s - c.median_m.ln()) / c.sigma_ln;
                            c.weight / total_weight * (-0.5 * z * z).exp() / c.sigma_ln
                        })
                        .sum::<f64>()
                        * d_ln;
                    *slot = dm / masses[k];
                }
            }
        }

        if number.iter().all(|n| *n <= 0.0) {
            return Err(DiskError::configuration(
                "initial",
                "initial size distribution has no support on the size grid",
            ));
        }
        Ok(number)
    }
}

/// ∫_a^b s^(-q) ds
pub(crate) fn power_law_integral(a: f64, b: f64, q: f64) -> f64 {
    let p = 1.0 - q;
    if p.abs() < 1e-12 {
        (b / a).ln()
    } else {
        (b.powf(p) - a.powf(p)) / p
    }
}

/// Initial distribution rescaled to `column`.
pub fn build_initial_psd(
    law: &InitialPsd,
    grid: SizeGrid,
    bulk_density: Density,
    column: SurfaceDensity,
) -> DiskResult<ParticleSizeDistribution> {
    let shape = law.shape(&grid, bulk_density)?;
    let mut psd = ParticleSizeDistribution::from_numbers(grid, bulk_density, shape)?;
    if column.to_kg_per_m2() < 0.0 || !column.is_finite() {
        return Err(DiskError::invalid_input(
            "initial.column_density",
            column.to_kg_per_m2(),
            "must be finite and non-negative",
        ));
    }
    if column.to_kg_per_m2() == 0.0 {
        psd.scale(0.0);
    } else {
        psd.scale_to_column(column)?;
    }
    Ok(psd)
}
