//! Owned particle-size distribution state.
//!
//! The distribution stores number surface densities `n_k` (m⁻²) on a
//! [`SizeGrid`] together with the grain bulk density and the current
//! minimum-size floor. Per-bin masses are computed once from the grid and
//! refreshed whenever the grid is replaced.

use std::f64::consts::PI;

use units::{Density, Length, Opacity, SurfaceDensity};

use crate::error::{ensure_positive, DiskError, DiskResult};
use crate::grid::SizeGrid;

/// What [`ParticleSizeDistribution::sanitize`] removed or repaired.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SanitizeReport {
    /// Column mass removed from bins below the size floor (kg/m²)
    pub floor_mass_removed: f64,
    /// Column mass added back by clipping negative entries (kg/m²)
    pub clipped_negative_mass: f64,
    /// Number of non-finite entries that were zeroed
    pub non_finite: usize,
}

/// Particle-size distribution owned by the solver between steps.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSizeDistribution {
    grid: SizeGrid,
    /// Number surface density per bin (m⁻²)
    number: Vec<f64>,
    /// Grain mass at each bin center (kg)
    masses: Vec<f64>,
    bulk_density: Density,
    minimum_size_floor: Length,
}

impl ParticleSizeDistribution {
    /// Empty distribution on `grid`. The floor starts at the grid's lower edge.
    pub fn new(grid: SizeGrid, bulk_density: Density) -> DiskResult<Self> {
        ensure_positive("bulk_density", bulk_density.to_kg_per_m3())?;
        let masses = grid.masses(bulk_density);
        let n = grid.n_bins();
        let floor = grid.min_size();
        Ok(Self {
            grid,
            number: vec![0.0; n],
            masses,
            bulk_density,
            minimum_size_floor: floor,
        })
    }

    /// Distribution with explicit number densities.
    pub fn from_numbers(grid: SizeGrid, bulk_density: Density, number: Vec<f64>) -> DiskResult<Self> {
        let mut psd = Self::new(grid, bulk_density)?;
        psd.set_number(number)?;
        Ok(psd)
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn grid(&self) -> &SizeGrid {
        &self.grid
    }

    pub fn number(&self) -> &[f64] {
        &self.number
    }

    /// Grain mass at each bin center (kg)
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn sizes(&self) -> &[f64] {
        self.grid.centers()
    }

    pub fn bulk_density(&self) -> Density {
        self.bulk_density
    }

    pub fn minimum_size_floor(&self) -> Length {
        self.minimum_size_floor
    }

    pub fn n_bins(&self) -> usize {
        self.number.len()
    }

    /// Column mass per bin, `n_k m_k` (kg/m²)
    pub fn mass_per_bin(&self) -> Vec<f64> {
        self.number
            .iter()
            .zip(&self.masses)
            .map(|(n, m)| n * m)
            .collect()
    }

    /// Total column density Σ n_k m_k
    pub fn total_mass(&self) -> SurfaceDensity {
        SurfaceDensity::from_kg_per_m2(column_mass(&self.number, &self.masses))
    }

    /// Mass opacity κ = Σ π s² n / Σ m n. `None` for an empty distribution.
    pub fn opacity(&self) -> Option<Opacity> {
        let mass = column_mass(&self.number, &self.masses);
        if !(mass.is_finite() && mass > 0.0) {
            return None;
        }
        let area: f64 = self
            .number
            .iter()
            .zip(self.grid.centers())
            .map(|(n, s)| PI * s * s * n)
            .sum();
        let kappa = area / mass;
        kappa.is_finite().then(|| Opacity::from_m2_per_kg(kappa))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace the number vector. Length must match the grid.
    pub fn set_number(&mut self, number: Vec<f64>) -> DiskResult<()> {
        if number.len() != self.grid.n_bins() {
            return Err(DiskError::geometry(format!(
                "number vector has {} entries, grid has {} bins",
                number.len(),
                self.grid.n_bins()
            )));
        }
        self.number = number;
        Ok(())
    }

    pub fn set_minimum_size_floor(&mut self, floor: Length) {
        self.minimum_size_floor = floor;
    }

    /// Multiply every bin by `factor` (used to normalize initial conditions).
    pub fn scale(&mut self, factor: f64) {
        for n in &mut self.number {
            *n *= factor;
        }
    }

    /// Rescale so the total column equals `target`.
    pub fn scale_to_column(&mut self, target: SurfaceDensity) -> DiskResult<()> {
        let current = self.total_mass().to_kg_per_m2();
        if current <= 0.0 {
            return Err(DiskError::invalid_input(
                "column_density",
                current,
                "cannot rescale an empty distribution",
            ));
        }
        self.scale(target.to_kg_per_m2() / current);
        Ok(())
    }

    /// Clip negative or non-finite entries to zero and empty every bin whose
    /// center lies below the minimum-size floor.
    pub fn sanitize(&mut self) -> SanitizeReport {
        let mut report = SanitizeReport::default();
        let floor = self.minimum_size_floor.to_m();

        for ((n, m), s) in self
            .number
            .iter_mut()
            .zip(&self.masses)
            .zip(self.grid.centers())
        {
            if !n.is_finite() {
                report.non_finite += 1;
                *n = 0.0;
                continue;
            }
            if *n < 0.0 {
                report.clipped_negative_mass += -*n * m;
                *n = 0.0;
                continue;
            }
            if *s < floor && *n > 0.0 {
                report.floor_mass_removed += *n * m;
                *n = 0.0;
            }
        }

        if report.non_finite > 0 {
            log::warn!("sanitize zeroed {} non-finite PSD bins", report.non_finite);
        }
        report
    }

    /// Move the distribution onto `target`, conserving mass.
    ///
    /// Each source bin spreads its mass uniformly in ln(s) across its edges
    /// and deposits it into the target bins it overlaps. Mass falling below
    /// the target grid is returned as the second element; mass above the
    /// target grid goes into the last bin.
    pub fn rebin_onto(&self, target: SizeGrid) -> DiskResult<(Self, f64)> {
        let mut out = Self::new(target, self.bulk_density)?;
        out.minimum_size_floor = self.minimum_size_floor.max(out.grid.min_size());

        let new_edges = out.grid.edges().to_vec();
        let n_new = out.grid.n_bins();
        let mut mass_new = vec![0.0; n_new];
        let mut lost_below = 0.0;

        for (k, mass_k) in self.mass_per_bin().into_iter().enumerate() {
            if mass_k <= 0.0 {
                continue;
            }
            let lo = self.grid.edges()[k];
            let hi = self.grid.edges()[k + 1];
            let span = (hi / lo).ln();

            let below = (new_edges[0].min(hi) / lo).ln().max(0.0) / span;
            lost_below += mass_k * below;
            let above = (hi / new_edges[n_new].max(lo)).ln().max(0.0) / span;
            mass_new[n_new - 1] += mass_k * above;

            for (j, slot) in mass_new.iter_mut().enumerate() {
                let a = lo.max(new_edges[j]);
                let b = hi.min(new_edges[j + 1]);
                if b > a {
                    *slot += mass_k * (b / a).ln() / span;
                }
            }
        }

        let number = mass_new
            .iter()
            .zip(out.masses.iter())
            .map(|(m, mk)| m / mk)
            .collect();
        out.number = number;
        Ok((out, lost_below))
    }
}

fn column_mass(number: &[f64], masses: &[f64]) -> f64 {
    number.iter().zip(masses).map(|(n, m)| n * m).sum()
}
