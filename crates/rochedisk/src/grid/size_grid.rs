//! Logarithmic partition of grain radius into bins.
//!
//! The grid is immutable: shifting the lower edge (for example when the
//! minimum-size floor rises above the current smallest edge) produces a new
//! grid with a bumped [`SizeGrid::version`], which invalidates every cached
//! kernel and fragment tensor built on the old edges.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use units::{Density, Length};

use crate::error::{DiskError, DiskResult};

/// A single bin of the size grid, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBin {
    /// Geometric mean of the edges
    pub center: Length,
    pub lower: Length,
    pub upper: Length,
    /// `upper - lower`
    pub width: Length,
}

/// Log-spaced size grid with a version token.
///
/// Only [`SizeGrid::build`] and [`SizeGrid::with_floor`] create grids.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeGrid {
    edges: Vec<f64>,
    centers: Vec<f64>,
    widths: Vec<f64>,
    version: u64,
}

impl SizeGrid {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Build `n_bins` logarithmic bins spanning `[min_size, max_size]`.
    ///
    /// # Errors
    /// [`DiskError::Geometry`] if either bound is non-finite or non-positive,
    /// if `min_size >= max_size`, or if `n_bins < 1`.
    pub fn build(min_size: Length, max_size: Length, n_bins: usize) -> DiskResult<Self> {
        Self::build_versioned(min_size.to_m(), max_size.to_m(), n_bins, 0)
    }

    fn build_versioned(s_min: f64, s_max: f64, n_bins: usize, version: u64) -> DiskResult<Self> {
        if !(s_min.is_finite() && s_max.is_finite()) || s_min <= 0.0 {
            return Err(DiskError::geometry(format!(
                "size bounds must be finite and positive (min={s_min:e}, max={s_max:e})"
            )));
        }
        if s_min >= s_max {
            return Err(DiskError::geometry(format!(
                "min_size {s_min:e} must be below max_size {s_max:e}"
            )));
        }
        if n_bins < 1 {
            return Err(DiskError::geometry("n_bins must be at least 1"));
        }

        let log_min = s_min.ln();
        let step = (s_max.ln() - log_min) / n_bins as f64;
        let mut edges: Vec<f64> = (0..=n_bins)
            .map(|k| (log_min + step * k as f64).exp())
            .collect();
        // Pin the outer edges so rounding never shifts them
        edges[0] = s_min;
        edges[n_bins] = s_max;

        let centers = edges.windows(2).map(|w| (w[0] * w[1]).sqrt()).collect();
        let widths = edges.windows(2).map(|w| w[1] - w[0]).collect();

        Ok(Self {
            edges,
            centers,
            widths,
            version,
        })
    }

    /// Rebuild the grid over `[floor, max_size]` with the same bin count.
    ///
    /// The returned grid carries `version + 1`. A floor at or below the
    /// current lower edge returns an unchanged clone.
    pub fn with_floor(&self, floor: Length) -> DiskResult<Self> {
        let floor = floor.to_m();
        if floor <= self.edges[0] {
            return Ok(self.clone());
        }
        Self::build_versioned(floor, self.max_size().to_m(), self.n_bins(), self.version + 1)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Cache-invalidation token; bumped only when edges are rebuilt.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn n_bins(&self) -> usize {
        self.centers.len()
    }

    /// Bin centers in meters
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Bin edges in meters, `n_bins + 1` values
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin widths in meters
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn min_size(&self) -> Length {
        Length::from_meters(self.edges[0])
    }

    pub fn max_size(&self) -> Length {
        Length::from_meters(self.edges[self.edges.len() - 1])
    }

    pub fn bin(&self, k: usize) -> SizeBin {
        SizeBin {
            center: Length::from_meters(self.centers[k]),
            lower: Length::from_meters(self.edges[k]),
            upper: Length::from_meters(self.edges[k + 1]),
            width: Length::from_meters(self.widths[k]),
        }
    }

    pub fn bins(&self) -> impl Iterator<Item = SizeBin> + '_ {
        (0..self.n_bins()).map(move |k| self.bin(k))
    }

    /// Index of the bin whose edges contain `size` (upper edge inclusive for
    /// the last bin). `None` outside the grid.
    pub fn bin_index(&self, size: Length) -> Option<usize> {
        let s = size.to_m();
        let n = self.n_bins();
        if !s.is_finite() || s < self.edges[0] || s > self.edges[n] {
            return None;
        }
        // First edge strictly greater than s, minus one
        let upper = self.edges.partition_point(|&e| e <= s);
        Some(upper.saturating_sub(1).min(n - 1))
    }

    /// Like [`bin_index`](Self::bin_index) but clamps out-of-range sizes to
    /// the first or last bin.
    pub fn clamped_index(&self, size: Length) -> usize {
        match self.bin_index(size) {
            Some(k) => k,
            None if size.to_m() < self.edges[0] => 0,
            None => self.n_bins() - 1,
        }
    }

    /// Mass of a sphere at each bin center, `4/3 π ρ s³` (kg)
    pub fn masses(&self, bulk_density: Density) -> Vec<f64> {
        let rho = bulk_density.to_kg_per_m3();
        self.centers
            .iter()
            .map(|s| 4.0 / 3.0 * PI * rho * s.powi(3))
            .collect()
    }
}
