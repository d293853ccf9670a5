//! Mapping a supplied mass rate onto the size grid.
//!
//! Every policy returns a number source S_k (m⁻² s⁻¹) with Σ S_k m_k equal
//! to the injected mass rate. Bins below the minimum-size floor never
//! receive mass, so injected material is not swept out by the next
//! sanitize pass.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::MassFlux;

use crate::error::{DiskError, DiskResult};
use crate::psd::{power_law_integral, ParticleSizeDistribution};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InjectionPolicy {
    /// All mass into the smallest bin at or above the floor
    #[default]
    MinimumBin,
    /// dN/ds ∝ s^(-q) over `[s_min, s_max]`
    PowerLaw { q: f64, s_min_m: f64, s_max_m: f64 },
    /// Same mass fractions as the initial distribution
    InitialShape,
}

impl InjectionPolicy {
    pub fn validate(&self) -> DiskResult<()> {
        match self {
            Self::PowerLaw { q, s_min_m, s_max_m } => {
                if !(q.is_finite() && *s_min_m > 0.0 && s_max_m > s_min_m) {
                    return Err(DiskError::configuration(
                        "supply.injection",
                        "power-law injection needs finite q and 0 < s_min_m < s_max_m",
                    ));
                }
                Ok(())
            }
            Self::MinimumBin | Self::InitialShape => Ok(()),
        }
    }

    /// Per-bin number source carrying `rate` into `psd`.
    ///
    /// `initial_shape` is the initial number shape and is only read by
    /// [`InjectionPolicy::InitialShape`].
    pub fn source(
        &self,
        rate: MassFlux,
        psd: &ParticleSizeDistribution,
        initial_shape: Option<&[f64]>,
    ) -> DiskResult<Vec<f64>> {
        let n = psd.n_bins();
        let rate = rate.non_negative().to_kg_per_m2_s();
        let mut source = vec![0.0; n];
        if rate <= 0.0 {
            return Ok(source);
        }

        let floor = psd.minimum_size_floor().to_m();
        let sizes = psd.sizes();
        let masses = psd.masses();
        let Some(first) = sizes.iter().position(|s| *s >= floor) else {
            return Err(DiskError::configuration(
                "supply.injection",
                "every bin lies below the minimum-size floor",
            ));
        };

        let mut weights = vec![0.0; n];
        match self {
            Self::MinimumBin => weights[first] = 1.0,
            Self::PowerLaw { q, s_min_m, s_max_m } => {
                let edges = psd.grid().edges();
                for k in first..n {
                    let a = edges[k].max(*s_min_m);
                    let b = edges[k + 1].min(*s_max_m);
                    if b > a {
                        weights[k] = power_law_integral(a, b, *q) * masses[k];
                    }
                }
            }
            Self::InitialShape => {
                let shape = initial_shape.filter(|s| s.len() == n).ok_or_else(|| {
                    DiskError::configuration("supply.injection", "initial shape does not match the grid")
                })?;
                for k in first..n {
                    weights[k] = shape[k].max(0.0) * masses[k];
                }
            }
        }

        let total: f64 = weights.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            // No overlap with the resolved grid: fall back to the smallest bin
            log::debug!("injection weights empty, using bin {first}");
            weights.iter_mut().for_each(|w| *w = 0.0);
            weights[first] = 1.0;
        }
        let total: f64 = weights.iter().sum();
        for ((slot, w), m) in source.iter_mut().zip(&weights).zip(masses) {
            *slot = rate * w / total / m;
        }
        Ok(source)
    }
}
