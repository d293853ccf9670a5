//! Column-density bookkeeping for the optically active surface layer.
//!
//! # Physics
//!
//! The irradiated skin gains mass from the external supply and loses it to
//! radiation blow-out and non-collisional sinks:
//!
//! ```text
//! dΣ/dt = Ṁ_prod − Ṁ_blow − Ṁ_sink
//! ```
//!
//! Its optical depth along the line of sight to Mars is
//! τ_los = κ_eff Σ · f_los. A run stops once τ_los exceeds the configured
//! threshold; clipping Σ to Σ_τ=1 instead is available only as an explicit
//! opt-in.
//!
//! # References
//! - Takeuchi & Lin (2003) - "Radial flow of dust particles in accretion disks"
//! - Wyatt (2008) - "Evolution of debris disks"

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{AngularVelocity, MassFlux, Opacity, SurfaceDensity, Time};

use crate::constants::TAU_MIN;
use crate::error::{DiskError, DiskResult};
use crate::radiation::{tau_unity_column, LineOfSight, ShieldingModel};
use crate::supply::HeadroomPolicy;

/// Why a run ended before its requested end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TauExceeded,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TauExceeded => "tau_exceeded",
        }
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optical-depth stop and headroom settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct OpticalDepthConfig {
    /// Line-of-sight τ above which the run stops
    pub tau_stop: f64,
    /// Relative tolerance on `tau_stop`
    pub tau_stop_tolerance: f64,
    pub line_of_sight: LineOfSight,
    pub shielding: ShieldingModel,
    pub headroom: HeadroomPolicy,
}

impl Default for OpticalDepthConfig {
    fn default() -> Self {
        Self {
            tau_stop: 1.0,
            tau_stop_tolerance: 1.0e-6,
            line_of_sight: LineOfSight::default(),
            shielding: ShieldingModel::Off,
            headroom: HeadroomPolicy::Off,
        }
    }
}

impl OpticalDepthConfig {
    pub fn validate(&self) -> DiskResult<()> {
        if !(self.tau_stop.is_finite() && self.tau_stop > 0.0) {
            return Err(DiskError::configuration(
                "optical_depth.tau_stop",
                "must be positive and finite",
            ));
        }
        if !(self.tau_stop_tolerance >= 0.0) {
            return Err(DiskError::configuration(
                "optical_depth.tau_stop_tolerance",
                "must be non-negative",
            ));
        }
        self.shielding.validate()
    }
}

/// Result of an optical-depth evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct OpticalDepthStatus {
    /// Line-of-sight optical depth; `None` when opacity or column is not finite
    pub tau: Option<f64>,
    pub tau_vertical: Option<f64>,
    pub stop: bool,
}

impl OpticalDepthStatus {
    pub fn invalid() -> Self {
        Self {
            tau: None,
            tau_vertical: None,
            stop: false,
        }
    }
}

/// Snapshot of the reservoir (kg/m² throughout).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct ReservoirState {
    pub column_density: f64,
    pub cumulative_mass_lost_blowout: f64,
    pub cumulative_mass_lost_sink: f64,
    pub cumulative_mass_supplied: f64,
    pub cumulative_mass_spilled: f64,
    /// Mass removed by Σ_τ=1 clipping
    pub cumulative_mass_clipped: f64,
    /// Accumulated |Σ_reservoir − Σ_PSD| found by `reconcile`
    pub cumulative_drift: f64,
    pub optical_depth: Option<f64>,
}

/// Zero-dimensional surface reservoir.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceReservoir {
    state: ReservoirState,
    config: OpticalDepthConfig,
}

impl SurfaceReservoir {
    pub fn new(initial: SurfaceDensity, config: OpticalDepthConfig) -> DiskResult<Self> {
        let sigma = initial.to_kg_per_m2();
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(DiskError::invalid_input(
                "column_density",
                sigma,
                "must be finite and non-negative",
            ));
        }
        Ok(Self {
            state: ReservoirState {
                column_density: sigma,
                ..ReservoirState::default()
            },
            config,
        })
    }

    pub fn state(&self) -> &ReservoirState {
        &self.state
    }

    pub fn config(&self) -> &OpticalDepthConfig {
        &self.config
    }

    pub fn column_density(&self) -> SurfaceDensity {
        SurfaceDensity::from_kg_per_m2(self.state.column_density)
    }

    /// Add `rate · dt` of supplied mass; negative rates are ignored.
    pub fn apply_production(&mut self, rate: MassFlux, dt: Time) -> SurfaceDensity {
        let added = rate.non_negative().over(dt).to_kg_per_m2().max(0.0);
        self.state.column_density += added;
        self.state.cumulative_mass_supplied += added;
        SurfaceDensity::from_kg_per_m2(added)
    }

    /// Remove blow-out and sink losses over `dt`, never driving Σ below zero.
    ///
    /// When the requested loss exceeds the column it is scaled down and
    /// split between the channels in proportion to their fluxes.
    pub fn apply_loss(&mut self, blowout: MassFlux, sink: MassFlux, dt: Time) -> SurfaceDensity {
        let blow = blowout.non_negative().over(dt).to_kg_per_m2().max(0.0);
        let sunk = sink.non_negative().over(dt).to_kg_per_m2().max(0.0);
        let requested = blow + sunk;
        if requested <= 0.0 {
            return SurfaceDensity::zero();
        }
        let scale = (self.state.column_density / requested).min(1.0);
        self.state.column_density = (self.state.column_density - requested * scale).max(0.0);
        self.state.cumulative_mass_lost_blowout += blow * scale;
        self.state.cumulative_mass_lost_sink += sunk * scale;
        SurfaceDensity::from_kg_per_m2(requested * scale)
    }

    /// Book supply that was diverted away from the surface.
    pub fn record_spill(&mut self, spilled: SurfaceDensity) {
        self.state.cumulative_mass_spilled += spilled.to_kg_per_m2().max(0.0);
    }

    /// Evaluate τ for the effective opacity `kappa_eff` and path factor
    /// `los_factor`, and whether it crosses the stop threshold.
    pub fn evaluate_optical_depth(&mut self, kappa_eff: Option<Opacity>, los_factor: f64) -> OpticalDepthStatus {
        let Some(kappa) = kappa_eff.map(|k| k.to_m2_per_kg()) else {
            self.state.optical_depth = None;
            return OpticalDepthStatus::invalid();
        };
        let sigma = self.state.column_density;
        if !(kappa.is_finite() && sigma.is_finite() && los_factor.is_finite()) {
            self.state.optical_depth = None;
            return OpticalDepthStatus::invalid();
        }

        let tau_vertical = kappa * sigma;
        let tau_los = tau_vertical * los_factor;
        let limit = self.config.tau_stop * (1.0 + self.config.tau_stop_tolerance);
        self.state.optical_depth = Some(tau_los);
        OpticalDepthStatus {
            tau: Some(tau_los),
            tau_vertical: Some(tau_vertical),
            stop: tau_los > limit,
        }
    }

    /// Σ_τ=1 − Σ, floored at zero; `None` when Σ_τ=1 is unbounded.
    pub fn headroom(&self, kappa_eff: Opacity) -> Option<SurfaceDensity> {
        tau_unity_column(kappa_eff).map(|cap| {
            SurfaceDensity::from_kg_per_m2((cap.to_kg_per_m2() - self.state.column_density).max(0.0))
        })
    }

    /// Clip Σ to Σ_τ=1 under [`HeadroomPolicy::Clip`]; returns the mass removed.
    pub fn clip_to_tau_unity(&mut self, kappa_eff: Opacity) -> SurfaceDensity {
        if self.config.headroom != HeadroomPolicy::Clip {
            return SurfaceDensity::zero();
        }
        let Some(cap) = tau_unity_column(kappa_eff) else {
            return SurfaceDensity::zero();
        };
        let excess = (self.state.column_density - cap.to_kg_per_m2()).max(0.0);
        self.state.column_density -= excess;
        self.state.cumulative_mass_clipped += excess;
        SurfaceDensity::from_kg_per_m2(excess)
    }

    /// Resynchronize Σ with the PSD column and record the drift.
    pub fn reconcile(&mut self, psd_column: SurfaceDensity) -> f64 {
        let target = psd_column.to_kg_per_m2();
        if !target.is_finite() {
            return 0.0;
        }
        let drift = target - self.state.column_density;
        self.state.cumulative_drift += drift.abs();
        self.state.column_density = target.max(0.0);
        drift
    }
}

/// Wyatt surface collision time t_coll = 1/(2Ωτ).
///
/// Returns `None` when τ is at or below [`TAU_MIN`] (collisions off).
pub fn wyatt_collision_time(tau: f64, omega: AngularVelocity) -> DiskResult<Option<Time>> {
    let w = omega.to_rad_per_sec();
    if !(w.is_finite() && w > 0.0) {
        return Err(DiskError::invalid_input("omega", w, "must be positive"));
    }
    if !(tau > TAU_MIN) {
        return Ok(None);
    }
    Ok(Some(Time::from_seconds(1.0 / (2.0 * w * tau))))
}
