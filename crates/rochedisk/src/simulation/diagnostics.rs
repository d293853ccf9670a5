//! Per-step diagnostics record.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;

use crate::drivers::PhaseState;
use crate::solver::MassBudget;
use crate::supply::GateState;
use crate::surface::StopReason;

/// Everything observable about one step (SI units throughout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "camelCase")]
pub struct StepDiagnostics {
    pub step_index: u64,
    /// Time at the end of the step (s)
    pub time_s: f64,
    /// Interval actually advanced; zero when the step was stopped
    pub dt_s: f64,

    // Size distribution
    pub number: Vec<f64>,
    pub psd_mass: f64,
    pub minimum_size_m: f64,
    pub blowout_size_m: Option<f64>,
    pub sink_size_m: Option<f64>,
    pub grid_version: u64,

    // Budget and solver effort
    pub mass_budget: MassBudget,
    pub substeps: usize,
    pub halvings: usize,
    pub split: usize,

    // Surface reservoir
    pub column_density: f64,
    pub cumulative_mass_lost_blowout: f64,
    pub cumulative_mass_lost_sink: f64,
    pub cumulative_mass_supplied: f64,
    pub cumulative_mass_spilled: f64,
    pub blowout_rate: f64,
    /// Collisional mass feed into bins below the blow-out size (kg m⁻² s⁻¹)
    pub fragment_blowout_rate: f64,
    pub sink_rate: f64,
    pub tau: Option<f64>,
    pub stop_reason: Option<StopReason>,

    // Supply
    pub supply_gate: GateState,
    pub injected_rate: f64,
    /// Supply rate after mixing, before deep buffering and headroom
    pub production_rate: f64,

    // Environment
    pub temperature_k: f64,
    pub phase: PhaseState,
    pub melt_fraction: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub relative_velocity: Option<f64>,
    pub min_collision_time_s: Option<f64>,
    /// Surface-layer estimate 1/(2Ωτ)
    pub wyatt_collision_time_s: Option<f64>,
}

/// End-of-run totals returned by [`run_simulation`](super::run_simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub steps: u64,
    pub final_time_s: f64,
    pub stop_reason: Option<StopReason>,
    pub column_density: f64,
    pub cumulative_mass_lost_blowout: f64,
    pub cumulative_mass_lost_sink: f64,
    pub cumulative_mass_supplied: f64,
    pub cumulative_mass_spilled: f64,
    pub kernel_builds: u64,
    pub fragment_builds: u64,
}
