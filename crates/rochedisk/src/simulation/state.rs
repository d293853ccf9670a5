//! Run identity, per-run caches, and the evolving state of a run.

use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Length, Time};
use uuid::Uuid;

use super::diagnostics::StepDiagnostics;
use crate::collisions::CollisionCache;
use crate::config::RunConfig;
use crate::dynamics::{sample_initial_excitation, OrbitalExcitation};
use crate::error::DiskResult;
use crate::grid::SizeGrid;
use crate::psd::{build_initial_psd, ParticleSizeDistribution};
use crate::solver::CoagulationSolver;
use crate::supply::SupplyGate;
use crate::surface::{StopReason, SurfaceReservoir};

/// Relative slack when comparing the run time against its end time
const END_TIME_EPS: f64 = 1.0e-9;

// =============================================================================
// Identity
// =============================================================================

/// Run identifier, doubling as the RNG seed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_name: Option<String>,
}

impl RunMetadata {
    /// Deterministic identity for a numeric seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, &seed.to_le_bytes()),
            seed_name: None,
        }
    }

    /// Deterministic identity for a human-readable seed name.
    pub fn from_seed_name(seed_name: &str) -> Self {
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, seed_name.as_bytes()),
            seed_name: Some(seed_name.to_string()),
        }
    }

    pub fn seed(&self) -> u64 {
        self.id.as_u64_pair().0
    }
}

/// Resources owned by one run and released at teardown.
#[derive(Debug)]
pub struct RunContext {
    pub metadata: RunMetadata,
    pub cache: CollisionCache,
}

impl RunContext {
    pub fn new(metadata: RunMetadata) -> Self {
        Self {
            metadata,
            cache: CollisionCache::new(),
        }
    }

    /// Drop cached collision operators.
    pub fn teardown(&mut self) {
        let stats = self.cache.stats();
        log::info!(
            "run {} teardown: kernel {} builds / {} hits, fragments {} builds / {} hits",
            self.metadata.id,
            stats.kernel_builds,
            stats.kernel_hits,
            stats.fragment_builds,
            stats.fragment_hits
        );
        self.cache.invalidate();
    }
}

// =============================================================================
// State
// =============================================================================

/// Complete state of a zero-dimensional run.
#[derive(Debug)]
pub struct SimulationState {
    pub config: RunConfig,
    pub context: RunContext,

    /// Time at the start of the next step
    pub time: Time,
    pub step_index: u64,

    pub psd: ParticleSizeDistribution,
    /// Initial distribution, kept on the current grid for shape-following injection
    pub initial_psd: ParticleSizeDistribution,
    pub reservoir: SurfaceReservoir,
    pub supply: SupplyGate,
    pub solver: CoagulationSolver,
    pub excitation: OrbitalExcitation,

    pub blowout_size: Option<Length>,
    pub stop_reason: Option<StopReason>,
    pub last: Option<StepDiagnostics>,
}

impl SimulationState {
    /// Build the initial state for `config`.
    ///
    /// # Errors
    /// Any configuration, geometry or input error found while validating
    /// the configuration and constructing the initial distribution.
    pub fn new(config: RunConfig, metadata: RunMetadata) -> DiskResult<Self> {
        config.validate()?;

        let grid = SizeGrid::build(
            Length::from_meters(config.grid.s_min_m),
            Length::from_meters(config.grid.s_max_m),
            config.grid.n_bins,
        )?;
        let rho = config.material.bulk_density();
        let psd = build_initial_psd(&config.initial.psd, grid, rho, config.initial.column_density())?;
        let initial_psd = psd.clone();

        let seed = config.numerics.seed.unwrap_or_else(|| metadata.seed());
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let excitation = sample_initial_excitation(
            config.dynamics.excitation(),
            config.dynamics.eccentricity_sampling,
            config.dynamics.inclination_sampling,
            config.dynamics.orbital_radius(),
            &mut rng,
        )?;

        let reservoir = SurfaceReservoir::new(psd.total_mass(), config.optical_depth.clone())?;
        let supply = SupplyGate::new(config.supply.clone(), config.optical_depth.headroom)?;
        let solver = CoagulationSolver::new(config.solver)?;

        log::info!(
            "run {} created: {} bins over [{:.3e}, {:.3e}] m, Σ₀ = {:.3e} kg/m², e = {:.4}, i = {:.4}",
            metadata.id,
            config.grid.n_bins,
            config.grid.s_min_m,
            config.grid.s_max_m,
            config.initial.column_density_kg_m2,
            excitation.eccentricity,
            excitation.inclination
        );

        Ok(Self {
            config,
            context: RunContext::new(metadata),
            time: Time::zero(),
            step_index: 0,
            psd,
            initial_psd,
            reservoir,
            supply,
            solver,
            excitation,
            blowout_size: None,
            stop_reason: None,
            last: None,
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_reason.is_some()
    }

    /// True once stopped or at `max_time`.
    pub fn is_finished(&self, max_time: Time) -> bool {
        let end = max_time.to_seconds();
        self.is_stopped() || self.time.to_seconds() >= end - END_TIME_EPS * end.abs().max(1.0)
    }

    /// Release the per-run caches.
    pub fn teardown(&mut self) {
        self.context.teardown();
    }
}
