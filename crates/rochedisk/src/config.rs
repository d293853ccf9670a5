//! Run configuration.
//!
//! Every section deserializes with `#[serde(default)]`, so a partial
//! document only needs the values that differ from the reference run.
//! [`RunConfig::validate`] checks the whole tree before a run is built.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Density, Length, SurfaceDensity, Time};

use crate::collisions::{DisruptionThreshold, FragmentModel, ScaleHeightMode};
use crate::constants::DEFAULT_BULK_DENSITY;
use crate::drivers::{TemperatureModel, ThresholdPhase};
use crate::dynamics::{
    EccentricitySampling, ExcitationMode, InclinationSampling, OrbitalExcitation, RelativeVelocityLaw,
};
use crate::error::{DiskError, DiskResult};
use crate::psd::InitialPsd;
use crate::radiation::{RadiationConfig, SinkConfig};
use crate::solver::SolverConfig;
use crate::supply::SupplyConfig;
use crate::surface::OpticalDepthConfig;

// =============================================================================
// Sections
// =============================================================================

/// Size grid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct GridConfig {
    pub s_min_m: f64,
    pub s_max_m: f64,
    pub n_bins: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            s_min_m: 1.0e-6,
            s_max_m: 3.0,
            n_bins: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct MaterialConfig {
    pub bulk_density_kg_m3: f64,
    pub phase: ThresholdPhase,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            bulk_density_kg_m3: DEFAULT_BULK_DENSITY,
            phase: ThresholdPhase::default(),
        }
    }
}

impl MaterialConfig {
    pub fn bulk_density(&self) -> Density {
        Density::from_kg_per_m3(self.bulk_density_kg_m3)
    }
}

/// Orbit and excitation of the grain population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct DynamicsConfig {
    /// Evolve the distribution through collisions; off leaves only supply and sinks
    pub collisions_enabled: bool,
    pub orbital_radius_mars_radii: f64,
    pub eccentricity: f64,
    /// Inclination (rad)
    pub inclination: f64,
    pub velocity_law: RelativeVelocityLaw,
    pub scale_height: ScaleHeightMode,
    pub excitation: ExcitationMode,
    /// Wake enhancement factor for the equilibrium dispersion
    pub f_wake: f64,
    /// Damping time of e towards the equilibrium value, in orbits
    pub t_damp_orbits: Option<f64>,
    pub eccentricity_sampling: EccentricitySampling,
    pub inclination_sampling: InclinationSampling,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            collisions_enabled: true,
            orbital_radius_mars_radii: 2.0,
            eccentricity: 0.1,
            inclination: 0.05,
            velocity_law: RelativeVelocityLaw::Pericenter,
            scale_height: ScaleHeightMode::default(),
            excitation: ExcitationMode::Configured,
            f_wake: 1.0,
            t_damp_orbits: None,
            eccentricity_sampling: EccentricitySampling::Fixed,
            inclination_sampling: InclinationSampling::Fixed,
        }
    }
}

impl DynamicsConfig {
    pub fn orbital_radius(&self) -> Length {
        Length::from_mars_radii(self.orbital_radius_mars_radii)
    }

    pub fn excitation(&self) -> OrbitalExcitation {
        OrbitalExcitation {
            eccentricity: self.eccentricity,
            inclination: self.inclination,
        }
    }
}

/// Initial size distribution and column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct InitialConfig {
    pub psd: InitialPsd,
    pub column_density_kg_m2: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            psd: InitialPsd::default(),
            column_density_kg_m2: 1.0e-2,
        }
    }
}

impl InitialConfig {
    pub fn column_density(&self) -> SurfaceDensity {
        SurfaceDensity::from_kg_per_m2(self.column_density_kg_m2)
    }
}

/// Time stepping and the minimum-size floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct NumericsConfig {
    pub dt_s: f64,
    pub t_end_s: f64,
    /// Largest allowed dt / min(t_blow, t_coll) before a step is split
    pub safety_ratio: f64,
    /// Cap on the pieces a step may be split into
    pub max_split: usize,
    /// Raise the size floor to the blow-out size
    pub floor_follows_blowout: bool,
    /// Raise the size floor to the instantaneous sublimation size
    pub floor_follows_sublimation: bool,
    /// Rebuild the grid onto the floor when it rises above the lower edge
    pub rebuild_grid_on_floor: bool,
    /// Seed for the initial excitation draws; `None` derives it from the run identity
    pub seed: Option<u64>,
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            dt_s: 600.0,
            t_end_s: Time::from_years(2.0).to_seconds(),
            safety_ratio: 1.0,
            max_split: 1000,
            floor_follows_blowout: true,
            floor_follows_sublimation: false,
            rebuild_grid_on_floor: false,
            seed: None,
        }
    }
}

// =============================================================================
// Root
// =============================================================================

/// Complete configuration of a zero-dimensional run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct RunConfig {
    pub grid: GridConfig,
    pub material: MaterialConfig,
    pub dynamics: DynamicsConfig,
    pub qstar: DisruptionThreshold,
    pub fragments: FragmentModel,
    pub solver: SolverConfig,
    pub supply: SupplyConfig,
    pub sinks: SinkConfig,
    pub radiation: RadiationConfig,
    pub temperature: TemperatureModel,
    pub optical_depth: OpticalDepthConfig,
    pub initial: InitialConfig,
    pub numerics: NumericsConfig,
}

impl RunConfig {
    /// Check every section; the first problem found is returned.
    pub fn validate(&self) -> DiskResult<()> {
        let grid = &self.grid;
        if !(grid.s_min_m > 0.0 && grid.s_max_m > grid.s_min_m && grid.s_max_m.is_finite()) {
            return Err(DiskError::configuration("grid", "need 0 < s_min_m < s_max_m"));
        }
        if grid.n_bins == 0 {
            return Err(DiskError::configuration("grid.n_bins", "must be at least 1"));
        }
        if !(self.material.bulk_density_kg_m3.is_finite() && self.material.bulk_density_kg_m3 > 0.0) {
            return Err(DiskError::configuration(
                "material.bulk_density_kg_m3",
                "must be positive and finite",
            ));
        }
        self.material.phase.validate()?;

        let dynamics = &self.dynamics;
        if !(dynamics.orbital_radius_mars_radii.is_finite() && dynamics.orbital_radius_mars_radii > 1.0) {
            return Err(DiskError::configuration(
                "dynamics.orbital_radius_mars_radii",
                "orbit must lie above the surface",
            ));
        }
        if !((0.0..1.0).contains(&dynamics.eccentricity) && dynamics.inclination >= 0.0) {
            return Err(DiskError::configuration(
                "dynamics",
                "need 0 <= eccentricity < 1 and inclination >= 0",
            ));
        }
        if dynamics.t_damp_orbits.is_some_and(|t| !(t > 0.0)) {
            return Err(DiskError::configuration("dynamics.t_damp_orbits", "must be positive"));
        }

        self.qstar.validate()?;
        if !self.fragments.alpha.is_finite() {
            return Err(DiskError::configuration("fragments.alpha", "must be finite"));
        }
        self.solver.validate()?;
        self.supply.validate()?;
        if !(self.radiation.q_pr >= 0.0 && self.radiation.chi_blow > 0.0) {
            return Err(DiskError::configuration(
                "radiation",
                "need q_pr >= 0 and chi_blow > 0",
            ));
        }
        self.temperature.validate()?;
        self.optical_depth.validate()?;

        if !(self.initial.column_density_kg_m2.is_finite() && self.initial.column_density_kg_m2 >= 0.0) {
            return Err(DiskError::configuration(
                "initial.column_density_kg_m2",
                "must be finite and non-negative",
            ));
        }

        let numerics = &self.numerics;
        if !(numerics.dt_s.is_finite() && numerics.dt_s > 0.0) {
            return Err(DiskError::configuration("numerics.dt_s", "must be positive and finite"));
        }
        if !(numerics.t_end_s >= 0.0) {
            return Err(DiskError::configuration("numerics.t_end_s", "must be non-negative"));
        }
        if !(numerics.safety_ratio > 0.0) || numerics.max_split == 0 {
            return Err(DiskError::configuration(
                "numerics",
                "need safety_ratio > 0 and max_split >= 1",
            ));
        }
        Ok(())
    }
}
