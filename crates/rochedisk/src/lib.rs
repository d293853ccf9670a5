//! Collisional evolution of a dust disk inside the Martian Roche limit.
//!
//! A zero-dimensional engine for the particle-size distribution of the
//! optically active surface layer at one orbital radius. Collisions grind
//! the population down through a fragment tensor, radiation pressure from
//! the hot surface removes grains below the blow-out size, sublimation and
//! bulk sinks erode the rest, and an external supply feeds the layer until
//! its line-of-sight optical depth crosses a threshold.
//!
//! ```no_run
//! use rochedisk::{run_simulation, RunConfig, RunMetadata, SimulationState};
//! use units::Time;
//!
//! let mut state = SimulationState::new(RunConfig::default(), RunMetadata::from_seed(7)).unwrap();
//! let summary = run_simulation(&mut state, Time::from_days(1.0), |_| {}).unwrap();
//! println!("Σ = {:.3e} kg/m² after {} steps", summary.column_density, summary.steps);
//! ```

pub mod collisions;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod dynamics;
pub mod error;
pub mod grid;
pub mod psd;
pub mod radiation;
pub mod simulation;
pub mod solver;
pub mod supply;
pub mod surface;

// Re-export configuration
pub use config::{
    DynamicsConfig, GridConfig, InitialConfig, MaterialConfig, NumericsConfig, RunConfig,
};

// Re-export errors
pub use error::{DiskError, DiskResult};

// Re-export core types
pub use grid::SizeGrid;
pub use psd::{InitialPsd, ParticleSizeDistribution};
pub use solver::{CoagulationSolver, MassBudget, SolverConfig};
pub use supply::{GateState, SupplyConfig, SupplyGate};
pub use surface::{StopReason, SurfaceReservoir};

// Re-export the driver
pub use simulation::{
    run_simulation, run_to_end, step, RunContext, RunMetadata, RunSummary, SimulationState,
    StepDiagnostics,
};
