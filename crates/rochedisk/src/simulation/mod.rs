//! Zero-dimensional run driver.
//!
//! Couples the surface reservoir, the supply gate and the collisional
//! size distribution at one orbital radius inside the Roche limit.
//!
//! # Architecture
//!
//! A run owns three coupled pieces of state:
//! 1. **Size distribution** - number per bin, evolved by the IMEX solver
//! 2. **Surface reservoir** - column density, loss channels and τ
//! 3. **Supply gate** - external production with its own reservoirs
//!
//! The collision kernel and fragment tensor are cached in the run context
//! and rebuilt only when the grid or the kinematics change.
//!
//! # Time-Stepping
//!
//! Outer steps have the configured length and are split into equal pieces
//! when they exceed the fastest loss timescale, min(t_blow, t_coll). Inside
//! each piece the solver halves its substep until the mass budget closes.
//!
//! # Update Sequence
//!
//! Each step proceeds in this order:
//! 1. Temperature, phase and blow-out size
//! 2. Optical-depth stop check
//! 3. Size floor and sinks
//! 4. Supply and injection
//! 5. Collisions and the implicit solve
//! 6. Reservoir bookkeeping and reconciliation
//!
//! # References
//! - Hyodo, Genda & Charnoz (2018) - "Fate of the Martian dust disk"
//! - Krivov, Sremčević & Spahn (2005) - "Evolution of a Keplerian disk of
//!   colliding and fragmenting particles"

mod diagnostics;
mod driver;
mod state;
mod timestep;


pub use diagnostics::{RunSummary, StepDiagnostics};
pub use driver::{run_simulation, run_to_end, step};
pub use state::{RunContext, RunMetadata, SimulationState};
pub use timestep::split_count;
