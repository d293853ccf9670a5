//! Coagulation-fragmentation solver for the size distribution.

mod budget;
mod imex;


pub use budget::{MassBudget, SolverConfig};
pub use imex::{CoagulationSolver, StepInputs, StepOutcome};
