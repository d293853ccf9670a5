//! External mass supply into the surface layer.

mod gate;
mod injection;
mod rate;

#[cfg(test)]
mod gate_test;
#[cfg(test)]
mod rate_test;

pub use gate::{
    BlockReason, DeepMixing, GateState, HeadroomPolicy, SupplyConfig, SupplyContext, SupplyGate, SupplyOutcome,
    SupplyState,
};
pub use injection::InjectionPolicy;
pub use rate::{Depletion, FiniteReservoir, SupplyPiece, SupplyRate, TemperatureScaling};
