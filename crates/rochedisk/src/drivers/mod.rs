//! Time-dependent external drivers: the Mars surface temperature and the
//! phase of the disk material.

mod phase;
mod temperature;

#[cfg(test)]
mod drivers_test;

pub use phase::{PhaseDecision, PhaseModel, PhaseState, ThresholdPhase};
pub use temperature::{SlabCooling, TemperatureDriver, TemperatureModel};
