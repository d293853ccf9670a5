//! Collision physics: rate kernel, disruption threshold and fragment yields.
//!
//! The three pieces are assembled per step by the solver: the kernel gives
//! how often pairs of bins meet, Q*_D how much energy a target can absorb,
//! and the fragment tensor where the mass goes afterwards. Kernel and tensor
//! are cached per run in a [`CollisionCache`].

mod cache;
mod fragments;
mod kernel;
mod qstar;

#[cfg(test)]
mod kernel_test;

pub use cache::{CacheStats, CollisionCache, FragmentKey, KernelKey};
pub use fragments::{
    largest_remnant_fraction, specific_impact_energy, FragmentModel, FragmentTensor, RemnantBinning,
};
pub use kernel::{CollisionKernel, RelativeVelocity, ScaleHeightMode};
pub use qstar::{CoefficientUnits, DisruptionThreshold, QStarCoefficients, VelocityExtrapolation};
