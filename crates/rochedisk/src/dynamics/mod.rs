//! Orbital dynamics feeding the collision kernel.
//!
//! Relative impact speeds follow from the eccentricity and inclination of
//! the grain population, which are either fixed, sampled once at setup from
//! a seeded RNG, relaxed towards an equilibrium, or derived from the
//! self-regulated velocity dispersion.

mod excitation;
mod velocity;


pub use excitation::{
    equilibrium_dispersion, kernel_excitation, relax_eccentricity, sample_initial_excitation,
    EccentricitySampling, ExcitationMode, InclinationSampling, OffsetDistribution,
    OrbitalExcitation, DEFAULT_RESTITUTION,
};
pub use velocity::RelativeVelocityLaw;
