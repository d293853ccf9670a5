//! Typed physical quantities for the Roche-limit disk engine.
//!
//! Every quantity is a `Copy` newtype over `f64` stored in SI base units.
//! Constructors and accessors convert from and to the other units that show
//! up in the collisional literature (cgs, microns, Mars radii, orbits).

pub mod angular_velocity;
pub mod density;
pub mod length;
pub mod mass;
pub mod mass_flux;
pub mod opacity;
pub mod specific_energy;
pub mod surface_density;
pub mod temperature;
pub mod time;
pub mod velocity;

#[cfg(test)]
mod length_test;
#[cfg(test)]
mod mass_flux_test;
#[cfg(test)]
mod mass_test;
#[cfg(test)]
mod specific_energy_test;
#[cfg(test)]
mod surface_density_test;
#[cfg(test)]
mod velocity_test;

pub use angular_velocity::AngularVelocity;
pub use density::Density;
pub use length::{Length, MARS_RADIUS_M};
pub use mass::{Mass, MARS_MASS_KG};
pub use mass_flux::MassFlux;
pub use opacity::Opacity;
pub use specific_energy::SpecificEnergy;
pub use surface_density::SurfaceDensity;
pub use temperature::Temperature;
pub use time::{Time, SECONDS_PER_YEAR};
pub use velocity::{keplerian_velocity, Velocity, GRAVITATIONAL_CONSTANT};
