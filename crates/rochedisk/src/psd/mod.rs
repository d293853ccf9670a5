//! Particle-size distribution (PSD).
//!
//! A single owned struct holds the per-bin number densities, the grid they
//! live on, the grain bulk density and the minimum-size floor. Everything
//! else reads it through accessors; only the solver and the run driver
//! mutate it.
//!
//! # Physics
//!
//! Bins carry number surface density n_k (m⁻²). The column mass is
//! Σ = Σ_k n_k m_k with m_k = 4/3 π ρ s_k³, and the geometric opacity of the
//! population is κ = Σ_k π s_k² n_k / Σ.

mod distribution;
mod initial;


pub use distribution::{ParticleSizeDistribution, SanitizeReport};
pub(crate) use initial::power_law_integral;
pub use initial::{build_initial_psd, InitialPsd, LognormalComponent};
