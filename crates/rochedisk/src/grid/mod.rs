//! Particle-size grid.

mod size_grid;


pub use size_grid::{SizeBin, SizeGrid};
