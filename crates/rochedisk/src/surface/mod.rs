//! The surface reservoir: column density, loss channels and the
//! optical-depth stop.

mod reservoir;

#[cfg(test)]
mod reservoir_test;

pub use reservoir::{
    wyatt_collision_time, OpticalDepthConfig, OpticalDepthStatus, ReservoirState, StopReason, SurfaceReservoir,
};
