//! Radiation forcing from Mars and the non-collisional sinks it drives.

mod blowout;
mod shielding;
mod sublimation;

#[cfg(test)]
mod blowout_test;
#[cfg(test)]
mod shielding_test;
#[cfg(test)]
mod sublimation_test;

pub(crate) use shielding::interpolate_clamped;

pub use blowout::{
    beta, blowout_radius, grain_temperature, mars_luminosity, ConstantEfficiency, RadiationConfig,
    RadiationEfficiency,
};
pub use shielding::{
    effective_opacity, tau_unity_column, ConstantShielding, LineOfSight, ShieldingFactor, ShieldingModel,
    TabulatedShielding,
};
pub use sublimation::{
    gas_drag_timescale, sublimation_sink_rates, SinkConfig, SinkRates, SublimationMode, SublimationParams,
};
