//! Tests for sublimation fluxes and sink rates.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use units::{Density, Length, Temperature, Time, Velocity};

use crate::constants::R_GAS;
use crate::radiation::*;

fn basalt() -> Density {
    Density::from_kg_per_m3(3000.0)
}

fn hkl() -> SublimationParams {
    SublimationParams {
        mode: SublimationMode::Hkl,
        ..SublimationParams::default()
    }
}

#[test]
fn logistic_flux_is_unity_at_midpoint() {
    let params = SublimationParams::default();
    let j = params.mass_flux(Temperature::from_kelvin(1300.0)).unwrap();
    assert_relative_eq!(j.to_kg_per_m2_s(), 1.0);

    let hotter = params.mass_flux(Temperature::from_kelvin(1350.0)).unwrap();
    assert_relative_eq!(hotter.to_kg_per_m2_s(), std::f64::consts::E, max_relative = 1e-12);
}

#[test]
fn hkl_flux_matches_hand_evaluation() {
    let params = hkl();
    let t = 1500.0;
    let p_sat = 10f64.powf(13.613 - 17_850.0 / t);
    let expected = 0.007 * p_sat * (0.044_084_9 / (2.0 * PI * R_GAS * t)).sqrt();

    let j = params.mass_flux(Temperature::from_kelvin(t)).unwrap();
    assert_relative_eq!(j.to_kg_per_m2_s(), expected, max_relative = 1e-12);

    let hotter = params.mass_flux(Temperature::from_kelvin(1600.0)).unwrap();
    assert!(hotter > j);
}

#[test]
fn ambient_vapour_suppresses_sublimation() {
    let params = SublimationParams {
        p_gas: 1.0e12,
        ..hkl()
    };
    let j = params.mass_flux(Temperature::from_kelvin(1500.0)).unwrap();
    assert_eq!(j.to_kg_per_m2_s(), 0.0);
}

#[test]
fn sink_size_follows_reference_time() {
    let params = hkl();
    let t = Temperature::from_kelvin(1800.0);
    let t_ref = Time::from_hours(2.0);
    let j = params.mass_flux(t).unwrap().to_kg_per_m2_s();
    let s_sink = params.sink_size(t, basalt(), t_ref).unwrap();
    assert_relative_eq!(s_sink.to_m(), 0.1 * t_ref.to_seconds() * j / 3000.0, max_relative = 1e-12);

    assert!(params.sink_size(t, basalt(), Time::zero()).is_err());
}

#[test]
fn per_bin_rates_scale_inversely_with_size() {
    let speed = Velocity::from_meters_per_sec(1.0e-9);
    let rates = sublimation_sink_rates(&[1.0e-6, 1.0e-5, 0.0], speed);
    assert_relative_eq!(rates[0], 3.0e-3, max_relative = 1e-12);
    assert_relative_eq!(rates[1], 3.0e-4, max_relative = 1e-12);
    assert_eq!(rates[2], 0.0);
}

#[test]
fn gas_drag_stopping_time() {
    let t = gas_drag_timescale(
        Length::from_microns(10.0),
        basalt(),
        1.0e-6,
        Velocity::from_meters_per_sec(500.0),
    )
    .unwrap();
    assert_relative_eq!(t.to_seconds(), 3000.0 * 1.0e-5 / (1.0e-6 * 500.0), max_relative = 1e-12);
    assert!(gas_drag_timescale(Length::from_microns(10.0), basalt(), 0.0, Velocity::from_meters_per_sec(500.0)).is_err());
}

#[test]
fn disabled_sinks_produce_no_rates() {
    let config = SinkConfig::default();
    let sizes = [1.0e-6, 1.0e-4];
    let rates = config
        .rates(&sizes, Temperature::from_kelvin(2000.0), basalt(), Time::from_hours(1.0))
        .unwrap();
    assert!(rates.per_bin.iter().all(|r| *r == 0.0));
    assert!(rates.timescale.is_none());
    assert!(rates.sink_size.is_none());
}

#[test]
fn shortest_bulk_sink_wins() {
    let t_ref = Time::from_hours(1.0);
    let config = SinkConfig {
        sublimation_enabled: true,
        gas_drag_enabled: true,
        gas_density: 1.0e-3,
        ..SinkConfig::default()
    };
    let t = Temperature::from_kelvin(2000.0);
    let drag = gas_drag_timescale(Length::from_meters(1.0e-6), basalt(), 1.0e-3, Velocity::from_meters_per_sec(500.0)).unwrap();
    let eta_t_ref = 0.1 * t_ref.to_seconds();

    let timescale = config.total_timescale(t, basalt(), t_ref).unwrap().unwrap();
    assert_relative_eq!(timescale.to_seconds(), drag.to_seconds().min(eta_t_ref), max_relative = 1e-12);

    let rates = config.rates(&[1.0e-6, 1.0e-3], t, basalt(), t_ref).unwrap();
    assert_relative_eq!(rates.per_bin[0], 1.0 / timescale.to_seconds(), max_relative = 1e-12);
    assert_eq!(rates.per_bin[0], rates.per_bin[1]);
}

#[test]
fn hkl_sinks_erode_small_bins_faster() {
    let config = SinkConfig {
        sublimation_enabled: true,
        sublimation: hkl(),
        ..SinkConfig::default()
    };
    let rates = config
        .rates(&[1.0e-6, 1.0e-4], Temperature::from_kelvin(1800.0), basalt(), Time::from_hours(1.0))
        .unwrap();
    assert!(rates.per_bin[0] > 0.0);
    assert_relative_eq!(rates.per_bin[0] / rates.per_bin[1], 100.0, max_relative = 1e-9);
    assert!(rates.sink_size.is_some());
    assert!(rates.timescale.is_none());
}
