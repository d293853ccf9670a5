//! Tests for temperature drivers and the phase model.

use approx::assert_relative_eq;
use units::{Temperature, Time};

use crate::drivers::*;

#[test]
fn constant_driver_is_flat() {
    let model = TemperatureModel::Constant { value_k: 1800.0 };
    for years in [0.0, 1.0, 100.0] {
        let t = model.temperature(Time::from_years(years)).unwrap();
        assert_eq!(t.to_kelvin(), 1800.0);
    }
}

#[test]
fn table_driver_interpolates_and_holds() {
    let model = TemperatureModel::Table {
        time_s: vec![0.0, 100.0, 200.0],
        temperature_k: vec![3000.0, 2000.0, 1500.0],
    };
    model.validate().unwrap();
    assert_relative_eq!(model.temperature(Time::from_seconds(50.0)).unwrap().to_kelvin(), 2500.0);
    assert_relative_eq!(model.temperature(Time::from_seconds(150.0)).unwrap().to_kelvin(), 1750.0);
    assert_relative_eq!(model.temperature(Time::from_seconds(1.0e6)).unwrap().to_kelvin(), 1500.0);
}

#[test]
fn slab_cooling_is_monotonic_and_invertible() {
    let slab = SlabCooling::default();
    let t0 = slab.temperature(Time::zero()).unwrap();
    assert_relative_eq!(t0.to_kelvin(), 4000.0, max_relative = 1e-12);

    let later = slab.temperature(Time::from_years(1.0)).unwrap();
    let much_later = slab.temperature(Time::from_years(10.0)).unwrap();
    assert!(later < t0);
    assert!(much_later < later);

    let target = Temperature::from_kelvin(2000.0);
    let elapsed = slab.time_to_reach(target).unwrap();
    let reached = slab.temperature(elapsed).unwrap();
    assert_relative_eq!(reached.to_kelvin(), 2000.0, max_relative = 1e-9);

    assert_eq!(slab.time_to_reach(Temperature::from_kelvin(5000.0)).unwrap(), Time::zero());
    assert!(slab.temperature(Time::from_seconds(-1.0)).is_err());
}

#[test]
fn temperature_model_validation() {
    assert!(TemperatureModel::Constant { value_k: -5.0 }.validate().is_err());
    assert!(TemperatureModel::Table {
        time_s: vec![0.0, 0.0],
        temperature_k: vec![1.0, 1.0],
    }
    .validate()
    .is_err());
    assert!(TemperatureModel::SlabCooling(SlabCooling {
        depth_m: 0.0,
        ..SlabCooling::default()
    })
    .validate()
    .is_err());
    assert!(TemperatureModel::default().validate().is_ok());
}

#[test]
fn disabled_phase_model_is_always_solid() {
    let model = ThresholdPhase::default();
    let decision = model.phase(Temperature::from_kelvin(3000.0)).unwrap();
    assert_eq!(decision, PhaseDecision::solid());
}

#[test]
fn melt_fraction_between_glass_and_liquidus() {
    let model = ThresholdPhase {
        enabled: true,
        ..ThresholdPhase::default()
    };
    let cold = model.phase(Temperature::from_kelvin(1000.0)).unwrap();
    assert_eq!(cold.state, PhaseState::Solid);
    assert_eq!(cold.melt_fraction, 0.0);

    let mid_k = 0.5 * (1475.0 + 1986.0);
    let mid = model.phase(Temperature::from_kelvin(mid_k)).unwrap();
    assert_relative_eq!(mid.melt_fraction, 0.5, max_relative = 1e-12);
    assert!(mid.is_liquid_dominated());

    let warm = model.phase(Temperature::from_kelvin(1600.0)).unwrap();
    assert_eq!(warm.state, PhaseState::Solid);

    let hot = model.phase(Temperature::from_kelvin(2500.0)).unwrap();
    assert_eq!(hot.melt_fraction, 1.0);

    assert!(model.phase(Temperature::from_kelvin(0.0)).is_err());
}
