//! Tests for β and the blow-out size.

use approx::assert_relative_eq;
use units::{Density, Length, Temperature};

use crate::radiation::*;

fn basalt() -> Density {
    Density::from_kg_per_m3(3000.0)
}

#[test]
fn beta_scales_inversely_with_size() {
    let t = Temperature::from_kelvin(2000.0);
    let eff = ConstantEfficiency(1.0);
    let b1 = beta(Length::from_microns(1.0), basalt(), t, &eff).unwrap();
    let b2 = beta(Length::from_microns(2.0), basalt(), t, &eff).unwrap();
    assert_relative_eq!(b1 / b2, 2.0, max_relative = 1e-12);
}

#[test]
fn beta_scales_with_luminosity() {
    let eff = ConstantEfficiency(1.0);
    let s = Length::from_microns(1.0);
    let cool = beta(s, basalt(), Temperature::from_kelvin(1000.0), &eff).unwrap();
    let hot = beta(s, basalt(), Temperature::from_kelvin(2000.0), &eff).unwrap();
    assert_relative_eq!(hot / cool, 16.0, max_relative = 1e-12);

    // Order of magnitude for a micron basalt grain near a 2000 K Mars
    assert!(hot > 0.05 && hot < 1.0);
}

#[test]
fn blowout_radius_matches_analytic_crossing() {
    let t = Temperature::from_kelvin(2000.0);
    let eff = ConstantEfficiency(1.0);
    // β ∝ 1/s, so β(s*) = ½ at s* = 2 β(1 m) meters
    let beta_1m = beta(Length::from_meters(1.0), basalt(), t, &eff).unwrap();
    let expected = 2.0 * beta_1m;

    let a_blow = blowout_radius(basalt(), t, &eff).unwrap().unwrap();
    assert_relative_eq!(a_blow.to_m(), expected, max_relative = 5e-3);

    let hotter = blowout_radius(basalt(), Temperature::from_kelvin(3000.0), &eff)
        .unwrap()
        .unwrap();
    assert!(hotter > a_blow);
}

#[test]
fn no_blowout_without_radiation_pressure() {
    let dark = |_s: Length, _t: Temperature| 0.0;
    let result = blowout_radius(basalt(), Temperature::from_kelvin(2000.0), &dark).unwrap();
    assert!(result.is_none());
}

#[test]
fn closure_efficiency_with_small_grain_rolloff() {
    // Q_pr falls off below 0.1 µm, so β peaks there and declines beyond
    let rolloff = |s: Length, _t: Temperature| (s.to_m() / 1.0e-7).min(1.0);
    let t = Temperature::from_kelvin(2000.0);
    let grey = blowout_radius(basalt(), t, &ConstantEfficiency(1.0)).unwrap().unwrap();
    let a_blow = blowout_radius(basalt(), t, &rolloff).unwrap().unwrap();
    assert_relative_eq!(a_blow.to_m(), grey.to_m(), max_relative = 1e-9);
}

#[test]
fn invalid_inputs_are_rejected() {
    let eff = ConstantEfficiency::default();
    let t = Temperature::from_kelvin(2000.0);
    assert!(beta(Length::zero(), basalt(), t, &eff).is_err());
    assert!(beta(Length::from_microns(1.0), Density::from_kg_per_m3(-1.0), t, &eff).is_err());
    assert!(blowout_radius(basalt(), Temperature::from_kelvin(0.0), &eff).is_err());
}

#[test]
fn grain_temperature_falls_with_distance() {
    let t_mars = Temperature::from_kelvin(2000.0);
    let r = Length::from_mars_radii(2.0);
    let t_grain = grain_temperature(t_mars, r);
    assert_relative_eq!(t_grain.to_kelvin(), 1000.0, max_relative = 1e-12);
}
