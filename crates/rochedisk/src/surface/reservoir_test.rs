//! Tests for the surface reservoir.

use approx::assert_relative_eq;
use units::{AngularVelocity, MassFlux, Opacity, SurfaceDensity, Time};

use crate::supply::HeadroomPolicy;
use crate::surface::*;

fn reservoir(sigma: f64) -> SurfaceReservoir {
    SurfaceReservoir::new(SurfaceDensity::from_kg_per_m2(sigma), OpticalDepthConfig::default()).unwrap()
}

#[test]
fn production_grows_linearly() {
    let mut r = reservoir(1.0);
    let rate = MassFlux::from_kg_per_m2_s(1.0e-6);
    let dt = Time::from_seconds(100.0);
    for _ in 0..10 {
        r.apply_production(rate, dt);
    }
    assert_relative_eq!(r.column_density().to_kg_per_m2(), 1.0 + 1.0e-3, max_relative = 1e-12);
    assert_relative_eq!(r.state().cumulative_mass_supplied, 1.0e-3, max_relative = 1e-12);

    let added = r.apply_production(MassFlux::from_kg_per_m2_s(-5.0), dt);
    assert_eq!(added, SurfaceDensity::zero());
}

#[test]
fn losses_are_booked_per_channel() {
    let mut r = reservoir(1.0);
    let dt = Time::from_seconds(10.0);
    r.apply_loss(MassFlux::from_kg_per_m2_s(0.01), MassFlux::from_kg_per_m2_s(0.02), dt);
    let s = r.state();
    assert_relative_eq!(s.column_density, 0.7, max_relative = 1e-12);
    assert_relative_eq!(s.cumulative_mass_lost_blowout, 0.1, max_relative = 1e-12);
    assert_relative_eq!(s.cumulative_mass_lost_sink, 0.2, max_relative = 1e-12);
}

#[test]
fn losses_cannot_overdraw_the_column() {
    let mut r = reservoir(0.3);
    let removed = r.apply_loss(MassFlux::from_kg_per_m2_s(1.0), MassFlux::from_kg_per_m2_s(2.0), Time::from_seconds(1.0));
    assert_relative_eq!(removed.to_kg_per_m2(), 0.3, max_relative = 1e-12);
    assert_eq!(r.state().column_density, 0.0);
    assert_relative_eq!(r.state().cumulative_mass_lost_blowout, 0.1, max_relative = 1e-12);
    assert_relative_eq!(r.state().cumulative_mass_lost_sink, 0.2, max_relative = 1e-12);
}

#[test]
fn optical_depth_stop_respects_tolerance() {
    let mut r = reservoir(1.0e-2);
    let kappa = Some(Opacity::from_m2_per_kg(50.0));

    let below = r.evaluate_optical_depth(kappa, 1.0);
    assert_relative_eq!(below.tau.unwrap(), 0.5, max_relative = 1e-12);
    assert!(!below.stop);

    let at_threshold = r.evaluate_optical_depth(kappa, 2.0);
    assert!(!at_threshold.stop);

    let above = r.evaluate_optical_depth(kappa, 2.1);
    assert!(above.stop);
    assert_relative_eq!(above.tau_vertical.unwrap(), 0.5, max_relative = 1e-12);
}

#[test]
fn non_finite_inputs_short_circuit() {
    let mut r = reservoir(1.0);
    assert_eq!(r.evaluate_optical_depth(None, 1.0), OpticalDepthStatus::invalid());
    let nan = r.evaluate_optical_depth(Some(Opacity::from_m2_per_kg(f64::NAN)), 1.0);
    assert!(nan.tau.is_none());
    assert!(!nan.stop);
    assert!(r.state().optical_depth.is_none());
}

#[test]
fn clipping_is_opt_in() {
    let kappa = Opacity::from_m2_per_kg(10.0);
    let mut default = reservoir(1.0);
    assert_eq!(default.clip_to_tau_unity(kappa), SurfaceDensity::zero());
    assert_eq!(default.state().column_density, 1.0);

    let config = OpticalDepthConfig {
        headroom: HeadroomPolicy::Clip,
        ..OpticalDepthConfig::default()
    };
    let mut clipping = SurfaceReservoir::new(SurfaceDensity::from_kg_per_m2(1.0), config).unwrap();
    let removed = clipping.clip_to_tau_unity(kappa);
    assert_relative_eq!(removed.to_kg_per_m2(), 0.9, max_relative = 1e-12);
    assert_relative_eq!(clipping.state().column_density, 0.1, max_relative = 1e-12);
}

#[test]
fn headroom_below_tau_unity() {
    let r = reservoir(0.02);
    let room = r.headroom(Opacity::from_m2_per_kg(20.0)).unwrap();
    assert_relative_eq!(room.to_kg_per_m2(), 0.03, max_relative = 1e-12);
    assert_eq!(r.headroom(Opacity::from_m2_per_kg(100.0)).unwrap(), SurfaceDensity::zero());
    assert!(r.headroom(Opacity::from_m2_per_kg(0.0)).is_none());
}

#[test]
fn reconcile_tracks_drift() {
    let mut r = reservoir(1.0);
    let drift = r.reconcile(SurfaceDensity::from_kg_per_m2(0.98));
    assert_relative_eq!(drift, -0.02, max_relative = 1e-12);
    assert_relative_eq!(r.state().cumulative_drift, 0.02, max_relative = 1e-12);
    assert_eq!(r.column_density().to_kg_per_m2(), 0.98);
}

#[test]
fn wyatt_collision_time_scaling() {
    let omega = AngularVelocity::from_rad_per_sec(1.0e-4);
    let t = wyatt_collision_time(0.5, omega).unwrap().unwrap();
    assert_relative_eq!(t.to_seconds(), 1.0e4, max_relative = 1e-12);
    let denser = wyatt_collision_time(1.0, omega).unwrap().unwrap();
    assert_relative_eq!(t / denser, 2.0, max_relative = 1e-12);
    assert!(wyatt_collision_time(0.0, omega).unwrap().is_none());
    assert!(wyatt_collision_time(1.0, AngularVelocity::from_rad_per_sec(0.0)).is_err());
}

#[test]
fn stop_reason_label() {
    assert_eq!(StopReason::TauExceeded.to_string(), "tau_exceeded");
}
