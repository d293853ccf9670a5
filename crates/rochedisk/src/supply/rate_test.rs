//! Tests for supply rate laws and injection.

use approx::assert_relative_eq;
use units::{Density, Length, MassFlux, Temperature, Time};

use crate::grid::SizeGrid;
use crate::psd::ParticleSizeDistribution;
use crate::supply::*;

fn at(t: f64) -> (Time, Length) {
    (Time::from_seconds(t), Length::from_mars_radii(2.0))
}

#[test]
fn power_law_decays_from_t0() {
    let law = SupplyRate::PowerLaw {
        amplitude_kg_m2_s: 1.0,
        t0_s: 100.0,
        index: -1.0,
    };
    let (t, r) = at(110.0);
    assert_relative_eq!(law.raw(t, r), 0.1, max_relative = 1e-9);
    let (t, r) = at(1100.0);
    assert_relative_eq!(law.raw(t, r), 1.0e-3, max_relative = 1e-9);
    // Before t0 the elapsed time is floored, not negative
    let (t, r) = at(50.0);
    assert!(law.raw(t, r).is_finite());
}

#[test]
fn table_interpolates_and_holds_ends() {
    let law = SupplyRate::Table {
        time_s: vec![0.0, 10.0],
        radius_m: vec![],
        rate_kg_m2_s: vec![vec![1.0], vec![3.0]],
    };
    law.validate().unwrap();
    let (t, r) = at(5.0);
    assert_relative_eq!(law.raw(t, r), 2.0);
    let (t, r) = at(-1.0);
    assert_relative_eq!(law.raw(t, r), 1.0);
    let (t, r) = at(100.0);
    assert_relative_eq!(law.raw(t, r), 3.0);
}

#[test]
fn two_dimensional_table_is_bilinear() {
    let law = SupplyRate::Table {
        time_s: vec![0.0, 10.0],
        radius_m: vec![1.0e6, 2.0e6],
        rate_kg_m2_s: vec![vec![0.0, 2.0], vec![4.0, 6.0]],
    };
    law.validate().unwrap();
    let v = law.raw(Time::from_seconds(5.0), Length::from_meters(1.5e6));
    assert_relative_eq!(v, 3.0, max_relative = 1e-12);
}

#[test]
fn malformed_tables_are_rejected() {
    let ragged = SupplyRate::Table {
        time_s: vec![0.0, 10.0],
        radius_m: vec![1.0, 2.0],
        rate_kg_m2_s: vec![vec![0.0, 2.0], vec![4.0]],
    };
    assert!(ragged.validate().is_err());

    let unsorted = SupplyRate::Table {
        time_s: vec![10.0, 0.0],
        radius_m: vec![],
        rate_kg_m2_s: vec![vec![0.0], vec![1.0]],
    };
    assert!(unsorted.validate().is_err());
}

#[test]
fn piecewise_is_zero_outside_pieces() {
    let law = SupplyRate::Piecewise {
        pieces: vec![
            SupplyPiece {
                t_start_s: 0.0,
                t_end_s: 10.0,
                rate: SupplyRate::Const { rate_kg_m2_s: 1.0 },
            },
            SupplyPiece {
                t_start_s: 20.0,
                t_end_s: 30.0,
                rate: SupplyRate::Const { rate_kg_m2_s: 2.0 },
            },
        ],
    };
    law.validate().unwrap();
    let raw = |t| {
        let (t, r) = at(t);
        law.raw(t, r)
    };
    assert_eq!(raw(0.0), 1.0);
    assert_eq!(raw(10.0), 0.0);
    assert_eq!(raw(25.0), 2.0);
    assert_eq!(raw(40.0), 0.0);
}

#[test]
fn temperature_scaling_is_clamped() {
    let scaling = TemperatureScaling {
        enabled: true,
        exponent: 2.0,
        cap: 3.0,
        ..TemperatureScaling::default()
    };
    assert_relative_eq!(scaling.factor(Temperature::from_kelvin(1800.0)), 1.0);
    assert_relative_eq!(scaling.factor(Temperature::from_kelvin(900.0)), 0.25);
    assert_relative_eq!(scaling.factor(Temperature::from_kelvin(9000.0)), 3.0);
    assert_eq!(TemperatureScaling::default().factor(Temperature::from_kelvin(9000.0)), 1.0);
}

#[test]
fn taper_ramps_down_below_knee() {
    let reservoir = FiniteReservoir {
        mass_total_kg_m2: Some(100.0),
        depletion: Depletion::Taper { fraction: 0.1 },
    };
    assert_eq!(reservoir.taper_factor(50.0), 1.0);
    assert_relative_eq!(reservoir.taper_factor(5.0), 0.5);
    assert_eq!(reservoir.taper_factor(0.0), 0.0);
    assert_eq!(FiniteReservoir::default().taper_factor(0.0), 1.0);
}

// =============================================================================
// Injection
// =============================================================================

fn psd() -> ParticleSizeDistribution {
    let grid = SizeGrid::build(Length::from_meters(1e-6), Length::from_meters(1e-2), 20).unwrap();
    ParticleSizeDistribution::new(grid, Density::from_kg_per_m3(3000.0)).unwrap()
}

fn injected_mass(source: &[f64], psd: &ParticleSizeDistribution) -> f64 {
    source.iter().zip(psd.masses()).map(|(s, m)| s * m).sum()
}

#[test]
fn every_policy_conserves_the_injected_rate() {
    let psd = psd();
    let rate = MassFlux::from_kg_per_m2_s(2.5e-9);
    let shape: Vec<f64> = (0..psd.n_bins()).map(|k| 1.0 / (k as f64 + 1.0)).collect();
    let policies = [
        InjectionPolicy::MinimumBin,
        InjectionPolicy::PowerLaw {
            q: 3.5,
            s_min_m: 1.0e-5,
            s_max_m: 1.0e-3,
        },
        InjectionPolicy::InitialShape,
    ];
    for policy in policies {
        let source = policy.source(rate, &psd, Some(&shape)).unwrap();
        assert_relative_eq!(injected_mass(&source, &psd), 2.5e-9, max_relative = 1e-12);
        assert!(source.iter().all(|s| *s >= 0.0));
    }
}

#[test]
fn injection_respects_the_size_floor() {
    let mut psd = psd();
    psd.set_minimum_size_floor(Length::from_meters(1.0e-4));
    let source = InjectionPolicy::MinimumBin
        .source(MassFlux::from_kg_per_m2_s(1.0), &psd, None)
        .unwrap();
    let k = source.iter().position(|s| *s > 0.0).unwrap();
    assert!(psd.sizes()[k] >= 1.0e-4);
    assert!(psd.sizes()[k - 1] < 1.0e-4);
}

#[test]
fn power_law_outside_grid_falls_back_to_smallest_bin() {
    let psd = psd();
    let policy = InjectionPolicy::PowerLaw {
        q: 3.5,
        s_min_m: 1.0,
        s_max_m: 2.0,
    };
    let source = policy.source(MassFlux::from_kg_per_m2_s(1.0), &psd, None).unwrap();
    assert!(source[0] > 0.0);
    assert!(source[1..].iter().all(|s| *s == 0.0));
}

#[test]
fn initial_shape_requires_matching_shape() {
    let psd = psd();
    let rate = MassFlux::from_kg_per_m2_s(1.0);
    assert!(InjectionPolicy::InitialShape.source(rate, &psd, None).is_err());
    assert!(InjectionPolicy::InitialShape.source(rate, &psd, Some(&[1.0; 3])).is_err());
    let zero = InjectionPolicy::MinimumBin.source(MassFlux::zero(), &psd, None).unwrap();
    assert!(zero.iter().all(|s| *s == 0.0));
}
