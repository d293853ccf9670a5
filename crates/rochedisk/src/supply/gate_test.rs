//! Tests for the supply gate.

use approx::assert_relative_eq;
use units::{Length, SurfaceDensity, Temperature, Time};

use crate::drivers::{PhaseDecision, PhaseState};
use crate::supply::*;

const RATE: f64 = 1.0e-6;

fn constant(rate: f64) -> SupplyConfig {
    SupplyConfig {
        rate: SupplyRate::Const { rate_kg_m2_s: rate },
        epsilon_mix: 1.0,
        ..SupplyConfig::default()
    }
}

fn ctx(step_index: u64, dt: f64) -> SupplyContext {
    SupplyContext {
        step_index,
        dt: Time::from_seconds(dt),
        temperature: Temperature::from_kelvin(2000.0),
        headroom: None,
    }
}

fn radius() -> Length {
    Length::from_mars_radii(2.0)
}

fn liquid() -> PhaseDecision {
    PhaseDecision {
        state: PhaseState::LiquidDominated,
        melt_fraction: 0.8,
    }
}

#[test]
fn gate_is_shut_on_the_first_step() {
    let mut gate = SupplyGate::new(constant(RATE), HeadroomPolicy::Off).unwrap();
    let first = gate
        .evaluate(Time::zero(), radius(), &PhaseDecision::solid(), &ctx(0, 10.0))
        .unwrap();
    assert_eq!(
        first.gate,
        GateState::Blocked {
            reason: BlockReason::StepZeroDelay
        }
    );
    assert_eq!(first.injected_rate.to_kg_per_m2_s(), 0.0);

    let second = gate
        .evaluate(Time::from_seconds(10.0), radius(), &PhaseDecision::solid(), &ctx(1, 10.0))
        .unwrap();
    assert_eq!(second.gate, GateState::Open);
    assert_relative_eq!(second.injected_rate.to_kg_per_m2_s(), RATE);
}

#[test]
fn liquid_dominated_phase_blocks_supply() {
    let mut gate = SupplyGate::new(constant(RATE), HeadroomPolicy::Off).unwrap();
    let outcome = gate
        .evaluate(Time::from_seconds(10.0), radius(), &liquid(), &ctx(3, 10.0))
        .unwrap();
    assert_eq!(
        outcome.gate,
        GateState::Blocked {
            reason: BlockReason::LiquidDominated
        }
    );
    assert!(!gate.state().gate.is_open());
    assert_eq!(gate.state().injected_rate, 0.0);
}

#[test]
fn disabled_supply_never_opens() {
    let config = SupplyConfig {
        enabled: false,
        ..constant(RATE)
    };
    let mut gate = SupplyGate::new(config, HeadroomPolicy::Off).unwrap();
    let outcome = gate
        .evaluate(Time::from_seconds(10.0), radius(), &PhaseDecision::solid(), &ctx(5, 10.0))
        .unwrap();
    assert_eq!(
        outcome.gate,
        GateState::Blocked {
            reason: BlockReason::Disabled
        }
    );
}

#[test]
fn mixing_efficiency_scales_the_rate() {
    let config = SupplyConfig {
        epsilon_mix: 0.05,
        ..constant(RATE)
    };
    let mut gate = SupplyGate::new(config, HeadroomPolicy::Off).unwrap();
    let outcome = gate
        .evaluate(Time::from_seconds(1.0), radius(), &PhaseDecision::solid(), &ctx(1, 1.0))
        .unwrap();
    assert_relative_eq!(outcome.injected_rate.to_kg_per_m2_s(), 0.05 * RATE, max_relative = 1e-12);

    let bad = SupplyConfig {
        epsilon_mix: 1.5,
        ..constant(RATE)
    };
    assert!(SupplyGate::new(bad, HeadroomPolicy::Off).is_err());
}

#[test]
fn negative_raw_rate_is_clamped_to_zero() {
    let mut gate = SupplyGate::new(constant(-RATE), HeadroomPolicy::Off).unwrap();
    let outcome = gate
        .evaluate(Time::from_seconds(1.0), radius(), &PhaseDecision::solid(), &ctx(1, 1.0))
        .unwrap();
    assert_eq!(outcome.injected_rate.to_kg_per_m2_s(), 0.0);
}

#[test]
fn ramp_rises_linearly_after_opening() {
    let config = SupplyConfig {
        ramp_s: 100.0,
        ..constant(RATE)
    };
    let mut gate = SupplyGate::new(config, HeadroomPolicy::Off).unwrap();
    let solid = PhaseDecision::solid();
    let first = gate.evaluate(Time::from_seconds(0.0), radius(), &solid, &ctx(1, 25.0)).unwrap();
    assert_relative_eq!(first.injected_rate.to_kg_per_m2_s(), 0.25 * RATE, max_relative = 1e-12);
    let later = gate.evaluate(Time::from_seconds(200.0), radius(), &solid, &ctx(2, 25.0)).unwrap();
    assert_relative_eq!(later.injected_rate.to_kg_per_m2_s(), RATE, max_relative = 1e-12);
}

#[test]
fn finite_reservoir_runs_dry() {
    let config = SupplyConfig {
        reservoir: FiniteReservoir {
            mass_total_kg_m2: Some(1.5e-5),
            depletion: Depletion::HardStop,
        },
        ..constant(RATE)
    };
    let mut gate = SupplyGate::new(config, HeadroomPolicy::Off).unwrap();
    let solid = PhaseDecision::solid();

    let full = gate.evaluate(Time::from_seconds(0.0), radius(), &solid, &ctx(1, 10.0)).unwrap();
    assert_relative_eq!(full.injected_rate.to_kg_per_m2_s(), RATE);
    // Only 5e-6 kg/m² left for a 10 s step
    let partial = gate.evaluate(Time::from_seconds(10.0), radius(), &solid, &ctx(2, 10.0)).unwrap();
    assert_relative_eq!(partial.injected_rate.to_kg_per_m2_s(), 0.5 * RATE, max_relative = 1e-12);
    assert_eq!(gate.state().reservoir_remaining, Some(0.0));

    let dry = gate.evaluate(Time::from_seconds(20.0), radius(), &solid, &ctx(3, 10.0)).unwrap();
    assert_eq!(
        dry.gate,
        GateState::Blocked {
            reason: BlockReason::Exhausted
        }
    );
    assert_relative_eq!(gate.state().cumulative_produced, 1.5e-5, max_relative = 1e-12);
}

#[test]
fn deep_reservoir_releases_on_mixing_time() {
    let t_mix = 100.0;
    let config = SupplyConfig {
        deep_mixing: Some(DeepMixing { t_mix_s: t_mix }),
        ..constant(RATE)
    };
    let mut gate = SupplyGate::new(config, HeadroomPolicy::Off).unwrap();
    let solid = PhaseDecision::solid();
    let dt = 10.0;

    let first = gate.evaluate(Time::zero(), radius(), &solid, &ctx(1, dt)).unwrap();
    let expected = RATE * (1.0 - (-dt / t_mix).exp());
    assert_relative_eq!(first.injected_rate.to_kg_per_m2_s(), expected, max_relative = 1e-12);
    assert!(first.injected_rate.to_kg_per_m2_s() < first.production_rate.to_kg_per_m2_s());

    // Steady state: release matches production
    let mut t = dt;
    let mut last = first;
    for step in 2..500 {
        last = gate.evaluate(Time::from_seconds(t), radius(), &solid, &ctx(step, dt)).unwrap();
        t += dt;
    }
    assert_relative_eq!(last.injected_rate.to_kg_per_m2_s(), RATE, max_relative = 1e-6);
}

#[test]
fn headroom_clip_and_spill() {
    let headroom = SurfaceDensity::from_kg_per_m2(2.0e-6);
    let solid = PhaseDecision::solid();
    let context = SupplyContext {
        headroom: Some(headroom),
        ..ctx(1, 10.0)
    };

    let mut clip = SupplyGate::new(constant(RATE), HeadroomPolicy::Clip).unwrap();
    let clipped = clip.evaluate(Time::zero(), radius(), &solid, &context).unwrap();
    assert_eq!(clipped.gate, GateState::Clipped);
    assert_relative_eq!(clipped.injected_rate.to_kg_per_m2_s(), 2.0e-7, max_relative = 1e-12);
    assert_eq!(clipped.spilled_rate.to_kg_per_m2_s(), 0.0);

    let mut spill = SupplyGate::new(constant(RATE), HeadroomPolicy::Spill).unwrap();
    let spilled = spill.evaluate(Time::zero(), radius(), &solid, &context).unwrap();
    assert_eq!(spilled.gate, GateState::Spilled);
    assert_relative_eq!(spilled.injected_rate.to_kg_per_m2_s(), 2.0e-7, max_relative = 1e-12);
    assert_relative_eq!(spilled.spilled_rate.to_kg_per_m2_s(), 8.0e-7, max_relative = 1e-12);

    let mut off = SupplyGate::new(constant(RATE), HeadroomPolicy::Off).unwrap();
    let open = off.evaluate(Time::zero(), radius(), &solid, &context).unwrap();
    assert_eq!(open.gate, GateState::Open);
    assert_relative_eq!(open.injected_rate.to_kg_per_m2_s(), RATE);
}

#[test]
fn zero_dt_leaves_reservoirs_untouched() {
    let config = SupplyConfig {
        reservoir: FiniteReservoir {
            mass_total_kg_m2: Some(1.0),
            depletion: Depletion::HardStop,
        },
        ..constant(RATE)
    };
    let mut gate = SupplyGate::new(config, HeadroomPolicy::Off).unwrap();
    gate.evaluate(Time::zero(), radius(), &PhaseDecision::solid(), &ctx(1, 0.0))
        .unwrap();
    assert_eq!(gate.state().reservoir_remaining, Some(1.0));
    assert_eq!(gate.state().cumulative_produced, 0.0);
    assert!(gate
        .evaluate(Time::zero(), radius(), &PhaseDecision::solid(), &ctx(1, -1.0))
        .is_err());
}
