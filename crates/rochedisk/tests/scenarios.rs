//! End-to-end scenarios for the coupled driver.
//!
//! Each test builds a complete run from a configuration and checks the
//! behaviour of the whole pipeline rather than a single module.

use approx::assert_relative_eq;
use units::{Length, Time, Velocity};

use rochedisk::collisions::{
    CoefficientUnits, DisruptionThreshold, FragmentTensor, QStarCoefficients, RelativeVelocity,
    VelocityExtrapolation,
};
use rochedisk::drivers::TemperatureModel;
use rochedisk::supply::SupplyRate;
use rochedisk::{
    run_simulation, step, DiskError, GridConfig, InitialConfig, InitialPsd, RunConfig, RunMetadata,
    SimulationState, StopReason,
};

const DT: f64 = 600.0;

fn state_for(config: RunConfig) -> SimulationState {
    SimulationState::new(config, RunMetadata::from_seed_name("scenario")).unwrap()
}

fn mono_disperse_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.grid = GridConfig {
        s_min_m: 1.0e-7,
        s_max_m: 1.0e-4,
        n_bins: 18,
    };
    config.initial = InitialConfig {
        psd: InitialPsd::MonoDisperse { size_m: 1.0e-6 },
        column_density_kg_m2: 1.0e-6,
    };
    config.radiation.blowout_enabled = false;
    config.supply.enabled = false;
    config
}

#[test]
fn closed_mono_disperse_population_grinds_down_conserving_mass() {
    let mut state = state_for(mono_disperse_config());
    let initial_mass = state.psd.total_mass().to_kg_per_m2();
    let parent = state
        .psd
        .grid()
        .bin_index(Length::from_meters(1.0e-6))
        .unwrap();
    assert!(state.psd.number()[..parent].iter().all(|n| *n == 0.0));

    for _ in 0..100 {
        let diag = step(&mut state, Time::from_seconds(DT)).unwrap();
        assert!(diag.mass_budget.within(0.5), "budget error {}", diag.mass_budget.error_percent);
        assert_eq!(diag.cumulative_mass_lost_blowout, 0.0);
    }

    let final_mass = state.psd.total_mass().to_kg_per_m2();
    assert_relative_eq!(final_mass, initial_mass, max_relative = 5.0e-3);
    let smaller: f64 = state.psd.number()[..parent].iter().sum();
    assert!(smaller > 0.0, "collisions should populate bins below the parent size");
}

#[test]
fn supply_without_collisions_grows_column_linearly() {
    let rate = 1.0e-10;
    let mut config = mono_disperse_config();
    config.dynamics.collisions_enabled = false;
    config.supply.enabled = true;
    config.supply.rate = SupplyRate::Const { rate_kg_m2_s: rate };
    config.supply.epsilon_mix = 1.0;
    config.supply.delay_first_step = false;

    let mut state = state_for(config);
    let sigma0 = state.reservoir.column_density().to_kg_per_m2();
    let n0 = state.psd.number()[0];
    let m0 = state.psd.masses()[0];

    let steps = 10;
    for k in 1..=steps {
        let diag = step(&mut state, Time::from_seconds(DT)).unwrap();
        let expected = sigma0 + rate * DT * k as f64;
        assert_relative_eq!(diag.column_density, expected, max_relative = 1.0e-10);
        assert_relative_eq!(diag.injected_rate, rate, max_relative = 1.0e-12);
        assert_relative_eq!(diag.production_rate, rate, max_relative = 1.0e-12);
    }

    let supplied = rate * DT * steps as f64;
    assert_relative_eq!(
        state.reservoir.state().cumulative_mass_supplied,
        supplied,
        max_relative = 1.0e-10
    );
    assert_relative_eq!(
        state.psd.number()[0],
        n0 + supplied / m0,
        max_relative = 1.0e-10
    );
    assert!(state.context.cache.is_empty());
}

#[test]
fn optically_thick_start_stops_before_any_collision() {
    let mut config = mono_disperse_config();
    config.optical_depth.tau_stop = 1.0e-6;
    let mut state = state_for(config);
    let before = state.psd.number().to_vec();

    let mut seen = 0;
    let summary = run_simulation(&mut state, Time::from_days(1.0), |diag| {
        seen += 1;
        assert_eq!(diag.dt_s, 0.0);
        assert!(diag.tau.unwrap() > 1.0e-6);
    })
    .unwrap();

    assert_eq!(seen, 1);
    assert_eq!(summary.stop_reason, Some(StopReason::TauExceeded));
    assert_eq!(summary.final_time_s, 0.0);
    assert_eq!(summary.kernel_builds, 0);
    assert_eq!(state.psd.number(), before.as_slice());
}

#[test]
fn weak_grains_feed_blowout_through_the_smallest_bins() {
    let qstar = DisruptionThreshold::new(
        vec![QStarCoefficients {
            velocity_km_s: 3.0,
            qs: 1.0e-3,
            a_s: 0.0,
            b: 0.0,
            b_g: 0.0,
        }],
        CoefficientUnits::Si,
        VelocityExtrapolation::Clamp,
    )
    .unwrap();

    let mut config = RunConfig::default();
    config.grid = GridConfig {
        s_min_m: 1.0e-7,
        s_max_m: 1.0e-3,
        n_bins: 24,
    };
    config.initial = InitialConfig {
        psd: InitialPsd::PowerLaw {
            q: 3.5,
            s_min_m: 1.0e-7,
            s_max_m: 1.0e-3,
        },
        column_density_kg_m2: 1.0e-4,
    };
    config.qstar = qstar.clone();
    config.temperature = TemperatureModel::Constant { value_k: 4000.0 };
    config.supply.enabled = false;

    // Fragments of the largest pair land mostly in the smallest bins
    let grid = rochedisk::SizeGrid::build(
        Length::from_meters(config.grid.s_min_m),
        Length::from_meters(config.grid.s_max_m),
        config.grid.n_bins,
    )
    .unwrap();
    let rho = config.material.bulk_density();
    let tensor = FragmentTensor::build(
        &grid,
        rho,
        &RelativeVelocity::Scalar(Velocity::from_meters_per_sec(2000.0)),
        &qstar,
        &config.fragments,
    )
    .unwrap();
    let top = grid.n_bins() - 1;
    let masses = grid.masses(rho);
    assert!(tensor.yield_at(0, top, top) * masses[0] > tensor.yield_at(top, top, top) * masses[top]);

    let mut state = state_for(config);
    let mut previous = 0.0;
    let mut first = None;
    let mut fed = 0.0;
    for _ in 0..20 {
        let diag = step(&mut state, Time::from_seconds(DT)).unwrap();
        assert!(diag.blowout_size_m.is_some());
        assert!(diag.fragment_blowout_rate >= 0.0);
        fed += diag.fragment_blowout_rate * diag.dt_s;
        assert!(diag.cumulative_mass_lost_blowout >= previous);
        previous = diag.cumulative_mass_lost_blowout;
        first.get_or_insert(previous);
    }
    assert!(previous > first.unwrap());
    assert!(state.last.as_ref().unwrap().blowout_rate > 0.0);
    assert!(fed > 0.0, "collisions should feed the blow-out bins");
}

#[test]
fn zero_step_is_idempotent_mid_run() {
    let mut state = state_for(mono_disperse_config());
    step(&mut state, Time::from_seconds(DT)).unwrap();

    let snapshot = state.last.clone().unwrap();
    let a = step(&mut state, Time::zero()).unwrap();
    let b = step(&mut state, Time::zero()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.number, snapshot.number);
    assert_eq!(state.step_index, 1);
}

#[test]
fn unrecoverable_budget_error_surfaces_to_the_caller() {
    let mut config = mono_disperse_config();
    config.initial.column_density_kg_m2 = 1.0e-2;
    config.optical_depth.tau_stop = 1.0e3;
    config.solver.tolerance_percent = 1.0e-6;
    config.solver.max_halvings = 1;

    let mut state = state_for(config);
    let error = run_simulation(&mut state, Time::from_days(1.0), |_| {}).unwrap_err();
    assert!(error.is_numerical());
    match &error {
        DiskError::MassBudgetViolation {
            error_percent,
            tolerance_percent,
            ..
        } => assert!(error_percent > tolerance_percent),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(state.step_index, 0);
}
