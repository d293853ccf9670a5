//! Main simulation driver.
//!
//! Couples the environment, the surface reservoir, the supply gate and the
//! collision solver in a fixed order each step.

use std::sync::Arc;

use units::{
    keplerian_velocity, AngularVelocity, Length, Mass, MassFlux, Opacity, Temperature, Time, Velocity,
};

use super::diagnostics::{RunSummary, StepDiagnostics};
use super::state::SimulationState;
use super::timestep::split_count;
use crate::collisions::{CollisionKernel, FragmentKey, FragmentTensor, KernelKey, RelativeVelocity};
use crate::config::{NumericsConfig, RunConfig};
use crate::drivers::{PhaseDecision, PhaseModel, TemperatureDriver};
use crate::dynamics::{kernel_excitation, relax_eccentricity, OrbitalExcitation};
use crate::error::{DiskError, DiskResult};
use crate::psd::ParticleSizeDistribution;
use crate::radiation::{blowout_radius, effective_opacity, grain_temperature, ShieldingModel};
use crate::solver::{MassBudget, StepInputs};
use crate::supply::{GateState, SupplyContext};
use crate::surface::{wyatt_collision_time, StopReason, SurfaceReservoir};

// =============================================================================
// Step context
// =============================================================================

/// External conditions at the start of a step.
struct Environment {
    temperature: Temperature,
    grain_temperature: Temperature,
    phase: PhaseDecision,
    radius: Length,
    v_k: Velocity,
    omega: AngularVelocity,
    /// Residence time of unbound grains, χ_blow/Ω
    t_blow: Time,
    blowout_size: Option<Length>,
}

impl Environment {
    fn at(config: &RunConfig, time: Time) -> DiskResult<Self> {
        let temperature = config.temperature.temperature(time)?;
        let phase = config.material.phase.phase(temperature)?;
        let radius = config.dynamics.orbital_radius();
        let v_k = keplerian_velocity(Mass::from_mars_masses(1.0), radius);
        let omega = v_k.orbital_frequency(radius);
        let blowout_size = if config.radiation.blowout_enabled {
            blowout_radius(
                config.material.bulk_density(),
                temperature,
                &config.radiation.efficiency(),
            )?
        } else {
            None
        };

        Ok(Self {
            temperature,
            grain_temperature: grain_temperature(temperature, radius),
            phase,
            radius,
            v_k,
            omega,
            t_blow: omega.inverse() * config.radiation.chi_blow,
            blowout_size,
        })
    }
}

/// Step-specific values reported in the diagnostics.
struct StepRecord {
    step_index: u64,
    dt_s: f64,
    budget: MassBudget,
    substeps: usize,
    halvings: usize,
    split: usize,
    blowout_rate: f64,
    fragment_blowout_rate: f64,
    sink_rate: f64,
    sink_size: Option<Length>,
    gate: GateState,
    injected_rate: f64,
    production_rate: f64,
    excitation: OrbitalExcitation,
    relative_velocity: Option<f64>,
    min_collision_time_s: Option<f64>,
}

impl StepRecord {
    /// Record for a step that advanced nothing.
    fn idle(state: &SimulationState) -> Self {
        Self {
            step_index: state.step_index,
            dt_s: 0.0,
            budget: MassBudget::unchanged(state.psd.total_mass().to_kg_per_m2()),
            substeps: 0,
            halvings: 0,
            split: 0,
            blowout_rate: 0.0,
            fragment_blowout_rate: 0.0,
            sink_rate: 0.0,
            sink_size: None,
            gate: state.supply.state().gate,
            injected_rate: 0.0,
            production_rate: 0.0,
            excitation: state.excitation,
            relative_velocity: None,
            min_collision_time_s: None,
        }
    }
}

/// Kernel and tensor for the current grid and kinematics.
struct CollisionOperators {
    kernel: Arc<CollisionKernel>,
    fragments: Arc<FragmentTensor>,
    relative_velocity: Velocity,
}

// =============================================================================
// Step
// =============================================================================

/// Execute one step of length `dt`.
///
/// Each step proceeds in this order:
/// 1. Environment: temperature, phase, Ω and the blow-out size
/// 2. Optical-depth stop check, before any collision is evaluated
/// 3. Size floor raised to the blow-out or sublimation size
/// 4. Sink rates on the current grid
/// 5. Supply gate and injection source
/// 6. Excitation and collision operators (skipped when liquid-dominated)
/// 7. IMEX solve, split against min(t_blow, t_coll)
/// 8. Reservoir bookkeeping, optional τ=1 clip, reconciliation
///
/// A stopped run or a zero `dt` returns diagnostics of the current state and
/// changes nothing.
///
/// # Errors
/// [`DiskError::InvalidInput`] for a negative or non-finite `dt`, and any
/// error raised by the physics or the solver. A solver failure leaves the
/// size distribution as it was before the solve.
pub fn step(state: &mut SimulationState, dt: Time) -> DiskResult<StepDiagnostics> {
    let dt_s = dt.to_seconds();
    if !(dt_s.is_finite() && dt_s >= 0.0) {
        return Err(DiskError::invalid_input("dt", dt_s, "must be finite and non-negative"));
    }

    let config = state.config.clone();
    let env = Environment::at(&config, state.time)?;
    if state.is_stopped() || dt_s == 0.0 {
        return diagnostics(state, &env, &StepRecord::idle(state));
    }
    if config.radiation.blowout_enabled && env.blowout_size.is_none() && state.blowout_size.is_some() {
        log::warn!(
            "β stays below ½ at T = {:.0} K; blow-out is inactive",
            env.temperature.to_kelvin()
        );
    }
    state.blowout_size = env.blowout_size;

    // Optical-depth stop
    let shielding = &config.optical_depth.shielding;
    let los = config.optical_depth.line_of_sight.factor();
    let kappa_eff = shielded_opacity(&state.psd, &state.reservoir, shielding);
    let before = state.reservoir.evaluate_optical_depth(kappa_eff, los);
    if before.stop {
        state.stop_reason = Some(StopReason::TauExceeded);
        log::info!(
            "run {} stopped at t = {:.3e} s: τ_los = {:.4} exceeds {}",
            state.context.metadata.id,
            state.time.to_seconds(),
            before.tau.unwrap_or(f64::NAN),
            config.optical_depth.tau_stop
        );
        let diag = diagnostics(state, &env, &StepRecord::idle(state))?;
        state.last = Some(diag.clone());
        return Ok(diag);
    }

    // Size floor and sinks
    let rho = config.material.bulk_density();
    let t_ref = env.omega.inverse();
    let sink_size = if config.sinks.sublimation_enabled {
        Some(config.sinks.sublimation.sink_size(env.grain_temperature, rho, t_ref)?)
    } else {
        None
    };
    let rebinned_loss = raise_floor(state, &config.numerics, env.blowout_size, sink_size)?;
    let sinks = config.sinks.rates(state.psd.sizes(), env.grain_temperature, rho, t_ref)?;

    // Supply
    let headroom = kappa_eff.and_then(|k| state.reservoir.headroom(k));
    let supply = state.supply.evaluate(
        state.time,
        env.radius,
        &env.phase,
        &SupplyContext {
            step_index: state.step_index,
            dt,
            temperature: env.temperature,
            headroom,
        },
    )?;
    let source = config.supply.injection.source(
        supply.injected_rate,
        &state.psd,
        Some(state.initial_psd.number()),
    )?;

    // Collisions
    let excitation = evolve_excitation(state, &config, &env, before.tau_vertical.unwrap_or(0.0), dt)?;
    let operators = if !config.dynamics.collisions_enabled {
        None
    } else if env.phase.is_liquid_dominated() {
        log::trace!("liquid-dominated at T = {:.0} K; collisions off", env.temperature.to_kelvin());
        None
    } else {
        Some(collision_operators(state, &config, &env, excitation)?)
    };

    let blow_rate = 1.0 / env.t_blow.to_seconds();
    let blowout_rates: Vec<f64> = state
        .psd
        .sizes()
        .iter()
        .map(|&s| match env.blowout_size {
            Some(a) if s <= a.to_m() => blow_rate,
            _ => 0.0,
        })
        .collect();

    // Solve
    let t_coll = operators
        .as_ref()
        .and_then(|ops| ops.kernel.minimum_collision_time(state.psd.number()));
    let t_blow = blowout_rates.iter().any(|r| *r > 0.0).then_some(env.t_blow);
    let split = split_count(dt, &[t_blow, t_coll], config.numerics.safety_ratio, config.numerics.max_split);
    let piece = dt / split as f64;

    let inputs = StepInputs {
        collisions: operators
            .as_ref()
            .map(|ops| (ops.kernel.as_ref(), ops.fragments.as_ref())),
        source: &source,
        sink_rates: &sinks.per_bin,
        blowout_rates: &blowout_rates,
    };
    let mut psd = state.psd.clone();
    let mut budget = MassBudget::unchanged(psd.total_mass().to_kg_per_m2());
    let mut blown = rebinned_loss;
    let mut sunk = 0.0;
    let mut fed = 0.0;
    let mut substeps = 0;
    let mut halvings = 0;
    for _ in 0..split {
        let outcome = state.solver.step(&mut psd, &inputs, piece)?;
        budget = budget.chain(&outcome.budget);
        blown += outcome.blowout_mass;
        sunk += outcome.sink_mass;
        fed += outcome.fragment_blowout_mass;
        substeps += outcome.substeps;
        halvings += outcome.halvings;
    }
    state.psd = psd;

    // Reservoir
    state.reservoir.apply_production(supply.injected_rate, dt);
    state.reservoir.apply_loss(
        MassFlux::from_kg_per_m2_s(blown / dt_s),
        MassFlux::from_kg_per_m2_s(sunk / dt_s),
        dt,
    );
    state.reservoir.record_spill(supply.spilled_rate.over(dt));

    if let Some(kappa) = shielded_opacity(&state.psd, &state.reservoir, shielding) {
        let clipped = state.reservoir.clip_to_tau_unity(kappa).to_kg_per_m2();
        if clipped > 0.0 {
            state.psd.scale_to_column(state.reservoir.column_density())?;
            log::debug!("clipped {clipped:.3e} kg/m² above Σ_τ=1");
        }
    }
    let drift = state.reservoir.reconcile(state.psd.total_mass());
    if drift != 0.0 {
        log::trace!("reservoir reconciled with PSD column, drift {drift:.3e} kg/m²");
    }
    let kappa_after = shielded_opacity(&state.psd, &state.reservoir, shielding);
    state.reservoir.evaluate_optical_depth(kappa_after, los);

    let record = StepRecord {
        step_index: state.step_index,
        dt_s,
        budget,
        substeps,
        halvings,
        split,
        blowout_rate: blown / dt_s,
        fragment_blowout_rate: fed / dt_s,
        sink_rate: sunk / dt_s,
        sink_size: sinks.sink_size.or(sink_size),
        gate: supply.gate,
        injected_rate: supply.injected_rate.to_kg_per_m2_s(),
        production_rate: supply.production_rate.to_kg_per_m2_s(),
        excitation,
        relative_velocity: operators
            .as_ref()
            .map(|ops| ops.relative_velocity.to_meters_per_sec()),
        min_collision_time_s: t_coll.map(|t| t.to_seconds()),
    };

    state.time = state.time + dt;
    state.step_index += 1;

    let diag = diagnostics(state, &env, &record)?;
    log::debug!(
        "step {}: t = {:.3e} s, Σ = {:.4e} kg/m², τ = {:.3e}, budget error {:.2e}%, {} pieces / {} substeps",
        record.step_index,
        diag.time_s,
        diag.column_density,
        diag.tau.unwrap_or(f64::NAN),
        budget.error_percent,
        split,
        substeps
    );
    state.last = Some(diag.clone());
    Ok(diag)
}

/// Run until `max_time` or until the run stops, calling `on_step` after
/// every step.
///
/// Steps use the configured `dt_s`, shortened so the last one lands on
/// `max_time`.
pub fn run_simulation<F>(state: &mut SimulationState, max_time: Time, mut on_step: F) -> DiskResult<RunSummary>
where
    F: FnMut(&StepDiagnostics),
{
    let nominal = Time::from_seconds(state.config.numerics.dt_s);
    let mut steps = 0;
    while !state.is_finished(max_time) {
        let dt = nominal.min(max_time - state.time);
        let diag = step(state, dt)?;
        on_step(&diag);
        steps += 1;
        if diag.dt_s == 0.0 && !state.is_stopped() {
            break;
        }
    }

    let reservoir = state.reservoir.state();
    let cache = state.context.cache.stats();
    log::info!(
        "run {} finished after {} steps at t = {:.3e} s{}",
        state.context.metadata.id,
        steps,
        state.time.to_seconds(),
        state
            .stop_reason
            .map(|r| format!(" ({r})"))
            .unwrap_or_default()
    );
    Ok(RunSummary {
        steps,
        final_time_s: state.time.to_seconds(),
        stop_reason: state.stop_reason,
        column_density: reservoir.column_density,
        cumulative_mass_lost_blowout: reservoir.cumulative_mass_lost_blowout,
        cumulative_mass_lost_sink: reservoir.cumulative_mass_lost_sink,
        cumulative_mass_supplied: reservoir.cumulative_mass_supplied,
        cumulative_mass_spilled: reservoir.cumulative_mass_spilled,
        kernel_builds: cache.kernel_builds,
        fragment_builds: cache.fragment_builds,
    })
}

/// Run to the configured `numerics.t_end_s`.
pub fn run_to_end<F>(state: &mut SimulationState, on_step: F) -> DiskResult<RunSummary>
where
    F: FnMut(&StepDiagnostics),
{
    let end = Time::from_seconds(state.config.numerics.t_end_s);
    run_simulation(state, end, on_step)
}

// =============================================================================
// Stages
// =============================================================================

/// κ_eff of the current distribution at the reservoir's vertical τ.
fn shielded_opacity(
    psd: &ParticleSizeDistribution,
    reservoir: &SurfaceReservoir,
    shielding: &ShieldingModel,
) -> Option<Opacity> {
    let kappa = psd.opacity()?;
    let tau = kappa.to_m2_per_kg() * reservoir.column_density().to_kg_per_m2();
    Some(effective_opacity(kappa, tau, shielding))
}

/// Raise the size floor; returns the mass lost when the grid is rebuilt.
///
/// The floor never decreases.
fn raise_floor(
    state: &mut SimulationState,
    numerics: &NumericsConfig,
    blowout_size: Option<Length>,
    sink_size: Option<Length>,
) -> DiskResult<f64> {
    let current = state.psd.minimum_size_floor();
    let mut floor = current;
    if numerics.floor_follows_blowout {
        if let Some(a) = blowout_size {
            floor = floor.max(a);
        }
    }
    if numerics.floor_follows_sublimation {
        if let Some(s) = sink_size {
            floor = floor.max(s);
        }
    }
    if !(floor.to_m() > current.to_m()) {
        return Ok(0.0);
    }
    state.psd.set_minimum_size_floor(floor);
    state.initial_psd.set_minimum_size_floor(floor);
    log::debug!("size floor raised to {:.3e} m", floor.to_m());

    let grid = state.psd.grid();
    if !(numerics.rebuild_grid_on_floor
        && floor.to_m() > grid.min_size().to_m()
        && floor.to_m() < grid.max_size().to_m())
    {
        return Ok(0.0);
    }
    let target = grid.with_floor(floor)?;
    let (psd, lost) = state.psd.rebin_onto(target.clone())?;
    let (initial_psd, _) = state.initial_psd.rebin_onto(target)?;
    log::info!(
        "grid rebuilt onto floor {:.3e} m (version {}), {:.3e} kg/m² below the new edge",
        floor.to_m(),
        psd.grid().version(),
        lost
    );
    state.psd = psd;
    state.initial_psd = initial_psd;
    Ok(lost)
}

/// e and i used by the kernel this step, relaxing the run's excitation when
/// a damping time is configured.
fn evolve_excitation(
    state: &mut SimulationState,
    config: &RunConfig,
    env: &Environment,
    tau_vertical: f64,
    dt: Time,
) -> DiskResult<OrbitalExcitation> {
    let dynamics = &config.dynamics;
    let target = kernel_excitation(
        dynamics.excitation,
        state.excitation,
        tau_vertical,
        env.v_k,
        dynamics.f_wake,
    );
    let Some(orbits) = dynamics.t_damp_orbits else {
        return Ok(target);
    };
    let t_damp = env.omega.period() * orbits;
    let current = state.excitation;
    state.excitation = OrbitalExcitation {
        eccentricity: relax_eccentricity(current.eccentricity, target.eccentricity, t_damp, dt)?,
        inclination: relax_eccentricity(current.inclination, target.inclination, t_damp, dt)?,
    };
    Ok(state.excitation)
}

fn collision_operators(
    state: &mut SimulationState,
    config: &RunConfig,
    env: &Environment,
    excitation: OrbitalExcitation,
) -> DiskResult<CollisionOperators> {
    let dynamics = &config.dynamics;
    let relative_velocity =
        dynamics
            .velocity_law
            .relative_velocity(excitation.eccentricity, excitation.inclination, env.v_k)?;
    let scale_height = dynamics.scale_height.scale_height(excitation.inclination, env.radius);
    let velocity = RelativeVelocity::Scalar(relative_velocity);
    let rho = config.material.bulk_density();
    let grid = state.psd.grid();

    let kernel_key = KernelKey {
        grid_version: grid.version(),
        n_bins: grid.n_bins(),
        bulk_density_bits: rho.to_kg_per_m3().to_bits(),
        velocity_law: dynamics.velocity_law.id(),
        velocity_bits: velocity.fingerprint(),
        h_factor_bits: dynamics.scale_height.factor_bits(),
        scale_height_bits: scale_height.to_bits(),
    };
    let kernel = state
        .context
        .cache
        .kernel(kernel_key, || CollisionKernel::build_uniform(grid, &velocity, scale_height))?;

    let fragment_key = FragmentKey {
        grid_version: grid.version(),
        n_bins: grid.n_bins(),
        alpha_bits: config.fragments.alpha.to_bits(),
        remnant_binning: config.fragments.remnant_binning as u8,
        qstar_fingerprint: config.qstar.fingerprint(),
        bulk_density_bits: rho.to_kg_per_m3().to_bits(),
        velocity_bits: velocity.fingerprint(),
    };
    let fragments = state.context.cache.fragments(fragment_key, || {
        FragmentTensor::build(grid, rho, &velocity, &config.qstar, &config.fragments)
    })?;

    Ok(CollisionOperators {
        kernel,
        fragments,
        relative_velocity,
    })
}

fn diagnostics(state: &SimulationState, env: &Environment, record: &StepRecord) -> DiskResult<StepDiagnostics> {
    let reservoir = state.reservoir.state();
    let los = state.config.optical_depth.line_of_sight.factor();
    let tau_vertical = reservoir.optical_depth.filter(|_| los > 0.0).map(|tau| tau / los);
    let wyatt = match tau_vertical {
        Some(tau) => wyatt_collision_time(tau, env.omega)?,
        None => None,
    };
    Ok(StepDiagnostics {
        step_index: record.step_index,
        time_s: state.time.to_seconds(),
        dt_s: record.dt_s,

        number: state.psd.number().to_vec(),
        psd_mass: state.psd.total_mass().to_kg_per_m2(),
        minimum_size_m: state.psd.minimum_size_floor().to_m(),
        blowout_size_m: env.blowout_size.map(|a| a.to_m()),
        sink_size_m: record.sink_size.map(|s| s.to_m()),
        grid_version: state.psd.grid().version(),

        mass_budget: record.budget,
        substeps: record.substeps,
        halvings: record.halvings,
        split: record.split,

        column_density: reservoir.column_density,
        cumulative_mass_lost_blowout: reservoir.cumulative_mass_lost_blowout,
        cumulative_mass_lost_sink: reservoir.cumulative_mass_lost_sink,
        cumulative_mass_supplied: reservoir.cumulative_mass_supplied,
        cumulative_mass_spilled: reservoir.cumulative_mass_spilled,
        blowout_rate: record.blowout_rate,
        fragment_blowout_rate: record.fragment_blowout_rate,
        sink_rate: record.sink_rate,
        tau: reservoir.optical_depth,
        stop_reason: state.stop_reason,

        supply_gate: record.gate,
        injected_rate: record.injected_rate,
        production_rate: record.production_rate,

        temperature_k: env.temperature.to_kelvin(),
        phase: env.phase.state,
        melt_fraction: env.phase.melt_fraction,
        eccentricity: record.excitation.eccentricity,
        inclination: record.excitation.inclination,
        relative_velocity: record.relative_velocity,
        min_collision_time_s: record.min_collision_time_s,
        wyatt_collision_time_s: wyatt.map(|t| t.to_seconds()),
    })
}
