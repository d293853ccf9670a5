//! Implicit-explicit Smoluchowski step with a mass-budget guard.
//!
//! # Scheme
//!
//! Collisional gains and the external source are explicit; collisional
//! losses and the linear sinks are implicit:
//!
//! ```text
//! n'_k = (n_k + Δt (G_k + S_k)) / (1 + Δt (L_k + λ_sink,k + λ_blow,k))
//! ```
//!
//! The update is unconditionally positive. Its first-order splitting error
//! shows up as a mismatch between the realized column and
//! `M₀ + Δt Ṁ_src − Δt Ṁ_out(n')`; a substep whose mismatch (or the running
//! mismatch over the whole call) exceeds the tolerance is halved and retried.
//! A substep accepted on its first trial lets the next one double again, up
//! to the full interval. Once a substep is acceptable on its own but the
//! running mismatch is not, halving cannot recover the call and it fails at
//! once.

use nalgebra::DVector;
use units::{MassFlux, Time};

use super::budget::{MassBudget, SolverConfig};
use crate::collisions::{CollisionKernel, FragmentTensor};
use crate::error::{DiskError, DiskResult};
use crate::psd::ParticleSizeDistribution;

/// Remaining fraction of the interval treated as done
const REMAINDER_EPS: f64 = 1.0e-12;

/// Rates driving one call to [`CoagulationSolver::step`].
#[derive(Debug, Clone, Copy)]
pub struct StepInputs<'a> {
    /// Kernel and fragment tensor; `None` switches collisions off
    pub collisions: Option<(&'a CollisionKernel, &'a FragmentTensor)>,
    /// Number source per bin (m⁻² s⁻¹)
    pub source: &'a [f64],
    /// Implicit sublimation and bulk-sink rates per bin (s⁻¹)
    pub sink_rates: &'a [f64],
    /// Implicit blow-out rates per bin (s⁻¹)
    pub blowout_rates: &'a [f64],
}

impl StepInputs<'_> {
    fn check(&self, n_bins: usize) -> DiskResult<()> {
        let lengths = [
            ("source", self.source.len()),
            ("sink_rates", self.sink_rates.len()),
            ("blowout_rates", self.blowout_rates.len()),
        ];
        for (name, len) in lengths {
            if len != n_bins {
                return Err(DiskError::geometry(format!(
                    "{name} has {len} entries, grid has {n_bins} bins"
                )));
            }
        }
        if let Some((kernel, fragments)) = self.collisions {
            if kernel.n_bins() != n_bins || fragments.n_bins() != n_bins {
                return Err(DiskError::geometry("collision operators do not match the grid"));
            }
        }
        Ok(())
    }
}

/// Accepted result of a solver call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Budget over the whole call
    pub budget: MassBudget,
    /// Worst accepted substep error (percent)
    pub max_substep_error_percent: f64,
    pub dt: Time,
    /// Mass removed by blow-out, including floor-sanitized mass (kg/m²)
    pub blowout_mass: f64,
    /// Part of `blowout_mass` removed by sanitizing below the size floor
    pub floor_mass: f64,
    /// Mass removed by sublimation and bulk sinks (kg/m²)
    pub sink_mass: f64,
    /// Mass added by the source (kg/m²)
    pub source_mass: f64,
    /// Mass collisions delivered into bins subject to blow-out (kg/m²)
    pub fragment_blowout_mass: f64,
    pub substeps: usize,
    pub halvings: usize,
}

impl StepOutcome {
    fn idle(mass: f64) -> Self {
        Self {
            budget: MassBudget::unchanged(mass),
            max_substep_error_percent: 0.0,
            dt: Time::zero(),
            blowout_mass: 0.0,
            floor_mass: 0.0,
            sink_mass: 0.0,
            source_mass: 0.0,
            fragment_blowout_mass: 0.0,
            substeps: 0,
            halvings: 0,
        }
    }

    /// Mean blow-out flux over the call
    pub fn blowout_rate(&self) -> MassFlux {
        self.mean_rate(self.blowout_mass)
    }

    /// Mean collisional feed into the blow-out bins over the call
    pub fn fragment_blowout_rate(&self) -> MassFlux {
        self.mean_rate(self.fragment_blowout_mass)
    }

    /// Mean sink flux over the call
    pub fn sink_rate(&self) -> MassFlux {
        self.mean_rate(self.sink_mass)
    }

    fn mean_rate(&self, mass: f64) -> MassFlux {
        let dt = self.dt.to_seconds();
        if dt > 0.0 {
            MassFlux::from_kg_per_m2_s(mass / dt)
        } else {
            MassFlux::zero()
        }
    }
}

/// One trial substep, not yet accepted.
struct Substep {
    psd: ParticleSizeDistribution,
    budget: MassBudget,
    blowout_mass: f64,
    floor_mass: f64,
    sink_mass: f64,
    source_mass: f64,
    fragment_blowout_mass: f64,
}

/// What to do with a trial substep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepControl {
    Accept,
    Halve,
    /// The trial is fine but the running budget is not; halving cannot help
    Saturated,
}

/// Decide on a trial from its own budget and the running budget it would produce.
pub(crate) fn step_control(trial: &MassBudget, running: &MassBudget, tolerance_percent: f64) -> StepControl {
    match (trial.within(tolerance_percent), running.within(tolerance_percent)) {
        (true, true) => StepControl::Accept,
        (true, false) => StepControl::Saturated,
        (false, _) => StepControl::Halve,
    }
}

/// Substep length after an accepted substep of length `h`.
///
/// Doubles after a first-trial acceptance, capped at `total`; keeps `h`
/// after a substep that needed halving.
pub(crate) fn next_substep(h: f64, retries: usize, total: f64) -> f64 {
    if retries == 0 {
        (2.0 * h).min(total)
    } else {
        h
    }
}

/// IMEX coagulation-fragmentation solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoagulationSolver {
    config: SolverConfig,
}

impl CoagulationSolver {
    pub fn new(config: SolverConfig) -> DiskResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Advance `psd` by `dt`.
    ///
    /// On success `psd` holds the new distribution. On error it is left
    /// untouched.
    ///
    /// # Errors
    /// [`DiskError::InvalidInput`] for a negative or non-finite `dt`,
    /// [`DiskError::Geometry`] for rate vectors that do not match the grid,
    /// and [`DiskError::MassBudgetViolation`] once halving or the substep
    /// cap is exhausted.
    pub fn step(
        &self,
        psd: &mut ParticleSizeDistribution,
        inputs: &StepInputs<'_>,
        dt: Time,
    ) -> DiskResult<StepOutcome> {
        let total = dt.to_seconds();
        if !(total.is_finite() && total >= 0.0) {
            return Err(DiskError::invalid_input("dt", total, "must be finite and non-negative"));
        }
        inputs.check(psd.n_bins())?;

        let initial = psd.total_mass().to_kg_per_m2();
        if total == 0.0 {
            return Ok(StepOutcome::idle(initial));
        }

        let tolerance = self.config.tolerance_percent;
        let mut current = psd.clone();
        let mut outcome = StepOutcome {
            dt,
            ..StepOutcome::idle(initial)
        };
        let mut h = total;
        let mut elapsed = 0.0;

        while total - elapsed > total * REMAINDER_EPS {
            if outcome.substeps >= self.config.max_substeps {
                log::warn!(
                    "substep cap {} reached with {:.3e} s of {:.3e} s left",
                    self.config.max_substeps,
                    total - elapsed,
                    total
                );
                return Err(DiskError::MassBudgetViolation {
                    error_percent: outcome.budget.error_percent,
                    tolerance_percent: tolerance,
                    halvings: outcome.halvings,
                    dt_seconds: h,
                });
            }
            h = h.min(total - elapsed);

            let mut retries = 0;
            let (trial, combined) = loop {
                let trial = substep(&current, inputs, h)?;
                let combined = outcome.budget.chain(&trial.budget);
                match step_control(&trial.budget, &combined, tolerance) {
                    StepControl::Accept => break (trial, combined),
                    StepControl::Saturated => {
                        log::trace!(
                            "running budget error {:.3e}% saturated after {:.3e} of {:.3e} s",
                            combined.error_percent,
                            elapsed,
                            total
                        );
                        return Err(DiskError::MassBudgetViolation {
                            error_percent: combined.error_percent,
                            tolerance_percent: tolerance,
                            halvings: outcome.halvings,
                            dt_seconds: h,
                        });
                    }
                    StepControl::Halve => {}
                }
                if retries >= self.config.max_halvings {
                    return Err(DiskError::MassBudgetViolation {
                        error_percent: trial.budget.error_percent.max(combined.error_percent),
                        tolerance_percent: tolerance,
                        halvings: outcome.halvings,
                        dt_seconds: h,
                    });
                }
                log::trace!(
                    "budget error {:.3e}% (running {:.3e}%) at dt = {:.3e} s, halving",
                    trial.budget.error_percent,
                    combined.error_percent,
                    h
                );
                h *= 0.5;
                retries += 1;
                outcome.halvings += 1;
            };

            outcome.budget = combined;
            outcome.max_substep_error_percent = outcome.max_substep_error_percent.max(trial.budget.error_percent);
            outcome.blowout_mass += trial.blowout_mass;
            outcome.floor_mass += trial.floor_mass;
            outcome.sink_mass += trial.sink_mass;
            outcome.source_mass += trial.source_mass;
            outcome.fragment_blowout_mass += trial.fragment_blowout_mass;
            outcome.substeps += 1;
            current = trial.psd;
            elapsed += h;
            h = next_substep(h, retries, total);
        }

        log::debug!(
            "solver step dt = {:.3e} s: {} substeps, {} halvings, budget error {:.3e}%",
            total,
            outcome.substeps,
            outcome.halvings,
            outcome.budget.error_percent
        );
        *psd = current;
        Ok(outcome)
    }
}

fn substep(psd: &ParticleSizeDistribution, inputs: &StepInputs<'_>, h: f64) -> DiskResult<Substep> {
    let n_bins = psd.n_bins();
    let number = DVector::from_column_slice(psd.number());
    let masses = DVector::from_column_slice(psd.masses());
    let source = DVector::from_column_slice(inputs.source);
    let sinks = DVector::from_column_slice(inputs.sink_rates);
    let blowout = DVector::from_column_slice(inputs.blowout_rates);

    let (loss, gain) = match inputs.collisions {
        Some((kernel, fragments)) => (
            DVector::from_vec(kernel.loss_rates(number.as_slice())),
            DVector::from_vec(fragments.gain(kernel, number.as_slice())),
        ),
        None => (DVector::zeros(n_bins), DVector::zeros(n_bins)),
    };

    let implicit = &loss + &sinks + &blowout;
    let explicit = &number + (&gain + &source) * h;
    let next = explicit.zip_map(&implicit, |num, rate| num / (1.0 + h * rate));

    let blowout_mass = h * next.component_mul(&blowout).dot(&masses);
    let sink_mass = h * next.component_mul(&sinks).dot(&masses);
    let source_mass = h * source.dot(&masses);
    let fragment_blowout_mass = h * gain
        .iter()
        .zip(blowout.iter())
        .zip(masses.iter())
        .filter(|((_, b), _)| **b > 0.0)
        .map(|((g, _), m)| g * m)
        .sum::<f64>();

    let mut trial = psd.clone();
    trial.set_number(next.as_slice().to_vec())?;
    let report = trial.sanitize();
    let floor_mass = report.floor_mass_removed;

    let initial = psd.total_mass().to_kg_per_m2();
    let budget = MassBudget::new(
        initial,
        source_mass,
        blowout_mass + floor_mass + sink_mass,
        trial.total_mass().to_kg_per_m2(),
    );

    Ok(Substep {
        psd: trial,
        budget,
        blowout_mass: blowout_mass + floor_mass,
        floor_mass,
        sink_mass,
        source_mass,
        fragment_blowout_mass,
    })
}
