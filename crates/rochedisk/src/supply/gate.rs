//! Supply gate: decides whether, and how much, external supply reaches the
//! surface layer each step.
//!
//! The gate is closed on the first step, while the disk is liquid-dominated,
//! when supply is disabled, and once a finite reservoir has run dry. When
//! open, the raw rate law is scaled by the mixing efficiency ε_mix, the
//! temperature factor, a linear ramp-in and the reservoir taper. An optional
//! deep reservoir buffers production and releases it on the mixing time
//! t_mix. Finally the τ = 1 headroom policy may limit what lands.

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Length, MassFlux, SurfaceDensity, Temperature, Time};

use super::injection::InjectionPolicy;
use super::rate::{Depletion, FiniteReservoir, SupplyRate, TemperatureScaling};
use crate::drivers::PhaseDecision;
use crate::error::{DiskError, DiskResult};

// =============================================================================
// Configuration
// =============================================================================

/// Behaviour when supply would push Σ past Σ_τ=1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum HeadroomPolicy {
    /// Supply is never limited
    #[default]
    Off,
    /// Supply is limited to the headroom; the excess stays upstream
    Clip,
    /// Supply is limited to the headroom; the excess is lost and booked
    Spill,
}

/// Buffer between production and the surface layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct DeepMixing {
    /// e-folding time of the transfer to the surface (s)
    pub t_mix_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct SupplyConfig {
    pub enabled: bool,
    pub rate: SupplyRate,
    /// Mixing efficiency ε_mix ∈ [0, 1]
    pub epsilon_mix: f64,
    pub temperature_scaling: TemperatureScaling,
    pub reservoir: FiniteReservoir,
    /// Linear ramp-in after the gate opens (s); zero disables the ramp
    pub ramp_s: f64,
    pub deep_mixing: Option<DeepMixing>,
    pub injection: InjectionPolicy,
    /// Keep the gate shut on step 0
    pub delay_first_step: bool,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: SupplyRate::default(),
            epsilon_mix: 0.05,
            temperature_scaling: TemperatureScaling::default(),
            reservoir: FiniteReservoir::default(),
            ramp_s: 0.0,
            deep_mixing: None,
            injection: InjectionPolicy::default(),
            delay_first_step: true,
        }
    }
}

impl SupplyConfig {
    pub fn validate(&self) -> DiskResult<()> {
        if !(0.0..=1.0).contains(&self.epsilon_mix) {
            return Err(DiskError::configuration(
                "supply.epsilon_mix",
                "mixing efficiency must lie within [0, 1]",
            ));
        }
        if !(self.ramp_s.is_finite() && self.ramp_s >= 0.0) {
            return Err(DiskError::configuration("supply.ramp_s", "must be finite and non-negative"));
        }
        if let Some(deep) = self.deep_mixing {
            if !(deep.t_mix_s.is_finite() && deep.t_mix_s > 0.0) {
                return Err(DiskError::configuration(
                    "supply.deep_mixing.t_mix_s",
                    "must be positive and finite",
                ));
            }
        }
        if let Some(total) = self.reservoir.mass_total_kg_m2 {
            if !(total.is_finite() && total >= 0.0) {
                return Err(DiskError::configuration(
                    "supply.reservoir.mass_total_kg_m2",
                    "must be finite and non-negative",
                ));
            }
        }
        if let Depletion::Taper { fraction } = self.reservoir.depletion {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(DiskError::configuration(
                    "supply.reservoir.depletion.fraction",
                    "taper fraction must lie within (0, 1]",
                ));
            }
        }
        let scaling = &self.temperature_scaling;
        if scaling.enabled && !(scaling.reference_k > 0.0 && scaling.floor <= scaling.cap) {
            return Err(DiskError::configuration(
                "supply.temperature_scaling",
                "need reference_k > 0 and floor <= cap",
            ));
        }
        self.rate.validate()?;
        self.injection.validate()
    }
}

// =============================================================================
// Gate state
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    StepZeroDelay,
    LiquidDominated,
    Disabled,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    Blocked { reason: BlockReason },
    Open,
    /// Open, but limited by the τ = 1 headroom with the excess kept upstream
    Clipped,
    /// Open, but limited by the τ = 1 headroom with the excess lost
    Spilled,
}

impl GateState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Blocked { .. })
    }
}

/// Per-step inputs from the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyContext {
    pub step_index: u64,
    pub dt: Time,
    pub temperature: Temperature,
    /// Σ_τ=1 − Σ when known
    pub headroom: Option<SurfaceDensity>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyOutcome {
    /// Rate reaching the surface layer
    pub injected_rate: MassFlux,
    /// Rate diverted by [`HeadroomPolicy::Spill`]
    pub spilled_rate: MassFlux,
    /// Rate produced this step after mixing, before buffering and headroom
    pub production_rate: MassFlux,
    pub gate: GateState,
}

impl SupplyOutcome {
    fn blocked(reason: BlockReason) -> Self {
        Self {
            injected_rate: MassFlux::zero(),
            spilled_rate: MassFlux::zero(),
            production_rate: MassFlux::zero(),
            gate: GateState::Blocked { reason },
        }
    }
}

/// Persistent supply bookkeeping (kg/m² and s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct SupplyState {
    pub injected_rate: f64,
    pub gate: GateState,
    pub deep_reservoir_mass: f64,
    /// `None` for an unlimited supply
    pub reservoir_remaining: Option<f64>,
    /// Time the gate last opened
    pub open_since_s: Option<f64>,
    pub cumulative_produced: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplyGate {
    config: SupplyConfig,
    headroom: HeadroomPolicy,
    state: SupplyState,
}

impl SupplyGate {
    pub fn new(config: SupplyConfig, headroom: HeadroomPolicy) -> DiskResult<Self> {
        config.validate()?;
        let state = SupplyState {
            injected_rate: 0.0,
            gate: GateState::Blocked {
                reason: if config.enabled {
                    BlockReason::StepZeroDelay
                } else {
                    BlockReason::Disabled
                },
            },
            deep_reservoir_mass: 0.0,
            reservoir_remaining: config.reservoir.mass_total_kg_m2,
            open_since_s: None,
            cumulative_produced: 0.0,
        };
        Ok(Self {
            config,
            headroom,
            state,
        })
    }

    pub fn config(&self) -> &SupplyConfig {
        &self.config
    }

    pub fn state(&self) -> &SupplyState {
        &self.state
    }

    fn block_reason(&self, phase: &PhaseDecision, step_index: u64) -> Option<BlockReason> {
        if !self.config.enabled {
            Some(BlockReason::Disabled)
        } else if self.config.delay_first_step && step_index == 0 {
            Some(BlockReason::StepZeroDelay)
        } else if phase.is_liquid_dominated() {
            Some(BlockReason::LiquidDominated)
        } else if self.state.reservoir_remaining.is_some_and(|r| r <= 0.0) {
            Some(BlockReason::Exhausted)
        } else {
            None
        }
    }

    /// Evaluate the supply for the step starting at `time`.
    ///
    /// Advances the finite and deep reservoirs by `ctx.dt`; a zero `dt`
    /// reports rates without touching either reservoir.
    pub fn evaluate(
        &mut self,
        time: Time,
        radius: Length,
        phase: &PhaseDecision,
        ctx: &SupplyContext,
    ) -> DiskResult<SupplyOutcome> {
        let dt = ctx.dt.to_seconds();
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(DiskError::invalid_input("dt", dt, "must be finite and non-negative"));
        }
        let t = time.to_seconds();

        if let Some(reason) = self.block_reason(phase, ctx.step_index) {
            self.state.open_since_s = None;
            return Ok(self.finish(SupplyOutcome::blocked(reason)));
        }
        let open_since = *self.state.open_since_s.get_or_insert(t);

        // Production after mixing and the multiplicative factors
        let mut production = self.config.rate.raw(time, radius) * self.config.epsilon_mix;
        production *= self.config.temperature_scaling.factor(ctx.temperature);
        if self.config.ramp_s > 0.0 {
            production *= ((t + dt - open_since) / self.config.ramp_s).clamp(0.0, 1.0);
        }
        if let Some(remaining) = self.state.reservoir_remaining {
            production *= self.config.reservoir.taper_factor(remaining);
        }
        let mut production = if production.is_finite() { production.max(0.0) } else { 0.0 };

        if dt > 0.0 {
            if let Some(remaining) = self.state.reservoir_remaining.as_mut() {
                let drawn = (production * dt).min(*remaining);
                *remaining -= drawn;
                production = drawn / dt;
            }
            self.state.cumulative_produced += production * dt;
        }

        // Deep reservoir buffering
        let mut surface_rate = match self.config.deep_mixing {
            Some(DeepMixing { t_mix_s }) if dt > 0.0 => {
                let buffered = self.state.deep_reservoir_mass + production * dt;
                let released = buffered * (1.0 - (-dt / t_mix_s).exp());
                self.state.deep_reservoir_mass = buffered - released;
                released / dt
            }
            Some(DeepMixing { t_mix_s }) => self.state.deep_reservoir_mass / t_mix_s,
            None => production,
        };

        let mut gate = GateState::Open;
        let mut spilled = 0.0;
        let limit = ctx.headroom.filter(|_| dt > 0.0 && self.headroom != HeadroomPolicy::Off);
        if let Some(headroom) = limit {
            let allowed = headroom.to_kg_per_m2().max(0.0) / dt;
            if surface_rate > allowed {
                let excess = surface_rate - allowed;
                surface_rate = allowed;
                if self.headroom == HeadroomPolicy::Clip {
                    gate = GateState::Clipped;
                    self.return_upstream(excess * dt);
                } else {
                    gate = GateState::Spilled;
                    spilled = excess;
                }
            }
        }

        Ok(self.finish(SupplyOutcome {
            injected_rate: MassFlux::from_kg_per_m2_s(surface_rate),
            spilled_rate: MassFlux::from_kg_per_m2_s(spilled),
            production_rate: MassFlux::from_kg_per_m2_s(production),
            gate,
        }))
    }

    /// Hand clipped mass back to whichever reservoir produced it.
    fn return_upstream(&mut self, mass: f64) {
        if self.config.deep_mixing.is_some() {
            self.state.deep_reservoir_mass += mass;
        } else if let Some(remaining) = self.state.reservoir_remaining.as_mut() {
            *remaining += mass;
            self.state.cumulative_produced -= mass;
        } else {
            self.state.cumulative_produced -= mass;
        }
    }

    fn finish(&mut self, outcome: SupplyOutcome) -> SupplyOutcome {
        if outcome.gate != self.state.gate {
            log::info!("supply gate {:?} -> {:?}", self.state.gate, outcome.gate);
        }
        self.state.gate = outcome.gate;
        self.state.injected_rate = outcome.injected_rate.to_kg_per_m2_s();
        outcome
    }
}
