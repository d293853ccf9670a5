//! Catastrophic-disruption threshold Q*_D.
//!
//! # Physics
//!
//! The specific energy needed to disperse half the target mass follows a
//! two-regime fit: material strength dominates for small bodies and
//! self-gravity for large ones,
//!
//! ```text
//! Q*_D(s, ρ) = Q_s s^(-a_s) + B ρ s^(b_g)
//! ```
//!
//! Coefficient sets are tabulated at reference impact speeds. Between rows
//! the two evaluations are interpolated linearly in speed; outside the table
//! a [`VelocityExtrapolation`] strategy applies.
//!
//! # References
//! - Benz & Asphaug (1999) - "Catastrophic disruptions revisited"
//! - Leinhardt & Stewart (2012) - "Collisions between gravity-dominated bodies"

use serde::{Deserialize, Serialize};
#[cfg(feature = "tsify")]
use tsify_next::Tsify;
use units::{Density, Length, SpecificEnergy, Velocity};

use crate::error::{ensure_positive, DiskError, DiskResult};

/// One row of the reference-velocity table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
pub struct QStarCoefficients {
    /// Reference impact speed (km/s)
    pub velocity_km_s: f64,
    /// Strength-regime normalization
    pub qs: f64,
    /// Strength-regime exponent
    pub a_s: f64,
    /// Gravity-regime normalization
    pub b: f64,
    /// Gravity-regime exponent
    pub b_g: f64,
}

impl QStarCoefficients {
    fn evaluate(&self, s: f64, rho: f64) -> f64 {
        self.qs * s.powf(-self.a_s) + self.b * rho * s.powf(self.b_g)
    }
}

/// Unit system the coefficients are stated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum CoefficientUnits {
    /// s in m, ρ in kg/m³, result in J/kg
    Si,
    /// s in cm, ρ in g/cm³, result in erg/g
    #[default]
    Ba99Cgs,
}

/// Behaviour outside the tabulated speed range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum VelocityExtrapolation {
    /// Use the nearest tabulated row
    #[default]
    Clamp,
    /// Q*(v) = Q*(v_edge) (v / v_edge)^exponent
    PowerLaw { exponent: f64 },
}

/// Velocity-tabulated Q*_D model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tsify", derive(Tsify))]
#[serde(default)]
pub struct DisruptionThreshold {
    pub table: Vec<QStarCoefficients>,
    pub coeff_units: CoefficientUnits,
    pub extrapolation: VelocityExtrapolation,
}

impl Default for DisruptionThreshold {
    /// Basalt coefficients at 3 and 5 km/s
    fn default() -> Self {
        Self {
            table: vec![
                QStarCoefficients {
                    velocity_km_s: 3.0,
                    qs: 3.5e7,
                    a_s: 0.38,
                    b: 0.3,
                    b_g: 1.36,
                },
                QStarCoefficients {
                    velocity_km_s: 5.0,
                    qs: 7.0e7,
                    a_s: 0.38,
                    b: 0.5,
                    b_g: 1.36,
                },
            ],
            coeff_units: CoefficientUnits::Ba99Cgs,
            extrapolation: VelocityExtrapolation::Clamp,
        }
    }
}

impl DisruptionThreshold {
    pub fn new(
        mut table: Vec<QStarCoefficients>,
        coeff_units: CoefficientUnits,
        extrapolation: VelocityExtrapolation,
    ) -> DiskResult<Self> {
        table.sort_by(|a, b| a.velocity_km_s.total_cmp(&b.velocity_km_s));
        let model = Self {
            table,
            coeff_units,
            extrapolation,
        };
        model.validate()?;
        Ok(model)
    }

    /// Check the table is usable: non-empty, positive and distinct speeds,
    /// finite coefficients.
    pub fn validate(&self) -> DiskResult<()> {
        if self.table.is_empty() {
            return Err(DiskError::configuration("qstar.table", "table is empty"));
        }
        for row in &self.table {
            ensure_positive("qstar.velocity_km_s", row.velocity_km_s)?;
            let finite = [row.qs, row.a_s, row.b, row.b_g].iter().all(|c| c.is_finite());
            if !finite {
                return Err(DiskError::configuration(
                    "qstar.table",
                    "coefficients must be finite",
                ));
            }
        }
        for w in self.table.windows(2) {
            if w[1].velocity_km_s <= w[0].velocity_km_s {
                return Err(DiskError::configuration(
                    "qstar.table",
                    "reference velocities must be strictly increasing",
                ));
            }
        }
        Ok(())
    }

    /// Q*_D for a body of radius `size` and bulk density `bulk_density`
    /// struck at `velocity`.
    ///
    /// # Errors
    /// [`DiskError::InvalidInput`] for non-positive size, density or speed;
    /// [`DiskError::Configuration`] for an empty table.
    pub fn evaluate(&self, size: Length, bulk_density: Density, velocity: Velocity) -> DiskResult<SpecificEnergy> {
        if self.table.is_empty() {
            return Err(DiskError::configuration("qstar.table", "table is empty"));
        }
        let s = ensure_positive("size", size.to_m())?;
        let rho = ensure_positive("bulk_density", bulk_density.to_kg_per_m3())?;
        let v = ensure_positive("velocity", velocity.to_km_per_sec())?;
        Ok(SpecificEnergy::from_j_per_kg(self.evaluate_si(s, rho, v)))
    }

    /// Unchecked evaluation in SI (s in m, ρ in kg/m³, v in km/s) → J/kg.
    /// NaN for an empty table.
    pub(crate) fn evaluate_si(&self, s_m: f64, rho_si: f64, v_km_s: f64) -> f64 {
        let (s, rho) = match self.coeff_units {
            CoefficientUnits::Si => (s_m, rho_si),
            CoefficientUnits::Ba99Cgs => (s_m * 1.0e2, rho_si * 1.0e-3),
        };
        let raw = self.raw_at_velocity(s, rho, v_km_s);
        match self.coeff_units {
            CoefficientUnits::Si => raw,
            CoefficientUnits::Ba99Cgs => SpecificEnergy::from_erg_per_gram(raw).to_j_per_kg(),
        }
    }

    fn raw_at_velocity(&self, s: f64, rho: f64, v: f64) -> f64 {
        let (Some(first), Some(last)) = (self.table.first(), self.table.last()) else {
            return f64::NAN;
        };

        if v <= first.velocity_km_s {
            return self.extrapolate(first, s, rho, v);
        }
        if v >= last.velocity_km_s {
            return self.extrapolate(last, s, rho, v);
        }

        let upper = self.table.partition_point(|row| row.velocity_km_s <= v);
        let lo = &self.table[upper - 1];
        let hi = &self.table[upper];
        let weight = (v - lo.velocity_km_s) / (hi.velocity_km_s - lo.velocity_km_s);
        lo.evaluate(s, rho) * (1.0 - weight) + hi.evaluate(s, rho) * weight
    }

    fn extrapolate(&self, edge: &QStarCoefficients, s: f64, rho: f64, v: f64) -> f64 {
        let q_edge = edge.evaluate(s, rho);
        match self.extrapolation {
            VelocityExtrapolation::Clamp => q_edge,
            VelocityExtrapolation::PowerLaw { exponent } => q_edge * (v / edge.velocity_km_s).powf(exponent),
        }
    }

    /// Hash-friendly identity of the table and strategy, for cache keys
    pub fn fingerprint(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mut mix = |bits: u64| h = (h ^ bits).wrapping_mul(0x0100_0000_01b3);
        for row in &self.table {
            for c in [row.velocity_km_s, row.qs, row.a_s, row.b, row.b_g] {
                mix(c.to_bits());
            }
        }
        mix(self.coeff_units as u64);
        match self.extrapolation {
            VelocityExtrapolation::Clamp => mix(0),
            VelocityExtrapolation::PowerLaw { exponent } => mix(exponent.to_bits()),
        }
        h
    }
}
