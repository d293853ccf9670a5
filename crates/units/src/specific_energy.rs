use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul};

/// 1 erg/g = 1e-7 J / 1e-3 kg = 1e-4 J/kg
pub const ERG_PER_GRAM_TO_J_PER_KG: f64 = 1.0e-4;

/// Energy per unit mass, in J/kg.
///
/// Catastrophic-disruption thresholds Q*_D and the specific impact energy
/// Q_R of a collision are both specific energies. Laboratory fits are
/// usually quoted in erg/g.
///
/// # Examples
///
/// ```rust
/// use units::SpecificEnergy;
///
/// let q = SpecificEnergy::from_erg_per_gram(1.0e7);
/// assert!((q.to_j_per_kg() - 1.0e3).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SpecificEnergy(f64); // Base unit: J/kg

impl SpecificEnergy {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_j_per_kg(value: f64) -> Self {
        Self(value)
    }

    pub fn from_erg_per_gram(value: f64) -> Self {
        Self(value * ERG_PER_GRAM_TO_J_PER_KG)
    }

    pub fn to_j_per_kg(&self) -> f64 {
        self.0
    }

    pub fn to_erg_per_gram(&self) -> f64 {
        self.0 / ERG_PER_GRAM_TO_J_PER_KG
    }
}

impl Add for SpecificEnergy {
    type Output = SpecificEnergy;

    fn add(self, rhs: SpecificEnergy) -> SpecificEnergy {
        SpecificEnergy(self.0 + rhs.0)
    }
}

impl Mul<f64> for SpecificEnergy {
    type Output = SpecificEnergy;

    fn mul(self, rhs: f64) -> SpecificEnergy {
        SpecificEnergy(self.0 * rhs)
    }
}

/// Ratio of two specific energies, e.g. Q_R / Q*_D
impl Div for SpecificEnergy {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}
