use crate::surface_density::SurfaceDensity;

/// Mass opacity (cross-section per unit mass) in m²/kg.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Opacity(f64);

impl Opacity {
    pub fn from_m2_per_kg(value: f64) -> Self {
        Self(value)
    }

    pub fn from_cm2_per_gram(value: f64) -> Self {
        Self(value * 0.1)
    }

    pub fn to_m2_per_kg(&self) -> f64 {
        self.0
    }

    pub fn to_cm2_per_gram(&self) -> f64 {
        self.0 * 10.0
    }

    /// Optical depth κΣ of a column.
    ///
    /// ```rust
    /// use units::{Opacity, SurfaceDensity};
    ///
    /// let kappa = Opacity::from_m2_per_kg(250.0);
    /// let tau = kappa.optical_depth(SurfaceDensity::from_kg_per_m2(0.004));
    /// assert!((tau - 1.0).abs() < 1e-12);
    /// ```
    pub fn optical_depth(&self, column: SurfaceDensity) -> f64 {
        self.0 * column.to_kg_per_m2()
    }
}
