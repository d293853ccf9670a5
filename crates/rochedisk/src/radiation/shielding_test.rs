//! Tests for self-shielding.

use approx::assert_relative_eq;
use units::Opacity;

use crate::radiation::*;

#[test]
fn effective_opacity_clamps_phi() {
    let kappa = Opacity::from_m2_per_kg(200.0);
    let half = effective_opacity(kappa, 1.0, &ConstantShielding(0.5));
    assert_relative_eq!(half.to_m2_per_kg(), 100.0);

    let over = effective_opacity(kappa, 1.0, &ConstantShielding(3.0));
    assert_relative_eq!(over.to_m2_per_kg(), 200.0);

    let off = effective_opacity(kappa, 1.0, &ShieldingModel::Off);
    assert_relative_eq!(off.to_m2_per_kg(), 200.0);
}

#[test]
fn tau_unity_column_is_inverse_opacity() {
    let sigma = tau_unity_column(Opacity::from_m2_per_kg(250.0)).unwrap();
    assert_relative_eq!(sigma.to_kg_per_m2(), 4.0e-3);
    assert!(tau_unity_column(Opacity::from_m2_per_kg(0.0)).is_none());
    assert!(tau_unity_column(Opacity::from_m2_per_kg(f64::NAN)).is_none());
}

#[test]
fn tabulated_phi_interpolates_and_holds_ends() {
    let table = TabulatedShielding::new(vec![0.0, 1.0, 3.0], vec![1.0, 0.5, 0.1]).unwrap();
    assert_relative_eq!(table.phi(0.5), 0.75);
    assert_relative_eq!(table.phi(2.0), 0.3);
    assert_relative_eq!(table.phi(-1.0), 1.0);
    assert_relative_eq!(table.phi(10.0), 0.1);

    let model = ShieldingModel::Table {
        tau: vec![0.0, 1.0, 3.0],
        phi: vec![1.0, 0.5, 0.1],
    };
    assert_relative_eq!(model.phi(2.0), table.phi(2.0));
}

#[test]
fn shielding_validation() {
    assert!(TabulatedShielding::new(vec![], vec![]).is_err());
    assert!(TabulatedShielding::new(vec![0.0, 0.0], vec![1.0, 1.0]).is_err());
    assert!(ShieldingModel::Constant { phi: 1.5 }.validate().is_err());
    assert!(ShieldingModel::Constant { phi: 0.3 }.validate().is_ok());
    assert!(ShieldingModel::Table {
        tau: vec![0.0],
        phi: vec![1.0, 2.0]
    }
    .validate()
    .is_err());
}

#[test]
fn line_of_sight_factor() {
    let los = LineOfSight::AspectRatio {
        h_over_r: 0.05,
        path_multiplier: 1.0,
    };
    assert_relative_eq!(los.factor(), 20.0);
    assert_eq!(LineOfSight::Vertical.factor(), 1.0);
    assert_eq!(LineOfSight::default().factor(), 1.0);
}
