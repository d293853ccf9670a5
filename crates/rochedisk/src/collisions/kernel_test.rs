//! Tests for the collision-rate kernel.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use units::{Length, Velocity};

use crate::collisions::{CollisionKernel, RelativeVelocity, ScaleHeightMode};
use crate::constants::MIN_SCALE_HEIGHT;
use crate::error::DiskError;
use crate::grid::SizeGrid;

fn grid() -> SizeGrid {
    SizeGrid::build(Length::from_meters(1e-6), Length::from_meters(1e-3), 12).unwrap()
}

fn speed() -> RelativeVelocity {
    RelativeVelocity::Scalar(Velocity::from_meters_per_sec(500.0))
}

#[test]
fn kernel_is_symmetric_with_self_pair_correction() {
    let g = grid();
    let h = 1.0e3;
    let kernel = CollisionKernel::build_uniform(&g, &speed(), h).unwrap();
    let c = kernel.matrix();

    for i in 0..g.n_bins() {
        for j in 0..g.n_bins() {
            assert_eq!(c[(i, j)], c[(j, i)]);
        }
    }

    let s = g.centers();
    let h_ij = (2.0_f64).sqrt() * h;
    let off = PI * (s[0] + s[1]).powi(2) * 500.0 / ((2.0 * PI).sqrt() * h_ij);
    let diag = PI * (2.0 * s[0]).powi(2) * 500.0 / ((2.0 * PI).sqrt() * h_ij * 2.0);
    assert_relative_eq!(c[(0, 1)], off, max_relative = 1e-12);
    assert_relative_eq!(c[(0, 0)], diag, max_relative = 1e-12);
}

#[test]
fn invalid_geometry_is_rejected() {
    let g = grid();
    assert!(matches!(
        CollisionKernel::build_uniform(&g, &speed(), 0.0),
        Err(DiskError::Geometry { .. })
    ));
    assert!(matches!(
        CollisionKernel::build_uniform(&g, &speed(), f64::NAN),
        Err(DiskError::Geometry { .. })
    ));
    assert!(matches!(
        CollisionKernel::build_uniform(
            &g,
            &RelativeVelocity::Scalar(Velocity::from_meters_per_sec(-1.0)),
            1.0
        ),
        Err(DiskError::Geometry { .. })
    ));
    assert!(matches!(
        CollisionKernel::build_uniform(&g, &RelativeVelocity::PerPair(DMatrix::zeros(3, 3)), 1.0),
        Err(DiskError::Geometry { .. })
    ));
    assert!(matches!(
        CollisionKernel::build(&g, &speed(), &[1.0; 3]),
        Err(DiskError::Geometry { .. })
    ));
}

#[test]
fn per_pair_velocity_matrix_is_used() {
    let g = grid();
    let n = g.n_bins();
    let mut v = DMatrix::from_element(n, n, 100.0);
    v[(2, 3)] = 400.0;
    v[(3, 2)] = 400.0;
    let scalar = CollisionKernel::build_uniform(&g, &RelativeVelocity::Scalar(Velocity::from_meters_per_sec(100.0)), 10.0).unwrap();
    let per_pair = CollisionKernel::build_uniform(&g, &RelativeVelocity::PerPair(v), 10.0).unwrap();

    assert_relative_eq!(per_pair.matrix()[(2, 3)], 4.0 * scalar.matrix()[(2, 3)], max_relative = 1e-12);
    assert_relative_eq!(per_pair.matrix()[(0, 1)], scalar.matrix()[(0, 1)], max_relative = 1e-12);
}

#[test]
fn collision_time_scales_inversely_with_column_density() {
    let g = grid();
    let kernel = CollisionKernel::build_uniform(&g, &speed(), 1.0e3).unwrap();
    let sparse = vec![1.0e6; g.n_bins()];
    let dense: Vec<f64> = sparse.iter().map(|n| n * 10.0).collect();

    let t_sparse = kernel.collision_times(&sparse);
    let t_dense = kernel.collision_times(&dense);
    for (a, b) in t_sparse.iter().zip(&t_dense) {
        assert!(b < a);
        assert_relative_eq!(a / b, 10.0, max_relative = 1e-12);
    }

    let min_sparse = kernel.minimum_collision_time(&sparse).unwrap();
    let min_dense = kernel.minimum_collision_time(&dense).unwrap();
    assert_relative_eq!(min_sparse / min_dense, 10.0, max_relative = 1e-12);
}

#[test]
fn loss_rate_counts_self_pair_twice() {
    let g = grid();
    let kernel = CollisionKernel::build_uniform(&g, &speed(), 1.0e3).unwrap();
    let mut number = vec![0.0; g.n_bins()];
    number[4] = 1.0e7;
    let loss = kernel.loss_rates(&number);
    assert_relative_eq!(loss[4], 2.0 * kernel.matrix()[(4, 4)] * 1.0e7, max_relative = 1e-12);
    assert_relative_eq!(loss[0], kernel.matrix()[(0, 4)] * 1.0e7, max_relative = 1e-12);
}

#[test]
fn empty_population_never_collides() {
    let g = grid();
    let kernel = CollisionKernel::build_uniform(&g, &speed(), 1.0e3).unwrap();
    let number = vec![0.0; g.n_bins()];
    assert!(kernel.collision_times(&number).iter().all(|t| t.is_infinite()));
    assert!(kernel.minimum_collision_time(&number).is_none());
}

#[test]
fn scale_height_is_clamped() {
    let r = Length::from_mars_radii(2.0);
    let fixed = ScaleHeightMode::FixedAspect { h_over_a: 0.0 };
    assert_eq!(fixed.scale_height(0.1, r), MIN_SCALE_HEIGHT);

    let scaled = ScaleHeightMode::InclinationScaled { h_factor: 2.0 };
    assert_relative_eq!(scaled.scale_height(0.05, r), 2.0 * 0.05 * r.to_m(), max_relative = 1e-12);
    assert!(scaled.scale_height(0.0, r) >= MIN_SCALE_HEIGHT);
}
