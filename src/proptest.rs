use crate::mesh::procedural::create_rectangular_uniform_quad_mesh_2d;
use crate::mesh::QuadMesh2d;
use ::proptest::prelude::*;
use nalgebra::{Point2, Rotation2, Vector2};
use std::ops::Range;

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Pick a reasonably small range to pick coordinates from,
    // otherwise we can easily get floating point numbers that are
    // so ridiculously large as to break anything we might want to do with them
    let range = -10.0..10.0;
    [range.clone(), range].prop_map(|[x, y]| Point2::new(x, y))
}

/// Strategy producing uniform quad meshes of a rotated square.
///
/// The square has a side length drawn from `side_lengths`, an arbitrary orientation
/// and a center drawn from `[-max_center_distance, max_center_distance]^2`, which
/// lets callers bound the generated geometry to a fixed background domain.
pub fn rotated_square_quad_mesh_strategy(
    side_lengths: Range<f64>,
    max_center_distance: f64,
    cells_per_dim: usize,
) -> impl Strategy<Value = QuadMesh2d<f64>> {
    let center_range = -max_center_distance..=max_center_distance;
    (
        side_lengths,
        0.0..std::f64::consts::FRAC_PI_2,
        [center_range.clone(), center_range],
    )
        .prop_map(move |(side, angle, [x, y])| {
            let mut mesh = create_rectangular_uniform_quad_mesh_2d(
                side,
                1,
                1,
                cells_per_dim,
                &Vector2::new(-0.5 * side, 0.5 * side),
            );
            let rotation = Rotation2::new(angle);
            let center = Vector2::new(x, y);
            mesh.transform_vertices(|p| *p = rotation * *p + center);
            mesh
        })
}
