//! Proptest strategies for geometric primitives.
use crate::{ConvexPolygon, HalfPlane};
use nalgebra::{Point2, Unit, Vector2};
use proptest::prelude::*;

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Pick a reasonably small range to pick coordinates from,
    // otherwise we can easily get floating point numbers that are
    // so ridiculously large as to break anything we might want to do with them
    let range = -10.0..10.0;
    [range.clone(), range.clone()].prop_map(|[x, y]| Point2::new(x, y))
}

pub fn unit_vector2() -> impl Strategy<Value = Unit<Vector2<f64>>> {
    (0.0..std::f64::consts::TAU).prop_map(|angle| Unit::new_unchecked(Vector2::new(angle.cos(), angle.sin())))
}

pub fn half_plane() -> impl Strategy<Value = HalfPlane<f64>> {
    (point2(), unit_vector2()).prop_map(|(point, normal)| HalfPlane::from_point_and_normal(point, normal))
}

/// A strategy for non-degenerate convex polygons with counter-clockwise winding.
///
/// The polygons are regular `n`-gons with random center, radius and rotation, which is
/// sufficient to exercise clipping code paths without risking accidentally concave input.
pub fn convex_polygon(max_vertices: usize) -> impl Strategy<Value = ConvexPolygon<f64>> {
    assert!(max_vertices >= 3);
    (3..=max_vertices, point2(), 0.1..5.0, 0.0..std::f64::consts::TAU).prop_map(|(n, center, radius, rotation)| {
        let vertices = (0..n)
            .map(|i| {
                let angle = rotation + std::f64::consts::TAU * (i as f64) / (n as f64);
                center + radius * Vector2::new(angle.cos(), angle.sin())
            })
            .collect();
        ConvexPolygon::from_vertices(vertices)
    })
}
