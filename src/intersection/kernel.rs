//! The exact narrow-phase intersection kernel.
//!
//! The kernel operates on cell geometries rather than on finite elements: the broad
//! phase and the coupling assemblers only need a quadrature rule over the intersection
//! of a pair of cells, and that is a purely geometric quantity.
use crate::geometry::{ConvexPolygon, LineSegment2d, Triangle2d};
use crate::quadrature::{
    gauss_num_points_for_strength, map_rule_to_triangle, map_univariate_rule_to_segment, simplex, univariate,
    QuadraturePair2d,
};
use crate::Real;

/// A cell geometry that can be intersected with a convex polygon, producing a
/// quadrature rule over the intersection.
pub trait CellIntersection<T>
where
    T: Real,
{
    /// The intrinsic dimension of the cell, which determines the measure used for
    /// the intersection: area for two-dimensional cells, arc length for
    /// one-dimensional cells.
    const DIMENSION: usize;

    /// Computes a quadrature rule over the intersection of this cell with the given
    /// convex polygon.
    ///
    /// The rule integrates polynomials up to the given total degree exactly over the
    /// intersection, with points in physical coordinates and weights that sum to the
    /// measure of the intersection. Returns `None` if the measure of the intersection
    /// does not exceed `tolerance`, so that cells which merely touch produce no rule.
    fn intersection_quadrature(
        &self,
        polygon: &ConvexPolygon<T>,
        strength: usize,
        tolerance: T,
    ) -> Option<QuadraturePair2d<T>>;
}

impl<T> CellIntersection<T> for ConvexPolygon<T>
where
    T: Real,
{
    const DIMENSION: usize = 2;

    fn intersection_quadrature(
        &self,
        polygon: &ConvexPolygon<T>,
        strength: usize,
        tolerance: T,
    ) -> Option<QuadraturePair2d<T>> {
        let intersection = self.intersect_polygon(polygon);
        if intersection.area() <= tolerance {
            return None;
        }

        let reference_rule = simplex::triangle_gauss(strength);

        let mut weights = Vec::new();
        let mut points = Vec::new();
        for triangle in intersection.triangulate() {
            // Clipping can produce (nearly) coincident vertices, whose fan triangles
            // carry no area and no information
            if triangle.area() == T::zero() {
                continue;
            }
            let (triangle_weights, triangle_points) = map_rule_to_triangle(&triangle, &reference_rule);
            weights.extend(triangle_weights);
            points.extend(triangle_points);
        }

        Some((weights, points))
    }
}

impl<T> CellIntersection<T> for Triangle2d<T>
where
    T: Real,
{
    const DIMENSION: usize = 2;

    /// The triangle is assumed to wind counter-clockwise.
    fn intersection_quadrature(
        &self,
        polygon: &ConvexPolygon<T>,
        strength: usize,
        tolerance: T,
    ) -> Option<QuadraturePair2d<T>> {
        ConvexPolygon::from(self.clone()).intersection_quadrature(polygon, strength, tolerance)
    }
}

impl<T> CellIntersection<T> for LineSegment2d<T>
where
    T: Real,
{
    const DIMENSION: usize = 1;

    fn intersection_quadrature(
        &self,
        polygon: &ConvexPolygon<T>,
        strength: usize,
        tolerance: T,
    ) -> Option<QuadraturePair2d<T>> {
        let clipped = self.intersect_polygon(polygon)?;
        if clipped.length() <= tolerance {
            return None;
        }

        let reference_rule = univariate::gauss(gauss_num_points_for_strength(strength));
        Some(map_univariate_rule_to_segment(&clipped, &reference_rule))
    }
}
