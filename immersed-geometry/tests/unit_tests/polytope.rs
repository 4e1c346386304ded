use immersed_geometry::proptest::{convex_polygon, half_plane, point2};
use immersed_geometry::{ConvexPolygon, HalfPlane, Line2d, LineSegment2d, Triangle};

use nalgebra::{point, Unit, Vector2};

use matrixcompare::assert_matrix_eq;
use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;

#[test]
fn half_plane_signed_distance_and_contains_point() {
    let x0 = point![1.0, -1.0];
    let n = Unit::new_normalize(Vector2::new(-1.0, 1.0));
    let half_plane = HalfPlane::from_point_and_normal(x0, n);

    // On the side the normal points towards
    {
        let x = point![-1.0, 1.0];
        let dist = half_plane.signed_distance_to_point(&x);
        assert_scalar_eq!(dist, 2.0 * 2.0f64.sqrt(), comp = abs, tol = 1e-12);
        assert!(!half_plane.contains_point(&x));
    }

    // On the opposite side
    {
        let x = point![2.0, -2.0];
        let dist = half_plane.signed_distance_to_point(&x);
        assert_scalar_eq!(dist, -2.0f64.sqrt(), comp = abs, tol = 1e-12);
        assert!(half_plane.contains_point(&x));
    }

    // On the boundary
    assert!(half_plane.contains_point(&x0));
}

#[test]
fn empty_polygon_intersect_halfplane() {
    let x0 = point![0.5, -1.0];
    let n = Unit::new_normalize(Vector2::new(0.3, -2.0));
    let empty = ConvexPolygon::<f64>::from_vertices(vec![]);

    let intersection = empty.intersect_halfplane(&HalfPlane::from_point_and_normal(x0, n));

    assert_eq!(empty, intersection);
}

#[test]
fn point_polygon_intersect_halfplane() {
    let x0 = point![1.0, -1.0];
    let n = Unit::new_normalize(Vector2::new(-1.0, 1.0));
    let half_plane = HalfPlane::from_point_and_normal(x0, n);

    // Point inside of half plane
    {
        let x = point![2.0, -2.0];
        let poly = ConvexPolygon::from_vertices(vec![x]);
        let intersection = poly.intersect_halfplane(&half_plane);
        assert_eq!(intersection, poly);
    }

    // Point outside of half plane
    {
        let x = point![-1.0, 1.0];
        let poly = ConvexPolygon::from_vertices(vec![x]);
        let intersection = poly.intersect_halfplane(&half_plane);
        assert_eq!(intersection, ConvexPolygon::from_vertices(vec![]));
    }
}

#[test]
fn line_line_intersection() {
    let line1 = Line2d::from_point_and_dir(point![0.0, -1.0], Vector2::new(1.0, 1.0).normalize());
    let line2 = Line2d::from_point_and_dir(point![-2.0, 2.0], Vector2::new(4.0, -2.0).normalize());

    let intersection = line1.intersect(&line2).expect("Intersection exists");

    assert_matrix_eq!(
        intersection.coords,
        point![4.0 / 3.0, 1.0 / 3.0].coords,
        comp = abs,
        tol = 1e-12
    );
}

#[test]
fn triangle_polygon_intersect_halfplane() {
    let triangle = ConvexPolygon::from_vertices(vec![point![0.0, 3.0], point![-2.0, 0.0], point![1.0, -1.0]]);

    // Only the vertex (1, -1) lies inside the half plane, so the intersection is the
    // clipped corner around it
    let halfplane =
        HalfPlane::from_point_and_normal(point![2.0, 2.0], Unit::new_normalize(Vector2::new(-4.0, 3.0)));

    let intersection = triangle.intersect_halfplane(&halfplane);

    let v = intersection.vertices();
    assert_eq!(v.len(), 3);
    assert_matrix_eq!(v[0].coords, point![0.0, -2.0 / 3.0].coords, comp = abs, tol = 1e-12);
    assert_matrix_eq!(v[1].coords, point![1.0, -1.0].coords, comp = abs, tol = 1e-12);
    assert_matrix_eq!(v[2].coords, point![0.6875, 0.25].coords, comp = abs, tol = 1e-12);

    // The clipped corner keeps its counter-clockwise winding
    assert!(intersection.signed_area() > 0.0);
}

#[test]
fn triangle_triangle_intersection() {
    let triangle1 = ConvexPolygon::from_vertices(vec![point![0.0, 3.0], point![-2.0, 0.0], point![1.0, -1.0]]);
    let triangle2 = ConvexPolygon::from_vertices(vec![point![-2.0, 1.0], point![-1.0, -1.0], point![2.0, 2.0]]);

    let intersection = triangle1.intersect_polygon(&triangle2);

    let v = intersection.vertices();
    assert_eq!(v.len(), 6);
    assert_matrix_eq!(v[0].coords, point![-1.2, 1.2].coords, comp = abs, tol = 1e-12);
    assert_matrix_eq!(
        v[1].coords,
        point![-1.714285714285714, 0.428571428571429].coords,
        comp = abs,
        tol = 1e-12
    );
    assert_matrix_eq!(v[2].coords, point![-1.4, -0.2].coords, comp = abs, tol = 1e-12);
    assert_matrix_eq!(v[3].coords, point![-0.5, -0.5].coords, comp = abs, tol = 1e-12);
    assert_matrix_eq!(v[4].coords, point![0.6, 0.6].coords, comp = abs, tol = 1e-12);
    assert_matrix_eq!(
        v[5].coords,
        point![0.352941176470588, 1.588235294117647].coords,
        comp = abs,
        tol = 1e-12
    );
}

#[test]
fn disjoint_polygons_intersect_to_empty() {
    let square1 = ConvexPolygon::from_vertices(vec![
        point![0.0, 0.0],
        point![1.0, 0.0],
        point![1.0, 1.0],
        point![0.0, 1.0],
    ]);
    let square2 = ConvexPolygon::from_vertices(vec![
        point![3.0, 0.0],
        point![4.0, 0.0],
        point![4.0, 1.0],
        point![3.0, 1.0],
    ]);

    let intersection = square1.intersect_polygon(&square2);
    assert_eq!(intersection.area(), 0.0);
    assert!(intersection.is_degenerate());
}

#[test]
fn edge_sharing_squares_intersect_to_degenerate_polygon() {
    let square1 = ConvexPolygon::from_vertices(vec![
        point![0.0, 0.0],
        point![1.0, 0.0],
        point![1.0, 1.0],
        point![0.0, 1.0],
    ]);
    let square2 = ConvexPolygon::from_vertices(vec![
        point![1.0, 0.0],
        point![2.0, 0.0],
        point![2.0, 1.0],
        point![1.0, 1.0],
    ]);

    // The squares overlap exactly on the shared edge x = 1, which has measure zero
    let intersection = square1.intersect_polygon(&square2);
    assert_eq!(intersection.area(), 0.0);
}

#[test]
fn polygon_signed_area() {
    let ccw_square = ConvexPolygon::from_vertices(vec![
        point![0.0, 0.0],
        point![2.0, 0.0],
        point![2.0, 1.0],
        point![0.0, 1.0],
    ]);
    assert_scalar_eq!(ccw_square.signed_area(), 2.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(ccw_square.area(), 2.0, comp = abs, tol = 1e-14);

    let cw_square = ConvexPolygon::from_vertices(vec![
        point![0.0, 1.0],
        point![2.0, 1.0],
        point![2.0, 0.0],
        point![0.0, 0.0],
    ]);
    assert_scalar_eq!(cw_square.signed_area(), -2.0, comp = abs, tol = 1e-14);

    for degenerate in [
        ConvexPolygon::<f64>::from_vertices(vec![]),
        ConvexPolygon::from_vertices(vec![point![1.0, 2.0]]),
        ConvexPolygon::from_vertices(vec![point![1.0, 2.0], point![3.0, 4.0]]),
    ] {
        assert_eq!(degenerate.signed_area(), 0.0);
        assert_eq!(degenerate.area(), 0.0);
    }
}

#[test]
fn polygon_contains_point() {
    let square = ConvexPolygon::from_vertices(vec![
        point![0.0, 0.0],
        point![1.0, 0.0],
        point![1.0, 1.0],
        point![0.0, 1.0],
    ]);

    assert!(square.contains_point(&point![0.5, 0.5]));
    // The polygon is closed, so boundary points are contained
    assert!(square.contains_point(&point![0.0, 0.0]));
    assert!(square.contains_point(&point![1.0, 0.5]));
    assert!(!square.contains_point(&point![1.5, 0.5]));
    assert!(!square.contains_point(&point![0.5, -0.1]));
}

#[test]
fn triangulate() {
    let a = point![2.0, 0.0];
    let b = point![6.0, 4.0];
    let c = point![4.0, 6.0];
    let d = point![1.0, 5.0];
    let e = point![1.0, 2.0];

    {
        // Empty
        let poly = ConvexPolygon::<f64>::from_vertices(Vec::new());
        assert!(poly.triangulate_into_vec().is_empty());
    }

    {
        // Point
        let poly = ConvexPolygon::from_vertices(vec![a]);
        assert!(poly.triangulate_into_vec().is_empty());
    }

    {
        // Line segment
        let poly = ConvexPolygon::from_vertices(vec![a, b]);
        assert!(poly.triangulate_into_vec().is_empty());
    }

    {
        // Triangle
        let poly = ConvexPolygon::from_vertices(vec![a, b, c]);
        assert_eq!(poly.triangulate_into_vec(), vec![Triangle([a, b, c])]);
    }

    {
        // Quad
        let poly = ConvexPolygon::from_vertices(vec![a, b, c, d]);
        assert_eq!(poly.triangulate_into_vec(), vec![Triangle([a, b, c]), Triangle([a, c, d])]);
    }

    {
        // Pentagon
        let poly = ConvexPolygon::from_vertices(vec![a, b, c, d, e]);
        assert_eq!(
            poly.triangulate_into_vec(),
            vec![Triangle([a, b, c]), Triangle([a, c, d]), Triangle([a, d, e])]
        )
    }
}

#[test]
fn line_segment_intersect_segment_parametric() {
    let segment1 = LineSegment2d::from_end_points(point![2.0, 3.0], point![3.0, 0.0]);
    let segment2 = LineSegment2d::from_end_points(point![3.0, 1.0], point![3.0, 4.0]);
    assert_eq!(segment1.intersect_segment_parametric(&segment2), None);
}

#[test]
fn line_segment_intersect_polygon() {
    let a = point![2.0, 3.0];
    let b = point![3.0, 0.0];
    let segment = LineSegment2d::from_end_points(a, b);

    let polygon = ConvexPolygon::from_vertices(vec![
        point![0.0, 1.0],
        point![3.0, 1.0],
        point![3.0, 4.0],
        point![0.0, 4.0],
    ]);

    let result = segment.intersect_polygon(&polygon).expect("Intersection is not empty");
    let expected_intersection = LineSegment2d::from_end_points(point![2.0, 3.0], point![8.0 / 3.0, 1.0]);

    // The line segment may be defined in two ways, but its midpoint and length uniquely
    // defines its shape
    assert_matrix_eq!(
        result.midpoint().coords,
        expected_intersection.midpoint().coords,
        comp = abs,
        tol = 1e-12
    );
    assert_scalar_eq!(result.length(), expected_intersection.length(), comp = abs, tol = 1e-12);
}

#[test]
fn line_segment_outside_polygon_intersects_to_none() {
    let segment = LineSegment2d::from_end_points(point![5.0, 5.0], point![6.0, 5.0]);
    let polygon = ConvexPolygon::from_vertices(vec![
        point![0.0, 0.0],
        point![1.0, 0.0],
        point![1.0, 1.0],
        point![0.0, 1.0],
    ]);
    assert!(segment.intersect_polygon(&polygon).is_none());
}

#[test]
fn line_segment_intersect_half_plane() {
    let half_plane = HalfPlane::from_point_and_normal(point![1.0, 0.0], Unit::new_normalize(Vector2::new(1.0, 0.0)));

    // Segment crossing the boundary
    {
        let segment = LineSegment2d::from_end_points(point![0.0, 1.0], point![2.0, 1.0]);
        let clipped = segment.intersect_half_plane(&half_plane).unwrap();
        assert_matrix_eq!(clipped.start().coords, point![0.0, 1.0].coords, comp = abs, tol = 1e-12);
        assert_matrix_eq!(clipped.end().coords, point![1.0, 1.0].coords, comp = abs, tol = 1e-12);
    }

    // Segment entirely inside
    {
        let segment = LineSegment2d::from_end_points(point![0.0, 0.0], point![0.5, 1.0]);
        let clipped = segment.intersect_half_plane(&half_plane).unwrap();
        assert_eq!(&clipped, &segment);
    }

    // Segment entirely outside
    {
        let segment = LineSegment2d::from_end_points(point![2.0, 0.0], point![3.0, 1.0]);
        assert!(segment.intersect_half_plane(&half_plane).is_none());
    }
}

proptest! {
    #[test]
    fn clipped_polygon_is_contained_in_half_plane(
        poly in convex_polygon(8),
        hp in half_plane()
    ) {
        let clipped = poly.intersect_halfplane(&hp);
        // Crossing vertices are computed with floating point arithmetic, so allow
        // a tolerance proportional to the coordinate range of the strategy
        for v in clipped.vertices() {
            prop_assert!(hp.signed_distance_to_point(v) <= 1e-9);
        }
        prop_assert!(clipped.area() <= poly.area() + 1e-9);
    }

    #[test]
    fn polygon_self_intersection_preserves_area(poly in convex_polygon(8)) {
        let intersection = poly.intersect_polygon(&poly);
        prop_assert!((intersection.area() - poly.area()).abs() <= 1e-9 * poly.area().max(1.0));
    }

    #[test]
    fn triangulation_covers_polygon_area(poly in convex_polygon(8)) {
        let triangle_area_sum: f64 = poly.triangulate().map(|tri| tri.signed_area()).sum();
        // Fan triangles of a counter-clockwise polygon are counter-clockwise,
        // so the signed areas are positive and sum to the polygon area
        prop_assert!((triangle_area_sum - poly.area()).abs() <= 1e-9 * poly.area().max(1.0));
    }

    #[test]
    fn intersection_is_commutative_in_area(
        poly1 in convex_polygon(6),
        poly2 in convex_polygon(6)
    ) {
        let area12 = poly1.intersect_polygon(&poly2).area();
        let area21 = poly2.intersect_polygon(&poly1).area();
        prop_assert!((area12 - area21).abs() <= 1e-9 * area12.max(1.0));
    }

    #[test]
    fn clipped_segment_stays_in_half_plane(
        (a, b) in (point2(), point2()),
        hp in half_plane()
    ) {
        let segment = LineSegment2d::from_end_points(a, b);
        if let Some(clipped) = segment.intersect_half_plane(&hp) {
            prop_assert!(hp.signed_distance_to_point(clipped.start()) <= 1e-9);
            prop_assert!(hp.signed_distance_to_point(clipped.end()) <= 1e-9);
            prop_assert!(clipped.length() <= segment.length() + 1e-9);
        }
    }
}
