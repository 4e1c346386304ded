use immersed_geometry::Triangle;
use matrixcompare::assert_scalar_eq;
use nalgebra::{point, vector};

#[test]
fn triangle_signed_area_follows_winding() {
    let ccw = Triangle([point![0.0, 0.0], point![2.0, 0.0], point![0.0, 1.0]]);
    assert_scalar_eq!(ccw.signed_area(), 1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(ccw.area(), 1.0, comp = abs, tol = 1e-14);

    let cw = Triangle([point![0.0, 0.0], point![0.0, 1.0], point![2.0, 0.0]]);
    assert_scalar_eq!(cw.signed_area(), -1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(cw.area(), 1.0, comp = abs, tol = 1e-14);

    let degenerate = Triangle([point![0.0, 0.0], point![1.0, 1.0], point![2.0, 2.0]]);
    assert_scalar_eq!(degenerate.area(), 0.0, comp = abs, tol = 1e-14);
}

#[test]
fn triangle_centroid() {
    let triangle = Triangle([point![0.0, 0.0], point![3.0, 0.0], point![0.0, 3.0]]);
    let centroid = triangle.centroid();
    assert_scalar_eq!(centroid.x, 1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(centroid.y, 1.0, comp = abs, tol = 1e-14);
}

#[test]
fn triangle_bounding_box() {
    let triangle = Triangle([point![-1.0, 2.0], point![3.0, 0.0], point![0.0, 4.0]]);
    let aabb = triangle.bounding_box();
    assert_eq!(aabb.min(), &vector![-1.0, 0.0]);
    assert_eq!(aabb.max(), &vector![3.0, 4.0]);
}
