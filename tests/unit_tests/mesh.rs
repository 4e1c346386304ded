use immersed::mesh::procedural::{
    create_circle_segment_mesh_2d, create_rectangular_uniform_quad_mesh_2d, create_uniform_segment_mesh_2d,
    create_unit_square_uniform_quad_mesh_2d, create_unit_square_uniform_tri_mesh_2d,
};
use immersed::mesh::{CellStatus, QuadMesh2d};
use matrixcompare::assert_scalar_eq;
use nalgebra::{Point2, Vector2};

#[test]
fn unit_square_quad_mesh_has_expected_topology() {
    let mesh = create_unit_square_uniform_quad_mesh_2d::<f64>(4);
    assert_eq!(mesh.connectivity().len(), 16);
    assert_eq!(mesh.vertices().len(), 25);

    let total_area: f64 = mesh.cell_iter().map(|cell| cell.area()).sum();
    assert_scalar_eq!(total_area, 1.0, comp = abs, tol = 1e-14);

    // All cells wind counter-clockwise
    assert!(mesh.cell_iter().all(|cell| cell.signed_area() > 0.0));
}

#[test]
fn unit_square_triangle_mesh_covers_the_square() {
    let mesh = create_unit_square_uniform_tri_mesh_2d::<f64>(3);
    assert_eq!(mesh.connectivity().len(), 18);

    let total_area: f64 = mesh.cell_iter().map(|triangle| triangle.area()).sum();
    assert_scalar_eq!(total_area, 1.0, comp = abs, tol = 1e-14);
    assert!(mesh.cell_iter().all(|triangle| triangle.signed_area() > 0.0));
}

#[test]
fn rectangular_mesh_spans_the_requested_extents() {
    let mesh = create_rectangular_uniform_quad_mesh_2d(2.0, 1, 1, 4, &Vector2::new(-1.0, 1.0));
    assert_eq!(mesh.connectivity().len(), 16);
    assert_eq!(mesh.vertices().len(), 25);

    let min_x = mesh.vertices().iter().map(|v| v.x).fold(f64::INFINITY, f64::min);
    let max_y = mesh.vertices().iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max);
    assert_scalar_eq!(min_x, -1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(max_y, 1.0, comp = abs, tol = 1e-14);

    let total_area: f64 = mesh.cell_iter().map(|cell| cell.area()).sum();
    assert_scalar_eq!(total_area, 4.0, comp = abs, tol = 1e-14);
}

#[test]
fn cell_bounding_boxes_contain_cell_vertices() {
    let mesh = create_rectangular_uniform_quad_mesh_2d(2.0, 1, 1, 4, &Vector2::new(-1.0, 1.0));
    let boxes = mesh.cell_bounding_boxes();
    assert_eq!(boxes.len(), 16);

    for (cell, bounding_box) in mesh.cell_iter().zip(boxes.iter()) {
        for vertex in cell.vertices() {
            assert!(bounding_box.contains_point(vertex));
        }
    }
}

#[test]
fn segment_mesh_partitions_the_curve() {
    let mesh = create_uniform_segment_mesh_2d(&Point2::new(0.0, 0.0), &Point2::new(2.0, 0.0), 4);
    assert_eq!(mesh.connectivity().len(), 4);
    assert_eq!(mesh.vertices().len(), 5);

    let total_length: f64 = mesh.cell_iter().map(|segment| segment.length()).sum();
    assert_scalar_eq!(total_length, 2.0, comp = abs, tol = 1e-14);
}

#[test]
fn circle_mesh_chord_length_approaches_the_circumference() {
    let mesh = create_circle_segment_mesh_2d(&Point2::new(1.0, -2.0), 3.0, 64);
    assert_eq!(mesh.connectivity().len(), 64);
    assert_eq!(mesh.vertices().len(), 64);

    let total_length: f64 = mesh.cell_iter().map(|segment| segment.length()).sum();
    let expected = 64.0 * 2.0 * 3.0 * (std::f64::consts::PI / 64.0).sin();
    assert_scalar_eq!(total_length, expected, comp = abs, tol = 1e-12);
    assert!(total_length < 2.0 * std::f64::consts::PI * 3.0);
}

#[test]
fn translate_shifts_every_vertex() {
    let mut mesh = create_unit_square_uniform_quad_mesh_2d::<f64>(2);
    let original = mesh.vertices().to_vec();

    mesh.translate(&Vector2::new(1.5, -0.5));
    for (before, after) in original.iter().zip(mesh.vertices()) {
        assert_scalar_eq!(after.x, before.x + 1.5, comp = abs, tol = 1e-15);
        assert_scalar_eq!(after.y, before.y - 0.5, comp = abs, tol = 1e-15);
    }
}

#[test]
fn meshes_round_trip_through_json() {
    let mesh = create_unit_square_uniform_quad_mesh_2d::<f64>(2);
    let json = serde_json::to_string(&mesh).unwrap();
    let recovered: QuadMesh2d<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, mesh);
}

#[test]
fn serial_status_owns_and_activates_every_cell() {
    let status = CellStatus::serial(3);
    assert_eq!(status.num_cells(), 3);
    assert!(!status.is_distributed());
    assert!((0..3).all(|cell| status.is_locally_owned(cell) && status.is_active(cell)));
}

#[test]
fn partitioned_status_tracks_ownership_and_activity() {
    let status = CellStatus::partitioned(vec![true, false, true]).with_active(vec![true, true, false]);
    assert_eq!(status.num_cells(), 3);
    assert!(status.is_distributed());

    assert!(status.is_locally_owned(0));
    assert!(!status.is_locally_owned(1));
    assert!(status.is_active(1));
    assert!(!status.is_active(2));
}

#[test]
#[should_panic]
fn mismatched_activity_flags_are_rejected() {
    let _ = CellStatus::serial(3).with_active(vec![true, true]);
}
