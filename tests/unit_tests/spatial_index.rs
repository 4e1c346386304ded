use immersed::geometry::AxisAlignedBoundingBox2d;
use immersed::mesh::procedural::create_rectangular_uniform_quad_mesh_2d;
use immersed::mesh::CellStatus;
use immersed::proptest::point2;
use immersed::spatial_index::BoundingBoxTree;
use nalgebra::{Point2, Vector2};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[test]
fn tree_reports_cells_overlapping_a_query_box() {
    let mesh = create_rectangular_uniform_quad_mesh_2d(2.0, 1, 1, 4, &Vector2::new(-1.0, 1.0));
    let tree = BoundingBoxTree::from_mesh(&mesh);
    assert_eq!(tree.num_cells(), 16);

    // A small box in the interior of cell 0, which spans [-1, -0.5] x [0.5, 1]
    let query = AxisAlignedBoundingBox2d::new(Vector2::new(-0.9, 0.6), Vector2::new(-0.8, 0.7));
    let candidates: BTreeSet<_> = tree.overlapping_cells(&query).collect();
    assert!(candidates.contains(&0));

    // A box covering the entire mesh reports every cell
    let everything = AxisAlignedBoundingBox2d::new(Vector2::new(-2.0, -2.0), Vector2::new(2.0, 2.0));
    assert_eq!(tree.overlapping_cells(&everything).count(), 16);

    // A far away box reports nothing
    let distant = AxisAlignedBoundingBox2d::new(Vector2::new(10.0, 10.0), Vector2::new(11.0, 11.0));
    assert_eq!(tree.overlapping_cells(&distant).count(), 0);
}

#[test]
fn ownership_filtered_tree_indexes_only_owned_cells() {
    let mesh = create_rectangular_uniform_quad_mesh_2d(1.0, 1, 1, 2, &Vector2::new(0.0, 1.0));
    let status = CellStatus::partitioned(vec![true, false, true, false]);
    let tree = BoundingBoxTree::from_mesh_with_status(&mesh, &status);
    assert_eq!(tree.num_cells(), 2);

    let everything = AxisAlignedBoundingBox2d::new(Vector2::new(-1.0, -1.0), Vector2::new(2.0, 2.0));
    let candidates: BTreeSet<_> = tree.overlapping_cells(&everything).collect();
    assert_eq!(candidates, BTreeSet::from([0, 2]));
}

#[test]
fn point_queries_report_the_containing_cell() {
    let mesh = create_rectangular_uniform_quad_mesh_2d(1.0, 1, 1, 2, &Vector2::new(0.0, 1.0));
    let tree = BoundingBoxTree::from_mesh(&mesh);

    // Cell 3 spans [0.5, 1] x [0, 0.5]
    let candidates: Vec<_> = tree.cells_containing_point(&Point2::new(0.75, 0.25)).collect();
    assert_eq!(candidates, vec![3]);

    let outside: Vec<_> = tree.cells_containing_point(&Point2::new(5.0, 5.0)).collect();
    assert!(outside.is_empty());
}

proptest! {
    #[test]
    fn point_query_candidates_cover_exact_containment(point in point2()) {
        let mesh = create_rectangular_uniform_quad_mesh_2d(2.0, 1, 1, 4, &Vector2::new(-1.0, 1.0));
        let tree = BoundingBoxTree::from_mesh(&mesh);
        let candidates: BTreeSet<_> = tree.cells_containing_point(&point).collect();

        for (cell_index, cell) in mesh.cell_iter().enumerate() {
            if cell.contains_point(&point) {
                prop_assert!(candidates.contains(&cell_index));
            }
        }
    }

    #[test]
    fn box_query_candidates_cover_exact_box_overlap(point in point2()) {
        let mesh = create_rectangular_uniform_quad_mesh_2d(2.0, 1, 1, 4, &Vector2::new(-1.0, 1.0));
        let tree = BoundingBoxTree::from_mesh(&mesh);

        let query = AxisAlignedBoundingBox2d::new(point.coords - Vector2::new(0.1, 0.1), point.coords + Vector2::new(0.1, 0.1));
        let candidates: BTreeSet<_> = tree.overlapping_cells(&query).collect();

        for (cell_index, bounding_box) in mesh.cell_bounding_boxes().iter().enumerate() {
            if bounding_box.intersects(&query) {
                prop_assert!(candidates.contains(&cell_index));
            }
        }
    }
}
