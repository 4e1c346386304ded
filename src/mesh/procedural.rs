//! Basic procedural mesh generation routines.
use crate::connectivity::{Quad4d2Connectivity, Segment2d2Connectivity};
use crate::mesh::{QuadMesh2d, SegmentMesh2d, TriangleMesh2d};
use crate::Real;
use nalgebra::{Point2, Vector2};
use std::f64::consts::PI;

pub fn create_unit_square_uniform_quad_mesh_2d<T>(cells_per_dim: usize) -> QuadMesh2d<T>
where
    T: Real,
{
    create_rectangular_uniform_quad_mesh_2d(
        T::one(),
        1,
        1,
        cells_per_dim,
        &Vector2::new(T::zero(), T::one()),
    )
}

pub fn create_unit_square_uniform_tri_mesh_2d<T>(cells_per_dim: usize) -> TriangleMesh2d<T>
where
    T: Real,
{
    create_rectangular_uniform_quad_mesh_2d(
        T::one(),
        1,
        1,
        cells_per_dim,
        &Vector2::new(T::zero(), T::one()),
    )
    .split_into_triangles()
}

/// Generates an axis-aligned rectangular uniform mesh given a unit length,
/// dimensions as multipliers of the unit length and the number of cells per unit length.
pub fn create_rectangular_uniform_quad_mesh_2d<T>(
    unit_length: T,
    units_x: usize,
    units_y: usize,
    cells_per_unit: usize,
    top_left: &Vector2<T>,
) -> QuadMesh2d<T>
where
    T: Real,
{
    if cells_per_unit == 0 || units_x == 0 || units_y == 0 {
        QuadMesh2d::from_vertices_and_connectivity(Vec::new(), Vec::new())
    } else {
        let mut vertices = Vec::new();
        let mut cells = Vec::new();

        let cell_size =
            T::from_f64(unit_length.to_subset().unwrap() / cells_per_unit as f64).unwrap();
        let num_cells_x = units_x * cells_per_unit;
        let num_cells_y = units_y * cells_per_unit;
        let num_vertices_x = num_cells_x + 1;
        let num_vertices_y = num_cells_y + 1;

        let to_global_vertex_index = |i, j| (num_cells_x + 1) * j + i;

        for j in 0..num_vertices_y {
            for i in 0..num_vertices_x {
                let i_as_t = T::from_usize(i).expect("Must be able to fit usize in T");
                let j_as_t = T::from_usize(j).expect("Must be able to fit usize in T");
                let v = top_left + Vector2::new(i_as_t, -j_as_t) * cell_size;
                vertices.push(Point2::from(v));
            }
        }

        for j in 0..num_cells_y {
            for i in 0..num_cells_x {
                let quad = Quad4d2Connectivity([
                    to_global_vertex_index(i, j + 1),
                    to_global_vertex_index(i + 1, j + 1),
                    to_global_vertex_index(i + 1, j),
                    to_global_vertex_index(i, j),
                ]);
                cells.push(quad);
            }
        }

        QuadMesh2d::from_vertices_and_connectivity(vertices, cells)
    }
}

/// Generates a uniform mesh of segments connecting the two given points.
pub fn create_uniform_segment_mesh_2d<T>(start: &Point2<T>, end: &Point2<T>, num_cells: usize) -> SegmentMesh2d<T>
where
    T: Real,
{
    if num_cells == 0 {
        return SegmentMesh2d::from_vertices_and_connectivity(Vec::new(), Vec::new());
    }

    let num_vertices = num_cells + 1;
    let vertices = (0..num_vertices)
        .map(|i| {
            let t = T::from_usize(i).expect("Must be able to fit usize in T")
                / T::from_usize(num_cells).expect("Must be able to fit usize in T");
            Point2::from(&start.coords + (end - start) * t)
        })
        .collect();
    let connectivity = (0..num_cells).map(|i| Segment2d2Connectivity([i, i + 1])).collect();

    SegmentMesh2d::from_vertices_and_connectivity(vertices, connectivity)
}

/// Generates a closed polygonal approximation of a circle as a mesh of segments.
///
/// The vertices are placed on the circle in counter-clockwise order, so segment
/// normals obtained from the winding convention point out of the circle.
pub fn create_circle_segment_mesh_2d<T>(center: &Point2<T>, radius: T, num_cells: usize) -> SegmentMesh2d<T>
where
    T: Real,
{
    assert!(num_cells >= 3, "Circle must consist of at least 3 segments.");

    let vertices = (0..num_cells)
        .map(|i| {
            let angle = T::from_f64(2.0 * PI * (i as f64) / (num_cells as f64))
                .expect("Angle must fit in T");
            center + Vector2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    let connectivity = (0..num_cells)
        .map(|i| Segment2d2Connectivity([i, (i + 1) % num_cells]))
        .collect();

    SegmentMesh2d::from_vertices_and_connectivity(vertices, connectivity)
}
