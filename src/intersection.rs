//! Exact cell-cell intersection between a space mesh and an embedded mesh.
//!
//! The broad phase pairs cells by overlap of their bounding boxes through a
//! [`BoundingBoxTree`], and the narrow phase computes a quadrature rule over each
//! non-degenerate intersection through the [`CellIntersection`] kernel. The result is
//! a set of [`IntersectionRecord`]s from which coupling operators between the two
//! meshes can be assembled.
use crate::connectivity::CellConnectivity;
use crate::geometry::{AxisAlignedBoundingBox2d, ConvexPolygon};
use crate::mesh::{CellStatus, Mesh2d};
use crate::quadrature::QuadraturePair2d;
use crate::spatial_index::BoundingBoxTree;
use crate::{require_exact_geometry, validate_tolerance, CouplingError, Real};
use log::debug;
use nalgebra::{Scalar, U2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub mod kernel;

pub use kernel::CellIntersection;

/// A quadrature rule over the intersection of a pair of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct IntersectionRecord<T>
where
    T: Scalar,
{
    /// The index of the cell in the space mesh.
    pub space_cell: usize,
    /// The index of the cell in the embedded mesh.
    pub embedded_cell: usize,
    /// A quadrature rule over the intersection of the two cells, with points in
    /// physical coordinates and weights summing to the measure of the intersection.
    pub quadrature: QuadraturePair2d<T>,
}

/// Computes a quadrature rule over the intersection of a single pair of cells.
///
/// This is the narrow phase in isolation. Returns `Ok(None)` if the measure of the
/// intersection does not exceed the tolerance.
pub fn intersect_cell_pair<T, Cell>(
    space_cell: &ConvexPolygon<T>,
    embedded_cell: &Cell,
    strength: usize,
    tolerance: T,
) -> Result<Option<QuadraturePair2d<T>>, CouplingError>
where
    T: Real,
    Cell: CellIntersection<T>,
{
    validate_tolerance(tolerance)?;
    require_exact_geometry()?;
    Ok(embedded_cell.intersection_quadrature(space_cell, strength, tolerance))
}

/// Computes quadrature rules for all intersecting cell pairs of the two meshes.
///
/// Every cell of both meshes is treated as locally owned and active. The space mesh
/// must consist of convex cells in counter-clockwise order. Records are sorted by
/// embedded cell index, then by space cell index.
pub fn compute_intersections<T, C0, C1>(
    space_mesh: &Mesh2d<T, C0>,
    embedded_mesh: &Mesh2d<T, C1>,
    strength: usize,
    tolerance: T,
) -> Result<Vec<IntersectionRecord<T>>, CouplingError>
where
    T: Real,
    C0: CellConnectivity<T, U2>,
    C0::Cell: Into<ConvexPolygon<T>>,
    C1: CellConnectivity<T, U2>,
    C1::Cell: CellIntersection<T>,
{
    compute_intersections_with_status(
        space_mesh,
        &CellStatus::serial(space_mesh.connectivity().len()),
        embedded_mesh,
        &CellStatus::serial(embedded_mesh.connectivity().len()),
        strength,
        tolerance,
    )
}

/// Computes quadrature rules for all intersecting pairs of relevant cells.
///
/// A pair is relevant if both its cells are locally owned and active in their
/// respective meshes. Lower-dimensional embedded meshes must not be distributed,
/// since their cells can intersect space cells owned by other processes; such meshes
/// are rejected with [`CouplingError::DistributedEmbeddedMesh`] before any work is
/// done.
///
/// # Panics
///
/// Panics if either status describes a different number of cells than its mesh.
pub fn compute_intersections_with_status<T, C0, C1>(
    space_mesh: &Mesh2d<T, C0>,
    space_status: &CellStatus,
    embedded_mesh: &Mesh2d<T, C1>,
    embedded_status: &CellStatus,
    strength: usize,
    tolerance: T,
) -> Result<Vec<IntersectionRecord<T>>, CouplingError>
where
    T: Real,
    C0: CellConnectivity<T, U2>,
    C0::Cell: Into<ConvexPolygon<T>>,
    C1: CellConnectivity<T, U2>,
    C1::Cell: CellIntersection<T>,
{
    let narrow_phase = NarrowPhase::new(
        space_mesh,
        space_status,
        embedded_mesh,
        embedded_status,
        strength,
        tolerance,
    )?;
    let embedded_boxes = embedded_mesh.cell_bounding_boxes();

    let mut records = Vec::new();
    for (embedded_cell_index, bounding_box) in embedded_boxes.iter().enumerate() {
        if !embedded_status.is_locally_owned(embedded_cell_index) || !embedded_status.is_active(embedded_cell_index) {
            continue;
        }
        let embedded_cell = embedded_mesh
            .get_cell(embedded_cell_index)
            .expect("Mesh is not allowed to contain cells with indices out of bounds.");
        records.extend(narrow_phase.intersect_with_cell(embedded_cell_index, &embedded_cell, bounding_box));
    }

    finalize_records(&mut records, space_mesh.connectivity().len(), embedded_mesh.connectivity().len());
    Ok(records)
}

/// Parallel version of [`compute_intersections_with_status`].
///
/// Embedded cells are processed in parallel. The result is identical to the
/// sequential version, including the order of the records.
pub fn compute_intersections_par<T, C0, C1>(
    space_mesh: &Mesh2d<T, C0>,
    space_status: &CellStatus,
    embedded_mesh: &Mesh2d<T, C1>,
    embedded_status: &CellStatus,
    strength: usize,
    tolerance: T,
) -> Result<Vec<IntersectionRecord<T>>, CouplingError>
where
    T: Real + Send + Sync,
    C0: CellConnectivity<T, U2> + Sync,
    C0::Cell: Into<ConvexPolygon<T>>,
    C1: CellConnectivity<T, U2> + Sync,
    C1::Cell: CellIntersection<T>,
{
    let narrow_phase = NarrowPhase::new(
        space_mesh,
        space_status,
        embedded_mesh,
        embedded_status,
        strength,
        tolerance,
    )?;
    let embedded_boxes = embedded_mesh.cell_bounding_boxes();

    let mut records: Vec<_> = embedded_boxes
        .par_iter()
        .enumerate()
        .filter(|&(embedded_cell_index, _)| {
            embedded_status.is_locally_owned(embedded_cell_index) && embedded_status.is_active(embedded_cell_index)
        })
        .flat_map_iter(|(embedded_cell_index, bounding_box)| {
            let embedded_cell = embedded_mesh
                .get_cell(embedded_cell_index)
                .expect("Mesh is not allowed to contain cells with indices out of bounds.");
            narrow_phase.intersect_with_cell(embedded_cell_index, &embedded_cell, bounding_box)
        })
        .collect();

    finalize_records(&mut records, space_mesh.connectivity().len(), embedded_mesh.connectivity().len());
    Ok(records)
}

/// Broad-phase index and narrow-phase parameters shared by the intersection drivers.
struct NarrowPhase<'a, T, C0>
where
    T: Real,
    C0: CellConnectivity<T, U2>,
{
    tree: BoundingBoxTree<U2>,
    space_mesh: &'a Mesh2d<T, C0>,
    space_status: &'a CellStatus,
    strength: usize,
    tolerance: T,
}

impl<'a, T, C0> NarrowPhase<'a, T, C0>
where
    T: Real,
    C0: CellConnectivity<T, U2>,
    C0::Cell: Into<ConvexPolygon<T>>,
{
    /// Validates the inputs and builds the broad-phase tree over the space mesh.
    fn new<C1>(
        space_mesh: &'a Mesh2d<T, C0>,
        space_status: &'a CellStatus,
        embedded_mesh: &Mesh2d<T, C1>,
        embedded_status: &CellStatus,
        strength: usize,
        tolerance: T,
    ) -> Result<Self, CouplingError>
    where
        C1: CellConnectivity<T, U2>,
        C1::Cell: CellIntersection<T>,
    {
        assert_eq!(
            space_status.num_cells(),
            space_mesh.connectivity().len(),
            "Space cell status must describe the same number of cells as the space mesh."
        );
        assert_eq!(
            embedded_status.num_cells(),
            embedded_mesh.connectivity().len(),
            "Embedded cell status must describe the same number of cells as the embedded mesh."
        );
        validate_tolerance(tolerance)?;
        require_exact_geometry()?;
        if embedded_status.is_distributed() && <C1::Cell as CellIntersection<T>>::DIMENSION < 2 {
            return Err(CouplingError::DistributedEmbeddedMesh);
        }

        Ok(Self {
            tree: BoundingBoxTree::from_mesh_with_status(space_mesh, space_status),
            space_mesh,
            space_status,
            strength,
            tolerance,
        })
    }

    /// Runs the narrow phase for one embedded cell against all broad-phase candidates.
    fn intersect_with_cell<Cell>(
        &self,
        embedded_cell_index: usize,
        embedded_cell: &Cell,
        bounding_box: &AxisAlignedBoundingBox2d<T>,
    ) -> Vec<IntersectionRecord<T>>
    where
        Cell: CellIntersection<T>,
    {
        let mut records = Vec::new();
        for space_cell_index in self.tree.overlapping_cells(bounding_box) {
            if !self.space_status.is_active(space_cell_index) {
                continue;
            }
            let space_polygon: ConvexPolygon<T> = self
                .space_mesh
                .get_cell(space_cell_index)
                .expect("Mesh is not allowed to contain cells with indices out of bounds.")
                .into();
            if let Some(quadrature) = embedded_cell.intersection_quadrature(&space_polygon, self.strength, self.tolerance)
            {
                records.push(IntersectionRecord {
                    space_cell: space_cell_index,
                    embedded_cell: embedded_cell_index,
                    quadrature,
                });
            }
        }
        records
    }
}

fn finalize_records<T: Scalar>(records: &mut Vec<IntersectionRecord<T>>, num_space_cells: usize, num_embedded_cells: usize) {
    records.sort_unstable_by_key(|record| (record.embedded_cell, record.space_cell));
    debug!(
        "Computed {} intersection rules between {} space cells and {} embedded cells.",
        records.len(),
        num_space_cells,
        num_embedded_cells
    );
}
