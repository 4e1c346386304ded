use crate::connectivity::{CellConnectivity, Connectivity, Quad4d2Connectivity, Segment2d2Connectivity, Tri3d2Connectivity};
use crate::geometry::AxisAlignedBoundingBox;
use crate::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector, Scalar, U2};
use serde::{Deserialize, Serialize};
use std::iter::once;

pub mod procedural;

/// Index-based data structure for conforming meshes (i.e. no hanging nodes).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct Mesh<T: Scalar, D, Connectivity>
where
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    // serde's not able to correctly determine the necessary trait bounds in this case,
    // so write our own
    #[serde(bound(
        serialize = "<DefaultAllocator as Allocator<T, D>>::Buffer: Serialize",
        deserialize = "<DefaultAllocator as Allocator<T, D>>::Buffer: Deserialize<'de>"
    ))]
    vertices: Vec<OPoint<T, D>>,
    #[serde(bound(
        serialize = "Connectivity: Serialize",
        deserialize = "Connectivity: Deserialize<'de>"
    ))]
    connectivity: Vec<Connectivity>,
}

pub type Mesh2d<T, Connectivity> = Mesh<T, U2, Connectivity>;

pub type QuadMesh2d<T> = Mesh2d<T, Quad4d2Connectivity>;
pub type TriangleMesh2d<T> = Mesh2d<T, Tri3d2Connectivity>;
pub type SegmentMesh2d<T> = Mesh2d<T, Segment2d2Connectivity>;

impl<T, D, Connectivity> Mesh<T, D, Connectivity>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub fn vertices_mut(&mut self) -> &mut [OPoint<T, D>] {
        &mut self.vertices
    }

    pub fn vertices(&self) -> &[OPoint<T, D>] {
        &self.vertices
    }

    pub fn connectivity(&self) -> &[Connectivity] {
        &self.connectivity
    }

    /// Construct a mesh from vertices and connectivity.
    ///
    /// The provided connectivity is expected only to return valid (i.e. in-bounds) indices,
    /// but this can not be trusted. Users of the mesh are permitted to panic if they encounter
    /// invalid indices, but unchecked indexing may easily lead to undefined behavior.
    pub fn from_vertices_and_connectivity(vertices: Vec<OPoint<T, D>>, connectivity: Vec<Connectivity>) -> Self {
        Self { vertices, connectivity }
    }
}

impl<T, D, Connectivity> Mesh<T, D, Connectivity>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
    Connectivity: CellConnectivity<T, D>,
{
    pub fn get_cell(&self, index: usize) -> Option<Connectivity::Cell> {
        self.connectivity()
            .get(index)
            .and_then(|conn| conn.cell(self.vertices()))
    }

    pub fn cell_iter<'a>(&'a self) -> impl 'a + Iterator<Item = Connectivity::Cell> {
        self.connectivity().iter().map(move |connectivity| {
            connectivity
                .cell(&self.vertices)
                .expect("Mesh is not allowed to contain cells with indices out of bounds.")
        })
    }
}

impl<T, D, C> Mesh<T, D, C>
where
    T: Real,
    D: DimName,
    C: Connectivity,
    DefaultAllocator: Allocator<T, D>,
{
    /// Computes the axis-aligned bounding box of every cell in the mesh.
    ///
    /// The box of a cell is the smallest box containing its vertices, so the result is
    /// exact for cells with flat faces.
    pub fn cell_bounding_boxes(&self) -> Vec<AxisAlignedBoundingBox<T, D>> {
        self.connectivity
            .iter()
            .map(|conn| {
                let cell_vertices = conn.vertex_indices().iter().map(|&index| &self.vertices[index]);
                AxisAlignedBoundingBox::from_points(cell_vertices)
                    .expect("Mesh is not allowed to contain cells without vertices.")
            })
            .collect()
    }
}

impl<T, D, C> Mesh<T, D, C>
where
    T: Real,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    /// Translates all vertices of the mesh by the given translation vector.
    pub fn translate(&mut self, translation: &OVector<T, D>) {
        self.transform_vertices(|p| *p += translation);
    }

    /// Transform all vertices of the mesh by the given transformation function.
    pub fn transform_vertices<F>(&mut self, mut transformation: F)
    where
        F: FnMut(&mut OPoint<T, D>),
    {
        for p in &mut self.vertices {
            transformation(p);
        }
    }
}

impl<T> QuadMesh2d<T>
where
    T: Real,
{
    /// Splits each quadrilateral cell into two triangles along the diagonal connecting
    /// its first and third vertex.
    ///
    /// The split is valid for convex quadrilaterals.
    pub fn split_into_triangles(self) -> TriangleMesh2d<T> {
        let triangles = self
            .connectivity()
            .iter()
            .flat_map(|&Quad4d2Connectivity([a, b, c, d])| {
                once(Tri3d2Connectivity([a, b, c])).chain(once(Tri3d2Connectivity([a, c, d])))
            })
            .collect();

        TriangleMesh2d::from_vertices_and_connectivity(self.vertices, triangles)
    }
}

/// Ownership and refinement status for the cells of a mesh.
///
/// Meshes are stored fully on every process, but in a distributed computation each
/// process is responsible only for a subset of the cells, and adaptively refined
/// meshes may contain coarse cells that have been replaced by finer ones. Coupling
/// operators only generate contributions for cells that are both locally owned and
/// active.
///
/// The default state, in which no flags are stored, describes a serial mesh: every
/// cell is locally owned and active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStatus {
    num_cells: usize,
    locally_owned: Option<Vec<bool>>,
    active: Option<Vec<bool>>,
}

impl CellStatus {
    /// Status for a serial mesh, in which every cell is locally owned and active.
    pub fn serial(num_cells: usize) -> Self {
        Self {
            num_cells,
            locally_owned: None,
            active: None,
        }
    }

    /// Status for a mesh partitioned across processes, given per-cell ownership flags.
    pub fn partitioned(locally_owned: Vec<bool>) -> Self {
        Self {
            num_cells: locally_owned.len(),
            locally_owned: Some(locally_owned),
            active: None,
        }
    }

    /// Attaches per-cell activity flags, marking cells that have been replaced by
    /// refined ones as inactive.
    ///
    /// # Panics
    ///
    /// Panics if the number of flags does not match the number of cells.
    pub fn with_active(mut self, active: Vec<bool>) -> Self {
        assert_eq!(
            active.len(),
            self.num_cells,
            "Number of activity flags must match number of cells."
        );
        self.active = Some(active);
        self
    }

    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// Whether the mesh is partitioned across multiple processes.
    pub fn is_distributed(&self) -> bool {
        self.locally_owned.is_some()
    }

    pub fn is_locally_owned(&self, cell_index: usize) -> bool {
        self.locally_owned
            .as_ref()
            .map_or(true, |flags| flags[cell_index])
    }

    pub fn is_active(&self, cell_index: usize) -> bool {
        self.active.as_ref().map_or(true, |flags| flags[cell_index])
    }
}
