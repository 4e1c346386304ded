use crate::geometry::{ConvexPolygon, LineSegment2d, Triangle, Triangle2d};
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, Point2, Scalar, U2};
use serde::{Deserialize, Serialize};

/// The connectivity of a cell: an ordered list of indices into the vertex array of a mesh.
pub trait Connectivity: Clone {
    fn vertex_indices(&self) -> &[usize];
}

/// A connectivity that, together with mesh vertices, produces the cell's physical geometry.
pub trait CellConnectivity<T, D>: Connectivity
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    type Cell;

    /// Constructs the physical cell from the collection of *all* vertices in the mesh.
    fn cell(&self, vertices: &[OPoint<T, D>]) -> Option<Self::Cell>;
}

/// Connectivity for a two-dimensional Quad4 element.
///
/// A Quad4 element has a quadrilateral geometry, with 4 nodes distributed across
/// the corners of the reference element [-1, 1]^2. The nodes are ordered
/// counterclockwise, so that the physical cell is a convex polygon with positive
/// signed area.
///
/// The schematic below demonstrates the node numbering.
///
/// ```text
/// 3_________2
/// |         |
/// |         |
/// |         |
/// 0_________1
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad4d2Connectivity(pub [usize; 4]);

impl Connectivity for Quad4d2Connectivity {
    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

impl<T> CellConnectivity<T, U2> for Quad4d2Connectivity
where
    T: Scalar,
{
    type Cell = ConvexPolygon<T>;

    fn cell(&self, vertices: &[Point2<T>]) -> Option<Self::Cell> {
        let lookup = |local_index: usize| vertices.get(self.0[local_index]).cloned();
        Some(ConvexPolygon::from_vertices(vec![
            lookup(0)?,
            lookup(1)?,
            lookup(2)?,
            lookup(3)?,
        ]))
    }
}

/// Connectivity for a two-dimensional Tri3 element.
///
/// The three nodes are ordered counterclockwise.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tri3d2Connectivity(pub [usize; 3]);

impl Connectivity for Tri3d2Connectivity {
    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

impl<T> CellConnectivity<T, U2> for Tri3d2Connectivity
where
    T: Scalar,
{
    type Cell = Triangle2d<T>;

    fn cell(&self, vertices: &[Point2<T>]) -> Option<Self::Cell> {
        let a = vertices.get(self.0[0]).cloned()?;
        let b = vertices.get(self.0[1]).cloned()?;
        let c = vertices.get(self.0[2]).cloned()?;
        Some(Triangle([a, b, c]))
    }
}

/// Connectivity for a linear segment element embedded in two dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment2d2Connectivity(pub [usize; 2]);

impl Connectivity for Segment2d2Connectivity {
    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

impl<T> CellConnectivity<T, U2> for Segment2d2Connectivity
where
    T: Scalar,
{
    type Cell = LineSegment2d<T>;

    fn cell(&self, vertices: &[Point2<T>]) -> Option<Self::Cell> {
        let a = vertices.get(self.0[0]).cloned()?;
        let b = vertices.get(self.0[1]).cloned()?;
        Some(LineSegment2d::from_end_points(a, b))
    }
}
