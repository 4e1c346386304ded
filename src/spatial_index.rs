use crate::allocators::DimAllocator;
use crate::connectivity::Connectivity;
use crate::geometry::AxisAlignedBoundingBox;
use crate::mesh::{CellStatus, Mesh};
use crate::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector};
use rstar::primitives::GeomWithData;
use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};

#[derive(Debug, Clone, PartialEq)]
struct RTreePoint<D>(pub OPoint<f64, D>)
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>;

impl<D> rstar::Point for RTreePoint<D>
where
    D: DimName,
    DefaultAllocator: Allocator<f64, D>,
{
    type Scalar = f64;
    const DIMENSIONS: usize = D::USIZE;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Self(OVector::<f64, D>::from_fn(|i, _| generator(i)).into())
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        self.0[index]
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        &mut self.0[index]
    }
}

struct RTreeAABB<D: DimName>(pub AxisAlignedBoundingBox<f64, D>)
where
    DefaultAllocator: Allocator<f64, D>;

impl<D: DimName> RTreeObject for RTreeAABB<D>
where
    DefaultAllocator: Allocator<f64, D>,
{
    type Envelope = AABB<RTreePoint<D>>;

    fn envelope(&self) -> Self::Envelope {
        let Self(aabb) = self;
        let box_min = aabb.min().clone();
        let box_max = aabb.max().clone();
        AABB::from_corners(RTreePoint(box_min.into()), RTreePoint(box_max.into()))
    }
}

impl<D: DimName> PointDistance for RTreeAABB<D>
where
    DefaultAllocator: Allocator<f64, D>,
{
    fn distance_2(&self, point: &RTreePoint<D>) -> <<Self::Envelope as Envelope>::Point as rstar::Point>::Scalar {
        self.0.dist2_to(&point.0)
    }

    fn contains_point(&self, point: &<Self::Envelope as Envelope>::Point) -> bool {
        self.0.contains_point(&point.0)
    }
}

/// An R-tree over the bounding boxes of the cells of a mesh.
///
/// This serves as the broad phase of cell-cell intersection: overlap queries against
/// the tree produce a superset of the cells whose geometry actually intersects a
/// query box or contains a query point. Stored boxes are slightly fattened, so the
/// candidate sets remain conservative in the presence of floating point errors.
///
/// The tree stores boxes in double precision regardless of the scalar type of the
/// mesh it was built from.
pub struct BoundingBoxTree<D: DimName>
where
    DefaultAllocator: Allocator<f64, D>,
{
    tree: RTree<GeomWithData<RTreeAABB<D>, usize>>,
}

// Make the box slightly larger than necessary to accommodate possible floating
// point errors etc. The fattening is relative to the box center, so that boxes far
// away from the origin are enlarged on all sides just like boxes close to it.
fn fattened_box_f64<T, D>(bounding_box: &AxisAlignedBoundingBox<T, D>) -> AxisAlignedBoundingBox<f64, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D> + Allocator<f64, D>,
{
    let margin = bounding_box.extents() * T::from_f64(0.005).unwrap();
    let box_min = (bounding_box.min() - &margin).map(|x_i| x_i.to_subset().unwrap());
    let box_max = (bounding_box.max() + &margin).map(|x_i| x_i.to_subset().unwrap());
    AxisAlignedBoundingBox::new(box_min, box_max)
}

impl<D: DimName> BoundingBoxTree<D>
where
    DefaultAllocator: Allocator<f64, D>,
{
    pub fn from_bounding_boxes<T: Real>(boxes: &[AxisAlignedBoundingBox<T, D>]) -> Self
    where
        DefaultAllocator: DimAllocator<T, D>,
    {
        let geometries = boxes
            .iter()
            .enumerate()
            .map(|(i, bounding_box)| GeomWithData::new(RTreeAABB(fattened_box_f64(bounding_box)), i))
            .collect();
        let tree = RTree::bulk_load(geometries);
        Self { tree }
    }

    /// Builds a tree over the bounding boxes of all cells in the mesh.
    ///
    /// Queries report indices into the mesh's connectivity.
    pub fn from_mesh<T, C>(mesh: &Mesh<T, D, C>) -> Self
    where
        T: Real,
        C: Connectivity,
        DefaultAllocator: DimAllocator<T, D>,
    {
        Self::from_bounding_boxes(&mesh.cell_bounding_boxes())
    }

    /// Builds a tree over the locally owned cells of the mesh.
    ///
    /// Cells that are not locally owned are not indexed at all, so they never show up
    /// as candidates. Queries report indices into the full mesh connectivity.
    ///
    /// # Panics
    ///
    /// Panics if the number of cells in the status does not match the mesh.
    pub fn from_mesh_with_status<T, C>(mesh: &Mesh<T, D, C>, status: &CellStatus) -> Self
    where
        T: Real,
        C: Connectivity,
        DefaultAllocator: DimAllocator<T, D>,
    {
        assert_eq!(
            status.num_cells(),
            mesh.connectivity().len(),
            "Cell status must describe the same number of cells as the mesh."
        );
        let geometries = mesh
            .cell_bounding_boxes()
            .iter()
            .enumerate()
            .filter(|&(i, _)| status.is_locally_owned(i))
            .map(|(i, bounding_box)| GeomWithData::new(RTreeAABB(fattened_box_f64(bounding_box)), i))
            .collect();
        let tree = RTree::bulk_load(geometries);
        Self { tree }
    }

    /// The number of cells indexed by the tree.
    pub fn num_cells(&self) -> usize {
        self.tree.size()
    }

    /// Returns the indices of all indexed cells whose (fattened) bounding box
    /// intersects the given box.
    pub fn overlapping_cells<'a, T: Real>(
        &'a self,
        bounding_box: &AxisAlignedBoundingBox<T, D>,
    ) -> impl 'a + Iterator<Item = usize>
    where
        DefaultAllocator: DimAllocator<T, D>,
    {
        let box_min: OVector<f64, D> = bounding_box.min().map(|x_i| x_i.to_subset().unwrap());
        let box_max: OVector<f64, D> = bounding_box.max().map(|x_i| x_i.to_subset().unwrap());
        let envelope = AABB::from_corners(RTreePoint(box_min.into()), RTreePoint(box_max.into()));
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|geometry| geometry.data)
    }

    /// Returns the indices of all indexed cells whose (fattened) bounding box
    /// contains the given point.
    pub fn cells_containing_point<'a, T: Real>(&'a self, point: &OPoint<T, D>) -> impl 'a + Iterator<Item = usize>
    where
        DefaultAllocator: DimAllocator<T, D>,
    {
        let point_f64: OPoint<f64, D> = point.map(|x_i| {
            x_i.to_subset()
                .expect("Point coordinates must be representable in f64")
        });
        self.tree
            .locate_all_at_point(&RTreePoint(point_f64))
            .map(|geometry| geometry.data)
    }
}
