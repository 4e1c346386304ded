//! Geometric primitives and predicates for the `immersed` coupling library.
//!
//! The exact cell-cell intersection machinery works with convex polygons in the plane,
//! so most of the functionality here is two-dimensional. Bounding boxes are provided
//! for arbitrary (static) dimension since they are used for broad-phase pairing in any
//! ambient dimension.
use immersed_traits::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector, Scalar, U2};
use serde::{Deserialize, Serialize};

mod polytope;
mod primitives;
pub use polytope::*;
pub use primitives::*;

#[cfg(feature = "proptest-support")]
pub mod proptest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "OVector<T, D>: Serialize",
    deserialize = "OVector<T, D>: Deserialize<'de>"
))]
pub struct AxisAlignedBoundingBox<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    min: OVector<T, D>,
    max: OVector<T, D>,
}

impl<T, D> Copy for AxisAlignedBoundingBox<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
    OVector<T, D>: Copy,
{
}

pub type AxisAlignedBoundingBox2d<T> = AxisAlignedBoundingBox<T, U2>;

impl<T, D> AxisAlignedBoundingBox<T, D>
where
    T: Scalar + PartialOrd,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub fn new(min: OVector<T, D>, max: OVector<T, D>) -> Self {
        for i in 0..D::dim() {
            assert!(min[i] <= max[i]);
        }
        Self { min, max }
    }

    pub fn min(&self) -> &OVector<T, D> {
        &self.min
    }

    pub fn max(&self) -> &OVector<T, D> {
        &self.max
    }
}

impl<T, D> From<OPoint<T, D>> for AxisAlignedBoundingBox<T, D>
where
    T: Scalar + PartialOrd,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    fn from(point: OPoint<T, D>) -> Self {
        AxisAlignedBoundingBox::new(point.coords.clone(), point.coords)
    }
}

impl<T, D> AxisAlignedBoundingBox<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    /// Computes the minimal bounding box which encloses both `this` and `other`.
    pub fn enclose(&self, other: &AxisAlignedBoundingBox<T, D>) -> Self {
        let min = self.min.iter().zip(&other.min).map(|(a, b)| T::min(*a, *b));
        let min = OVector::<T, D>::from_iterator(min);

        let max = self.max.iter().zip(&other.max).map(|(a, b)| T::max(*a, *b));
        let max = OVector::<T, D>::from_iterator(max);

        AxisAlignedBoundingBox::new(min, max)
    }

    /// The smallest box that contains all the given points, or `None` if the iterator is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a OPoint<T, D>>) -> Option<Self> {
        let mut points = points.into_iter();
        points.next().map(|first_point| {
            points.fold(AxisAlignedBoundingBox::from(first_point.clone()), |aabb, point| {
                aabb.enclose(&AxisAlignedBoundingBox::from(point.clone()))
            })
        })
    }

    pub fn extents(&self) -> OVector<T, D> {
        self.max() - self.min()
    }

    pub fn center(&self) -> OPoint<T, D> {
        OPoint::from((self.max() + self.min()) / T::from_f64(2.0).unwrap())
    }

    /// Scales both corners of the box by the given factor, relative to the origin.
    pub fn uniformly_scale(&self, scale: T) -> Self {
        Self {
            min: &self.min * scale,
            max: &self.max * scale,
        }
    }

    /// Determines if the point is contained in the box, treated as a closed set.
    pub fn contains_point(&self, point: &OPoint<T, D>) -> bool {
        (0..D::dim()).all(|dim| point[dim] >= self.min[dim] && point[dim] <= self.max[dim])
    }

    /// Determines if the two boxes, treated as closed sets, have non-empty intersection.
    pub fn intersects(&self, other: &Self) -> bool {
        for i in 0..D::dim() {
            if !intervals_intersect([self.min[i], self.max[i]], [other.min[i], other.max[i]]) {
                return false;
            }
        }
        true
    }

    /// The squared Euclidean distance from the point to the closest point in the box.
    ///
    /// Returns zero for points contained in the box.
    pub fn dist2_to(&self, point: &OPoint<T, D>) -> T {
        let mut dist2 = T::zero();
        for i in 0..D::dim() {
            let v = point[i];
            let excess = if v < self.min[i] {
                self.min[i] - v
            } else if v > self.max[i] {
                v - self.max[i]
            } else {
                T::zero()
            };
            dist2 += excess * excess;
        }
        dist2
    }
}

fn intervals_intersect<T: Real>([l1, u1]: [T; 2], [l2, u2]: [T; 2]) -> bool {
    l2 <= u1 && u2 >= l1
}
