use immersed_traits::Real;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector, Scalar, U2};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

use crate::AxisAlignedBoundingBox;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "OPoint<T, D>: Serialize",
    deserialize = "OPoint<T, D>: Deserialize<'de>"
))]
pub struct Triangle<T, D>(pub [OPoint<T, D>; 3])
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>;

/// A triangle in two dimensions, consisting of three vertices.
///
/// Triangles produced by fan triangulation of counter-clockwise polygons are
/// themselves counter-clockwise, in which case the signed area is non-negative.
pub type Triangle2d<T> = Triangle<T, U2>;

impl<T, D> Copy for Triangle<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
    OPoint<T, D>: Copy,
{
}

impl<T, D> Triangle<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub fn centroid(&self) -> OPoint<T, D> {
        let mut centroid = OVector::zeros();
        for p in &self.0 {
            centroid += &p.coords * T::from_f64(1.0 / 3.0).unwrap();
        }
        OPoint::from(centroid)
    }

    /// The smallest axis-aligned box containing the triangle.
    pub fn bounding_box(&self) -> AxisAlignedBoundingBox<T, D> {
        AxisAlignedBoundingBox::from_points(&self.0).unwrap()
    }
}

impl<T> Triangle2d<T>
where
    T: Real,
{
    /// The signed area of the triangle, positive for counter-clockwise winding.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T."))]
    pub fn signed_area(&self) -> T {
        let a = &self.0[0];
        let b = &self.0[1];
        let c = &self.0[2];
        let ab = b - a;
        let ac = c - a;
        0.5 * ab.perp(&ac)
    }

    pub fn area(&self) -> T {
        self.signed_area().abs()
    }
}
