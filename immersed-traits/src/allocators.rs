//! Helper traits for allocator trait bounds.
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Scalar, U1};

/// An allocator for a single dimension.
///
/// Bundles the allocators needed to store vectors, square matrices and row vectors
/// of dimension `D`, together with allocators for built-in types so that e.g.
/// decompositions and scalar conversions do not require separate bounds.
pub trait DimAllocator<T: Scalar, D: DimName>:
    Allocator<T, D>
    + Allocator<T, D, D>
    + Allocator<T, U1, D>
    // Permutation storage for LU-type decompositions
    + Allocator<usize, D>
    + Allocator<(usize, usize), D>
    // Scalar conversions (e.g. to f64 for spatial indexing) and flag storage
    + Allocator<f32, D>
    + Allocator<f64, D>
    + Allocator<i8, D>
    + Allocator<i32, D>
    + Allocator<i64, D>
    + Allocator<u8, D>
    + Allocator<u16, D>
    + Allocator<u32, D>
    + Allocator<u64, D>
    + Allocator<isize, D>
    + Allocator<bool, D>
{
}

impl<T, D> DimAllocator<T, D> for DefaultAllocator
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>
        + Allocator<T, D, D>
        + Allocator<T, U1, D>
        + Allocator<usize, D>
        + Allocator<(usize, usize), D>
        + Allocator<f32, D>
        + Allocator<f64, D>
        + Allocator<i8, D>
        + Allocator<i32, D>
        + Allocator<i64, D>
        + Allocator<u8, D>
        + Allocator<u16, D>
        + Allocator<u32, D>
        + Allocator<u64, D>
        + Allocator<isize, D>
        + Allocator<bool, D>,
{
}

/// An allocator for two dimensions, including rectangular matrices of both orientations.
pub trait BiDimAllocator<T: Scalar, D1: DimName, D2: DimName>:
    DimAllocator<T, D1> + DimAllocator<T, D2> + Allocator<T, D1, D2> + Allocator<T, D2, D1>
{
}

impl<T: Scalar, D1: DimName, D2: DimName> BiDimAllocator<T, D1, D2> for DefaultAllocator where
    DefaultAllocator: DimAllocator<T, D1> + DimAllocator<T, D2> + Allocator<T, D1, D2> + Allocator<T, D2, D1>
{
}

/// An allocator for three dimensions.
///
/// This is the natural bound for routines that work with a pair of elements
/// embedded in a common geometric dimension, such as cell-cell intersection
/// and pairwise coupling assembly.
pub trait TriDimAllocator<T: Scalar, D1: DimName, D2: DimName, D3: DimName>:
    BiDimAllocator<T, D1, D2> + BiDimAllocator<T, D1, D3> + BiDimAllocator<T, D2, D3>
{
}

impl<T: Scalar, D1: DimName, D2: DimName, D3: DimName> TriDimAllocator<T, D1, D2, D3> for DefaultAllocator where
    DefaultAllocator: BiDimAllocator<T, D1, D2> + BiDimAllocator<T, D1, D3> + BiDimAllocator<T, D2, D3>
{
}
