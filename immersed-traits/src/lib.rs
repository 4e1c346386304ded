//! Core traits shared by the `immersed` crates.
use nalgebra::RealField;

pub use nalgebra;

/// Trait alias for the scalar types used throughout the library.
///
/// All geometric predicates and assembly routines are written against `Real`
/// rather than `RealField` so that scalars can be assumed `Copy`.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

pub mod allocators;
