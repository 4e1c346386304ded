use nalgebra::{DimMin, DimName};
use std::fmt;
use std::fmt::{Display, Formatter};

pub mod allocators;
pub mod assembly;
pub mod connectivity;
pub mod constraints;
pub mod dof;
pub mod element;
pub mod intersection;
pub mod mesh;
#[cfg(feature = "proptest")]
pub mod proptest;
pub mod quadrature;
pub mod spatial_index;

pub mod geometry {
    pub use immersed_geometry::*;
}

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

pub use immersed_traits::Real;

/// A small, fixed-size dimension.
///
/// Used as a trait alias for various traits frequently needed by generic `immersed` routines.
pub trait SmallDim: DimName + DimMin<Self, Output = Self> {}

impl<D> SmallDim for D where D: DimName + DimMin<Self, Output = Self> {}

/// Default measure tolerance below which a cell-cell intersection is discarded.
///
/// Intersections whose area (codimension 0) or length (codimension 1) does not exceed
/// the tolerance produce no record, so that cells touching only along a shared
/// boundary do not generate spurious couplings.
pub const DEFAULT_INTERSECTION_TOLERANCE: f64 = 1e-12;

/// Library-wide error type for coupling operations.
///
/// Every variant is a condition that must be reported to the caller before any output
/// is written: either a violated precondition (a caller bug) or a missing capability
/// (a configuration issue). Degenerate geometry and inactive cells are not errors;
/// they silently produce no output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CouplingError {
    /// The embedded mesh has greater intrinsic dimension than the space mesh.
    EmbeddedDimensionTooLarge { space_dim: usize, embedded_dim: usize },
    /// A distributed mesh was used as the lower-dimensional embedded side,
    /// which must be fully replicated on every process.
    DistributedEmbeddedMesh,
    /// The dimensions of an assembly target do not match the DOF counts of the
    /// participating spaces.
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// A component coupling selects incompatible component sets on the two sides,
    /// or does not match the DOF spaces it is applied to.
    ComponentMismatch {
        space_components: usize,
        embedded_components: usize,
    },
    /// The geometric tolerance is not a positive number.
    InvalidTolerance,
    /// The library was compiled without an exact geometry kernel.
    ExactGeometryUnavailable,
}

impl Display for CouplingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmbeddedDimensionTooLarge { space_dim, embedded_dim } => {
                write!(
                    f,
                    "The embedded mesh (dimension {}) cannot have greater dimension \
                     than the space mesh (dimension {})",
                    embedded_dim, space_dim
                )
            }
            Self::DistributedEmbeddedMesh => {
                write!(
                    f,
                    "The embedded mesh must be fully replicated, but a distributed mesh was provided"
                )
            }
            Self::ShapeMismatch { expected, found } => {
                write!(
                    f,
                    "The assembly target has dimensions {}x{}, but the DOF spaces require {}x{}",
                    found.0, found.1, expected.0, expected.1
                )
            }
            Self::ComponentMismatch {
                space_components,
                embedded_components,
            } => {
                write!(
                    f,
                    "Incompatible component selection: {} space component(s) against \
                     {} embedded component(s)",
                    space_components, embedded_components
                )
            }
            Self::InvalidTolerance => {
                write!(f, "The intersection tolerance must be a positive number")
            }
            Self::ExactGeometryUnavailable => {
                write!(
                    f,
                    "No exact geometry kernel is available; \
                     recompile with the `exact-geometry` feature enabled"
                )
            }
        }
    }
}

impl std::error::Error for CouplingError {}

pub(crate) fn require_exact_geometry() -> Result<(), CouplingError> {
    if cfg!(feature = "exact-geometry") {
        Ok(())
    } else {
        Err(CouplingError::ExactGeometryUnavailable)
    }
}

pub(crate) fn validate_tolerance<T: Real>(tolerance: T) -> Result<(), CouplingError> {
    // Comparisons with NaN are false, so NaN tolerances are rejected as well
    if tolerance > T::zero() {
        Ok(())
    } else {
        Err(CouplingError::InvalidTolerance)
    }
}
