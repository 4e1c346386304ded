//! Assembly of coupling operators from intersection records.
//!
//! The assemblers in this module consume the records produced by the intersection
//! pipeline and populate caller-owned sparse structures through the target traits in
//! [`targets`]. The coupling topology builders in [`topology`] register structural
//! nonzeros, and the form assemblers in [`coupling`] and [`nitsche`] accumulate the
//! corresponding values. Every entry point validates its preconditions before the
//! first write, so a failed call leaves its output untouched.
pub mod coupling;
pub mod nitsche;
pub mod targets;
pub mod topology;

pub use coupling::{assemble_coupling_mass_matrix, assemble_coupling_mass_matrix_from_points};
pub use nitsche::{assemble_nitsche_matrix, assemble_nitsche_rhs};
pub use targets::{CouplingMatrix, CouplingSparsity, CouplingVector, SparsityPatternBuilder};
pub use topology::{build_candidate_coupling_sparsity, build_coupling_sparsity};

use crate::allocators::BiDimAllocator;
use crate::dof::DofSpace;
use crate::element::ElementConnectivity;
use crate::mesh::{CellStatus, Mesh};
use crate::{CouplingError, Real, SmallDim};
use nalgebra::allocator::Allocator;
use nalgebra::{DMatrix, DVector, DefaultAllocator, DimName, Scalar};

/// One side of a coupling: a mesh together with its DOF space and cell status.
#[derive(Debug)]
pub struct CouplingSide<'a, T, D, C>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub mesh: &'a Mesh<T, D, C>,
    pub dofs: &'a DofSpace,
    pub status: &'a CellStatus,
}

impl<'a, T, D, C> CouplingSide<'a, T, D, C>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    /// Bundles one side of a coupling.
    ///
    /// # Panics
    ///
    /// Panics if the DOF space or the cell status describe a different number of cells
    /// than the mesh.
    pub fn new(mesh: &'a Mesh<T, D, C>, dofs: &'a DofSpace, status: &'a CellStatus) -> Self {
        assert_eq!(
            dofs.num_cells(),
            mesh.connectivity().len(),
            "DOF space must describe the same number of cells as the mesh."
        );
        assert_eq!(
            status.num_cells(),
            mesh.connectivity().len(),
            "Cell status must describe the same number of cells as the mesh."
        );
        Self { mesh, dofs, status }
    }
}

impl<'a, T, D, C> CouplingSide<'a, T, D, C>
where
    T: Real,
    D: SmallDim,
    C: ElementConnectivity<T, GeometryDim = D>,
    DefaultAllocator: BiDimAllocator<T, D, C::ReferenceDim>,
{
    pub(crate) fn element(&self, cell_index: usize) -> C::Element {
        self.mesh.connectivity()[cell_index]
            .element(self.mesh.vertices())
            .expect("Mesh is not allowed to contain cells with indices out of bounds.")
    }
}

// Checks the dimension ordering and replication preconditions shared by all
// record-driven assembly entry points.
pub(crate) fn validate_coupling_pair<T, D, C0, C1>(
    _space: &CouplingSide<T, D, C0>,
    embedded: &CouplingSide<T, D, C1>,
) -> Result<(), CouplingError>
where
    T: Real,
    D: SmallDim,
    C0: ElementConnectivity<T, GeometryDim = D>,
    C1: ElementConnectivity<T, GeometryDim = D>,
    DefaultAllocator: BiDimAllocator<T, D, C0::ReferenceDim> + BiDimAllocator<T, D, C1::ReferenceDim>,
{
    let space_dim = C0::ReferenceDim::dim();
    let embedded_dim = C1::ReferenceDim::dim();
    if embedded_dim > space_dim {
        return Err(CouplingError::EmbeddedDimensionTooLarge { space_dim, embedded_dim });
    }
    if embedded_dim < space_dim && embedded.status.is_distributed() {
        return Err(CouplingError::DistributedEmbeddedMesh);
    }
    Ok(())
}

pub(crate) fn validate_shape(expected: (usize, usize), found: (usize, usize)) -> Result<(), CouplingError> {
    if found == expected {
        Ok(())
    } else {
        Err(CouplingError::ShapeMismatch { expected, found })
    }
}

/// Scratch buffers for the record-driven assembly loops.
///
/// Allocated once per assembly call and reused across records.
#[derive(Debug)]
pub(crate) struct CouplingWorkspace<T: Scalar> {
    pub(crate) space_basis: Vec<T>,
    pub(crate) embedded_basis: Vec<T>,
    pub(crate) local_matrix: DMatrix<T>,
    pub(crate) local_vector: DVector<T>,
}

impl<T: Real> Default for CouplingWorkspace<T> {
    fn default() -> Self {
        Self {
            space_basis: Vec::new(),
            embedded_basis: Vec::new(),
            local_matrix: DMatrix::zeros(0, 0),
            local_vector: DVector::zeros(0),
        }
    }
}
