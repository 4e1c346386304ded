//! Construction of coupling sparsity patterns.
//!
//! Two builders populate a [`CouplingSparsity`] target. [`build_coupling_sparsity`]
//! consumes intersection records and registers exactly the structural nonzeros that
//! the form assemblers write, while [`build_candidate_coupling_sparsity`] registers
//! every broad-phase candidate pair without running the narrow phase. The candidate
//! pattern is a superset of the exact one and much cheaper to build.
use crate::allocators::TriDimAllocator;
use crate::assembly::targets::CouplingSparsity;
use crate::assembly::{validate_coupling_pair, validate_shape, CouplingSide};
use crate::constraints::AffineConstraints;
use crate::dof::ComponentCoupling;
use crate::element::ElementConnectivity;
use crate::intersection::IntersectionRecord;
use crate::spatial_index::BoundingBoxTree;
use crate::{CouplingError, Real};
use nalgebra::{DefaultAllocator, U2};

/// Registers the structural nonzeros induced by a set of intersection records.
///
/// For every record, each pair of one space cell DOF and one embedded cell DOF whose
/// components couple under `coupling` is registered in `sparsity`, with constrained
/// DOFs on either side expanded into the DOFs they depend on.
///
/// The pattern must have one row per space DOF and one column per embedded DOF.
/// Errors are reported before the first write, so a failed call leaves `sparsity`
/// untouched.
pub fn build_coupling_sparsity<T, C0, C1, S>(
    records: &[IntersectionRecord<T>],
    space: &CouplingSide<T, U2, C0>,
    embedded: &CouplingSide<T, U2, C1>,
    coupling: &ComponentCoupling,
    space_constraints: &AffineConstraints<T>,
    embedded_constraints: &AffineConstraints<T>,
    sparsity: &mut S,
) -> Result<(), CouplingError>
where
    T: Real,
    C0: ElementConnectivity<T, GeometryDim = U2>,
    C1: ElementConnectivity<T, GeometryDim = U2>,
    S: CouplingSparsity + ?Sized,
    DefaultAllocator: TriDimAllocator<T, U2, C0::ReferenceDim, C1::ReferenceDim>,
{
    validate_coupling_pair(space, embedded)?;
    validate_shape(
        (space.dofs.n_dofs(), embedded.dofs.n_dofs()),
        (sparsity.nrows(), sparsity.ncols()),
    )?;
    let dof_mask = coupling.dof_pair_mask(space.dofs, embedded.dofs);

    for record in records {
        space_constraints.add_entries_local_to_global(
            space.dofs.cell_dofs(record.space_cell),
            embedded_constraints,
            embedded.dofs.cell_dofs(record.embedded_cell),
            dof_mask.as_ref(),
            sparsity,
        );
    }
    Ok(())
}

/// Registers the structural nonzeros of all broad-phase candidate cell pairs.
///
/// A candidate pair is a locally owned, active embedded cell whose bounding box
/// overlaps the fattened bounding box of an active space cell. No narrow-phase
/// intersection is performed, so the resulting pattern is a superset of the one
/// produced by [`build_coupling_sparsity`] from records computed on the same meshes
/// and statuses.
pub fn build_candidate_coupling_sparsity<T, C0, C1, S>(
    space: &CouplingSide<T, U2, C0>,
    embedded: &CouplingSide<T, U2, C1>,
    coupling: &ComponentCoupling,
    space_constraints: &AffineConstraints<T>,
    embedded_constraints: &AffineConstraints<T>,
    sparsity: &mut S,
) -> Result<(), CouplingError>
where
    T: Real,
    C0: ElementConnectivity<T, GeometryDim = U2>,
    C1: ElementConnectivity<T, GeometryDim = U2>,
    S: CouplingSparsity + ?Sized,
    DefaultAllocator: TriDimAllocator<T, U2, C0::ReferenceDim, C1::ReferenceDim>,
{
    validate_coupling_pair(space, embedded)?;
    validate_shape(
        (space.dofs.n_dofs(), embedded.dofs.n_dofs()),
        (sparsity.nrows(), sparsity.ncols()),
    )?;
    let dof_mask = coupling.dof_pair_mask(space.dofs, embedded.dofs);

    let tree = BoundingBoxTree::from_mesh_with_status(space.mesh, space.status);
    for (embedded_cell, bounding_box) in embedded.mesh.cell_bounding_boxes().iter().enumerate() {
        if !embedded.status.is_locally_owned(embedded_cell) || !embedded.status.is_active(embedded_cell) {
            continue;
        }
        let embedded_dofs = embedded.dofs.cell_dofs(embedded_cell);
        for space_cell in tree.overlapping_cells(bounding_box) {
            if !space.status.is_active(space_cell) {
                continue;
            }
            space_constraints.add_entries_local_to_global(
                space.dofs.cell_dofs(space_cell),
                embedded_constraints,
                embedded_dofs,
                dof_mask.as_ref(),
                sparsity,
            );
        }
    }
    Ok(())
}
