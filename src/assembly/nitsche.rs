//! Assembly of Nitsche penalty terms.
//!
//! Nitsche coupling enforces a prescribed value on the embedded geometry weakly,
//! through penalty terms that involve the space field alone. The embedded mesh
//! contributes quadrature geometry but no basis functions, so the penalty matrix is
//! square over the space DOFs and is typically added onto the stiffness block of the
//! system.
//!
//! For a record quadrature point `x_q` with weight `w_q` inside space cell `K`, the
//! matrix assembler accumulates
//!
//! ```text
//! coefficient(x_q) * (penalty / h_K) * phi_i(x_q) * phi_j(x_q) * w_q
//! ```
//!
//! into entry (i, j), where `h_K` is the diameter of `K`. The right-hand side
//! assembler accumulates the same expression with `phi_j(x_q)` replaced by the
//! prescribed `target_value(x_q)`.
use crate::allocators::TriDimAllocator;
use crate::assembly::targets::{CouplingMatrix, CouplingVector};
use crate::assembly::{validate_coupling_pair, validate_shape, CouplingSide, CouplingWorkspace};
use crate::constraints::AffineConstraints;
use crate::dof::ComponentCoupling;
use crate::element::{ElementConnectivity, FiniteElement, MapPhysicalCoordinates, ReferenceFiniteElement};
use crate::intersection::IntersectionRecord;
use crate::{CouplingError, Real};
use itertools::izip;
use nalgebra::{DefaultAllocator, Point2, U2};

/// Assembles the Nitsche penalty matrix over the space DOFs.
///
/// Only pairs of space DOFs whose component is selected on the space side of
/// `coupling` receive contributions, and space constraints are applied to both rows
/// and columns. Records whose space cell is inactive are skipped silently, so a
/// caller can deactivate cut cells without recomputing the records.
///
/// The matrix must be square with one row per space DOF. Errors are reported before
/// the first write, so a failed call leaves `matrix` untouched.
///
/// # Panics
///
/// Panics if `penalty` is not positive or if `coupling` does not match the number of
/// components of the space DOF space.
pub fn assemble_nitsche_matrix<T, C0, C1, F, M>(
    records: &[IntersectionRecord<T>],
    space: &CouplingSide<T, U2, C0>,
    embedded: &CouplingSide<T, U2, C1>,
    coupling: &ComponentCoupling,
    penalty: T,
    coefficient: F,
    space_constraints: &AffineConstraints<T>,
    matrix: &mut M,
) -> Result<(), CouplingError>
where
    T: Real,
    C0: ElementConnectivity<T, GeometryDim = U2>,
    C0::Element: MapPhysicalCoordinates<T>,
    C1: ElementConnectivity<T, GeometryDim = U2>,
    F: Fn(&Point2<T>) -> T,
    M: CouplingMatrix<T> + ?Sized,
    DefaultAllocator: TriDimAllocator<T, U2, C0::ReferenceDim, C1::ReferenceDim>,
{
    assert!(penalty > T::zero(), "Penalty parameter must be positive.");
    assert_eq!(
        coupling.n_space_components(),
        space.dofs.n_components(),
        "Coupling rule must match the number of components of the space field."
    );
    validate_coupling_pair(space, embedded)?;
    validate_shape(
        (space.dofs.n_dofs(), space.dofs.n_dofs()),
        (matrix.nrows(), matrix.ncols()),
    )?;

    let mut workspace = CouplingWorkspace::default();
    workspace
        .space_basis
        .resize(space.dofs.dofs_per_cell() / space.dofs.n_components(), T::zero());
    workspace
        .local_matrix
        .resize_mut(space.dofs.dofs_per_cell(), space.dofs.dofs_per_cell(), T::zero());

    for record in records {
        if !space.status.is_active(record.space_cell) {
            continue;
        }
        let space_element = space.element(record.space_cell);
        let space_dofs = space.dofs.cell_dofs(record.space_cell);
        let penalty_per_h = penalty / space_element.diameter();

        workspace.local_matrix.fill(T::zero());
        let (weights, points) = &record.quadrature;
        for (weight, x) in izip!(weights, points) {
            let space_xi = space_element
                .map_physical_coords(x)
                .expect("Quadrature point of an intersection record must be invertible in its space cell.");
            space_element.populate_basis(&mut workspace.space_basis, &space_xi);
            let scaling = coefficient(x) * penalty_per_h * *weight;
            for local_i in 0..space_dofs.len() {
                let component_i = space.dofs.local_component(local_i);
                let phi_i = workspace.space_basis[space.dofs.local_node(local_i)];
                for local_j in 0..space_dofs.len() {
                    if coupling.space_pair_couples(component_i, space.dofs.local_component(local_j)) {
                        let phi_j = workspace.space_basis[space.dofs.local_node(local_j)];
                        workspace.local_matrix[(local_i, local_j)] += scaling * phi_i * phi_j;
                    }
                }
            }
        }

        space_constraints.distribute_local_to_global(
            &workspace.local_matrix,
            space_dofs,
            space_constraints,
            space_dofs,
            matrix,
        );
    }
    Ok(())
}

/// Assembles the Nitsche penalty right-hand side over the space DOFs.
///
/// Entry `i` accumulates the penalty expression against `target_value(x_q)` for
/// every quadrature point of every record, restricted to space DOFs whose component
/// is selected on the space side of `coupling`. Records whose space cell is inactive
/// are skipped silently.
///
/// The vector must have one entry per space DOF. Errors are reported before the
/// first write, so a failed call leaves `rhs` untouched.
///
/// # Panics
///
/// Panics if `penalty` is not positive or if `coupling` does not match the number of
/// components of the space DOF space.
pub fn assemble_nitsche_rhs<T, C0, C1, F, G, V>(
    records: &[IntersectionRecord<T>],
    space: &CouplingSide<T, U2, C0>,
    embedded: &CouplingSide<T, U2, C1>,
    coupling: &ComponentCoupling,
    penalty: T,
    coefficient: F,
    target_value: G,
    space_constraints: &AffineConstraints<T>,
    rhs: &mut V,
) -> Result<(), CouplingError>
where
    T: Real,
    C0: ElementConnectivity<T, GeometryDim = U2>,
    C0::Element: MapPhysicalCoordinates<T>,
    C1: ElementConnectivity<T, GeometryDim = U2>,
    F: Fn(&Point2<T>) -> T,
    G: Fn(&Point2<T>) -> T,
    V: CouplingVector<T> + ?Sized,
    DefaultAllocator: TriDimAllocator<T, U2, C0::ReferenceDim, C1::ReferenceDim>,
{
    assert!(penalty > T::zero(), "Penalty parameter must be positive.");
    assert_eq!(
        coupling.n_space_components(),
        space.dofs.n_components(),
        "Coupling rule must match the number of components of the space field."
    );
    validate_coupling_pair(space, embedded)?;
    validate_shape((space.dofs.n_dofs(), 1), (rhs.len(), 1))?;

    let mut workspace = CouplingWorkspace::default();
    workspace
        .space_basis
        .resize(space.dofs.dofs_per_cell() / space.dofs.n_components(), T::zero());
    workspace
        .local_vector
        .resize_vertically_mut(space.dofs.dofs_per_cell(), T::zero());

    for record in records {
        if !space.status.is_active(record.space_cell) {
            continue;
        }
        let space_element = space.element(record.space_cell);
        let space_dofs = space.dofs.cell_dofs(record.space_cell);
        let penalty_per_h = penalty / space_element.diameter();

        workspace.local_vector.fill(T::zero());
        let (weights, points) = &record.quadrature;
        for (weight, x) in izip!(weights, points) {
            let space_xi = space_element
                .map_physical_coords(x)
                .expect("Quadrature point of an intersection record must be invertible in its space cell.");
            space_element.populate_basis(&mut workspace.space_basis, &space_xi);
            let scaling = coefficient(x) * penalty_per_h * target_value(x) * *weight;
            for local_i in 0..space_dofs.len() {
                let component_i = space.dofs.local_component(local_i);
                if coupling.space_pair_couples(component_i, component_i) {
                    workspace.local_vector[local_i] += scaling * workspace.space_basis[space.dofs.local_node(local_i)];
                }
            }
        }

        space_constraints.distribute_local_to_global_vector(&workspace.local_vector, space_dofs, rhs);
    }
    Ok(())
}
