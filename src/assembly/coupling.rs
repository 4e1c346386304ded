//! Assembly of L2 mass coupling matrices.
//!
//! The mass coupling block is the rectangular matrix of the bilinear form that pairs
//! a basis function of the space field with a basis function of the embedded field,
//! integrated over the geometric overlap of the two meshes. It appears as the
//! off-diagonal block of saddle point systems for Lagrange multiplier coupling and as
//! the transfer operator of projection-based schemes.
//!
//! Two assembly strategies are provided. [`assemble_coupling_mass_matrix`] integrates
//! exactly over precomputed intersection records, while
//! [`assemble_coupling_mass_matrix_from_points`] pushes a reference quadrature of the
//! embedded cells forward and locates the points in the space mesh. The latter avoids
//! the narrow phase entirely at the price of a quadrature error along cut cell
//! boundaries.
use crate::allocators::TriDimAllocator;
use crate::assembly::targets::CouplingMatrix;
use crate::assembly::{validate_coupling_pair, validate_shape, CouplingSide, CouplingWorkspace};
use crate::connectivity::CellConnectivity;
use crate::constraints::AffineConstraints;
use crate::dof::{ComponentCoupling, DofSpace};
use crate::element::{ElementConnectivity, FiniteElement, MapPhysicalCoordinates, ReferenceFiniteElement};
use crate::geometry::ConvexPolygon;
use crate::intersection::IntersectionRecord;
use crate::quadrature::QuadraturePair;
use crate::spatial_index::BoundingBoxTree;
use crate::{CouplingError, Real};
use itertools::izip;
use nalgebra::{DMatrix, DefaultAllocator, Point2, U2};
use std::collections::BTreeMap;

/// Assembles the rectangular L2 mass coupling matrix from intersection records.
///
/// For every record, entry (i, j) accumulates `phi_i(x_q) * phi_j(x_q) * w_q` over
/// the record quadrature, where `phi_i` is a basis function of the space field,
/// `phi_j` a basis function of the embedded field and `(w_q, x_q)` the physical
/// quadrature rule of the record. Pairs whose components do not couple under
/// `coupling` are skipped, and constrained DOFs on either side are redistributed to
/// the DOFs they depend on.
///
/// The matrix must have one row per space DOF and one column per embedded DOF, and
/// its sparsity must cover the pattern produced by [`build_coupling_sparsity`] for
/// the same records (a superset such as the candidate pattern works equally well).
/// Errors are reported before the first write, so a failed call leaves `matrix`
/// untouched.
///
/// [`build_coupling_sparsity`]: crate::assembly::topology::build_coupling_sparsity
pub fn assemble_coupling_mass_matrix<T, C0, C1, M>(
    records: &[IntersectionRecord<T>],
    space: &CouplingSide<T, U2, C0>,
    embedded: &CouplingSide<T, U2, C1>,
    coupling: &ComponentCoupling,
    space_constraints: &AffineConstraints<T>,
    embedded_constraints: &AffineConstraints<T>,
    matrix: &mut M,
) -> Result<(), CouplingError>
where
    T: Real,
    C0: ElementConnectivity<T, GeometryDim = U2>,
    C0::Element: MapPhysicalCoordinates<T>,
    C1: ElementConnectivity<T, GeometryDim = U2>,
    C1::Element: MapPhysicalCoordinates<T>,
    M: CouplingMatrix<T> + ?Sized,
    DefaultAllocator: TriDimAllocator<T, U2, C0::ReferenceDim, C1::ReferenceDim>,
{
    validate_coupling_pair(space, embedded)?;
    validate_shape(
        (space.dofs.n_dofs(), embedded.dofs.n_dofs()),
        (matrix.nrows(), matrix.ncols()),
    )?;
    let dof_mask = coupling.dof_pair_mask(space.dofs, embedded.dofs);

    let mut workspace = CouplingWorkspace::default();
    workspace
        .space_basis
        .resize(space.dofs.dofs_per_cell() / space.dofs.n_components(), T::zero());
    workspace
        .embedded_basis
        .resize(embedded.dofs.dofs_per_cell() / embedded.dofs.n_components(), T::zero());
    workspace
        .local_matrix
        .resize_mut(space.dofs.dofs_per_cell(), embedded.dofs.dofs_per_cell(), T::zero());

    for record in records {
        let space_element = space.element(record.space_cell);
        let embedded_element = embedded.element(record.embedded_cell);

        workspace.local_matrix.fill(T::zero());
        let (weights, points) = &record.quadrature;
        for (weight, x) in izip!(weights, points) {
            // Records only pair cells with non-degenerate overlap, so the inverse maps
            // cannot fail for quadrature points inside both cells.
            let space_xi = space_element
                .map_physical_coords(x)
                .expect("Quadrature point of an intersection record must be invertible in its space cell.");
            let embedded_xi = embedded_element
                .map_physical_coords(x)
                .expect("Quadrature point of an intersection record must be invertible in its embedded cell.");
            space_element.populate_basis(&mut workspace.space_basis, &space_xi);
            embedded_element.populate_basis(&mut workspace.embedded_basis, &embedded_xi);
            add_local_mass_terms(&mut workspace, space.dofs, embedded.dofs, dof_mask.as_ref(), *weight);
        }

        space_constraints.distribute_local_to_global(
            &workspace.local_matrix,
            space.dofs.cell_dofs(record.space_cell),
            embedded_constraints,
            embedded.dofs.cell_dofs(record.embedded_cell),
            matrix,
        );
    }
    Ok(())
}

/// Assembles the L2 mass coupling matrix by point location instead of exact
/// intersection.
///
/// The caller supplies a quadrature rule on the reference cell of the embedded mesh.
/// For every locally owned, active embedded cell the rule is pushed forward to
/// physical space, each point is located in the space mesh through the bounding box
/// tree, and its contribution is accumulated against the containing space cell.
/// Points outside the space mesh or covered only by inactive space cells contribute
/// nothing, exactly like geometry that no intersection record covers. A point on a
/// boundary shared between space cells is attributed to the lowest containing cell
/// index.
///
/// This trades the cost of the narrow phase for a quadrature error along cut cell
/// boundaries, where the integrand is only piecewise smooth.
pub fn assemble_coupling_mass_matrix_from_points<T, C0, C1, M>(
    space: &CouplingSide<T, U2, C0>,
    embedded: &CouplingSide<T, U2, C1>,
    coupling: &ComponentCoupling,
    reference_quadrature: &QuadraturePair<T, C1::ReferenceDim>,
    space_constraints: &AffineConstraints<T>,
    embedded_constraints: &AffineConstraints<T>,
    matrix: &mut M,
) -> Result<(), CouplingError>
where
    T: Real,
    C0: CellConnectivity<T, U2> + ElementConnectivity<T, GeometryDim = U2>,
    C0::Cell: Into<ConvexPolygon<T>>,
    C0::Element: MapPhysicalCoordinates<T>,
    C1: ElementConnectivity<T, GeometryDim = U2>,
    M: CouplingMatrix<T> + ?Sized,
    DefaultAllocator: TriDimAllocator<T, U2, C0::ReferenceDim, C1::ReferenceDim>,
{
    validate_coupling_pair(space, embedded)?;
    validate_shape(
        (space.dofs.n_dofs(), embedded.dofs.n_dofs()),
        (matrix.nrows(), matrix.ncols()),
    )?;
    let dof_mask = coupling.dof_pair_mask(space.dofs, embedded.dofs);
    let (reference_weights, reference_points) = reference_quadrature;

    let tree = BoundingBoxTree::from_mesh_with_status(space.mesh, space.status);
    let mut workspace = CouplingWorkspace::default();
    workspace
        .space_basis
        .resize(space.dofs.dofs_per_cell() / space.dofs.n_components(), T::zero());
    workspace
        .embedded_basis
        .resize(embedded.dofs.dofs_per_cell() / embedded.dofs.n_components(), T::zero());
    workspace
        .local_matrix
        .resize_mut(space.dofs.dofs_per_cell(), embedded.dofs.dofs_per_cell(), T::zero());

    let mut physical_weights = Vec::with_capacity(reference_weights.len());
    let mut physical_points = Vec::with_capacity(reference_points.len());

    for embedded_cell in 0..embedded.mesh.connectivity().len() {
        if !embedded.status.is_locally_owned(embedded_cell) || !embedded.status.is_active(embedded_cell) {
            continue;
        }
        let embedded_element = embedded.element(embedded_cell);

        physical_weights.clear();
        physical_points.clear();
        for (weight, xi) in izip!(reference_weights, reference_points) {
            let jacobian = embedded_element.reference_jacobian(xi);
            let metric = (jacobian.transpose() * jacobian).determinant().sqrt();
            physical_weights.push(*weight * metric);
            physical_points.push(embedded_element.map_reference_coords(xi));
        }

        // Group the quadrature points of this cell by the space cell containing them,
        // so that each overlapped space cell receives a single scatter.
        let mut points_per_space_cell = BTreeMap::new();
        for (point_index, x) in physical_points.iter().enumerate() {
            if let Some(space_cell) = locate_point_in_space_mesh(&tree, space, x) {
                points_per_space_cell
                    .entry(space_cell)
                    .or_insert_with(Vec::new)
                    .push(point_index);
            }
        }

        for (space_cell, point_indices) in points_per_space_cell {
            let space_element = space.element(space_cell);
            workspace.local_matrix.fill(T::zero());
            for point_index in point_indices {
                let x = &physical_points[point_index];
                let space_xi = space_element
                    .map_physical_coords(x)
                    .expect("Point located inside a space cell must be invertible in that cell.");
                space_element.populate_basis(&mut workspace.space_basis, &space_xi);
                embedded_element.populate_basis(&mut workspace.embedded_basis, &reference_points[point_index]);
                add_local_mass_terms(
                    &mut workspace,
                    space.dofs,
                    embedded.dofs,
                    dof_mask.as_ref(),
                    physical_weights[point_index],
                );
            }
            space_constraints.distribute_local_to_global(
                &workspace.local_matrix,
                space.dofs.cell_dofs(space_cell),
                embedded_constraints,
                embedded.dofs.cell_dofs(embedded_cell),
                matrix,
            );
        }
    }
    Ok(())
}

// Adds the weighted product of the buffered basis values to the local matrix for
// every coupled local DOF pair.
fn add_local_mass_terms<T: Real>(
    workspace: &mut CouplingWorkspace<T>,
    space_dofs: &DofSpace,
    embedded_dofs: &DofSpace,
    dof_mask: Option<&DMatrix<bool>>,
    weight: T,
) {
    for local_i in 0..workspace.local_matrix.nrows() {
        let phi_i = workspace.space_basis[space_dofs.local_node(local_i)];
        for local_j in 0..workspace.local_matrix.ncols() {
            if dof_mask.map_or(true, |mask| mask[(local_i, local_j)]) {
                let phi_j = workspace.embedded_basis[embedded_dofs.local_node(local_j)];
                workspace.local_matrix[(local_i, local_j)] += phi_i * phi_j * weight;
            }
        }
    }
}

fn locate_point_in_space_mesh<T, C0>(
    tree: &BoundingBoxTree<U2>,
    space: &CouplingSide<T, U2, C0>,
    x: &Point2<T>,
) -> Option<usize>
where
    T: Real,
    C0: CellConnectivity<T, U2>,
    C0::Cell: Into<ConvexPolygon<T>>,
{
    tree.cells_containing_point(x)
        .filter(|&space_cell| space.status.is_active(space_cell))
        .filter(|&space_cell| {
            let polygon: ConvexPolygon<T> = space
                .mesh
                .get_cell(space_cell)
                .expect("Mesh is not allowed to contain cells with indices out of bounds.")
                .into();
            polygon.contains_point(x)
        })
        .min()
}
