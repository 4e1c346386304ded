//! Degree-of-freedom bookkeeping for nodal finite element spaces.
//!
//! A [`DofSpace`] assigns global degree-of-freedom (DOF) indices to the cells of a
//! mesh. Coupling assembly works with two independent DOF spaces, one per mesh, and a
//! [`ComponentCoupling`] rule that decides which solution components of the two sides
//! are allowed to interact.
use crate::connectivity::Connectivity;
use crate::mesh::Mesh;
use crate::CouplingError;
use nalgebra::allocator::Allocator;
use nalgebra::{DMatrix, DefaultAllocator, DimName, Scalar};
use serde::{Deserialize, Serialize};

/// The association between cells of a mesh and global degrees of freedom.
///
/// Every mesh vertex carries one DOF per solution component, and the components of a
/// vertex are numbered consecutively, so that vertex `v` owns the global DOFs
/// `n_components * v + c` for `c = 0 .. n_components`. The DOFs of a cell are the DOFs
/// of its vertices, in connectivity order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofSpace {
    n_dofs: usize,
    n_components: usize,
    dofs_per_cell: usize,
    num_cells: usize,
    cell_dofs: Vec<usize>,
}

impl DofSpace {
    /// Constructs the DOF space of a scalar solution field on the given mesh.
    pub fn scalar<T, D, C>(mesh: &Mesh<T, D, C>) -> Self
    where
        T: Scalar,
        D: DimName,
        C: Connectivity,
        DefaultAllocator: Allocator<T, D>,
    {
        Self::vector(mesh, 1)
    }

    /// Constructs the DOF space of a vector-valued solution field with the given number
    /// of components on the given mesh.
    ///
    /// # Panics
    ///
    /// Panics if `n_components == 0` or if the cells of the mesh do not all have the
    /// same number of vertices.
    pub fn vector<T, D, C>(mesh: &Mesh<T, D, C>, n_components: usize) -> Self
    where
        T: Scalar,
        D: DimName,
        C: Connectivity,
        DefaultAllocator: Allocator<T, D>,
    {
        assert!(n_components > 0, "A DOF space must have at least one component.");
        let nodes_per_cell = mesh
            .connectivity()
            .first()
            .map_or(0, |conn| conn.vertex_indices().len());
        let mut cell_dofs = Vec::with_capacity(mesh.connectivity().len() * nodes_per_cell * n_components);
        for conn in mesh.connectivity() {
            assert_eq!(
                conn.vertex_indices().len(),
                nodes_per_cell,
                "All cells of the mesh must have the same number of vertices."
            );
            for &vertex in conn.vertex_indices() {
                for component in 0..n_components {
                    cell_dofs.push(n_components * vertex + component);
                }
            }
        }
        Self {
            n_dofs: n_components * mesh.vertices().len(),
            n_components,
            dofs_per_cell: n_components * nodes_per_cell,
            num_cells: mesh.connectivity().len(),
            cell_dofs,
        }
    }

    /// The total number of DOFs in the space.
    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    /// The number of components of the solution field.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// The number of DOFs associated with each cell.
    pub fn dofs_per_cell(&self) -> usize {
        self.dofs_per_cell
    }

    pub fn num_cells(&self) -> usize {
        self.num_cells
    }

    /// The global DOF indices associated with the given cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell index is out of bounds.
    pub fn cell_dofs(&self, cell_index: usize) -> &[usize] {
        assert!(cell_index < self.num_cells, "Cell index must be in bounds.");
        let begin = cell_index * self.dofs_per_cell;
        &self.cell_dofs[begin..begin + self.dofs_per_cell]
    }

    /// The component of the solution field that the given local DOF belongs to.
    pub fn local_component(&self, local_index: usize) -> usize {
        local_index % self.n_components
    }

    /// The local node that the given local DOF belongs to.
    pub fn local_node(&self, local_index: usize) -> usize {
        local_index / self.n_components
    }
}

/// A boolean selection of the components of a vector-valued solution field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMask {
    selected: Vec<bool>,
}

impl ComponentMask {
    /// A mask selecting every component of a field with the given number of components.
    pub fn all(n_components: usize) -> Self {
        Self {
            selected: vec![true; n_components],
        }
    }

    /// A mask selecting a single component.
    ///
    /// # Panics
    ///
    /// Panics if `component >= n_components`.
    pub fn single(component: usize, n_components: usize) -> Self {
        assert!(
            component < n_components,
            "Selected component must be smaller than the number of components."
        );
        let mut selected = vec![false; n_components];
        selected[component] = true;
        Self { selected }
    }

    /// A mask selecting exactly the components whose flag is set.
    pub fn from_selected(selected: Vec<bool>) -> Self {
        Self { selected }
    }

    /// The number of components of the field the mask applies to.
    pub fn n_components(&self) -> usize {
        self.selected.len()
    }

    /// The number of selected components.
    pub fn n_selected(&self) -> usize {
        self.selected.iter().filter(|&&selected| selected).count()
    }

    pub fn is_selected(&self, component: usize) -> bool {
        self.selected[component]
    }
}

/// A rule describing which components of the space field couple to which components of
/// the embedded field.
///
/// The rule is defined by one [`ComponentMask`] per side. Both masks must select the
/// same number of components, and the k-th selected component on the space side couples
/// to the k-th selected component on the embedded side. Local DOF pairs whose components
/// do not couple contribute neither sparsity entries nor matrix values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCoupling {
    // Position of each component within the selected subset of its mask,
    // or None if the component is not selected
    space_slots: Vec<Option<usize>>,
    embedded_slots: Vec<Option<usize>>,
}

impl ComponentCoupling {
    /// The default rule: every component couples to the component at the same position.
    ///
    /// # Panics
    ///
    /// Panics if the two fields do not have the same number of components. Fields with
    /// differing component counts must be coupled through explicit masks with
    /// [`ComponentCoupling::from_masks`].
    pub fn identity(space_components: usize, embedded_components: usize) -> Self {
        assert_eq!(
            space_components, embedded_components,
            "Identity coupling requires the same number of components on both sides."
        );
        Self {
            space_slots: (0..space_components).map(Some).collect(),
            embedded_slots: (0..embedded_components).map(Some).collect(),
        }
    }

    /// Builds a coupling rule from one component mask per side.
    ///
    /// Returns [`CouplingError::ComponentMismatch`] if the masks do not select the same
    /// number of components.
    pub fn from_masks(space_mask: &ComponentMask, embedded_mask: &ComponentMask) -> Result<Self, CouplingError> {
        if space_mask.n_selected() != embedded_mask.n_selected() {
            return Err(CouplingError::ComponentMismatch {
                space_components: space_mask.n_selected(),
                embedded_components: embedded_mask.n_selected(),
            });
        }
        Ok(Self {
            space_slots: Self::selection_slots(space_mask),
            embedded_slots: Self::selection_slots(embedded_mask),
        })
    }

    fn selection_slots(mask: &ComponentMask) -> Vec<Option<usize>> {
        let mut next_slot = 0;
        (0..mask.n_components())
            .map(|component| {
                mask.is_selected(component).then(|| {
                    let slot = next_slot;
                    next_slot += 1;
                    slot
                })
            })
            .collect()
    }

    pub fn n_space_components(&self) -> usize {
        self.space_slots.len()
    }

    pub fn n_embedded_components(&self) -> usize {
        self.embedded_slots.len()
    }

    /// Determines whether the given space component couples to the given embedded
    /// component.
    pub fn couples(&self, space_component: usize, embedded_component: usize) -> bool {
        match (
            self.space_slots[space_component],
            self.embedded_slots[embedded_component],
        ) {
            (Some(space_slot), Some(embedded_slot)) => space_slot == embedded_slot,
            _ => false,
        }
    }

    /// Determines whether two space components couple to each other.
    ///
    /// This is the coupling rule of space-only bilinear forms such as the Nitsche
    /// penalty term, where both basis functions come from the space side: a pair of
    /// components couples when it is twice the same selected component.
    pub fn space_pair_couples(&self, component_i: usize, component_j: usize) -> bool {
        component_i == component_j && self.space_slots[component_i].is_some()
    }

    /// Precomputes the local DOF-pair mask for cell pairs of the given DOF spaces.
    ///
    /// Entry `(i, j)` is `true` exactly when local space DOF `i` couples to local
    /// embedded DOF `j`. Returns `None` when every local pair couples, so that callers
    /// can skip the mask lookup entirely in the common all-scalar case.
    ///
    /// # Panics
    ///
    /// Panics if the component counts of the DOF spaces do not match the rule.
    pub fn dof_pair_mask(&self, space: &DofSpace, embedded: &DofSpace) -> Option<DMatrix<bool>> {
        assert_eq!(
            space.n_components(),
            self.n_space_components(),
            "Coupling rule must match the number of components of the space field."
        );
        assert_eq!(
            embedded.n_components(),
            self.n_embedded_components(),
            "Coupling rule must match the number of components of the embedded field."
        );
        if space.n_components() == 1 && embedded.n_components() == 1 && self.couples(0, 0) {
            return None;
        }
        Some(DMatrix::from_fn(space.dofs_per_cell(), embedded.dofs_per_cell(), |i, j| {
            self.couples(space.local_component(i), embedded.local_component(j))
        }))
    }
}
