//! Affine constraints on degrees of freedom.
//!
//! A constraint expresses one DOF as an affine combination of other DOFs,
//! `x_i = sum_k c_k x_k + b_i`. Typical sources are hanging nodes and strongly
//! eliminated boundary DOFs. During assembly, local contributions that touch a
//! constrained DOF are not written to it directly; they are redistributed onto the
//! DOFs it depends on, weighted by the constraint coefficients, so that the assembled
//! system never couples against eliminated unknowns.
use crate::assembly::targets::{CouplingMatrix, CouplingSparsity, CouplingVector};
use crate::Real;
use nalgebra::{DMatrix, DVector};
use rustc_hash::FxHashMap;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
struct ConstraintLine<T> {
    entries: Vec<(usize, T)>,
    inhomogeneity: T,
}

/// A set of affine constraints `x_i = sum_k c_k x_k + b_i` on the DOFs of one space.
///
/// Constraints are added one line at a time with [`add_constraint`][Self::add_constraint]
/// and must be closed with [`close`][Self::close] before use, so that no dependency of a
/// constraint line is itself constrained. An empty set is valid and leaves every
/// contribution untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct AffineConstraints<T> {
    lines: FxHashMap<usize, ConstraintLine<T>>,
}

impl<T> Default for AffineConstraints<T> {
    fn default() -> Self {
        Self {
            lines: FxHashMap::default(),
        }
    }
}

impl<T> AffineConstraints<T>
where
    T: Real,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the constraint line `x_dof = sum_k coefficient_k x_k + inhomogeneity`.
    ///
    /// # Panics
    ///
    /// Panics if the DOF is already constrained or appears among its own dependencies.
    pub fn add_constraint(&mut self, dof: usize, entries: Vec<(usize, T)>, inhomogeneity: T) {
        assert!(!self.lines.contains_key(&dof), "DOF is already constrained.");
        assert!(
            entries.iter().all(|&(dependency, _)| dependency != dof),
            "A constrained DOF cannot depend on itself."
        );
        self.lines.insert(dof, ConstraintLine { entries, inhomogeneity });
    }

    pub fn is_constrained(&self, dof: usize) -> bool {
        self.lines.contains_key(&dof)
    }

    pub fn n_constraints(&self) -> usize {
        self.lines.len()
    }

    /// Resolves dependencies between constraint lines by substitution.
    ///
    /// After a successful close, no dependency of any constraint line is itself
    /// constrained, and dependencies within a line are unique. Fails if the
    /// constraints contain a dependency cycle, in which case the set must be
    /// considered unusable.
    pub fn close(&mut self) -> Result<(), CyclicConstraintError> {
        // Every round substitutes one level of each dependency chain, so an acyclic
        // system is resolved after at most n_constraints rounds.
        for _ in 0..self.lines.len() {
            let unresolved: Vec<_> = self
                .lines
                .iter()
                .filter(|(_, line)| {
                    line.entries
                        .iter()
                        .any(|(dependency, _)| self.lines.contains_key(dependency))
                })
                .map(|(&dof, _)| dof)
                .collect();
            if unresolved.is_empty() {
                return Ok(());
            }
            for dof in unresolved {
                let mut line = self.lines.remove(&dof).expect("Unresolved DOF must have a line.");
                let mut substituted = Vec::with_capacity(line.entries.len());
                for (dependency, coefficient) in line.entries.drain(..) {
                    match self.lines.get(&dependency) {
                        Some(dependency_line) => {
                            for &(transitive, transitive_coefficient) in &dependency_line.entries {
                                substituted.push((transitive, coefficient * transitive_coefficient));
                            }
                            line.inhomogeneity += coefficient * dependency_line.inhomogeneity;
                        }
                        None => substituted.push((dependency, coefficient)),
                    }
                }
                // Merge duplicate dependencies introduced by the substitution
                substituted.sort_unstable_by_key(|&(dependency, _)| dependency);
                for (dependency, coefficient) in substituted {
                    match line.entries.last_mut() {
                        Some((last, last_coefficient)) if *last == dependency => *last_coefficient += coefficient,
                        _ => line.entries.push((dependency, coefficient)),
                    }
                }
                self.lines.insert(dof, line);
            }
        }

        let cyclic = self.lines.values().any(|line| {
            line.entries
                .iter()
                .any(|(dependency, _)| self.lines.contains_key(dependency))
        });
        if cyclic {
            Err(CyclicConstraintError)
        } else {
            Ok(())
        }
    }

    /// Resolves a DOF into the weighted global DOFs that assembly contributions to it
    /// must be written to. An unconstrained DOF resolves to itself with weight one.
    fn resolve(&self, dof: usize) -> impl '_ + Iterator<Item = (usize, T)> {
        let line = self.lines.get(&dof);
        let identity = if line.is_none() { Some((dof, T::one())) } else { None };
        line.into_iter()
            .flat_map(|line| line.entries.iter().copied())
            .chain(identity)
    }

    /// Registers the sparsity entries of a local cell-pair matrix, expanding
    /// constrained DOFs into their dependencies.
    ///
    /// `self` holds the constraints of the row DOFs, `col_constraints` those of the
    /// column DOFs. Local pairs excluded by the DOF-pair mask contribute nothing.
    /// Constrained global targets themselves receive no entries.
    pub fn add_entries_local_to_global<S>(
        &self,
        row_dofs: &[usize],
        col_constraints: &AffineConstraints<T>,
        col_dofs: &[usize],
        dof_mask: Option<&DMatrix<bool>>,
        sparsity: &mut S,
    ) where
        S: CouplingSparsity + ?Sized,
    {
        if let Some(mask) = dof_mask {
            assert_eq!(mask.nrows(), row_dofs.len(), "DOF-pair mask must have one row per row DOF.");
            assert_eq!(mask.ncols(), col_dofs.len(), "DOF-pair mask must have one column per column DOF.");
        }
        for (local_i, &row) in row_dofs.iter().enumerate() {
            for (local_j, &col) in col_dofs.iter().enumerate() {
                if dof_mask.map_or(true, |mask| mask[(local_i, local_j)]) {
                    for (global_row, _) in self.resolve(row) {
                        for (global_col, _) in col_constraints.resolve(col) {
                            sparsity.add_entry(global_row, global_col);
                        }
                    }
                }
            }
        }
    }

    /// Adds a local cell-pair matrix into a global matrix, expanding constrained DOFs
    /// into their dependencies with the constraint coefficients.
    ///
    /// Zero local entries are skipped, so local pairs that an assembler left untouched
    /// (for example because their components do not couple) never reach the target and
    /// need not be covered by its pattern. Inhomogeneities do not participate; they
    /// only enter solution recovery through [`distribute`][Self::distribute].
    pub fn distribute_local_to_global<M>(
        &self,
        local_matrix: &DMatrix<T>,
        row_dofs: &[usize],
        col_constraints: &AffineConstraints<T>,
        col_dofs: &[usize],
        matrix: &mut M,
    ) where
        M: CouplingMatrix<T> + ?Sized,
    {
        assert_eq!(local_matrix.nrows(), row_dofs.len(), "Local matrix must have one row per row DOF.");
        assert_eq!(
            local_matrix.ncols(),
            col_dofs.len(),
            "Local matrix must have one column per column DOF."
        );
        for (local_i, &row) in row_dofs.iter().enumerate() {
            for (local_j, &col) in col_dofs.iter().enumerate() {
                let value = local_matrix[(local_i, local_j)];
                if value != T::zero() {
                    for (global_row, row_coefficient) in self.resolve(row) {
                        for (global_col, col_coefficient) in col_constraints.resolve(col) {
                            matrix.add_entry(global_row, global_col, row_coefficient * col_coefficient * value);
                        }
                    }
                }
            }
        }
    }

    /// Adds a local vector into a global vector, expanding constrained DOFs into their
    /// dependencies with the constraint coefficients.
    ///
    /// As with matrices, zero local entries are skipped and constrained rows receive
    /// nothing.
    pub fn distribute_local_to_global_vector<V>(&self, local_vector: &DVector<T>, row_dofs: &[usize], vector: &mut V)
    where
        V: CouplingVector<T> + ?Sized,
    {
        assert_eq!(local_vector.len(), row_dofs.len(), "Local vector must have one entry per row DOF.");
        for (local_i, &row) in row_dofs.iter().enumerate() {
            let value = local_vector[local_i];
            if value != T::zero() {
                for (global_row, coefficient) in self.resolve(row) {
                    vector.add_entry(global_row, coefficient * value);
                }
            }
        }
    }

    /// Overwrites the constrained entries of a solution vector with the values implied
    /// by their constraint lines, `x_i = sum_k c_k x_k + b_i`.
    ///
    /// The constraints must have been closed, so that the values read on the right-hand
    /// side belong to unconstrained DOFs.
    pub fn distribute(&self, solution: &mut DVector<T>) {
        for (&dof, line) in &self.lines {
            let mut value = line.inhomogeneity;
            for &(dependency, coefficient) in &line.entries {
                value += coefficient * solution[dependency];
            }
            solution[dof] = value;
        }
    }
}

/// Error produced when constraint lines form a dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicConstraintError;

impl Display for CyclicConstraintError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Affine constraints contain a cyclic dependency between constrained DOFs")
    }
}

impl std::error::Error for CyclicConstraintError {}
