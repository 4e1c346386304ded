//! Assembly targets: the boundary between coupling assembly and linear algebra.
//!
//! The assemblers in this crate do not own their output. They write into
//! caller-provided structures through the narrow [`CouplingSparsity`],
//! [`CouplingMatrix`] and [`CouplingVector`] contracts, so that the same assembly code
//! serves triplet matrices, preallocated CSR matrices and dense vectors alike. All
//! writes are additive and order-independent; combining contributions from several
//! processes into shared rows is a single collective reduction performed by the
//! caller after assembly (for the implementations in this module, a no-op or a
//! triplet-to-CSR conversion).
use nalgebra::{DVector, Scalar};
use nalgebra_sparse::pattern::SparsityPattern;
use nalgebra_sparse::{CooMatrix, CsrMatrix, SparseEntryMut};
use std::collections::BTreeSet;
use std::ops::AddAssign;

/// A structure-only assembly target that records which global entries may be nonzero.
pub trait CouplingSparsity {
    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    /// Registers the entry `(row, col)` as structurally nonzero.
    ///
    /// Registering the same entry repeatedly is permitted and equivalent to
    /// registering it once.
    fn add_entry(&mut self, row: usize, col: usize);
}

/// A matrix assembly target with additive writes.
pub trait CouplingMatrix<T> {
    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    /// Adds `value` to the entry `(row, col)`.
    fn add_entry(&mut self, row: usize, col: usize, value: T);
}

/// A vector assembly target with additive writes.
pub trait CouplingVector<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds `value` to the entry at `index`.
    fn add_entry(&mut self, index: usize, value: T);
}

/// An incremental builder for coupling sparsity patterns.
///
/// The columns of each row are kept in a [`BTreeSet`], so every entry is stored exactly
/// once regardless of how many cell pairs register it. The accumulated pattern can be
/// converted into a [`SparsityPattern`] for CSR preallocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparsityPatternBuilder {
    ncols: usize,
    rows: Vec<BTreeSet<usize>>,
}

impl SparsityPatternBuilder {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            ncols,
            rows: vec![BTreeSet::new(); nrows],
        }
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows[row].contains(&col)
    }

    /// Determines whether every entry of this pattern is also present in `other`.
    ///
    /// Patterns of different dimensions are never subsets of each other.
    pub fn is_subset_of(&self, other: &SparsityPatternBuilder) -> bool {
        self.rows.len() == other.rows.len()
            && self.ncols == other.ncols
            && self
                .rows
                .iter()
                .zip(&other.rows)
                .all(|(row, other_row)| row.is_subset(other_row))
    }

    /// Converts the accumulated entries into a CSR sparsity pattern.
    pub fn to_csr_pattern(&self) -> SparsityPattern {
        let mut offsets = Vec::with_capacity(self.rows.len() + 1);
        let mut column_indices = Vec::with_capacity(self.nnz());
        offsets.push(0);
        for row in &self.rows {
            column_indices.extend(row.iter().copied());
            offsets.push(column_indices.len());
        }
        SparsityPattern::try_from_offsets_and_indices(self.rows.len(), self.ncols, offsets, column_indices)
            .expect("Sorted in-bounds entries always form a valid pattern.")
    }
}

impl CouplingSparsity for SparsityPatternBuilder {
    fn nrows(&self) -> usize {
        self.rows.len()
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn add_entry(&mut self, row: usize, col: usize) {
        assert!(col < self.ncols, "Column index must be in bounds.");
        self.rows[row].insert(col);
    }
}

/// Triplet matrices accept every write; duplicate entries are combined by the caller's
/// conversion to a compressed format.
impl<T> CouplingMatrix<T> for CooMatrix<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn add_entry(&mut self, row: usize, col: usize, value: T) {
        self.push(row, col, value);
    }
}

/// CSR matrices accumulate in place into a preallocated pattern.
///
/// Writing to an entry outside the pattern is a caller bug: the pattern does not cover
/// the assembled form, typically because it was built from a different mesh pair or
/// coupling rule than the one being assembled.
impl<T> CouplingMatrix<T> for CsrMatrix<T>
where
    T: Scalar + AddAssign,
{
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn add_entry(&mut self, row: usize, col: usize, value: T) {
        match self.get_entry_mut(row, col) {
            Some(SparseEntryMut::NonZero(entry)) => *entry += value,
            _ => panic!("CSR matrix does not contain an explicit entry for ({}, {}).", row, col),
        }
    }
}

impl<T> CouplingVector<T> for DVector<T>
where
    T: Scalar + AddAssign,
{
    fn len(&self) -> usize {
        self.len()
    }

    fn add_entry(&mut self, index: usize, value: T) {
        self[index] += value;
    }
}
