//! Sparse matrix helpers for the global operators.
//!
//! Global matrices are accumulated as (row, col, value) triplets with repeated
//! positions summed, then compacted into CSR storage.
//!
//! | operation | purpose |
//! |---|---|
//! | [`TripletBuilder`] | accumulate element contributions, finalize to CSR |
//! | [`prune_small`] | drop entries with `|v| <= tol` |
//! | [`filter_entries`] | structural filter by `(row, col, value)` predicate |
//! | [`with_unit_diagonal`] | force selected diagonal entries to `1.0` |
//! | [`linear_combination`] | `sum(s_i * A_i)` for equally shaped operators |
//!
//! Products and dense conversion use the `nalgebra-sparse` operators
//! (`&csr * &vector`, `DMatrix::from(&csr)`).

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{Result, SolverError};

/// Absolute tolerance below which assembled entries are discarded.
pub const PRUNE_TOLERANCE: f64 = 1e-14;

/// Accumulates triplets; duplicates sum when finalized.
#[derive(Debug, Clone)]
pub struct TripletBuilder {
    nrows: usize,
    ncols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl TripletBuilder {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self::with_capacity(nrows, ncols, 0)
    }

    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    pub fn with_capacity(nrows: usize, ncols: usize, capacity: usize) -> Self {
        Self {
            nrows,
            ncols,
            rows: Vec::with_capacity(capacity),
            cols: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Adds `value` at `(row, col)`. Positions are checked by [`build`](Self::build).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sums duplicates, drops entries with `|v| <= tolerance` and compacts.
    pub fn build(self, tolerance: f64) -> Result<CsrMatrix<f64>> {
        let coo =
            CooMatrix::try_from_triplets(self.nrows, self.ncols, self.rows, self.cols, self.values)
                .map_err(|e| SolverError::SparseFormat(e.to_string()))?;
        Ok(prune_small(&CsrMatrix::from(&coo), tolerance))
    }
}

impl Extend<(usize, usize, f64)> for TripletBuilder {
    fn extend<I: IntoIterator<Item = (usize, usize, f64)>>(&mut self, iter: I) {
        for (row, col, value) in iter {
            self.add(row, col, value);
        }
    }
}

/// Keeps only the entries for which `keep(row, col, value)` holds.
pub fn filter_entries<F>(matrix: &CsrMatrix<f64>, mut keep: F) -> CsrMatrix<f64>
where
    F: FnMut(usize, usize, f64) -> bool,
{
    let mut coo = CooMatrix::new(matrix.nrows(), matrix.ncols());
    for (row, col, &value) in matrix.triplet_iter() {
        if keep(row, col, value) {
            coo.push(row, col, value);
        }
    }
    CsrMatrix::from(&coo)
}

pub fn prune_small(matrix: &CsrMatrix<f64>, tolerance: f64) -> CsrMatrix<f64> {
    filter_entries(matrix, |_, _, value| value.abs() > tolerance)
}

/// Overwrites the diagonal entries at `indices` with `1.0`, inserting them if
/// absent. Off-diagonal entries are untouched.
pub fn with_unit_diagonal<I>(matrix: &CsrMatrix<f64>, indices: I) -> CsrMatrix<f64>
where
    I: IntoIterator<Item = usize>,
{
    let mut unit = vec![false; matrix.nrows().min(matrix.ncols())];
    for index in indices {
        if let Some(flag) = unit.get_mut(index) {
            *flag = true;
        }
    }

    let mut coo = CooMatrix::new(matrix.nrows(), matrix.ncols());
    for (row, col, &value) in matrix.triplet_iter() {
        if row == col && unit[row] {
            continue;
        }
        coo.push(row, col, value);
    }
    for (index, _) in unit.iter().enumerate().filter(|(_, set)| **set) {
        coo.push(index, index, 1.0);
    }
    CsrMatrix::from(&coo)
}

/// Computes `sum(scale_i * matrix_i)` and prunes the result.
pub fn linear_combination(terms: &[(f64, &CsrMatrix<f64>)], tolerance: f64) -> Result<CsrMatrix<f64>> {
    let (_, first) = terms.first().ok_or(SolverError::DimensionMismatch {
        what: "linear combination terms",
        expected: 1,
        found: 0,
    })?;
    let (nrows, ncols) = (first.nrows(), first.ncols());

    let capacity = terms.iter().map(|(_, m)| m.nnz()).sum();
    let mut builder = TripletBuilder::with_capacity(nrows, ncols, capacity);
    for (scale, matrix) in terms {
        if matrix.nrows() != nrows {
            return Err(SolverError::DimensionMismatch {
                what: "linear combination rows",
                expected: nrows,
                found: matrix.nrows(),
            });
        }
        if matrix.ncols() != ncols {
            return Err(SolverError::DimensionMismatch {
                what: "linear combination columns",
                expected: ncols,
                found: matrix.ncols(),
            });
        }
        builder.extend(
            matrix
                .triplet_iter()
                .map(|(row, col, &value)| (row, col, scale * value)),
        );
    }
    builder.build(tolerance)
}

/// Whether `matrix` equals its transpose within `tolerance` (relative to the
/// largest absolute entry).
pub fn is_symmetric(matrix: &CsrMatrix<f64>, tolerance: f64) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }
    let dense = DMatrix::from(matrix);
    let scale = dense.amax().max(1.0);
    (&dense - dense.transpose()).amax() <= tolerance * scale
}
