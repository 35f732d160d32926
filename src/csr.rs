//! Compressed sparse row (CSR) matrix storage.

use crate::dtype::{IndexInt, Numeric};
use crate::error::SparseTopNError;

/// A matrix stored in compressed sparse row form: `indptr` of length
/// `nrows + 1`, `indices` and `data` of length `nnz`.
///
/// For row `r`, the non-zeros are `(indices[k], data[k])` for
/// `k in indptr[r]..indptr[r + 1]`. Indices within a row are not required to
/// be unique or sorted; see [`crate::accumulator`] for how duplicates are
/// handled during multiplication.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<Idx, Val> {
    pub(crate) indptr: Vec<Idx>,
    pub(crate) indices: Vec<Idx>,
    pub(crate) data: Vec<Val>,
    pub(crate) ncols: usize,
}

impl<Idx: IndexInt, Val: Numeric> CsrMatrix<Idx, Val> {
    /// Builds a CSR matrix from its three parallel arrays, validating the
    /// invariants from spec §3: `indptr[0] == 0`, `indptr` non-decreasing,
    /// and every column index in `[0, ncols)`.
    pub fn from_parts(
        indptr: Vec<Idx>,
        indices: Vec<Idx>,
        data: Vec<Val>,
        ncols: usize,
    ) -> Result<Self, SparseTopNError> {
        if indptr.is_empty() {
            return Err(SparseTopNError::InvalidCsr {
                reason: "indptr must have at least one element".into(),
            });
        }
        if indptr[0].as_usize_index() != 0 {
            return Err(SparseTopNError::InvalidCsr {
                reason: "indptr[0] must be 0".into(),
            });
        }
        if indices.len() != data.len() {
            return Err(SparseTopNError::InvalidCsr {
                reason: format!(
                    "indices has length {} but data has length {}",
                    indices.len(),
                    data.len()
                ),
            });
        }
        let nnz = indices.len();
        let mut prev = 0usize;
        for (row, &p) in indptr.iter().enumerate() {
            let p = p.as_usize_index();
            if p < prev {
                return Err(SparseTopNError::InvalidCsr {
                    reason: format!("indptr is not non-decreasing at row {row}"),
                });
            }
            prev = p;
        }
        if prev != nnz {
            return Err(SparseTopNError::InvalidCsr {
                reason: format!("indptr[nrows] ({prev}) does not match nnz ({nnz})"),
            });
        }
        for &c in &indices {
            if c.as_usize_index() >= ncols {
                return Err(SparseTopNError::InvalidCsr {
                    reason: format!("column index {} out of bounds for ncols {}", c.as_usize_index(), ncols),
                });
            }
        }
        Ok(Self {
            indptr,
            indices,
            data,
            ncols,
        })
    }

    /// Builds an empty `nrows x ncols` matrix with no non-zeros.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            indptr: vec![Idx::zero(); nrows + 1],
            indices: Vec::new(),
            data: Vec::new(),
            ncols,
        }
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.indptr.len() - 1
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored non-zero entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// `(column, value)` pairs of row `r`, in storage order (not required to
    /// be sorted or deduplicated).
    pub fn row(&self, r: usize) -> impl Iterator<Item = (usize, Val)> + '_ {
        let s = self.indptr[r].as_usize_index();
        let e = self.indptr[r + 1].as_usize_index();
        (s..e).map(move |k| (self.indices[k].as_usize_index(), self.data[k]))
    }

    /// Raw `indptr` array.
    pub fn indptr(&self) -> &[Idx] {
        &self.indptr
    }

    /// Raw `indices` array.
    pub fn indices(&self) -> &[Idx] {
        &self.indices
    }

    /// Raw `data` array.
    pub fn data(&self) -> &[Val] {
        &self.data
    }

    /// Decomposes the matrix back into its three raw arrays plus `ncols`.
    pub fn into_parts(self) -> (Vec<Idx>, Vec<Idx>, Vec<Val>, usize) {
        (self.indptr, self.indices, self.data, self.ncols)
    }

    /// Validates that two matrices are compatible for `A * B`, applying the
    /// transpose rule from spec §6: if `A.ncols != B.nrows` but
    /// `A.ncols == B.ncols`, the caller should have transposed `B` already;
    /// this only checks, it does not transpose.
    pub(crate) fn check_matmul_shapes<OtherVal: Numeric>(
        a: &CsrMatrix<Idx, Val>,
        b: &CsrMatrix<Idx, OtherVal>,
    ) -> Result<(), SparseTopNError> {
        if a.ncols() != b.nrows() {
            return Err(SparseTopNError::ShapeMismatch {
                a_rows: a.nrows(),
                a_cols: a.ncols(),
                b_rows: b.nrows(),
                b_cols: b.ncols(),
            });
        }
        Ok(())
    }
}
