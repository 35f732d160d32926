//! The sparse accumulator (SPA): a dense scratch vector plus a list of
//! touched columns, used to form one row of `C = A * B` in `O(row-nnz)` reset
//! and update time (Gustavson's algorithm).

use crate::csr::CsrMatrix;
use crate::dtype::{IndexInt, Numeric};

/// Per-worker scratch state for forming rows of `A * B`. Allocated once per
/// worker and reused across rows; `reset_row` truncates in `O(touched.len())`
/// rather than zeroing the whole `ncols`-length scratch.
pub struct SparseAccumulator<Val> {
    scratch: Vec<Val>,
    touched: Vec<usize>,
    in_scratch: Vec<bool>,
}

impl<Val: Numeric> SparseAccumulator<Val> {
    /// Allocates scratch space for a matrix with `ncols` columns.
    pub fn new(ncols: usize) -> Self {
        Self {
            scratch: vec![Val::zero(); ncols],
            touched: Vec::new(),
            in_scratch: vec![false; ncols],
        }
    }

    /// Scatters `row_i` of `A * B` into the scratch vector: for each
    /// `(k, a)` in `a_row`, adds `a * b` for every `(j, b)` in `B`'s row `k`.
    ///
    /// `B` must share the same index type as the accumulator was sized for;
    /// `a_row` is typically `a.row(i)`.
    pub fn scatter_row<Idx: IndexInt>(
        &mut self,
        a_row: impl Iterator<Item = (usize, Val)>,
        b: &CsrMatrix<Idx, Val>,
    ) {
        for (k, a_ik) in a_row {
            for (j, b_kj) in b.row(k) {
                if self.in_scratch[j] {
                    self.scratch[j] = Val::mul_add_acc(self.scratch[j], a_ik, b_kj);
                } else {
                    self.in_scratch[j] = true;
                    self.touched.push(j);
                    self.scratch[j] = Val::mul_add_acc(Val::zero(), a_ik, b_kj);
                }
            }
        }
    }

    /// Yields the `(column, value)` pairs touched by the current row, in the
    /// order columns were first touched. Zero-sum entries are included; the
    /// selector filters by threshold, not by exact zero (spec §4.1).
    pub fn touched_entries(&self) -> impl Iterator<Item = (usize, Val)> + '_ {
        self.touched.iter().map(move |&j| (j, self.scratch[j]))
    }

    /// Resets the scratch state for the next row. Must be called after
    /// [`Self::touched_entries`] has been consumed.
    pub fn reset_row(&mut self) {
        for &j in &self.touched {
            self.in_scratch[j] = false;
        }
        self.touched.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csr(indptr: &[i32], indices: &[i32], data: &[f64], ncols: usize) -> CsrMatrix<i32, f64> {
        CsrMatrix::from_parts(indptr.to_vec(), indices.to_vec(), data.to_vec(), ncols).unwrap()
    }

    #[test]
    fn scatters_and_resets() {
        // A row 0 = {(0,1.0),(2,2.0)}; B row 0 = {(0,4.0),(1,5.0)}; B row 2 = {(1,7.0)}
        let b = csr(&[0, 2, 2, 3], &[0, 1, 1], &[4.0, 5.0, 7.0], 3);
        let mut spa = SparseAccumulator::<f64>::new(3);
        spa.scatter_row([(0usize, 1.0), (2, 2.0)].into_iter(), &b);
        let mut got: Vec<_> = spa.touched_entries().collect();
        got.sort_by_key(|&(c, _)| c);
        assert_eq!(got, vec![(0, 4.0), (1, 5.0 + 2.0 * 7.0)]);
        spa.reset_row();
        assert_eq!(spa.touched_entries().count(), 0);
    }

    #[test]
    fn duplicate_column_in_a_row_sums() {
        let b = csr(&[0, 1], &[0], &[10.0], 1);
        let mut spa = SparseAccumulator::<f64>::new(1);
        // A's row references column k=0 twice; each contributes a*B[0,:]
        spa.scatter_row([(0usize, 1.0), (0usize, 1.0)].into_iter(), &b);
        let got: Vec<_> = spa.touched_entries().collect();
        assert_eq!(got, vec![(0, 20.0)]);
    }

    #[test]
    fn integer_overflow_wraps() {
        let b = csr(&[0, 1], &[0], &[i32::MAX], 1);
        let mut spa = SparseAccumulator::<i32>::new(1);
        spa.scatter_row([(0usize, 2)].into_iter(), &b);
        let got: Vec<_> = spa.touched_entries().collect();
        assert_eq!(got, vec![(0, 2i32.wrapping_mul(i32::MAX))]);
    }
}
