//! The sequential driver: iterates rows of `A` in order, invoking the
//! accumulator and selector for each, and finalizes `indptr` (spec §4.5).

use crate::accumulator::SparseAccumulator;
use crate::buffer::OutputBuffer;
use crate::csr::CsrMatrix;
use crate::dtype::{IndexInt, Numeric};
use crate::selector::BoundedSelector;

/// Computes `A * B` with no pruning: every non-zero of the product is kept.
#[tracing::instrument(level = "debug", skip_all, fields(nrows = a.nrows(), ncols = b.ncols()))]
pub fn matmul<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
) -> CsrMatrix<Idx, Val> {
    let nrows = a.nrows();
    let ncols = b.ncols();

    if a.nnz() == 0 || b.nnz() == 0 {
        return CsrMatrix::zeros(nrows, ncols);
    }

    let mut acc = SparseAccumulator::new(ncols);
    // No top-n bound here; size the buffer off the average row width of A
    // times B, with a floor, rather than the worst case `ncols * nrows`.
    let hint_width = (a.nnz() / nrows.max(1)).max(1);
    let mut out = OutputBuffer::with_density(nrows, hint_width, 1.0);

    for i in 0..nrows {
        acc.scatter_row(a.row(i), b);
        out.push_row(acc.touched_entries());
        acc.reset_row();
    }

    out.finish(ncols)
}

/// Computes `A * B`, retaining at most `top_n` entries per row (spec §4.2).
/// `top_n` is clamped to `ncols` here, matching the public contract.
#[tracing::instrument(level = "debug", skip_all, fields(nrows = a.nrows(), ncols = b.ncols(), top_n))]
pub fn matmul_topn<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
    top_n: usize,
    threshold: Option<Val>,
    sort: bool,
    density: f64,
) -> CsrMatrix<Idx, Val> {
    let nrows = a.nrows();
    let ncols = b.ncols();
    let top_n = top_n.min(ncols).max(1);

    if a.nnz() == 0 || b.nnz() == 0 {
        return CsrMatrix::zeros(nrows, ncols);
    }

    let mut acc = SparseAccumulator::new(ncols);
    let mut sel = BoundedSelector::new(top_n, threshold);
    let mut out = OutputBuffer::with_density(nrows, top_n, density);

    for i in 0..nrows {
        acc.scatter_row(a.row(i), b);
        sel.offer_all(acc.touched_entries());
        let survivors = sel.drain(sort);
        out.push_row(survivors.into_iter());
        sel.clear();
        acc.reset_row();
    }

    out.finish(ncols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csr(indptr: &[i32], indices: &[i32], data: &[f64], ncols: usize) -> CsrMatrix<i32, f64> {
        CsrMatrix::from_parts(indptr.to_vec(), indices.to_vec(), data.to_vec(), ncols).unwrap()
    }

    // The worked scenario from spec §8.
    fn scenario() -> (CsrMatrix<i32, f64>, CsrMatrix<i32, f64>) {
        let a = csr(&[0, 2, 3], &[0, 2, 1], &[1.0, 2.0, 3.0], 3);
        let b = csr(&[0, 2, 3, 4], &[0, 1, 2, 1], &[4.0, 5.0, 6.0, 7.0], 3);
        (a, b)
    }

    #[test]
    fn plain_matmul_matches_worked_scenario() {
        let (a, b) = scenario();
        let c = matmul(&a, &b);
        let row0: Vec<_> = c.row(0).collect();
        let row1: Vec<_> = c.row(1).collect();
        assert_eq!(row0, vec![(0, 4.0), (1, 19.0)]);
        assert_eq!(row1, vec![(2, 18.0)]);
    }

    #[test]
    fn topn_one_matches_worked_scenario() {
        let (a, b) = scenario();
        let c = matmul_topn(&a, &b, 1, None, false, 1.0);
        assert_eq!(c.row(0).collect::<Vec<_>>(), vec![(1, 19.0)]);
        assert_eq!(c.row(1).collect::<Vec<_>>(), vec![(2, 18.0)]);
    }

    #[test]
    fn topn_two_with_threshold_matches_worked_scenario() {
        let (a, b) = scenario();
        let c = matmul_topn(&a, &b, 2, Some(5.0), false, 1.0);
        assert_eq!(c.row(0).collect::<Vec<_>>(), vec![(1, 19.0)]);
        assert_eq!(c.row(1).collect::<Vec<_>>(), vec![(2, 18.0)]);
    }

    #[test]
    fn sorted_emission_matches_worked_scenario() {
        let (a, b) = scenario();
        let c = matmul_topn(&a, &b, 2, None, true, 1.0);
        assert_eq!(c.row(0).collect::<Vec<_>>(), vec![(1, 19.0), (0, 4.0)]);
    }

    #[test]
    fn empty_row_of_a_yields_empty_row() {
        // A's row 0 is empty.
        let a = csr(&[0, 0, 1], &[1], &[3.0], 3);
        let b = csr(&[0, 1, 2, 3], &[0, 1, 2], &[1.0, 1.0, 1.0], 3);
        let c = matmul_topn(&a, &b, 2, None, false, 1.0);
        assert_eq!(c.indptr()[0], c.indptr()[1]);
        assert_eq!(c.row(0).count(), 0);
    }

    #[test]
    fn empty_input_short_circuits() {
        let a = CsrMatrix::<i32, f64>::zeros(3, 3);
        let b = csr(&[0, 1], &[0], &[1.0], 1);
        let c = matmul_topn(&a, &b, 1, None, false, 1.0);
        assert_eq!(c.indptr(), &[0, 0, 0, 0]);
    }

    #[test]
    fn top_n_ge_ncols_is_identity_with_no_threshold() {
        let (a, b) = scenario();
        let plain = matmul(&a, &b);
        let pruned = matmul_topn(&a, &b, b.ncols(), None, false, 1.0);
        let mut plain_row0: Vec<_> = plain.row(0).collect();
        let mut pruned_row0: Vec<_> = pruned.row(0).collect();
        plain_row0.sort_by_key(|&(c, _)| c);
        pruned_row0.sort_by_key(|&(c, _)| c);
        assert_eq!(plain_row0, pruned_row0);
    }
}
