//! Merges column-split partial top-n results into a single top-n result per
//! row (spec §4.7): `zip(left, right, col_offset, top_n, threshold, sort)`
//! re-selects the top-n survivors across both inputs, treating `right`'s
//! columns as shifted by `col_offset` in the merged column space.

use crate::buffer::OutputBuffer;
use crate::csr::CsrMatrix;
use crate::dtype::{IndexInt, Numeric};
use crate::error::SparseTopNError;
use crate::selector::BoundedSelector;

/// Merges two partial top-n results computed over disjoint column ranges of
/// the same logical matrix (e.g. from splitting `B` by columns and running
/// [`crate::driver::sequential::matmul_topn`] on each half independently).
///
/// `right`'s column indices are shifted by `col_offset` before merging, so
/// `right`'s column `j` lands at `col_offset + j` in the output. Both inputs
/// must have the same row count; the merged matrix has
/// `ncols = col_offset + right.ncols()`.
#[tracing::instrument(level = "debug", skip_all, fields(nrows = left.nrows(), top_n))]
pub fn op_zip<Idx: IndexInt, Val: Numeric>(
    left: &CsrMatrix<Idx, Val>,
    right: &CsrMatrix<Idx, Val>,
    col_offset: usize,
    top_n: usize,
    threshold: Option<Val>,
    sort: bool,
) -> Result<CsrMatrix<Idx, Val>, SparseTopNError> {
    if left.nrows() != right.nrows() {
        return Err(SparseTopNError::ShapeMismatch {
            a_rows: left.nrows(),
            a_cols: left.ncols(),
            b_rows: right.nrows(),
            b_cols: right.ncols(),
        });
    }

    let nrows = left.nrows();
    let ncols = col_offset + right.ncols();
    let top_n = top_n.min(ncols).max(1);

    let mut sel = BoundedSelector::new(top_n, threshold);
    let mut out = OutputBuffer::with_density(nrows, top_n, 1.0);

    for i in 0..nrows {
        sel.offer_all(left.row(i));
        sel.offer_all(right.row(i).map(|(column, value)| (column + col_offset, value)));
        let survivors = sel.drain(sort);
        out.push_row(survivors.into_iter());
        sel.clear();
    }

    out.finish(ncols)
}
