//! The crate's public, statically-typed entry points: [`op_matmul`],
//! [`op_matmul_topn`], and [`op_zip`]. Argument validation (shape, density,
//! thread count) lives here; the drivers in [`crate::driver`] assume valid
//! input.

use crate::csr::CsrMatrix;
use crate::dtype::{IndexInt, Numeric};
use crate::driver;
use crate::error::SparseTopNError;
use crate::zip;

/// Computes `A * B` with no pruning: every non-zero of the product is kept
/// (spec §4.5's plain driver, exposed without the top-n parameters).
pub fn op_matmul<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
) -> Result<CsrMatrix<Idx, Val>, SparseTopNError> {
    CsrMatrix::check_matmul_shapes(a, b)?;
    Ok(driver::sequential::matmul(a, b))
}

/// Computes `A * B`, retaining at most `top_n` entries per row.
///
/// `top_n` is clamped to `[1, B.ncols()]`. `threshold`, when set, discards
/// any product entry not strictly greater than it (spec §4.2). `sort`
/// requests value-descending, column-ascending-on-tie emission order within
/// each row; otherwise order is unspecified beyond being deterministic for
/// fixed input. `density` sizes the initial output buffer as
/// `ceil(density * top_n * A.nrows())` and must lie in `(0, 1]`.
pub fn op_matmul_topn<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
    top_n: usize,
    threshold: Option<Val>,
    sort: bool,
    density: f64,
) -> Result<CsrMatrix<Idx, Val>, SparseTopNError> {
    CsrMatrix::check_matmul_shapes(a, b)?;
    validate_top_n(top_n)?;
    validate_density(density)?;
    Ok(driver::sequential::matmul_topn(a, b, top_n, threshold, sort, density))
}

/// Like [`op_matmul_topn`], but fans the computation out across a private
/// thread pool. Requires the `parallel` feature.
///
/// `n_threads` follows spec §4.6: `-1` uses all physical cores minus one,
/// `0` or `1` runs sequentially in the caller's thread, and any other
/// positive value is used directly (clamped to `A.nrows()`).
#[cfg(feature = "parallel")]
pub fn op_matmul_topn_parallel<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
    top_n: usize,
    threshold: Option<Val>,
    sort: bool,
    density: f64,
    n_threads: i64,
) -> Result<CsrMatrix<Idx, Val>, SparseTopNError> {
    CsrMatrix::check_matmul_shapes(a, b)?;
    validate_top_n(top_n)?;
    validate_density(density)?;
    driver::parallel::matmul_topn(a, b, top_n, threshold, sort, density, n_threads)
}

/// Like [`op_matmul_topn`], but first rejects the call if the worst-case
/// output (`top_n * A.nrows()` entries, each an index plus a value) would
/// exceed `budget_bytes` (spec §5/§7: "a pre-call feasibility check may
/// reject calls whose worst-case output would exceed available memory").
pub fn op_matmul_topn_with_budget<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
    top_n: usize,
    threshold: Option<Val>,
    sort: bool,
    density: f64,
    budget_bytes: u64,
) -> Result<CsrMatrix<Idx, Val>, SparseTopNError> {
    CsrMatrix::check_matmul_shapes(a, b)?;
    validate_top_n(top_n)?;
    validate_density(density)?;
    let entry_size = std::mem::size_of::<Idx>() + std::mem::size_of::<Val>();
    let projected_bytes = (top_n.min(b.ncols()).max(1) as u64)
        .saturating_mul(a.nrows() as u64)
        .saturating_mul(entry_size as u64);
    if projected_bytes > budget_bytes {
        return Err(SparseTopNError::OutOfMemory {
            projected_bytes,
            budget_bytes,
        });
    }
    Ok(driver::sequential::matmul_topn(a, b, top_n, threshold, sort, density))
}

/// Merges two column-split partial top-n results into one (spec §4.7). See
/// [`crate::zip::op_zip`] for the full contract.
pub fn op_zip<Idx: IndexInt, Val: Numeric>(
    left: &CsrMatrix<Idx, Val>,
    right: &CsrMatrix<Idx, Val>,
    col_offset: usize,
    top_n: usize,
    threshold: Option<Val>,
    sort: bool,
) -> Result<CsrMatrix<Idx, Val>, SparseTopNError> {
    validate_top_n(top_n)?;
    zip::op_zip(left, right, col_offset, top_n, threshold, sort)
}

/// `top_n <= 0` is invalid (spec §4.2/§7); everything above is clamped to
/// `ncols` by the drivers rather than rejected.
fn validate_top_n(top_n: usize) -> Result<(), SparseTopNError> {
    if top_n == 0 {
        Err(SparseTopNError::InvalidArgument {
            name: "top_n",
            reason: "must be at least 1, got 0".into(),
        })
    } else {
        Ok(())
    }
}

fn validate_density(density: f64) -> Result<(), SparseTopNError> {
    if density > 0.0 && density <= 1.0 {
        Ok(())
    } else {
        Err(SparseTopNError::InvalidArgument {
            name: "density",
            reason: format!("must lie in (0, 1], got {density}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csr(indptr: &[i32], indices: &[i32], data: &[f64], ncols: usize) -> CsrMatrix<i32, f64> {
        CsrMatrix::from_parts(indptr.to_vec(), indices.to_vec(), data.to_vec(), ncols).unwrap()
    }

    #[test]
    fn shape_mismatch_is_rejected_before_any_driver_runs() {
        let a = csr(&[0, 1], &[0], &[1.0], 1);
        let b = csr(&[0, 1, 2], &[0, 0], &[1.0, 1.0], 1);
        let err = op_matmul(&a, &b).unwrap_err();
        assert!(matches!(err, SparseTopNError::ShapeMismatch { .. }));
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let a = csr(&[0, 1], &[0], &[1.0], 1);
        let b = csr(&[0, 1], &[0], &[1.0], 1);
        let err = op_matmul_topn(&a, &b, 0, None, false, 1.0).unwrap_err();
        assert!(matches!(
            err,
            SparseTopNError::InvalidArgument { name: "top_n", .. }
        ));
        let err = op_zip(&a, &b, 1, 0, None, false).unwrap_err();
        assert!(matches!(
            err,
            SparseTopNError::InvalidArgument { name: "top_n", .. }
        ));
    }

    #[test]
    fn invalid_density_is_rejected() {
        let a = csr(&[0, 1], &[0], &[1.0], 1);
        let b = csr(&[0, 1], &[0], &[1.0], 1);
        assert!(op_matmul_topn(&a, &b, 1, None, false, 0.0).is_err());
        assert!(op_matmul_topn(&a, &b, 1, None, false, 1.5).is_err());
        assert!(op_matmul_topn(&a, &b, 1, None, false, 1.0).is_ok());
    }

    #[test]
    fn budget_check_rejects_an_undersized_budget() {
        let a = csr(&[0, 1], &[0], &[1.0], 1);
        let b = csr(&[0, 1], &[0], &[1.0], 1);
        let err = op_matmul_topn_with_budget(&a, &b, 1, None, false, 1.0, 0).unwrap_err();
        assert!(matches!(err, SparseTopNError::OutOfMemory { .. }));
        assert!(op_matmul_topn_with_budget(&a, &b, 1, None, false, 1.0, 1_000_000).is_ok());
    }

    #[test]
    fn matmul_and_matmul_topn_agree_when_top_n_covers_everything() {
        let a = csr(&[0, 2], &[0, 1], &[2.0, 3.0], 2);
        let b = csr(&[0, 1, 2], &[0, 1], &[5.0, 7.0], 2);
        let plain = op_matmul(&a, &b).unwrap();
        let pruned = op_matmul_topn(&a, &b, 2, None, false, 1.0).unwrap();
        let mut plain_row: Vec<_> = plain.row(0).collect();
        let mut pruned_row: Vec<_> = pruned.row(0).collect();
        plain_row.sort_by_key(|&(c, _)| c);
        pruned_row.sort_by_key(|&(c, _)| c);
        assert_eq!(plain_row, pruned_row);
    }
}
