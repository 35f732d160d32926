//! Deprecated entry points kept for callers migrating from the original
//! host API this crate's kernel was distilled from.

use crate::api;
use crate::csr::CsrMatrix;
use crate::dtype::{IndexInt, Numeric};
use crate::error::SparseTopNError;

/// The pre-`op_matmul_topn` entry point, forwarding to it with `n_jobs`
/// collapsed into a sequential call.
///
/// `use_threads`/`n_jobs` are accepted for source compatibility but ignored:
/// this crate exposes threading explicitly through
/// [`crate::api::op_matmul_topn_parallel`] rather than implying it from a
/// boolean flag. `return_best_ntop` is unsupported; passing `true` returns
/// [`SparseTopNError::InvalidArgument`].
#[deprecated(note = "use crate::api::op_matmul_topn instead")]
pub fn awesome_cossim_topn<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
    ntop: usize,
    lower_bound: Option<Val>,
    use_threads: bool,
    n_jobs: i64,
    return_best_ntop: bool,
) -> Result<CsrMatrix<Idx, Val>, SparseTopNError> {
    let _ = (use_threads, n_jobs);
    if return_best_ntop {
        return Err(SparseTopNError::InvalidArgument {
            name: "return_best_ntop",
            reason: "not supported; inspect the returned matrix's row lengths instead".into(),
        });
    }
    api::op_matmul_topn(a, b, ntop, lower_bound, false, 1.0)
}
