//! Error types surfaced by the kernel.

/// Errors returned by the public entry points in [`crate::api`] and
/// [`crate::dynmatrix`].
///
/// Every variant carries the data needed to reconstruct the failure; none of
/// them collapse into a formatted string.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum SparseTopNError {
    /// `A` and `B` are neither inner-dimension compatible nor related by a
    /// transpose of `B`.
    #[error("shape mismatch: A is {a_rows}x{a_cols}, B is {b_rows}x{b_cols}")]
    ShapeMismatch {
        /// Rows of `A`.
        a_rows: usize,
        /// Columns of `A`.
        a_cols: usize,
        /// Rows of `B`.
        b_rows: usize,
        /// Columns of `B`.
        b_cols: usize,
    },

    /// `A` and `B` carry different value dtypes and neither is a safe
    /// widening of the other. Only reachable through [`crate::dynmatrix`].
    #[error("type mismatch: A has dtype {a_dtype}, B has dtype {b_dtype}, neither widens to the other")]
    TypeMismatch {
        /// Name of `A`'s dtype.
        a_dtype: &'static str,
        /// Name of `B`'s dtype.
        b_dtype: &'static str,
    },

    /// A value dtype outside `{i32, i64, f32, f64}` was requested. Only
    /// reachable through [`crate::dynmatrix`].
    #[error("unsupported dtype: {dtype}")]
    UnsupportedDtype {
        /// Name of the unsupported dtype.
        dtype: &'static str,
    },

    /// `top_n <= 0`, `density` outside `(0, 1]`, or `n_threads < -1`.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// Why it is invalid.
        reason: String,
    },

    /// The projected worst-case output would exceed available memory.
    /// Reported before any output buffer is allocated.
    #[error("projected output of {projected_bytes} bytes exceeds the memory budget of {budget_bytes} bytes")]
    OutOfMemory {
        /// Worst-case projected size of the output buffers, in bytes.
        projected_bytes: u64,
        /// The budget that was exceeded.
        budget_bytes: u64,
    },

    /// `indptr`/`indices`/`data` do not form a well-formed CSR matrix.
    #[error("malformed CSR matrix: {reason}")]
    InvalidCsr {
        /// Description of the violated invariant.
        reason: String,
    },

    /// Constructing a private thread pool for the parallel driver failed.
    #[error("failed to build a thread pool with {requested} threads: {source}")]
    ThreadPool {
        /// The thread count that was requested.
        requested: usize,
        /// The underlying error message.
        source: String,
    },
}
