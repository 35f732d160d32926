//! Row-wise sparse matrix multiplication with bounded top-n selection.
//!
//! Given CSR matrices `A` and `B`, [`op_matmul_topn`] computes `C = A * B`
//! one row at a time, keeping only the `top_n` largest entries of each row
//! of `C` (optionally above a threshold, optionally sorted). [`op_matmul`]
//! computes the same product with no pruning. [`op_zip`] merges two
//! column-split partial top-n results back into one.
//!
//! ```
//! use sparse_topn::{CsrMatrix, op_matmul_topn};
//!
//! // A = [[1, 0, 2], [0, 3, 0]]
//! let a = CsrMatrix::<i32, f64>::from_parts(
//!     vec![0, 2, 3], vec![0, 2, 1], vec![1.0, 2.0, 3.0], 3,
//! ).unwrap();
//! // B = [[4, 5, 0], [0, 0, 6], [0, 7, 0]]
//! let b = CsrMatrix::<i32, f64>::from_parts(
//!     vec![0, 2, 3, 4], vec![0, 1, 2, 1], vec![4.0, 5.0, 6.0, 7.0], 3,
//! ).unwrap();
//!
//! let c = op_matmul_topn(&a, &b, 1, None, false, 1.0).unwrap();
//! assert_eq!(c.row(0).collect::<Vec<_>>(), vec![(1, 19.0)]);
//! ```

mod accumulator;
mod api;
mod buffer;
mod csr;
mod dtype;
mod dynmatrix;
mod error;
mod legacy;
mod selector;
mod zip;

pub mod driver;

pub use api::op_matmul;
pub use api::op_matmul_topn;
pub use api::op_matmul_topn_with_budget;
pub use api::op_zip;
#[cfg(feature = "parallel")]
pub use api::op_matmul_topn_parallel;
pub use csr::CsrMatrix;
pub use dtype::{IndexInt, IndexWidth, Numeric};
pub use dynmatrix::{op_matmul_topn_dyn, DynCsrMatrix};
pub use error::SparseTopNError;
#[allow(deprecated)]
pub use legacy::awesome_cossim_topn;
