//! Tagged-variant dispatch for callers who only know `A`/`B`'s concrete
//! value/index dtypes at runtime (e.g. a host binding deserializing matrices
//! from an untyped buffer). [`crate::api`] is the typed entry point; this
//! module exists purely to bridge into it.

use crate::api;
use crate::csr::CsrMatrix;
use crate::dtype::{IndexInt, Numeric};
use crate::error::SparseTopNError;

/// A CSR matrix whose index and value dtypes are only known at runtime.
///
/// Variants are named `<index width><value type>`, e.g. `I32F64` is an
/// `i32`-indexed, `f64`-valued matrix.
pub enum DynCsrMatrix {
    I32I32(CsrMatrix<i32, i32>),
    I32I64(CsrMatrix<i32, i64>),
    I32F32(CsrMatrix<i32, f32>),
    I32F64(CsrMatrix<i32, f64>),
    I64I32(CsrMatrix<i64, i32>),
    I64I64(CsrMatrix<i64, i64>),
    I64F32(CsrMatrix<i64, f32>),
    I64F64(CsrMatrix<i64, f64>),
}

impl DynCsrMatrix {
    /// The value dtype name, as used in [`SparseTopNError::TypeMismatch`].
    pub fn value_dtype(&self) -> &'static str {
        match self {
            DynCsrMatrix::I32I32(_) | DynCsrMatrix::I64I32(_) => i32::NAME,
            DynCsrMatrix::I32I64(_) | DynCsrMatrix::I64I64(_) => i64::NAME,
            DynCsrMatrix::I32F32(_) | DynCsrMatrix::I64F32(_) => f32::NAME,
            DynCsrMatrix::I32F64(_) | DynCsrMatrix::I64F64(_) => f64::NAME,
        }
    }

    /// The index dtype name.
    pub fn index_dtype(&self) -> &'static str {
        match self {
            DynCsrMatrix::I32I32(_)
            | DynCsrMatrix::I32I64(_)
            | DynCsrMatrix::I32F32(_)
            | DynCsrMatrix::I32F64(_) => i32::NAME,
            DynCsrMatrix::I64I32(_)
            | DynCsrMatrix::I64I64(_)
            | DynCsrMatrix::I64F32(_)
            | DynCsrMatrix::I64F64(_) => i64::NAME,
        }
    }

    pub fn nrows(&self) -> usize {
        match self {
            DynCsrMatrix::I32I32(m) => m.nrows(),
            DynCsrMatrix::I32I64(m) => m.nrows(),
            DynCsrMatrix::I32F32(m) => m.nrows(),
            DynCsrMatrix::I32F64(m) => m.nrows(),
            DynCsrMatrix::I64I32(m) => m.nrows(),
            DynCsrMatrix::I64I64(m) => m.nrows(),
            DynCsrMatrix::I64F32(m) => m.nrows(),
            DynCsrMatrix::I64F64(m) => m.nrows(),
        }
    }

    pub fn ncols(&self) -> usize {
        match self {
            DynCsrMatrix::I32I32(m) => m.ncols(),
            DynCsrMatrix::I32I64(m) => m.ncols(),
            DynCsrMatrix::I32F32(m) => m.ncols(),
            DynCsrMatrix::I32F64(m) => m.ncols(),
            DynCsrMatrix::I64I32(m) => m.ncols(),
            DynCsrMatrix::I64I64(m) => m.ncols(),
            DynCsrMatrix::I64F32(m) => m.ncols(),
            DynCsrMatrix::I64F64(m) => m.ncols(),
        }
    }

    /// Re-indexes into the `i64`-indexed variant carrying the same values,
    /// widening `indptr`/`indices` element-wise. Used to unify index width
    /// before dispatch when `A` and `B` were built with different widths.
    fn widen_index(self) -> DynCsrMatrix {
        fn widen<Val: Numeric>(m: CsrMatrix<i32, Val>) -> CsrMatrix<i64, Val> {
            let (indptr, indices, data, ncols) = m.into_parts();
            CsrMatrix::from_parts(
                indptr.into_iter().map(i64::from).collect(),
                indices.into_iter().map(i64::from).collect(),
                data,
                ncols,
            )
            .expect("widening i32 indices to i64 preserves every CSR invariant")
        }
        match self {
            DynCsrMatrix::I32I32(m) => DynCsrMatrix::I64I32(widen(m)),
            DynCsrMatrix::I32I64(m) => DynCsrMatrix::I64I64(widen(m)),
            DynCsrMatrix::I32F32(m) => DynCsrMatrix::I64F32(widen(m)),
            DynCsrMatrix::I32F64(m) => DynCsrMatrix::I64F64(widen(m)),
            already_wide => already_wide,
        }
    }

    /// Widens the value dtype to `target` ("i64" or "f64"), the wider of the
    /// two operands' dtypes of the same kind (spec §3/§9: "same kind, smaller
    /// item size" — integers widen to `i64`, floats widen to `f64`; the two
    /// kinds never cross here, that is rejected earlier by `widens_into`).
    fn promote_value_dtype(self, target: &str) -> DynCsrMatrix {
        match (self, target) {
            (DynCsrMatrix::I32I32(m), "i64") => DynCsrMatrix::I32I64(cast_values(m, i64::from)),
            (DynCsrMatrix::I64I32(m), "i64") => DynCsrMatrix::I64I64(cast_values(m, i64::from)),
            (DynCsrMatrix::I32F32(m), "f64") => DynCsrMatrix::I32F64(cast_values(m, f64::from)),
            (DynCsrMatrix::I64F32(m), "f64") => DynCsrMatrix::I64F64(cast_values(m, f64::from)),
            (already_at_target, _) => already_at_target,
        }
    }
}

fn cast_values<Idx: IndexInt, FromVal: Numeric, ToVal: Numeric>(
    m: CsrMatrix<Idx, FromVal>,
    cast: impl Fn(FromVal) -> ToVal,
) -> CsrMatrix<Idx, ToVal> {
    let (indptr, indices, data, ncols) = m.into_parts();
    CsrMatrix::from_parts(indptr, indices, data.into_iter().map(cast).collect(), ncols)
        .expect("casting values preserves every CSR invariant")
}

/// The wider of two same-kind dtype names (e.g. `("i32", "i64") -> "i64"`).
fn wider_dtype<'a>(a: &'a str, b: &'a str) -> &'a str {
    let (_, a_width) = kind_and_width(a);
    let (_, b_width) = kind_and_width(b);
    if a_width >= b_width {
        a
    } else {
        b
    }
}

/// A value dtype "kind": integers widen to wider integers, floats widen to
/// wider floats, and the two kinds never widen into each other (carried over
/// from the original host API's `ensure_compatible_dtype` rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Float,
}

fn kind_and_width(name: &str) -> (Kind, u8) {
    match name {
        "i32" => (Kind::Int, 32),
        "i64" => (Kind::Int, 64),
        "f32" => (Kind::Float, 32),
        "f64" => (Kind::Float, 64),
        other => unreachable!("unsupported dtype reached kind_and_width: {other}"),
    }
}

/// Whether `from` safely widens into `to`: same kind, `from`'s itemsize no
/// larger than `to`'s.
fn widens_into(from: &str, to: &str) -> bool {
    let (from_kind, from_width) = kind_and_width(from);
    let (to_kind, to_width) = kind_and_width(to);
    from_kind == to_kind && from_width <= to_width
}

/// Computes `A * B` with top-n pruning when `A` and `B`'s concrete dtypes are
/// only known at runtime.
///
/// If `A` and `B` carry different value dtypes, one must safely widen into
/// the other (same kind, narrower itemsize promotes to the wider one); `i32`
/// and `i64` never mix with `f32`/`f64`. Mixed index widths are accepted and
/// promoted to `i64`.
pub fn op_matmul_topn_dyn(
    a: DynCsrMatrix,
    b: DynCsrMatrix,
    top_n: usize,
    threshold: Option<f64>,
    sort: bool,
    density: f64,
) -> Result<DynCsrMatrix, SparseTopNError> {
    if a.value_dtype() != b.value_dtype() {
        let a_into_b = widens_into(a.value_dtype(), b.value_dtype());
        let b_into_a = widens_into(b.value_dtype(), a.value_dtype());
        if !a_into_b && !b_into_a {
            return Err(SparseTopNError::TypeMismatch {
                a_dtype: a.value_dtype(),
                b_dtype: b.value_dtype(),
            });
        }
    }

    let (a, b) = if a.index_dtype() != b.index_dtype() {
        (a.widen_index(), b.widen_index())
    } else {
        (a, b)
    };

    let (a, b) = if a.value_dtype() != b.value_dtype() {
        let target = wider_dtype(a.value_dtype(), b.value_dtype()).to_string();
        (a.promote_value_dtype(&target), b.promote_value_dtype(&target))
    } else {
        (a, b)
    };

    match (a, b) {
        (DynCsrMatrix::I32I32(a), DynCsrMatrix::I32I32(b)) => {
            let t = threshold.map(|v| v as i32);
            api::op_matmul_topn(&a, &b, top_n, t, sort, density).map(DynCsrMatrix::I32I32)
        }
        (DynCsrMatrix::I32I64(a), DynCsrMatrix::I32I64(b)) => {
            let t = threshold.map(|v| v as i64);
            api::op_matmul_topn(&a, &b, top_n, t, sort, density).map(DynCsrMatrix::I32I64)
        }
        (DynCsrMatrix::I32F32(a), DynCsrMatrix::I32F32(b)) => {
            let t = threshold.map(|v| v as f32);
            api::op_matmul_topn(&a, &b, top_n, t, sort, density).map(DynCsrMatrix::I32F32)
        }
        (DynCsrMatrix::I32F64(a), DynCsrMatrix::I32F64(b)) => {
            api::op_matmul_topn(&a, &b, top_n, threshold, sort, density).map(DynCsrMatrix::I32F64)
        }
        (DynCsrMatrix::I64I32(a), DynCsrMatrix::I64I32(b)) => {
            let t = threshold.map(|v| v as i32);
            api::op_matmul_topn(&a, &b, top_n, t, sort, density).map(DynCsrMatrix::I64I32)
        }
        (DynCsrMatrix::I64I64(a), DynCsrMatrix::I64I64(b)) => {
            let t = threshold.map(|v| v as i64);
            api::op_matmul_topn(&a, &b, top_n, t, sort, density).map(DynCsrMatrix::I64I64)
        }
        (DynCsrMatrix::I64F32(a), DynCsrMatrix::I64F32(b)) => {
            let t = threshold.map(|v| v as f32);
            api::op_matmul_topn(&a, &b, top_n, t, sort, density).map(DynCsrMatrix::I64F32)
        }
        (DynCsrMatrix::I64F64(a), DynCsrMatrix::I64F64(b)) => {
            api::op_matmul_topn(&a, &b, top_n, threshold, sort, density).map(DynCsrMatrix::I64F64)
        }
        // Unreachable: widen_index/promote_value_dtype above always leave
        // both operands with matching index and value dtypes.
        _ => unreachable!("index/value dtypes were unified above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_rules_match_same_kind_narrower_to_wider() {
        assert!(widens_into("f32", "f64"));
        assert!(!widens_into("f64", "f32"));
        assert!(widens_into("i32", "i64"));
        assert!(!widens_into("f32", "i64"));
    }

    #[test]
    fn same_dtype_pair_dispatches() {
        let a = CsrMatrix::<i32, f64>::from_parts(vec![0, 1], vec![0], vec![2.0], 1).unwrap();
        let b = CsrMatrix::<i32, f64>::from_parts(vec![0, 1], vec![0], vec![3.0], 1).unwrap();
        let result = op_matmul_topn_dyn(
            DynCsrMatrix::I32F64(a),
            DynCsrMatrix::I32F64(b),
            1,
            None,
            false,
            1.0,
        )
        .unwrap();
        match result {
            DynCsrMatrix::I32F64(m) => assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 6.0)]),
            _ => panic!("unexpected variant"),
        }
    }

    #[test]
    fn narrower_float_promotes_to_f64() {
        let a = CsrMatrix::<i32, f32>::from_parts(vec![0, 1], vec![0], vec![2.0], 1).unwrap();
        let b = CsrMatrix::<i32, f64>::from_parts(vec![0, 1], vec![0], vec![3.0], 1).unwrap();
        let result = op_matmul_topn_dyn(
            DynCsrMatrix::I32F32(a),
            DynCsrMatrix::I32F64(b),
            1,
            None,
            false,
            1.0,
        )
        .unwrap();
        match result {
            DynCsrMatrix::I32F64(m) => assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 6.0)]),
            other => panic!("expected I32F64, got a matrix with dtype {}", other.value_dtype()),
        }
    }

    #[test]
    fn mixed_index_width_promotes_to_i64() {
        let a = CsrMatrix::<i32, f64>::from_parts(vec![0, 1], vec![0], vec![2.0], 1).unwrap();
        let b = CsrMatrix::<i64, f64>::from_parts(vec![0, 1], vec![0], vec![3.0], 1).unwrap();
        let result = op_matmul_topn_dyn(
            DynCsrMatrix::I32F64(a),
            DynCsrMatrix::I64F64(b),
            1,
            None,
            false,
            1.0,
        )
        .unwrap();
        assert!(matches!(result, DynCsrMatrix::I64F64(_)));
    }

    #[test]
    fn mismatched_non_widening_dtypes_are_rejected() {
        let a = CsrMatrix::<i32, f64>::from_parts(vec![0, 1], vec![0], vec![2.0], 1).unwrap();
        let b = CsrMatrix::<i32, i32>::from_parts(vec![0, 1], vec![0], vec![3], 1).unwrap();
        let err = op_matmul_topn_dyn(
            DynCsrMatrix::I32F64(a),
            DynCsrMatrix::I32I32(b),
            1,
            None,
            false,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, SparseTopNError::TypeMismatch { .. }));
    }

    #[test]
    fn mixed_width_integers_promote_to_i64_without_panicking() {
        let a = CsrMatrix::<i32, i32>::from_parts(vec![0, 1], vec![0], vec![2], 1).unwrap();
        let b = CsrMatrix::<i32, i64>::from_parts(vec![0, 1], vec![0], vec![3], 1).unwrap();
        let result = op_matmul_topn_dyn(
            DynCsrMatrix::I32I32(a),
            DynCsrMatrix::I32I64(b),
            1,
            None,
            false,
            1.0,
        )
        .unwrap();
        match result {
            DynCsrMatrix::I32I64(m) => assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 6i64)]),
            other => panic!("expected I32I64, got a matrix with dtype {}", other.value_dtype()),
        }
    }

    #[test]
    fn same_width_integers_with_different_index_width_never_panic() {
        let a = CsrMatrix::<i64, i32>::from_parts(vec![0, 1], vec![0], vec![2], 1).unwrap();
        let b = CsrMatrix::<i64, i64>::from_parts(vec![0, 1], vec![0], vec![3], 1).unwrap();
        let result = op_matmul_topn_dyn(
            DynCsrMatrix::I64I32(a),
            DynCsrMatrix::I64I64(b),
            1,
            None,
            false,
            1.0,
        )
        .unwrap();
        assert!(matches!(result, DynCsrMatrix::I64I64(_)));
    }
}
