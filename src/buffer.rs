//! The output buffer manager: pre-sized `indptr`, growing `indices`/`data`,
//! sized from a caller-supplied density hint and grown geometrically
//! (spec §4.4).

use crate::dtype::{IndexInt, Numeric};

/// Accumulates the CSR output of a driver: a pre-sized `indptr` and growing
/// `indices`/`data` arrays.
pub struct OutputBuffer<Idx, Val> {
    indptr: Vec<Idx>,
    indices: Vec<Idx>,
    data: Vec<Val>,
}

impl<Idx: IndexInt, Val: Numeric> OutputBuffer<Idx, Val> {
    /// `nrows`: exact row count, used to pre-size `indptr`.
    /// `top_n`, `density`: initial capacity for `indices`/`data` is
    /// `max(1, ceil(density * top_n * nrows))` (spec §3/§4.4).
    pub fn with_density(nrows: usize, top_n: usize, density: f64) -> Self {
        let initial_capacity = ((density * top_n as f64 * nrows as f64).ceil() as usize).max(1);
        let mut indptr = Vec::with_capacity(nrows + 1);
        indptr.push(Idx::zero());
        Self {
            indptr,
            indices: Vec::with_capacity(initial_capacity),
            data: Vec::with_capacity(initial_capacity),
        }
    }

    /// Appends one row's worth of `(column, value)` survivors and records the
    /// new `indptr` entry. Growth is geometric (`Vec::push` already grows by
    /// at least the golden-ratio-adjacent factor libstd uses; spec only
    /// requires "at least x1.5", which libstd's amortized doubling satisfies).
    pub fn push_row(&mut self, entries: impl Iterator<Item = (usize, Val)>) {
        for (column, value) in entries {
            self.indices.push(Idx::from_usize_index(column));
            self.data.push(value);
        }
        self.indptr.push(Idx::from_usize_index(self.indices.len()));
    }

    /// Appends a pre-built row length without touching `indices`/`data`;
    /// used by the parallel driver when concatenating worker output after
    /// `indices`/`data` were copied in bulk.
    pub(crate) fn push_indptr(&mut self, cumulative_nnz: usize) {
        self.indptr.push(Idx::from_usize_index(cumulative_nnz));
    }

    /// Reserves room for at least `additional` more entries, growing
    /// geometrically if the current capacity is insufficient.
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.indices.reserve(additional);
        self.data.reserve(additional);
    }

    /// Appends raw slices directly, used by the parallel driver's
    /// concatenation phase to copy a worker's contiguous output in bulk.
    pub(crate) fn extend_raw(&mut self, indices: &[Idx], data: &[Val]) {
        self.indices.extend_from_slice(indices);
        self.data.extend_from_slice(data);
    }

    /// Finalizes the buffer into a `CsrMatrix`, trimming any spare capacity.
    pub fn finish(mut self, ncols: usize) -> crate::csr::CsrMatrix<Idx, Val> {
        self.indices.shrink_to_fit();
        self.data.shrink_to_fit();
        // Constructed incrementally from valid rows, so this cannot fail.
        crate::csr::CsrMatrix::from_parts(self.indptr, self.indices, self.data, ncols)
            .expect("buffer-built CSR matrix is always well-formed")
    }

    /// Current number of non-zeros appended so far.
    pub(crate) fn nnz(&self) -> usize {
        self.indices.len()
    }
}
