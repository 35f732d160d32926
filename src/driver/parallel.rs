//! The parallel driver: partitions rows of `A` across a private `rayon`
//! thread pool, lets each worker own its accumulator scratch and output
//! buffers, then concatenates worker output sequentially (spec §4.6).
//!
//! No locks or atomics are needed on the hot path: workers only ever read
//! `A`/`B` and write their own buffers. The concatenation phase computes
//! target offsets up front and copies disjoint slices, so it too needs no
//! synchronisation beyond the final sequential pass.

use rayon::prelude::*;

use crate::accumulator::SparseAccumulator;
use crate::buffer::OutputBuffer;
use crate::csr::CsrMatrix;
use crate::dtype::{IndexInt, Numeric};
use crate::error::SparseTopNError;
use crate::selector::BoundedSelector;

/// One worker's contribution: the row lengths it produced (in row order) and
/// the concatenated `indices`/`data` for those rows.
struct WorkerOutput<Idx, Val> {
    row_lens: Vec<usize>,
    indices: Vec<Idx>,
    data: Vec<Val>,
}

/// Resolves the caller's `n_threads` request into a thread count: `-1` means
/// "all physical cores minus one" (spec §4.6), clamped to `[1, nrows]`.
pub fn resolve_thread_count(n_threads: i64, nrows: usize) -> Result<usize, SparseTopNError> {
    if n_threads < -1 {
        return Err(SparseTopNError::InvalidArgument {
            name: "n_threads",
            reason: format!("must be >= -1, got {n_threads}"),
        });
    }
    let requested = if n_threads == -1 {
        num_cpus::get_physical().saturating_sub(1).max(1)
    } else {
        n_threads as usize
    };
    Ok(requested.max(1).min(nrows.max(1)))
}

fn build_pool(n_threads: usize) -> Result<rayon::ThreadPool, SparseTopNError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build()
        .map_err(|e| SparseTopNError::ThreadPool {
            requested: n_threads,
            source: e.to_string(),
        })
}

/// Splits `0..nrows` into `n_workers` contiguous, near-equal ranges.
fn row_ranges(nrows: usize, n_workers: usize) -> Vec<std::ops::Range<usize>> {
    let n_workers = n_workers.max(1);
    let base = nrows / n_workers;
    let rem = nrows % n_workers;
    let mut ranges = Vec::with_capacity(n_workers);
    let mut start = 0;
    for w in 0..n_workers {
        let len = base + usize::from(w < rem);
        let end = start + len;
        if start < end {
            ranges.push(start..end);
        }
        start = end;
    }
    ranges
}

fn run_worker<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
    rows: std::ops::Range<usize>,
    top_n: usize,
    threshold: Option<Val>,
    sort: bool,
) -> WorkerOutput<Idx, Val> {
    let ncols = b.ncols();
    let mut acc = SparseAccumulator::new(ncols);
    let mut sel = BoundedSelector::new(top_n, threshold);
    let mut row_lens = Vec::with_capacity(rows.len());
    let mut indices = Vec::new();
    let mut data = Vec::new();

    for i in rows {
        acc.scatter_row(a.row(i), b);
        sel.offer_all(acc.touched_entries());
        let survivors = sel.drain(sort);
        row_lens.push(survivors.len());
        for (column, value) in survivors {
            indices.push(Idx::from_usize_index(column));
            data.push(value);
        }
        sel.clear();
        acc.reset_row();
    }

    WorkerOutput {
        row_lens,
        indices,
        data,
    }
}

/// Computes `A * B` with top-n pruning, fanning row ranges out across a
/// private thread pool of `n_threads` workers.
pub fn matmul_topn<Idx: IndexInt, Val: Numeric>(
    a: &CsrMatrix<Idx, Val>,
    b: &CsrMatrix<Idx, Val>,
    top_n: usize,
    threshold: Option<Val>,
    sort: bool,
    density: f64,
    n_threads: i64,
) -> Result<CsrMatrix<Idx, Val>, SparseTopNError> {
    let nrows = a.nrows();
    let ncols = b.ncols();
    let top_n = top_n.min(ncols).max(1);

    if a.nnz() == 0 || b.nnz() == 0 {
        return Ok(CsrMatrix::zeros(nrows, ncols));
    }

    let n_workers = resolve_thread_count(n_threads, nrows)?;
    if n_workers <= 1 {
        return Ok(crate::driver::sequential::matmul_topn(
            a, b, top_n, threshold, sort, density,
        ));
    }

    let pool = build_pool(n_workers)?;
    let ranges = row_ranges(nrows, n_workers);
    let worker_outputs: Vec<WorkerOutput<Idx, Val>> = pool.install(|| {
        ranges
            .par_iter()
            .map(|range| run_worker(a, b, range.clone(), top_n, threshold, sort))
            .collect()
    });

    Ok(concatenate(worker_outputs, nrows, ncols, top_n, density))
}

/// Sequential concatenation: computes the global `indptr` via prefix sum
/// over worker row-lengths, then copies each worker's `indices`/`data` at the
/// precomputed offset. Row order is preserved regardless of worker count
/// (spec §4.6: "thread-count-invariant").
fn concatenate<Idx: IndexInt, Val: Numeric>(
    worker_outputs: Vec<WorkerOutput<Idx, Val>>,
    nrows: usize,
    ncols: usize,
    top_n: usize,
    density: f64,
) -> CsrMatrix<Idx, Val> {
    let total_nnz: usize = worker_outputs.iter().map(|w| w.indices.len()).sum();
    let mut out = OutputBuffer::with_density(nrows, top_n, density);
    out.reserve(total_nnz);

    let mut cumulative = 0usize;
    for worker in &worker_outputs {
        out.extend_raw(&worker.indices, &worker.data);
        for &len in &worker.row_lens {
            cumulative += len;
            out.push_indptr(cumulative);
        }
    }

    out.finish(ncols)
}
