//! The bounded-result selector: keeps at most `top_n` entries per row using a
//! bounded min-heap, applying an optional threshold and optional descending
//! sort on emission.

use std::cmp::Ordering;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::dtype::Numeric;

/// A single candidate entry: a column and its accumulated value.
#[derive(Debug, Clone, Copy)]
struct HeapEntry<Val> {
    value: Val,
    column: usize,
}

// `Val: Numeric` only requires `PartialOrd`, so ties and NaN-free floats
// compare via `partial_cmp`; non-finite values never reach the heap because
// the caller's accumulator only ever produces finite sums from finite input.
impl<Val: Numeric> PartialEq for HeapEntry<Val> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.column == other.column
    }
}
impl<Val: Numeric> Eq for HeapEntry<Val> {}

impl<Val: Numeric> PartialOrd for HeapEntry<Val> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Val: Numeric> Ord for HeapEntry<Val> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Order by value first; on a value tie prefer evicting the entry
        // with the *larger* column, so survivors end up ascending-by-column
        // among ties once the min-heap is drained and reversed (spec §4.2).
        self.value
            .partial_cmp(&other.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.column.cmp(&other.column))
    }
}

/// Keeps at most `top_n` entries of a row whose value is strictly greater
/// than `threshold`, using a bounded min-heap of capacity `top_n`.
pub struct BoundedSelector<Val> {
    heap: BinaryHeap<Reverse<HeapEntry<Val>>>,
    top_n: usize,
    threshold: Val,
}

impl<Val: Numeric> BoundedSelector<Val> {
    /// Builds a selector. `top_n` is clamped to `ncols` by the caller before
    /// construction (spec §4.2); `threshold` defaults to `Val::MIN_FINITE`
    /// when unset, so all finite entries pass.
    pub fn new(top_n: usize, threshold: Option<Val>) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(top_n),
            top_n,
            threshold: threshold.unwrap_or(Val::MIN_FINITE),
        }
    }

    /// Offers one `(column, value)` candidate. Discards values `<= threshold`.
    pub fn offer(&mut self, column: usize, value: Val) {
        if value <= self.threshold {
            return;
        }
        let entry = HeapEntry { value, column };
        if self.heap.len() < self.top_n {
            self.heap.push(Reverse(entry));
        } else if let Some(Reverse(min)) = self.heap.peek() {
            if entry.cmp(min) == Ordering::Greater {
                self.heap.pop();
                self.heap.push(Reverse(entry));
            }
        }
    }

    /// Feeds every candidate from an iterator through [`Self::offer`].
    pub fn offer_all(&mut self, entries: impl Iterator<Item = (usize, Val)>) {
        for (column, value) in entries {
            self.offer(column, value);
        }
    }

    /// Drains the survivors. When `sort` is `false` the order is whatever the
    /// heap holds them in (deterministic for fixed input, unspecified
    /// otherwise per spec §4.2). When `sort` is `true`, survivors come out
    /// with value strictly descending, ties broken by ascending column.
    pub fn drain(&mut self, sort: bool) -> Vec<(usize, Val)> {
        let mut out: Vec<(usize, Val)> = self
            .heap
            .drain()
            .map(|Reverse(e)| (e.column, e.value))
            .collect();
        if sort {
            out.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
        }
        out
    }

    /// Clears the selector for reuse on the next row without deallocating.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
