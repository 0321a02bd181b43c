//! Parallel in-place reverse complement of a buffered record
//!
//! The bases of the left half are swapped with their mirror images in the right half,
//! complementing both on the way. Newlines stay where they are, so the line wrapping of
//! the record is preserved.
//!
//! Work is split by left-half chunk index. Every chunk yields a [`SpanPair`]: a left
//! byte range and the right byte range holding its mirror image. Pairs from different
//! chunks never overlap, and the strand is carved into disjoint mutable slices along
//! these ranges before any task starts, so tasks share no memory.

use std::panic::{self, AssertUnwindSafe};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::trace;

use crate::{
    complement::{ComplementTable, COMPLEMENT},
    error::{PoolError, RecordError, Result},
    layout::SpanPair,
    strand::{Strand, NEWLINE},
};

/// Mutable pieces of a [`SpanPair`], in ascending address order
struct Span<'a> {
    left: Vec<&'a mut [u8]>,
    right: Vec<&'a mut [u8]>,
}

impl Span<'_> {
    /// Walks the left pieces forward and the right pieces backward, skipping newlines
    /// independently on both sides
    fn reverse_complement(self, table: &ComplementTable) {
        let left = self
            .left
            .into_iter()
            .flat_map(|piece| piece.iter_mut())
            .filter(|b| **b != NEWLINE);
        let right = self
            .right
            .into_iter()
            .rev()
            .flat_map(|piece| piece.iter_mut().rev())
            .filter(|b| **b != NEWLINE);
        for (l, r) in left.zip(right) {
            let base = *l;
            *l = table.complement(*r);
            *r = table.complement(base);
        }
    }
}

/// Resolves the worker count: 0 means every available core, anything else is capped
/// at the number of cores
#[must_use]
pub fn resolve_threads(num_threads: usize) -> usize {
    if num_threads == 0 {
        num_cpus::get()
    } else {
        num_threads.min(num_cpus::get())
    }
}

/// Reverse complements records with a fixed pool of workers
///
/// The pool is created once and reused for every record; it shuts down when the
/// complementer is dropped.
pub struct ReverseComplementer {
    pool: ThreadPool,
    num_threads: usize,
    table: &'static ComplementTable,
}

impl ReverseComplementer {
    /// Creates a complementer with `num_threads` workers (0 for all cores)
    pub fn new(num_threads: usize) -> Result<Self> {
        let num_threads = resolve_threads(num_threads);
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|tid| format!("revcomp-{tid}"))
            .build()
            .map_err(PoolError::from)?;
        Ok(Self {
            pool,
            num_threads,
            table: &COMPLEMENT,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Reverse complements the record held by `strand` in place
    ///
    /// Blocks until every task has finished. A record without a complete title line
    /// is left untouched.
    pub fn reverse(&self, strand: &mut Strand) -> Result<()> {
        let Some(layout) = strand.layout() else {
            return Ok(());
        };

        if let Some(pos) = layout.center() {
            let address = layout.address(pos);
            let total = strand.len();
            let byte = strand
                .byte_mut(address.chunk, address.offset)
                .ok_or(RecordError::OutOfRange(pos, total))?;
            *byte = self.table.complement(*byte);
        }

        let partition = layout.partition(self.num_threads);
        let pairs: Vec<Vec<SpanPair>> = partition
            .iter()
            .map(|chunks| chunks.clone().filter_map(|i| layout.pair(i)).collect())
            .collect();

        // lefts ascend with the chunk index, rights descend
        let flat: Vec<&SpanPair> = pairs.iter().flatten().collect();
        let mut ranges: Vec<_> = flat.iter().map(|pair| pair.left.clone()).collect();
        ranges.extend(flat.iter().rev().map(|pair| pair.right.clone()));

        let mut lefts = strand.carve(&ranges)?;
        let mut rights = lefts.split_off(flat.len());
        rights.reverse();

        let mut spans = lefts
            .into_iter()
            .zip(rights)
            .map(|(left, right)| Span { left, right });
        let tasks: Vec<Vec<Span>> = pairs
            .iter()
            .map(|task| spans.by_ref().take(task.len()).collect())
            .collect();

        let table = self.table;
        self.execute(tasks, |tid, task| {
            trace!(tid, spans = task.len(), "reverse complement task");
            task.into_iter()
                .for_each(|span| span.reverse_complement(table));
        })
    }

    /// Runs `work` once per task and waits for all of them
    ///
    /// A single task runs on the calling thread. A panic in any task is reported as
    /// [`PoolError::WorkerPanicked`] once the remaining tasks have finished.
    fn execute<T, F>(&self, tasks: Vec<T>, work: F) -> Result<()>
    where
        T: Send,
        F: Fn(usize, T) + Sync,
    {
        let work = &work;
        let outcome = if tasks.len() <= 1 {
            panic::catch_unwind(AssertUnwindSafe(|| {
                tasks.into_iter().for_each(|task| work(0, task));
            }))
        } else {
            panic::catch_unwind(AssertUnwindSafe(|| {
                self.pool.scope(|scope| {
                    for (tid, task) in tasks.into_iter().enumerate() {
                        scope.spawn(move |_| work(tid, task));
                    }
                });
            }))
        };
        outcome.map_err(|_| PoolError::WorkerPanicked.into())
    }
}
