//! Partitioning of an index range into worker portions.
//!
//! A [`Portions`] value records contiguous sub-ranges of `[0, len)`, at
//! least one item each, optionally repaired by a boundary adjuster so
//! that rows which must stay together are never split across workers.
//! [`Portions::apply`] runs one task per portion on a [`WorkerPool`]
//! and hands back the per-portion results in portion order.

use std::ops::Range;

use crossbeam::channel;
use scoped_threadpool::Pool;

use crate::error::{Error, Result};

/// Default number of worker threads at the driver entry.
pub const DEFAULT_THREADS: u32 = 4;

/// Default lower bound on the number of items per portion.
pub const DEFAULT_MIN_PORTION: usize = 10_000;

/// Verdict of a boundary adjuster for a candidate cut offset.
///
/// The adjuster receives the exclusive end of a tentative portion and
/// answers whether cutting there would split rows that belong
/// together; `Needed` moves the cut one step rightward and asks again.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Adjustment {
    Unneeded,
    Needed,
}

/// Fixed-size pool of OS worker threads.
///
/// All parallelism in this crate is fork-join: submit one plain
/// closure per portion, then wait for the whole pass at the scope end.
pub struct WorkerPool {
    pool: Pool,
    threads: u32,
}

impl WorkerPool {
    pub fn new(threads: u32) -> Self {
        let threads = Ord::max(threads, 1);
        WorkerPool {
            pool: Pool::new(threads),
            threads,
        }
    }

    #[inline(always)]
    pub fn threads(&self) -> u32 {
        self.threads
    }
}

/// Immutable partition of `[0, len)` into contiguous worker portions.
pub struct Portions {
    min_portion_size: usize,
    offsets: Vec<(usize, usize)>,
    total: usize,
}

impl Portions {
    /// Partition `[0, len)` into up to `requested` equal portions.
    pub fn new(len: usize, requested: usize, min_portion_size: usize) -> Self {
        Self::with_adjuster(len, requested, min_portion_size, |_| Adjustment::Unneeded)
    }

    /// Partition `[0, len)` with a boundary adjuster.
    ///
    /// Each internal cut is advanced rightward while the adjuster
    /// reports `Needed`; portions emptied by the advancement are
    /// discarded and the last portion absorbs the remainder.
    pub fn with_adjuster<F>(
        len: usize,
        requested: usize,
        min_portion_size: usize,
        mut adjuster: F,
    ) -> Self
    where
        F: FnMut(usize) -> Adjustment,
    {
        let min = Ord::max(min_portion_size, 1);
        let cap = Ord::max(len / min, 1);
        let num = Ord::min(Ord::max(requested, 1), cap);
        let portion = len / num;

        let mut offsets = Vec::with_capacity(num);
        let mut end = 0;
        for _ in 0..num {
            let start = end;
            if portion == 0 || len - start < portion {
                end = len;
            } else {
                let mut cut = start + portion;
                while cut < len && adjuster(cut) == Adjustment::Needed {
                    cut += 1;
                }
                end = cut;
            }
            if start < end {
                offsets.push((start, end));
            }
        }
        if let Some(last) = offsets.last_mut() {
            last.1 = len;
        }

        trace!("partitioned {} items into {} portions", len, offsets.len());
        Portions {
            min_portion_size: min,
            offsets,
            total: len,
        }
    }

    /// Number of portions.
    #[inline(always)]
    pub fn count(&self) -> usize {
        self.offsets.len()
    }

    #[inline(always)]
    pub fn min_portion_size(&self) -> usize {
        self.min_portion_size
    }

    /// Total number of items covered.
    #[inline(always)]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Bounds of portion `k`.
    #[inline(always)]
    pub fn bounds(&self, k: usize) -> Range<usize> {
        let (start, end) = self.offsets[k];
        start..end
    }

    fn check(&self, applied_len: usize) -> Result<()> {
        if self.offsets.is_empty() || applied_len != self.total {
            return Err(Error::PortionMismatch {
                expected: self.total,
                actual: applied_len,
            });
        }
        Ok(())
    }

    /// Run `f` once per portion on the worker pool.
    ///
    /// `f` receives the portion index and its range; the returned
    /// vector preserves portion order. Fails with
    /// [`Error::PortionMismatch`] when `applied_len` differs from the
    /// partitioned range or the partition is empty.
    pub fn apply<R, F>(&self, workers: &mut WorkerPool, applied_len: usize, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize, Range<usize>) -> R + Sync,
    {
        self.apply_dynargs(workers, applied_len, |_| (), |k, range, ()| f(k, range))
    }

    /// Run `f` once per portion with per-portion extra arguments.
    ///
    /// The generator runs on the control thread and produces the `k`-th
    /// task's argument by value; tasks run concurrently in arbitrary
    /// order while the result vector preserves portion order.
    pub fn apply_dynargs<R, A, G, F>(
        &self,
        workers: &mut WorkerPool,
        applied_len: usize,
        mut generator: G,
        f: F,
    ) -> Result<Vec<R>>
    where
        R: Send,
        A: Send,
        G: FnMut(usize) -> A,
        F: Fn(usize, Range<usize>, A) -> R + Sync,
    {
        self.check(applied_len)?;
        let count = self.offsets.len();
        let (sender, receiver) = channel::bounded(count);

        workers.pool.scoped(|scope| {
            for (k, &(start, end)) in self.offsets.iter().enumerate() {
                let arg = generator(k);
                let sender = sender.clone();
                let f = &f;
                scope.execute(move || {
                    sender.send((k, f(k, start..end, arg))).unwrap();
                });
            }
        });
        drop(sender);

        let mut results: Vec<Option<R>> = (0..count).map(|_| None).collect();
        for (k, result) in receiver.iter() {
            results[k] = Some(result);
        }
        Ok(results.into_iter().map(|slot| slot.unwrap()).collect())
    }
}
