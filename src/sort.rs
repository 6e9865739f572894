//! Parallel LSD radix sort of trigrams.
//!
//! One pass is a parallel bucket sort: every portion counts its items
//! into a thread-local frequency table, the tables are combined into a
//! cumulative global table, each portion then receives its own copy of
//! the bucket write cursors offset by all earlier portions, and finally
//! scatters its items. The per-portion cursor ranges partition every
//! bucket, so the scattered writes are disjoint and each pass is
//! stable.

use std::mem;

use crate::alphabet::{Alphabet, BucketTable, ZeroRangeAlphabet};
use crate::error::Result;
use crate::portions::{Portions, WorkerPool};
use crate::trigram::{S1Trigram, Trigram};
use crate::types::{SharedSlice, SkewChar, SkewIndex};

/// One parallel bucket-sort pass over `src`, keyed by `extract`.
pub(crate) fn bucket_sort_pass<C, P, A, T, E>(
    alphabet: &A,
    src: &[T],
    dst: &mut [T],
    extract: E,
    portions: &Portions,
    workers: &mut WorkerPool,
) -> Result<()>
where
    C: SkewChar,
    P: SkewIndex,
    A: Alphabet<C, P>,
    T: Copy + Send + Sync,
    E: Fn(&T) -> C + Sync,
{
    debug_assert_eq!(src.len(), dst.len());

    // count into thread-local tables.
    let mut locals = portions.apply(workers, src.len(), |_, range| {
        let mut table = alphabet.empty_table();
        for item in &src[range] {
            table.tally(extract(item));
        }
        table
    })?;

    // combine into the global cumulative table.
    let mut cumul = alphabet.empty_table();
    for table in &locals {
        cumul.add_assign(table);
    }
    cumul.make_cumulative();

    // rotate the cumulative baseline through the portion tables: after
    // the swap, portion k holds the write cursors for its share of each
    // bucket, and the running table gains portion k's counts. The
    // iteration order is load-bearing.
    for table in locals.iter_mut() {
        mem::swap(&mut cumul, table);
        cumul.add_assign(table);
    }

    // scatter. Bucket cursor ranges are disjoint across portions.
    let shared = SharedSlice::new(dst);
    let mut handout = locals.into_iter();
    portions.apply_dynargs(
        workers,
        src.len(),
        |_| handout.next().unwrap(),
        |_, range, mut table| {
            for item in &src[range] {
                unsafe { shared.set(table.next_index(extract(item)), *item) };
            }
        },
    )?;
    Ok(())
}

/// Lexicographically sort 2,3-trigrams by their three symbols.
///
/// Three LSD passes, least-significant symbol first; positions ride
/// along. Stable, so sorting a sorted sequence is the identity.
pub fn sort_23trigrams<C, P, A, T>(
    alphabet: &A,
    trigrams: &mut Vec<T>,
    portions: &Portions,
    workers: &mut WorkerPool,
) -> Result<()>
where
    C: SkewChar,
    P: SkewIndex,
    A: Alphabet<C, P>,
    T: Trigram<Char = C, Pos = P> + Copy + Default + Send + Sync,
{
    if trigrams.len() < 2 {
        return Ok(());
    }
    let mut temp = vec![T::default(); trigrams.len()];

    bucket_sort_pass(alphabet, trigrams, &mut temp, |t: &T| t.ch3(), portions, workers)?;
    mem::swap(trigrams, &mut temp);
    bucket_sort_pass(alphabet, trigrams, &mut temp, |t: &T| t.ch2(), portions, workers)?;
    mem::swap(trigrams, &mut temp);
    bucket_sort_pass(alphabet, trigrams, &mut temp, |t: &T| t.ch1(), portions, workers)?;
    mem::swap(trigrams, &mut temp);
    Ok(())
}

/// Sort S1 records by `(following rank, symbol)`.
///
/// Two stable bucket passes: first the rank of the following S23
/// suffix over a dense rank alphabet, then the leading symbol over the
/// level's character alphabet.
pub fn sort_s1trigrams<C, P, A>(
    char_alphabet: &A,
    rank_alphabet: &ZeroRangeAlphabet<P, P>,
    s1: &mut Vec<S1Trigram<C, P>>,
    portions: &Portions,
    workers: &mut WorkerPool,
) -> Result<()>
where
    C: SkewChar,
    P: SkewIndex,
    A: Alphabet<C, P>,
{
    if s1.len() < 2 {
        return Ok(());
    }
    let mut temp = vec![S1Trigram::<C, P>::default(); s1.len()];

    bucket_sort_pass(
        rank_alphabet,
        s1,
        &mut temp,
        |t: &S1Trigram<C, P>| t.renamed_s1,
        portions,
        workers,
    )?;
    mem::swap(s1, &mut temp);
    bucket_sort_pass(
        char_alphabet,
        s1,
        &mut temp,
        |t: &S1Trigram<C, P>| t.ch,
        portions,
        workers,
    )?;
    mem::swap(s1, &mut temp);
    Ok(())
}
