//! Suffix array construction by the Kärkkäinen-Sanders skew algorithm.
//!
//! The driver establishes the order of the suffixes at positions not
//! divisible by three (S23) first: extract the 2,3-trigrams, sort them
//! with three parallel bucket passes, rename them lexicographically,
//! and recurse on the renamed string while duplicate names remain.
//! Recursion is modeled by an explicit work-pile rather than the call
//! stack; renamed strings live in blocked large arrays so one level's
//! string survives while the levels below it run. The S1 suffixes
//! (positions divisible by three) are then sorted by two bucket passes
//! and merged with S23 using the constant-time comparator.
//!
//! Ranks are one-based throughout; rank zero stands for the empty
//! suffix past the end of the text and sorts below everything.

use std::cmp::Ordering;
use std::mem::size_of;
use std::sync::Arc;

use crate::alphabet::{Alphabet, SparseAlphabet, ZeroRangeAlphabet};
use crate::error::{Error, Result};
use crate::large_array::{LargeArray, DEFAULT_BLOCK_UNITS};
use crate::pool::MemoryPool;
use crate::portions::{Portions, WorkerPool, DEFAULT_MIN_PORTION, DEFAULT_THREADS};
use crate::rename::{rename_lexicographically, Recursion};
use crate::sort::{sort_23trigrams, sort_s1trigrams};
use crate::trigram::{extract_23trigrams, ArrayTrigram, S1Trigram, Trigram};
use crate::types::{ceil_divide, As, AsIndex, SharedSlice, SkewChar, SkewIndex, Text};

/// Build the suffix array of `text` with the default thread count.
///
/// The position type `P` must be able to represent every index of the
/// text; the call fails with [`Error::OutOfRange`] otherwise.
pub fn make_suffix_array<C, P>(text: &[C]) -> Result<Vec<P>>
where
    C: SkewChar,
    P: SkewIndex,
{
    make_suffix_array_threaded(text, DEFAULT_THREADS)
}

/// Build the suffix array of `text` using `threads` worker threads.
pub fn make_suffix_array_threaded<C, P>(text: &[C], threads: u32) -> Result<Vec<P>>
where
    C: SkewChar,
    P: SkewIndex,
{
    let max_pos: u128 = <P as As<u128>>::r#as(P::MAX);
    if text.len() as u128 > max_pos {
        return Err(Error::OutOfRange(
            "position type too narrow for the text length",
        ));
    }

    let mut workers = WorkerPool::new(threads);
    let pool = Arc::new(MemoryPool::new(size_of::<P>())?);
    debug!(
        "constructing suffix array over {} symbols with {} workers",
        text.len(),
        workers.threads()
    );

    let alphabet = SparseAlphabet::<C, P>::new();
    let order = level_s23_order(text, &alphabet, &pool, DEFAULT_BLOCK_UNITS, &mut workers)?;
    finish_level(text, order, &alphabet, &mut workers)
}

/// Number of suffixes at positions congruent 1 modulo 3.
#[inline(always)]
fn front_slots(n: usize) -> usize {
    ceil_divide(n.saturating_sub(1), 3)
}

/// Number of suffixes at positions congruent 2 modulo 3.
#[inline(always)]
fn back_slots(n: usize) -> usize {
    ceil_divide(n.saturating_sub(2), 3)
}

/// Number of complete trigrams at positions congruent 1 modulo 3.
#[inline(always)]
fn complete_front(n: usize) -> usize {
    if n >= 4 {
        (n - 4) / 3 + 1
    } else {
        0
    }
}

/// Number of complete trigrams at positions congruent 2 modulo 3.
#[inline(always)]
fn complete_back(n: usize) -> usize {
    if n >= 5 {
        (n - 5) / 3 + 1
    } else {
        0
    }
}

/// A renamed string prepared for the next recursion level.
///
/// Layout: one slot per mod-1 suffix of the parent in position order,
/// a zero separator, one slot per mod-2 suffix, a zero terminator.
/// Symbols are one-based ranks of the parent's trigram classes, with
/// synthetic ranks spliced in for the at most two parent suffixes
/// whose trigram is incomplete, so every parent S23 suffix owns a
/// slot and comparisons never leak across the halves.
struct RecString<P: SkewIndex> {
    arr: LargeArray<P>,
    /// Front slot count, needed to map a suffix array of this string
    /// back to parent positions.
    parent_front: usize,
    /// Exclusive upper bound of the symbol values.
    alphabet: usize,
}

/// One pending recursion level: the renamed string and its sorted
/// trigrams, waiting to be renamed in turn.
struct Frame<P: SkewIndex> {
    string: RecString<P>,
    trigrams: Vec<ArrayTrigram<P, P>>,
}

/// Establish the S23 suffix order of `text`.
///
/// Sorting and renaming happen at this level; if the names are not
/// unique the renamed string is pushed onto the work-pile and solved
/// iteratively.
fn level_s23_order<Txt, C, P, A>(
    text: &Txt,
    alphabet: &A,
    pool: &Arc<MemoryPool>,
    block_units: u32,
    workers: &mut WorkerPool,
) -> Result<Vec<P>>
where
    Txt: Text<Sym = C> + ?Sized,
    C: SkewChar,
    P: SkewIndex,
    A: Alphabet<C, P>,
{
    let mut trigrams = extract_23trigrams::<P, _>(text);
    let portions = Portions::new(
        trigrams.len(),
        workers.threads() as usize,
        DEFAULT_MIN_PORTION,
    );
    sort_23trigrams(alphabet, &mut trigrams, &portions, workers)?;

    let center = ceil_divide(trigrams.len(), 2);
    let mut names = vec![P::ZERO; trigrams.len()];
    let (flag, distinct) = {
        let trigs = &trigrams;
        let posmap = move |k: usize| {
            let pos = trigs[k].pos().as_index();
            if pos % 3 == 1 {
                pos / 3
            } else {
                center + pos / 3
            }
        };
        rename_lexicographically(&trigrams, &mut names, posmap, workers)?
    };

    match flag {
        Recursion::Unneeded => Ok(s23_order_with_tails(text, &trigrams)),
        Recursion::Needed => {
            let first =
                build_recursion_string(pool, block_units, text, &trigrams, &names, distinct)?;
            drop(names);
            drop(trigrams);
            let sa = solve_pile(first, pool, block_units, workers)?;
            Ok(map_to_parent_s23(front_slots(text.len()), &sa))
        }
    }
}

/// Drive the work-pile until every pending level is wound up.
fn solve_pile<P: SkewIndex>(
    first: RecString<P>,
    pool: &Arc<MemoryPool>,
    block_units: u32,
    workers: &mut WorkerPool,
) -> Result<Vec<P>> {
    let mut pile: Vec<Frame<P>> = Vec::new();
    let trigrams = sorted_trigrams_of(&first, workers)?;
    pile.push(Frame {
        string: first,
        trigrams,
    });

    loop {
        // rename the top frame.
        let (flag, distinct, names) = {
            let top = pile.last().unwrap();
            let center = ceil_divide(top.trigrams.len(), 2);
            let mut names = vec![P::ZERO; top.trigrams.len()];
            let trigs = &top.trigrams;
            let posmap = move |k: usize| {
                let pos = trigs[k].pos().as_index();
                if pos % 3 == 1 {
                    pos / 3
                } else {
                    center + pos / 3
                }
            };
            let (flag, distinct) =
                rename_lexicographically(trigs, &mut names, posmap, workers)?;
            (flag, distinct, names)
        };

        if let Recursion::Needed = flag {
            let next = {
                let top = pile.last().unwrap();
                build_recursion_string(
                    pool,
                    block_units,
                    &top.string.arr,
                    &top.trigrams,
                    &names,
                    distinct,
                )?
            };
            let trigrams = sorted_trigrams_of(&next, workers)?;
            debug!(
                "descending to recursion level {} ({} symbols)",
                pile.len() + 1,
                next.arr.len()
            );
            pile.push(Frame {
                string: next,
                trigrams,
            });
            continue;
        }

        // unique names: the top frame's S23 order is settled. Wind the
        // pile up, popping one level per merged suffix array.
        let mut order = {
            let top = pile.last().unwrap();
            s23_order_with_tails(&top.string.arr, &top.trigrams)
        };
        loop {
            let frame = pile.pop().unwrap();
            let parent_front = frame.string.parent_front;
            let char_alphabet = ZeroRangeAlphabet::<P, P>::new(frame.string.alphabet);
            let sa = finish_level(&frame.string.arr, order, &char_alphabet, workers)?;
            drop(frame);
            if pile.is_empty() {
                return Ok(sa);
            }
            debug!("wound up to recursion level {}", pile.len());
            order = map_to_parent_s23(parent_front, &sa);
        }
    }
}

/// Extract and sort the 2,3-trigrams of a renamed string.
fn sorted_trigrams_of<P: SkewIndex>(
    rec: &RecString<P>,
    workers: &mut WorkerPool,
) -> Result<Vec<ArrayTrigram<P, P>>> {
    let mut trigrams = extract_23trigrams::<P, _>(&rec.arr);
    let portions = Portions::new(
        trigrams.len(),
        workers.threads() as usize,
        DEFAULT_MIN_PORTION,
    );
    let alphabet = ZeroRangeAlphabet::<P, P>::new(rec.alphabet);
    sort_23trigrams(&alphabet, &mut trigrams, &portions, workers)?;
    Ok(trigrams)
}

/// Compare the suffix at `p`, which has fewer than three symbols left,
/// against the suffix at `q`. A missing symbol sorts below every real
/// one, so a proper prefix precedes its extensions.
fn compare_tail_suffix<Txt>(text: &Txt, p: usize, q: usize) -> Ordering
where
    Txt: Text + ?Sized,
{
    let n = text.len();
    let mut j = 0;
    loop {
        if p + j >= n {
            return Ordering::Less;
        }
        match text.try_sym(q + j) {
            None => return Ordering::Greater,
            Some(cq) => {
                let cp = text.sym(p + j);
                if cp != cq {
                    return cp.cmp(&cq);
                }
            }
        }
        j += 1;
    }
}

/// S23 suffix order from sorted, uniquely named trigrams.
///
/// Unique names mean the trigram order already is the suffix order for
/// every suffix owning a complete trigram; the at most two tail
/// suffixes are inserted by binary search.
fn s23_order_with_tails<Txt, P>(text: &Txt, sorted: &[ArrayTrigram<Txt::Sym, P>]) -> Vec<P>
where
    Txt: Text + ?Sized,
    P: SkewIndex,
{
    let n = text.len();
    let mut order: Vec<P> = sorted.iter().map(|t| t.pos()).collect();
    for p in n.saturating_sub(2)..n {
        if p >= 1 && p % 3 != 0 {
            let at = order
                .binary_search_by(|&q| compare_tail_suffix(text, p, q.as_index()).reverse())
                .unwrap_err();
            order.insert(at, P::from_index(p));
        }
    }
    order
}

/// Compare a stored trigram against the zero-padded trigram starting
/// at `p`, where fewer than three symbols remain.
fn compare_trigram_with_padded<Txt, P>(
    text: &Txt,
    trigram: &ArrayTrigram<Txt::Sym, P>,
    p: usize,
) -> Ordering
where
    Txt: Text + ?Sized,
    P: SkewIndex,
{
    let chars = [trigram.ch1(), trigram.ch2(), trigram.ch3()];
    for (j, &ct) in chars.iter().enumerate() {
        match text.try_sym(p + j) {
            None => return Ordering::Greater,
            Some(cp) => {
                if ct != cp {
                    return ct.cmp(&cp);
                }
            }
        }
    }
    unreachable!("a padded tail trigram has fewer than three symbols")
}

/// Compare the zero-padded trigrams at two tail positions.
fn compare_padded_tails<Txt>(text: &Txt, p: usize, q: usize) -> Ordering
where
    Txt: Text + ?Sized,
{
    for j in 0..3 {
        let a = text.try_sym(p + j);
        let b = text.try_sym(q + j);
        if a != b {
            return a.cmp(&b);
        }
    }
    unreachable!("distinct tail positions have distinct paddings")
}

/// Build the string for the next recursion level.
///
/// Complete-trigram names are lifted to one-based symbols; each side's
/// missing tail suffix, if any, receives a synthetic symbol ranked by
/// binary search among the name classes; zero fills the separator
/// after each half.
fn build_recursion_string<Txt, P>(
    pool: &Arc<MemoryPool>,
    block_units: u32,
    text: &Txt,
    sorted: &[ArrayTrigram<Txt::Sym, P>],
    names: &[P],
    distinct: P,
) -> Result<RecString<P>>
where
    Txt: Text + ?Sized,
    P: SkewIndex,
{
    let n = text.len();
    let front = front_slots(n);
    let back = back_slots(n);
    let t1c = complete_front(n);
    let t2c = complete_back(n);
    let center = ceil_divide(sorted.len(), 2);
    let classes = distinct.as_index();
    debug_assert_eq!(center, t1c);
    debug_assert_eq!(sorted.len(), t1c + t2c);

    // rank the missing tail suffixes among the trigram classes.
    struct Tail {
        pos: usize,
        point: usize,
    }
    let insertion_point = |p: usize| -> usize {
        let at = sorted
            .binary_search_by(|t| compare_trigram_with_padded(text, t, p))
            .unwrap_err();
        if at == sorted.len() {
            classes
        } else {
            let pos = sorted[at].pos().as_index();
            let slot = if pos % 3 == 1 {
                pos / 3
            } else {
                center + pos / 3
            };
            names[slot].as_index()
        }
    };
    let mut tails = Vec::new();
    if front > t1c {
        let pos = 3 * t1c + 1;
        tails.push(Tail {
            pos,
            point: insertion_point(pos),
        });
    }
    if back > t2c {
        let pos = 3 * t2c + 2;
        tails.push(Tail {
            pos,
            point: insertion_point(pos),
        });
    }
    tails.sort_by(|a, b| {
        a.point
            .cmp(&b.point)
            .then_with(|| compare_padded_tails(text, a.pos, b.pos))
    });

    let class_symbol = |class: usize| -> usize {
        1 + class + tails.iter().filter(|t| t.point <= class).count()
    };
    let tail_symbol = |pos: usize| -> usize {
        let rank = tails.iter().position(|t| t.pos == pos).unwrap();
        1 + tails[rank].point + rank
    };

    let mut arr = LargeArray::new(Arc::clone(pool), block_units)?;
    arr.resize((front + back + 2) as u64)?;
    for j in 0..t1c {
        arr.set(j as u64, P::from_index(class_symbol(names[j].as_index())))?;
    }
    if front > t1c {
        arr.set(t1c as u64, P::from_index(tail_symbol(3 * t1c + 1)))?;
    }
    // arr[front] is the zero separator, left as allocated.
    for j in 0..t2c {
        arr.set(
            (front + 1 + j) as u64,
            P::from_index(class_symbol(names[center + j].as_index())),
        )?;
    }
    if back > t2c {
        arr.set(
            (front + 1 + t2c) as u64,
            P::from_index(tail_symbol(3 * t2c + 2)),
        )?;
    }

    Ok(RecString {
        arr,
        parent_front: front,
        alphabet: classes + tails.len() + 1,
    })
}

/// Translate a recursion level's suffix array into the parent's S23
/// suffix order, dropping the separator slots.
fn map_to_parent_s23<P: SkewIndex>(parent_front: usize, sa: &[P]) -> Vec<P> {
    let last = sa.len() - 1;
    let mut order = Vec::with_capacity(sa.len() - 2);
    for &u in sa {
        let u = u.as_index();
        if u < parent_front {
            order.push(P::from_index(3 * u + 1));
        } else if u != parent_front && u != last {
            order.push(P::from_index(3 * (u - parent_front - 1) + 2));
        }
    }
    order
}

/// Scatter one-based S23 ranks into the center-split rank array.
fn invert_order<P: SkewIndex>(n: usize, order: &[P], workers: &mut WorkerPool) -> Result<Vec<P>> {
    let front = front_slots(n);
    let mut inv = vec![P::ZERO; front + back_slots(n)];
    if !order.is_empty() {
        let shared = SharedSlice::new(&mut inv[..]);
        let portions = Portions::new(order.len(), workers.threads() as usize, DEFAULT_MIN_PORTION);
        portions.apply(workers, order.len(), |_, range| {
            for i in range {
                let p = order[i].as_index();
                let slot = if p % 3 == 1 { p / 3 } else { front + p / 3 };
                // slots are distinct because `order` is a permutation.
                unsafe { shared.set(slot, P::from_index(i + 1)) };
            }
        })?;
    }
    Ok(inv)
}

/// One-based rank of the S23 suffix at `pos`; zero past the end.
#[inline]
fn rank_of<P: SkewIndex>(inv: &[P], front: usize, n: usize, pos: usize) -> P {
    if pos >= n {
        return P::ZERO;
    }
    if pos % 3 == 1 {
        inv[pos / 3]
    } else {
        debug_assert_eq!(pos % 3, 2);
        inv[front + pos / 3]
    }
}

/// S1 records of `text`: position, leading symbol, and the rank of the
/// S23 suffix right after it.
fn make_s1trigrams<Txt, P>(text: &Txt, inv: &[P], front: usize) -> Vec<S1Trigram<Txt::Sym, P>>
where
    Txt: Text + ?Sized,
    P: SkewIndex,
{
    let n = text.len();
    (0..n)
        .step_by(3)
        .map(|p| S1Trigram::new(P::from_index(p), text.sym(p), rank_of(inv, front, n, p + 1)))
        .collect()
}

/// Does the S23 suffix at `p` precede the S1 record `rhs`?
///
/// The constant-time comparator of the skew algorithm: compare one or
/// two symbols directly, then fall back to already established ranks.
fn s23_precedes<Txt, P>(
    text: &Txt,
    inv: &[P],
    front: usize,
    p: usize,
    rhs: &S1Trigram<Txt::Sym, P>,
) -> bool
where
    Txt: Text + ?Sized,
    P: SkewIndex,
{
    let n = text.len();
    let q = rhs.pos.as_index();
    let cp = text.sym(p);
    if cp != rhs.ch {
        return cp < rhs.ch;
    }
    if p % 3 == 1 {
        rank_of(inv, front, n, p + 1) < rhs.renamed_s1
    } else {
        let cp2 = text.try_sym(p + 1);
        let cq2 = text.try_sym(q + 1);
        if cp2 != cq2 {
            return cp2 < cq2;
        }
        rank_of(inv, front, n, p + 2) < rank_of(inv, front, n, q + 2)
    }
}

/// Complete one level: invert the S23 order into ranks, build and sort
/// the S1 records, and merge the two classes into the suffix array.
fn finish_level<Txt, C, P, A>(
    text: &Txt,
    order: Vec<P>,
    char_alphabet: &A,
    workers: &mut WorkerPool,
) -> Result<Vec<P>>
where
    Txt: Text<Sym = C> + ?Sized,
    C: SkewChar,
    P: SkewIndex,
    A: Alphabet<C, P>,
{
    let n = text.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let front = front_slots(n);
    let inv = invert_order(n, &order, workers)?;

    let mut s1 = make_s1trigrams(text, &inv, front);
    let portions = Portions::new(s1.len(), workers.threads() as usize, DEFAULT_MIN_PORTION);
    let rank_alphabet = ZeroRangeAlphabet::<P, P>::new(order.len() + 1);
    sort_s1trigrams(char_alphabet, &rank_alphabet, &mut s1, &portions, workers)?;

    // single-threaded two-way merge.
    let mut sa = Vec::with_capacity(n);
    let mut i = 0;
    let mut j = 0;
    while i < order.len() && j < s1.len() {
        if s23_precedes(text, &inv, front, order[i].as_index(), &s1[j]) {
            sa.push(order[i]);
            i += 1;
        } else {
            sa.push(s1[j].pos);
            j += 1;
        }
    }
    sa.extend_from_slice(&order[i..]);
    for record in &s1[j..] {
        sa.push(record.pos);
    }
    Ok(sa)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference construction: stable sort of all suffix indices.
    fn naive<C: SkewChar, P: SkewIndex>(text: &[C]) -> Vec<P> {
        let mut sa: Vec<P> = (0..text.len()).map(P::from_index).collect();
        sa.sort_by(|&i, &j| Ord::cmp(&text[i.as_index()..], &text[j.as_index()..]));
        sa
    }

    #[test]
    fn tablecheck_tiny_texts() {
        let texts: &[&[u8]] = &[
            b"",
            b"a",
            b"ab",
            b"ba",
            b"aa",
            b"abc",
            b"aaa",
            b"abca",
            b"aaaa",
            b"abcab",
            b"aaaaa",
            b"abcabc",
            b"aaaaaa",
            b"abcdefg",
            b"aaaaaab",
            b"abcdefgh",
            b"aaaaaaaa",
        ];
        for &text in texts {
            assert_eq!(
                make_suffix_array::<u8, u32>(text).unwrap(),
                naive::<u8, u32>(text),
                "text {:?}",
                std::str::from_utf8(text).unwrap()
            );
        }
    }

    #[test]
    fn three_symbols_sort_directly() {
        // no S23 trigram exists; the merge works from the S1 side alone.
        let sa = make_suffix_array::<u8, u32>(b"abc").unwrap();
        assert_eq!(sa, vec![0, 1, 2]);
    }

    #[test]
    fn eight_symbols_have_unique_names() {
        let sa = make_suffix_array::<u8, u32>(b"abcdefgh").unwrap();
        assert_eq!(sa, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn tablecheck_center_split_names() {
        // first-level sort and rename of the 94-symbol sample.
        let text: &[u8] = b"ruxxysaxaaabdyduuuusuxyabxbxbbsbaxuxyuxasuxytsysbbbstxusyxstauwwyqtqysxuxyssyswwbbababbwbbwwww";
        let expected: Vec<u16> = vec![
            33, 48, 38, 2, 46, 30, 23, 45, 40, 8, 6, 34, 32, 23, 53, 49, 8, 28, 25, 22, 31, 47,
            18, 42, 50, 51, 35, 1, 9, 9, 36, 43, 19, 0, 10, 16, 29, 34, 3, 15, 11, 4, 44, 39, 34,
            27, 20, 12, 41, 54, 26, 37, 17, 52, 34, 21, 24, 7, 5, 13, 14,
        ];

        let mut workers = WorkerPool::new(1);
        let mut trigrams = extract_23trigrams::<u16, _>(text);
        assert_eq!(trigrams.len(), 61);
        let portions = Portions::new(trigrams.len(), 1, DEFAULT_MIN_PORTION);
        sort_23trigrams(
            &SparseAlphabet::<u8, u16>::new(),
            &mut trigrams,
            &portions,
            &mut workers,
        )
        .unwrap();

        let center = ceil_divide(trigrams.len(), 2);
        assert_eq!(center, 31);
        let mut names = vec![0u16; trigrams.len()];
        let trigs = &trigrams;
        let (flag, _) = rename_lexicographically(
            trigs,
            &mut names,
            |k| {
                let pos = trigs[k].pos().as_index();
                if pos % 3 == 1 {
                    pos / 3
                } else {
                    center + pos / 3
                }
            },
            &mut workers,
        )
        .unwrap();

        assert_eq!(names, expected);
        assert_eq!(flag, Recursion::Needed);
    }

    #[test]
    fn full_construction_of_the_sample_text() {
        let text: &[u8] = b"ruxxysaxaaabdyduuuusuxyabxbxbbsbaxuxyuxasuxytsysbbbstxusyxstauwwyqtqysxuxyssyswwbbababbwbbwwww";
        for threads in &[1u32, 3, 4] {
            assert_eq!(
                make_suffix_array_threaded::<u8, u32>(text, *threads).unwrap(),
                naive::<u8, u32>(text)
            );
        }
    }

    #[test]
    fn sorted_s23_trigrams_of_aecabfgc() {
        let sa = make_suffix_array::<u8, u32>(b"aecabfgc").unwrap();
        assert_eq!(sa, naive::<u8, u32>(b"aecabfgc"));
    }

    #[test]
    fn identical_symbols_recurse_to_the_bottom() {
        let text = vec![b'a'; 243];
        let expected: Vec<u32> = (0..243).rev().collect();
        assert_eq!(make_suffix_array::<u8, u32>(&text).unwrap(), expected);
    }

    #[test]
    fn narrow_position_type_is_rejected() {
        let exact = vec![7u8; 255];
        assert!(make_suffix_array::<u8, u8>(&exact).is_ok());

        let too_long = vec![7u8; 256];
        assert_eq!(
            make_suffix_array::<u8, u8>(&too_long),
            Err(Error::OutOfRange(
                "position type too narrow for the text length"
            ))
        );
    }

    #[test]
    fn wide_symbols_and_positions() {
        let text: Vec<u32> = (0..200u32).map(|i| (i * i) % 5 + 1_000_000).collect();
        assert_eq!(
            make_suffix_array::<u32, u64>(&text).unwrap(),
            naive::<u32, u64>(&text)
        );
    }

    #[test]
    fn suffix_array_is_a_sorted_permutation() {
        let text: Vec<u8> = (0..500u32).map(|i| (i * 31 % 7) as u8).collect();
        let sa = make_suffix_array::<u8, u32>(&text).unwrap();

        let mut seen = vec![false; text.len()];
        for &p in &sa {
            assert!(!seen[p.as_index()]);
            seen[p.as_index()] = true;
        }
        assert!(seen.into_iter().all(|s| s));
        for w in sa.windows(2) {
            assert!(text[w[0].as_index()..] < text[w[1].as_index()..]);
        }
    }

    #[test]
    fn inverting_the_suffix_array_twice_is_identity() {
        let text: &[u8] = b"aecabfgcaecabfgc";
        let sa = make_suffix_array::<u8, u32>(text).unwrap();

        let mut inv = vec![0u32; sa.len()];
        for (i, &p) in sa.iter().enumerate() {
            inv[p.as_index()] = i as u32;
        }
        let mut back = vec![0u32; sa.len()];
        for (i, &r) in inv.iter().enumerate() {
            back[r.as_index()] = i as u32;
        }
        assert_eq!(back, sa);
    }

    #[quickcheck]
    fn quickcheck_matches_naive_u8(text: Vec<u8>, threads: u8) -> bool {
        let threads = u32::from(threads % 6) + 1;
        make_suffix_array_threaded::<u8, u32>(&text, threads).unwrap() == naive::<u8, u32>(&text)
    }

    #[quickcheck]
    fn quickcheck_matches_naive_small_alphabet(text: Vec<u8>) -> bool {
        // narrow alphabets force recursion depth.
        let text: Vec<u8> = text.into_iter().map(|c| c % 3).collect();
        make_suffix_array::<u8, u64>(&text).unwrap() == naive::<u8, u64>(&text)
    }

    #[quickcheck]
    fn quickcheck_periodic_texts(seed: Vec<u8>, reps: u8) -> bool {
        if seed.is_empty() {
            return true;
        }
        let reps = usize::from(reps % 24) + 2;
        let pattern: Vec<u8> = seed.into_iter().take(4).map(|c| c % 2).collect();
        let text: Vec<u8> = pattern
            .iter()
            .cycle()
            .take(pattern.len() * reps)
            .copied()
            .collect();
        make_suffix_array::<u8, u32>(&text).unwrap() == naive::<u8, u32>(&text)
    }
}
