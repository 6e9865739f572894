//! Lexicographical renaming of sorted trigrams.
//!
//! Assigns dense zero-based integer names to a sorted trigram sequence
//! such that names are equal exactly when trigram contents are equal.
//! The name of the `k`-th input trigram is written at `posmap(k)` in
//! the destination, so the driver can lay mod-1 names into the front
//! half and mod-2 names into the back half of the string it recurses
//! on.

use crate::error::{Error, Result};
use crate::portions::{Adjustment, Portions, WorkerPool, DEFAULT_MIN_PORTION};
use crate::trigram::Trigram;
use crate::types::{AsIndex, SharedSlice, SkewIndex};

/// Whether the renamed string still contains duplicate names.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Recursion {
    Needed,
    Unneeded,
}

/// Rename `trigrams` into `dest` through `posmap`.
///
/// Builds a portion partition whose boundaries never split a run of
/// content-equal trigrams, then delegates to [`rename_with_portions`].
pub fn rename_lexicographically<T, P, M>(
    trigrams: &[T],
    dest: &mut [P],
    posmap: M,
    workers: &mut WorkerPool,
) -> Result<(Recursion, P)>
where
    T: Trigram<Pos = P> + Sync,
    P: SkewIndex,
    M: Fn(usize) -> usize + Sync,
{
    let portions = Portions::with_adjuster(
        trigrams.len(),
        workers.threads() as usize,
        DEFAULT_MIN_PORTION,
        |cut| {
            if trigrams[cut - 1].content_equal(&trigrams[cut]) {
                Adjustment::Needed
            } else {
                Adjustment::Unneeded
            }
        },
    );
    rename_with_portions(trigrams, dest, posmap, &portions, workers)
}

/// Rename `trigrams` into `dest` using a prepared partition.
///
/// The partition must cover the input and must not split runs of
/// content-equal trigrams (as produced by
/// [`rename_lexicographically`]). `posmap` must map `0..len` into
/// distinct destination slots. Fails with [`Error::OutOfRange`] when
/// the destination length differs from the input length.
///
/// Returns the recursion flag and the total number of distinct names;
/// the flag is `Unneeded` exactly when every trigram got a unique name.
pub fn rename_with_portions<T, P, M>(
    trigrams: &[T],
    dest: &mut [P],
    posmap: M,
    portions: &Portions,
    workers: &mut WorkerPool,
) -> Result<(Recursion, P)>
where
    T: Trigram<Pos = P> + Sync,
    P: SkewIndex,
    M: Fn(usize) -> usize + Sync,
{
    if dest.len() != trigrams.len() {
        return Err(Error::OutOfRange(
            "renaming destination does not match the input length",
        ));
    }
    if trigrams.is_empty() {
        return Ok((Recursion::Unneeded, P::ZERO));
    }

    let shared = SharedSlice::new(dest);

    // first pass: names local to each portion, starting from zero. The
    // boundary contract makes the first trigram of a portion differ
    // from the last of the previous one, so local name zero is exact.
    let distinct = portions.apply(workers, trigrams.len(), |_, range| {
        let mut name = P::ZERO;
        let mut prev = range.start;
        for k in range {
            if k > prev && !trigrams[prev].content_equal(&trigrams[k]) {
                name += P::ONE;
            }
            unsafe { shared.set(posmap(k), name) };
            prev = k;
        }
        name + P::ONE
    })?;

    // exclusive prefix over the per-portion distinct counts.
    let mut shifts = Vec::with_capacity(distinct.len());
    let mut total = P::ZERO;
    for &count in &distinct {
        shifts.push(total);
        total += count;
    }

    // second pass: lift each portion's names by the distinct count of
    // all earlier portions. Slots are disjoint because posmap is.
    portions.apply_dynargs(
        workers,
        trigrams.len(),
        |k| shifts[k],
        |_, range, shift| {
            if shift != P::ZERO {
                for k in range {
                    let slot = posmap(k);
                    unsafe { shared.set(slot, shared.get(slot) + shift) };
                }
            }
        },
    )?;

    let recursion = if total.as_index() == trigrams.len() {
        Recursion::Unneeded
    } else {
        Recursion::Needed
    };
    Ok((recursion, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portions::Portions;
    use crate::trigram::{ArrayTrigram, Trigram};

    fn trigrams_of(contents: &[&[u8; 3]]) -> Vec<ArrayTrigram<u8, u32>> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| ArrayTrigram::new(i as u32, c[0], c[1], c[2]))
            .collect()
    }

    fn rename_identity(
        trigrams: &[ArrayTrigram<u8, u32>],
        threads: u32,
    ) -> (Recursion, u32, Vec<u32>) {
        let mut workers = WorkerPool::new(threads);
        let mut dest = vec![0u32; trigrams.len()];
        let portions = Portions::with_adjuster(trigrams.len(), threads as usize, 1, |cut| {
            if trigrams[cut - 1].content_equal(&trigrams[cut]) {
                Adjustment::Needed
            } else {
                Adjustment::Unneeded
            }
        });
        let (recursion, total) =
            rename_with_portions(trigrams, &mut dest, |k| k, &portions, &mut workers).unwrap();
        (recursion, total, dest)
    }

    #[test]
    fn tablecheck_name_sequence() {
        let trigrams = trigrams_of(&[
            b"aec", b"aef", b"bhj", b"bhj", b"bhj", b"bhj", b"dkh", b"dnr", b"dnr", b"dnr",
            b"eca", b"eca", b"eca", b"eca", b"eca", b"kuw", b"kuw", b"lpp", b"lpy", b"qqq",
            b"qxz", b"rst", b"rsu", b"rua", b"rub", b"ruc",
        ]);
        let expected = vec![
            0u32, 1, 2, 2, 2, 2, 3, 4, 4, 4, 5, 5, 5, 5, 5, 6, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
        ];

        for threads in 1..=5 {
            let (recursion, total, names) = rename_identity(&trigrams, threads);
            assert_eq!(names, expected);
            assert_eq!(total, 16);
            assert_eq!(recursion, Recursion::Needed);
        }
    }

    #[test]
    fn unique_names_report_unneeded_recursion() {
        let trigrams = trigrams_of(&[b"abc", b"abd", b"abe", b"xyz"]);
        let (recursion, total, names) = rename_identity(&trigrams, 2);
        assert_eq!(names, vec![0, 1, 2, 3]);
        assert_eq!(total, 4);
        assert_eq!(recursion, Recursion::Unneeded);
    }

    #[test]
    fn empty_input_is_unneeded() {
        let trigrams: Vec<ArrayTrigram<u8, u32>> = Vec::new();
        let mut workers = WorkerPool::new(2);
        let mut dest: Vec<u32> = Vec::new();
        let (recursion, total) =
            rename_lexicographically(&trigrams, &mut dest, |k| k, &mut workers).unwrap();
        assert_eq!(recursion, Recursion::Unneeded);
        assert_eq!(total, 0);
    }

    #[test]
    fn mismatched_destination_is_rejected() {
        let trigrams = trigrams_of(&[b"abc", b"abd"]);
        let mut workers = WorkerPool::new(2);
        let mut dest = vec![0u32; 3];
        assert!(matches!(
            rename_lexicographically(&trigrams, &mut dest, |k| k, &mut workers),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn posmap_scatters_names() {
        // write names back-to-front.
        let trigrams = trigrams_of(&[b"aaa", b"aaa", b"bbb"]);
        let mut workers = WorkerPool::new(2);
        let mut dest = vec![0u32; 3];
        let last = trigrams.len() - 1;
        let (recursion, total) =
            rename_lexicographically(&trigrams, &mut dest, |k| last - k, &mut workers).unwrap();
        assert_eq!(dest, vec![1, 0, 0]);
        assert_eq!(total, 2);
        assert_eq!(recursion, Recursion::Needed);
    }

    #[quickcheck]
    fn quickcheck_names_match_content_classes(seed: Vec<u8>, threads: u8) -> bool {
        // build a sorted trigram sequence with runs from the seed.
        let mut contents: Vec<[u8; 3]> = seed
            .iter()
            .map(|&b| [b % 7, (b / 7) % 7, (b / 49) % 7])
            .collect();
        contents.sort();
        let trigrams: Vec<ArrayTrigram<u8, u32>> = contents
            .iter()
            .enumerate()
            .map(|(i, c)| ArrayTrigram::new(i as u32, c[0], c[1], c[2]))
            .collect();

        let threads = u32::from(threads % 6) + 1;
        let (_, total, names) = rename_identity(&trigrams, threads);

        // equal names exactly for equal contents, zero-based and dense.
        let mut expected = Vec::with_capacity(trigrams.len());
        let mut name = 0u32;
        for (i, t) in trigrams.iter().enumerate() {
            if i > 0 && !t.content_equal(&trigrams[i - 1]) {
                name += 1;
            }
            expected.push(name);
        }
        let distinct = expected.last().map(|&n| n + 1).unwrap_or(0);
        names == expected && total == distinct
    }
}
