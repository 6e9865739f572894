//! Alphabets and the frequency tables driving bucket sort.
//!
//! Two alphabet shapes exist: [`SparseAlphabet`] keeps an ordered map
//! from symbol to frequency and suits the caller's original character
//! set, [`ZeroRangeAlphabet`] keeps a dense array over `[0, size)` and
//! suits the compact integer alphabets of the recursive levels.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::mem;

use rayon::prelude::*;

use crate::types::{AsIndex, SkewChar, SkewIndex};

/// Dense table size from which pointwise addition runs on rayon.
const PARALLEL_ADD_THRESHOLD: usize = 1 << 16;

/// Frequency table of one alphabet shape.
///
/// The same table value serves as a counting table, as a cumulative
/// table after [`make_cumulative`], and as a bucket write cursor during
/// scatter via [`next_index`].
///
/// [`make_cumulative`]: BucketTable::make_cumulative
/// [`next_index`]: BucketTable::next_index
pub trait BucketTable<C: SkewChar, P: SkewIndex>: Send {
    /// Count one occurrence of `c`.
    fn tally(&mut self, c: C);

    /// Pointwise addition of another table of the same alphabet.
    fn add_assign(&mut self, other: &Self);

    /// In-place exclusive prefix sum in alphabet order.
    ///
    /// Afterwards each entry holds the sum of the frequencies of all
    /// strictly preceding symbols, which is the initial write index of
    /// that symbol's bucket; the grand total is returned.
    fn make_cumulative(&mut self) -> P;

    /// Current write index of the bucket of `c`, post-incremented.
    fn next_index(&mut self, c: C) -> usize;
}

/// Alphabet shape selector for the sorting passes.
pub trait Alphabet<C: SkewChar, P: SkewIndex>: Sync {
    type Table: BucketTable<C, P>;

    fn empty_table(&self) -> Self::Table;
}

/// Count `extractor(item)` over `items` into a fresh table.
pub fn make_freq_table<C, P, A, T, E>(alphabet: &A, items: &[T], extractor: E) -> A::Table
where
    C: SkewChar,
    P: SkewIndex,
    A: Alphabet<C, P>,
    E: Fn(&T) -> C,
{
    let mut table = alphabet.empty_table();
    for item in items {
        table.tally(extractor(item));
    }
    table
}

/// Alphabet of arbitrary symbols, ordered by symbol value.
pub struct SparseAlphabet<C, P> {
    _marker: PhantomData<(C, P)>,
}

impl<C, P> SparseAlphabet<C, P> {
    pub fn new() -> Self {
        SparseAlphabet {
            _marker: PhantomData,
        }
    }
}

impl<C, P> Default for SparseAlphabet<C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SkewChar, P: SkewIndex> Alphabet<C, P> for SparseAlphabet<C, P> {
    type Table = SparseTable<C, P>;

    fn empty_table(&self) -> SparseTable<C, P> {
        SparseTable(BTreeMap::new())
    }
}

/// Ordered-map frequency table.
pub struct SparseTable<C: SkewChar, P: SkewIndex>(BTreeMap<C, P>);

impl<C: SkewChar, P: SkewIndex> SparseTable<C, P> {
    /// Frequency recorded for `c`.
    pub fn freq(&self, c: C) -> P {
        self.0.get(&c).copied().unwrap_or(P::ZERO)
    }

    /// Number of distinct symbols seen.
    pub fn symbols(&self) -> usize {
        self.0.len()
    }
}

impl<C: SkewChar, P: SkewIndex> BucketTable<C, P> for SparseTable<C, P> {
    #[inline]
    fn tally(&mut self, c: C) {
        *self.0.entry(c).or_insert(P::ZERO) += P::ONE;
    }

    fn add_assign(&mut self, other: &Self) {
        for (&c, &freq) in other.0.iter() {
            *self.0.entry(c).or_insert(P::ZERO) += freq;
        }
    }

    fn make_cumulative(&mut self) -> P {
        let mut total = P::ZERO;
        for freq in self.0.values_mut() {
            mem::swap(&mut total, freq);
            total += *freq;
        }
        total
    }

    #[inline]
    fn next_index(&mut self, c: C) -> usize {
        let slot = self.0.entry(c).or_insert(P::ZERO);
        let index = slot.as_index();
        *slot += P::ONE;
        index
    }
}

/// Dense integer alphabet `[0, size)`.
pub struct ZeroRangeAlphabet<C, P> {
    size: usize,
    _marker: PhantomData<(C, P)>,
}

impl<C: SkewChar, P> ZeroRangeAlphabet<C, P> {
    pub fn new(size: usize) -> Self {
        ZeroRangeAlphabet {
            size,
            _marker: PhantomData,
        }
    }

    /// Alphabet covering `[0, highest]`.
    pub fn fitting(highest: C) -> Self {
        Self::new(highest.as_index() + 1)
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl<C: SkewChar, P: SkewIndex> Alphabet<C, P> for ZeroRangeAlphabet<C, P> {
    type Table = ZeroRangeTable<C, P>;

    fn empty_table(&self) -> ZeroRangeTable<C, P> {
        ZeroRangeTable {
            freqs: vec![P::ZERO; self.size],
            _marker: PhantomData,
        }
    }
}

/// Dense frequency table indexed by symbol.
pub struct ZeroRangeTable<C: SkewChar, P: SkewIndex> {
    freqs: Vec<P>,
    _marker: PhantomData<C>,
}

impl<C: SkewChar, P: SkewIndex> ZeroRangeTable<C, P> {
    pub fn freq(&self, c: C) -> P {
        self.freqs[c.as_index()]
    }
}

impl<C: SkewChar, P: SkewIndex> BucketTable<C, P> for ZeroRangeTable<C, P> {
    #[inline(always)]
    fn tally(&mut self, c: C) {
        self.freqs[c.as_index()] += P::ONE;
    }

    fn add_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.freqs.len(), other.freqs.len());
        if self.freqs.len() >= PARALLEL_ADD_THRESHOLD {
            self.freqs
                .par_chunks_mut(PARALLEL_ADD_THRESHOLD / 4)
                .zip(other.freqs.par_chunks(PARALLEL_ADD_THRESHOLD / 4))
                .for_each(|(dst, src)| {
                    dst.iter_mut().zip(src.iter()).for_each(|(d, &s)| *d += s);
                });
        } else {
            self.freqs
                .iter_mut()
                .zip(other.freqs.iter())
                .for_each(|(d, &s)| *d += s);
        }
    }

    fn make_cumulative(&mut self) -> P {
        let mut total = P::ZERO;
        for freq in self.freqs.iter_mut() {
            mem::swap(&mut total, freq);
            total += *freq;
        }
        total
    }

    #[inline(always)]
    fn next_index(&mut self, c: C) -> usize {
        let slot = &mut self.freqs[c.as_index()];
        let index = slot.as_index();
        *slot += P::ONE;
        index
    }
}
