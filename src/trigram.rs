//! Trigram representations and 2,3-extraction.
//!
//! A trigram names three consecutive symbols together with the position
//! of the first. Several physical layouts exist; [`ArrayTrigram`] is
//! the canonical in-memory variant for the sorting passes,
//! [`RefTrigram`] is a zero-copy view into the text whose position is
//! derived rather than stored, and [`S1Trigram`] carries the
//! `(position, symbol, following rank)` records of the S1 pass.

use crate::types::{SkewChar, SkewIndex, Text, Uint};

/// Physical trigram layouts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrigramKind {
    Tuple,
    ArrayTuple,
    Structure,
    Pointer,
}

impl TrigramKind {
    pub fn name(self) -> &'static str {
        match self {
            TrigramKind::Tuple => "tuple",
            TrigramKind::ArrayTuple => "arraytuple",
            TrigramKind::Structure => "structure",
            TrigramKind::Pointer => "pointer",
        }
    }
}

/// Capability set shared by the stored trigram layouts.
pub trait Trigram {
    type Char: SkewChar;
    type Pos: SkewIndex;

    const KIND: TrigramKind;

    fn pos(&self) -> Self::Pos;
    fn ch1(&self) -> Self::Char;
    fn ch2(&self) -> Self::Char;
    fn ch3(&self) -> Self::Char;

    /// Equality of the three symbols, ignoring the position.
    #[inline(always)]
    fn content_equal(&self, other: &Self) -> bool {
        self.ch1() == other.ch1() && self.ch2() == other.ch2() && self.ch3() == other.ch3()
    }
}

/// Trigram stored as one flat tuple.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TupleTrigram<C, P>(pub P, pub C, pub C, pub C);

impl<C: SkewChar, P: SkewIndex> Trigram for TupleTrigram<C, P> {
    type Char = C;
    type Pos = P;

    const KIND: TrigramKind = TrigramKind::Tuple;

    #[inline(always)]
    fn pos(&self) -> P {
        self.0
    }

    #[inline(always)]
    fn ch1(&self) -> C {
        self.1
    }

    #[inline(always)]
    fn ch2(&self) -> C {
        self.2
    }

    #[inline(always)]
    fn ch3(&self) -> C {
        self.3
    }
}

/// Trigram stored as a position and a symbol array.
///
/// This is the canonical variant used by extraction and sorting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ArrayTrigram<C, P> {
    pos: P,
    chars: [C; 3],
}

impl<C: SkewChar, P: SkewIndex> ArrayTrigram<C, P> {
    #[inline(always)]
    pub fn new(pos: P, c1: C, c2: C, c3: C) -> Self {
        ArrayTrigram {
            pos,
            chars: [c1, c2, c3],
        }
    }

    #[inline(always)]
    pub fn chars(&self) -> &[C; 3] {
        &self.chars
    }
}

impl<C: SkewChar, P: SkewIndex> Trigram for ArrayTrigram<C, P> {
    type Char = C;
    type Pos = P;

    const KIND: TrigramKind = TrigramKind::ArrayTuple;

    #[inline(always)]
    fn pos(&self) -> P {
        self.pos
    }

    #[inline(always)]
    fn ch1(&self) -> C {
        self.chars[0]
    }

    #[inline(always)]
    fn ch2(&self) -> C {
        self.chars[1]
    }

    #[inline(always)]
    fn ch3(&self) -> C {
        self.chars[2]
    }

    #[inline(always)]
    fn content_equal(&self, other: &Self) -> bool {
        self.chars == other.chars
    }
}

impl<C: SkewChar, P: SkewIndex> From<TupleTrigram<C, P>> for ArrayTrigram<C, P> {
    fn from(t: TupleTrigram<C, P>) -> Self {
        ArrayTrigram::new(t.0, t.1, t.2, t.3)
    }
}

impl<C: SkewChar, P: SkewIndex> From<ArrayTrigram<C, P>> for TupleTrigram<C, P> {
    fn from(t: ArrayTrigram<C, P>) -> Self {
        TupleTrigram(t.pos, t.chars[0], t.chars[1], t.chars[2])
    }
}

/// Borrowed trigram view into a text window.
///
/// The position is not an attribute; it is recovered from the distance
/// to the base of the text the view was cut from.
#[derive(Copy, Clone, Debug)]
pub struct RefTrigram<'a, C> {
    window: &'a [C],
}

impl<'a, C: SkewChar> RefTrigram<'a, C> {
    pub const KIND: TrigramKind = TrigramKind::Pointer;

    /// View of the first three symbols of `window`.
    #[inline(always)]
    pub fn new(window: &'a [C]) -> Self {
        debug_assert!(window.len() >= 3);
        RefTrigram { window }
    }

    #[inline(always)]
    pub fn ch1(&self) -> C {
        self.window[0]
    }

    #[inline(always)]
    pub fn ch2(&self) -> C {
        self.window[1]
    }

    #[inline(always)]
    pub fn ch3(&self) -> C {
        self.window[2]
    }

    #[inline(always)]
    pub fn content_equal(&self, other: &Self) -> bool {
        self.window[..3] == other.window[..3]
    }

    /// Derive the position of this view relative to `text`.
    #[inline]
    pub fn pos_in(&self, text: &[C]) -> usize {
        let base = text.as_ptr() as usize;
        let here = self.window.as_ptr() as usize;
        debug_assert!(here >= base);
        (here - base) / std::mem::size_of::<C>()
    }

    /// Zero-copy equivalent of [`extract_23trigrams`].
    pub fn extract_23(text: &'a [C]) -> Vec<RefTrigram<'a, C>> {
        let n = text.len();
        let mut result = Vec::with_capacity(count_23trigrams(n));
        let mut p = 1;
        while p + 2 < n {
            if p % 3 != 0 {
                result.push(RefTrigram::new(&text[p..]));
            }
            p += 1;
        }
        result
    }
}

/// S1 record: position, first symbol, and the rank of the S23 suffix
/// that follows it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct S1Trigram<C, P> {
    pub pos: P,
    pub ch: C,
    pub renamed_s1: P,
}

impl<C, P> S1Trigram<C, P> {
    pub const KIND: TrigramKind = TrigramKind::Structure;

    #[inline(always)]
    pub fn new(pos: P, ch: C, renamed_s1: P) -> Self {
        S1Trigram {
            pos,
            ch,
            renamed_s1,
        }
    }
}

/// Number of complete trigrams at positions not divisible by three.
pub fn count_23trigrams(n: usize) -> usize {
    let mod1 = if n >= 4 { (n - 4) / 3 + 1 } else { 0 };
    let mod2 = if n >= 5 { (n - 5) / 3 + 1 } else { 0 };
    mod1 + mod2
}

/// Extract the 2,3-trigrams of `text` in position order.
///
/// A trigram is emitted for every position `p` with `p % 3 != 0` and
/// `p + 2 < n`; trailing positions without three symbols left are
/// skipped.
pub fn extract_23trigrams<P, T>(text: &T) -> Vec<ArrayTrigram<T::Sym, P>>
where
    P: SkewIndex,
    T: Text + ?Sized,
{
    let n = text.len();
    let mut result = Vec::with_capacity(count_23trigrams(n));
    let mut c1 = T::Sym::ZERO;
    let mut c2 = T::Sym::ZERO;
    let mut i = 0;
    text.for_each_sym(|c3| {
        if i >= 2 {
            let p = i - 2;
            if p % 3 != 0 {
                result.push(ArrayTrigram::new(P::from_index(p), c1, c2, c3));
            }
        }
        c1 = c2;
        c2 = c3;
        i += 1;
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AsIndex;

    #[test]
    fn kind_names() {
        assert_eq!(TrigramKind::Tuple.name(), "tuple");
        assert_eq!(TrigramKind::ArrayTuple.name(), "arraytuple");
        assert_eq!(TrigramKind::Structure.name(), "structure");
        assert_eq!(TrigramKind::Pointer.name(), "pointer");
        assert_eq!(ArrayTrigram::<u8, u32>::KIND, TrigramKind::ArrayTuple);
        assert_eq!(S1Trigram::<u8, u32>::KIND, TrigramKind::Structure);
    }

    #[test]
    fn tablecheck_extract_23trigrams() {
        // one trigram per position p with p % 3 != 0 and p + 2 < n.
        let trigrams = extract_23trigrams::<u32, _>(b"abcdefgh".as_ref());
        let expected = vec![
            ArrayTrigram::new(1u32, b'b', b'c', b'd'),
            ArrayTrigram::new(2, b'c', b'd', b'e'),
            ArrayTrigram::new(4, b'e', b'f', b'g'),
            ArrayTrigram::new(5, b'f', b'g', b'h'),
        ];
        assert_eq!(trigrams, expected);

        for n in 0..4 {
            assert!(extract_23trigrams::<u32, _>(&b"abcdefgh"[..n]).is_empty());
        }
        assert_eq!(
            extract_23trigrams::<u32, _>(&b"abcd"[..]),
            vec![ArrayTrigram::new(1u32, b'b', b'c', b'd')]
        );
    }

    #[test]
    fn extraction_variants_agree() {
        let text = b"ruxxysaxaaabdyduuuu";
        let stored = extract_23trigrams::<u16, _>(text.as_ref());
        let views = RefTrigram::extract_23(text.as_ref());

        assert_eq!(stored.len(), views.len());
        for (s, v) in stored.iter().zip(views.iter()) {
            assert_eq!(s.pos().as_index(), v.pos_in(text));
            assert_eq!((s.ch1(), s.ch2(), s.ch3()), (v.ch1(), v.ch2(), v.ch3()));
        }
    }

    #[test]
    fn tuple_and_array_layouts_are_isomorphic() {
        let a = ArrayTrigram::<u8, u32>::new(7, b'x', b'y', b'z');
        let t = TupleTrigram::from(a);
        assert_eq!(t, TupleTrigram(7, b'x', b'y', b'z'));
        assert_eq!(ArrayTrigram::from(t), a);
        assert!(a.content_equal(&ArrayTrigram::new(9, b'x', b'y', b'z')));
        assert!(t.content_equal(&TupleTrigram(9, b'x', b'y', b'z')));
        assert!(!t.content_equal(&TupleTrigram(7, b'x', b'y', b'w')));
    }

    #[quickcheck]
    fn quickcheck_extraction_count(text: Vec<u8>) -> bool {
        let trigrams = extract_23trigrams::<u64, _>(&text[..]);
        let expected = (0..text.len())
            .filter(|&p| p % 3 != 0 && p + 2 < text.len())
            .count();
        trigrams.len() == expected && trigrams.len() == count_23trigrams(text.len())
    }

    #[quickcheck]
    fn quickcheck_extraction_matches_text(text: Vec<u8>) -> bool {
        extract_23trigrams::<u64, _>(&text[..]).into_iter().all(|t| {
            let p = t.pos().as_index();
            p % 3 != 0
                && t.ch1() == text[p]
                && t.ch2() == text[p + 1]
                && t.ch3() == text[p + 2]
        })
    }
}
