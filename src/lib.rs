//! Parallel suffix array construction.
//!
//! Implements the Kärkkäinen-Sanders skew (DC3) algorithm: the
//! 2,3-trigrams of the text are sorted by a parallel three-pass radix
//! sort, renamed lexicographically, and the construction recurses on
//! the renamed string through an explicit work-pile until all names
//! are unique; the mod-0 suffixes are then sorted and merged in.
//!
//! ```
//! let sa: Vec<u32> = parskew::make_suffix_array(&b"aecabfgc"[..]).unwrap();
//! assert_eq!(sa, vec![3, 0, 4, 7, 2, 1, 5, 6]);
//! ```

#[cfg(test)]
#[macro_use]
extern crate quickcheck_macros;

#[macro_use]
extern crate cfg_if;
#[macro_use]
extern crate log;

pub mod alphabet;
pub mod clock;
pub mod error;
pub mod large_array;
pub mod pool;
pub mod portions;
pub mod rename;
pub mod skew;
pub mod sort;
pub mod trigram;
pub mod types;

pub use crate::error::{Error, Result};
pub use crate::skew::{make_suffix_array, make_suffix_array_threaded};
