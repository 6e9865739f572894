use std::error;
use std::fmt;

/// Errors surfaced by suffix array construction.
///
/// All failures are terminal for the operation that raised them; no
/// partially constructed state escapes to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// An index or size argument is inconsistent with the data it
    /// addresses (position type too narrow, destination of the wrong
    /// size, access past the end of an array).
    OutOfRange(&'static str),
    /// A block allocation failed.
    Capacity(&'static str),
    /// A portion partition was applied to a range whose length differs
    /// from the range it was computed for.
    PortionMismatch { expected: usize, actual: usize },
    /// A memory pool was configured for a different element size than
    /// the array placed on top of it.
    Misconfiguration(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRange(what) => write!(f, "out of range: {}", what),
            Error::Capacity(what) => write!(f, "allocation failure: {}", what),
            Error::PortionMismatch { expected, actual } => write!(
                f,
                "portions cover {} items but were applied to a range of {}",
                expected, actual
            ),
            Error::Misconfiguration(what) => write!(f, "misconfiguration: {}", what),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_contains_detail() {
        let err = Error::PortionMismatch {
            expected: 8,
            actual: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains('8') && msg.contains('9'));

        let err = Error::OutOfRange("probe");
        assert!(err.to_string().contains("probe"));
    }
}
