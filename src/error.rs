//! Error type shared by every fallible table operation.

/// Errors that can occur when creating or growing a [`ProbeMap`](crate::ProbeMap).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Capacity was zero or not a power of two
    InvalidCapacity(usize),

    /// The slot array (or rehash scratch space) of the given length could
    /// not be allocated
    AllocationFailure {
        /// Number of elements that were requested
        capacity: usize,
    },

    /// Growing cannot make room: doubling would pass the 32-bit hash range
    /// (or overflow `usize`), or the key's full hash is already shared by
    /// `MAX_PROBE` stored keys
    CapacityOverflow,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCapacity(n) => {
                write!(f, "capacity {n} is not a non-zero power of two")
            }
            Self::AllocationFailure { capacity } => {
                write!(f, "failed to allocate {capacity} slots")
            }
            Self::CapacityOverflow => f.write_str("table capacity overflowed: growing cannot make room"),
        }
    }
}

impl std::error::Error for Error {}

/// Table result
pub type Result<T> = std::result::Result<T, Error>;
