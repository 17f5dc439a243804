//! Recoverable failures of `ChainedHashMap`.
//!
//! Missing keys are not errors; lookups and removals report them as `None`.

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A capacity, growth factor or load factor outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// `capacity * factor` does not fit in `usize`.
    #[error("capacity overflow: cannot grow {capacity} buckets by a factor of {factor}")]
    CapacityOverflow { capacity: usize, factor: usize },

    /// The root-slot array could not be reserved. The map is left as it was.
    #[error("failed to allocate {buckets} buckets")]
    AllocationFailed {
        buckets: usize,
        #[source]
        source: TryReserveError,
    },
}
