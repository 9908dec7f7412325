//! Error type shared by all fallible map operations.

use std::collections::TryReserveError;
use std::fmt;

/// Errors reported by `BucketMap`.
///
/// A missing key is never an error: lookups return `Option` and removals
/// return `bool`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    /// Allocating a bucket array or bucket slot failed. The map is left
    /// exactly as it was before the call.
    Alloc(TryReserveError),
    /// The next capacity does not fit in `usize`.
    CapacityOverflow,
    /// The cursor was taken before a structural modification of the map.
    StaleCursor,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Alloc(e) => write!(f, "bucket allocation failed: {e}"),
            MapError::CapacityOverflow => f.write_str("bucket capacity overflow"),
            MapError::StaleCursor => f.write_str("cursor used after the map was modified"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TryReserveError> for MapError {
    fn from(e: TryReserveError) -> Self {
        MapError::Alloc(e)
    }
}
