//! Error types for operations on an open session.

use crate::archive::error::LoadError;

/// Errors local to a single call. The session stays usable after any of
/// these except `AlreadyClosed`, which reports misuse of a closed session.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SpellerError {
    /// A word argument exceeds the accepted encoded length
    #[error("Word '{name}' is {len} bytes, greater than max acceptable length ({max})")]
    InvalidWord {
        name: &'static str,
        len: usize,
        max: usize,
    },

    /// A word argument that must not be empty was empty
    #[error("Word '{0}' must not be empty")]
    EmptyWord(&'static str),

    /// The session has been closed
    #[error("This session has already been closed")]
    AlreadyClosed,

    /// The runtime dictionary is full; nothing was added
    #[error("No available slot in the runtime dictionary (capacity {capacity})")]
    NoAvailableSlot { capacity: usize },

    /// An extra dictionary passed to `add_dic` could not be loaded
    #[error("Failed to load dictionary")]
    Load(#[from] LoadError),
}
