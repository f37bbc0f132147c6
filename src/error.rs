//! Error kinds surfaced by the containers and the algorithm library.

use thiserror::Error;

/// Every fallible container operation reports exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// Two containers were combined whose contracts describe different element types.
    #[error("type mismatch: `{left}` vs `{right}`")]
    TypeMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// An index outside `[0, len)` (or `[0, len]` for insertion).
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The contract's allocator could not provide the requested region.
    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },

    /// A vector was used after it was moved out of or destroyed.
    #[error("container used after it was invalidated")]
    UseAfterInvalidate,
}

pub type Result<T> = core::result::Result<T, ContainerError>;
