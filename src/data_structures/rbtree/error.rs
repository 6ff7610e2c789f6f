//! Error types for tree mutations.

use thiserror::Error;

/// Result type for tree mutations.
pub type RbTreeResult<T> = Result<T, RbTreeError>;

/// Errors returned by [`RbTree`](super::RbTree) mutations.
///
/// Both variants leave the tree exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RbTreeError {
    /// `delete_node` was asked for a key the tree does not hold.
    #[error("key not found in the tree")]
    KeyNotFound,

    /// `insert` saw an equal key while duplicates are rejected.
    #[error("duplicate key rejected")]
    DuplicateKey,
}
