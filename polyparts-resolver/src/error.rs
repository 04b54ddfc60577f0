//! Error types for the overlap resolver.

use thiserror::Error;

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Errors that can abort a resolver run.
///
/// Any error aborts the whole batch: the staged transaction is discarded and
/// the layer keeps its previous state.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The caller-supplied deadline expired mid-run.
    #[error("Resolver deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u128 },

    /// Store error wrapper.
    #[error("Store error: {0}")]
    Store(#[from] polyparts_store::StoreError),
}
