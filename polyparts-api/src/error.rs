//! Error taxonomy exposed to callers.

use polyparts_core::CoreError;
use polyparts_query::QueryError;
use polyparts_resolver::ResolverError;
use polyparts_store::StoreError;
use thiserror::Error;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Caller-visible errors.
///
/// Internal failures carry the underlying message; an error from an update
/// path always means the whole batch was aborted with no partial state.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The layer's backing collections do not exist.
    #[error("No such layer: {0}")]
    NotFound(String),

    /// The layer already exists (create only).
    #[error("Layer already exists: {0}")]
    Conflict(String),

    /// An aggregation selected no partitions.
    #[error("No partitions matched: {0}")]
    NoData(String),

    /// Malformed input caught at the boundary.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A geometry operation was rejected by the kernel.
    #[error("Geometry operation failed: {0}")]
    Geometry(String),

    /// A resolver transaction was aborted.
    #[error("Transaction aborted: {0}")]
    Transaction(String),

    /// Any other internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LayerNotFound(key) => ApiError::NotFound(key),
            StoreError::LayerExists(key) => ApiError::Conflict(key),
            StoreError::Core(core) => core.into(),
            other @ StoreError::UnknownPartition { .. } => {
                ApiError::Transaction(other.to_string())
            }
        }
    }
}

impl From<ResolverError> for ApiError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::Store(store) => store.into(),
            other @ ResolverError::DeadlineExceeded { .. } => {
                ApiError::Transaction(other.to_string())
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NoData => {
                ApiError::NoData("aggregation filter matched no partitions".to_string())
            }
            QueryError::Geometry(msg) => ApiError::Geometry(msg),
            QueryError::Core(core) => core.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidFootprint(msg)
            | CoreError::InvalidMetadata(msg)
            | CoreError::InvalidLayerId(msg) => ApiError::Validation(msg),
            CoreError::UnsupportedGeometry(msg) => ApiError::Geometry(msg),
        }
    }
}
