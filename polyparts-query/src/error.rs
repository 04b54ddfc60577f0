//! Error types for the query engines.

use thiserror::Error;

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors raised by find and aggregation.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The selected partition subset is empty; there is nothing to
    /// aggregate.
    #[error("No partitions matched the aggregation filter")]
    NoData,

    /// A geometry operation produced an unusable result.
    #[error("Geometry operation failed: {0}")]
    Geometry(String),

    /// Core record error wrapper.
    #[error("Core error: {0}")]
    Core(#[from] polyparts_core::CoreError),
}
