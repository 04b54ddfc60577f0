//! Error types for the partition store.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in partition store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The layer's backing collections do not exist.
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    /// The layer's backing collections already exist.
    #[error("Layer already exists: {0}")]
    LayerExists(String),

    /// Core record error wrapper.
    #[error("Core error: {0}")]
    Core(#[from] polyparts_core::CoreError),

    /// A transaction referenced a partition that is not in the collection.
    #[error("Unknown partition {partition} in layer '{layer}'")]
    UnknownPartition { layer: String, partition: uuid::Uuid },
}

impl StoreError {
    /// Create a layer-not-found error.
    pub fn layer_not_found(key: impl Into<String>) -> Self {
        Self::LayerNotFound(key.into())
    }

    /// Create a layer-exists error.
    pub fn layer_exists(key: impl Into<String>) -> Self {
        Self::LayerExists(key.into())
    }
}
