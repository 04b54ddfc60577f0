//! Error types for the core data model.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing or validating core records.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Footprint geometry failed validation.
    #[error("Invalid footprint: {0}")]
    InvalidFootprint(String),

    /// Metadata attribute failed validation.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Layer identifier does not match the expected naming pattern.
    #[error("Invalid layer identifier: {0}")]
    InvalidLayerId(String),

    /// GeoJSON payload could not be interpreted as the expected geometry.
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),
}

impl CoreError {
    /// Create an invalid footprint error.
    pub fn invalid_footprint(msg: impl Into<String>) -> Self {
        Self::InvalidFootprint(msg.into())
    }

    /// Create an invalid metadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create an invalid layer identifier error.
    pub fn invalid_layer_id(msg: impl Into<String>) -> Self {
        Self::InvalidLayerId(msg.into())
    }
}
