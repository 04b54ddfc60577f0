//! Core data model for the polygon-parts engine.
//!
//! This crate defines the records every other component operates over:
//!
//! - [`part`]: raw footprint submissions ([`RawPart`]) and the resolved
//!   non-overlapping coverage pieces ([`Partition`])
//! - [`layer`]: layer identity and the naming policy mapping a layer to its
//!   two physical collections
//! - [`feature`]: the typed GeoJSON model used at the query boundary
//! - [`geometry`]: footprint validation and the planar geometry helpers
//!   shared by the resolver and the query engines
//! - [`config`]: resolver and aggregation configuration
//! - [`error`]: error types
//!
//! Footprints are planar EPSG:4326 polygons throughout; no reprojection
//! happens anywhere in the engine.

pub mod config;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod layer;
pub mod part;

pub use config::{AggregationConfig, ResolverConfig};
pub use error::{CoreError, Result};
pub use feature::{Feature, FeatureCollection, FilterProperties, Geometry};
pub use layer::{LayerId, LayerName, LayerNamingPolicy};
pub use part::{PartMetadata, Partition, RawPart, RawPartInput};
