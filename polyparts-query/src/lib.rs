//! Spatial query engines for the polygon-parts engine.
//!
//! Two read-only engines over a layer's partition set:
//!
//! - [`find`]: filtered, optionally clipped intersection queries with
//!   per-feature provenance bookkeeping
//! - [`aggregate`]: reduction of a (optionally filtered) partition set to
//!   one summary footprint plus scalar/array metadata
//!
//! Both share one matching rule ([`filter`]): genuine geometric
//! intersection plus the resolution bounds carried on each filter feature.
//! Both operate on a store snapshot and never mutate state.

mod aggregate;
mod error;
pub mod filter;
mod find;

pub use aggregate::{aggregate, AggregationResult};
pub use error::{QueryError, Result};
pub use find::{find, FoundProperties, RequestFeatureId};
