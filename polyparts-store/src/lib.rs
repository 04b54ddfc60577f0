//! Partition store for the polygon-parts engine.
//!
//! Holds, per logical layer, the ordered raw-parts log and the current
//! non-overlapping partition set, with an R-tree over partition envelopes
//! for the resolver's spatial join.
//!
//! # Types
//!
//! - [`PartitionStore`] - layer lifecycle, snapshot reads, staged writes
//! - [`LayerTxn`] - one staged write transaction (commit-or-rollback)
//! - [`LayerCollection`] - both record collections of one layer
//! - [`ResolutionTx`] - atomic outcome of one resolver run
//!
//! # Example
//!
//! ```ignore
//! let store = PartitionStore::new(LayerNamingPolicy::default());
//! store.create_layer(&layer)?;
//!
//! let mut txn = store.begin(&layer).await?;
//! txn.append(raw_part_input)?;
//! // ... resolver stages a ResolutionTx via txn.apply(..) ...
//! txn.commit();
//! ```

mod collection;
mod error;
mod store;

pub use collection::{envelope_of, LayerCollection, PartitionEnvelope, ResolutionTx};
pub use error::{Result, StoreError};
pub use store::{LayerTxn, PartitionStore};
