//! Overlap resolver for the polygon-parts engine.
//!
//! Consumes newly-arrived raw parts and the current partition set, producing
//! the updated partition set with last-write-wins semantics: a more recently
//! inserted raw part always claims contested area from anything inserted
//! before it, whether the older side is an already-resolved partition or an
//! earlier member of the same batch.
//!
//! Resolution is planned as a pure function over a store snapshot and
//! committed through the store's staged transaction, so every failure mode
//! (including deadline expiry) aborts with no partial state.

mod deadline;
mod error;
mod resolver;

pub use deadline::Deadline;
pub use error::{ResolverError, Result};
pub use resolver::{plan, resolve, ResolveStats};
