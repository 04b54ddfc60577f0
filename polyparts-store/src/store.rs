//! The partition store: layer lifecycle, snapshot reads, staged writes.
//!
//! # Concurrency
//!
//! Reads (`snapshot`) clone an `Arc` of the layer state under a brief read
//! lock and run lock-free afterwards. All mutation goes through a
//! [`LayerTxn`]: `begin` acquires the layer's write mutex (serializing
//! resolver runs per layer, in arrival order), the transaction stages every
//! change on a private clone of the state, and `commit` swaps the clone in
//! as the new state in one step. Dropping a transaction without committing
//! rolls back by construction — readers never observe partial state.

use crate::collection::{LayerCollection, ResolutionTx};
use crate::error::{Result, StoreError};
use parking_lot::RwLock;
use polyparts_core::{LayerId, LayerName, LayerNamingPolicy, RawPart, RawPartInput};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

struct LayerEntry {
    write_lock: Arc<Mutex<()>>,
    state: RwLock<Arc<LayerCollection>>,
}

impl LayerEntry {
    fn new(name: LayerName) -> Self {
        Self {
            write_lock: Arc::new(Mutex::new(())),
            state: RwLock::new(Arc::new(LayerCollection::new(name))),
        }
    }
}

/// In-memory partition store holding every layer's two collections.
pub struct PartitionStore {
    naming: LayerNamingPolicy,
    layers: RwLock<HashMap<String, Arc<LayerEntry>>>,
}

impl PartitionStore {
    /// Create a store with the given naming policy.
    pub fn new(naming: LayerNamingPolicy) -> Self {
        Self {
            naming,
            layers: RwLock::new(HashMap::new()),
        }
    }

    /// The store's naming policy.
    pub fn naming(&self) -> &LayerNamingPolicy {
        &self.naming
    }

    /// Resolve a layer identifier to its physical collection names.
    pub fn resolve_name(&self, layer: &LayerId) -> LayerName {
        self.naming.resolve(layer)
    }

    /// Create the two backing collections for a layer.
    pub fn create_layer(&self, layer: &LayerId) -> Result<LayerName> {
        let name = self.resolve_name(layer);
        let key = name.key().to_string();
        let mut layers = self.layers.write();
        if layers.contains_key(&key) {
            return Err(StoreError::layer_exists(key));
        }
        layers.insert(key.clone(), Arc::new(LayerEntry::new(name.clone())));
        tracing::info!(layer = %key, "created layer collections");
        Ok(name)
    }

    /// Whether the layer's backing collections exist.
    pub fn layer_exists(&self, layer: &LayerId) -> bool {
        let name = self.resolve_name(layer);
        self.layers.read().contains_key(name.key())
    }

    /// Drop a layer and both its collections.
    pub fn drop_layer(&self, layer: &LayerId) -> Result<()> {
        let name = self.resolve_name(layer);
        let removed = self.layers.write().remove(name.key());
        match removed {
            Some(_) => {
                tracing::info!(layer = %name.key(), "dropped layer collections");
                Ok(())
            }
            None => Err(StoreError::layer_not_found(name.key())),
        }
    }

    /// Lock-free read snapshot of a layer's collections.
    pub fn snapshot(&self, layer: &LayerId) -> Result<Arc<LayerCollection>> {
        let entry = self.entry(layer)?;
        let snapshot = entry.state.read().clone();
        Ok(snapshot)
    }

    /// Begin a write transaction against a layer.
    ///
    /// Waits for any in-flight transaction on the same layer; transactions
    /// are granted in arrival order.
    pub async fn begin(&self, layer: &LayerId) -> Result<LayerTxn> {
        let entry = self.entry(layer)?;
        let guard = entry.write_lock.clone().lock_owned().await;
        let working = (**entry.state.read()).clone();
        Ok(LayerTxn {
            entry,
            _guard: guard,
            working,
        })
    }

    fn entry(&self, layer: &LayerId) -> Result<Arc<LayerEntry>> {
        let name = self.resolve_name(layer);
        self.layers
            .read()
            .get(name.key())
            .cloned()
            .ok_or_else(|| StoreError::layer_not_found(name.key()))
    }
}

/// A staged write transaction against one layer.
///
/// All mutation happens on a private clone of the layer state; nothing is
/// visible to readers until [`commit`](LayerTxn::commit). Dropping the
/// transaction discards the staged state.
pub struct LayerTxn {
    entry: Arc<LayerEntry>,
    _guard: OwnedMutexGuard<()>,
    working: LayerCollection,
}

impl LayerTxn {
    /// The staged layer state.
    pub fn collection(&self) -> &LayerCollection {
        &self.working
    }

    /// Validate and append one submission; returns the created record.
    pub fn append(&mut self, input: RawPartInput) -> Result<RawPart> {
        Ok(self.working.append(input)?.clone())
    }

    /// Discard all staged raw parts and partitions (swap semantics).
    pub fn truncate(&mut self) {
        self.working.truncate();
    }

    /// Stage a resolution transaction.
    pub fn apply(&mut self, tx: ResolutionTx) -> Result<()> {
        self.working.apply(tx)
    }

    /// Publish the staged state as the layer's current state.
    pub fn commit(self) {
        let mut state = self.entry.state.write();
        *state = Arc::new(self.working);
    }
}
