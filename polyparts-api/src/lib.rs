//! Exposed operations of the polygon-parts engine.
//!
//! [`PolygonParts`] ties the store, the overlap resolver, the query engines
//! and the catalog seam together behind the four caller-facing operations:
//!
//! - [`create_layer`](PolygonParts::create_layer): provision a layer's
//!   collections and ingest its first batch
//! - [`update_layer`](PolygonParts::update_layer): ingest a further batch,
//!   either on top of the existing coverage or replacing it (swap)
//! - [`find`](PolygonParts::find): filtered, optionally clipped spatial
//!   queries over the partition set
//! - [`aggregate`](PolygonParts::aggregate): reduce the partition set to a
//!   single summary footprint plus metadata aggregates
//!
//! Every write path is transactional: validation, overlap resolution and
//! the commit happen under the layer's write lock, and any failure leaves
//! the layer exactly as it was.

pub mod catalog;
mod error;

pub use catalog::{CatalogClient, MemoryCatalog};
pub use error::{ApiError, Result};
pub use polyparts_core::{
    AggregationConfig, Feature, FeatureCollection, FilterProperties, LayerId, LayerName,
    LayerNamingPolicy, PartMetadata, RawPartInput, ResolverConfig,
};
pub use polyparts_query::{AggregationResult, FoundProperties, RequestFeatureId};
pub use polyparts_resolver::{Deadline, ResolveStats};

use polyparts_store::PartitionStore;
use std::sync::Arc;

/// The polygon-parts engine facade.
pub struct PolygonParts {
    store: Arc<PartitionStore>,
    catalog: Arc<dyn CatalogClient>,
    resolver: ResolverConfig,
    aggregation: AggregationConfig,
}

impl PolygonParts {
    /// Create an engine with default configuration.
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            store: Arc::new(PartitionStore::new(LayerNamingPolicy::default())),
            catalog,
            resolver: ResolverConfig::default(),
            aggregation: AggregationConfig::default(),
        }
    }

    /// Override the layer naming policy.
    pub fn with_naming(mut self, naming: LayerNamingPolicy) -> Self {
        self.store = Arc::new(PartitionStore::new(naming));
        self
    }

    /// Override the resolver configuration.
    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver = config;
        self
    }

    /// Override the aggregation configuration.
    pub fn with_aggregation_config(mut self, config: AggregationConfig) -> Self {
        self.aggregation = config;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<PartitionStore> {
        &self.store
    }

    /// Provision a layer's collections and ingest its first batch.
    ///
    /// The layer's product must exist in the catalog, and the layer must
    /// not already have collections. If ingestion fails, the freshly
    /// created collections are removed again, so a failed create leaves no
    /// trace.
    pub async fn create_layer(
        &self,
        layer: &LayerId,
        parts: Vec<RawPartInput>,
        deadline: &Deadline,
    ) -> Result<ResolveStats> {
        if !self.catalog.product_exists(layer).await? {
            return Err(ApiError::NotFound(format!(
                "product not in catalog: {layer}"
            )));
        }
        let name = self.store.create_layer(layer)?;

        match self.ingest(layer, parts, false, deadline).await {
            Ok(stats) => {
                tracing::info!(
                    layer = %name.key(),
                    inserted = stats.inserted,
                    "layer created"
                );
                Ok(stats)
            }
            Err(err) => {
                // Unwind the provisioning so the caller can retry create.
                let _ = self.store.drop_layer(layer);
                Err(err)
            }
        }
    }

    /// Ingest a batch into an existing layer.
    ///
    /// With `is_swap`, the layer's previous raw parts and partitions are
    /// discarded inside the same transaction, so the batch replaces the
    /// coverage rather than stacking on top of it. Readers never observe
    /// the truncated-but-not-yet-repopulated intermediate state.
    pub async fn update_layer(
        &self,
        layer: &LayerId,
        parts: Vec<RawPartInput>,
        is_swap: bool,
        deadline: &Deadline,
    ) -> Result<ResolveStats> {
        if !self.store.layer_exists(layer) {
            let name = self.store.resolve_name(layer);
            return Err(ApiError::NotFound(name.key().to_string()));
        }
        let stats = self.ingest(layer, parts, is_swap, deadline).await?;
        tracing::info!(
            layer = %self.store.resolve_name(layer).key(),
            swap = is_swap,
            inserted = stats.inserted,
            deleted = stats.deleted,
            "layer updated"
        );
        Ok(stats)
    }

    /// Remove a layer and both its collections.
    pub fn drop_layer(&self, layer: &LayerId) -> Result<()> {
        self.store.drop_layer(layer)?;
        Ok(())
    }

    /// Answer a find query against the layer's current partition set.
    pub fn find(
        &self,
        layer: &LayerId,
        filter: Option<&FeatureCollection<FilterProperties>>,
        should_clip: bool,
    ) -> Result<FeatureCollection<FoundProperties>> {
        let snapshot = self.store.snapshot(layer)?;
        Ok(polyparts_query::find(&snapshot, filter, should_clip)?)
    }

    /// Aggregate the layer's current partition set.
    pub fn aggregate(
        &self,
        layer: &LayerId,
        filter: Option<&FeatureCollection<FilterProperties>>,
    ) -> Result<AggregationResult> {
        let snapshot = self.store.snapshot(layer)?;
        Ok(polyparts_query::aggregate(
            &snapshot,
            filter,
            &self.aggregation,
        )?)
    }

    /// Shared ingestion transaction: append, resolve, commit.
    async fn ingest(
        &self,
        layer: &LayerId,
        parts: Vec<RawPartInput>,
        truncate_first: bool,
        deadline: &Deadline,
    ) -> Result<ResolveStats> {
        let mut txn = self.store.begin(layer).await?;
        if truncate_first {
            txn.truncate();
        }
        for input in parts {
            txn.append(input)?;
        }
        let stats = polyparts_resolver::resolve(&mut txn, &self.resolver, deadline)?;
        txn.commit();
        Ok(stats)
    }
}
