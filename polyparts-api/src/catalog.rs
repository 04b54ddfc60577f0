//! Catalog lookup seam.
//!
//! Layer creation verifies the owning product against the catalog before
//! provisioning collections. The trait abstracts over the real catalog
//! client (an external collaborator) and the in-memory implementation used
//! in tests and embedded deployments.

use crate::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use polyparts_core::LayerId;
use std::collections::HashSet;

/// Catalog lookup client.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Whether the catalog knows the layer's product.
    async fn product_exists(&self, layer: &LayerId) -> Result<bool>;
}

/// In-memory catalog for tests and embedded use.
#[derive(Default)]
pub struct MemoryCatalog {
    products: RwLock<HashSet<String>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product.
    pub fn register(&self, layer: &LayerId) {
        self.products.write().insert(layer.to_string());
    }
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn product_exists(&self, layer: &LayerId) -> Result<bool> {
        Ok(self.products.read().contains(&layer.to_string()))
    }
}
