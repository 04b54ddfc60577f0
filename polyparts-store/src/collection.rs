//! Per-layer collections: the raw-parts log and the partition set.
//!
//! A [`LayerCollection`] owns both record collections for one layer plus an
//! R-tree over partition envelopes. The tree serves as the coarse pre-filter
//! for the resolver's spatial join; exact predicates are applied by the
//! caller on the candidates it returns.

use crate::error::{Result, StoreError};
use geo::BoundingRect;
use geo_types::Polygon;
use polyparts_core::{LayerName, Partition, RawPart, RawPartInput};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashMap;
use uuid::Uuid;

/// R-tree entry: a partition id keyed by its footprint envelope.
#[derive(Debug, Clone)]
pub struct PartitionEnvelope {
    /// Partition id.
    pub id: Uuid,
    aabb: AABB<[f64; 2]>,
}

impl PartitionEnvelope {
    fn new(id: Uuid, footprint: &Polygon<f64>) -> Option<Self> {
        envelope_of(footprint).map(|aabb| Self { id, aabb })
    }
}

impl PartialEq for PartitionEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl RTreeObject for PartitionEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Envelope of a polygon footprint as an R-tree AABB.
pub fn envelope_of(footprint: &Polygon<f64>) -> Option<AABB<[f64; 2]>> {
    footprint
        .bounding_rect()
        .map(|r| AABB::from_corners([r.min().x, r.min().y], [r.max().x, r.max().y]))
}

/// Atomic outcome of one resolver run: partitions to insert, partitions to
/// delete, raw parts to mark processed. Applied all-or-nothing.
#[derive(Debug, Default)]
pub struct ResolutionTx {
    /// Partitions created by this run.
    pub inserted: Vec<Partition>,
    /// Partitions superseded by this run.
    pub deleted: Vec<Uuid>,
    /// Raw parts consumed by this run.
    pub processed: Vec<Uuid>,
}

impl ResolutionTx {
    /// True when the transaction changes nothing.
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.deleted.is_empty() && self.processed.is_empty()
    }
}

/// Both record collections for one layer.
#[derive(Debug, Clone)]
pub struct LayerCollection {
    name: LayerName,
    raw_parts: Vec<RawPart>,
    partitions: HashMap<Uuid, Partition>,
    tree: RTree<PartitionEnvelope>,
    next_insertion_order: u64,
}

impl LayerCollection {
    /// Create empty collections for a layer.
    pub fn new(name: LayerName) -> Self {
        Self {
            name,
            raw_parts: Vec::new(),
            partitions: HashMap::new(),
            tree: RTree::new(),
            next_insertion_order: 1,
        }
    }

    /// Physical names of the layer's collections.
    pub fn name(&self) -> &LayerName {
        &self.name
    }

    /// Validate and append one submission, assigning the next insertion
    /// order. Returns the created record.
    pub fn append(&mut self, input: RawPartInput) -> Result<&RawPart> {
        let footprint = input.validate()?;
        let order = self.next_insertion_order;
        self.next_insertion_order += 1;
        self.raw_parts
            .push(RawPart::from_input(input, footprint, order));
        Ok(&self.raw_parts[self.raw_parts.len() - 1])
    }

    /// The full raw-parts log in insertion order.
    pub fn raw_parts(&self) -> &[RawPart] {
        &self.raw_parts
    }

    /// Raw parts not yet consumed by the resolver, in insertion order.
    pub fn unprocessed(&self) -> impl Iterator<Item = &RawPart> {
        self.raw_parts.iter().filter(|p| !p.is_processed)
    }

    /// All partitions, unordered.
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    /// Look up a partition by id.
    pub fn partition(&self, id: &Uuid) -> Option<&Partition> {
        self.partitions.get(id)
    }

    /// All partitions ordered by insertion order, then id, for deterministic
    /// scans.
    pub fn partitions_ordered(&self) -> Vec<&Partition> {
        let mut out: Vec<&Partition> = self.partitions.values().collect();
        out.sort_by_key(|p| (p.insertion_order, p.id));
        out
    }

    /// Number of partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Partitions whose envelope intersects the given envelope.
    ///
    /// Coarse candidates only; callers apply the exact geometric predicate.
    pub fn probe(&self, envelope: &AABB<[f64; 2]>) -> Vec<&Partition> {
        self.tree
            .locate_in_envelope_intersecting(envelope)
            .filter_map(|e| self.partitions.get(&e.id))
            .collect()
    }

    /// Apply one resolution transaction.
    ///
    /// Fails without side effects if a deleted id is unknown; the store's
    /// staging layer guarantees callers never observe a partially-applied
    /// transaction.
    pub fn apply(&mut self, tx: ResolutionTx) -> Result<()> {
        for id in &tx.deleted {
            if !self.partitions.contains_key(id) {
                return Err(StoreError::UnknownPartition {
                    layer: self.name.key().to_string(),
                    partition: *id,
                });
            }
        }

        for id in &tx.deleted {
            if let Some(old) = self.partitions.remove(id) {
                if let Some(entry) = PartitionEnvelope::new(*id, &old.footprint) {
                    self.tree.remove(&entry);
                }
            }
        }

        for partition in tx.inserted {
            if let Some(entry) = PartitionEnvelope::new(partition.id, &partition.footprint) {
                self.tree.insert(entry);
            }
            self.partitions.insert(partition.id, partition);
        }

        for id in &tx.processed {
            if let Some(part) = self.raw_parts.iter_mut().find(|p| p.id == *id) {
                part.is_processed = true;
            }
        }

        Ok(())
    }

    /// Discard all raw parts and partitions (swap re-ingestion).
    ///
    /// The insertion-order counter is deliberately not reset: orders are
    /// never reused within a layer's lifetime.
    pub fn truncate(&mut self) {
        self.raw_parts.clear();
        self.partitions.clear();
        self.tree = RTree::new();
    }
}
