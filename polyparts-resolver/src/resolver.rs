//! The overlap-resolution procedure.
//!
//! Converts the layer's unprocessed raw parts plus its current partition set
//! into an updated partition set preserving the non-overlap invariant. The
//! run is split into a pure planning pass ([`plan`]) and a staged commit
//! ([`resolve`]) so that any failure, including deadline expiry, leaves the
//! layer untouched.
//!
//! # Algorithm
//!
//! 1. Collect the unprocessed raw parts `U`, ordered by insertion order.
//! 2. Join every `newer ∈ U` against all `older` geometries it genuinely
//!    overlaps (positive intersection area; boundary touches are ignored),
//!    where `older` ranges over the existing partitions and the members of
//!    `U` with a lower insertion order. Later insertion always wins the
//!    contested area.
//! 3. Reduce each `older` exactly once: subtract the union of all its
//!    claimants in one difference.
//! 4. Explode each difference into simple-polygon components.
//! 5. Keep a component only if its area clears the minimum-area threshold.
//!    The threshold applies solely to difference output; members of `U`
//!    with no claimant are inserted verbatim whatever their area.
//! 6. Stage deletions of every reduced partition, insertions of all
//!    survivors, and processed marks for all of `U`, then commit in one
//!    swap.

use crate::deadline::Deadline;
use crate::error::Result;
use geo::{unary_union, Area, BooleanOps};
use geo_types::Polygon;
use polyparts_core::geometry::{explode, intersection_area};
use polyparts_core::{Partition, RawPart, ResolverConfig};
use polyparts_store::{envelope_of, LayerTxn, ResolutionTx};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashMap;
use uuid::Uuid;

/// Statistics from one resolver run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveStats {
    /// Raw parts consumed.
    pub batch_size: usize,
    /// Overlapping (older, newer) pairs found by the spatial join.
    pub overlap_pairs: usize,
    /// Partitions deleted.
    pub deleted: usize,
    /// Partitions inserted.
    pub inserted: usize,
    /// Difference remainders dropped for falling under the area threshold.
    pub dropped_slivers: usize,
}

/// Batch-internal R-tree entry, keyed by position in the batch.
struct BatchEnvelope {
    idx: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for BatchEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Compute the resolution plan for a layer's unprocessed raw parts.
///
/// Pure: reads the collection, produces the transaction, mutates nothing.
pub fn plan(
    collection: &polyparts_store::LayerCollection,
    config: &ResolverConfig,
    deadline: &Deadline,
) -> Result<(ResolutionTx, ResolveStats)> {
    let batch: Vec<&RawPart> = collection.unprocessed().collect();
    let mut stats = ResolveStats {
        batch_size: batch.len(),
        ..Default::default()
    };
    let mut tx = ResolutionTx::default();
    if batch.is_empty() {
        return Ok((tx, stats));
    }

    let batch_tree = RTree::bulk_load(
        batch
            .iter()
            .enumerate()
            .filter_map(|(idx, part)| {
                envelope_of(&part.footprint).map(|aabb| BatchEnvelope { idx, aabb })
            })
            .collect(),
    );

    // Claims against each older geometry: the footprints of every newer raw
    // part that genuinely overlaps it.
    let mut partition_claims: HashMap<Uuid, Vec<Polygon<f64>>> = HashMap::new();
    let mut raw_claims: HashMap<Uuid, Vec<Polygon<f64>>> = HashMap::new();

    for newer in &batch {
        deadline.check()?;
        let Some(env) = envelope_of(&newer.footprint) else {
            continue;
        };

        for partition in collection.probe(&env) {
            if partition.insertion_order >= newer.insertion_order {
                continue;
            }
            if intersection_area(&partition.footprint, &newer.footprint) > 0.0 {
                partition_claims
                    .entry(partition.id)
                    .or_default()
                    .push(newer.footprint.clone());
                stats.overlap_pairs += 1;
            }
        }

        for entry in batch_tree.locate_in_envelope_intersecting(&env) {
            let older = batch[entry.idx];
            if older.insertion_order >= newer.insertion_order {
                continue;
            }
            if intersection_area(&older.footprint, &newer.footprint) > 0.0 {
                raw_claims
                    .entry(older.id)
                    .or_default()
                    .push(newer.footprint.clone());
                stats.overlap_pairs += 1;
            }
        }
    }

    // Existing partitions that lost area: delete, re-insert surviving
    // difference components under the same owner.
    for (partition_id, claims) in &partition_claims {
        deadline.check()?;
        let Some(partition) = collection.partition(partition_id) else {
            continue;
        };
        tx.deleted.push(*partition_id);
        let claimed = unary_union(claims.iter());
        let remainder = partition.footprint.difference(&claimed);
        for component in explode(remainder) {
            if component.unsigned_area() >= config.min_area_deg2 {
                tx.inserted.push(Partition::split_from(partition, component));
            } else {
                stats.dropped_slivers += 1;
            }
        }
    }

    // Batch members: contested ones are reduced by their claimants; members
    // with no claimant are inserted verbatim (area-threshold exempt).
    for part in &batch {
        match raw_claims.get(&part.id) {
            None => {
                tx.inserted
                    .push(Partition::derived_from(part, part.footprint.clone()));
            }
            Some(claims) => {
                deadline.check()?;
                let claimed = unary_union(claims.iter());
                let remainder = part.footprint.difference(&claimed);
                for component in explode(remainder) {
                    if component.unsigned_area() >= config.min_area_deg2 {
                        tx.inserted.push(Partition::derived_from(part, component));
                    } else {
                        stats.dropped_slivers += 1;
                    }
                }
            }
        }
        tx.processed.push(part.id);
    }

    stats.deleted = tx.deleted.len();
    stats.inserted = tx.inserted.len();
    Ok((tx, stats))
}

/// Run overlap resolution inside a staged transaction.
///
/// Plans against the transaction's working state and stages the outcome.
/// The caller commits; an error here means nothing was staged beyond the
/// caller's own appends, and dropping the transaction rolls those back too.
pub fn resolve(
    txn: &mut LayerTxn,
    config: &ResolverConfig,
    deadline: &Deadline,
) -> Result<ResolveStats> {
    let (tx, stats) = plan(txn.collection(), config, deadline)?;
    txn.apply(tx)?;
    tracing::info!(
        layer = %txn.collection().name().key(),
        batch = stats.batch_size,
        pairs = stats.overlap_pairs,
        inserted = stats.inserted,
        deleted = stats.deleted,
        slivers = stats.dropped_slivers,
        "overlap resolution applied"
    );
    Ok(stats)
}
