//! The spatial find engine: filtered, optionally clipped intersection
//! queries against a partition set.

use crate::error::Result;
use crate::filter::CompiledFilter;
use chrono::{DateTime, Utc};
use geo::BooleanOps;
use polyparts_core::geometry::explode;
use polyparts_core::{
    feature, Feature, FeatureCollection, FilterProperties, PartMetadata, Partition,
};
use polyparts_store::LayerCollection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provenance of an output feature: the filter feature(s) that matched.
///
/// A single id when clipping (each clipped component has exactly one
/// producing feature) or when exactly one feature matched without clipping;
/// an array only in the no-clip multi-match case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestFeatureId {
    /// One producing filter feature.
    One(String),
    /// All matching filter features, in filter order.
    Many(Vec<String>),
}

/// Properties of one found feature.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundProperties {
    /// Partition record id.
    pub id: Uuid,
    /// Owning raw part.
    pub part_id: Uuid,
    /// Descriptive imaging metadata.
    #[serde(flatten)]
    pub metadata: PartMetadata,
    /// Owner's ingestion time.
    pub ingestion_time_utc: DateTime<Utc>,
    /// Matching filter feature provenance, when a filter was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_feature_id: Option<RequestFeatureId>,
}

fn properties(partition: &Partition, request_feature_id: Option<RequestFeatureId>) -> FoundProperties {
    FoundProperties {
        id: partition.id,
        part_id: partition.part_id,
        metadata: partition.metadata.clone(),
        ingestion_time_utc: partition.ingestion_time_utc,
        request_feature_id,
    }
}

/// Answer a find query over a layer's partition set.
///
/// An absent or empty filter matches every partition and returns whole
/// footprints (there is nothing to clip against). With a filter,
/// `should_clip` selects between clipped components (one output per
/// partition per matching filter feature per component) and whole
/// footprints (one output per matching partition).
pub fn find(
    collection: &LayerCollection,
    filter: Option<&FeatureCollection<FilterProperties>>,
    should_clip: bool,
) -> Result<FeatureCollection<FoundProperties>> {
    let compiled = match filter {
        Some(fc) if !fc.is_empty() => Some(CompiledFilter::compile(fc)?),
        _ => None,
    };

    let mut out = Vec::new();
    for partition in collection.partitions_ordered() {
        match &compiled {
            None => {
                out.push(Feature::new(
                    feature::Geometry::from_polygon(&partition.footprint),
                    properties(partition, None),
                ));
            }
            Some(compiled) => {
                let matched = compiled.matching_indices(partition);
                if matched.is_empty() {
                    continue;
                }
                if should_clip {
                    emit_clipped(&mut out, partition, compiled, &matched);
                } else {
                    out.push(Feature::new(
                        feature::Geometry::from_polygon(&partition.footprint),
                        properties(partition, no_clip_provenance(compiled, &matched)),
                    ));
                }
            }
        }
    }

    tracing::debug!(
        layer = %collection.name().key(),
        features = out.len(),
        clipped = should_clip,
        "find query answered"
    );
    Ok(FeatureCollection::new(out))
}

/// Clip a partition against each matching filter feature separately.
///
/// Overlapping filter features produce separate, possibly re-overlapping,
/// outputs: every clipped component carries the one feature that produced
/// it.
fn emit_clipped(
    out: &mut Vec<Feature<FoundProperties>>,
    partition: &Partition,
    compiled: &CompiledFilter,
    matched: &[usize],
) {
    for &idx in matched {
        let filter_feature = &compiled.features[idx];
        let clipped = filter_feature.geometry.intersection(&partition.footprint);
        for component in explode(clipped) {
            out.push(Feature::new(
                feature::Geometry::from_polygon(&component),
                properties(
                    partition,
                    filter_feature.id.clone().map(RequestFeatureId::One),
                ),
            ));
        }
    }
}

fn no_clip_provenance(compiled: &CompiledFilter, matched: &[usize]) -> Option<RequestFeatureId> {
    if matched.len() == 1 {
        compiled.features[matched[0]]
            .id
            .clone()
            .map(RequestFeatureId::One)
    } else {
        let ids: Vec<String> = matched
            .iter()
            .filter_map(|&i| compiled.features[i].id.clone())
            .collect();
        if ids.is_empty() {
            None
        } else {
            Some(RequestFeatureId::Many(ids))
        }
    }
}
