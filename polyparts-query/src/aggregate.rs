//! The aggregation engine: reduce a (optionally filtered) partition set to
//! one summary footprint plus scalar and array metadata.

use crate::error::{QueryError, Result};
use crate::filter::CompiledFilter;
use chrono::{DateTime, Utc};
use geo::{unary_union, Area, Buffer};
use geo_types::MultiPolygon;
use polyparts_core::geometry::{bbox_string, round_polygon};
use polyparts_core::{feature, AggregationConfig, FeatureCollection, FilterProperties, Partition};
use polyparts_store::LayerCollection;
use serde::Serialize;
use std::collections::BTreeSet;

/// Summary of a partition subset: one representative footprint plus
/// min/max metadata aggregates.
///
/// Resolution fields follow the catalog convention: `max*` is the best
/// (numerically smallest) resolution, `min*` the worst. Accuracy fields are
/// plain numeric bounds (`min` = best CE90, `max` = worst).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    /// Representative footprint.
    pub footprint: feature::Geometry,
    /// Bounding box of the footprint as `"minX,minY,maxX,maxY"`.
    pub product_bounding_box: String,
    /// Earliest imaging start over the subset.
    pub imaging_time_begin_utc: DateTime<Utc>,
    /// Latest imaging end over the subset.
    pub imaging_time_end_utc: DateTime<Utc>,
    /// Best (smallest) resolution in degrees.
    pub max_resolution_deg: f64,
    /// Worst (largest) resolution in degrees.
    pub min_resolution_deg: f64,
    /// Best (smallest) resolution in meters.
    pub max_resolution_meter: f64,
    /// Worst (largest) resolution in meters.
    pub min_resolution_meter: f64,
    /// Best (smallest) horizontal accuracy CE90 in meters.
    pub min_horizontal_accuracy_ce90: f64,
    /// Worst (largest) horizontal accuracy CE90 in meters.
    pub max_horizontal_accuracy_ce90: f64,
    /// Sorted union of all distinct sensor names.
    pub sensors: Vec<String>,
}

/// Aggregate a layer's partition set, optionally pre-filtered.
///
/// Pipeline: union the selected footprints, optionally smooth with a
/// buffer-out/buffer-in pass (falling back to the raw union if smoothing
/// collapses everything), take the first component as the representative
/// footprint, and fold the scalar aggregates over the same subset. An empty
/// subset is an error, not an empty success.
pub fn aggregate(
    collection: &LayerCollection,
    filter: Option<&FeatureCollection<FilterProperties>>,
    config: &AggregationConfig,
) -> Result<AggregationResult> {
    let compiled = match filter {
        Some(fc) if !fc.is_empty() => Some(CompiledFilter::compile(fc)?),
        _ => None,
    };

    let selected: Vec<&Partition> = collection
        .partitions_ordered()
        .into_iter()
        .filter(|p| match &compiled {
            None => true,
            Some(c) => !c.matching_indices(p).is_empty(),
        })
        .collect();

    if selected.is_empty() {
        return Err(QueryError::NoData);
    }

    // Stage 1: union of the selected footprints.
    let footprints: Vec<_> = selected.iter().map(|p| p.footprint.clone()).collect();
    let union: MultiPolygon<f64> = unary_union(footprints.iter());

    // Stages 2-3: optional smoothing with empty-fallback.
    let smoothed = if config.smoothing {
        let opened = union
            .buffer(config.smoothing_buffer_deg)
            .buffer(-config.smoothing_buffer_deg);
        if opened.unsigned_area() > 0.0 {
            opened
        } else {
            union.clone()
        }
    } else {
        union.clone()
    };

    // Stage 4: one maximal component, fixed precision, bbox string.
    let representative = smoothed
        .0
        .into_iter()
        .next()
        .ok_or_else(|| QueryError::Geometry("union of selected partitions is empty".to_string()))?;
    let representative = round_polygon(&representative, config.precision_digits);
    let product_bounding_box = bbox_string(&representative)
        .ok_or_else(|| QueryError::Geometry("footprint has no bounding box".to_string()))?;

    // Stage 5: scalar and array aggregates over the same subset.
    let mut sensors: BTreeSet<String> = BTreeSet::new();
    for p in &selected {
        sensors.extend(p.metadata.sensors.iter().cloned());
    }

    let fold_min = |f: fn(&Partition) -> f64| {
        selected.iter().map(|p| f(p)).fold(f64::INFINITY, f64::min)
    };
    let fold_max = |f: fn(&Partition) -> f64| {
        selected
            .iter()
            .map(|p| f(p))
            .fold(f64::NEG_INFINITY, f64::max)
    };

    let imaging_time_begin_utc = selected
        .iter()
        .map(|p| p.metadata.imaging_time_begin_utc)
        .min()
        .ok_or(QueryError::NoData)?;
    let imaging_time_end_utc = selected
        .iter()
        .map(|p| p.metadata.imaging_time_end_utc)
        .max()
        .ok_or(QueryError::NoData)?;

    let result = AggregationResult {
        footprint: feature::Geometry::from_polygon(&representative),
        product_bounding_box,
        imaging_time_begin_utc,
        imaging_time_end_utc,
        max_resolution_deg: fold_min(|p| p.metadata.resolution_degree),
        min_resolution_deg: fold_max(|p| p.metadata.resolution_degree),
        max_resolution_meter: fold_min(|p| p.metadata.resolution_meter),
        min_resolution_meter: fold_max(|p| p.metadata.resolution_meter),
        min_horizontal_accuracy_ce90: fold_min(|p| p.metadata.horizontal_accuracy_ce90),
        max_horizontal_accuracy_ce90: fold_max(|p| p.metadata.horizontal_accuracy_ce90),
        sensors: sensors.into_iter().collect(),
    };

    tracing::debug!(
        layer = %collection.name().key(),
        selected = selected.len(),
        smoothing = config.smoothing,
        "aggregation computed"
    );
    Ok(result)
}
