//! RawPart and Partition record types.
//!
//! A [`RawPart`] is one ingested footprint as submitted, kept forever as the
//! audit trail. A [`Partition`] is one maximal piece of the maintained
//! non-overlapping coverage, always derived from exactly one owning RawPart.
//! Both carry the same descriptive metadata ([`PartMetadata`]); partitions
//! copy it from their owner at creation time and are never mutated in place.

use crate::error::{CoreError, Result};
use crate::feature;
use crate::geometry::validate_footprint;
use chrono::{DateTime, Utc};
use geo_types::Polygon;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Finest representable resolution in degrees (zoom 22).
pub const MIN_RESOLUTION_DEG: f64 = 0.000000167638063430786;
/// Coarsest representable resolution in degrees (zoom 0).
pub const MAX_RESOLUTION_DEG: f64 = 0.703125;
/// Finest representable resolution in meters.
pub const MIN_RESOLUTION_METER: f64 = 0.0185;
/// Coarsest representable resolution in meters.
pub const MAX_RESOLUTION_METER: f64 = 78271.52;
/// Horizontal accuracy CE90 bounds in meters.
pub const HORIZONTAL_ACCURACY_CE90_RANGE: (f64, f64) = (0.01, 4000.0);

/// Descriptive imaging metadata shared by raw parts and partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartMetadata {
    /// Owning catalog record.
    pub catalog_id: Uuid,
    /// Product identifier.
    pub product_id: String,
    /// Product type.
    pub product_type: String,
    /// Source system identifier, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Source system name.
    pub source_name: String,
    /// Product version string.
    pub product_version: String,
    /// Start of the imaging window (UTC).
    pub imaging_time_begin_utc: DateTime<Utc>,
    /// End of the imaging window (UTC).
    pub imaging_time_end_utc: DateTime<Utc>,
    /// Resolution in degrees; lower is finer.
    pub resolution_degree: f64,
    /// Resolution in meters; lower is finer.
    pub resolution_meter: f64,
    /// Resolution of the source imagery in meters.
    pub source_resolution_meter: f64,
    /// Horizontal accuracy CE90 in meters; lower is better.
    pub horizontal_accuracy_ce90: f64,
    /// Imaging sensor names. Never empty.
    pub sensors: Vec<String>,
    /// Covered countries, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    /// Covered cities, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cities: Option<Vec<String>>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PartMetadata {
    /// Validate metadata attribute ranges.
    pub fn validate(&self) -> Result<()> {
        if self.sensors.is_empty() {
            return Err(CoreError::invalid_metadata("sensors must not be empty"));
        }
        if self.imaging_time_begin_utc > self.imaging_time_end_utc {
            return Err(CoreError::invalid_metadata(format!(
                "imaging window begins ({}) after it ends ({})",
                self.imaging_time_begin_utc, self.imaging_time_end_utc
            )));
        }
        check_range(
            "resolutionDegree",
            self.resolution_degree,
            MIN_RESOLUTION_DEG,
            MAX_RESOLUTION_DEG,
        )?;
        check_range(
            "resolutionMeter",
            self.resolution_meter,
            MIN_RESOLUTION_METER,
            MAX_RESOLUTION_METER,
        )?;
        check_range(
            "sourceResolutionMeter",
            self.source_resolution_meter,
            MIN_RESOLUTION_METER,
            MAX_RESOLUTION_METER,
        )?;
        check_range(
            "horizontalAccuracyCE90",
            self.horizontal_accuracy_ce90,
            HORIZONTAL_ACCURACY_CE90_RANGE.0,
            HORIZONTAL_ACCURACY_CE90_RANGE.1,
        )?;
        Ok(())
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value < min || value > max {
        return Err(CoreError::invalid_metadata(format!(
            "{name} = {value} outside [{min}, {max}]"
        )));
    }
    Ok(())
}

/// One raw footprint submission as received at the ingestion boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPartInput {
    /// Descriptive metadata.
    #[serde(flatten)]
    pub metadata: PartMetadata,
    /// Submitted footprint as a GeoJSON polygon.
    pub footprint: feature::Geometry,
}

impl RawPartInput {
    /// Validate the submission and convert the footprint to kernel form.
    pub fn validate(&self) -> Result<Polygon<f64>> {
        self.metadata.validate()?;
        let footprint = self.footprint.to_polygon()?;
        validate_footprint(&footprint)?;
        Ok(footprint)
    }
}

/// One ingested footprint record before overlap resolution.
#[derive(Debug, Clone)]
pub struct RawPart {
    /// Unique, immutable record id.
    pub id: Uuid,
    /// Descriptive metadata.
    pub metadata: PartMetadata,
    /// Submitted footprint.
    pub footprint: Polygon<f64>,
    /// Time the record was created.
    pub ingestion_time_utc: DateTime<Utc>,
    /// Per-layer monotonic sequence number. Never reused.
    pub insertion_order: u64,
    /// Flipped to true once the resolver has consumed this part.
    pub is_processed: bool,
}

impl RawPart {
    /// Create a raw part from a validated submission.
    ///
    /// `footprint` must be the polygon returned by
    /// [`RawPartInput::validate`]; `insertion_order` is assigned by the
    /// store.
    pub fn from_input(input: RawPartInput, footprint: Polygon<f64>, insertion_order: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            metadata: input.metadata,
            footprint,
            ingestion_time_utc: Utc::now(),
            insertion_order,
            is_processed: false,
        }
    }
}

/// One maximal piece of non-overlapping coverage.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Unique record id.
    pub id: Uuid,
    /// Owning raw part.
    pub part_id: Uuid,
    /// Metadata copied from the owner at creation time.
    pub metadata: PartMetadata,
    /// Partition footprint.
    pub footprint: Polygon<f64>,
    /// Owner's ingestion time.
    pub ingestion_time_utc: DateTime<Utc>,
    /// Copied from the owner; not unique across partitions sharing a part.
    pub insertion_order: u64,
}

impl Partition {
    /// Create a partition owned by `part` with the given footprint.
    pub fn derived_from(part: &RawPart, footprint: Polygon<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            part_id: part.id,
            metadata: part.metadata.clone(),
            footprint,
            ingestion_time_utc: part.ingestion_time_utc,
            insertion_order: part.insertion_order,
        }
    }

    /// Create a replacement partition when `source` is split by a later
    /// overlap. Keeps the owner, metadata, and insertion order; only the
    /// footprint and record id change.
    pub fn split_from(source: &Partition, footprint: Polygon<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            part_id: source.part_id,
            metadata: source.metadata.clone(),
            footprint,
            ingestion_time_utc: source.ingestion_time_utc,
            insertion_order: source.insertion_order,
        }
    }
}
