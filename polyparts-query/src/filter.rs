//! Shared partition matching rule for find and aggregation.
//!
//! A partition matches a filter feature when it intersects the feature
//! geometry (boundary touches included) and passes the feature's resolution
//! bounds:
//!
//! - `minResolutionDeg` is a ceiling: the coarsest acceptable resolution.
//!   Partitions with a larger (coarser) `resolutionDegree` are excluded.
//! - `maxResolutionDeg` is a floor used only by aggregation: partitions with
//!   a smaller (finer) `resolutionDegree` are excluded.
//!
//! An absent or empty filter matches every partition unconditionally.

use crate::error::Result;
use geo::{BoundingRect, Intersects};
use geo_types::{MultiPolygon, Rect};
use polyparts_core::{FeatureCollection, FilterProperties, Partition};

/// One filter feature compiled for repeated matching.
pub struct CompiledFeature {
    /// The feature's id, echoed back as `requestFeatureId`.
    pub id: Option<String>,
    /// Feature geometry in kernel form.
    pub geometry: MultiPolygon<f64>,
    /// Resolution ceiling (coarsest acceptable).
    pub min_resolution_deg: Option<f64>,
    /// Resolution floor (finest acceptable).
    pub max_resolution_deg: Option<f64>,
    rect: Option<Rect<f64>>,
}

impl CompiledFeature {
    /// Exact matching rule for one partition.
    pub fn matches(&self, partition: &Partition) -> bool {
        if let Some(ceiling) = self.min_resolution_deg {
            if partition.metadata.resolution_degree > ceiling {
                return false;
            }
        }
        if let Some(floor) = self.max_resolution_deg {
            if partition.metadata.resolution_degree < floor {
                return false;
            }
        }
        // Envelope precheck before the exact predicate.
        if let (Some(a), Some(b)) = (self.rect, partition.footprint.bounding_rect()) {
            if !a.intersects(&b) {
                return false;
            }
        }
        self.geometry.intersects(&partition.footprint)
    }
}

/// A filter feature collection compiled for matching.
pub struct CompiledFilter {
    /// Compiled features in input order.
    pub features: Vec<CompiledFeature>,
}

impl CompiledFilter {
    /// Compile a filter collection, converting geometries to kernel form.
    pub fn compile(filter: &FeatureCollection<FilterProperties>) -> Result<Self> {
        let features = filter
            .features
            .iter()
            .map(|f| {
                let geometry = f.geometry.to_multi_polygon()?;
                let rect = geometry.bounding_rect();
                Ok(CompiledFeature {
                    id: f.id.clone(),
                    geometry,
                    min_resolution_deg: f.properties.min_resolution_deg,
                    max_resolution_deg: f.properties.max_resolution_deg,
                    rect,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { features })
    }

    /// Indices of the features a partition matches, in input order.
    pub fn matching_indices(&self, partition: &Partition) -> Vec<usize> {
        self.features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.matches(partition))
            .map(|(i, _)| i)
            .collect()
    }
}
