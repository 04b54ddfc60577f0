//! Typed GeoJSON feature model.
//!
//! Filter inputs and find outputs travel as GeoJSON feature collections.
//! Only `Polygon` and `MultiPolygon` geometries are representable, which is
//! exactly the subset the request validator admits; anything else fails
//! conversion rather than deserialization so callers get a geometry-level
//! error instead of a serde error.

use crate::error::{CoreError, Result};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// GeoJSON position list for one polygon ring.
pub type Ring = Vec<[f64; 2]>;

/// GeoJSON geometry restricted to the polygonal subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single polygon: exterior ring followed by interior rings.
    Polygon {
        /// Rings, each a closed position list.
        coordinates: Vec<Ring>,
    },
    /// A set of polygons.
    MultiPolygon {
        /// Per-polygon ring lists.
        coordinates: Vec<Vec<Ring>>,
    },
}

impl Geometry {
    /// Build a GeoJSON polygon from a kernel polygon.
    pub fn from_polygon(polygon: &Polygon<f64>) -> Self {
        Geometry::Polygon {
            coordinates: polygon_rings(polygon),
        }
    }

    /// Convert to a kernel polygon. Fails for `MultiPolygon`.
    pub fn to_polygon(&self) -> Result<Polygon<f64>> {
        match self {
            Geometry::Polygon { coordinates } => rings_to_polygon(coordinates),
            Geometry::MultiPolygon { .. } => Err(CoreError::UnsupportedGeometry(
                "expected Polygon, got MultiPolygon".to_string(),
            )),
        }
    }

    /// Convert to a kernel multi-polygon (a polygon becomes one member).
    pub fn to_multi_polygon(&self) -> Result<MultiPolygon<f64>> {
        match self {
            Geometry::Polygon { coordinates } => {
                Ok(MultiPolygon(vec![rings_to_polygon(coordinates)?]))
            }
            Geometry::MultiPolygon { coordinates } => {
                let polygons = coordinates
                    .iter()
                    .map(|rings| rings_to_polygon(rings))
                    .collect::<Result<Vec<_>>>()?;
                Ok(MultiPolygon(polygons))
            }
        }
    }
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Ring> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.0.iter().map(|c| [c.x, c.y]).collect())
        .collect()
}

fn rings_to_polygon(rings: &[Ring]) -> Result<Polygon<f64>> {
    let mut iter = rings.iter().map(|ring| {
        LineString::from(
            ring.iter()
                .map(|&[x, y]| Coord { x, y })
                .collect::<Vec<_>>(),
        )
    });
    let exterior = iter
        .next()
        .ok_or_else(|| CoreError::invalid_footprint("polygon has no rings"))?;
    Ok(Polygon::new(exterior, iter.collect()))
}

/// One GeoJSON feature with typed properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature<P> {
    /// Always `"Feature"`.
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,

    /// Optional feature identifier, echoed back as `requestFeatureId`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Feature geometry.
    pub geometry: Geometry,

    /// Feature properties.
    pub properties: P,
}

impl<P> Feature<P> {
    /// Create a feature without an id.
    pub fn new(geometry: Geometry, properties: P) -> Self {
        Self {
            kind: feature_type(),
            id: None,
            geometry,
            properties,
        }
    }

    /// Create a feature with an id.
    pub fn with_id(id: impl Into<String>, geometry: Geometry, properties: P) -> Self {
        Self {
            kind: feature_type(),
            id: Some(id.into()),
            geometry,
            properties,
        }
    }
}

/// A GeoJSON feature collection with typed per-feature properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,

    /// Member features.
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    /// Create a collection from features.
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self {
            kind: collection_type(),
            features,
        }
    }

    /// True when the collection carries no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<P> Default for FeatureCollection<P> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}

/// Properties accepted on query/aggregation filter features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterProperties {
    /// Coarsest acceptable resolution: partitions with a larger (coarser)
    /// `resolutionDegree` are excluded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_resolution_deg: Option<f64>,

    /// Finest resolution bound, used only by aggregation: partitions with a
    /// smaller (finer) `resolutionDegree` are excluded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_resolution_deg: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;

    #[test]
    fn polygon_roundtrip() {
        let p: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        let geom = Geometry::from_polygon(&p);
        assert_eq!(geom.to_polygon().unwrap(), p);
    }

    #[test]
    fn multi_polygon_rejected_as_polygon() {
        let geom = Geometry::MultiPolygon {
            coordinates: vec![vec![vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 0.0],
            ]]],
        };
        assert!(geom.to_polygon().is_err());
        assert_eq!(geom.to_multi_polygon().unwrap().0.len(), 1);
    }

    #[test]
    fn filter_feature_deserializes_camel_case() {
        let json = serde_json::json!({
            "type": "Feature",
            "id": "req-1",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            },
            "properties": { "minResolutionDeg": 0.02 }
        });
        let feature: Feature<FilterProperties> = serde_json::from_value(json).unwrap();
        assert_eq!(feature.id.as_deref(), Some("req-1"));
        assert_eq!(feature.properties.min_resolution_deg, Some(0.02));
        assert_eq!(feature.properties.max_resolution_deg, None);
    }

    #[test]
    fn feature_collection_serializes_type_tags() {
        let fc = FeatureCollection::new(vec![Feature::new(
            Geometry::Polygon {
                coordinates: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            },
            FilterProperties::default(),
        )]);
        let value = serde_json::to_value(&fc).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Polygon");
    }
}
