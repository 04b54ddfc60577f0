//! Behavior tests for the find and aggregation engines.

use chrono::{DateTime, TimeZone, Utc};
use geo::{Area, BoundingRect};
use polyparts_core::{
    feature, AggregationConfig, Feature, FeatureCollection, FilterProperties, LayerId,
    LayerNamingPolicy, PartMetadata, Partition, RawPartInput,
};
use polyparts_query::{aggregate, find, QueryError, RequestFeatureId};
use polyparts_store::{LayerCollection, ResolutionTx};
use uuid::Uuid;

fn ring(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<[f64; 2]> {
    vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]
}

fn metadata(resolution_degree: f64, sensors: &[&str]) -> PartMetadata {
    PartMetadata {
        catalog_id: Uuid::new_v4(),
        product_id: "World".to_string(),
        product_type: "Orthophoto".to_string(),
        source_id: None,
        source_name: "sat".to_string(),
        product_version: "1.0".to_string(),
        imaging_time_begin_utc: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        imaging_time_end_utc: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        resolution_degree,
        resolution_meter: resolution_degree * 100.0,
        source_resolution_meter: resolution_degree * 100.0,
        horizontal_accuracy_ce90: resolution_degree * 100.0,
        sensors: sensors.iter().map(|s| s.to_string()).collect(),
        countries: None,
        cities: None,
        description: None,
    }
}

fn collection() -> LayerCollection {
    let name =
        LayerNamingPolicy::default().resolve(&LayerId::new("World", "Orthophoto").unwrap());
    LayerCollection::new(name)
}

/// Append a raw part and publish it as one resolved partition.
fn add_partition(
    c: &mut LayerCollection,
    meta: PartMetadata,
    footprint: Vec<[f64; 2]>,
) -> Uuid {
    let part = c
        .append(RawPartInput {
            metadata: meta,
            footprint: feature::Geometry::Polygon {
                coordinates: vec![footprint],
            },
        })
        .unwrap()
        .clone();
    let partition = Partition::derived_from(&part, part.footprint.clone());
    let id = partition.id;
    c.apply(ResolutionTx {
        inserted: vec![partition],
        deleted: vec![],
        processed: vec![part.id],
    })
    .unwrap();
    id
}

fn filter(
    features: Vec<(Option<&str>, Vec<[f64; 2]>, FilterProperties)>,
) -> FeatureCollection<FilterProperties> {
    FeatureCollection::new(
        features
            .into_iter()
            .map(|(id, ring, properties)| {
                let geometry = feature::Geometry::Polygon {
                    coordinates: vec![ring],
                };
                match id {
                    Some(id) => Feature::with_id(id, geometry, properties),
                    None => Feature::new(geometry, properties),
                }
            })
            .collect(),
    )
}

fn times(
    begin: (i32, u32, u32),
    end: (i32, u32, u32),
) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(begin.0, begin.1, begin.2, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(end.0, end.1, end.2, 0, 0, 0).unwrap(),
    )
}

#[test]
fn clip_returns_exactly_the_filter_region() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(0.0, 0.0, 10.0, 10.0));

    let f = filter(vec![(
        Some("req-1"),
        ring(2.0, 2.0, 4.0, 4.0),
        FilterProperties::default(),
    )]);

    let clipped = find(&c, Some(&f), true).unwrap();
    assert_eq!(clipped.features.len(), 1);
    let out = &clipped.features[0];
    let polygon = out.geometry.to_polygon().unwrap();
    assert!((polygon.unsigned_area() - 4.0).abs() < 1e-9);
    let rect = polygon.bounding_rect().unwrap();
    for (got, want) in [
        (rect.min().x, 2.0),
        (rect.min().y, 2.0),
        (rect.max().x, 4.0),
        (rect.max().y, 4.0),
    ] {
        assert!((got - want).abs() < 1e-9, "bbox edge {got} != {want}");
    }
    assert_eq!(
        out.properties.request_feature_id,
        Some(RequestFeatureId::One("req-1".to_string()))
    );
}

#[test]
fn no_clip_returns_the_whole_footprint() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(0.0, 0.0, 10.0, 10.0));

    let f = filter(vec![(
        Some("req-1"),
        ring(2.0, 2.0, 4.0, 4.0),
        FilterProperties::default(),
    )]);

    let whole = find(&c, Some(&f), false).unwrap();
    assert_eq!(whole.features.len(), 1);
    let polygon = whole.features[0].geometry.to_polygon().unwrap();
    assert!((polygon.unsigned_area() - 100.0).abs() < 1e-9);
    assert_eq!(
        whole.features[0].properties.request_feature_id,
        Some(RequestFeatureId::One("req-1".to_string()))
    );
}

#[test]
fn resolution_ceiling_excludes_coarser_partitions() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(0.0, 0.0, 1.0, 1.0));

    let excluded = filter(vec![(
        None,
        ring(0.0, 0.0, 1.0, 1.0),
        FilterProperties {
            min_resolution_deg: Some(0.01),
            max_resolution_deg: None,
        },
    )]);
    assert!(find(&c, Some(&excluded), false).unwrap().is_empty());

    let included = filter(vec![(
        None,
        ring(0.0, 0.0, 1.0, 1.0),
        FilterProperties {
            min_resolution_deg: Some(0.02),
            max_resolution_deg: None,
        },
    )]);
    assert_eq!(find(&c, Some(&included), false).unwrap().features.len(), 1);
}

#[test]
fn no_clip_multi_match_returns_id_array() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(0.0, 0.0, 10.0, 10.0));

    let f = filter(vec![
        (
            Some("a"),
            ring(1.0, 1.0, 2.0, 2.0),
            FilterProperties::default(),
        ),
        (
            Some("b"),
            ring(3.0, 3.0, 4.0, 4.0),
            FilterProperties::default(),
        ),
    ]);

    let found = find(&c, Some(&f), false).unwrap();
    assert_eq!(found.features.len(), 1);
    assert_eq!(
        found.features[0].properties.request_feature_id,
        Some(RequestFeatureId::Many(vec![
            "a".to_string(),
            "b".to_string()
        ]))
    );
}

#[test]
fn overlapping_filter_features_clip_once_per_feature() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(0.0, 0.0, 10.0, 10.0));

    // Two overlapping filter squares: each produces its own clipped output.
    let f = filter(vec![
        (
            Some("a"),
            ring(1.0, 1.0, 4.0, 4.0),
            FilterProperties::default(),
        ),
        (
            Some("b"),
            ring(3.0, 1.0, 6.0, 4.0),
            FilterProperties::default(),
        ),
    ]);

    let found = find(&c, Some(&f), true).unwrap();
    assert_eq!(found.features.len(), 2);
    let ids: Vec<_> = found
        .features
        .iter()
        .map(|f| f.properties.request_feature_id.clone())
        .collect();
    assert!(ids.contains(&Some(RequestFeatureId::One("a".to_string()))));
    assert!(ids.contains(&Some(RequestFeatureId::One("b".to_string()))));
    for feature in &found.features {
        let area = feature.geometry.to_polygon().unwrap().unsigned_area();
        assert!((area - 9.0).abs() < 1e-9);
    }
}

#[test]
fn absent_filter_matches_every_partition() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(0.0, 0.0, 1.0, 1.0));
    add_partition(&mut c, metadata(0.01, &["Pan"]), ring(5.0, 5.0, 6.0, 6.0));

    let all = find(&c, None, true).unwrap();
    assert_eq!(all.features.len(), 2);
    for feature in &all.features {
        assert!(feature.properties.request_feature_id.is_none());
    }

    let empty = FeatureCollection::default();
    assert_eq!(find(&c, Some(&empty), false).unwrap().features.len(), 2);
}

#[test]
fn request_feature_id_serializes_as_value_or_array() {
    let one = serde_json::to_value(RequestFeatureId::One("a".to_string())).unwrap();
    assert_eq!(one, serde_json::json!("a"));
    let many =
        serde_json::to_value(RequestFeatureId::Many(vec!["a".to_string(), "b".to_string()]))
            .unwrap();
    assert_eq!(many, serde_json::json!(["a", "b"]));
}

#[test]
fn aggregation_folds_min_max_and_sensors() {
    let mut c = collection();
    let (b1, e1) = times((2024, 1, 1), (2024, 1, 2));
    let (b2, e2) = times((2023, 6, 1), (2024, 3, 1));

    let mut m1 = metadata(0.01, &["RGB", "Pan"]);
    m1.imaging_time_begin_utc = b1;
    m1.imaging_time_end_utc = e1;
    let mut m2 = metadata(0.02, &["Pan"]);
    m2.imaging_time_begin_utc = b2;
    m2.imaging_time_end_utc = e2;
    let m3 = metadata(0.03, &["IR"]);

    add_partition(&mut c, m1, ring(0.0, 0.0, 1.0, 1.0));
    add_partition(&mut c, m2, ring(1.0, 0.0, 2.0, 1.0));
    add_partition(&mut c, m3, ring(2.0, 0.0, 3.0, 1.0));

    let result = aggregate(&c, None, &AggregationConfig::default().with_smoothing(false)).unwrap();

    assert_eq!(result.max_resolution_deg, 0.01);
    assert_eq!(result.min_resolution_deg, 0.03);
    assert_eq!(result.max_resolution_meter, 1.0);
    assert_eq!(result.min_resolution_meter, 3.0);
    assert_eq!(result.min_horizontal_accuracy_ce90, 1.0);
    assert_eq!(result.max_horizontal_accuracy_ce90, 3.0);
    assert_eq!(result.sensors, vec!["IR", "Pan", "RGB"]);
    assert_eq!(result.imaging_time_begin_utc, b2);
    assert_eq!(result.imaging_time_end_utc, e2);

    // Three adjacent unit squares union into one 3x1 footprint.
    let footprint = result.footprint.to_polygon().unwrap();
    assert!((footprint.unsigned_area() - 3.0).abs() < 1e-6);
    let bbox: Vec<f64> = result
        .product_bounding_box
        .split(',')
        .map(|v| v.parse().unwrap())
        .collect();
    for (got, want) in bbox.iter().zip([0.0, 0.0, 3.0, 1.0]) {
        assert!((got - want).abs() < 1e-6, "bbox edge {got} != {want}");
    }
}

#[test]
fn aggregation_resolution_floor_excludes_finer_partitions() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.01, &["RGB"]), ring(0.0, 0.0, 1.0, 1.0));
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(2.0, 0.0, 3.0, 1.0));

    let f = filter(vec![(
        None,
        ring(-1.0, -1.0, 4.0, 2.0),
        FilterProperties {
            min_resolution_deg: None,
            max_resolution_deg: Some(0.015),
        },
    )]);

    let result =
        aggregate(&c, Some(&f), &AggregationConfig::default().with_smoothing(false)).unwrap();
    // Only the 0.02 partition passes the floor.
    assert_eq!(result.max_resolution_deg, 0.02);
    assert_eq!(result.min_resolution_deg, 0.02);
}

#[test]
fn aggregation_of_empty_subset_is_an_error() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(0.0, 0.0, 1.0, 1.0));

    let disjoint = filter(vec![(
        None,
        ring(50.0, 50.0, 51.0, 51.0),
        FilterProperties::default(),
    )]);
    assert!(matches!(
        aggregate(&c, Some(&disjoint), &AggregationConfig::default()),
        Err(QueryError::NoData)
    ));
}

#[test]
fn smoothing_collapse_falls_back_to_the_raw_union() {
    let mut c = collection();
    add_partition(&mut c, metadata(0.02, &["RGB"]), ring(0.0, 0.0, 0.001, 0.001));

    // A negative buffer distance erodes the tiny square to nothing in the
    // first pass; the pipeline must fall back to the unsmoothed union.
    let config = AggregationConfig::default().with_smoothing_buffer_deg(-0.01);
    let result = aggregate(&c, None, &config).unwrap();
    let area = result.footprint.to_polygon().unwrap().unsigned_area();
    assert!((area - 1e-6).abs() < 1e-12);
}
