//! Geometry helpers shared by the resolver and the query engines.
//!
//! Footprints are planar EPSG:4326 polygons; all area and intersection
//! computation happens in degree space without reprojection. The heavy
//! lifting (boolean operations, validity) is delegated to the `geo` kernel.

use crate::error::{CoreError, Result};
use geo::{Area, BooleanOps, BoundingRect, Intersects, MapCoords, Validation};
use geo_types::{MultiPolygon, Polygon, Rect};

/// Valid longitude range for stored footprints.
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);
/// Valid latitude range for stored footprints.
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

/// Validate a footprint polygon against the storage rules.
///
/// The exterior ring must be closed with at least three distinct vertices,
/// every coordinate must fall within [-180,-90,180,90], and the polygon must
/// pass the kernel's validity check (no self-intersection, correctly nested
/// interior rings).
pub fn validate_footprint(footprint: &Polygon<f64>) -> Result<()> {
    let exterior = footprint.exterior();
    let coords = &exterior.0;

    if coords.len() < 4 {
        return Err(CoreError::invalid_footprint(format!(
            "exterior ring has {} coordinates, need at least 4 (closed triangle)",
            coords.len()
        )));
    }
    if coords.first() != coords.last() {
        return Err(CoreError::invalid_footprint("exterior ring is not closed"));
    }

    for ring in std::iter::once(exterior).chain(footprint.interiors()) {
        for c in &ring.0 {
            if c.x < LON_RANGE.0 || c.x > LON_RANGE.1 || c.y < LAT_RANGE.0 || c.y > LAT_RANGE.1 {
                return Err(CoreError::invalid_footprint(format!(
                    "coordinate ({}, {}) outside [-180,-90,180,90]",
                    c.x, c.y
                )));
            }
        }
    }

    if !footprint.is_valid() {
        return Err(CoreError::invalid_footprint(
            "polygon failed validity check (self-intersection or malformed rings)",
        ));
    }

    Ok(())
}

/// Area of the intersection of two polygons, in square degrees.
///
/// Returns 0.0 when the polygons are disjoint or only touch along a
/// boundary, so a positive result means genuine overlap.
pub fn intersection_area(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    if !a.intersects(b) {
        return 0.0;
    }
    a.intersection(b).unsigned_area()
}

/// Explode a multi-polygon into its maximal simple-polygon components.
///
/// Degenerate zero-area components are dropped.
pub fn explode(geometry: MultiPolygon<f64>) -> Vec<Polygon<f64>> {
    geometry
        .0
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .collect()
}

/// Bounding rectangle of a polygon.
///
/// Footprints always have at least one ring, so this cannot fail for a
/// validated footprint.
pub fn footprint_rect(footprint: &Polygon<f64>) -> Option<Rect<f64>> {
    footprint.bounding_rect()
}

/// Bounding box string `"minX,minY,maxX,maxY"` of a polygon.
pub fn bbox_string(footprint: &Polygon<f64>) -> Option<String> {
    footprint.bounding_rect().map(|r| {
        format!(
            "{},{},{},{}",
            r.min().x,
            r.min().y,
            r.max().x,
            r.max().y
        )
    })
}

/// Round every coordinate of a polygon to a fixed number of decimal digits.
///
/// Used when serializing aggregation footprints with bounded precision.
pub fn round_polygon(footprint: &Polygon<f64>, digits: u32) -> Polygon<f64> {
    let factor = 10f64.powi(digits as i32);
    let round = |v: f64| (v * factor).round() / factor;
    footprint.map_coords(|c| geo_types::Coord {
        x: round(c.x),
        y: round(c.y),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, LineString};

    pub(crate) fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                coord! { x: x0, y: y0 },
                coord! { x: x1, y: y0 },
                coord! { x: x1, y: y1 },
                coord! { x: x0, y: y1 },
                coord! { x: x0, y: y0 },
            ]),
            vec![],
        )
    }

    #[test]
    fn valid_square_passes() {
        assert!(validate_footprint(&square(0.0, 0.0, 1.0, 1.0)).is_ok());
    }

    #[test]
    fn degenerate_ring_fails() {
        // Polygon::new closes rings, so a two-coordinate input stays under
        // the four-coordinate minimum.
        let tiny = Polygon::new(
            LineString::from(vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }]),
            vec![],
        );
        assert!(validate_footprint(&tiny).is_err());
    }

    #[test]
    fn out_of_bounds_fails() {
        assert!(validate_footprint(&square(179.0, 0.0, 181.0, 1.0)).is_err());
        assert!(validate_footprint(&square(0.0, -91.0, 1.0, 0.0)).is_err());
    }

    #[test]
    fn self_intersecting_fails() {
        let bowtie = Polygon::new(
            LineString::from(vec![
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 2.0, y: 2.0 },
                coord! { x: 2.0, y: 0.0 },
                coord! { x: 0.0, y: 2.0 },
                coord! { x: 0.0, y: 0.0 },
            ]),
            vec![],
        );
        assert!(validate_footprint(&bowtie).is_err());
    }

    #[test]
    fn touching_squares_have_zero_intersection_area() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(1.0, 0.0, 2.0, 1.0);
        assert_eq!(intersection_area(&a, &b), 0.0);
    }

    #[test]
    fn overlapping_squares_have_positive_intersection_area() {
        let a = square(0.0, 0.0, 2.0, 2.0);
        let b = square(1.0, 0.0, 3.0, 2.0);
        let area = intersection_area(&a, &b);
        assert!((area - 2.0).abs() < 1e-9);
    }

    #[test]
    fn bbox_string_format() {
        let s = bbox_string(&square(-1.5, 2.0, 3.0, 4.25)).unwrap();
        assert_eq!(s, "-1.5,2,3,4.25");
    }

    #[test]
    fn round_polygon_truncates_noise() {
        let p = square(0.1234567890123456, 0.0, 1.0, 1.0);
        let rounded = round_polygon(&p, 6);
        let x = rounded.exterior().0[0].x;
        assert!((x - 0.123457).abs() < 1e-12);
    }
}
