//! Configuration types for overlap resolution and aggregation.

use serde::{Deserialize, Serialize};

/// Configuration for the overlap resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum area (square degrees) for a difference remainder to survive.
    ///
    /// Applies only to geometry produced by a difference operation; raw parts
    /// that never entered a difference are inserted verbatim regardless of
    /// their own area. Default: 1e-10 (roughly one square meter at the
    /// equator).
    pub min_area_deg2: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_area_deg2: 1e-10,
        }
    }
}

impl ResolverConfig {
    /// Set the minimum-area threshold.
    pub fn with_min_area_deg2(mut self, min_area_deg2: f64) -> Self {
        self.min_area_deg2 = min_area_deg2;
        self
    }
}

/// Configuration for the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Apply the buffer-out/buffer-in smoothing pass to the union footprint.
    pub smoothing: bool,

    /// Buffer distance (degrees) used by the smoothing pass.
    ///
    /// The union is buffered outward then inward by this distance to dissolve
    /// degenerate slivers introduced by repeated differencing.
    /// Default: 5e-6 (roughly half a meter at the equator).
    pub smoothing_buffer_deg: f64,

    /// Decimal digits kept when serializing the aggregation footprint.
    pub precision_digits: u32,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            smoothing: true,
            smoothing_buffer_deg: 5e-6,
            precision_digits: 12,
        }
    }
}

impl AggregationConfig {
    /// Enable or disable footprint smoothing.
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set the smoothing buffer distance in degrees.
    pub fn with_smoothing_buffer_deg(mut self, deg: f64) -> Self {
        self.smoothing_buffer_deg = deg;
        self
    }

    /// Set the footprint serialization precision.
    pub fn with_precision_digits(mut self, digits: u32) -> Self {
        self.precision_digits = digits;
        self
    }
}
