//! Geographic value types
//!
//! Points, validated point sets, and the aggregation result.

use serde::{Deserialize, Serialize};

/// Inclusive latitude range in degrees.
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

/// Inclusive longitude range in degrees.
pub const LNG_RANGE: (f64, f64) = (-180.0, 180.0);

// == Point ==
/// A single coordinate pair in degrees. Not range-checked on its own;
/// see [`PointSet`] for the validated form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both coordinates are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        lat_in_range(self.lat) && lng_in_range(self.lng)
    }
}

pub(crate) fn lat_in_range(lat: f64) -> bool {
    lat.is_finite() && lat >= LAT_RANGE.0 && lat <= LAT_RANGE.1
}

pub(crate) fn lng_in_range(lng: f64) -> bool {
    lng.is_finite() && lng >= LNG_RANGE.0 && lng <= LNG_RANGE.1
}

// == Point Set ==
/// A non-empty, validated sequence of points.
///
/// Only the validator constructs this type, so holding one proves every
/// point is finite and in range. Insertion order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PointSet(Vec<Point>);

impl PointSet {
    pub(crate) fn from_validated(points: Vec<Point>) -> Self {
        debug_assert!(!points.is_empty());
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated set; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// == Result Types ==
/// Arithmetic mean position of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lng: f64,
}

/// Axis-aligned lat/lng box. No antimeridian correction: `west <= east` always.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Centroid and bounds for one accepted point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    pub centroid: Centroid,
    pub bounds: Bounds,
}
