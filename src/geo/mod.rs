//! Geo Module
//!
//! Point validation, centroid/bounds aggregation, and cache key derivation.

mod aggregate;
mod key;
mod point;
mod validator;


// Re-export public types
pub use aggregate::aggregate;
pub use key::{CacheKey, KEY_PRECISION};
pub use point::{Bounds, Centroid, GeoResult, Point, PointSet, LAT_RANGE, LNG_RANGE};
pub use validator::{
    check_points, parse_body, validate, validate_request, ValidationError, Violation,
    VALIDATION_SUMMARY,
};
