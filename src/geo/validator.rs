//! Point Validator
//!
//! Schema-checks untrusted input into a [`PointSet`]. Pure, no I/O.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::point::{lat_in_range, lng_in_range, Point, PointSet};

/// Summary reported with every validation failure.
pub const VALIDATION_SUMMARY: &str =
    "The body must have 'points' as a non-empty array of objects with valid numeric 'lat' and 'lng'.";

// == Violation ==
/// One reason an input was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Index of the offending point, absent for body-level problems
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn body(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index: None,
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn point(index: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// == Validation Error ==
/// Every violation found in an input, not just the first.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn message(&self) -> &'static str {
        VALIDATION_SUMMARY
    }

    /// Indices of points with at least one violation, ascending and deduplicated.
    pub fn invalid_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.violations.iter().filter_map(|v| v.index).collect();
        indices.dedup();
        indices
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", VALIDATION_SUMMARY)?;
        for v in &self.violations {
            match v.index {
                Some(i) => write!(f, " [points[{}].{}: {}]", i, v.field, v.reason)?,
                None => write!(f, " [{}: {}]", v.field, v.reason)?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// == Entry Points ==
/// Parses and validates a raw request body (`{ "points": [...] }`).
pub fn parse_body(bytes: &[u8]) -> Result<PointSet, ValidationError> {
    let body: Value = serde_json::from_slice(bytes).map_err(|_| {
        ValidationError::new(vec![Violation::body("body", "must be a valid JSON object")])
    })?;
    validate_request(&body)
}

/// Validates a decoded request body, which must carry a `points` field.
pub fn validate_request(body: &Value) -> Result<PointSet, ValidationError> {
    match body.get("points") {
        Some(points) => validate(points),
        None => Err(ValidationError::new(vec![Violation::body(
            "points",
            "is required",
        )])),
    }
}

/// Validates a raw `points` value.
///
/// Rejects non-arrays, empty arrays, elements without numeric `lat`/`lng`,
/// and out-of-range coordinates. Unknown fields on a point are ignored.
pub fn validate(raw: &Value) -> Result<PointSet, ValidationError> {
    let items = raw.as_array().ok_or_else(|| {
        ValidationError::new(vec![Violation::body("points", "must be an array")])
    })?;

    if items.is_empty() {
        return Err(ValidationError::new(vec![Violation::body(
            "points",
            "must not be empty",
        )]));
    }

    let mut violations = Vec::new();
    let mut points = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            violations.push(Violation::point(index, "point", "must be an object"));
            continue;
        };

        let lat = coordinate(obj.get("lat"), index, "lat", lat_in_range, &mut violations);
        let lng = coordinate(obj.get("lng"), index, "lng", lng_in_range, &mut violations);

        if let (Some(lat), Some(lng)) = (lat, lng) {
            points.push(Point::new(lat, lng));
        }
    }

    if violations.is_empty() {
        Ok(PointSet::from_validated(points))
    } else {
        Err(ValidationError::new(violations))
    }
}

/// Validates already-typed points, e.g. parsed from user input fields.
pub fn check_points(points: &[Point]) -> Result<PointSet, ValidationError> {
    if points.is_empty() {
        return Err(ValidationError::new(vec![Violation::body(
            "points",
            "must not be empty",
        )]));
    }

    let mut violations = Vec::new();
    for (index, p) in points.iter().enumerate() {
        check_range(p.lat, index, "lat", lat_in_range, &mut violations);
        check_range(p.lng, index, "lng", lng_in_range, &mut violations);
    }

    if violations.is_empty() {
        Ok(PointSet::from_validated(points.to_vec()))
    } else {
        Err(ValidationError::new(violations))
    }
}

fn coordinate(
    value: Option<&Value>,
    index: usize,
    field: &str,
    in_range: fn(f64) -> bool,
    violations: &mut Vec<Violation>,
) -> Option<f64> {
    let value = match value {
        None | Some(Value::Null) => {
            violations.push(Violation::point(index, field, "is required"));
            return None;
        }
        Some(v) => v,
    };

    // Numeric strings like "10.0" are rejected on purpose.
    let Some(n) = value.as_f64() else {
        violations.push(Violation::point(index, field, "must be a number"));
        return None;
    };

    if check_range(n, index, field, in_range, violations) {
        Some(n)
    } else {
        None
    }
}

fn check_range(
    n: f64,
    index: usize,
    field: &str,
    in_range: fn(f64) -> bool,
    violations: &mut Vec<Violation>,
) -> bool {
    if !n.is_finite() {
        violations.push(Violation::point(index, field, "must be a finite number"));
        return false;
    }
    if !in_range(n) {
        let reason = match field {
            "lat" => "must be between -90 and 90",
            _ => "must be between -180 and 180",
        };
        violations.push(Violation::point(index, field, reason));
        return false;
    }
    true
}
