//! Aggregation Engine
//!
//! Reduces a validated point set to its centroid and bounding box.

use super::point::{Bounds, Centroid, GeoResult, PointSet};

/// Computes centroid and bounds for a validated, non-empty point set.
///
/// Coordinates are summed in sorted order so that any permutation of the
/// same points yields a bit-identical centroid. Returns None only for an
/// empty set, which the validator never produces.
pub fn aggregate(points: &PointSet) -> Option<GeoResult> {
    if points.is_empty() {
        return None;
    }

    let mut lats: Vec<f64> = points.iter().map(|p| p.lat).collect();
    let mut lngs: Vec<f64> = points.iter().map(|p| p.lng).collect();
    lats.sort_by(f64::total_cmp);
    lngs.sort_by(f64::total_cmp);

    let n = lats.len() as f64;
    let centroid = Centroid {
        lat: lats.iter().sum::<f64>() / n,
        lng: lngs.iter().sum::<f64>() / n,
    };

    // Sorted, so the extremes are at the ends.
    let bounds = Bounds {
        north: lats[lats.len() - 1],
        south: lats[0],
        east: lngs[lngs.len() - 1],
        west: lngs[0],
    };

    Some(GeoResult { centroid, bounds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{check_points, Point};

    fn set(points: &[(f64, f64)]) -> PointSet {
        let points: Vec<Point> = points.iter().map(|&(lat, lng)| Point::new(lat, lng)).collect();
        check_points(&points).unwrap()
    }

    #[test]
    fn test_new_york_los_angeles() {
        let result = aggregate(&set(&[(40.7128, -74.0060), (34.0522, -118.2437)])).unwrap();

        assert!((result.centroid.lat - 37.3825).abs() < 1e-9);
        assert!((result.centroid.lng - -96.12485).abs() < 1e-9);
        assert_eq!(
            result.bounds,
            Bounds {
                north: 40.7128,
                south: 34.0522,
                east: -74.0060,
                west: -118.2437,
            }
        );
    }

    #[test]
    fn test_single_point_collapses() {
        let result = aggregate(&set(&[(10.0, 20.0)])).unwrap();
        assert_eq!(result.centroid, Centroid { lat: 10.0, lng: 20.0 });
        assert_eq!(
            result.bounds,
            Bounds {
                north: 10.0,
                south: 10.0,
                east: 20.0,
                west: 20.0,
            }
        );
    }

    #[test]
    fn test_no_dateline_correction() {
        let result = aggregate(&set(&[(0.0, 179.0), (0.0, -179.0)])).unwrap();
        assert_eq!(result.bounds.west, -179.0);
        assert_eq!(result.bounds.east, 179.0);
        assert_eq!(result.centroid.lng, 0.0);
    }
}
