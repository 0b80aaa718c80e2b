//! Cache key derivation
//!
//! Canonical, order-independent digest of a point set.

use std::fmt;

use sha2::{Digest, Sha256};

use super::point::PointSet;

/// Decimal places kept when canonicalizing coordinates (sub-millimetre).
pub const KEY_PRECISION: usize = 9;

const KEY_VERSION: &str = "v1";

/// Hex SHA-256 of a normalized point set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a point set.
    ///
    /// Each point is rendered with fixed precision, negative zero folded into
    /// zero, and the rendered points sorted, so structurally equal sets and
    /// permutations of the same points share a key.
    pub fn for_points(points: &PointSet) -> Self {
        let mut rendered: Vec<String> = points
            .iter()
            .map(|p| {
                format!(
                    "{:.prec$},{:.prec$}",
                    normalize(p.lat),
                    normalize(p.lng),
                    prec = KEY_PRECISION
                )
            })
            .collect();
        rendered.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(KEY_VERSION);
        hasher.update("|");
        hasher.update(rendered.join(";"));
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

fn normalize(v: f64) -> f64 {
    // Anything that rounds to zero renders as "0.000000000", never "-0.000000000".
    let rounded = format!("{:.prec$}", v, prec = KEY_PRECISION)
        .parse::<f64>()
        .unwrap_or(v);
    if rounded == 0.0 {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{check_points, Point};

    fn key(points: &[(f64, f64)]) -> CacheKey {
        let points: Vec<Point> = points.iter().map(|&(lat, lng)| Point::new(lat, lng)).collect();
        CacheKey::for_points(&check_points(&points).unwrap())
    }

    #[test]
    fn test_equal_sets_share_key() {
        assert_eq!(key(&[(1.0, 2.0), (3.0, 4.0)]), key(&[(1.0, 2.0), (3.0, 4.0)]));
    }

    #[test]
    fn test_permutation_shares_key() {
        assert_eq!(key(&[(1.0, 2.0), (3.0, 4.0)]), key(&[(3.0, 4.0), (1.0, 2.0)]));
    }

    #[test]
    fn test_different_sets_differ() {
        assert_ne!(key(&[(1.0, 2.0)]), key(&[(2.0, 1.0)]));
        assert_ne!(key(&[(1.0, 2.0)]), key(&[(1.0, 2.0), (1.0, 2.0)]));
    }

    #[test]
    fn test_negative_zero_normalized() {
        assert_eq!(key(&[(-0.0, 0.0)]), key(&[(0.0, -0.0)]));
        assert_eq!(key(&[(-1e-12, 5.0)]), key(&[(0.0, 5.0)]));
    }

    #[test]
    fn test_insignificant_digits_ignored() {
        assert_eq!(key(&[(40.7128, -74.006)]), key(&[(40.712_800_000_000_1, -74.006)]));
    }

    #[test]
    fn test_key_is_hex_sha256() {
        let k = key(&[(1.0, 2.0)]);
        assert_eq!(k.as_str().len(), 64);
        assert!(k.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
