//! Content-addressed cache keys.
//!
//! A key is the BLAKE3 digest of `text|x|y|version`. Identical inputs always
//! give the identical key; changing any input changes it. No salt, no state.

use tonegrid_types::Coordinate;

/// 32-byte digest identifying one (text, coordinate, version) request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Hash the canonical concatenation of the request inputs.
    pub fn build(text: &str, coord: Coordinate, version: &str) -> Self {
        let canonical = format!("{}|{}|{}|{}", text, coord.x(), coord.y(), version);
        Self(*blake3::hash(canonical.as_bytes()).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, for logs.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CacheKey({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: i64, y: i64) -> Coordinate {
        Coordinate::new(x, y).unwrap()
    }

    #[test]
    fn test_deterministic() {
        let a = CacheKey::build("Hello world", coord(-1, -1), "1.0.0");
        let b = CacheKey::build("Hello world", coord(-1, -1), "1.0.0");
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn test_each_input_changes_key() {
        let base = CacheKey::build("Hello world", coord(0, 0), "1.0.0");
        assert_ne!(base, CacheKey::build("Hello world!", coord(0, 0), "1.0.0"));
        assert_ne!(base, CacheKey::build("Hello world", coord(1, 0), "1.0.0"));
        assert_ne!(base, CacheKey::build("Hello world", coord(0, -1), "1.0.0"));
        assert_ne!(base, CacheKey::build("Hello world", coord(0, 0), "1.0.1"));
    }

    #[test]
    fn test_no_collisions_across_grid() {
        let mut seen = std::collections::HashSet::new();
        for text in ["", "a", "Hello world", "Line 1\nLine 2"] {
            for c in Coordinate::all() {
                for version in ["1.0.0", "2.0.0"] {
                    assert!(seen.insert(CacheKey::build(text, c, version)));
                }
            }
        }
        assert_eq!(seen.len(), 4 * 9 * 2);
    }

    #[test]
    fn test_matches_blake3_of_canonical_string() {
        let key = CacheKey::build("abc", coord(-1, 1), "1.0.0");
        let expected = blake3::hash(b"abc|-1|1|1.0.0");
        assert_eq!(key.as_bytes(), expected.as_bytes());
    }
}
