use once_cell::sync::Lazy;
use regex::Regex;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{6}$").expect("failed to compile timestamp regex")
});

static UNIQUE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("failed to compile unique id regex")
});

// Date, then either a capture time or a lowercase unique id, then an optional
// collision counter and an optional dot-free extension.
static CANONICAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2}_(?:\d{6}|[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})(?:-\d+)?(?:\.[^.]+)?$",
    )
    .expect("failed to compile canonical name regex")
});

/// `YYYY-MM-DD_HHMMSS`, as produced by a metadata probe.
pub fn is_timestamp(value: &str) -> bool {
    TIMESTAMP_RE.is_match(value)
}

/// Lowercase 8-4-4-4-12 hexadecimal layout.
pub fn is_unique_id(value: &str) -> bool {
    UNIQUE_ID_RE.is_match(value)
}

/// Whether a file name already follows one of the two naming schemes and
/// should be left alone.
pub fn is_canonical(file_name: &str) -> bool {
    CANONICAL_RE.is_match(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_requires_exact_shape() {
        assert!(is_timestamp("2024-03-15_143022"));
        assert!(!is_timestamp("2024-03-15 143022"));
        assert!(!is_timestamp("2024-03-15_14302"));
        assert!(!is_timestamp("2024:03:15 14:30:22"));
        assert!(!is_timestamp(" 2024-03-15_143022"));
    }

    #[test]
    fn unique_id_rejects_uppercase_and_wrong_grouping() {
        assert!(is_unique_id("0f8fad5b-d9cb-469f-a165-70867728950e"));
        assert!(!is_unique_id("0F8FAD5B-D9CB-469F-A165-70867728950E"));
        assert!(!is_unique_id("0f8fad5bd9cb469fa16570867728950e"));
        assert!(!is_unique_id("0f8fad5b-d9cb-469f-a165-70867728950"));
    }

    #[test]
    fn canonical_accepts_both_forms() {
        assert!(is_canonical("2024-03-15_143022.mp4"));
        assert!(is_canonical("2024-03-15_143022-1.mp4"));
        assert!(is_canonical("2024-03-15_143022-12.JPG"));
        assert!(is_canonical("2024-03-15_0f8fad5b-d9cb-469f-a165-70867728950e.mp4"));
        assert!(is_canonical("2024-03-15_143022"));
    }

    #[test]
    fn canonical_rejects_near_misses() {
        assert!(!is_canonical("clip.mp4"));
        assert!(!is_canonical("2024-03-15_143022_1.mp4"));
        assert!(!is_canonical("2024-03-15_0F8FAD5B-D9CB-469F-A165-70867728950E.mp4"));
        assert!(!is_canonical("IMG_2024-03-15_143022.mp4"));
        assert!(!is_canonical("2024-03-15_143022.tar.gz"));
        assert!(!is_canonical("2024-03-15_143022-.mp4"));
    }
}
