//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// Parse a tag-sourced MusicBrainz ID.
///
/// Tag values are frequently padded or upper-cased by editors, so the input
/// is trimmed and parsed case-insensitively. Returns None for anything that
/// is not a well-formed UUID, including the all-zero placeholder some
/// taggers write.
pub fn parse_mbid(s: &str) -> Option<Uuid> {
    let parsed = Uuid::parse_str(s.trim()).ok()?;
    if parsed.is_nil() {
        return None;
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mbid_valid() {
        let mbid = parse_mbid("b1a9c0e9-d987-4042-ae91-78d6a3267d69").unwrap();
        assert_eq!(mbid.to_string(), "b1a9c0e9-d987-4042-ae91-78d6a3267d69");
    }

    #[test]
    fn test_parse_mbid_padded_and_uppercase() {
        assert!(parse_mbid("  B1A9C0E9-D987-4042-AE91-78D6A3267D69 ").is_some());
    }

    #[test]
    fn test_parse_mbid_rejects_garbage() {
        assert!(parse_mbid("not-a-uuid").is_none());
        assert!(parse_mbid("").is_none());
    }

    #[test]
    fn test_parse_mbid_rejects_nil_placeholder() {
        assert!(parse_mbid("00000000-0000-0000-0000-000000000000").is_none());
    }
}
