use sha1::{Digest, Sha1};

/// Prefix for synthesized school identifiers.
pub const SCHOOL_PREFIX: &str = "sch";
/// Prefix for synthesized board identifiers.
pub const BOARD_PREFIX: &str = "brd";

const DIGEST_LEN: usize = 10;

/// Return `existing` when non-blank, otherwise derive a stable identifier
/// from `source`.
///
/// The derived form is `{prefix}_{first 10 hex chars of sha1(source)}`
/// where `source` is trimmed and lowercased first; blank sources hash as
/// `"unknown"`.
pub fn synthesize_identifier(existing: &str, source: &str, prefix: &str) -> String {
    let existing = existing.trim();
    if !existing.is_empty() {
        return existing.to_string();
    }
    let base = source.trim().to_lowercase();
    let base = if base.is_empty() { "unknown" } else { base.as_str() };
    let digest = hex::encode(Sha1::digest(base.as_bytes()));
    format!("{prefix}_{}", &digest[..DIGEST_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_identifier_is_kept() {
        assert_eq!(synthesize_identifier("EXISTING", "x", SCHOOL_PREFIX), "EXISTING");
        assert_eq!(synthesize_identifier("  B-12 ", "x", BOARD_PREFIX), "B-12");
    }

    #[test]
    fn synthesized_identifier_is_stable() {
        let id = synthesize_identifier("", "Lincoln School", SCHOOL_PREFIX);
        assert!(id.starts_with("sch_"));
        assert_eq!(id.len(), 4 + DIGEST_LEN);
        assert_eq!(id, synthesize_identifier(" ", "  lincoln school ", SCHOOL_PREFIX));
        assert_ne!(id, synthesize_identifier("", "Lincoln School", BOARD_PREFIX));
    }

    #[test]
    fn digest_is_sha1_prefix_of_lowercased_source() {
        assert_eq!(
            synthesize_identifier("", "Lincoln School", SCHOOL_PREFIX),
            "sch_4f911408f5"
        );
        assert_eq!(synthesize_identifier("", "", BOARD_PREFIX), "brd_50d8b4a941");
    }

    #[test]
    fn blank_source_hashes_as_unknown() {
        assert_eq!(
            synthesize_identifier("", "   ", BOARD_PREFIX),
            synthesize_identifier("", "UNKNOWN", BOARD_PREFIX)
        );
    }
}
