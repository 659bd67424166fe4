//! Detection and removal of leaked map-service place identifiers (`ChIJ...`).

use once_cell::sync::Lazy;
use regex::Regex;

static PLACE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ChI[a-zA-Z0-9_-]+").expect("place id pattern is valid"));
static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

/// Whether the text carries a place identifier.
pub fn contains_place_id(text: &str) -> bool {
    PLACE_ID_RE.is_match(text)
}

/// Remove every place identifier, collapsing the gaps left behind.
/// Clean text comes back unchanged.
pub fn scrub_place_ids(text: &str) -> String {
    if !contains_place_id(text) {
        return text.to_string();
    }
    let removed = PLACE_ID_RE.replace_all(text, " ");
    WHITESPACE_RUN_RE.replace_all(&removed, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_place_ids() {
        assert!(contains_place_id("Great service ChIJabc123XYZ"));
        assert!(contains_place_id("ChIJxyz987"));
        assert!(contains_place_id("id: ChIJ_a-b"));
        assert!(!contains_place_id("Chicago area provider"));
        assert!(!contains_place_id("ChI"));
        assert!(!contains_place_id(""));
    }

    #[test]
    fn test_scrub_removes_every_identifier() {
        let scrubbed = scrub_place_ids("Mobile draws ChIJabc123 in Austin ChIJdef-456 daily");
        assert_eq!(scrubbed, "Mobile draws in Austin daily");
        assert!(!contains_place_id(&scrubbed));
    }

    #[test]
    fn test_scrub_leaves_clean_text_alone() {
        let text = "  Spacing  is kept when nothing matches ";
        assert_eq!(scrub_place_ids(text), text);
    }

    #[test]
    fn test_scrub_of_bare_identifier_is_empty() {
        assert_eq!(scrub_place_ids("ChIJxyz987"), "");
    }
}
