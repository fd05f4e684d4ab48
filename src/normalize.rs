//! Centralized string normalization for card attributes and filters.
//!
//! Every value that takes part in matching (titles, categories, tags, filter
//! input, query-string parameters) goes through the same normalization so both
//! sides of a comparison agree:
//!
//! - leading and trailing whitespace is trimmed
//! - letters are lowercased
//! - internal runs of whitespace collapse to a single space
//!
//! ## Lists
//!
//! Categories and tags arrive comma-joined (`"Web, Kiosk"`) or as lists of
//! such strings. [`clean_strings`] normalizes every piece, drops empties and
//! sorts the result ascending, which is the shape [`crate::filter::intersects`]
//! expects.

/// Tag value that marks a kiosk deep link.
pub const KIOSK_TAG: &str = "kiosk";

/// Prefix for kiosk tag variants (`kiosk-io`, `kiosk-booth-3`).
pub const KIOSK_TAG_PREFIX: &str = "kiosk-";

/// Normalize a single value: trim, lowercase, collapse whitespace.
///
/// - `"  Cloud "` → `"cloud"`
/// - `"Getting\n  Started"` → `"getting started"`
/// - `""` → `""`
pub fn normalize_value(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize an optional value, mapping empty results to `None`.
pub fn normalize_opt(value: Option<&str>) -> Option<String> {
    value.map(normalize_value).filter(|v| !v.is_empty())
}

/// Split a comma-joined attribute into its raw pieces.
pub fn split_list(joined: &str) -> impl Iterator<Item = &str> {
    joined.split(',')
}

/// Normalize every string, drop empties and sort ascending.
///
/// Duplicates are kept; matching is intersection-based so they never change
/// a result.
pub fn clean_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cleaned: Vec<String> = values
        .into_iter()
        .map(|v| normalize_value(v.as_ref()))
        .filter(|v| !v.is_empty())
        .collect();
    cleaned.sort();
    cleaned
}

/// Like [`clean_strings`], but every input may itself be comma-joined.
pub fn clean_joined<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pieces: Vec<String> = values
        .into_iter()
        .flat_map(|v| split_list(v.as_ref()).map(str::to_string).collect::<Vec<_>>())
        .collect();
    clean_strings(pieces)
}

/// Whether a normalized tag is a kiosk tag (`kiosk` or `kiosk-*`).
pub fn is_kiosk_tag(tag: &str) -> bool {
    tag == KIOSK_TAG || tag.starts_with(KIOSK_TAG_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_value("  Cloud "), "cloud");
    }

    #[test]
    fn normalize_collapses_internal_whitespace() {
        assert_eq!(normalize_value("Getting\n  Started\tFast"), "getting started fast");
    }

    #[test]
    fn normalize_empty_and_blank() {
        assert_eq!(normalize_value(""), "");
        assert_eq!(normalize_value("   \n"), "");
    }

    #[test]
    fn normalize_opt_maps_blank_to_none() {
        assert_eq!(normalize_opt(None), None);
        assert_eq!(normalize_opt(Some("  ")), None);
        assert_eq!(normalize_opt(Some(" Web ")), Some("web".to_string()));
    }

    #[test]
    fn clean_strings_sorts_and_drops_empties() {
        assert_eq!(
            clean_strings([" weB ", "", "Android", "  "]),
            vec!["android".to_string(), "web".to_string()]
        );
    }

    #[test]
    fn clean_strings_keeps_duplicates() {
        assert_eq!(clean_strings(["web", "Web"]), vec!["web", "web"]);
    }

    #[test]
    fn clean_joined_splits_commas() {
        assert_eq!(
            clean_joined(["Web, Kiosk", "android,"]),
            vec!["android", "kiosk", "web"]
        );
    }

    #[test]
    fn kiosk_tags_are_recognized() {
        assert!(is_kiosk_tag("kiosk"));
        assert!(is_kiosk_tag("kiosk-io18"));
        assert!(!is_kiosk_tag("kiosks"));
        assert!(!is_kiosk_tag("web"));
    }
}
