//! Tag normalization, categories, wildcard patterns, and automatic
//! dimension tags.
//!
//! This module lives in `core` (zero internal deps) so the same
//! normalization rules apply on every write path and inside query
//! evaluation.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Tag category. Stored as a lowercase string column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    #[default]
    General,
    Artist,
    Character,
    Copyright,
    Meta,
}

/// All valid tag category strings.
const VALID_CATEGORY_STRINGS: &[&str] = &["general", "artist", "character", "copyright", "meta"];

impl TagCategory {
    /// Return the category as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Artist => "artist",
            Self::Character => "character",
            Self::Copyright => "copyright",
            Self::Meta => "meta",
        }
    }

    /// Parse a category from a string slice.
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        match s {
            "general" => Ok(Self::General),
            "artist" => Ok(Self::Artist),
            "character" => Ok(Self::Character),
            "copyright" => Ok(Self::Copyright),
            "meta" => Ok(Self::Meta),
            _ => Err(QueryError::Resolution(format!(
                "invalid tag category '{s}'; must be one of: {}",
                VALID_CATEGORY_STRINGS.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a single tag name: lowercase, no surrounding whitespace.
///
/// Individual tags are space-free by construction (a tag string is split
/// on whitespace before this is applied).
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalize a whitespace-separated tag string into a sorted, deduplicated
/// list of lowercase tags.
pub fn normalize_tag_string(tag_string: &str) -> Vec<String> {
    let mut tags: Vec<String> = tag_string
        .split_whitespace()
        .map(normalize_tag)
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Join a normalized tag list back into the canonical tag-string form.
pub fn join_tag_string(tags: &[String]) -> String {
    tags.join(" ")
}

// ---------------------------------------------------------------------------
// Wildcards
// ---------------------------------------------------------------------------

/// Whether a term is a wildcard pattern (contains `*`).
pub fn is_wildcard(term: &str) -> bool {
    term.contains('*')
}

/// Match a tag name against a `*` glob pattern.
///
/// Only `*` (zero or more characters) is special; patterns are matched as a
/// whole, so `*girl*` matches `1girl` but `girl*` does not.
pub fn wildcard_matches(pattern: &str, name: &str) -> bool {
    fn inner(p: &[u8], n: &[u8]) -> bool {
        match (p.first(), n.first()) {
            (None, None) => true,
            (Some(b'*'), _) => inner(&p[1..], n) || (!n.is_empty() && inner(p, &n[1..])),
            (Some(pc), Some(nc)) if pc == nc => inner(&p[1..], &n[1..]),
            _ => false,
        }
    }
    inner(pattern.as_bytes(), name.as_bytes())
}

/// Convert a `*` glob pattern to a SQL LIKE pattern, escaping LIKE
/// metacharacters in the literal parts.
pub fn wildcard_to_like(pattern: &str) -> String {
    let mut like = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '*' => like.push('%'),
            '%' | '_' | '\\' => {
                like.push('\\');
                like.push(c);
            }
            _ => like.push(c),
        }
    }
    like
}

// ---------------------------------------------------------------------------
// Automatic dimension tags
// ---------------------------------------------------------------------------

/// Tags derived from pixel dimensions. These are recomputed, never copied,
/// when tags move between posts of different sizes.
pub const DIMENSION_TAGS: &[&str] = &["lowres", "highres", "absurdres", "incredibly_absurdres"];

/// Compute the dimension tags for a post of the given pixel size.
pub fn dimension_tags(width: i32, height: i32) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if width >= 10_000 || height >= 10_000 {
        tags.push("incredibly_absurdres");
    }
    if width >= 3200 || height >= 2400 {
        tags.push("absurdres");
    }
    if width >= 1600 || height >= 1200 {
        tags.push("highres");
    }
    if width <= 500 && height <= 500 {
        tags.push("lowres");
    }
    tags
}

/// Replace any existing dimension tags in `tags` with the ones derived from
/// the given size. Returns a sorted, deduplicated list.
pub fn recompute_dimension_tags(tags: &[String], width: i32, height: i32) -> Vec<String> {
    let mut out: Vec<String> = tags
        .iter()
        .filter(|t| !DIMENSION_TAGS.contains(&t.as_str()))
        .cloned()
        .collect();
    out.extend(dimension_tags(width, height).iter().map(|t| t.to_string()));
    out.sort();
    out.dedup();
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- normalization --------------------------------------------------------

    #[test]
    fn normalize_lowercases_and_dedups() {
        assert_eq!(
            normalize_tag_string("Solo  1GIRL solo"),
            vec!["1girl".to_string(), "solo".to_string()]
        );
    }

    #[test]
    fn normalize_empty_string_is_empty() {
        assert!(normalize_tag_string("   ").is_empty());
    }

    #[test]
    fn join_round_trips_canonical_form() {
        let tags = normalize_tag_string("b a");
        assert_eq!(join_tag_string(&tags), "a b");
    }

    // -- categories -----------------------------------------------------------

    #[test]
    fn category_parse_round_trips() {
        for s in ["general", "artist", "character", "copyright", "meta"] {
            assert_eq!(TagCategory::parse(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn category_parse_rejects_unknown() {
        assert!(TagCategory::parse("pool").is_err());
    }

    // -- wildcards ------------------------------------------------------------

    #[test]
    fn wildcard_matches_infix() {
        assert!(wildcard_matches("*girl*", "1girl"));
        assert!(wildcard_matches("*girl*", "girl"));
        assert!(!wildcard_matches("girl*", "1girl"));
    }

    #[test]
    fn wildcard_star_matches_everything() {
        assert!(wildcard_matches("*", "anything"));
        assert!(wildcard_matches("*", ""));
    }

    #[test]
    fn wildcard_to_like_escapes_metacharacters() {
        assert_eq!(wildcard_to_like("*girl*"), "%girl%");
        assert_eq!(wildcard_to_like("100%_a"), "100\\%\\_a");
    }

    // -- dimension tags -------------------------------------------------------

    #[test]
    fn small_post_is_lowres() {
        assert_eq!(dimension_tags(200, 200), vec!["lowres"]);
    }

    #[test]
    fn large_post_is_highres_and_absurdres() {
        assert_eq!(dimension_tags(3200, 2400), vec!["absurdres", "highres"]);
    }

    #[test]
    fn midsize_post_has_no_dimension_tags() {
        assert!(dimension_tags(800, 600).is_empty());
    }

    #[test]
    fn recompute_replaces_stale_dimension_tags() {
        let tags = vec!["highres".to_string(), "solo".to_string()];
        assert_eq!(
            recompute_dimension_tags(&tags, 200, 200),
            vec!["lowres".to_string(), "solo".to_string()]
        );
    }
}
