//! Tag-query parsing.
//!
//! Turns a raw search string into an immutable [`ParsedQuery`]. Parsing is
//! pure: no catalogue lookups happen here. Wildcards and saved-search
//! references are recorded as-is and materialized later by
//! [`crate::resolve`].

use crate::config::SearchConfig;
use crate::error::{QueryError, QueryResult};
use crate::tags::{is_wildcard, normalize_tag};

// ---------------------------------------------------------------------------
// Directive types
// ---------------------------------------------------------------------------

/// Result ordering strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Reverse-chronological by creation (newest first).
    #[default]
    RecencyDesc,
    /// Seeded pseudo-random ordering.
    Random,
}

/// Deletion-state filter selected by the `status:` metatag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Hide deleted posts (no `status:` metatag given).
    #[default]
    Hidden,
    /// Only deleted posts (`status:deleted`).
    Deleted,
    /// Both deleted and non-deleted posts (`status:any`).
    Any,
}

/// A saved-search reference from the `search:` metatag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedSearchRef {
    /// `search:all` — union of every saved search owned by the principal.
    All,
    /// `search:<label>` — a single labelled saved search.
    Label(String),
}

// ---------------------------------------------------------------------------
// Parsed query
// ---------------------------------------------------------------------------

/// Structured form of a search string. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    /// Bare terms; every one must be present (AND).
    pub required: Vec<String>,
    /// `-tag` terms; none may be present.
    pub excluded: Vec<String>,
    /// `~tag` terms; at least one must be present when the group is
    /// non-empty (OR).
    pub optional: Vec<String>,
    /// `*`-containing patterns, expanded at resolution time.
    pub wildcards: Vec<String>,
    /// `search:` references, expanded at resolution time.
    pub saved_searches: Vec<SavedSearchRef>,
    /// Deletion-state filter.
    pub status: StatusFilter,
    /// `md5:` exact-lookup checksum, if given.
    pub md5: Option<String>,
    /// Ordering directive.
    pub order: Order,
}

impl ParsedQuery {
    /// Number of literal tag terms, the quantity bounded by
    /// [`SearchConfig::max_tag_terms`]. Metatags do not count; wildcard and
    /// saved-search *expansions* do not count either, only the literal
    /// terms as written.
    pub fn tag_term_count(&self) -> usize {
        self.required.len() + self.excluded.len() + self.optional.len() + self.wildcards.len()
    }

    /// Whether the query needs saved-search expansion.
    pub fn has_saved_searches(&self) -> bool {
        !self.saved_searches.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Metatag keys this engine understands. Any other `key:value` term is an
/// ordinary tag (tags may legitimately contain colons).
const METATAG_KEYS: &[&str] = &["status", "md5", "order", "search"];

/// Parse a raw search string.
///
/// Fails fast with [`QueryError::TooManyTags`] when the literal tag-term
/// count exceeds `config.max_tag_terms`, before any catalogue work.
pub fn parse(query: &str, config: &SearchConfig) -> QueryResult<ParsedQuery> {
    if query.chars().count() > config.max_query_length {
        return Err(QueryError::Resolution(format!(
            "query is longer than {} characters",
            config.max_query_length
        )));
    }

    let mut parsed = ParsedQuery::default();

    for raw in query.split_whitespace() {
        let term = normalize_tag(raw);
        if term.is_empty() {
            continue;
        }

        if let Some((key, value)) = split_metatag(&term) {
            apply_metatag(&mut parsed, key, value)?;
            continue;
        }

        match term.as_bytes()[0] {
            b'-' if term.len() > 1 => parsed.excluded.push(term[1..].to_string()),
            b'~' if term.len() > 1 => parsed.optional.push(term[1..].to_string()),
            _ if is_wildcard(&term) => parsed.wildcards.push(term),
            _ => parsed.required.push(term),
        }
    }

    let count = parsed.tag_term_count();
    if count > config.max_tag_terms {
        return Err(QueryError::TooManyTags {
            count,
            max: config.max_tag_terms,
        });
    }

    Ok(parsed)
}

/// Split a term into a known metatag key and its value.
fn split_metatag(term: &str) -> Option<(&str, &str)> {
    let (key, value) = term.split_once(':')?;
    if METATAG_KEYS.contains(&key) && !value.is_empty() {
        Some((key, value))
    } else {
        None
    }
}

fn apply_metatag(parsed: &mut ParsedQuery, key: &str, value: &str) -> QueryResult<()> {
    match key {
        "status" => {
            parsed.status = match value {
                "deleted" => StatusFilter::Deleted,
                "any" => StatusFilter::Any,
                _ => {
                    return Err(QueryError::Resolution(format!(
                        "unknown status filter '{value}'"
                    )))
                }
            };
        }
        "md5" => parsed.md5 = Some(value.to_string()),
        "order" => {
            parsed.order = match value {
                "random" => Order::Random,
                _ => {
                    return Err(QueryError::Resolution(format!(
                        "unsupported ordering '{value}'"
                    )))
                }
            };
        }
        "search" => {
            let reference = if value == "all" {
                SavedSearchRef::All
            } else {
                SavedSearchRef::Label(value.to_string())
            };
            parsed.saved_searches.push(reference);
        }
        _ => unreachable!("split_metatag only yields known keys"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn cfg() -> SearchConfig {
        SearchConfig::default()
    }

    // -- classification -------------------------------------------------------

    #[test]
    fn bare_tags_are_required() {
        let q = parse("1girl solo", &cfg()).unwrap();
        assert_eq!(q.required, vec!["1girl", "solo"]);
        assert!(q.excluded.is_empty());
    }

    #[test]
    fn minus_prefix_excludes() {
        let q = parse("solo -comic", &cfg()).unwrap();
        assert_eq!(q.required, vec!["solo"]);
        assert_eq!(q.excluded, vec!["comic"]);
    }

    #[test]
    fn tilde_prefix_is_optional_group() {
        let q = parse("~cat ~dog", &cfg()).unwrap();
        assert_eq!(q.optional, vec!["cat", "dog"]);
    }

    #[test]
    fn star_terms_are_wildcards() {
        let q = parse("*girl*", &cfg()).unwrap();
        assert_eq!(q.wildcards, vec!["*girl*"]);
        assert!(q.required.is_empty());
    }

    #[test]
    fn terms_are_lowercased() {
        let q = parse("Solo", &cfg()).unwrap();
        assert_eq!(q.required, vec!["solo"]);
    }

    // -- metatags -------------------------------------------------------------

    #[test]
    fn status_deleted_sets_filter() {
        let q = parse("status:deleted", &cfg()).unwrap();
        assert_eq!(q.status, StatusFilter::Deleted);
        assert_eq!(q.tag_term_count(), 0);
    }

    #[test]
    fn unknown_status_is_resolution_error() {
        assert_matches!(parse("status:frozen", &cfg()), Err(QueryError::Resolution(_)));
    }

    #[test]
    fn md5_metatag_is_captured() {
        let q = parse("md5:abc123", &cfg()).unwrap();
        assert_eq!(q.md5.as_deref(), Some("abc123"));
    }

    #[test]
    fn order_random_selects_random() {
        let q = parse("order:random", &cfg()).unwrap();
        assert_eq!(q.order, Order::Random);
    }

    #[test]
    fn unsupported_order_is_resolution_error() {
        assert_matches!(parse("order:score", &cfg()), Err(QueryError::Resolution(_)));
    }

    #[test]
    fn search_all_and_label_references() {
        let q = parse("search:all search:cats", &cfg()).unwrap();
        assert_eq!(
            q.saved_searches,
            vec![
                SavedSearchRef::All,
                SavedSearchRef::Label("cats".to_string())
            ]
        );
    }

    #[test]
    fn unknown_colon_term_is_a_plain_tag() {
        let q = parse("re:zero", &cfg()).unwrap();
        assert_eq!(q.required, vec!["re:zero"]);
    }

    // -- limits ---------------------------------------------------------------

    #[test]
    fn three_tags_exceed_default_limit() {
        assert_matches!(
            parse("1 2 3", &cfg()),
            Err(QueryError::TooManyTags { count: 3, max: 2 })
        );
    }

    #[test]
    fn limit_counts_all_literal_term_kinds() {
        assert_matches!(
            parse("a -b ~c", &cfg()),
            Err(QueryError::TooManyTags { count: 3, .. })
        );
    }

    #[test]
    fn metatags_do_not_count_against_limit() {
        let q = parse("1girl solo order:random", &cfg()).unwrap();
        assert_eq!(q.tag_term_count(), 2);
    }

    #[test]
    fn overlong_query_is_rejected() {
        let long = "a".repeat(256);
        assert_matches!(parse(&long, &cfg()), Err(QueryError::Resolution(_)));
    }

    #[test]
    fn empty_query_parses_to_default() {
        let q = parse("", &cfg()).unwrap();
        assert_eq!(q, ParsedQuery::default());
    }
}
