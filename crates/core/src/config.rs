//! Search limits and policy knobs.
//!
//! Every limit in the query pipeline is carried in one explicit value that
//! callers pass down at call time, rather than read ambiently from global
//! state. The engine crate loads this from the environment.

use std::collections::HashSet;

/// Default maximum number of literal tag terms per query.
pub const DEFAULT_MAX_TAG_TERMS: usize = 2;

/// Default maximum number of concrete tags a wildcard may expand to.
pub const DEFAULT_MAX_WILDCARD_MATCHES: usize = 100;

/// Default maximum saved-search expansion depth.
pub const DEFAULT_MAX_SAVED_SEARCH_DEPTH: usize = 3;

/// Default number of posts per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default maximum page number.
pub const DEFAULT_MAX_PAGE: u32 = 1000;

/// Default maximum query string length in characters.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 255;

/// All limits and policy inputs for one search invocation.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum literal tag terms before the query is rejected.
    pub max_tag_terms: usize,
    /// Maximum concrete tags a single wildcard pattern may expand to.
    pub max_wildcard_matches: usize,
    /// Maximum saved-search expansion depth.
    pub max_saved_search_depth: usize,
    /// Posts per page.
    pub page_size: u32,
    /// Maximum page number before the query is rejected.
    pub max_page: u32,
    /// Maximum query string length in characters.
    pub max_query_length: usize,
    /// Tags whose presence gates a post behind the restricted-content
    /// permission.
    pub restricted_tags: HashSet<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_tag_terms: DEFAULT_MAX_TAG_TERMS,
            max_wildcard_matches: DEFAULT_MAX_WILDCARD_MATCHES,
            max_saved_search_depth: DEFAULT_MAX_SAVED_SEARCH_DEPTH,
            page_size: DEFAULT_PAGE_SIZE,
            max_page: DEFAULT_MAX_PAGE,
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            restricted_tags: HashSet::new(),
        }
    }
}

impl SearchConfig {
    /// A config with the given restricted tags and default limits.
    pub fn with_restricted_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            restricted_tags: tags.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
