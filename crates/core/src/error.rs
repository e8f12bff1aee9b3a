use crate::types::DbId;

/// Domain-level error for query parsing, resolution, and evaluation.
///
/// Every variant is recoverable at the caller boundary; none is fatal to
/// the process. `SequenceViolation` is the exception in spirit: it means a
/// concurrency-control failure rather than bad input, and callers should
/// treat it as an internal error, not a user error.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// More literal tag terms than the configured maximum.
    #[error("You cannot search for more than {max} tags at a time ({count} given)")]
    TooManyTags { count: usize, max: usize },

    /// A wildcard pattern matched more tags than the configured cap.
    #[error("Wildcard '{pattern}' matches more than {max} tags")]
    WildcardBudget { pattern: String, max: usize },

    /// Requested page is beyond the configured maximum.
    #[error("You cannot go beyond page {max} (page {page} requested)")]
    PageLimitExceeded { page: u32, max: u32 },

    /// Malformed metatag, unknown saved search, or a cyclic saved-search
    /// reference.
    #[error("Could not resolve search: {0}")]
    Resolution(String),

    /// Entity not found: md5 miss, random-search miss, or a revert target
    /// that belongs to another post.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Write or view attempt on restricted/banned content without the
    /// required role.
    #[error("Access denied: {0}")]
    PermissionDenied(String),

    /// A gap was detected in a post's version sequence. This indicates a
    /// concurrency-control failure, not bad input.
    #[error("Version sequence for post {post_id} is not contiguous (expected {expected}, found {found})")]
    SequenceViolation {
        post_id: DbId,
        expected: i32,
        found: i32,
    },
}

/// Convenience alias for core operations.
pub type QueryResult<T> = Result<T, QueryError>;
