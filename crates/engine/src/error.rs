//! Engine-level error type and status classification.
//!
//! Wraps domain errors from `booru-core` and database errors from sqlx.
//! The web layer is out of scope here, so instead of implementing a
//! response conversion this module exposes the status-equivalent
//! classification directly; the caller maps it onto its transport.

use booru_core::error::QueryError;

/// Error type for all engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `booru-core`.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Stable machine-readable code for the caller.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Query(QueryError::TooManyTags { .. }) => "TOO_MANY_TAGS",
            Self::Query(QueryError::WildcardBudget { .. }) => "WILDCARD_BUDGET",
            Self::Query(QueryError::PageLimitExceeded { .. }) => "PAGE_LIMIT_EXCEEDED",
            Self::Query(QueryError::Resolution(_)) => "SEARCH_ERROR",
            Self::Query(QueryError::NotFound { .. }) => "NOT_FOUND",
            Self::Query(QueryError::PermissionDenied(_)) => "FORBIDDEN",
            Self::Query(QueryError::SequenceViolation { .. }) => "INTERNAL_ERROR",
            Self::Database(sqlx::Error::RowNotFound) => "NOT_FOUND",
            Self::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP-equivalent status for the caller's error page or redirect:
    ///
    /// - too many tags / malformed query → 422 ("Search Error")
    /// - page limit exceeded → 410 ("Search Error")
    /// - md5 miss, random miss, cross-post revert → 404
    /// - restricted write without the required role → 403
    /// - sequence violations and database failures → 500
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Query(QueryError::TooManyTags { .. })
            | Self::Query(QueryError::WildcardBudget { .. })
            | Self::Query(QueryError::Resolution(_)) => 422,
            Self::Query(QueryError::PageLimitExceeded { .. }) => 410,
            Self::Query(QueryError::NotFound { .. }) => 404,
            Self::Query(QueryError::PermissionDenied(_)) => 403,
            Self::Query(QueryError::SequenceViolation { .. }) => {
                tracing::error!(error = %self, "version sequence invariant violated");
                500
            }
            Self::Database(sqlx::Error::RowNotFound) => 404,
            Self::Database(err) => {
                tracing::error!(error = %err, "Database error");
                500
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_map_to_search_error_statuses() {
        let e = EngineError::from(QueryError::TooManyTags { count: 3, max: 2 });
        assert_eq!(e.status_code(), 422);

        let e = EngineError::from(QueryError::PageLimitExceeded { page: 1001, max: 1000 });
        assert_eq!(e.status_code(), 410);
    }

    #[test]
    fn misses_and_denials_map_to_404_and_403() {
        let e = EngineError::from(QueryError::NotFound { entity: "post" });
        assert_eq!(e.status_code(), 404);

        let e = EngineError::from(QueryError::PermissionDenied("banned post".into()));
        assert_eq!(e.status_code(), 403);
    }

    #[test]
    fn invariant_violations_are_internal() {
        let e = EngineError::from(QueryError::SequenceViolation {
            post_id: 1,
            expected: 2,
            found: 3,
        });
        assert_eq!(e.status_code(), 500);
        assert_eq!(e.code(), "INTERNAL_ERROR");
    }
}
