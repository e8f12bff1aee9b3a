//! Version-sequence invariants for the post revision history.
//!
//! The history is append-only: per post, sequence numbers are strictly
//! increasing and contiguous starting at 1, and a revert appends a new
//! version rather than rewinding. These helpers are pure so the invariants
//! are unit-testable; the db layer supplies the locking that makes them
//! hold under concurrency.

use crate::error::{QueryError, QueryResult};
use crate::types::DbId;

/// Sequence number for the next version given the latest existing one
/// (0 when the post has no versions yet).
pub fn next_sequence(latest: i32) -> i32 {
    latest + 1
}

/// Check that a post's version sequence, sorted ascending, is `1..=n`
/// with no gaps. A gap means version creation raced — a concurrency-control
/// failure, surfaced as [`QueryError::SequenceViolation`] rather than a
/// user error.
pub fn verify_contiguous(post_id: DbId, sequences: &[i32]) -> QueryResult<()> {
    for (i, &seq) in sequences.iter().enumerate() {
        let expected = i as i32 + 1;
        if seq != expected {
            return Err(QueryError::SequenceViolation {
                post_id,
                expected,
                found: seq,
            });
        }
    }
    Ok(())
}

/// Version ids are global, but a revert target must belong to the post
/// being reverted. A cross-post reference is reported as a missing
/// version, matching the caller's 404 mapping.
pub fn validate_revert_target(post_id: DbId, target_post_id: DbId) -> QueryResult<()> {
    if post_id != target_post_id {
        return Err(QueryError::NotFound {
            entity: "post version",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn first_version_is_sequence_one() {
        assert_eq!(next_sequence(0), 1);
    }

    #[test]
    fn sequences_increment_from_latest() {
        assert_eq!(next_sequence(4), 5);
    }

    #[test]
    fn contiguous_sequences_pass() {
        assert!(verify_contiguous(1, &[1, 2, 3]).is_ok());
        assert!(verify_contiguous(1, &[]).is_ok());
    }

    #[test]
    fn gap_is_a_sequence_violation() {
        assert_matches!(
            verify_contiguous(7, &[1, 3]),
            Err(QueryError::SequenceViolation { post_id: 7, expected: 2, found: 3 })
        );
    }

    #[test]
    fn cross_post_target_is_not_found() {
        assert_matches!(
            validate_revert_target(1, 2),
            Err(QueryError::NotFound { entity: "post version" })
        );
        assert!(validate_revert_target(1, 1).is_ok());
    }
}
