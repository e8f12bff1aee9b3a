//! Post-version row struct.
//!
//! Versions are immutable snapshots appended on every tag-string change;
//! history is never truncated or rewritten.

use booru_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `post_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostVersion {
    pub id: DbId,
    pub post_id: DbId,
    /// Monotonic per post, contiguous from 1.
    pub sequence: i32,
    /// Full tag-string snapshot at this point in the edit history.
    pub tag_string: String,
    pub updater_id: Option<DbId>,
    pub created_at: Timestamp,
}
