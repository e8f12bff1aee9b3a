//! The post facts the query pipeline operates on.

use crate::types::{DbId, Timestamp};
use serde::Serialize;

/// The slice of a post that visibility and evaluation need.
///
/// The repository layer produces these from `posts` rows; tests build them
/// directly. Tags are normalized (lowercase, deduplicated, space-free).
#[derive(Debug, Clone, Serialize)]
pub struct PostCandidate {
    pub id: DbId,
    pub md5: String,
    pub tags: Vec<String>,
    pub is_deleted: bool,
    pub is_banned: bool,
    pub created_at: Timestamp,
}

impl PostCandidate {
    /// Whether the post carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
