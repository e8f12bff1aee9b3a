//! Post row struct and DTOs.

use booru_core::post::PostCandidate;
use booru_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub md5: String,
    pub width: i32,
    pub height: i32,
    /// Normalized tag names (lowercase, deduplicated, space-free).
    pub tags: Vec<String>,
    pub is_deleted: bool,
    pub is_banned: bool,
    pub has_embedded_notes: bool,
    pub uploader_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Post {
    /// The canonical space-joined tag string.
    pub fn tag_string(&self) -> String {
        self.tags.join(" ")
    }

    /// The slice of this post the core pipeline evaluates.
    pub fn to_candidate(&self) -> PostCandidate {
        PostCandidate {
            id: self.id,
            md5: self.md5.clone(),
            tags: self.tags.clone(),
            is_deleted: self.is_deleted,
            is_banned: self.is_banned,
            created_at: self.created_at,
        }
    }
}

/// DTO for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub md5: String,
    pub width: i32,
    pub height: i32,
    /// Raw tag string; normalized before insert.
    pub tag_string: String,
    pub uploader_id: Option<DbId>,
}
