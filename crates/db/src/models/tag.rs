//! Tag row struct and DTOs.

use booru_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    /// One of: general, artist, character, copyright, meta.
    pub category: String,
    /// Number of non-deleted posts carrying this tag. Eventually consistent.
    pub post_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tag explicitly (tags are otherwise created on first
/// use with the default category).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub category: Option<String>,
}
