//! Saved-search row struct and DTOs.

use booru_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `saved_searches` table. Created, edited, and deleted by
/// its owner only; the repository enforces owner scoping on every write.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SavedSearch {
    pub id: DbId,
    pub owner_id: DbId,
    pub label: String,
    pub query: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a saved search.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSavedSearch {
    pub label: String,
    pub query: String,
}

/// DTO for updating a saved search. Only the owner may update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSavedSearch {
    pub label: Option<String>,
    pub query: Option<String>,
}
