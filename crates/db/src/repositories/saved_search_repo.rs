//! Repository for the `saved_searches` table.
//!
//! Every write is owner-scoped: a saved search is created, edited, and
//! deleted by its owner only.

use booru_core::types::DbId;
use sqlx::PgPool;

use crate::models::saved_search::{CreateSavedSearch, SavedSearch, UpdateSavedSearch};

/// Column list for `saved_searches` queries.
const COLUMNS: &str = "id, owner_id, label, query, created_at, updated_at";

/// Provides owner-scoped CRUD for saved searches.
pub struct SavedSearchRepo;

impl SavedSearchRepo {
    /// Create a saved search for the given owner.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateSavedSearch,
    ) -> Result<SavedSearch, sqlx::Error> {
        let query = format!(
            "INSERT INTO saved_searches (owner_id, label, query)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(owner_id)
            .bind(&input.label)
            .bind(&input.query)
            .fetch_one(pool)
            .await
    }

    /// All saved searches owned by a principal, by label.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<SavedSearch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM saved_searches
             WHERE owner_id = $1
             ORDER BY label"
        );
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update a saved search the owner holds. Returns the updated row, or
    /// `None` when the id does not exist under this owner.
    pub async fn update(
        pool: &PgPool,
        owner_id: DbId,
        id: DbId,
        input: &UpdateSavedSearch,
    ) -> Result<Option<SavedSearch>, sqlx::Error> {
        let query = format!(
            "UPDATE saved_searches
             SET label = COALESCE($3, label),
                 query = COALESCE($4, query),
                 updated_at = NOW()
             WHERE id = $2 AND owner_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SavedSearch>(&query)
            .bind(owner_id)
            .bind(id)
            .bind(input.label.as_deref())
            .bind(input.query.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a saved search the owner holds. Returns `true` if a row was
    /// deleted.
    pub async fn delete(pool: &PgPool, owner_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM saved_searches WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
