//! Repository for the `notes` table.

use booru_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::note::{CreateNote, Note};

/// Column list for `notes` queries.
const COLUMNS: &str = "id, post_id, x, y, width, height, is_active, body, created_at, updated_at";

/// Provides note operations. Notes are soft-deleted via `is_active` and
/// never hard-deleted while referenced by copy history.
pub struct NoteRepo;

impl NoteRepo {
    /// Create an active note.
    pub async fn create(conn: &mut PgConnection, input: &CreateNote) -> Result<Note, sqlx::Error> {
        let query = format!(
            "INSERT INTO notes (post_id, x, y, width, height, body)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(input.post_id)
            .bind(input.x)
            .bind(input.y)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.body)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a note by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = $1");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active notes on a post, oldest first.
    pub async fn list_active_by_post(
        pool: &PgPool,
        post_id: DbId,
    ) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notes
             WHERE post_id = $1 AND is_active
             ORDER BY id"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// Soft-delete a note. Returns `true` if a row changed.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE notes SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
