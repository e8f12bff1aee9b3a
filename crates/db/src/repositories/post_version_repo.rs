//! Repository for the `post_versions` table.
//!
//! Versions are immutable snapshots appended on every tag-string change.
//! Writes happen inside a transaction that already holds the post's row
//! lock, which is what keeps sequence numbers contiguous.

use booru_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::post_version::PostVersion;

/// Column list for `post_versions` queries.
const COLUMNS: &str = "id, post_id, sequence, tag_string, updater_id, created_at";

/// Provides read and append operations for post versions.
pub struct PostVersionRepo;

impl PostVersionRepo {
    /// Append a version snapshot.
    pub async fn create(
        conn: &mut PgConnection,
        post_id: DbId,
        sequence: i32,
        tag_string: &str,
        updater_id: Option<DbId>,
    ) -> Result<PostVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO post_versions (post_id, sequence, tag_string, updater_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(post_id)
            .bind(sequence)
            .bind(tag_string)
            .bind(updater_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a version by its global id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PostVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM post_versions WHERE id = $1");
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All versions of a post, oldest first.
    pub async fn list_by_post(
        pool: &PgPool,
        post_id: DbId,
    ) -> Result<Vec<PostVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM post_versions
             WHERE post_id = $1
             ORDER BY sequence"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// The post's version sequence numbers, ascending, read under the
    /// caller's transaction so the contiguity check sees a stable view.
    pub async fn sequences(
        conn: &mut PgConnection,
        post_id: DbId,
    ) -> Result<Vec<i32>, sqlx::Error> {
        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT sequence FROM post_versions WHERE post_id = $1 ORDER BY sequence")
                .bind(post_id)
                .fetch_all(&mut *conn)
                .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }

    /// The latest sequence number for a post (0 if none exist).
    pub async fn latest_sequence(
        conn: &mut PgConnection,
        post_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT COALESCE(MAX(sequence), 0) FROM post_versions WHERE post_id = $1",
        )
        .bind(post_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.map(|(s,)| s).unwrap_or(0))
    }
}
