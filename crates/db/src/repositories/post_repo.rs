//! Repository for the `posts` table.

use booru_core::tags::normalize_tag_string;
use booru_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::post::{CreatePost, Post};

/// Column list for `posts` queries.
const COLUMNS: &str = "\
    id, md5, width, height, tags, is_deleted, is_banned, has_embedded_notes, \
    uploader_id, created_at, updated_at";

/// Provides read and write operations for posts.
pub struct PostRepo;

impl PostRepo {
    /// Create a post. The tag string is normalized before insert.
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let tags = normalize_tag_string(&input.tag_string);
        let query = format!(
            "INSERT INTO posts (md5, width, height, tags, uploader_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(&input.md5)
            .bind(input.width)
            .bind(input.height)
            .bind(&tags)
            .bind(input.uploader_id)
            .fetch_one(pool)
            .await
    }

    /// Find a post by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a post by its MD5 checksum.
    pub async fn find_by_md5(pool: &PgPool, md5: &str) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE md5 = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(md5)
            .fetch_optional(pool)
            .await
    }

    /// Fetch candidate posts for evaluation, newest first.
    ///
    /// `required` pushes tag containment down to the GIN index when the
    /// query has a single conjunctive clause; an empty slice fetches all.
    /// `deleted` pushes the deletion-state filter down: `Some(false)` for
    /// the default hide-deleted policy, `Some(true)` for `status:deleted`,
    /// `None` for `status:any`. The core evaluator re-applies the full
    /// predicate either way.
    pub async fn fetch_candidates(
        pool: &PgPool,
        required: &[String],
        deleted: Option<bool>,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts
             WHERE (cardinality($1::text[]) = 0 OR tags @> $1)
               AND ($2::boolean IS NULL OR is_deleted = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(required)
            .bind(deleted)
            .fetch_all(pool)
            .await
    }

    /// Fetch up to `limit` posts adjacent to `id` in id order.
    ///
    /// `ascending = true` walks toward newer ids (sequential "prev"),
    /// `false` toward older ids ("next"). The caller applies visibility and
    /// takes the first survivor.
    pub async fn adjacent(
        pool: &PgPool,
        id: DbId,
        ascending: bool,
        limit: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let query = if ascending {
            format!("SELECT {COLUMNS} FROM posts WHERE id > $1 ORDER BY id ASC LIMIT $2")
        } else {
            format!("SELECT {COLUMNS} FROM posts WHERE id < $1 ORDER BY id DESC LIMIT $2")
        };
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Lock a post's row for the duration of the surrounding transaction.
    ///
    /// This is the per-post critical section that keeps version sequence
    /// numbers contiguous under concurrent edits.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Replace a post's tag set inside a transaction.
    pub async fn update_tags(
        conn: &mut PgConnection,
        id: DbId,
        tags: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE posts SET tags = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(tags)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Mark a post as carrying embedded notes.
    pub async fn set_has_embedded_notes(
        conn: &mut PgConnection,
        id: DbId,
        value: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE posts SET has_embedded_notes = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(value)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Set a post's deletion flag. Returns `true` if a row changed.
    pub async fn set_deleted(pool: &PgPool, id: DbId, value: bool) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE posts SET is_deleted = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(value)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set a post's ban flag. Returns `true` if a row changed.
    pub async fn set_banned(pool: &PgPool, id: DbId, value: bool) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE posts SET is_banned = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(value)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
