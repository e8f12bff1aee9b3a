//! Repository for the `tags` table.

use booru_core::tags::TagCategory;
use booru_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::tag::Tag;

/// Column list for `tags` queries.
const COLUMNS: &str = "id, name, category, post_count, created_at, updated_at";

/// Provides catalogue operations for tags.
pub struct TagRepo;

impl TagRepo {
    /// Find a tag by its normalized name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Create a tag if it does not exist, returning the row either way.
    pub async fn create_or_get(
        pool: &PgPool,
        name: &str,
        category: TagCategory,
    ) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (name, category)
             VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .bind(category.as_str())
            .fetch_one(pool)
            .await
    }

    /// Ensure every name in `names` exists in the catalogue, creating any
    /// missing ones with the default category. Used on the edit path so
    /// tags exist from first use.
    pub async fn ensure_all(conn: &mut PgConnection, names: &[String]) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO tags (name)
             SELECT unnest($1::text[])
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(names)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Tag names matching a SQL LIKE pattern, most-used first.
    ///
    /// Callers expanding a wildcard should pass the configured expansion cap
    /// plus one, so the core resolver can detect overflow instead of
    /// silently truncating.
    pub async fn find_matching(
        pool: &PgPool,
        like_pattern: &str,
        limit: i64,
    ) -> Result<Vec<String>, sqlx::Error> {
        let names: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM tags
             WHERE name LIKE $1 ESCAPE '\\'
             ORDER BY post_count DESC, name
             LIMIT $2",
        )
        .bind(like_pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(names.into_iter().map(|(n,)| n).collect())
    }

    /// Recount `post_count` for every tag from the non-deleted posts that
    /// carry it. Eventually-consistent bulk maintenance; never runs on the
    /// read path. Returns the number of tags updated.
    pub async fn recount_post_counts(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tags SET post_count = counted.cnt, updated_at = NOW()
             FROM (
                 SELECT t.id, COUNT(p.id)::int AS cnt
                 FROM tags t
                 LEFT JOIN posts p ON p.tags @> ARRAY[t.name] AND NOT p.is_deleted
                 GROUP BY t.id
             ) counted
             WHERE tags.id = counted.id AND tags.post_count <> counted.cnt",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Look up a tag by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
