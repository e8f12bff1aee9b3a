//! PostgreSQL persistence for the query engine: row models and
//! repositories for posts, tags, saved searches, notes, and post versions.

pub mod models;
pub mod repositories;

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
