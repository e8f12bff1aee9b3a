//! booru-engine: the boundary between storage and the pure query core.
//!
//! The engine owns a connection pool and the search configuration, and
//! exposes the operations a web layer would call: search and single-post
//! lookups, note copying, tag edits with version history, and saved-search
//! management. Every read path goes through the same visibility predicate;
//! every tag write goes through the same versioned edit path.
//!
//! The engine does not authenticate. Callers hand it an already-resolved
//! [`Principal`](booru_core::visibility::Principal).

pub mod config;
pub mod error;
pub mod notes;
pub mod revisions;
pub mod saved_searches;
pub mod search;

use booru_core::config::SearchConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::EngineConfig;
use crate::error::EngineResult;

pub use crate::error::EngineError;
pub use crate::notes::NoteCopySummary;
pub use crate::search::{PostView, SearchFormat, SeqDirection};

/// The engine: a pool plus the search limits, shared by every operation.
#[derive(Debug, Clone)]
pub struct Engine {
    pool: PgPool,
    config: SearchConfig,
}

impl Engine {
    /// Build an engine on an existing pool.
    pub fn new(pool: PgPool, config: SearchConfig) -> Self {
        Self { pool, config }
    }

    /// Connect a fresh pool from configuration.
    pub async fn connect(config: &EngineConfig) -> EngineResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        tracing::info!(max_connections = config.max_connections, "Database pool ready");
        Ok(Self::new(pool, config.search.clone()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}
