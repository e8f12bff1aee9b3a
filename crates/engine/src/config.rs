use booru_core::config::SearchConfig;

/// Engine configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Postgres connection string, from `DATABASE_URL`.
    pub database_url: String,
    /// Maximum database connections in the pool (default: `10`).
    pub max_connections: u32,
    /// Search limits and the restricted-tag set.
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                  |
    /// |------------------------|------------------------------------------|
    /// | `DATABASE_URL`         | `postgres://localhost/booru_dev`         |
    /// | `MAX_CONNECTIONS`      | `10`                                     |
    /// | `MAX_TAG_TERMS`        | `2`                                      |
    /// | `MAX_WILDCARD_MATCHES` | `100`                                    |
    /// | `PAGE_SIZE`            | `20`                                     |
    /// | `MAX_PAGE`             | `1000`                                   |
    /// | `RESTRICTED_TAGS`      | (empty; comma-separated tag names)       |
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/booru_dev".into());

        let max_connections: u32 = std::env::var("MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("MAX_CONNECTIONS must be a valid u32");

        let mut search = SearchConfig::default();

        if let Ok(v) = std::env::var("MAX_TAG_TERMS") {
            search.max_tag_terms = v.parse().expect("MAX_TAG_TERMS must be a valid usize");
        }
        if let Ok(v) = std::env::var("MAX_WILDCARD_MATCHES") {
            search.max_wildcard_matches =
                v.parse().expect("MAX_WILDCARD_MATCHES must be a valid usize");
        }
        if let Ok(v) = std::env::var("PAGE_SIZE") {
            search.page_size = v.parse().expect("PAGE_SIZE must be a valid usize");
        }
        if let Ok(v) = std::env::var("MAX_PAGE") {
            search.max_page = v.parse().expect("MAX_PAGE must be a valid u32");
        }
        if let Ok(v) = std::env::var("RESTRICTED_TAGS") {
            search.restricted_tags = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Self {
            database_url,
            max_connections,
            search,
        }
    }
}
