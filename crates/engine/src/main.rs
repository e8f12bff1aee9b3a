//! Maintenance entrypoint: applies pending migrations, then recounts tag
//! usage from the live posts. Run on a schedule, never on the read path.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booru_engine::config::EngineConfig;
use booru_engine::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booru_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = EngineConfig::from_env();
    tracing::info!(
        max_connections = config.max_connections,
        restricted_tags = config.search.restricted_tags.len(),
        "Loaded engine configuration"
    );

    // --- Database ---
    let engine = Engine::connect(&config).await?;
    booru_db::run_migrations(engine.pool()).await?;
    tracing::info!("Database migrations applied");

    // --- Maintenance ---
    let updated = engine.recount_tags().await?;
    tracing::info!(updated, "Maintenance pass complete");
    Ok(())
}
