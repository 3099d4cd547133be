use std::sync::Arc;

use gym_events::{
    api::{create_router, AppState},
    config::Config,
    db::{self, PgCatalogStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(
        &config.database_url,
        config.max_connections,
        config.query_timeout(),
    )
    .await?;

    if config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    // Initialize application state
    let store = PgCatalogStore::new(pool, config.query_timeout());
    let state = AppState::new(Arc::new(store), config.interest_matching);

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        interest_matching = ?config.interest_matching,
        "Server running"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
