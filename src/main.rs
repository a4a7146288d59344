use anyhow::Context;
use std::sync::Arc;

use codeclass_api::config;
use codeclass_api::identity::IdentityClient;
use codeclass_api::routes::{build_router, AppState};
use codeclass_api::store::{MemoryProjectStore, PostgresProjectStore, ProjectStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting codeclass API in {:?} mode", config.environment);

    let store: Arc<dyn ProjectStore> = match &config.database.url {
        Some(_) => Arc::new(
            PostgresProjectStore::connect(&config.database)
                .await
                .context("failed to connect to the project store")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set, falling back to the in-memory store");
            Arc::new(MemoryProjectStore::new())
        }
    };

    let identity = IdentityClient::from_config(&config.auth0).map(Arc::new);
    if identity.is_none() {
        tracing::info!("Identity provider not configured, profile lookups disabled");
    }

    let app = build_router(AppState { store, identity });

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("codeclass API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
