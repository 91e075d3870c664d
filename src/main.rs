use anyhow::Context;
use nifty_chain_backend::{
    build_router, config::Config, services::nse::NseService, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nifty_chain_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::debug!("Loaded config: {:?}", config);

    if config.nse.cookie.is_none() {
        tracing::warn!("NSE_COOKIE is not set; the NSE API usually rejects requests without a session cookie");
    }

    let nse = NseService::new(&config.nse).context("Failed to build NSE HTTP client")?;
    let app = build_router(AppState::new(nse));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
