use std::sync::Arc;

use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bias_news::config::Config;
use bias_news::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bias_news=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("BIAS_NEWS_CONFIG").unwrap_or_else(|_| "bias.toml".to_string());
    let config = Config::load(&config_path)?;
    info!(
        "Loaded configuration from {}: feed '{}', model '{}'",
        config_path, config.feed.name, config.llm.model
    );

    let api_key = config.llm.api_key();
    if api_key.is_none() {
        warn!(
            "{} is not set; every analysis will report an error",
            config.llm.api_key_env
        );
    }

    let state = Arc::new(AppState::new(&config, api_key)?);

    // Build router
    let app = routes::router(state)
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
