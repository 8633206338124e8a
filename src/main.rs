use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cadence_api::{
    api::{create_router, AppState},
    cache::TtlCache,
    config::Config,
    services::{
        engine::RecommendationEngine,
        providers::{gemini::GeminiClient, lastfm::LastFmClient, youtube::YouTubeClient},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // One shared client so every outbound call gets the same bounded timeout
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let cache = TtlCache::new();

    let text_gen = Arc::new(GeminiClient::new(
        http_client.clone(),
        config.gemini_api_key.clone(),
        config.gemini_api_url.clone(),
    ));
    let history = Arc::new(LastFmClient::new(
        http_client.clone(),
        config.lastfm_api_key.clone(),
        config.lastfm_api_url.clone(),
        cache.clone(),
    ));
    let search = Arc::new(YouTubeClient::new(
        http_client,
        config.youtube_api_key.clone(),
        config.youtube_api_url.clone(),
        cache,
    ));

    let engine = RecommendationEngine::new(text_gen, history, search);
    let state = AppState::new(engine);
    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(host = %config.host, port = config.port, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
