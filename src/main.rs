use anyhow::Context;
use chat_relay::{build_router, config::Args, state::AppState};
use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap's env fallbacks can see it
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_level = if args.is_development() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if !args.api_configured() {
        warn!("GEMINI_API_KEY not configured, chat endpoints will answer 500 until it is set");
    }

    let state = Arc::new(AppState::from_args(&args)?);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Relay running on http://localhost:{}", args.port);
    info!("Forwarding to {}", args.api_url);
    info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    info!(
        "Upstream retries: {} (base delay {}ms)",
        args.max_retries, args.retry_base_delay_ms
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
