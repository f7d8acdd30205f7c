//! Semantic Chunking Service - Main Entry Point

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use semchunk::api::handlers::{self, AppState};
use semchunk::types::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "semchunk=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ServiceConfig::from_env();

    info!("Starting Semantic Chunking Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Chunk size budget: {}..{} chars",
        config.default_min_chunk_size, config.default_max_chunk_size
    );

    let port = config.port;
    let state = Arc::new(AppState { config });

    // Build HTTP routes
    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/chunk", post(handlers::chunk_content))
        .route("/languages", get(handlers::list_languages))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
