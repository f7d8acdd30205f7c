//! HTTP request handlers for the chunking service.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine;
use crate::languages;
use crate::types::{ChunkOptions, ChunkResult, ServiceConfig};

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServiceConfig,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Chunk extraction request.
#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    /// Source text to chunk
    pub content: String,
    /// File path or language identifier used for language detection
    pub path: String,
    /// Per-request options; omitted fields use service defaults
    #[serde(default)]
    pub options: Option<ChunkOptions>,
}

/// Chunk extraction response.
#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub chunks: Vec<ChunkResult>,
    pub count: usize,
}

/// Chunk a source buffer.
pub async fn chunk_content(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChunkRequest>,
) -> Json<ChunkResponse> {
    let options = request.options.unwrap_or_else(|| ChunkOptions {
        max_chunk_size: state.config.default_max_chunk_size,
        min_chunk_size: state.config.default_min_chunk_size,
        preserve_context: state.config.preserve_context,
        node_types: None,
        parse_embedded: true,
    });

    info!(
        path = %request.path,
        bytes = request.content.len(),
        "Received chunk request"
    );

    let chunks = engine::chunk(&request.content, &request.path, &options).await;
    let count = chunks.len();
    Json(ChunkResponse { chunks, count })
}

/// List the languages with a registered configuration.
pub async fn list_languages() -> Json<Vec<String>> {
    Json(languages::supported_languages())
}
