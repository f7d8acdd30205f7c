//! Service configuration.

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE};

/// Global chunking service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Default maximum chunk size in characters
    pub default_max_chunk_size: usize,

    /// Default minimum chunk size in characters
    pub default_min_chunk_size: usize,

    /// Whether context preservation is on by default
    pub preserve_context: bool,

    /// HTTP port to listen on
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            default_min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            preserve_context: true,
            port: 3020,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            default_max_chunk_size: std::env::var("MAX_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CHUNK_SIZE),
            default_min_chunk_size: std::env::var("MIN_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MIN_CHUNK_SIZE),
            preserve_context: std::env::var("PRESERVE_CONTEXT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3020),
        }
    }
}
