//! Semantic Chunking Engine
//!
//! Splits source text (code, markup, prose) into semantically coherent,
//! size-bounded chunks aligned to syntactic boundaries, for consumption
//! by lexical and vector retrieval indexes.

pub mod api;
pub mod engine;
pub mod languages;
pub mod parsers;
pub mod store;
pub mod types;

pub use engine::{chunk, chunk_texts};
pub use languages::{language_from_path, supported_languages};
pub use store::{VectorDocument, VectorStore, VectorStoreError};
pub use types::{ChunkOptions, ChunkResult, SyntaxNode, SyntaxTree};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::engine::{chunk, chunk_texts};
    pub use crate::languages::*;
    pub use crate::store::*;
    pub use crate::types::*;
}

/// Default maximum chunk size in characters
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;

/// Default minimum chunk size in characters (smaller non-semantic chunks merge)
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 100;
