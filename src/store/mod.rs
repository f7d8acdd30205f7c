//! Storage boundary collaborators.

pub mod vector;

pub use vector::{
    SearchResult, VectorDocument, VectorStore, VectorStoreError, VectorStoreStats,
};
