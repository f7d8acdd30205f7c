//! In-memory embedding store with cosine similarity search.
//!
//! Holds one fixed-dimensionality embedding per chunk id. Unlike the
//! chunking pipeline, this boundary surfaces hard failures: a wrong-length
//! embedding or a duplicate id on add is an explicit error, never coerced.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced at the vector-store boundary.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("embedding has {actual} dimensions, store expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("document '{0}' already exists")]
    DuplicateId(String),
}

/// A stored embedding with its chunk id and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDocument {
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A similarity-search hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub doc: VectorDocument,
    pub similarity: f32,
}

/// Store statistics.
#[derive(Debug, Clone, Serialize)]
pub struct VectorStoreStats {
    pub total_documents: usize,
    pub dimensions: usize,
}

/// In-memory vector store keyed by document id.
pub struct VectorStore {
    dimensions: usize,
    docs: HashMap<String, VectorDocument>,
}

impl VectorStore {
    /// Create a store for embeddings of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            docs: HashMap::new(),
        }
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<(), VectorStoreError> {
        if embedding.len() != self.dimensions {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }
        Ok(())
    }

    /// Add a new document. Fails on dimension mismatch or duplicate id.
    pub fn add(&mut self, doc: VectorDocument) -> Result<(), VectorStoreError> {
        self.check_dimensions(&doc.embedding)?;
        if self.docs.contains_key(&doc.id) {
            return Err(VectorStoreError::DuplicateId(doc.id));
        }
        self.docs.insert(doc.id.clone(), doc);
        Ok(())
    }

    /// Add a batch of documents; stops at the first failure.
    pub fn add_many(&mut self, docs: Vec<VectorDocument>) -> Result<(), VectorStoreError> {
        for doc in docs {
            self.add(doc)?;
        }
        Ok(())
    }

    /// Insert or replace a document. Fails only on dimension mismatch.
    pub fn update(&mut self, doc: VectorDocument) -> Result<(), VectorStoreError> {
        self.check_dimensions(&doc.embedding)?;
        self.docs.insert(doc.id.clone(), doc);
        Ok(())
    }

    /// Remove a document, returning whether it existed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.docs.remove(id).is_some()
    }

    /// Look up a document by id.
    pub fn get(&self, id: &str) -> Option<&VectorDocument> {
        self.docs.get(id)
    }

    /// Check whether a document exists.
    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    /// Nearest neighbors of `query` by cosine similarity, best first.
    /// `min_score` filters out weak matches.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        min_score: Option<f32>,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        self.check_dimensions(query)?;

        let mut results: Vec<SearchResult> = self
            .docs
            .values()
            .map(|doc| SearchResult {
                similarity: cosine_similarity(query, &doc.embedding),
                doc: doc.clone(),
            })
            .filter(|r| min_score.map_or(true, |min| r.similarity >= min))
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    /// Remove all documents.
    pub fn clear(&mut self) {
        self.docs.clear();
    }

    /// Current store statistics.
    pub fn stats(&self) -> VectorStoreStats {
        VectorStoreStats {
            total_documents: self.docs.len(),
            dimensions: self.dimensions,
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
