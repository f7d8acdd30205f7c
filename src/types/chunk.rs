//! Chunk type definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE};

/// A chunk of content extracted from a source buffer.
///
/// Chunks are the fundamental unit of content that gets embedded and indexed.
/// Line numbers are 1-based and inclusive, tracing each chunk back to the
/// source it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkResult {
    /// The actual text content of the chunk
    pub content: String,

    /// Node type this chunk was derived from (e.g., "function_item"),
    /// "+"-joined for merged chunks, "<type>[i]" for leaf splits
    #[serde(rename = "type")]
    pub chunk_type: String,

    /// First source line covered by this chunk (1-based, inclusive)
    pub start_line: usize,

    /// Last source line covered by this chunk (1-based, inclusive)
    pub end_line: usize,

    /// Provenance metadata: `split`, `fallback`, `merged`, `index`, `reason`,
    /// `embeddedIn`, `embeddedLanguage`, plus opaque pass-through node data
    pub metadata: Map<String, Value>,
}

impl ChunkResult {
    /// Create a chunk with empty metadata.
    pub fn new(content: String, chunk_type: &str, start_line: usize, end_line: usize) -> Self {
        Self {
            content,
            chunk_type: chunk_type.to_string(),
            start_line,
            end_line,
            metadata: Map::new(),
        }
    }

    /// True iff this chunk is a semantic unit (not produced by size-driven
    /// splitting). Semantic chunks are never merged.
    pub fn is_semantic(&self) -> bool {
        !truthy(self.metadata.get("split"))
    }

    /// True iff this chunk was produced without structural parsing.
    pub fn is_fallback(&self) -> bool {
        truthy(self.metadata.get("fallback"))
    }

    /// Set a metadata key, builder-style.
    pub fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Options for a chunk extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkOptions {
    /// Maximum characters per chunk (hard budget for non-fallback chunks)
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Minimum characters per chunk; smaller non-semantic chunks are merged
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,

    /// Prepend shared context (imports, type declarations) to semantic chunks
    #[serde(default = "default_true")]
    pub preserve_context: bool,

    /// Explicit boundary node-type allow-list; overrides the language registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_types: Option<Vec<String>>,

    /// Recursively chunk embedded code (e.g., fenced blocks in markdown)
    #[serde(default = "default_true")]
    pub parse_embedded: bool,
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_min_chunk_size() -> usize {
    DEFAULT_MIN_CHUNK_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            preserve_context: true,
            node_types: None,
            parse_embedded: true,
        }
    }
}

impl ChunkOptions {
    /// Set the maximum chunk size.
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Set the minimum chunk size.
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_chunk_size = size;
        self
    }

    /// Restrict boundaries to an explicit node-type allow-list.
    pub fn with_node_types(mut self, types: &[&str]) -> Self {
        self.node_types = Some(types.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Disable context preservation.
    pub fn without_context(mut self) -> Self {
        self.preserve_context = false;
        self
    }

    /// Disable recursive parsing of embedded code.
    pub fn without_embedded(mut self) -> Self {
        self.parse_embedded = false;
        self
    }
}
