//! Coalescing of small non-semantic chunks.

use serde_json::json;

use crate::types::ChunkResult;

/// Merge runs of consecutive non-semantic, undersized chunks until they meet
/// `min_chunk_size`. Semantic chunks (no `split` marker) and chunks already
/// at or above the threshold pass through untouched; order is preserved and
/// no chunk is duplicated or dropped.
pub fn merge_small_chunks(chunks: Vec<ChunkResult>, min_chunk_size: usize) -> Vec<ChunkResult> {
    if chunks.is_empty() {
        return Vec::new();
    }

    let mut merged: Vec<ChunkResult> = Vec::new();
    // Invariant: the buffer only ever holds a non-semantic chunk smaller
    // than min_chunk_size.
    let mut buffer: Option<ChunkResult> = None;

    for chunk in chunks {
        let chunk_is_semantic = chunk.is_semantic();

        let Some(pending) = buffer.take() else {
            if chunk_is_semantic || chunk.content.len() >= min_chunk_size {
                merged.push(chunk);
            } else {
                buffer = Some(chunk);
            }
            continue;
        };

        let pending_is_semantic = pending.is_semantic();
        if !chunk_is_semantic
            && !pending_is_semantic
            && pending.content.len() < min_chunk_size
            && chunk.content.len() < min_chunk_size
        {
            let mut joined = pending;
            joined.content = format!("{}\n\n{}", joined.content, chunk.content);
            joined.chunk_type = format!("{}+{}", joined.chunk_type, chunk.chunk_type);
            joined.end_line = chunk.end_line;
            joined.metadata.insert("merged".to_string(), json!(true));
            buffer = Some(joined);
        } else {
            merged.push(pending);
            if chunk_is_semantic || chunk.content.len() >= min_chunk_size {
                merged.push(chunk);
            } else {
                buffer = Some(chunk);
            }
        }
    }

    if let Some(pending) = buffer {
        merged.push(pending);
    }

    merged
}
