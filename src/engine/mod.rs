//! The chunk extraction pipeline.
//!
//! Control flow: extractor, then splitter or merger, then the
//! embedded-region recursor, with fallback only if the result set is empty.
//! The public entry points absorb every recoverable failure (unknown
//! language, missing parser, parse error) and degrade to character chunking
//! instead of surfacing an error; callers only ever inspect
//! `metadata.fallback`.

pub mod embedded;
pub mod extract;
pub mod fallback;
pub mod merge;

use serde_json::json;
use tracing::{debug, warn};

use crate::languages;
use crate::parsers::PARSER_CACHE;
use crate::types::{ChunkOptions, ChunkResult};

pub use extract::{extract_semantic_chunks, split_oversized};
pub use fallback::{fallback_chunks, split_text};
pub use merge::merge_small_chunks;

/// Chunk a source buffer, detecting the language from `path`.
///
/// Chunks come back in source order with 1-based inclusive line ranges.
/// Empty (blank) input yields an empty list; any other input yields at least
/// one chunk.
pub async fn chunk(source: &str, path: &str, options: &ChunkOptions) -> Vec<ChunkResult> {
    if source.trim().is_empty() {
        return Vec::new();
    }

    match languages::language_from_path(path) {
        Some(language) => chunk_language(source, &language, options).await,
        None => {
            debug!(path, "unknown language, falling back to character chunking");
            fallback_chunks(source, options.max_chunk_size)
        }
    }
}

/// Chunk a source buffer as a specific language id.
pub async fn chunk_language(
    source: &str,
    language: &str,
    options: &ChunkOptions,
) -> Vec<ChunkResult> {
    if source.trim().is_empty() {
        return Vec::new();
    }

    let config = languages::config_for(language);

    let Some(parser) = PARSER_CACHE.resolve(language) else {
        debug!(language, "no parser available, falling back to character chunking");
        return fallback_chunks(source, options.max_chunk_size);
    };

    let parser_options = config.map(|c| c.parser_options.clone()).unwrap_or_default();
    let tree = match parser.parse(source, &parser_options).await {
        Ok(tree) => tree,
        Err(error) => {
            warn!(language, %error, "structural parsing failed, falling back");
            return fallback_chunks(source, options.max_chunk_size);
        }
    };

    let mut chunks = extract_semantic_chunks(&tree, config, options);

    if options.parse_embedded {
        if let Some(config) = config.filter(|c| !c.embedded.is_empty()) {
            chunks = embedded::parse_embedded_chunks(chunks, config, options).await;
        }
    }

    let merged = merge_small_chunks(chunks, options.min_chunk_size);

    if merged.is_empty() {
        // Parsed fine but nothing was a boundary; keep the whole input.
        return vec![ChunkResult::new(
            source.to_string(),
            "unknown",
            1,
            source.lines().count().max(1),
        )
        .with_meta("fallback", json!(true))
        .with_meta("reason", json!("no-semantic-boundaries"))];
    }

    merged
}

/// Content-only projection of [`chunk`], in the same order, for callers that
/// discard line and type metadata.
pub async fn chunk_texts(source: &str, path: &str, options: &ChunkOptions) -> Vec<String> {
    chunk(source, path, options)
        .await
        .into_iter()
        .map(|c| c.content)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_single_function_single_chunk() {
        let source = "\
fn compute(input: u32) -> u32 {
    let a = input + 1;
    let b = a * 2;
    let c = b - 3;
    let d = c / 4;
    let e = d + 5;
    let f = e * 6;
    let g = f - 7;
    let h = g / 8;
    h
}";
        let chunks = chunk(source, "compute.rs", &ChunkOptions::default()).await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, "function_item");
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks[0].end_line, 10);
        assert!(chunks[0].is_semantic());
        assert!(chunks[0].metadata.get("split").is_none());
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_list() {
        assert!(chunk("", "lib.rs", &ChunkOptions::default()).await.is_empty());
        assert!(chunk("   \n\n  ", "lib.rs", &ChunkOptions::default())
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_extension_falls_back() {
        let chunks = chunk(
            "some plain prose\nwith two lines",
            "notes.xyz",
            &ChunkOptions::default(),
        )
        .await;

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.is_fallback()));
    }

    #[tokio::test]
    async fn test_start_lines_are_non_decreasing() {
        let source = "\
use std::collections::HashMap;

fn first() -> u32 {
    1
}

struct Config {
    value: u32,
}

fn second() -> u32 {
    2
}
";
        let chunks = chunk(source, "lib.rs", &ChunkOptions::default()).await;

        assert!(chunks.len() >= 3);
        for pair in chunks.windows(2) {
            assert!(pair[0].start_line <= pair[1].start_line);
        }
    }

    #[tokio::test]
    async fn test_context_prefix_prepended() {
        let source = "\
use std::fmt::Display;

fn show(value: impl Display) {
    println!(\"{value}\");
}
";
        let chunks = chunk(source, "show.rs", &ChunkOptions::default()).await;

        let function = chunks
            .iter()
            .find(|c| c.chunk_type == "function_item")
            .unwrap();
        assert!(function.content.starts_with("use std::fmt::Display;\n\n"));
        assert!(function.content.contains("fn show"));

        let without = chunk(source, "show.rs", &ChunkOptions::default().without_context()).await;
        let function = without
            .iter()
            .find(|c| c.chunk_type == "function_item")
            .unwrap();
        assert!(function.content.starts_with("fn show"));
    }

    #[tokio::test]
    async fn test_size_budget_respected() {
        let body: String = (0..40)
            .map(|i| format!("    let v{i} = {i} * {i};\n"))
            .collect();
        let source = format!("fn big() {{\n{body}}}\n");
        let options = ChunkOptions::default().with_max_size(200);

        let chunks = chunk(&source, "big.rs", &options).await;

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            if !chunk.is_fallback() {
                assert!(
                    chunk.content.len() <= 200,
                    "over budget: {} chars ({})",
                    chunk.content.len(),
                    chunk.chunk_type
                );
            }
        }
    }

    #[tokio::test]
    async fn test_python_module_wrapper_is_unwrapped() {
        let source = "\
import os

def alpha():
    return 1

def beta():
    return 2
";
        let chunks = chunk(source, "mod.py", &ChunkOptions::default()).await;

        let types: Vec<&str> = chunks.iter().map(|c| c.chunk_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["function_definition", "function_definition"]
        );
        assert!(chunks[0].content.contains("import os"));
        assert!(chunks[0].content.contains("def alpha"));
    }

    #[tokio::test]
    async fn test_markdown_embedded_rust_is_rechunked() {
        let source = "\
# Usage

Call it like this:

```rust
fn main() {
    run();
}
```
";
        let chunks = chunk(source, "README.md", &ChunkOptions::default()).await;

        let embedded: Vec<_> = chunks
            .iter()
            .filter(|c| c.metadata.get("embeddedLanguage").is_some())
            .collect();
        assert!(!embedded.is_empty());
        for chunk in &embedded {
            assert_eq!(
                chunk.metadata.get("embeddedLanguage"),
                Some(&json!("rust"))
            );
            assert_eq!(
                chunk.metadata.get("embeddedIn"),
                Some(&json!("fenced_code_block"))
            );
        }

        // The fence opens on host line 5; inner line r re-anchors to
        // host_start + r - 1, so the function at inner lines 1..=3 lands
        // on 5..=7.
        let function = embedded
            .iter()
            .find(|c| c.chunk_type == "function_item")
            .unwrap();
        assert_eq!(function.start_line, 5);
        assert_eq!(function.end_line, 7);
    }

    #[tokio::test]
    async fn test_untagged_fence_kept_as_host_chunk() {
        let source = "\
Intro paragraph that is long enough to stand on its own as a chunk of text
so the merger does not fold it into the fence below.

```
no language tag here
```
";
        let options = ChunkOptions::default().with_min_size(10);
        let chunks = chunk(source, "doc.md", &options).await;

        assert!(chunks
            .iter()
            .any(|c| c.chunk_type == "fenced_code_block"));
        assert!(chunks
            .iter()
            .all(|c| c.metadata.get("embeddedLanguage").is_none()));
    }

    #[tokio::test]
    async fn test_embedding_disabled_keeps_fence_chunks() {
        let source = "```rust\nfn main() {}\n```\n";
        let options = ChunkOptions::default().without_embedded();

        let chunks = chunk(source, "doc.md", &options).await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, "fenced_code_block");
        assert!(chunks[0].metadata.get("embeddedLanguage").is_none());
    }

    #[tokio::test]
    async fn test_no_boundaries_single_fallback_chunk() {
        // Valid rust, but expression statements only, so no boundary items.
        let source = "my_macro_call!();\n";
        let options = ChunkOptions::default().with_node_types(&["function_item"]);

        let chunks = chunk(source, "script.rs", &options).await;

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_fallback());
        assert_eq!(
            chunks[0].metadata.get("reason"),
            Some(&json!("no-semantic-boundaries"))
        );
        assert_eq!(chunks[0].start_line, 1);
    }

    #[tokio::test]
    async fn test_chunk_texts_projection() {
        let source = "fn a() {}\n\nfn b() {}\n";
        let chunks = chunk(source, "x.rs", &ChunkOptions::default()).await;
        let texts = chunk_texts(source, "x.rs", &ChunkOptions::default()).await;

        assert_eq!(
            texts,
            chunks.iter().map(|c| c.content.clone()).collect::<Vec<_>>()
        );
    }
}
