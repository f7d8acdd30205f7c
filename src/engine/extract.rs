//! Semantic chunk extraction and size-driven recursive splitting.

use serde_json::json;

use super::fallback::split_text;
use crate::languages::LanguageConfig;
use crate::types::{ChunkOptions, ChunkResult, SyntaxNode, SyntaxTree};

/// Grammar wrapper node types that hold all top-level statements under a
/// single synthetic root. When a tree has exactly one top-level child of one
/// of these types, the extractor scans the wrapper's children instead.
const WRAPPER_TYPES: &[&str] = &[
    "program",
    "module",
    "source_file",
    "document",
    "translation_unit",
];

/// Check whether a node is a chunkable unit for the configured language.
/// Absent config means nothing is a boundary, which routes the caller to
/// fallback behavior.
pub fn is_semantic_boundary(node: &SyntaxNode, config: Option<&LanguageConfig>) -> bool {
    config.map(|c| c.is_boundary(&node.kind)).unwrap_or(false)
}

/// All context nodes (imports, type declarations) in tree order.
pub fn context_nodes<'t>(
    tree: &'t SyntaxTree,
    config: Option<&LanguageConfig>,
) -> Vec<&'t SyntaxNode> {
    let Some(config) = config else {
        return Vec::new();
    };
    if config.context_types.is_empty() {
        return Vec::new();
    }
    tree.nodes
        .iter()
        .filter(|node| config.is_context(&node.kind))
        .collect()
}

/// Walk the top-level children of a parsed tree, emitting one chunk per
/// boundary node and delegating oversized nodes to the recursive splitter.
pub fn extract_semantic_chunks(
    tree: &SyntaxTree,
    config: Option<&LanguageConfig>,
    options: &ChunkOptions,
) -> Vec<ChunkResult> {
    let mut chunks = Vec::new();

    let mut context_prefix = String::new();
    if options.preserve_context {
        let parts: Vec<&str> = context_nodes(tree, config)
            .iter()
            .map(|node| tree.source_text(node))
            .filter(|text| !text.is_empty())
            .collect();
        if !parts.is_empty() {
            context_prefix = parts.join("\n");
            context_prefix.push_str("\n\n");
        }
    }

    let Some(root) = tree.node(tree.root) else {
        return chunks;
    };

    let mut top_level = &root.children;
    if top_level.len() == 1 {
        if let Some(first) = tree.node(top_level[0]) {
            if WRAPPER_TYPES.contains(&first.kind.as_str()) && !first.children.is_empty() {
                top_level = &first.children;
            }
        }
    }

    for &child_id in top_level {
        let Some(node) = tree.node(child_id) else {
            continue;
        };
        let Some(span) = node.span else {
            continue;
        };

        let is_boundary = match &options.node_types {
            Some(types) => types.iter().any(|t| t == &node.kind),
            None => is_semantic_boundary(node, config),
        };
        if !is_boundary {
            // Skipped here; the merger only absorbs chunks the splitter or
            // fallback produced, never arbitrary top-level nodes.
            continue;
        }

        let content = tree.source_text(node);
        let final_content = if options.preserve_context && !context_prefix.is_empty() {
            format!("{context_prefix}{content}")
        } else {
            content.to_string()
        };

        if final_content.len() > options.max_chunk_size {
            // The splitter works on the unprefixed node; prefix size does not
            // propagate into sub-chunks.
            chunks.extend(split_oversized(tree, node, options.max_chunk_size));
        } else {
            let mut chunk = ChunkResult::new(
                final_content,
                &node.kind,
                span.start.line + 1,
                span.end.line + 1,
            );
            chunk.metadata = node.data.clone();
            chunks.push(chunk);
        }
    }

    chunks
}

/// Descend into an oversized node, emitting one chunk per sub-node that fits
/// and recursing further otherwise. Leaves exceeding the budget fall back to
/// raw character segmentation, so recursion always terminates.
pub fn split_oversized(
    tree: &SyntaxTree,
    node: &SyntaxNode,
    max_chunk_size: usize,
) -> Vec<ChunkResult> {
    let mut chunks = Vec::new();

    if !node.children.is_empty() {
        for &child_id in &node.children {
            let Some(child) = tree.node(child_id) else {
                continue;
            };
            let Some(span) = child.span else {
                continue;
            };

            let content = tree.source_text(child);
            if content.len() > max_chunk_size {
                chunks.extend(split_oversized(tree, child, max_chunk_size));
            } else {
                let mut chunk = ChunkResult::new(
                    content.to_string(),
                    &child.kind,
                    span.start.line + 1,
                    span.end.line + 1,
                );
                chunk.metadata = child.data.clone();
                chunks.push(chunk);
            }
        }
    } else {
        // A leaf exceeding the budget (e.g., one long string or comment).
        // Span-less leaves anchor to line 1.
        let (start_line, end_line) = match node.span {
            Some(span) => (span.start.line + 1, span.end.line + 1),
            None => (1, 1),
        };
        let content = tree.source_text(node);
        for (i, piece) in split_text(content, max_chunk_size).into_iter().enumerate() {
            chunks.push(
                ChunkResult::new(piece, &format!("{}[{}]", node.kind, i), start_line, end_line)
                    .with_meta("split", json!(true))
                    .with_meta("index", json!(i)),
            );
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages;
    use crate::types::{Position, Span};
    use serde_json::Map;

    fn leaf_tree(kind: &str, content: &str) -> SyntaxTree {
        let mut tree = SyntaxTree::new("test", content);
        let span = Span::new(
            Position::new(0, 0, 0),
            Position::new(0, content.len(), content.len()),
        );
        tree.push_node(kind, Some(span), 0, Map::new());
        tree
    }

    #[test]
    fn test_oversized_leaf_splits_with_indexed_types() {
        let content = "x".repeat(250);
        let tree = leaf_tree("string_literal", &content);
        let node = tree.node(1).unwrap();

        let chunks = split_oversized(&tree, node, 100);

        assert!(chunks.len() >= 3);
        assert_eq!(chunks[0].chunk_type, "string_literal[0]");
        assert_eq!(chunks[1].chunk_type, "string_literal[1]");
        for chunk in &chunks {
            assert!(!chunk.is_semantic());
            assert!(chunk.content.len() <= 100);
            assert_eq!(chunk.start_line, 1);
        }
    }

    #[test]
    fn test_spanless_leaf_yields_nothing() {
        let mut tree = SyntaxTree::new("test", "some source");
        tree.push_node("blob", None, 0, Map::new());
        let node = tree.node(1).unwrap();
        // No span means no text to split.
        assert!(split_oversized(&tree, node, 50).is_empty());
    }

    #[test]
    fn test_oversized_parent_recurses_into_children() {
        let line_one = "a".repeat(80);
        let line_two = "b".repeat(80);
        let source = format!("{line_one}\n{line_two}");
        let mut tree = SyntaxTree::new("test", &source);

        let parent_span = Span::new(
            Position::new(0, 0, 0),
            Position::new(1, 80, source.len()),
        );
        let parent = tree.push_node("block", Some(parent_span), 0, Map::new());
        let first = Span::new(Position::new(0, 0, 0), Position::new(0, 80, 80));
        tree.push_node("statement", Some(first), parent, Map::new());
        let second = Span::new(Position::new(1, 0, 81), Position::new(1, 80, source.len()));
        tree.push_node("statement", Some(second), parent, Map::new());

        let node = tree.node(parent).unwrap();
        let chunks = split_oversized(&tree, node, 100);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_type, "statement");
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks[1].start_line, 2);
    }

    #[test]
    fn test_no_boundaries_without_config() {
        let tree = leaf_tree("paragraph", "hello");
        let chunks = extract_semantic_chunks(&tree, None, &ChunkOptions::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_explicit_node_types_override_registry() {
        let tree = leaf_tree("weird_node", "hello there");
        let config = languages::config_for("rust");
        let options = ChunkOptions::default().with_node_types(&["weird_node"]);
        let chunks = extract_semantic_chunks(&tree, config, &options);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, "weird_node");
    }
}
