//! Tree-sitter backed parser plugin.
//!
//! Converts a tree-sitter parse into the arena [`SyntaxTree`] the chunking
//! engine consumes. Only named grammar nodes are carried over; punctuation
//! and keyword tokens are noise for chunking purposes.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tree_sitter::{Language, Node, Parser};

use super::ParserPlugin;
use crate::types::{NodeId, Position, Span, SyntaxTree};

/// Parser plugin wrapping one tree-sitter grammar.
pub struct TreeSitterParser {
    language_id: String,
    grammar: Language,
}

impl TreeSitterParser {
    /// Create a plugin for a language, if a grammar is compiled in.
    pub fn for_language(language: &str) -> Option<Self> {
        grammar_for(language).map(|grammar| Self {
            language_id: language.to_string(),
            grammar,
        })
    }

    /// Languages with a compiled-in grammar.
    pub fn available_languages() -> Vec<&'static str> {
        vec![
            "python",
            "javascript",
            "jsx",
            "typescript",
            "tsx",
            "go",
            "rust",
            "java",
            "c",
            "cpp",
            "ruby",
        ]
    }
}

/// Get the compiled grammar for a language name.
fn grammar_for(name: &str) -> Option<Language> {
    match name {
        "python" => Some(tree_sitter_python::language()),
        "javascript" | "jsx" => Some(tree_sitter_javascript::language()),
        "typescript" => Some(tree_sitter_typescript::language_typescript()),
        "tsx" => Some(tree_sitter_typescript::language_tsx()),
        "go" => Some(tree_sitter_go::language()),
        "rust" => Some(tree_sitter_rust::language()),
        "java" => Some(tree_sitter_java::language()),
        "c" => Some(tree_sitter_c::language()),
        "cpp" => Some(tree_sitter_cpp::language()),
        "ruby" => Some(tree_sitter_ruby::language()),
        _ => None,
    }
}

#[async_trait]
impl ParserPlugin for TreeSitterParser {
    fn name(&self) -> &'static str {
        "tree-sitter"
    }

    async fn parse(&self, source: &str, _options: &Map<String, Value>) -> Result<SyntaxTree> {
        // Parser is not Sync, so a fresh one per call.
        let mut parser = Parser::new();
        parser.set_language(&self.grammar)?;

        let ts_tree = parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| anyhow!("tree-sitter returned no tree for {}", self.language_id))?;

        let mut tree = SyntaxTree::new(&self.language_id, source);
        let root = tree.root;
        convert_node(&mut tree, ts_tree.root_node(), root);
        Ok(tree)
    }
}

/// Recursively copy a tree-sitter node (and its named descendants) into the
/// arena under `parent`. The grammar root lands as the single child of the
/// synthetic arena root, preserving its role as the implicit wrapper node.
fn convert_node(tree: &mut SyntaxTree, node: Node, parent: NodeId) {
    let span = Span::new(
        Position::new(
            node.start_position().row,
            node.start_position().column,
            node.start_byte(),
        ),
        Position::new(
            node.end_position().row,
            node.end_position().column,
            node.end_byte(),
        ),
    );

    let id = tree.push_node(node.kind(), Some(span), parent, Map::new());

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        convert_node(tree, child, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(language: &str, source: &str) -> SyntaxTree {
        let parser = TreeSitterParser::for_language(language).unwrap();
        parser.parse(source, &Map::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_parse_rust_top_level_items() {
        let tree = parse(
            "rust",
            "use std::fmt;\n\nfn main() {\n    println!(\"hi\");\n}\n",
        )
        .await;

        // Synthetic root wraps the grammar root.
        let root = tree.node(tree.root).unwrap();
        assert_eq!(root.children.len(), 1);
        let source_file = tree.node(root.children[0]).unwrap();
        assert_eq!(source_file.kind, "source_file");

        let kinds: Vec<&str> = source_file
            .children
            .iter()
            .map(|&id| tree.node(id).unwrap().kind.as_str())
            .collect();
        assert!(kinds.contains(&"use_declaration"));
        assert!(kinds.contains(&"function_item"));
    }

    #[tokio::test]
    async fn test_spans_are_exact_slices() {
        let source = "fn one() {}\nfn two() {}\n";
        let tree = parse("rust", source).await;
        let source_file = tree.node(1).unwrap();

        let first = tree.node(source_file.children[0]).unwrap();
        assert_eq!(tree.source_text(first), "fn one() {}");
        let span = first.span.unwrap();
        assert_eq!(span.start.line, 0);
        assert_eq!(span.end.line, 0);

        let second = tree.node(source_file.children[1]).unwrap();
        assert_eq!(second.span.unwrap().start.line, 1);
    }

    #[tokio::test]
    async fn test_python_module_wrapper() {
        let tree = parse("python", "def hello():\n    return 1\n").await;
        let root = tree.node(tree.root).unwrap();
        let module = tree.node(root.children[0]).unwrap();
        assert_eq!(module.kind, "module");
        assert_eq!(
            tree.node(module.children[0]).unwrap().kind,
            "function_definition"
        );
    }

    #[test]
    fn test_unknown_grammar() {
        assert!(TreeSitterParser::for_language("cobol").is_none());
    }
}
