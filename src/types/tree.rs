//! Arena-backed syntax tree produced by parser plugins.
//!
//! Nodes reference each other by dense integer ids into the tree's node
//! table rather than by pointers, which keeps parent/child links cycle-free
//! and lets the chunking engine walk arbitrary tree shapes uniformly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Index of a node in its tree's node table.
pub type NodeId = usize;

/// A position in a source buffer.
///
/// `line` and `column` are zero-based editor coordinates; `offset` is the
/// byte index into the source the tree was parsed from. All three describe
/// the same point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// A half-open span over a source buffer (`end` is exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset);
        Self { start, end }
    }
}

/// A single syntax node.
///
/// A node without a `span` is synthetic (e.g., the arena root) and is never
/// chunked directly. `data` is an opaque attribute bag whose keys are
/// language-specific; the engine reads only documented keys (such as a fence's
/// declared language) and passes everything else through to chunk metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub id: NodeId,
    /// Grammar node type (e.g., "function_item", "fenced_code_block").
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    pub parent: Option<NodeId>,
    /// Children in source order.
    pub children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl SyntaxNode {
    /// Create a synthetic (span-less) node.
    pub fn synthetic(id: NodeId, kind: &str) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            span: None,
            parent: None,
            children: Vec::new(),
            data: Map::new(),
        }
    }
}

/// A parsed syntax tree over one source buffer.
///
/// Created once per parse call and discarded after chunk extraction. Spans
/// are offsets into `source`, which is the exact buffer the tree was parsed
/// from.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// Language identifier the source was parsed as.
    pub language: String,
    /// The buffer the tree was parsed from.
    pub source: String,
    /// Root node id (has no parent).
    pub root: NodeId,
    /// Node table indexed by `NodeId`.
    pub nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Create a tree with a synthetic root node.
    pub fn new(language: &str, source: &str) -> Self {
        Self {
            language: language.to_string(),
            source: source.to_string(),
            root: 0,
            nodes: vec![SyntaxNode::synthetic(0, "root")],
        }
    }

    /// Look up a node by id. Out-of-range ids return `None`.
    pub fn node(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id)
    }

    /// Exact source text covered by a node's span, or `""` for synthetic nodes.
    pub fn source_text(&self, node: &SyntaxNode) -> &str {
        match &node.span {
            Some(span) => &self.source[span.start.offset..span.end.offset],
            None => "",
        }
    }

    /// Append a node under `parent`, returning the new node's id.
    pub fn push_node(
        &mut self,
        kind: &str,
        span: Option<Span>,
        parent: NodeId,
        data: Map<String, Value>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(SyntaxNode {
            id,
            kind: kind.to_string(),
            span,
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent].children.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_text_slicing() {
        let mut tree = SyntaxTree::new("test", "fn main() {}\n");
        let span = Span::new(Position::new(0, 0, 0), Position::new(0, 9, 9));
        let id = tree.push_node("function_item", Some(span), 0, Map::new());

        let node = tree.node(id).unwrap();
        assert_eq!(tree.source_text(node), "fn main()");
    }

    #[test]
    fn test_synthetic_node_has_empty_text() {
        let tree = SyntaxTree::new("test", "hello");
        let root = tree.node(tree.root).unwrap();
        assert_eq!(tree.source_text(root), "");
    }

    #[test]
    fn test_node_lookup_out_of_range() {
        let tree = SyntaxTree::new("test", "");
        assert!(tree.node(42).is_none());
    }

    #[test]
    fn test_children_preserve_insertion_order() {
        let mut tree = SyntaxTree::new("test", "a b c");
        let a = tree.push_node("a", None, 0, Map::new());
        let b = tree.push_node("b", None, 0, Map::new());
        assert_eq!(tree.node(0).unwrap().children, vec![a, b]);
        assert_eq!(tree.node(a).unwrap().parent, Some(0));
    }
}
