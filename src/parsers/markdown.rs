//! Line-based structural parser for markdown.
//!
//! Produces a shallow block-level tree: a `document` wrapper with
//! `heading` / `paragraph` / `fenced_code_block` / `list` / `block_quote`
//! children. Fenced blocks record their info-string language under the
//! `lang` data key, which is what drives embedded-region chunking.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::ParserPlugin;
use crate::types::{NodeId, Position, Span, SyntaxTree};

/// Markdown parser plugin.
pub struct MarkdownParser;

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ParserPlugin for MarkdownParser {
    fn name(&self) -> &'static str {
        "markdown"
    }

    async fn parse(&self, source: &str, _options: &Map<String, Value>) -> Result<SyntaxTree> {
        Ok(parse_blocks(source))
    }
}

struct LineTable<'a> {
    lines: Vec<&'a str>,
    starts: Vec<usize>,
}

impl<'a> LineTable<'a> {
    fn build(source: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut starts = Vec::new();
        let mut offset = 0;
        for raw in source.split_inclusive('\n') {
            lines.push(raw.trim_end_matches('\n').trim_end_matches('\r'));
            starts.push(offset);
            offset += raw.len();
        }
        Self { lines, starts }
    }

    fn span(&self, start_line: usize, end_line: usize) -> Span {
        let end_len = self.lines[end_line].len();
        Span::new(
            Position::new(start_line, 0, self.starts[start_line]),
            Position::new(end_line, end_len, self.starts[end_line] + end_len),
        )
    }
}

fn parse_blocks(source: &str) -> SyntaxTree {
    let mut tree = SyntaxTree::new("markdown", source);
    let table = LineTable::build(source);
    if table.lines.is_empty() {
        return tree;
    }

    let doc_span = table.span(0, table.lines.len() - 1);
    let doc = tree.push_node("document", Some(doc_span), tree.root, Map::new());

    let mut i = 0;
    while i < table.lines.len() {
        let line = table.lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if let Some((fence_char, fence_len, info)) = open_fence(line) {
            let mut j = i + 1;
            while j < table.lines.len() && !closes_fence(table.lines[j], fence_char, fence_len) {
                j += 1;
            }
            // Unclosed fences run to end of input.
            let end = j.min(table.lines.len() - 1);
            let mut data = Map::new();
            if let Some(lang) = info.split_whitespace().next() {
                data.insert("lang".to_string(), json!(lang));
            }
            push_block(&mut tree, &table, doc, "fenced_code_block", i, end, data);
            i = j + 1;
        } else if let Some(level) = heading_level(line) {
            let data = Map::from_iter([("level".to_string(), json!(level))]);
            push_block(&mut tree, &table, doc, "heading", i, i, data);
            i += 1;
        } else if line.trim_start().starts_with('>') {
            let end = consume_while(&table, i, |l| l.trim_start().starts_with('>'));
            push_block(&mut tree, &table, doc, "block_quote", i, end, Map::new());
            i = end + 1;
        } else if is_list_line(line) {
            // Indented continuation lines belong to the list.
            let end = consume_while(&table, i, |l| {
                !l.trim().is_empty() && (is_list_line(l) || l.starts_with(' ') || l.starts_with('\t'))
            });
            push_block(&mut tree, &table, doc, "list", i, end, Map::new());
            i = end + 1;
        } else {
            let end = consume_while(&table, i, |l| {
                !l.trim().is_empty()
                    && open_fence(l).is_none()
                    && heading_level(l).is_none()
                    && !l.trim_start().starts_with('>')
            });
            push_block(&mut tree, &table, doc, "paragraph", i, end, Map::new());
            i = end + 1;
        }
    }

    tree
}

fn push_block(
    tree: &mut SyntaxTree,
    table: &LineTable,
    parent: NodeId,
    kind: &str,
    start_line: usize,
    end_line: usize,
    data: Map<String, Value>,
) {
    let span = table.span(start_line, end_line);
    tree.push_node(kind, Some(span), parent, data);
}

/// Last line index (from `start`) for which `keep` holds.
fn consume_while(table: &LineTable, start: usize, keep: impl Fn(&str) -> bool) -> usize {
    let mut end = start;
    while end + 1 < table.lines.len() && keep(table.lines[end + 1]) {
        end += 1;
    }
    end
}

/// Fence opener: at least three backticks or tildes, returning the fence
/// character, its run length, and the trailing info string.
fn open_fence(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start();
    for fence_char in ['`', '~'] {
        let run = trimmed.chars().take_while(|&c| c == fence_char).count();
        if run >= 3 {
            return Some((fence_char, run, trimmed[run..].trim()));
        }
    }
    None
}

fn closes_fence(line: &str, fence_char: char, fence_len: usize) -> bool {
    let trimmed = line.trim();
    let run = trimmed.chars().take_while(|&c| c == fence_char).count();
    run >= fence_len && trimmed.chars().all(|c| c == fence_char)
}

fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        let rest = &line[hashes..];
        if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t') {
            return Some(hashes);
        }
    }
    None
}

fn is_list_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        return !rest.is_empty();
    }
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        return rest.starts_with(". ") || rest.starts_with(") ");
    }
    false
}
