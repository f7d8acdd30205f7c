//! Character/line-budget fallback segmentation.
//!
//! Used when no parser exists for a language, structural parsing fails, or a
//! leaf node exceeds the size budget. Splitting prefers line boundaries, then
//! word boundaries, then raw character boundaries.

use serde_json::json;
use unicode_segmentation::UnicodeSegmentation;

use crate::types::ChunkResult;

/// Split a text blob into pieces no larger than `max_chunk_size` bytes.
pub fn split_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    let max = max_chunk_size.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();

    for raw in text.split_inclusive('\n') {
        let line = raw.trim_end_matches('\n');
        if line.len() > max {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            pieces.extend(split_long_line(line, max));
            continue;
        }
        if !current.is_empty() && current.len() + 1 + line.len() > max {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Split a single over-budget line at word boundaries, falling back to
/// character boundaries for words longer than the budget itself.
fn split_long_line(line: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in line.split_word_bounds() {
        if word.len() > max {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            for ch in word.chars() {
                if current.len() + ch.len_utf8() > max {
                    pieces.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
            continue;
        }
        if !current.is_empty() && current.len() + word.len() > max {
            pieces.push(std::mem::take(&mut current));
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Chunk a whole source buffer without structural analysis, tracking line
/// numbers as it goes. Every produced chunk is tagged `fallback`.
pub fn fallback_chunks(source: &str, max_chunk_size: usize) -> Vec<ChunkResult> {
    let max = max_chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut index = 0;
    let mut buffer = String::new();
    // First line covered by the buffer. Tracked separately from the buffer
    // content so blank lines still occupy a line range.
    let mut buffer_start: Option<usize> = None;

    let mut emit = |content: String, start: usize, end: usize, index: &mut usize| {
        chunks.push(
            ChunkResult::new(content, "text", start, end)
                .with_meta("fallback", json!(true))
                .with_meta("index", json!(*index)),
        );
        *index += 1;
    };

    for (line_idx, line) in source.lines().enumerate() {
        let line_no = line_idx + 1;

        if line.len() > max {
            if let Some(start) = buffer_start.take() {
                emit(std::mem::take(&mut buffer), start, line_no - 1, &mut index);
            }
            // All pieces of one long line share its line number.
            for piece in split_long_line(line, max) {
                emit(piece, line_no, line_no, &mut index);
            }
            continue;
        }

        if buffer_start.is_some() && buffer.len() + 1 + line.len() > max {
            let start = buffer_start.take().unwrap_or(line_no);
            emit(std::mem::take(&mut buffer), start, line_no - 1, &mut index);
        }

        match buffer_start {
            Some(_) => buffer.push('\n'),
            None => buffer_start = Some(line_no),
        }
        buffer.push_str(line);
    }

    if let Some(start) = buffer_start {
        emit(buffer, start, source.lines().count(), &mut index);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_respects_budget() {
        let text = "line one\nline two\nline three\n";
        for piece in split_text(text, 12) {
            assert!(piece.len() <= 12, "piece too large: {:?}", piece);
        }
    }

    #[test]
    fn test_small_text_single_piece() {
        let pieces = split_text("hello world", 100);
        assert_eq!(pieces, vec!["hello world"]);
    }

    #[test]
    fn test_long_line_splits_at_word_boundaries() {
        let text = "alpha beta gamma delta epsilon";
        let pieces = split_text(text, 12);
        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.len() <= 12);
        }
        assert_eq!(pieces.concat(), text);
    }

    #[test]
    fn test_word_longer_than_budget_hard_splits() {
        let pieces = split_text("abcdefghij", 4);
        assert_eq!(pieces, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_fallback_chunks_line_coverage() {
        let source = "one\ntwo\nthree\nfour\nfive";
        let chunks = fallback_chunks(source, 9);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.is_fallback()));

        // Line ranges cover 1..=5 without gaps.
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks.last().unwrap().end_line, 5);
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start_line, pair[0].end_line + 1);
        }
    }

    #[test]
    fn test_blank_line_at_budget_boundary_stays_covered() {
        // The blank line forces a flush exactly at the budget; it must still
        // occupy a line range of its own.
        let chunks = fallback_chunks("aaaa\n\nbbbb", 4);

        let ranges: Vec<_> = chunks.iter().map(|c| (c.start_line, c.end_line)).collect();
        assert_eq!(ranges, vec![(1, 1), (2, 2), (3, 3)]);
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start_line, pair[0].end_line + 1);
        }
    }

    #[test]
    fn test_leading_blank_lines_are_covered() {
        let chunks = fallback_chunks("\n\nhello", 100);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks[0].end_line, 3);
    }

    #[test]
    fn test_fallback_chunks_indexed_in_order() {
        let chunks = fallback_chunks("aaaa\nbbbb\ncccc", 5);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.get("index"), Some(&json!(i)));
        }
    }

    #[test]
    fn test_oversized_line_keeps_line_number() {
        let source = "short\nthis line is much longer than the tiny budget\nend";
        let chunks = fallback_chunks(source, 10);
        let middle: Vec<_> = chunks.iter().filter(|c| c.start_line == 2).collect();
        assert!(middle.len() > 1);
        assert!(middle.iter().all(|c| c.end_line == 2));
    }
}
