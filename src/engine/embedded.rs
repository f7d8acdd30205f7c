//! Recursive chunking of embedded code regions.
//!
//! A chunk whose type matches a recursive embedding rule (e.g., a fenced
//! code block in markdown) is re-chunked as an independent input of the
//! embedded language, with embedding disabled for the nested call so exactly
//! one level is ever unwound. Inner chunks are re-anchored to the host
//! chunk's line offset.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use crate::languages::{EmbeddedRule, LanguageConfig};
use crate::types::{ChunkOptions, ChunkResult};

lazy_static! {
    /// One layer of fence decoration: opening fence line, payload, closing
    /// fence line.
    static ref FENCE_RE: Regex =
        Regex::new(r"(?ms)\A[ \t]*(?:```+|~~~+)[^\n]*\n(.*?)\n[ \t]*(?:```+|~~~+)[ \t]*\z")
            .unwrap();
}

/// Languages that mark a region as deliberately unparsed.
const PLAIN_TEXT_SENTINELS: &[&str] = &["text", "plain", "txt"];

/// Determine the embedded language for a chunk: a per-instance attribute
/// (e.g., the fence's declared language tag) wins over the rule's default.
fn embedded_language(chunk: &ChunkResult, rule: &EmbeddedRule) -> Option<String> {
    if let Some(attr) = rule.lang_attr {
        if let Some(Value::String(lang)) = chunk.metadata.get(attr) {
            if !lang.is_empty() {
                return Some(lang.to_lowercase());
            }
        }
    }
    rule.default_language.map(|lang| lang.to_string())
}

/// Strip a single layer of fence decoration, if present.
fn strip_fence(content: &str) -> &str {
    match FENCE_RE.captures(content) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(content),
        None => content,
    }
}

/// Re-chunk embedded regions in place. Chunks without a matching recursive
/// rule, with an unresolvable or plain-text language, or whose nested parse
/// only produced a degraded fallback are kept unchanged.
pub async fn parse_embedded_chunks(
    chunks: Vec<ChunkResult>,
    config: &LanguageConfig,
    options: &ChunkOptions,
) -> Vec<ChunkResult> {
    let mut result = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let rule = config
            .embedded_rule_for(&chunk.chunk_type)
            .filter(|r| r.recursive);
        let Some(rule) = rule else {
            result.push(chunk);
            continue;
        };

        let Some(language) = embedded_language(&chunk, rule) else {
            result.push(chunk);
            continue;
        };
        if PLAIN_TEXT_SENTINELS.contains(&language.as_str()) {
            result.push(chunk);
            continue;
        }

        let payload = strip_fence(&chunk.content).to_string();
        let inner_options = ChunkOptions {
            parse_embedded: false,
            ..options.clone()
        };
        let sub_chunks =
            Box::pin(crate::engine::chunk_language(&payload, &language, &inner_options)).await;

        // A nested result that is empty or leads with a fallback chunk means
        // structural parsing of the embedded language failed; keep the host
        // chunk rather than degrade it.
        if sub_chunks.first().map_or(true, |c| c.is_fallback()) {
            debug!(%language, "embedded parse degraded, keeping host chunk");
            result.push(chunk);
            continue;
        }

        for mut sub in sub_chunks {
            sub.start_line = chunk.start_line + sub.start_line - 1;
            sub.end_line = chunk.start_line + sub.end_line - 1;
            sub.metadata
                .insert("embeddedIn".to_string(), json!(chunk.chunk_type));
            sub.metadata
                .insert("embeddedLanguage".to_string(), json!(language));
            result.push(sub);
        }
    }

    result
}
