//! Parser plugins and the process-wide parser handle cache.
//!
//! A parser plugin turns a source buffer into an arena [`SyntaxTree`].
//! Plugins are resolved by language id through [`ParserCache::resolve`],
//! which memoizes both successful loads and known-missing languages for
//! the lifetime of the process.

pub mod markdown;
pub mod tree_sitter;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::SyntaxTree;

pub use markdown::MarkdownParser;
pub use tree_sitter::TreeSitterParser;

/// A structural parser for one language.
///
/// `parse` is async because some grammar backends require out-of-process or
/// compiled-module initialization; the engine awaits parses strictly in
/// sequence.
#[async_trait]
pub trait ParserPlugin: Send + Sync {
    /// Plugin name for diagnostics.
    fn name(&self) -> &'static str;

    /// Parse a source buffer into a syntax tree. May fail; the caller treats
    /// failure as a fallback condition, never a hard error.
    async fn parse(&self, source: &str, options: &Map<String, Value>) -> Result<SyntaxTree>;
}

/// Factory producing a parser plugin for a language.
pub type ParserFactory = fn(language: &str) -> Result<Arc<dyn ParserPlugin>>;

struct CacheInner {
    factories: HashMap<String, ParserFactory>,
    resolved: HashMap<String, Option<Arc<dyn ParserPlugin>>>,
}

/// Resolves language ids to loaded parser handles, memoized per process.
///
/// A `None` entry records a language known to have no parser, so missing
/// parsers are probed at most once. There is no invalidation: parser plugins
/// are immutable for the process lifetime.
pub struct ParserCache {
    inner: Mutex<CacheInner>,
}

impl Default for ParserCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                factories: HashMap::new(),
                resolved: HashMap::new(),
            }),
        }
    }

    /// Register a parser factory for a language id. Clears any cached
    /// "unavailable" sentinel for that language.
    pub fn register(&self, language: &str, factory: ParserFactory) {
        let key = language.to_lowercase();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.resolved.remove(&key);
        inner.factories.insert(key, factory);
    }

    /// Resolve a language id to a parser handle.
    ///
    /// Lookup order: cached result (including the unavailable sentinel),
    /// registered factory, builtin discovery by language id. Load failures
    /// are logged and fall through to the next strategy; if everything fails
    /// the miss itself is cached.
    pub fn resolve(&self, language: &str) -> Option<Arc<dyn ParserPlugin>> {
        let key = language.to_lowercase();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(cached) = inner.resolved.get(&key) {
            return cached.clone();
        }

        let mut handle: Option<Arc<dyn ParserPlugin>> = None;

        if let Some(factory) = inner.factories.get(&key) {
            match factory(&key) {
                Ok(parser) => handle = Some(parser),
                Err(error) => {
                    warn!(language = %key, %error, "registered parser failed to load");
                }
            }
        }

        if handle.is_none() {
            handle = builtin_parser(&key);
            if handle.is_some() {
                debug!(language = %key, "loaded builtin parser");
            }
        }

        if handle.is_none() {
            debug!(language = %key, "no parser available, caching miss");
        }
        inner.resolved.insert(key, handle.clone());
        handle
    }
}

/// Convention-based discovery of builtin plugins by language id.
fn builtin_parser(language: &str) -> Option<Arc<dyn ParserPlugin>> {
    if language == "markdown" {
        return Some(Arc::new(MarkdownParser::new()));
    }
    TreeSitterParser::for_language(language).map(|p| Arc::new(p) as Arc<dyn ParserPlugin>)
}

lazy_static! {
    /// Process-wide parser cache used by the chunking engine.
    pub static ref PARSER_CACHE: ParserCache = ParserCache::new();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_resolve_builtin_languages() {
        let cache = ParserCache::new();
        assert!(cache.resolve("rust").is_some());
        assert!(cache.resolve("markdown").is_some());
        assert!(cache.resolve("Python").is_some());
    }

    #[test]
    fn test_unknown_language_is_cached_miss() {
        let cache = ParserCache::new();
        assert!(cache.resolve("cobol").is_none());
        // Second lookup hits the sentinel, not the discovery path.
        assert!(cache.resolve("cobol").is_none());
    }

    #[test]
    fn test_broken_factory_falls_through_to_builtin() {
        fn broken(_: &str) -> Result<Arc<dyn ParserPlugin>> {
            Err(anyhow!("plugin missing"))
        }

        let cache = ParserCache::new();
        cache.register("rust", broken);
        // Factory fails, builtin discovery still finds the grammar.
        assert!(cache.resolve("rust").is_some());
    }

    #[test]
    fn test_register_clears_miss_sentinel() {
        fn markdown_factory(_: &str) -> Result<Arc<dyn ParserPlugin>> {
            Ok(Arc::new(MarkdownParser::new()))
        }

        let cache = ParserCache::new();
        assert!(cache.resolve("wiki").is_none());
        cache.register("wiki", markdown_factory);
        assert!(cache.resolve("wiki").is_some());
    }
}
