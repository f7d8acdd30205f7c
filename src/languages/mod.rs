//! Language configuration registry and path-based language detection.
//!
//! The registry describes, per language, which grammar node types are chunk
//! boundaries, which carry shared context (imports, type declarations), and
//! which host embedded code written in another language.

use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use serde_json::{Map, Value};

/// A rule describing a node type that hosts code in another language.
#[derive(Debug, Clone)]
pub struct EmbeddedRule {
    /// Node type that hosts the embedded region (e.g., "fenced_code_block")
    pub node_type: &'static str,
    /// Whether the engine should recursively chunk the embedded content
    pub recursive: bool,
    /// Node data key holding the declared language (e.g., a fence's info string)
    pub lang_attr: Option<&'static str>,
    /// Language to assume when no per-instance attribute is present
    pub default_language: Option<&'static str>,
}

/// Per-language chunking configuration.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Node types that are chunkable units
    pub boundaries: &'static [&'static str],
    /// Node types whose text is prepended as shared context
    pub context_types: &'static [&'static str],
    /// Rules for regions written in another language
    pub embedded: &'static [EmbeddedRule],
    /// Options passed through to the parser plugin
    pub parser_options: Map<String, Value>,
}

impl LanguageConfig {
    fn new(
        boundaries: &'static [&'static str],
        context_types: &'static [&'static str],
        embedded: &'static [EmbeddedRule],
    ) -> Self {
        Self {
            boundaries,
            context_types,
            embedded,
            parser_options: Map::new(),
        }
    }

    /// Check whether a node type is a chunk boundary.
    pub fn is_boundary(&self, node_type: &str) -> bool {
        self.boundaries.contains(&node_type)
    }

    /// Check whether a node type carries shared context.
    pub fn is_context(&self, node_type: &str) -> bool {
        self.context_types.contains(&node_type)
    }

    /// First embedding rule matching a node type, if any.
    pub fn embedded_rule_for(&self, node_type: &str) -> Option<&EmbeddedRule> {
        self.embedded.iter().find(|e| e.node_type == node_type)
    }
}

static MARKDOWN_EMBEDDED: &[EmbeddedRule] = &[EmbeddedRule {
    node_type: "fenced_code_block",
    recursive: true,
    lang_attr: Some("lang"),
    default_language: None,
}];

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, LanguageConfig> = build_registry();
}

fn build_registry() -> HashMap<&'static str, LanguageConfig> {
    let mut registry = HashMap::new();

    registry.insert(
        "rust",
        LanguageConfig::new(
            &[
                "function_item",
                "struct_item",
                "enum_item",
                "trait_item",
                "impl_item",
                "mod_item",
                "macro_definition",
                "const_item",
                "static_item",
                "type_item",
            ],
            &["use_declaration"],
            &[],
        ),
    );

    registry.insert(
        "python",
        LanguageConfig::new(
            &[
                "function_definition",
                "decorated_definition",
                "class_definition",
            ],
            &["import_statement", "import_from_statement"],
            &[],
        ),
    );

    let js_boundaries: &'static [&'static str] = &[
        "function_declaration",
        "generator_function_declaration",
        "class_declaration",
        "lexical_declaration",
        "variable_declaration",
        "export_statement",
    ];
    registry.insert(
        "javascript",
        LanguageConfig::new(js_boundaries, &["import_statement"], &[]),
    );
    registry.insert(
        "jsx",
        LanguageConfig::new(js_boundaries, &["import_statement"], &[]),
    );

    let ts_boundaries: &'static [&'static str] = &[
        "function_declaration",
        "generator_function_declaration",
        "class_declaration",
        "abstract_class_declaration",
        "lexical_declaration",
        "variable_declaration",
        "export_statement",
        "interface_declaration",
        "type_alias_declaration",
        "enum_declaration",
        "module",
    ];
    registry.insert(
        "typescript",
        LanguageConfig::new(ts_boundaries, &["import_statement"], &[]),
    );
    registry.insert(
        "tsx",
        LanguageConfig::new(ts_boundaries, &["import_statement"], &[]),
    );

    registry.insert(
        "go",
        LanguageConfig::new(
            &[
                "function_declaration",
                "method_declaration",
                "type_declaration",
                "const_declaration",
                "var_declaration",
            ],
            &["package_clause", "import_declaration"],
            &[],
        ),
    );

    registry.insert(
        "java",
        LanguageConfig::new(
            &[
                "class_declaration",
                "interface_declaration",
                "enum_declaration",
                "annotation_type_declaration",
            ],
            &["package_declaration", "import_declaration"],
            &[],
        ),
    );

    registry.insert(
        "c",
        LanguageConfig::new(
            &[
                "function_definition",
                "struct_specifier",
                "enum_specifier",
                "union_specifier",
                "type_definition",
                "declaration",
            ],
            &["preproc_include"],
            &[],
        ),
    );

    registry.insert(
        "cpp",
        LanguageConfig::new(
            &[
                "function_definition",
                "struct_specifier",
                "enum_specifier",
                "union_specifier",
                "class_specifier",
                "namespace_definition",
                "template_declaration",
                "type_definition",
                "declaration",
            ],
            &["preproc_include", "using_declaration"],
            &[],
        ),
    );

    registry.insert(
        "ruby",
        LanguageConfig::new(&["method", "singleton_method", "class", "module"], &[], &[]),
    );

    registry.insert(
        "markdown",
        LanguageConfig::new(
            &[
                "heading",
                "paragraph",
                "fenced_code_block",
                "list",
                "block_quote",
            ],
            &[],
            MARKDOWN_EMBEDDED,
        ),
    );

    registry
}

/// Get the chunking configuration for a language, if one is registered.
pub fn config_for(language: &str) -> Option<&'static LanguageConfig> {
    REGISTRY.get(language.to_lowercase().as_str())
}

/// List the languages with a registered configuration.
pub fn supported_languages() -> Vec<String> {
    let mut languages: Vec<String> = REGISTRY.keys().map(|k| k.to_string()).collect();
    languages.sort();
    languages
}

/// Detect the language id for a file path or identifier.
///
/// Checks well-known filenames first, then the extension map. Returns `None`
/// for unrecognized inputs, which routes the caller to fallback chunking.
pub fn language_from_path(path: &str) -> Option<String> {
    let path = Path::new(path);
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    let by_filename = match filename {
        "Rakefile" | "Gemfile" => Some("ruby"),
        "go.mod" | "go.sum" => Some("go"),
        _ => None,
    };
    if let Some(lang) = by_filename {
        return Some(lang.to_string());
    }

    let extension = path.extension().and_then(|e| e.to_str())?;
    let language = match extension.to_lowercase().as_str() {
        "rs" => "rust",
        "py" | "pyi" | "pyw" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => "cpp",
        "rb" | "rake" => "ruby",
        "md" | "markdown" => "markdown",
        // Bare language ids used when re-entering the pipeline for
        // embedded regions (e.g., "block.rust")
        other => {
            return config_for(other).map(|_| other.to_string());
        }
    };
    Some(language.to_string())
}
