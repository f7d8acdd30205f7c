//! Core type definitions.

pub mod chunk;
pub mod config;
pub mod tree;

pub use chunk::{ChunkOptions, ChunkResult};
pub use config::ServiceConfig;
pub use tree::{NodeId, Position, Span, SyntaxNode, SyntaxTree};
