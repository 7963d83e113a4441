//! Syntax tree and parser for the tydl compiler.
//!
//! The AST uses a thin-node architecture: every node is a 16-byte header
//! (`Node`) stored in a `NodeArena`, with kind-specific payloads in typed
//! storage pools addressed by the header's `data_index`. Nodes are referenced
//! by `NodeIndex` handles, which double as the stable per-compilation node
//! identity used to key compiler side-tables.
//!
//! AST nodes are immutable once built and carry no symbol or resolution
//! state; the binder and resolver keep all of their bookkeeping in external
//! maps keyed by `NodeIndex`.

pub mod parser;
pub mod syntax;

pub use parser::ParserState;
pub use syntax::base::{NodeIndex, NodeList};
pub use syntax::node::{Node, NodeArena};
pub use syntax::{node_flags, syntax_kind_ext};
