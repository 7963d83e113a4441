//! Common types and utilities for the tydl compiler.
//!
//! This crate provides foundational types used across all tydl crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`)
//! - Diagnostic types (`Diagnostic`, `DiagnosticCategory`)

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Diagnostic types shared by the parser, resolver, and CLI
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};
