//! Diagnostic types shared by the parser, resolver, and CLI.
//!
//! Diagnostics carry a stable string code (e.g. `"duplicate-using"`), a
//! human-readable message, and the file/span of the offending syntax. Library
//! crates accumulate diagnostics in plain `Vec`s; nothing in the front end
//! reports to stderr directly.

use crate::span::Span;
use serde::Serialize;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

/// A compiler diagnostic with a stable string code.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub span: Span,
    pub code: &'static str,
    pub message: String,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(file: impl Into<String>, span: Span, code: &'static str, message: String) -> Self {
        Diagnostic {
            file: file.into(),
            span,
            code,
            message,
            category: DiagnosticCategory::Error,
        }
    }

    /// Create a new warning diagnostic.
    #[must_use]
    pub fn warning(
        file: impl Into<String>,
        span: Span,
        code: &'static str,
        message: String,
    ) -> Self {
        Diagnostic {
            file: file.into(),
            span,
            code,
            message,
            category: DiagnosticCategory::Warning,
        }
    }
}

/// Format a diagnostic message by replacing `{0}`, `{1}`, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Stable diagnostic codes emitted by the resolver.
pub mod codes {
    /// `using` target resolved to something that is not a namespace.
    pub const USING_INVALID_REF: &str = "using-invalid-ref";
    /// The same canonical namespace was `using`-ed twice in one file.
    pub const DUPLICATE_USING: &str = "duplicate-using";
    /// Unexpected token or malformed syntax.
    pub const PARSE_ERROR: &str = "parse-error";
}
