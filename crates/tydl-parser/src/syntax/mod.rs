//! Thin-node syntax tree: headers, typed pools, kinds, and traversal.

pub mod base;
pub mod node;
pub mod visit;

pub use visit::visit_children;

/// Extended node kinds.
///
/// Token kinds come from `tydl_scanner::SyntaxKind`; node kinds continue the
/// same `u16` space above `SyntaxKind::LAST_TOKEN` so a node header's `kind`
/// field can hold either.
pub mod syntax_kind_ext {
    use tydl_scanner::SyntaxKind;

    const BASE: u16 = SyntaxKind::LAST_TOKEN + 1;

    pub const SCRIPT: u16 = BASE;
    pub const NAMESPACE_STATEMENT: u16 = BASE + 1;
    pub const MODEL_STATEMENT: u16 = BASE + 2;
    pub const MODEL_EXPRESSION: u16 = BASE + 3;
    pub const MODEL_PROPERTY: u16 = BASE + 4;
    pub const MODEL_SPREAD_PROPERTY: u16 = BASE + 5;
    pub const ALIAS_STATEMENT: u16 = BASE + 6;
    pub const USING_STATEMENT: u16 = BASE + 7;
    pub const DECORATOR_DECLARATION: u16 = BASE + 8;
    pub const FUNCTION_DECLARATION: u16 = BASE + 9;
    pub const FUNCTION_PARAMETER: u16 = BASE + 10;
    pub const TEMPLATE_PARAMETER: u16 = BASE + 11;
    pub const DECORATOR_APPLICATION: u16 = BASE + 12;
    pub const IDENTIFIER: u16 = BASE + 13;
    pub const MEMBER_EXPRESSION: u16 = BASE + 14;
    pub const TYPE_REFERENCE: u16 = BASE + 15;
    pub const STRING_LITERAL_TYPE: u16 = BASE + 16;
}

/// Node flags packed into the 16-bit `flags` field of a node header.
pub mod node_flags {
    /// Node was synthesized by the compiler rather than parsed from source.
    pub const SYNTHETIC: u16 = 1 << 0;
    /// Namespace statement declared without a block (`namespace Foo;`).
    pub const BLOCKLESS: u16 = 1 << 1;
}
