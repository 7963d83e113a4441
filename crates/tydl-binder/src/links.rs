//! Per-node and per-symbol memo records for one resolution pass.

use crate::symbols::SymbolId;

/// Classification bits for a resolution outcome.
///
/// Exactly one terminal bit is set in a cached result. `RESOLVED` always
/// carries a symbol; no other classification does.
pub mod result_flags {
    pub const NONE: u32 = 0;
    /// Symbol found, certain.
    pub const RESOLVED: u32 = 1 << 0;
    /// Cannot prove absence; a template instantiation may still provide it.
    pub const UNKNOWN: u32 = 1 << 1;
    /// Provably absent.
    pub const NOT_FOUND: u32 = 1 << 2;
    /// Two or more equally valid candidate bindings.
    pub const AMBIGUOUS: u32 = 1 << 3;
    /// Resolved to a binding already flagged as conflicted.
    pub const RESOLUTION_FAILED: u32 = 1 << 4;
    /// Self-referential dependency detected mid-resolution.
    pub const CIRCULAR: u32 = 1 << 5;

    /// Transient in-flight marker; never part of a terminal result. Re-entry
    /// into a node carrying it is a cycle.
    pub const IN_PROGRESS: u32 = 1 << 31;

    /// Every non-`RESOLVED` terminal classification, for propagation checks.
    pub const FAILED: u32 = UNKNOWN | NOT_FOUND | AMBIGUOUS | RESOLUTION_FAILED | CIRCULAR;
}

/// Outcome of resolving one reference: the symbol (for `RESOLVED` results)
/// and the classification bits.
pub type ResolutionResult = (Option<SymbolId>, u32);

/// Memo record for one AST node, keyed by its `NodeIndex`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeLinks {
    /// Canonical symbol this reference resolved to, if any.
    pub resolved_symbol: Option<SymbolId>,
    /// `result_flags` of the cached outcome; `NONE` = not started,
    /// `IN_PROGRESS` = resolution is on the stack.
    pub resolution_result: u32,
}

/// Memo record for one symbol, keyed by its `SymbolId`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymbolLinks {
    /// Member table has been materialized; transitions at most once.
    pub members_bound: bool,
    /// The member set is not statically enumerable (a copy source or base
    /// was template-dependent).
    pub has_unknown_members: bool,
    /// A member lookup through this symbol's extends chain is on the stack;
    /// re-entry is a cyclic inheritance.
    pub member_lookup_active: bool,
}
