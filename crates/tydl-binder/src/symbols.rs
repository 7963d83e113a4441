//! Symbols and the symbol arena.

use smallvec::SmallVec;
use tydl_common::Atom;
use tydl_parser::NodeIndex;

use crate::table::TableId;

/// Symbol capability flags.
///
/// A symbol's flags describe both what kind of declaration it canonicalizes
/// (model, namespace, alias, …) and which capabilities it exposes to
/// resolution (export container, member container).
pub mod symbol_flags {
    pub const NONE: u32 = 0;

    /// Namespace declaration (mergeable across blocks and files).
    pub const NAMESPACE: u32 = 1 << 0;
    /// Model statement or model expression.
    pub const MODEL: u32 = 1 << 1;
    /// Alias statement.
    pub const ALIAS: u32 = 1 << 2;
    /// Model property member.
    pub const MEMBER: u32 = 1 << 3;
    /// Template parameter declaration.
    pub const TEMPLATE_PARAMETER: u32 = 1 << 4;
    /// Decorator (`extern dec` declaration or native implementation).
    pub const DECORATOR: u32 = 1 << 5;
    /// Function (`extern fn` declaration or native implementation).
    pub const FUNCTION: u32 = 1 << 6;
    /// Source-declared half of a decorator/function pair.
    pub const DECLARATION: u32 = 1 << 7;
    /// Host-implemented half of a decorator/function pair.
    pub const IMPLEMENTATION: u32 = 1 << 8;
    /// Synthetic pass-through binding introduced by a `using` directive.
    pub const USING: u32 = 1 << 9;
    /// `using`-introduced binding that collided with another one.
    pub const DUPLICATE_USING: u32 = 1 << 10;
    /// Source file symbol.
    pub const SCRIPT: u32 = 1 << 11;
    /// Host-registered native module symbol.
    pub const NATIVE_MODULE: u32 = 1 << 12;

    /// Symbols whose declaration exposes a table of externally visible names.
    pub const EXPORT_CONTAINER: u32 = NAMESPACE | SCRIPT | NATIVE_MODULE;
    /// Symbols whose declaration exposes a nested member table.
    pub const MEMBER_CONTAINER: u32 = MODEL;
}

/// Handle to a symbol in a [`SymbolArena`].
///
/// Like `NodeIndex` for nodes, the arena index is the symbol's stable
/// per-compilation identity; resolver side-tables are keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Canonical representation of one or more merged declarations.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: Atom,
    /// `symbol_flags` bitset.
    pub flags: u32,
    /// Declaring nodes, in declaration order (declarations before
    /// implementations for merged decorator/function pairs). The symbol
    /// references nodes; it does not own them.
    pub declarations: SmallVec<[NodeIndex; 2]>,
    /// Exports table (export containers only).
    pub exports: Option<TableId>,
    /// Members table (member containers only).
    pub members: Option<TableId>,
    /// The real exported symbol behind a `using` pass-through binding.
    pub symbol_source: Option<SymbolId>,
    /// Specifier of the native module providing this symbol's
    /// implementation payload, adopted onto merged declaration symbols.
    pub native_module: Option<Atom>,
}

impl Symbol {
    pub fn new(name: Atom, flags: u32) -> Symbol {
        Symbol {
            name,
            flags,
            declarations: SmallVec::new(),
            exports: None,
            members: None,
            symbol_source: None,
            native_module: None,
        }
    }
}

/// Arena for symbol storage.
///
/// Symbols are created by the binder (one per declaration site), by the merge
/// engine (synthesized merged-namespace placeholders), and by the
/// using-binder (pass-through bindings). All of them live here and are
/// addressed by `SymbolId`.
#[derive(Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena::default()
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }
}
