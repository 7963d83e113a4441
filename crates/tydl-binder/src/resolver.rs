//! Resolver state and the program-resolution driver.
//!
//! One `Resolver` owns every piece of mutable state for one program pass:
//! the symbol and table arenas produced by the binder, the merged-symbol
//! canonicalization map, the copy-on-write table overlays, the node/symbol
//! link caches, and the diagnostics sink. A second compilation starts from a
//! fresh `Resolver`; nothing here leaks across passes.

use rustc_hash::FxHashMap;
use tracing::debug;
use tydl_common::Atom;
use tydl_common::diagnostics::Diagnostic;
use tydl_parser::syntax::syntax_kind_ext;
use tydl_parser::{NodeArena, NodeIndex};

use crate::links::{NodeLinks, SymbolLinks};
use crate::program::Program;
use crate::state::BinderState;
use crate::symbols::{Symbol, SymbolArena, SymbolId, symbol_flags};
use crate::table::{TableId, TableList};

pub struct Resolver {
    /// Arena for symbol storage (binder symbols plus resolver-synthesized
    /// merged placeholders and using pass-throughs).
    pub symbols: SymbolArena,
    /// Arena for symbol tables.
    pub tables: TableList,

    // Binder output: AST-side assignments, kept out of the nodes themselves.
    node_symbols: FxHashMap<u32, SymbolId>,
    node_locals: FxHashMap<u32, TableId>,
    script_symbols: Vec<SymbolId>,
    native_symbols: Vec<SymbolId>,

    // One pass's mutable resolution state.
    pub(crate) merged_symbols: FxHashMap<SymbolId, SymbolId>,
    augmented_tables: FxHashMap<TableId, TableId>,
    node_links: FxHashMap<u32, NodeLinks>,
    symbol_links: FxHashMap<u32, SymbolLinks>,
    global_namespace: SymbolId,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver {
    /// Run one full program-resolution pass.
    ///
    /// Binds every file's symbols, merges namespaces and
    /// declaration/implementation pairs, binds `using` directives, then
    /// walks every script resolving references and binding member
    /// containers. Idempotent once complete; run once per compilation.
    pub fn resolve_program(program: &Program) -> Resolver {
        let mut binder = BinderState::new();
        for spec in &program.native_modules {
            binder.bind_native_module(spec);
        }
        for &script in &program.scripts {
            binder.bind_script(&program.arena, script);
        }

        let BinderState {
            symbols,
            tables,
            node_symbols,
            node_locals,
            script_symbols,
            native_symbols,
        } = binder;

        let mut resolver = Resolver {
            symbols,
            tables,
            node_symbols,
            node_locals,
            script_symbols,
            native_symbols,
            merged_symbols: FxHashMap::default(),
            augmented_tables: FxHashMap::default(),
            node_links: FxHashMap::default(),
            symbol_links: FxHashMap::default(),
            global_namespace: SymbolId(0), // placeholder until created below
            diagnostics: Vec::new(),
        };

        let global_exports = resolver.tables.alloc();
        let mut global = Symbol::new(Atom::NONE, symbol_flags::NAMESPACE);
        global.exports = Some(global_exports);
        resolver.global_namespace = resolver.symbols.alloc(global);

        // Phase 1: merge native-module exports, then every file's exports,
        // into the global namespace. Files are processed exactly once, in
        // program order.
        for native_sym in resolver.native_symbols.clone() {
            let source = resolver.exports_of(native_sym);
            resolver.merge_symbol_table(source, global_exports);
        }
        for script_sym in resolver.script_symbols.clone() {
            let source = resolver.exports_of(script_sym);
            resolver.merge_symbol_table(source, global_exports);
        }
        debug!(symbols = resolver.symbols.len(), "merged program symbols");

        // Phase 2: bind usings to namespaces, creating scope-local bindings
        // for used symbols.
        for &script in &program.scripts {
            resolver.set_usings_for_file(&program.arena, script);
        }

        // Phase 3: walk every script so each reference resolves and every
        // member container binds, even ones nothing refers to.
        for &script in &program.scripts {
            resolver.bind_and_resolve_node(&program.arena, script);
        }

        resolver
    }

    // =========================================================================
    // Link caches
    // =========================================================================

    /// Mutable memo record for `node`, created on first access. Repeated
    /// calls return the same record, so resolution steps can progressively
    /// fill in fields.
    pub fn node_links_mut(&mut self, node: NodeIndex) -> &mut NodeLinks {
        self.node_links.entry(node.0).or_default()
    }

    /// Read access to a node's cached resolution state.
    pub fn node_links(&self, node: NodeIndex) -> Option<&NodeLinks> {
        self.node_links.get(&node.0)
    }

    /// Mutable memo record for `symbol`, created on first access.
    pub fn symbol_links_mut(&mut self, symbol: SymbolId) -> &mut SymbolLinks {
        self.symbol_links.entry(symbol.0).or_default()
    }

    /// Read access to a symbol's cached binding state.
    pub fn symbol_links(&self, symbol: SymbolId) -> Option<&SymbolLinks> {
        self.symbol_links.get(&symbol.0)
    }

    // =========================================================================
    // Canonicalization and tables
    // =========================================================================

    /// Canonical merged symbol for `sym` (identity for unmerged symbols).
    pub fn merged_symbol(&self, sym: SymbolId) -> SymbolId {
        self.merged_symbols.get(&sym).copied().unwrap_or(sym)
    }

    /// The copy-on-write overlay for `table`, created (seeded with the
    /// base's current entries) on first call. Every caller for the same base
    /// receives the same overlay. Late-bound insertions land only here; the
    /// base stays pristine and shareable.
    pub fn augmented_symbol_table(&mut self, table: TableId) -> TableId {
        if let Some(&overlay) = self.augmented_tables.get(&table) {
            return overlay;
        }
        let overlay = self.tables.alloc_clone_of(table);
        self.augmented_tables.insert(table, overlay);
        overlay
    }

    /// Look up `name` through `table`'s overlay (if any), canonicalizing the
    /// result through the merge map.
    pub(crate) fn table_lookup(&self, table: TableId, name: Atom) -> Option<SymbolId> {
        let table = self.augmented_tables.get(&table).copied().unwrap_or(table);
        let sym = self.tables.get(table).get(name)?;
        Some(self.merged_symbol(sym))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The implicit global namespace symbol.
    pub fn global_namespace_symbol(&self) -> SymbolId {
        self.global_namespace
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(id)
    }

    pub fn table(&self, id: TableId) -> &crate::table::SymbolTable {
        self.tables.get(id)
    }

    /// Symbol declared by `node`, if the binder assigned one.
    pub fn node_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.node_symbols.get(&node.0).copied()
    }

    pub(crate) fn node_locals_table(&self, node: NodeIndex) -> Option<TableId> {
        self.node_locals.get(&node.0).copied()
    }

    /// Canonical export of the global namespace by name. Convenience for
    /// consumers holding source text rather than atoms.
    pub fn global_export(&self, arena: &NodeArena, name: &str) -> Option<SymbolId> {
        let atom = arena.interner().get(name)?;
        let exports = self.symbols.get(self.global_namespace).exports?;
        self.table_lookup(exports, atom)
    }

    /// Drain the diagnostics reported during resolution.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Exports table of an export-container symbol. Fatal if the symbol has
    /// none; the binder guarantees every container gets a table.
    pub(crate) fn exports_of(&self, sym: SymbolId) -> TableId {
        self.symbols
            .get(sym)
            .exports
            .expect("export container symbol must have an exports table")
    }

    /// Report a resolver diagnostic at `node`.
    pub(crate) fn report(
        &mut self,
        arena: &NodeArena,
        node: NodeIndex,
        code: &'static str,
        message: String,
    ) {
        let span = match arena.get(node) {
            Some(n) => tydl_common::Span::new(n.pos, n.end),
            None => tydl_common::Span::default(),
        };
        let file = self.node_file_name(arena, node);
        self.diagnostics.push(Diagnostic::error(file, span, code, message));
    }

    /// File a node belongs to, via the parent chain.
    fn node_file_name(&self, arena: &NodeArena, node: NodeIndex) -> String {
        let mut current = node;
        while current.is_some() {
            if let Some(n) = arena.get(current) {
                if n.kind == syntax_kind_ext::SCRIPT {
                    if let Some(script) = arena.get_script(n) {
                        return script.file_name.clone();
                    }
                }
            }
            current = arena.parent(current);
        }
        String::new()
    }

    /// Render a dotted reference (`Foo.Bar`) for diagnostics.
    pub(crate) fn member_expression_to_string(&self, arena: &NodeArena, expr: NodeIndex) -> String {
        let mut parts = Vec::new();
        let mut current = expr;
        while let Some(node) = arena.get(current) {
            if let Some(member) = arena.get_member_expr(node) {
                if let Some(text) = arena.identifier_text(member.id) {
                    parts.push(text.to_string());
                }
                current = member.base;
            } else {
                if let Some(text) = arena.identifier_text(current) {
                    parts.push(text.to_string());
                }
                break;
            }
        }
        parts.reverse();
        parts.join(".")
    }
}
