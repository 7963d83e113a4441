//! Using-binder: per-file resolution of `using` directives into scope-local
//! bindings.
//!
//! Runs after merging, so `using` targets resolve against canonical
//! namespaces. Each directive injects pass-through symbols for the used
//! namespace's exports into the copy-on-write overlay of the enclosing
//! scope's locals table. The two diagnostics reported here are the only ones
//! this subsystem emits; an unresolvable `using` target is skipped silently
//! for the checker to report with full type information.

use rustc_hash::FxHashSet;
use tracing::debug;
use tydl_common::Atom;
use tydl_common::diagnostics::{codes, format_message};
use tydl_parser::{NodeArena, NodeIndex};

use crate::links::result_flags;
use crate::resolver::Resolver;
use crate::symbols::{Symbol, SymbolId, symbol_flags};
use crate::table::TableId;

impl Resolver {
    /// Bind every `using` directive of one file, in source order.
    pub(crate) fn set_usings_for_file(&mut self, arena: &NodeArena, script_idx: NodeIndex) {
        let Some(script) = arena.get(script_idx).and_then(|n| arena.get_script(n)) else {
            return;
        };

        let mut used: FxHashSet<SymbolId> = FxHashSet::default();
        for using_idx in script.usings.iter() {
            let Some(using) = arena.get(using_idx).and_then(|n| arena.get_using(n)) else {
                continue;
            };

            let (used_sym, used_result) = self.resolve_type_reference(arena, using.target);
            if used_result & result_flags::RESOLVED == 0 {
                // Not resolvable; the checker reports this with context.
                continue;
            }
            let Some(used_sym) = used_sym else {
                unreachable!("resolved result must carry a symbol");
            };

            if self.symbols.get(used_sym).flags & symbol_flags::NAMESPACE == 0 {
                self.report(
                    arena,
                    using_idx,
                    codes::USING_INVALID_REF,
                    "using target is not a namespace".to_string(),
                );
                continue;
            }

            let namespace_sym = self.merged_symbol(used_sym);
            if !used.insert(namespace_sym) {
                let name = self.member_expression_to_string(arena, using.target);
                self.report(
                    arena,
                    using_idx,
                    codes::DUPLICATE_USING,
                    format_message("duplicate using of \"{0}\"", &[&name]),
                );
                continue;
            }

            // The enclosing scope of the directive: a namespace statement or
            // the file itself.
            let parent_scope = arena.parent(using_idx);
            let Some(locals) = self.node_locals_table(parent_scope) else {
                unreachable!("using parent scope must have a locals table");
            };
            self.add_using_symbols(namespace_sym, locals);
        }
        debug!(file = %script.file_name, count = script.usings.len(), "bound usings");
    }

    /// Inject a pass-through symbol for every export of `source_namespace`
    /// into the overlay of `destination`. The synthetic symbols have no
    /// declarations of their own and are never exported; they are visible
    /// only to identifier lookups within that lexical scope.
    fn add_using_symbols(&mut self, source_namespace: SymbolId, destination: TableId) {
        let exports = self.exports_of(source_namespace);
        let entries: Vec<(Atom, SymbolId)> = self.tables.get(exports).iter().collect();
        let overlay = self.augmented_symbol_table(destination);

        for (name, exported) in entries {
            let mut using_symbol = Symbol::new(name, symbol_flags::USING);
            using_symbol.symbol_source = Some(exported);
            let using_sym = self.symbols.alloc(using_symbol);

            // A second using-introduced binding for the same local name is a
            // conflict: flag both candidates so lookups fail over them.
            if let Some(existing) = self.tables.get(overlay).get(name) {
                if self.symbols.get(existing).flags & symbol_flags::USING != 0 {
                    self.symbols.get_mut(existing).flags |= symbol_flags::DUPLICATE_USING;
                    self.symbols.get_mut(using_sym).flags |= symbol_flags::DUPLICATE_USING;
                }
            }

            self.tables.get_mut(overlay).set(name, using_sym);
        }
    }
}
