//! Merge engine: namespace unification and declaration/implementation
//! folding across files.
//!
//! Applied per source table (native modules first, then each file's exports
//! in program order) into resolver-owned target tables, so no binder-created
//! table is ever written. Every canonicalization is recorded in the
//! program-wide merged-symbol map; any stale per-file symbol reference
//! transparently resolves to its merged symbol through `table_lookup`.

use smallvec::SmallVec;
use tracing::trace;
use tydl_parser::NodeIndex;

use crate::resolver::Resolver;
use crate::symbols::{Symbol, SymbolId, symbol_flags};
use crate::table::TableId;

impl Resolver {
    /// Merge every binding of `source` into `target`.
    ///
    /// - Namespaces unify: a placeholder target namespace is synthesized on
    ///   first sight, declarations accumulate on it, and exports merge
    ///   recursively.
    /// - Decorators and functions fold declaration/implementation pairs into
    ///   one symbol.
    /// - Everything else is last-write-wins, with collisions recorded in the
    ///   target table for the checker.
    pub(crate) fn merge_symbol_table(&mut self, source: TableId, target: TableId) {
        // Collisions already recorded in the source table carry over.
        let source_duplicates: Vec<(SymbolId, Vec<SymbolId>)> = self
            .tables
            .get(source)
            .duplicates()
            .map(|(sym, set)| (sym, set.iter().copied().collect()))
            .collect();
        for (sym, dups) in source_duplicates {
            let target_table = self.tables.get_mut(target);
            for dup in dups {
                target_table.record_duplicate(sym, dup);
            }
        }

        let entries: Vec<_> = self.tables.get(source).iter().collect();
        for (name, source_sym) in entries {
            let source_flags = self.symbols.get(source_sym).flags;

            if source_flags & symbol_flags::NAMESPACE != 0 {
                let target_sym = match self.tables.get(target).get(name) {
                    Some(existing) => existing,
                    None => {
                        // Synthesize an empty placeholder namespace owned by
                        // this resolver.
                        let mut placeholder =
                            Symbol::new(name, self.symbols.get(source_sym).flags);
                        placeholder.exports = Some(self.tables.alloc());
                        let placeholder = self.symbols.alloc(placeholder);
                        self.tables.get_mut(target).set(name, placeholder);
                        placeholder
                    }
                };

                if self.symbols.get(target_sym).flags & symbol_flags::NAMESPACE != 0 {
                    trace!(?source_sym, ?target_sym, "merging namespace");
                    self.merged_symbols.insert(source_sym, target_sym);
                    let declarations: SmallVec<[NodeIndex; 2]> =
                        self.symbols.get(source_sym).declarations.clone();
                    self.symbols
                        .get_mut(target_sym)
                        .declarations
                        .extend(declarations);
                    let source_exports = self.exports_of(source_sym);
                    let target_exports = self.exports_of(target_sym);
                    self.merge_symbol_table(source_exports, target_exports);
                } else {
                    // Namespace vs. non-namespace: overwrite, leaving a
                    // recorded conflict behind.
                    self.tables.get_mut(target).set(name, source_sym);
                }
            } else if source_flags & (symbol_flags::DECLARATION | symbol_flags::IMPLEMENTATION)
                != 0
                && source_flags & symbol_flags::DECORATOR != 0
            {
                self.merge_declaration_or_implementation(
                    name,
                    source_sym,
                    target,
                    symbol_flags::DECORATOR,
                );
            } else if source_flags & (symbol_flags::DECLARATION | symbol_flags::IMPLEMENTATION)
                != 0
                && source_flags & symbol_flags::FUNCTION != 0
            {
                self.merge_declaration_or_implementation(
                    name,
                    source_sym,
                    target,
                    symbol_flags::FUNCTION,
                );
            } else {
                self.tables.get_mut(target).set(name, source_sym);
            }
        }
    }

    /// Fold a decorator/function declaration with its implementation.
    ///
    /// Declaration nodes are ordered before implementation nodes regardless
    /// of which side arrived first, and the merged symbol adopts whichever
    /// side carries the implementation payload. A target that already has
    /// both halves is overwritten, leaving a recorded conflict.
    fn merge_declaration_or_implementation(
        &mut self,
        name: tydl_common::Atom,
        source_sym: SymbolId,
        target: TableId,
        expect_target_flags: u32,
    ) {
        let target_sym = self.tables.get(target).get(name);
        let target_sym = match target_sym {
            Some(t) if self.symbols.get(t).flags & expect_target_flags != 0 => t,
            _ => {
                self.tables.get_mut(target).set(name, source_sym);
                return;
            }
        };

        let source_flags = self.symbols.get(source_sym).flags;
        let target_flags = self.symbols.get(target_sym).flags;
        let source_is_declaration = source_flags & symbol_flags::DECLARATION != 0;
        let source_is_implementation = source_flags & symbol_flags::IMPLEMENTATION != 0;
        let target_is_declaration = target_flags & symbol_flags::DECLARATION != 0;
        let target_is_implementation = target_flags & symbol_flags::IMPLEMENTATION != 0;

        if target_is_declaration && target_is_implementation {
            // Already complete; a further insert is a conflict.
            self.tables.get_mut(target).set(name, source_sym);
        } else if target_is_declaration && source_is_implementation {
            trace!(?source_sym, ?target_sym, "folding implementation into declaration");
            self.merged_symbols.insert(source_sym, target_sym);
            let (declarations, native_module) = {
                let source = self.symbols.get(source_sym);
                (source.declarations.clone(), source.native_module)
            };
            let merged = self.symbols.get_mut(target_sym);
            merged.native_module = native_module;
            merged.flags |= source_flags;
            merged.declarations.extend(declarations);
        } else if target_is_implementation && source_is_declaration {
            trace!(?source_sym, ?target_sym, "folding declaration into implementation");
            self.merged_symbols.insert(source_sym, target_sym);
            let declarations = self.symbols.get(source_sym).declarations.clone();
            let merged = self.symbols.get_mut(target_sym);
            merged.flags |= source_flags;
            merged.declarations.insert_many(0, declarations);
        } else {
            // Declaration vs. declaration (or impl vs. impl): conflict.
            self.tables.get_mut(target).set(name, source_sym);
        }
    }
}
