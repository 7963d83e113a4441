//! Member binder: materializes member-container tables and tracks whether a
//! member set is knowably complete.
//!
//! Triggered lazily by member lookups and eagerly by the final program-wide
//! walk, so containers nothing refers to by name still get bound (checker
//! diagnostics depend on their completeness flags). `is` relations and
//! spreads are structural copies fixed at bind time; `extends` stays a live
//! delegation resolved per lookup (see `resolve_member`).

use tracing::trace;
use tydl_parser::syntax::{syntax_kind_ext, visit_children};
use tydl_parser::{NodeArena, NodeIndex};

use crate::links::result_flags;
use crate::resolver::Resolver;
use crate::symbols::{SymbolId, symbol_flags};

impl Resolver {
    /// Materialize the member table of a member container, once.
    pub(crate) fn bind_member_container(&mut self, arena: &NodeArena, node_idx: NodeIndex) {
        let kind = arena.get(node_idx).map_or(0, |n| n.kind);
        match kind {
            syntax_kind_ext::MODEL_STATEMENT | syntax_kind_ext::MODEL_EXPRESSION => {
                self.bind_model_members(arena, node_idx);
            }
            _ => {}
        }
    }

    fn bind_model_members(&mut self, arena: &NodeArena, model_idx: NodeIndex) {
        let Some(model_sym) = self.node_symbol(model_idx) else {
            unreachable!("model node was never bound");
        };

        {
            let links = self.symbol_links_mut(model_sym);
            if links.members_bound {
                return;
            }
            // Set before doing any work: re-entry through a copy cycle sees
            // the container as bound and copies whatever exists so far.
            links.members_bound = true;
        }
        trace!(symbol = model_sym.0, "binding model members");

        let Some(members) = self.symbols.get(model_sym).members else {
            unreachable!("member container symbol must have a members table");
        };
        let target_table = self.augmented_symbol_table(members);

        let Some(model) = arena.get(model_idx).and_then(|n| arena.get_model(n)) else {
            return;
        };

        // `is`: structural copy of the source's current member table. A
        // snapshot - later changes to the source do not propagate back.
        if model.is_ref.is_some() {
            let (is_sym, is_result) = self.resolve_type_reference(arena, model.is_ref);
            if is_result & result_flags::UNKNOWN != 0 {
                self.symbol_links_mut(model_sym).has_unknown_members = true;
            } else if is_result & result_flags::RESOLVED != 0 {
                if let Some(is_sym) = is_sym {
                    if self.symbols.get(is_sym).flags & symbol_flags::MODEL != 0 {
                        if self.has_unknown_members(is_sym) {
                            self.symbol_links_mut(model_sym).has_unknown_members = true;
                        }
                        self.copy_members(is_sym, target_table);
                    }
                }
            }
        }

        // `extends`: delegation, not copy - only unknown-ness propagates at
        // bind time; lookups traverse the relation lazily.
        if model.extends_ref.is_some() {
            let (extends_sym, extends_result) =
                self.resolve_type_reference(arena, model.extends_ref);
            if extends_result & result_flags::RESOLVED != 0 {
                if let Some(extends_sym) = extends_sym {
                    if self.has_unknown_members(extends_sym) {
                        self.symbol_links_mut(model_sym).has_unknown_members = true;
                    }
                }
            } else if extends_result & result_flags::UNKNOWN != 0 {
                self.symbol_links_mut(model_sym).has_unknown_members = true;
            }
        }

        // Spreads: structural copies from arbitrary type expressions.
        for prop_idx in model.properties.iter() {
            let Some(spread) = arena.get(prop_idx).and_then(|n| arena.get_spread(n)) else {
                continue;
            };
            let (source_sym, source_result) = self.resolve_type_reference(arena, spread.target);
            if source_result & result_flags::RESOLVED == 0 {
                if source_result & result_flags::UNKNOWN != 0 {
                    self.symbol_links_mut(model_sym).has_unknown_members = true;
                }
                continue;
            }
            let Some(source_sym) = source_sym else {
                unreachable!("resolved result must carry a symbol");
            };
            if self.symbols.get(source_sym).flags & symbol_flags::MODEL == 0 {
                // Spreading a non-model is a checker error, not ours.
                continue;
            }
            if self.has_unknown_members(source_sym) {
                self.symbol_links_mut(model_sym).has_unknown_members = true;
                continue;
            }
            self.copy_members(source_sym, target_table);
        }
    }

    fn has_unknown_members(&self, sym: SymbolId) -> bool {
        self.symbol_links(sym).is_some_and(|l| l.has_unknown_members)
    }

    /// Bulk-copy `source_sym`'s current member table (overlay included) into
    /// `target_table`.
    fn copy_members(&mut self, source_sym: SymbolId, target_table: crate::table::TableId) {
        let Some(source_members) = self.symbols.get(source_sym).members else {
            unreachable!("member container symbol must have a members table");
        };
        let source_table = self.augmented_symbol_table(source_members);
        self.tables.include(source_table, target_table);
    }

    /// Final program-wide traversal: resolve every type reference and bind
    /// every member container reachable from `idx`.
    pub(crate) fn bind_and_resolve_node(&mut self, arena: &NodeArena, idx: NodeIndex) {
        let kind = arena.get(idx).map_or(0, |n| n.kind);
        match kind {
            syntax_kind_ext::TYPE_REFERENCE => {
                self.resolve_type_reference(arena, idx);
            }
            syntax_kind_ext::MODEL_STATEMENT | syntax_kind_ext::MODEL_EXPRESSION => {
                self.bind_member_container(arena, idx);
            }
            _ => {}
        }

        let mut children = Vec::new();
        visit_children(arena, idx, &mut |child| children.push(child));
        for child in children {
            self.bind_and_resolve_node(arena, child);
        }
    }
}
