//! Reference resolver: identifiers, member accesses, and type references.
//!
//! `resolve_type_reference` is the central recursive algorithm. Results are
//! memoized per node; the memo record's tri-state (unstarted / in-progress /
//! done) turns re-entry into an in-flight resolution into a `CIRCULAR`
//! outcome instead of unbounded recursion. Apart from the two using-directive
//! diagnostics, nothing is reported from here: every non-`RESOLVED` outcome
//! is a classification recorded for the checker to interpret.

use tracing::trace;
use tydl_common::Atom;
use tydl_parser::syntax::syntax_kind_ext;
use tydl_parser::{NodeArena, NodeIndex};

use crate::links::{ResolutionResult, result_flags};
use crate::resolver::Resolver;
use crate::symbols::{SymbolId, symbol_flags};

impl Resolver {
    /// Resolve a type reference, member expression, or identifier to a
    /// canonical symbol, memoized per node.
    pub fn resolve_type_reference(
        &mut self,
        arena: &NodeArena,
        node_idx: NodeIndex,
    ) -> ResolutionResult {
        {
            let links = self.node_links_mut(node_idx);
            if links.resolution_result & result_flags::IN_PROGRESS != 0 {
                // Re-entered a resolution already on the stack: cyclic
                // dependency. Terminate without caching; the in-flight frame
                // caches its own terminal result.
                trace!(node = node_idx.0, "circular reference");
                return (None, result_flags::CIRCULAR);
            }
            if links.resolution_result != result_flags::NONE {
                return (links.resolved_symbol, links.resolution_result);
            }
            links.resolution_result = result_flags::IN_PROGRESS;
        }

        let mut result = self.resolve_type_reference_worker(arena, node_idx);

        // Unwrap aliases: a resolved parameterless alias whose value is a
        // bare reference resolves through to what the value names. If the
        // inner resolution does not succeed, the alias symbol itself stays
        // as the result.
        while result.1 & result_flags::RESOLVED != 0 {
            let Some(sym) = result.0 else { break };
            if self.symbols.get(sym).flags & symbol_flags::ALIAS == 0 {
                break;
            }
            let Some(&alias_node) = self.symbols.get(sym).declarations.first() else {
                break;
            };
            let Some(alias) = arena.get(alias_node).and_then(|n| arena.get_alias(n)) else {
                break;
            };
            let has_template_params = alias
                .template_parameters
                .as_ref()
                .is_some_and(|p| !p.is_empty());
            let value_is_bare_reference = arena
                .get(alias.value)
                .and_then(|n| arena.get_type_ref(n))
                .is_some_and(|r| r.arguments.as_ref().is_none_or(|a| a.is_empty()));
            if has_template_params || !value_is_bare_reference {
                break;
            }
            let (inner_sym, inner_result) = self.resolve_type_reference(arena, alias.value);
            if inner_result & result_flags::RESOLVED != 0 {
                result = (inner_sym, result_flags::RESOLVED);
                continue;
            }
            break;
        }

        let links = self.node_links_mut(node_idx);
        if result.0.is_some() {
            links.resolved_symbol = result.0;
        }
        links.resolution_result = result.1;
        result
    }

    fn resolve_type_reference_worker(
        &mut self,
        arena: &NodeArena,
        node_idx: NodeIndex,
    ) -> ResolutionResult {
        let Some(node) = arena.get(node_idx) else {
            unreachable!("resolving a reference outside the arena");
        };

        match node.kind {
            syntax_kind_ext::TYPE_REFERENCE => {
                let Some(type_ref) = arena.get_type_ref(node) else {
                    unreachable!("type reference node without data");
                };
                // Members of an arbitrary instantiation are not statically
                // enumerable here.
                if type_ref.arguments.as_ref().is_some_and(|a| !a.is_empty()) {
                    return (None, result_flags::UNKNOWN);
                }
                self.resolve_type_reference(arena, type_ref.target)
            }
            syntax_kind_ext::MEMBER_EXPRESSION => self.resolve_member_expression(arena, node_idx),
            syntax_kind_ext::IDENTIFIER => self.resolve_identifier(arena, node_idx),
            kind => unreachable!("unexpected node kind {kind} in reference resolution"),
        }
    }

    fn resolve_member_expression(
        &mut self,
        arena: &NodeArena,
        node_idx: NodeIndex,
    ) -> ResolutionResult {
        let Some(member) = arena.get(node_idx).and_then(|n| arena.get_member_expr(n)) else {
            unreachable!("member expression node without data");
        };

        let (base_sym, base_result) = self.resolve_type_reference(arena, member.base);
        if base_result & result_flags::RESOLVED == 0 {
            // A failed base aborts the whole chain unchanged.
            return (None, base_result);
        }
        let Some(mut base_sym) = base_sym else {
            unreachable!("resolved result must carry a symbol");
        };

        // Using pass-throughs defer to the symbol they re-export.
        if self.symbols.get(base_sym).flags & symbol_flags::USING != 0 {
            let Some(source) = self.symbols.get(base_sym).symbol_source else {
                unreachable!("using symbol must have a source");
            };
            base_sym = self.merged_symbol(source);
        }

        let base_flags = self.symbols.get(base_sym).flags;
        if base_flags & symbol_flags::MEMBER_CONTAINER != 0 {
            self.resolve_member(arena, base_sym, member.id)
        } else if base_flags & symbol_flags::EXPORT_CONTAINER != 0 {
            let merged = self.merged_symbol(base_sym);
            self.resolve_export(arena, merged, member.id)
        } else {
            // Aliases that would not unwrap, template parameters, members:
            // not enumerable until the checker has types in hand.
            (None, result_flags::UNKNOWN)
        }
    }

    /// Member lookup through a member container, delegating along the
    /// `extends` chain. The chain is walked lazily per lookup rather than
    /// flattened, so multi-level (and future overriding) resolution stays
    /// live; an in-progress marker on the symbol turns cyclic chains into
    /// `CIRCULAR`.
    pub(crate) fn resolve_member(
        &mut self,
        arena: &NodeArena,
        base_sym: SymbolId,
        id: NodeIndex,
    ) -> ResolutionResult {
        if self.symbol_links_mut(base_sym).member_lookup_active {
            trace!(symbol = base_sym.0, "circular member lookup");
            return (None, result_flags::CIRCULAR);
        }
        self.symbol_links_mut(base_sym).member_lookup_active = true;
        let result = self.resolve_member_worker(arena, base_sym, id);
        self.symbol_links_mut(base_sym).member_lookup_active = false;
        result
    }

    fn resolve_member_worker(
        &mut self,
        arena: &NodeArena,
        base_sym: SymbolId,
        id: NodeIndex,
    ) -> ResolutionResult {
        let Some(&base_node) = self.symbols.get(base_sym).declarations.first() else {
            unreachable!("member container symbol must have a declaration");
        };

        // Materialize the container's member table before looking into it.
        self.bind_member_container(arena, base_node);

        let Some(node) = arena.get(base_node) else {
            unreachable!("member container declaration outside the arena");
        };
        match node.kind {
            syntax_kind_ext::MODEL_STATEMENT | syntax_kind_ext::MODEL_EXPRESSION => {
                self.resolve_model_member(arena, base_sym, base_node, id)
            }
            kind => unreachable!("member lookup on non-member-container declaration {kind}"),
        }
    }

    fn resolve_model_member(
        &mut self,
        arena: &NodeArena,
        model_sym: SymbolId,
        model_node: NodeIndex,
        id: NodeIndex,
    ) -> ResolutionResult {
        let id_atom = match arena.identifier_atom(id) {
            Some(atom) => atom,
            None => return (None, result_flags::NOT_FOUND),
        };

        // Step 1: direct members. Spreads were materialized when the
        // container was bound.
        let Some(members) = self.symbols.get(model_sym).members else {
            unreachable!("member container symbol must have a members table");
        };
        if let Some(member_sym) = self.table_lookup(members, id_atom) {
            return (Some(member_sym), result_flags::RESOLVED);
        }

        // Step 2: delegate along `extends`, unless this container's member
        // set is already unknown; and become unknown if the base is.
        let extends_ref = arena
            .get(model_node)
            .and_then(|n| arena.get_model(n))
            .map_or(NodeIndex::NONE, |m| m.extends_ref);
        let has_unknown = self
            .symbol_links(model_sym)
            .is_some_and(|l| l.has_unknown_members);
        if extends_ref.is_some() && !has_unknown {
            let (extends_sym, extends_result) = self.resolve_type_reference(arena, extends_ref);
            if extends_result & result_flags::RESOLVED != 0 {
                let Some(extends_sym) = extends_sym else {
                    unreachable!("resolved result must carry a symbol");
                };
                return self.resolve_member(arena, extends_sym, id);
            }
            if extends_result & result_flags::UNKNOWN != 0 {
                self.symbol_links_mut(model_sym).has_unknown_members = true;
                return (None, result_flags::UNKNOWN);
            }
        }

        // Step 3: unknown when the member set is not enumerable, provably
        // absent otherwise.
        let has_unknown = self
            .symbol_links(model_sym)
            .is_some_and(|l| l.has_unknown_members);
        if has_unknown {
            (None, result_flags::UNKNOWN)
        } else {
            (None, result_flags::NOT_FOUND)
        }
    }

    fn resolve_export(
        &mut self,
        arena: &NodeArena,
        base_sym: SymbolId,
        id: NodeIndex,
    ) -> ResolutionResult {
        if let Some(&declaration) = self.symbols.get(base_sym).declarations.first() {
            let kind = arena.get(declaration).map_or(0, |n| n.kind);
            assert!(
                kind == syntax_kind_ext::NAMESPACE_STATEMENT || kind == syntax_kind_ext::SCRIPT,
                "export lookup on a non-container declaration"
            );
        }

        let id_atom = match arena.identifier_atom(id) {
            Some(atom) => atom,
            None => return (None, result_flags::NOT_FOUND),
        };
        let exports = self.exports_of(base_sym);
        match self.table_lookup(exports, id_atom) {
            Some(export_sym) => (Some(export_sym), result_flags::RESOLVED),
            // Namespaces are fully merged before reference resolution, so an
            // absent export is provably absent.
            None => (None, result_flags::NOT_FOUND),
        }
    }

    /// Lexical-scope walk for a bare identifier.
    fn resolve_identifier(&mut self, arena: &NodeArena, id_idx: NodeIndex) -> ResolutionResult {
        let Some(id_atom) = arena.identifier_atom(id_idx) else {
            unreachable!("identifier node without data");
        };
        if id_atom == Atom::NONE {
            // Parser error recovery placeholder.
            return (None, result_flags::UNKNOWN);
        }

        let mut scope = arena.parent(id_idx);
        while scope.is_some() {
            let kind = arena.get(scope).map_or(0, |n| n.kind);
            if kind == syntax_kind_ext::SCRIPT {
                break;
            }

            if let Some(scope_sym) = self.node_symbol(scope) {
                if self.symbols.get(scope_sym).flags & symbol_flags::EXPORT_CONTAINER != 0 {
                    let merged = self.merged_symbol(scope_sym);
                    let exports = self.exports_of(merged);
                    if let Some(binding) = self.table_lookup(exports, id_atom) {
                        return (Some(binding), result_flags::RESOLVED);
                    }
                }
            }

            if let Some(locals) = self.node_locals_table(scope) {
                if let Some(binding) = self.table_lookup(locals, id_atom) {
                    return (Some(binding), result_flags::RESOLVED);
                }
            }

            scope = arena.parent(scope);
        }

        if scope.is_some() {
            let Some(script) = arena.get(scope).and_then(|n| arena.get_script(n)) else {
                return (None, result_flags::UNKNOWN);
            };

            // Namespaces the file opened without an explicit block,
            // innermost first.
            for ns in script.in_scope_namespaces.iter() {
                if let Some(ns_sym) = self.node_symbol(ns) {
                    let merged = self.merged_symbol(ns_sym);
                    let exports = self.exports_of(merged);
                    if let Some(binding) = self.table_lookup(exports, id_atom) {
                        return (Some(binding), result_flags::RESOLVED);
                    }
                }
            }

            // Global-scope declarations vs. file-scope using bindings.
            let global_exports = self.exports_of(self.global_namespace_symbol());
            let global_binding = self.table_lookup(global_exports, id_atom);
            let using_binding = self
                .node_locals_table(scope)
                .and_then(|locals| self.table_lookup(locals, id_atom));

            match (global_binding, using_binding) {
                (Some(_), Some(_)) => return (None, result_flags::AMBIGUOUS),
                (Some(binding), None) => return (Some(binding), result_flags::RESOLVED),
                (None, Some(binding)) => {
                    if self.symbols.get(binding).flags & symbol_flags::DUPLICATE_USING != 0 {
                        return (None, result_flags::RESOLUTION_FAILED);
                    }
                    return (Some(binding), result_flags::RESOLVED);
                }
                (None, None) => {}
            }
        }

        // Not provably absent: later template binding could still introduce
        // this name.
        (None, result_flags::UNKNOWN)
    }
}
