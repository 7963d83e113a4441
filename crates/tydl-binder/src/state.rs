//! Per-file binder: creates the initial symbols and scope tables.
//!
//! The binder walks each script once and creates a symbol per declaration
//! site, tagged with its capability flags, plus the export/member/locals
//! tables those symbols own. The AST is never touched: symbol and locals
//! assignments live in side maps keyed by `NodeIndex`. Cross-file
//! unification (namespace merging, declaration/implementation folding) is
//! not the binder's business; the resolver's merge engine does that on top
//! of these per-file symbols.

use rustc_hash::FxHashMap;
use smallvec::smallvec;
use tracing::debug;
use tydl_common::Atom;
use tydl_parser::syntax::{syntax_kind_ext, visit_children};
use tydl_parser::{NodeArena, NodeIndex};

use crate::program::{NativeExportKind, NativeModuleSpec};
use crate::symbols::{Symbol, SymbolArena, SymbolId, symbol_flags};
use crate::table::{TableId, TableList};

/// Binder state spanning all files of one program.
#[derive(Default)]
pub struct BinderState {
    /// Arena for symbol storage.
    pub symbols: SymbolArena,
    /// Arena for symbol tables.
    pub tables: TableList,
    /// Node → declared symbol.
    pub node_symbols: FxHashMap<u32, SymbolId>,
    /// Scope node → locals table.
    pub node_locals: FxHashMap<u32, TableId>,
    /// Script symbols, in program file order.
    pub script_symbols: Vec<SymbolId>,
    /// Native module symbols, in registration order.
    pub native_symbols: Vec<SymbolId>,
}

impl BinderState {
    pub fn new() -> BinderState {
        BinderState::default()
    }

    /// Materialize a symbol (with exports) for a host-registered native
    /// module and implementation symbols for each of its exports.
    pub fn bind_native_module(&mut self, spec: &NativeModuleSpec) -> SymbolId {
        let exports = self.tables.alloc();
        for export in &spec.exports {
            let flags = match export.kind {
                NativeExportKind::Decorator => {
                    symbol_flags::DECORATOR | symbol_flags::IMPLEMENTATION
                }
                NativeExportKind::Function => {
                    symbol_flags::FUNCTION | symbol_flags::IMPLEMENTATION
                }
            };
            let mut symbol = Symbol::new(export.name, flags);
            symbol.native_module = Some(spec.specifier);
            let sym = self.symbols.alloc(symbol);
            self.tables.get_mut(exports).set(export.name, sym);
        }

        let mut module = Symbol::new(spec.specifier, symbol_flags::NATIVE_MODULE);
        module.exports = Some(exports);
        let module_sym = self.symbols.alloc(module);
        self.native_symbols.push(module_sym);
        module_sym
    }

    /// Bind one script: create its file symbol and every declaration symbol
    /// underneath it.
    pub fn bind_script(&mut self, arena: &NodeArena, script_idx: NodeIndex) {
        let Some(node) = arena.get(script_idx) else {
            return;
        };
        let Some(script) = arena.get_script(node) else {
            return;
        };

        let exports = self.tables.alloc();
        let locals = self.tables.alloc();
        let mut file_symbol = Symbol::new(Atom::NONE, symbol_flags::SCRIPT);
        file_symbol.exports = Some(exports);
        file_symbol.declarations = smallvec![script_idx];
        let file_sym = self.symbols.alloc(file_symbol);

        self.node_symbols.insert(script_idx.0, file_sym);
        self.node_locals.insert(script_idx.0, locals);
        self.script_symbols.push(file_sym);

        // Blockless namespaces re-target `container` for the statements that
        // follow them in the file.
        let mut container = file_sym;
        for stmt in script.statements.iter() {
            container = self.bind_statement(arena, stmt, container);
        }
        debug!(
            file = %script.file_name,
            symbols = self.symbols.len(),
            "bound script"
        );
    }

    /// Bind one statement into `container`'s exports. Returns the container
    /// for subsequent sibling statements (changed by blockless namespaces).
    fn bind_statement(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        container: SymbolId,
    ) -> SymbolId {
        let Some(node) = arena.get(idx) else {
            return container;
        };

        match node.kind {
            syntax_kind_ext::NAMESPACE_STATEMENT => self.bind_namespace(arena, idx, container),
            syntax_kind_ext::MODEL_STATEMENT => {
                self.bind_model(arena, idx, Some(container));
                self.bind_nested_model_expressions(arena, idx);
                container
            }
            syntax_kind_ext::ALIAS_STATEMENT => {
                self.bind_alias(arena, idx, container);
                self.bind_nested_model_expressions(arena, idx);
                container
            }
            syntax_kind_ext::DECORATOR_DECLARATION => {
                self.bind_decorator_declaration(arena, idx, container);
                container
            }
            syntax_kind_ext::FUNCTION_DECLARATION => {
                self.bind_function_declaration(arena, idx, container);
                container
            }
            // Using directives bind nothing; the resolver's using-binder
            // handles them after merging.
            syntax_kind_ext::USING_STATEMENT => container,
            _ => container,
        }
    }

    fn bind_namespace(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        container: SymbolId,
    ) -> SymbolId {
        let Some(ns) = arena.get(idx).and_then(|n| arena.get_namespace(n)) else {
            return container;
        };
        let name = arena.identifier_atom(ns.name).unwrap_or(Atom::NONE);

        let exports = self.tables.alloc();
        let locals = self.tables.alloc();
        let mut symbol = Symbol::new(name, symbol_flags::NAMESPACE);
        symbol.exports = Some(exports);
        symbol.declarations = smallvec![idx];
        let sym = self.symbols.alloc(symbol);

        self.node_symbols.insert(idx.0, sym);
        self.node_locals.insert(idx.0, locals);
        self.declare(container, name, sym);

        if let Some(decorators) = &ns.decorators {
            for decorator in decorators.iter() {
                self.bind_nested_model_expressions(arena, decorator);
            }
        }

        match &ns.statements {
            Some(statements) => {
                let mut inner = sym;
                for stmt in statements.iter() {
                    inner = self.bind_statement(arena, stmt, inner);
                }
                container
            }
            // Blockless: the rest of the file binds into this namespace.
            None => sym,
        }
    }

    fn bind_model(
        &mut self,
        arena: &NodeArena,
        idx: NodeIndex,
        exported_into: Option<SymbolId>,
    ) -> Option<SymbolId> {
        let Some(model) = arena.get(idx).and_then(|n| arena.get_model(n)) else {
            return None;
        };
        let name = arena.identifier_atom(model.name).unwrap_or(Atom::NONE);

        let members = self.tables.alloc();
        let mut symbol = Symbol::new(name, symbol_flags::MODEL);
        symbol.members = Some(members);
        symbol.declarations = smallvec![idx];
        let sym = self.symbols.alloc(symbol);
        self.node_symbols.insert(idx.0, sym);

        if let Some(container) = exported_into {
            self.declare(container, name, sym);
        }

        if let Some(params) = &model.template_parameters {
            let locals = self.tables.alloc();
            self.node_locals.insert(idx.0, locals);
            self.bind_template_parameters(arena, params.iter(), locals);
        }

        // Direct named members; spreads are materialized later by the
        // resolver's member binder.
        for prop_idx in model.properties.iter() {
            let Some(prop) = arena.get(prop_idx).and_then(|n| arena.get_model_property(n))
            else {
                continue;
            };
            let prop_name = arena.identifier_atom(prop.name).unwrap_or(Atom::NONE);
            let mut member = Symbol::new(prop_name, symbol_flags::MEMBER);
            member.declarations = smallvec![prop_idx];
            let member_sym = self.symbols.alloc(member);
            self.node_symbols.insert(prop_idx.0, member_sym);
            self.tables.get_mut(members).set(prop_name, member_sym);
        }

        Some(sym)
    }

    fn bind_alias(&mut self, arena: &NodeArena, idx: NodeIndex, container: SymbolId) {
        let Some(alias) = arena.get(idx).and_then(|n| arena.get_alias(n)) else {
            return;
        };
        let name = arena.identifier_atom(alias.name).unwrap_or(Atom::NONE);

        let mut symbol = Symbol::new(name, symbol_flags::ALIAS);
        symbol.declarations = smallvec![idx];
        let sym = self.symbols.alloc(symbol);
        self.node_symbols.insert(idx.0, sym);
        self.declare(container, name, sym);

        if let Some(params) = &alias.template_parameters {
            let locals = self.tables.alloc();
            self.node_locals.insert(idx.0, locals);
            self.bind_template_parameters(arena, params.iter(), locals);
        }
    }

    fn bind_decorator_declaration(&mut self, arena: &NodeArena, idx: NodeIndex, container: SymbolId) {
        let Some(decl) = arena
            .get(idx)
            .and_then(|n| arena.get_decorator_declaration(n))
        else {
            return;
        };
        let mut symbol = Symbol::new(
            decl.symbol_name,
            symbol_flags::DECORATOR | symbol_flags::DECLARATION,
        );
        symbol.declarations = smallvec![idx];
        let sym = self.symbols.alloc(symbol);
        self.node_symbols.insert(idx.0, sym);
        self.declare(container, decl.symbol_name, sym);
    }

    fn bind_function_declaration(&mut self, arena: &NodeArena, idx: NodeIndex, container: SymbolId) {
        let Some(decl) = arena
            .get(idx)
            .and_then(|n| arena.get_function_declaration(n))
        else {
            return;
        };
        let name = arena.identifier_atom(decl.name).unwrap_or(Atom::NONE);
        let mut symbol = Symbol::new(name, symbol_flags::FUNCTION | symbol_flags::DECLARATION);
        symbol.declarations = smallvec![idx];
        let sym = self.symbols.alloc(symbol);
        self.node_symbols.insert(idx.0, sym);
        self.declare(container, name, sym);
    }

    fn bind_template_parameters(
        &mut self,
        arena: &NodeArena,
        params: impl Iterator<Item = NodeIndex>,
        locals: TableId,
    ) {
        for param_idx in params {
            let Some(param) = arena
                .get(param_idx)
                .and_then(|n| arena.get_template_parameter(n))
            else {
                continue;
            };
            let name = arena.identifier_atom(param.name).unwrap_or(Atom::NONE);
            let mut symbol = Symbol::new(name, symbol_flags::TEMPLATE_PARAMETER);
            symbol.declarations = smallvec![param_idx];
            let sym = self.symbols.alloc(symbol);
            self.node_symbols.insert(param_idx.0, sym);
            self.tables.get_mut(locals).set(name, sym);
        }
    }

    /// Bind anonymous model expressions anywhere under `root` (property
    /// values, alias values, template arguments). They get member tables but
    /// are not exported anywhere.
    fn bind_nested_model_expressions(&mut self, arena: &NodeArena, root: NodeIndex) {
        let mut stack = Vec::new();
        visit_children(arena, root, &mut |child| stack.push(child));
        while let Some(idx) = stack.pop() {
            if let Some(node) = arena.get(idx) {
                if node.kind == syntax_kind_ext::MODEL_EXPRESSION {
                    self.bind_model(arena, idx, None);
                }
            }
            visit_children(arena, idx, &mut |child| stack.push(child));
        }
    }

    /// Insert `sym` into `container`'s exports table.
    fn declare(&mut self, container: SymbolId, name: Atom, sym: SymbolId) {
        let exports = self
            .symbols
            .get(container)
            .exports
            .expect("declaration container must have an exports table");
        self.tables.get_mut(exports).set(name, sym);
    }
}
