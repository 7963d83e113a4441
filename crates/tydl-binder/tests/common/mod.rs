//! Shared helpers for binder/resolver integration tests.
#![allow(dead_code)] // not every test binary uses every helper

use tydl_binder::{Program, Resolver, SymbolId};
use tydl_parser::NodeIndex;
use tydl_parser::syntax::{syntax_kind_ext, visit_children};

/// Parse the given sources (in merge order) and run a full resolution pass.
pub fn compile(sources: &[(&str, &str)]) -> (Program, Resolver) {
    let mut program = Program::new();
    for &(name, source) in sources {
        program.add_source(name, source);
    }
    assert!(
        program.diagnostics.is_empty(),
        "unexpected parse diagnostics: {:?}",
        program.diagnostics
    );
    let resolver = Resolver::resolve_program(&program);
    (program, resolver)
}

pub fn compile_one(source: &str) -> (Program, Resolver) {
    compile(&[("main.tydl", source)])
}

/// Depth-first visit of every node in the program.
pub fn walk(program: &Program, mut f: impl FnMut(NodeIndex)) {
    let mut stack: Vec<NodeIndex> = program.scripts.clone();
    while let Some(idx) = stack.pop() {
        f(idx);
        visit_children(&program.arena, idx, &mut |child| stack.push(child));
    }
}

/// Find the model statement named `name`.
pub fn find_model(program: &Program, name: &str) -> NodeIndex {
    let mut found = NodeIndex::NONE;
    walk(program, |idx| {
        if let Some(node) = program.arena.get(idx) {
            if node.kind == syntax_kind_ext::MODEL_STATEMENT {
                if let Some(model) = program.arena.get_model(node) {
                    if program.arena.identifier_text(model.name) == Some(name) {
                        found = idx;
                    }
                }
            }
        }
    });
    assert!(found.is_some(), "model {name} not found");
    found
}

/// Find the value node of the alias statement named `name`.
pub fn find_alias_value(program: &Program, name: &str) -> NodeIndex {
    let mut found = NodeIndex::NONE;
    walk(program, |idx| {
        if let Some(node) = program.arena.get(idx) {
            if node.kind == syntax_kind_ext::ALIAS_STATEMENT {
                if let Some(alias) = program.arena.get_alias(node) {
                    if program.arena.identifier_text(alias.name) == Some(name) {
                        found = alias.value;
                    }
                }
            }
        }
    });
    assert!(found.is_some(), "alias {name} not found");
    found
}

/// Cached resolution outcome of a reference node.
pub fn resolution_of(resolver: &Resolver, node: NodeIndex) -> (Option<SymbolId>, u32) {
    let links = resolver
        .node_links(node)
        .expect("reference was never resolved");
    (links.resolved_symbol, links.resolution_result)
}

/// Canonical global export by name; panics if absent.
pub fn global_export(program: &Program, resolver: &Resolver, name: &str) -> SymbolId {
    resolver
        .global_export(&program.arena, name)
        .unwrap_or_else(|| panic!("no global export named {name}"))
}
