//! Tests for per-file symbol binding.

mod common;

use common::{compile_one, find_model, global_export};
use tydl_binder::symbol_flags;

#[test]
fn binds_top_level_declarations_into_global_scope() {
    let (program, resolver) = compile_one("model M { } alias A = M;");

    let model = global_export(&program, &resolver, "M");
    assert_ne!(resolver.symbol(model).flags & symbol_flags::MODEL, 0);

    let alias = global_export(&program, &resolver, "A");
    assert_ne!(resolver.symbol(alias).flags & symbol_flags::ALIAS, 0);
}

#[test]
fn binds_model_members() {
    let (program, resolver) = compile_one("model Pet { name: \"name\"; age: \"age\"; }");

    let model_node = find_model(&program, "Pet");
    let model_sym = resolver.node_symbol(model_node).unwrap();
    let members = resolver.symbol(model_sym).members.unwrap();

    let table = resolver.table(members);
    assert_eq!(table.len(), 2);
    let name_atom = program.arena.interner().get("name").unwrap();
    let member = table.get(name_atom).unwrap();
    assert_ne!(resolver.symbol(member).flags & symbol_flags::MEMBER, 0);
    // Member symbols declare the property node, which hangs off the model.
    let decl = resolver.symbol(member).declarations[0];
    assert_eq!(program.arena.parent(decl), model_node);
}

#[test]
fn binds_namespace_exports() {
    let (program, resolver) = compile_one("namespace Foo { model M { } }");

    let ns = global_export(&program, &resolver, "Foo");
    assert_ne!(resolver.symbol(ns).flags & symbol_flags::NAMESPACE, 0);

    let exports = resolver.symbol(ns).exports.unwrap();
    let m_atom = program.arena.interner().get("M").unwrap();
    assert!(resolver.table(exports).get(m_atom).is_some());
}

#[test]
fn binds_dotted_namespace_as_nested_namespaces() {
    let (program, resolver) = compile_one("namespace A.B { model M { } }");

    let a = global_export(&program, &resolver, "A");
    let a_exports = resolver.symbol(a).exports.unwrap();
    let b_atom = program.arena.interner().get("B").unwrap();
    let b = resolver.table(a_exports).get(b_atom).unwrap();
    let b = resolver.merged_symbol(b);
    assert_ne!(resolver.symbol(b).flags & symbol_flags::NAMESPACE, 0);

    let b_exports = resolver.symbol(b).exports.unwrap();
    let m_atom = program.arena.interner().get("M").unwrap();
    assert!(resolver.table(b_exports).get(m_atom).is_some());
}

#[test]
fn blockless_namespace_scopes_rest_of_file() {
    let (program, resolver) = compile_one("namespace Svc;\nmodel M { }");

    let svc = global_export(&program, &resolver, "Svc");
    let exports = resolver.symbol(svc).exports.unwrap();
    let m_atom = program.arena.interner().get("M").unwrap();
    assert!(resolver.table(exports).get(m_atom).is_some());
    // M is not a global export; it lives inside Svc.
    assert!(resolver.global_export(&program.arena, "M").is_none());
}

#[test]
fn binds_extern_decorator_under_at_prefixed_name() {
    let (program, resolver) = compile_one("extern dec doc(target, text);");

    let doc = global_export(&program, &resolver, "@doc");
    let flags = resolver.symbol(doc).flags;
    assert_ne!(flags & symbol_flags::DECORATOR, 0);
    assert_ne!(flags & symbol_flags::DECLARATION, 0);
    assert_eq!(flags & symbol_flags::IMPLEMENTATION, 0);
}

#[test]
fn binds_extern_function_declaration() {
    let (program, resolver) = compile_one("extern fn toUpper(value: Str): Str;\nmodel Str { }");

    let func = global_export(&program, &resolver, "toUpper");
    let flags = resolver.symbol(func).flags;
    assert_ne!(flags & symbol_flags::FUNCTION, 0);
    assert_ne!(flags & symbol_flags::DECLARATION, 0);
}
