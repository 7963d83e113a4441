//! Tests for the using-binder and using-related resolution outcomes.

mod common;

use common::{compile, compile_one, find_alias_value, global_export, resolution_of, walk};
use tydl_binder::{result_flags, symbol_flags};
use tydl_parser::NodeIndex;
use tydl_parser::syntax::syntax_kind_ext;

/// Find the value reference of the model property named `prop`.
fn find_property_value(program: &tydl_binder::Program, prop: &str) -> NodeIndex {
    let mut found = NodeIndex::NONE;
    walk(program, |idx| {
        if let Some(node) = program.arena.get(idx) {
            if node.kind == syntax_kind_ext::MODEL_PROPERTY {
                if let Some(data) = program.arena.get_model_property(node) {
                    if program.arena.identifier_text(data.name) == Some(prop) {
                        found = data.value;
                    }
                }
            }
        }
    });
    assert!(found.is_some(), "property {prop} not found");
    found
}

#[test]
fn using_injects_namespace_exports_as_locals() {
    let (program, resolver) = compile_one(
        "namespace Foo { model M { } }\n\
         namespace Bar { using Foo; model B { x: M; } }",
    );

    let reference = find_property_value(&program, "x");
    let (sym, result) = resolution_of(&resolver, reference);
    assert_eq!(result, result_flags::RESOLVED);

    let sym = sym.unwrap();
    assert_ne!(resolver.symbol(sym).flags & symbol_flags::USING, 0);

    // The pass-through points at the real exported model.
    let foo = global_export(&program, &resolver, "Foo");
    let foo_exports = resolver.symbol(foo).exports.unwrap();
    let m_atom = program.arena.interner().get("M").unwrap();
    let real = resolver.table(foo_exports).get(m_atom).unwrap();
    assert_eq!(resolver.symbol(sym).symbol_source, Some(real));
}

#[test]
fn using_bindings_do_not_leak_into_other_files() {
    let (program, resolver) = compile(&[
        ("a.tydl", "namespace Foo { model M { } }\nusing Foo;\nalias InFile = M;"),
        ("b.tydl", "alias Elsewhere = M;"),
    ]);

    let (_, in_file) = resolution_of(&resolver, find_alias_value(&program, "InFile"));
    assert_eq!(in_file, result_flags::RESOLVED);

    // The other file never used Foo, so M is not provably present there.
    let (_, elsewhere) = resolution_of(&resolver, find_alias_value(&program, "Elsewhere"));
    assert_eq!(elsewhere, result_flags::UNKNOWN);
}

#[test]
fn duplicate_using_of_same_namespace_reports_and_adds_nothing() {
    let (program, mut resolver) = compile_one(
        "namespace Foo { model M { } }\n\
         namespace Bar { using Foo; using Foo; model B { x: M; } }",
    );

    let diagnostics = resolver.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "duplicate-using");
    assert!(diagnostics[0].message.contains("Foo"));

    // The first using still works.
    let reference = find_property_value(&program, "x");
    let (_, result) = resolution_of(&resolver, reference);
    assert_eq!(result, result_flags::RESOLVED);
}

#[test]
fn duplicate_using_detects_the_merged_namespace() {
    // A.B declared twice; both usings target the same canonical namespace.
    let (_program, mut resolver) = compile(&[
        ("a.tydl", "namespace A.B { model M { } }"),
        ("b.tydl", "namespace A.B { }\nusing A.B;\nusing A.B;"),
    ]);

    let diagnostics = resolver.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "duplicate-using");
}

#[test]
fn using_a_non_namespace_reports_invalid_ref() {
    let (_program, mut resolver) =
        compile_one("model X { }\nnamespace Bar { using X; }");

    let diagnostics = resolver.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, "using-invalid-ref");
}

#[test]
fn unresolvable_using_target_is_skipped_silently() {
    let (_program, mut resolver) = compile_one("namespace Bar { using Missing; }");
    assert!(resolver.take_diagnostics().is_empty());
}

#[test]
fn global_and_using_binding_for_same_name_is_ambiguous() {
    let (program, resolver) = compile_one(
        "namespace Foo { model M { } }\n\
         model M { }\n\
         using Foo;\n\
         alias R = M;",
    );

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::AMBIGUOUS);
    assert!(sym.is_none());
}

#[test]
fn colliding_usings_from_different_namespaces_fail_resolution() {
    let (program, resolver) = compile_one(
        "namespace A { model M { } }\n\
         namespace B { model M { } }\n\
         using A;\n\
         using B;\n\
         alias R = M;",
    );

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::RESOLUTION_FAILED);
    assert!(sym.is_none());
}

#[test]
fn member_access_through_a_used_sub_namespace() {
    // `using Outer` makes Inner visible; Inner.M resolves through the
    // pass-through binding.
    let (program, resolver) = compile_one(
        "namespace Outer { namespace Inner { model M { } } }\n\
         using Outer;\n\
         alias R = Inner.M;",
    );

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::RESOLVED);
    let model = global_export(&program, &resolver, "Outer");
    // Resolve Outer.Inner.M by hand through export tables for comparison.
    let outer_exports = resolver.symbol(model).exports.unwrap();
    let inner_atom = program.arena.interner().get("Inner").unwrap();
    let inner = resolver.table(outer_exports).get(inner_atom).unwrap();
    let inner = resolver.merged_symbol(inner);
    let inner_exports = resolver.symbol(inner).exports.unwrap();
    let m_atom = program.arena.interner().get("M").unwrap();
    let expected = resolver.table(inner_exports).get(m_atom).unwrap();
    assert_eq!(sym, Some(expected));
}
