//! End-to-end resolution tests: member binding, alias unwrapping,
//! unknown/not-found classification, cycles, and idempotence.

mod common;

use common::{compile_one, find_alias_value, find_model, global_export, resolution_of};
use tydl_binder::{result_flags, symbol_flags};

#[test]
fn resolving_the_same_reference_twice_is_identical() {
    let (program, mut resolver) = compile_one("model M { }\nalias R = M;");

    let reference = find_alias_value(&program, "R");
    let first = resolver.resolve_type_reference(&program.arena, reference);
    let second = resolver.resolve_type_reference(&program.arena, reference);
    assert_eq!(first, second);
    assert_eq!(first.1, result_flags::RESOLVED);
}

#[test]
fn member_binding_happens_at_most_once() {
    let (program, mut resolver) =
        compile_one("model M1 { x: \"x\"; }\nmodel M2 is M1 { y: \"y\"; }\nalias R = M2.x;");

    let m2 = resolver.node_symbol(find_model(&program, "M2")).unwrap();
    assert!(resolver.symbol_links(m2).unwrap().members_bound);

    // Re-resolving does not re-copy members.
    let members = resolver.symbol(m2).members.unwrap();
    let overlay = resolver.augmented_symbol_table(members);
    let before = resolver.table(overlay).len();
    let reference = find_alias_value(&program, "R");
    resolver.resolve_type_reference(&program.arena, reference);
    assert_eq!(resolver.table(overlay).len(), before);
}

#[test]
fn is_relation_copies_members() {
    let (program, mut resolver) =
        compile_one("model M1 { x: \"x\"; }\nmodel M2 is M1 { y: \"y\"; }");

    let m2 = resolver.node_symbol(find_model(&program, "M2")).unwrap();
    let members = resolver.symbol(m2).members.unwrap();
    let overlay = resolver.augmented_symbol_table(members);
    let table = resolver.table(overlay);
    assert_eq!(table.len(), 2);
    for name in ["x", "y"] {
        let atom = program.arena.interner().get(name).unwrap();
        assert!(table.get(atom).is_some(), "{name} missing from member set");
    }
}

#[test]
fn spread_produces_the_same_member_set_as_is() {
    let (program, mut resolver) =
        compile_one("model M1 { x: \"x\"; }\nmodel M2 { ...M1; y: \"y\"; }");

    let m2 = resolver.node_symbol(find_model(&program, "M2")).unwrap();
    let members = resolver.symbol(m2).members.unwrap();
    let overlay = resolver.augmented_symbol_table(members);
    let table = resolver.table(overlay);
    assert_eq!(table.len(), 2);
    for name in ["x", "y"] {
        let atom = program.arena.interner().get(name).unwrap();
        assert!(table.get(atom).is_some(), "{name} missing from member set");
    }
}

#[test]
fn base_tables_stay_pristine_under_copies() {
    let (program, resolver) =
        compile_one("model M1 { x: \"x\"; }\nmodel M2 { ...M1; y: \"y\"; }");

    // The binder-created base table holds only the direct member; the spread
    // landed in the overlay.
    let m2 = resolver.node_symbol(find_model(&program, "M2")).unwrap();
    let members = resolver.symbol(m2).members.unwrap();
    assert_eq!(resolver.table(members).len(), 1);
}

#[test]
fn members_resolve_to_their_declaring_model() {
    let (program, resolver) =
        compile_one("model M1 { x: \"x\"; }\nmodel M2 is M1 { y: \"y\"; }\nalias RX = M2.x;\nalias RY = M2.y;");

    let m1_node = find_model(&program, "M1");
    let m2_node = find_model(&program, "M2");

    let (x_sym, x_result) = resolution_of(&resolver, find_alias_value(&program, "RX"));
    assert_eq!(x_result, result_flags::RESOLVED);
    let x_sym = x_sym.unwrap();
    assert_ne!(resolver.symbol(x_sym).flags & symbol_flags::MEMBER, 0);
    // x was copied from M1; its declaration still hangs off M1.
    let x_decl = resolver.symbol(x_sym).declarations[0];
    assert_eq!(program.arena.parent(x_decl), m1_node);

    let (y_sym, y_result) = resolution_of(&resolver, find_alias_value(&program, "RY"));
    assert_eq!(y_result, result_flags::RESOLVED);
    let y_decl = resolver.symbol(y_sym.unwrap()).declarations[0];
    assert_eq!(program.arena.parent(y_decl), m2_node);
}

#[test]
fn extends_delegates_member_lookup_lazily() {
    let (program, resolver) = compile_one(
        "model Base { x: \"x\"; }\n\
         model Mid extends Base { y: \"y\"; }\n\
         model Leaf extends Mid { z: \"z\"; }\n\
         alias R = Leaf.x;",
    );

    // Multi-level chain: x comes from Base without eager flattening.
    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::RESOLVED);
    let base_node = find_model(&program, "Base");
    let decl = resolver.symbol(sym.unwrap()).declarations[0];
    assert_eq!(program.arena.parent(decl), base_node);

    // extends does not copy members into the subclass table.
    let leaf = resolver.node_symbol(find_model(&program, "Leaf")).unwrap();
    let members = resolver.symbol(leaf).members.unwrap();
    assert_eq!(resolver.table(members).len(), 1);
}

#[test]
fn template_instantiation_references_are_unknown() {
    let (program, resolver) =
        compile_one("model Box<T> { }\nalias R = Box<\"a\">;");

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::UNKNOWN);
    assert!(sym.is_none());
}

#[test]
fn extending_an_unknown_base_makes_member_lookups_unknown() {
    let (program, resolver) = compile_one(
        "model Baz<T> { ...T; }\n\
         model Foo extends Baz<{}> { }\n\
         alias R = Foo.anything;",
    );

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::UNKNOWN, "unknown, never not-found");
    assert!(sym.is_none());

    let foo = resolver.node_symbol(find_model(&program, "Foo")).unwrap();
    assert!(resolver.symbol_links(foo).unwrap().has_unknown_members);
}

#[test]
fn spreading_an_unknown_source_marks_members_unknown() {
    let (program, resolver) = compile_one(
        "model Box<T> { }\n\
         model Foo { ...Box<\"a\">; }\n\
         alias R = Foo.missing;",
    );

    let (_, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::UNKNOWN);
}

#[test]
fn missing_member_on_a_known_model_is_not_found() {
    let (program, resolver) = compile_one("model M1 { x: \"x\"; }\nalias R = M1.z;");

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::NOT_FOUND);
    assert!(sym.is_none());
}

#[test]
fn unresolvable_identifier_is_unknown_not_absent() {
    let (program, resolver) = compile_one("alias R = Missing;");

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::UNKNOWN);
    assert!(sym.is_none());
}

#[test]
fn aliases_unwrap_to_their_ultimate_target() {
    let (program, resolver) =
        compile_one("model Model1 { }\nalias B = Model1;\nalias A = B;\nalias R = A;");

    let model1 = global_export(&program, &resolver, "Model1");

    // Resolving a reference to A lands on Model1's canonical symbol, through
    // both alias hops.
    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::RESOLVED);
    assert_eq!(sym, Some(model1));

    // And B's own value reference resolved to the same symbol.
    let (b_sym, _) = resolution_of(&resolver, find_alias_value(&program, "B"));
    assert_eq!(b_sym, Some(model1));
}

#[test]
fn parameterized_aliases_do_not_unwrap() {
    let (program, resolver) =
        compile_one("model Model1 { }\nalias Wrap<T> = Model1;\nalias R = Wrap;");

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::RESOLVED);
    let wrap = global_export(&program, &resolver, "Wrap");
    assert_eq!(sym, Some(wrap));
    assert_ne!(resolver.symbol(wrap).flags & symbol_flags::ALIAS, 0);
}

#[test]
fn alias_to_unresolvable_target_stays_the_alias() {
    let (program, resolver) = compile_one("alias A = Missing;\nalias R = A;");

    // The inner resolution does not succeed, so the alias symbol itself is
    // kept rather than propagating the partial failure.
    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::RESOLVED);
    let a = global_export(&program, &resolver, "A");
    assert_eq!(sym, Some(a));
}

#[test]
fn qualified_namespace_references_resolve() {
    let (program, resolver) =
        compile_one("namespace A.B { model M { } }\nalias R = A.B.M;");

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::RESOLVED);
    assert_ne!(resolver.symbol(sym.unwrap()).flags & symbol_flags::MODEL, 0);
}

#[test]
fn failed_base_aborts_the_whole_chain_unchanged() {
    let (program, resolver) = compile_one("alias R = Missing.Member.Deep;");

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::UNKNOWN);
    assert!(sym.is_none());
}

#[test]
fn self_extending_model_is_circular_not_a_stack_overflow() {
    let (program, resolver) = compile_one("model M extends M { }\nalias R = M.x;");

    let (sym, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::CIRCULAR);
    assert!(sym.is_none());
}

#[test]
fn mutually_extending_models_are_circular() {
    let (program, resolver) = compile_one(
        "model A extends B { }\n\
         model B extends A { }\n\
         alias R = A.x;",
    );

    let (_, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::CIRCULAR);
}

#[test]
fn mutually_recursive_is_copies_terminate() {
    // Copy cycles terminate through the bind-once flag; each side ends up
    // with whatever the other had at its snapshot point.
    let (program, resolver) = compile_one(
        "model A is B { a: \"a\"; }\n\
         model B is A { b: \"b\"; }\n\
         alias R = A.a;",
    );

    let (_, result) = resolution_of(&resolver, find_alias_value(&program, "R"));
    assert_eq!(result, result_flags::RESOLVED);
}

#[test]
fn model_members_bind_even_when_never_referenced() {
    let (program, resolver) =
        compile_one("model Quiet { x: \"x\"; }");

    // The eager program-wide walk bound the container although nothing
    // refers to it by name.
    let quiet = resolver.node_symbol(find_model(&program, "Quiet")).unwrap();
    assert!(resolver.symbol_links(quiet).unwrap().members_bound);
}
