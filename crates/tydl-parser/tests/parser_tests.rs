//! Parser tests: statement shapes, desugarings, and error recovery.

use tydl_parser::syntax::syntax_kind_ext;
use tydl_parser::{NodeIndex, ParserState};

fn parse(source: &str) -> (tydl_parser::NodeArena, NodeIndex) {
    let mut parser = ParserState::new("test.tydl", source);
    let script = parser.parse_script();
    let (arena, diagnostics) = parser.into_parts();
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    (arena, script)
}

fn script_statements(arena: &tydl_parser::NodeArena, script: NodeIndex) -> Vec<NodeIndex> {
    let node = arena.get(script).unwrap();
    arena.get_script(node).unwrap().statements.nodes.clone()
}

#[test]
fn parses_model_with_properties_and_spread() {
    let (arena, script) = parse("model M { x: \"x\"; ...Other; y: \"y\" }");
    let statements = script_statements(&arena, script);
    assert_eq!(statements.len(), 1);

    let node = arena.get(statements[0]).unwrap();
    assert_eq!(node.kind, syntax_kind_ext::MODEL_STATEMENT);
    let model = arena.get_model(node).unwrap();
    assert_eq!(arena.identifier_text(model.name), Some("M"));
    assert_eq!(model.properties.len(), 3);

    let spread = arena.get(model.properties.nodes[1]).unwrap();
    assert_eq!(spread.kind, syntax_kind_ext::MODEL_SPREAD_PROPERTY);
}

#[test]
fn parses_heritage_clauses() {
    let (arena, script) = parse("model M extends Base is Shape { }");
    let statements = script_statements(&arena, script);
    let model = arena.get_model(arena.get(statements[0]).unwrap()).unwrap();
    assert!(model.extends_ref.is_some());
    assert!(model.is_ref.is_some());

    // Heritage targets are type references wrapping the named path.
    let extends = arena.get(model.extends_ref).unwrap();
    assert_eq!(extends.kind, syntax_kind_ext::TYPE_REFERENCE);
    let target = arena.get_type_ref(extends).unwrap().target;
    assert_eq!(arena.identifier_text(target), Some("Base"));
}

#[test]
fn parses_template_parameters_and_arguments() {
    let (arena, script) = parse("model Box<T, U> { }\nalias R = Box<\"a\", {}>;");
    let statements = script_statements(&arena, script);

    let model = arena.get_model(arena.get(statements[0]).unwrap()).unwrap();
    assert_eq!(model.template_parameters.as_ref().unwrap().len(), 2);

    let alias = arena.get_alias(arena.get(statements[1]).unwrap()).unwrap();
    let type_ref = arena.get_type_ref(arena.get(alias.value).unwrap()).unwrap();
    let args = type_ref.arguments.as_ref().unwrap();
    assert_eq!(args.len(), 2);
    let second = arena.get(args.nodes[1]).unwrap();
    assert_eq!(second.kind, syntax_kind_ext::MODEL_EXPRESSION);
}

#[test]
fn parses_dotted_namespace_into_nested_namespaces() {
    let (arena, script) = parse("namespace A.B { model M { } }");
    let statements = script_statements(&arena, script);
    assert_eq!(statements.len(), 1);

    let outer = arena.get_namespace(arena.get(statements[0]).unwrap()).unwrap();
    assert_eq!(arena.identifier_text(outer.name), Some("A"));
    let inner_idx = outer.statements.as_ref().unwrap().nodes[0];
    let inner = arena.get_namespace(arena.get(inner_idx).unwrap()).unwrap();
    assert_eq!(arena.identifier_text(inner.name), Some("B"));
    assert_eq!(inner.statements.as_ref().unwrap().len(), 1);
}

#[test]
fn blockless_namespace_records_in_scope_namespaces() {
    let (arena, script) = parse("namespace A.B;\nmodel M { }");
    let node = arena.get(script).unwrap();
    let data = arena.get_script(node).unwrap();

    // One namespace node per segment plus the model.
    assert_eq!(data.statements.len(), 3);
    // Innermost first for identifier resolution.
    let in_scope = &data.in_scope_namespaces;
    assert_eq!(in_scope.len(), 2);
    let first = arena.get_namespace(arena.get(in_scope.nodes[0]).unwrap()).unwrap();
    assert_eq!(arena.identifier_text(first.name), Some("B"));
    assert!(first.statements.is_none());
}

#[test]
fn parses_using_directives_into_the_file_list() {
    let (arena, script) = parse("using A.B;\nnamespace N { using C; }");
    let node = arena.get(script).unwrap();
    let data = arena.get_script(node).unwrap();
    assert_eq!(data.usings.len(), 2);

    let first = arena.get_using(arena.get(data.usings.nodes[0]).unwrap()).unwrap();
    let target = arena.get(first.target).unwrap();
    assert_eq!(target.kind, syntax_kind_ext::MEMBER_EXPRESSION);

    // The nested using's parent is the namespace statement, not the file.
    let nested = data.usings.nodes[1];
    let parent = arena.parent(nested);
    assert_eq!(
        arena.get(parent).unwrap().kind,
        syntax_kind_ext::NAMESPACE_STATEMENT
    );
}

#[test]
fn parses_extern_declarations() {
    let (arena, script) = parse("extern dec doc(target, text);\nextern fn toUpper(v): Text;");
    let statements = script_statements(&arena, script);
    assert_eq!(statements.len(), 2);

    let dec = arena
        .get_decorator_declaration(arena.get(statements[0]).unwrap())
        .unwrap();
    assert_eq!(dec.parameters.len(), 2);
    assert_eq!(arena.interner().resolve(dec.symbol_name), "@doc");

    let func = arena
        .get_function_declaration(arena.get(statements[1]).unwrap())
        .unwrap();
    assert_eq!(func.parameters.len(), 1);
    assert!(func.return_type.is_some());
}

#[test]
fn parses_decorator_applications_on_models() {
    let (arena, script) = parse("@doc(\"a pet\") model Pet { }");
    let statements = script_statements(&arena, script);
    let model = arena.get_model(arena.get(statements[0]).unwrap()).unwrap();
    let decorators = model.decorators.as_ref().unwrap();
    assert_eq!(decorators.len(), 1);

    let app = arena
        .get_decorator_application(arena.get(decorators.nodes[0]).unwrap())
        .unwrap();
    assert_eq!(arena.identifier_text(app.target), Some("doc"));
    assert_eq!(app.arguments.len(), 1);
}

#[test]
fn parent_links_are_set_bottom_up() {
    let (arena, script) = parse("namespace N { model M { x: \"x\"; } }");
    let statements = script_statements(&arena, script);
    let ns_idx = statements[0];
    let ns = arena.get_namespace(arena.get(ns_idx).unwrap()).unwrap();
    let model_idx = ns.statements.as_ref().unwrap().nodes[0];
    let model = arena.get_model(arena.get(model_idx).unwrap()).unwrap();
    let prop_idx = model.properties.nodes[0];

    assert_eq!(arena.parent(prop_idx), model_idx);
    assert_eq!(arena.parent(model_idx), ns_idx);
    assert_eq!(arena.parent(ns_idx), script);
}

#[test]
fn reports_and_recovers_from_parse_errors() {
    let mut parser = ParserState::new("bad.tydl", "model { }\nmodel Ok { }");
    let script = parser.parse_script();
    let (arena, diagnostics) = parser.into_parts();

    assert!(!diagnostics.is_empty());
    assert!(diagnostics.iter().all(|d| d.code == "parse-error"));

    // The parser kept going and still produced the second model.
    let names: Vec<_> = script_statements(&arena, script)
        .into_iter()
        .filter_map(|idx| {
            let node = arena.get(idx)?;
            let model = arena.get_model(node)?;
            arena.identifier_text(model.name)
        })
        .collect();
    assert!(names.contains(&"Ok"));
}

#[test]
fn unterminated_strings_produce_a_diagnostic() {
    let mut parser = ParserState::new("bad.tydl", "model M { x: \"oops }\n");
    let _ = parser.parse_script();
    let (_, diagnostics) = parser.into_parts();
    assert!(!diagnostics.is_empty());
}
