//! Child traversal over thin nodes.

use super::base::{NodeIndex, NodeList};
use super::node::NodeArena;
use super::syntax_kind_ext;

/// Invoke `f` once for each direct child of `idx`, in source order.
///
/// Optional children that are absent (`NodeIndex::NONE`) are skipped. A
/// script's `usings` and `in_scope_namespaces` lists alias nodes already in
/// its statement tree and are not visited separately.
pub fn visit_children(arena: &NodeArena, idx: NodeIndex, f: &mut impl FnMut(NodeIndex)) {
    let Some(node) = arena.get(idx) else {
        return;
    };

    fn one(child: NodeIndex, f: &mut impl FnMut(NodeIndex)) {
        if child.is_some() {
            f(child);
        }
    }

    fn list(nodes: &NodeList, f: &mut impl FnMut(NodeIndex)) {
        for child in nodes.iter() {
            f(child);
        }
    }

    fn opt_list(nodes: &Option<NodeList>, f: &mut impl FnMut(NodeIndex)) {
        if let Some(nodes) = nodes {
            list(nodes, f);
        }
    }

    match node.kind {
        syntax_kind_ext::SCRIPT => {
            if let Some(script) = arena.get_script(node) {
                list(&script.statements, f);
            }
        }
        syntax_kind_ext::NAMESPACE_STATEMENT => {
            if let Some(ns) = arena.get_namespace(node) {
                opt_list(&ns.decorators, f);
                one(ns.name, f);
                opt_list(&ns.statements, f);
            }
        }
        syntax_kind_ext::MODEL_STATEMENT | syntax_kind_ext::MODEL_EXPRESSION => {
            if let Some(model) = arena.get_model(node) {
                opt_list(&model.decorators, f);
                one(model.name, f);
                opt_list(&model.template_parameters, f);
                one(model.extends_ref, f);
                one(model.is_ref, f);
                list(&model.properties, f);
            }
        }
        syntax_kind_ext::MODEL_PROPERTY => {
            if let Some(prop) = arena.get_model_property(node) {
                one(prop.name, f);
                one(prop.value, f);
            }
        }
        syntax_kind_ext::MODEL_SPREAD_PROPERTY => {
            if let Some(spread) = arena.get_spread(node) {
                one(spread.target, f);
            }
        }
        syntax_kind_ext::ALIAS_STATEMENT => {
            if let Some(alias) = arena.get_alias(node) {
                one(alias.name, f);
                opt_list(&alias.template_parameters, f);
                one(alias.value, f);
            }
        }
        syntax_kind_ext::USING_STATEMENT => {
            if let Some(using) = arena.get_using(node) {
                one(using.target, f);
            }
        }
        syntax_kind_ext::DECORATOR_DECLARATION => {
            if let Some(dec) = arena.get_decorator_declaration(node) {
                one(dec.name, f);
                list(&dec.parameters, f);
            }
        }
        syntax_kind_ext::FUNCTION_DECLARATION => {
            if let Some(func) = arena.get_function_declaration(node) {
                one(func.name, f);
                list(&func.parameters, f);
                one(func.return_type, f);
            }
        }
        syntax_kind_ext::FUNCTION_PARAMETER => {
            if let Some(param) = arena.get_parameter(node) {
                one(param.name, f);
                one(param.type_ref, f);
            }
        }
        syntax_kind_ext::TEMPLATE_PARAMETER => {
            if let Some(tp) = arena.get_template_parameter(node) {
                one(tp.name, f);
            }
        }
        syntax_kind_ext::DECORATOR_APPLICATION => {
            if let Some(app) = arena.get_decorator_application(node) {
                one(app.target, f);
                list(&app.arguments, f);
            }
        }
        syntax_kind_ext::MEMBER_EXPRESSION => {
            if let Some(member) = arena.get_member_expr(node) {
                one(member.base, f);
                one(member.id, f);
            }
        }
        syntax_kind_ext::TYPE_REFERENCE => {
            if let Some(type_ref) = arena.get_type_ref(node) {
                one(type_ref.target, f);
                opt_list(&type_ref.arguments, f);
            }
        }
        // Identifiers and literals are leaves.
        _ => {}
    }
}
