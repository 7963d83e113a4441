//! Thin node headers, typed data pools, and the node arena.
//!
//! Each node is a 16-byte header (kind, flags, span, data index); the payload
//! for a given kind lives in a typed pool addressed by `data_index`. Parents
//! are kept in a separate `extended_info` pool populated at construction time
//! (children are always created before their parents), so the headers and
//! payloads themselves never change after a parse.

use super::base::{NodeIndex, NodeList};
use super::syntax_kind_ext;
use serde::Serialize;
use tydl_common::interner::{Atom, Interner};

/// A thin 16-byte node header.
///
/// Layout:
/// - `kind`: 2 bytes (token kind or extended node kind)
/// - `flags`: 2 bytes (packed `node_flags`)
/// - `pos` / `end`: 4 + 4 bytes (byte span in source)
/// - `data_index`: 4 bytes (index into the kind's storage pool)
#[repr(C)]
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Node {
    pub kind: u16,
    pub flags: u16,
    pub pos: u32,
    pub end: u32,
    pub data_index: u32,
}

impl Node {
    pub const NO_DATA: u32 = u32::MAX;

    #[inline]
    pub fn with_data(kind: u16, pos: u32, end: u32, data_index: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index,
        }
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.data_index != Self::NO_DATA
    }
}

// =============================================================================
// Typed Data Pools
// =============================================================================

/// Data for a source file.
///
/// `usings` and `in_scope_namespaces` index nodes that also appear in the
/// statement tree; they are flat views used by the resolver (file-ordered
/// using directives, blockless namespaces innermost-first).
#[derive(Clone, Debug, Serialize)]
pub struct ScriptData {
    pub file_name: String,
    pub statements: NodeList,
    pub usings: NodeList,
    pub in_scope_namespaces: NodeList,
}

/// Data for a namespace statement. `statements` is `None` for the blockless
/// form (`namespace Foo;`), which scopes the remainder of the file.
#[derive(Clone, Debug, Serialize)]
pub struct NamespaceData {
    pub decorators: Option<NodeList>,
    pub name: NodeIndex,
    pub statements: Option<NodeList>,
}

/// Data for model statements and model expressions. Anonymous model
/// expressions have `name == NodeIndex::NONE` and no heritage clauses.
#[derive(Clone, Debug, Serialize)]
pub struct ModelData {
    pub decorators: Option<NodeList>,
    pub name: NodeIndex,
    pub template_parameters: Option<NodeList>,
    pub extends_ref: NodeIndex,
    pub is_ref: NodeIndex,
    pub properties: NodeList,
}

/// Data for a named model property (`x: "x"`).
#[derive(Clone, Debug, Serialize)]
pub struct ModelPropertyData {
    pub name: NodeIndex,
    pub value: NodeIndex,
}

/// Data for a spread property (`...T`).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SpreadPropertyData {
    pub target: NodeIndex,
}

/// Data for an alias statement (`alias A = B;`).
#[derive(Clone, Debug, Serialize)]
pub struct AliasData {
    pub name: NodeIndex,
    pub template_parameters: Option<NodeList>,
    pub value: NodeIndex,
}

/// Data for a using directive (`using Foo.Bar;`).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct UsingData {
    /// Identifier or member expression naming the used namespace.
    pub target: NodeIndex,
}

/// Data for an extern decorator declaration (`extern dec doc(target, text);`).
#[derive(Clone, Debug, Serialize)]
pub struct DecoratorDeclarationData {
    pub name: NodeIndex,
    /// `@`-prefixed binding name (`@doc`), interned at parse time. Decorator
    /// symbols live in the same tables as type symbols; the prefix keeps the
    /// two name spaces apart.
    pub symbol_name: Atom,
    pub parameters: NodeList,
}

/// Data for an extern function declaration (`extern fn upper(s): string;`).
#[derive(Clone, Debug, Serialize)]
pub struct FunctionDeclarationData {
    pub name: NodeIndex,
    pub parameters: NodeList,
    pub return_type: NodeIndex,
}

/// Data for one parameter of an extern declaration.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct FunctionParameterData {
    pub name: NodeIndex,
    pub type_ref: NodeIndex,
}

/// Data for a template parameter declaration.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct TemplateParameterData {
    pub name: NodeIndex,
}

/// Data for a decorator application (`@doc("...")`).
#[derive(Clone, Debug, Serialize)]
pub struct DecoratorApplicationData {
    /// Identifier or member expression naming the decorator.
    pub target: NodeIndex,
    pub arguments: NodeList,
}

/// Data for identifier nodes.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct IdentifierData {
    pub atom: Atom,
}

/// Data for member expressions (`base.id`).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct MemberExprData {
    pub base: NodeIndex,
    pub id: NodeIndex,
}

/// Data for type references (`target<args>`). A bare reference has
/// `arguments == None`; explicit empty argument lists do not occur.
#[derive(Clone, Debug, Serialize)]
pub struct TypeRefData {
    pub target: NodeIndex,
    pub arguments: Option<NodeList>,
}

/// Data for string literal types (`"x"`).
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LiteralData {
    pub value: Atom,
}

/// Side data shared by every node: the parent link, populated bottom-up
/// during construction.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct ExtendedData {
    pub parent: NodeIndex,
}

// =============================================================================
// Node Arena
// =============================================================================

/// Arena owning every node of a compilation plus the interner for their text.
///
/// One arena spans all files of a program so `NodeIndex` is unique
/// program-wide.
#[derive(Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    extended_info: Vec<ExtendedData>,
    interner: Interner,

    scripts: Vec<ScriptData>,
    namespaces: Vec<NamespaceData>,
    models: Vec<ModelData>,
    properties: Vec<ModelPropertyData>,
    spreads: Vec<SpreadPropertyData>,
    aliases: Vec<AliasData>,
    usings: Vec<UsingData>,
    decorator_decls: Vec<DecoratorDeclarationData>,
    function_decls: Vec<FunctionDeclarationData>,
    parameters: Vec<FunctionParameterData>,
    template_params: Vec<TemplateParameterData>,
    decorator_apps: Vec<DecoratorApplicationData>,
    identifiers: Vec<IdentifierData>,
    member_exprs: Vec<MemberExprData>,
    type_refs: Vec<TypeRefData>,
    literals: Vec<LiteralData>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Intern a string into this arena's pool.
    pub fn intern(&mut self, text: &str) -> Atom {
        self.interner.intern(text)
    }

    /// Number of nodes allocated so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    pub fn get_extended(&self, idx: NodeIndex) -> Option<&ExtendedData> {
        self.extended_info.get(idx.0 as usize)
    }

    /// Parent of a node, or `NodeIndex::NONE` at a root.
    #[inline]
    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.get_extended(idx).map_or(NodeIndex::NONE, |e| e.parent)
    }

    /// Resolve an identifier node's text.
    pub fn identifier_text(&self, idx: NodeIndex) -> Option<&str> {
        let node = self.get(idx)?;
        let data = self.get_identifier(node)?;
        Some(self.interner.resolve(data.atom))
    }

    /// Atom of an identifier node, if `idx` is one.
    pub fn identifier_atom(&self, idx: NodeIndex) -> Option<Atom> {
        let node = self.get(idx)?;
        Some(self.get_identifier(node)?.atom)
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    pub fn get_script(&self, node: &Node) -> Option<&ScriptData> {
        if node.kind == syntax_kind_ext::SCRIPT {
            self.scripts.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_namespace(&self, node: &Node) -> Option<&NamespaceData> {
        if node.kind == syntax_kind_ext::NAMESPACE_STATEMENT {
            self.namespaces.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_model(&self, node: &Node) -> Option<&ModelData> {
        if node.kind == syntax_kind_ext::MODEL_STATEMENT
            || node.kind == syntax_kind_ext::MODEL_EXPRESSION
        {
            self.models.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_model_property(&self, node: &Node) -> Option<&ModelPropertyData> {
        if node.kind == syntax_kind_ext::MODEL_PROPERTY {
            self.properties.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_spread(&self, node: &Node) -> Option<&SpreadPropertyData> {
        if node.kind == syntax_kind_ext::MODEL_SPREAD_PROPERTY {
            self.spreads.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_alias(&self, node: &Node) -> Option<&AliasData> {
        if node.kind == syntax_kind_ext::ALIAS_STATEMENT {
            self.aliases.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_using(&self, node: &Node) -> Option<&UsingData> {
        if node.kind == syntax_kind_ext::USING_STATEMENT {
            self.usings.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_decorator_declaration(&self, node: &Node) -> Option<&DecoratorDeclarationData> {
        if node.kind == syntax_kind_ext::DECORATOR_DECLARATION {
            self.decorator_decls.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_function_declaration(&self, node: &Node) -> Option<&FunctionDeclarationData> {
        if node.kind == syntax_kind_ext::FUNCTION_DECLARATION {
            self.function_decls.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_parameter(&self, node: &Node) -> Option<&FunctionParameterData> {
        if node.kind == syntax_kind_ext::FUNCTION_PARAMETER {
            self.parameters.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_template_parameter(&self, node: &Node) -> Option<&TemplateParameterData> {
        if node.kind == syntax_kind_ext::TEMPLATE_PARAMETER {
            self.template_params.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_decorator_application(&self, node: &Node) -> Option<&DecoratorApplicationData> {
        if node.kind == syntax_kind_ext::DECORATOR_APPLICATION {
            self.decorator_apps.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_identifier(&self, node: &Node) -> Option<&IdentifierData> {
        if node.kind == syntax_kind_ext::IDENTIFIER {
            self.identifiers.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_member_expr(&self, node: &Node) -> Option<&MemberExprData> {
        if node.kind == syntax_kind_ext::MEMBER_EXPRESSION {
            self.member_exprs.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_type_ref(&self, node: &Node) -> Option<&TypeRefData> {
        if node.kind == syntax_kind_ext::TYPE_REFERENCE {
            self.type_refs.get(node.data_index as usize)
        } else {
            None
        }
    }

    pub fn get_literal(&self, node: &Node) -> Option<&LiteralData> {
        if node.kind == syntax_kind_ext::STRING_LITERAL_TYPE {
            self.literals.get(node.data_index as usize)
        } else {
            None
        }
    }

    // =========================================================================
    // Parent mapping helpers
    // =========================================================================

    /// Set the parent for a single child node. Children are created before
    /// parents, so the child's extended record always exists by now.
    #[inline]
    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if child.is_some() {
            if let Some(info) = self.extended_info.get_mut(child.0 as usize) {
                info.parent = parent;
            }
        }
    }

    #[inline]
    fn set_parent_list(&mut self, list: &NodeList, parent: NodeIndex) {
        for child in list.iter() {
            self.set_parent(child, parent);
        }
    }

    #[inline]
    fn set_parent_opt_list(&mut self, list: &Option<NodeList>, parent: NodeIndex) {
        if let Some(l) = list {
            self.set_parent_list(l, parent);
        }
    }

    fn push_node(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        self.extended_info.push(ExtendedData::default());
        idx
    }

    // =========================================================================
    // Node creation methods
    // =========================================================================

    pub fn add_identifier(&mut self, atom: Atom, pos: u32, end: u32) -> NodeIndex {
        let data_index = self.identifiers.len() as u32;
        self.identifiers.push(IdentifierData { atom });
        self.push_node(Node::with_data(
            syntax_kind_ext::IDENTIFIER,
            pos,
            end,
            data_index,
        ))
    }

    pub fn add_member_expr(&mut self, base: NodeIndex, id: NodeIndex, pos: u32, end: u32) -> NodeIndex {
        let data_index = self.member_exprs.len() as u32;
        self.member_exprs.push(MemberExprData { base, id });
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::MEMBER_EXPRESSION,
            pos,
            end,
            data_index,
        ));
        self.set_parent(base, idx);
        self.set_parent(id, idx);
        idx
    }

    pub fn add_type_ref(
        &mut self,
        target: NodeIndex,
        arguments: Option<NodeList>,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data_index = self.type_refs.len() as u32;
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::TYPE_REFERENCE,
            pos,
            end,
            data_index,
        ));
        self.set_parent(target, idx);
        self.set_parent_opt_list(&arguments, idx);
        self.type_refs.push(TypeRefData { target, arguments });
        idx
    }

    pub fn add_string_literal_type(&mut self, value: Atom, pos: u32, end: u32) -> NodeIndex {
        let data_index = self.literals.len() as u32;
        self.literals.push(LiteralData { value });
        self.push_node(Node::with_data(
            syntax_kind_ext::STRING_LITERAL_TYPE,
            pos,
            end,
            data_index,
        ))
    }

    pub fn add_model_property(
        &mut self,
        name: NodeIndex,
        value: NodeIndex,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data_index = self.properties.len() as u32;
        self.properties.push(ModelPropertyData { name, value });
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::MODEL_PROPERTY,
            pos,
            end,
            data_index,
        ));
        self.set_parent(name, idx);
        self.set_parent(value, idx);
        idx
    }

    pub fn add_spread_property(&mut self, target: NodeIndex, pos: u32, end: u32) -> NodeIndex {
        let data_index = self.spreads.len() as u32;
        self.spreads.push(SpreadPropertyData { target });
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::MODEL_SPREAD_PROPERTY,
            pos,
            end,
            data_index,
        ));
        self.set_parent(target, idx);
        idx
    }

    pub fn add_template_parameter(&mut self, name: NodeIndex, pos: u32, end: u32) -> NodeIndex {
        let data_index = self.template_params.len() as u32;
        self.template_params.push(TemplateParameterData { name });
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::TEMPLATE_PARAMETER,
            pos,
            end,
            data_index,
        ));
        self.set_parent(name, idx);
        idx
    }

    pub fn add_model(
        &mut self,
        kind: u16,
        data: ModelData,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        debug_assert!(
            kind == syntax_kind_ext::MODEL_STATEMENT || kind == syntax_kind_ext::MODEL_EXPRESSION
        );
        let data_index = self.models.len() as u32;
        let idx = self.push_node(Node::with_data(kind, pos, end, data_index));
        self.set_parent_opt_list(&data.decorators, idx);
        self.set_parent(data.name, idx);
        self.set_parent_opt_list(&data.template_parameters, idx);
        self.set_parent(data.extends_ref, idx);
        self.set_parent(data.is_ref, idx);
        self.set_parent_list(&data.properties, idx);
        self.models.push(data);
        idx
    }

    pub fn add_alias(&mut self, data: AliasData, pos: u32, end: u32) -> NodeIndex {
        let data_index = self.aliases.len() as u32;
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::ALIAS_STATEMENT,
            pos,
            end,
            data_index,
        ));
        self.set_parent(data.name, idx);
        self.set_parent_opt_list(&data.template_parameters, idx);
        self.set_parent(data.value, idx);
        self.aliases.push(data);
        idx
    }

    pub fn add_using(&mut self, target: NodeIndex, pos: u32, end: u32) -> NodeIndex {
        let data_index = self.usings.len() as u32;
        self.usings.push(UsingData { target });
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::USING_STATEMENT,
            pos,
            end,
            data_index,
        ));
        self.set_parent(target, idx);
        idx
    }

    pub fn add_namespace(
        &mut self,
        data: NamespaceData,
        flags: u16,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data_index = self.namespaces.len() as u32;
        let mut node = Node::with_data(syntax_kind_ext::NAMESPACE_STATEMENT, pos, end, data_index);
        node.flags = flags;
        let idx = self.push_node(node);
        self.set_parent_opt_list(&data.decorators, idx);
        self.set_parent(data.name, idx);
        self.set_parent_opt_list(&data.statements, idx);
        self.namespaces.push(data);
        idx
    }

    pub fn add_parameter(
        &mut self,
        name: NodeIndex,
        type_ref: NodeIndex,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data_index = self.parameters.len() as u32;
        self.parameters.push(FunctionParameterData { name, type_ref });
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::FUNCTION_PARAMETER,
            pos,
            end,
            data_index,
        ));
        self.set_parent(name, idx);
        self.set_parent(type_ref, idx);
        idx
    }

    pub fn add_decorator_declaration(
        &mut self,
        data: DecoratorDeclarationData,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data_index = self.decorator_decls.len() as u32;
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::DECORATOR_DECLARATION,
            pos,
            end,
            data_index,
        ));
        self.set_parent(data.name, idx);
        self.set_parent_list(&data.parameters, idx);
        self.decorator_decls.push(data);
        idx
    }

    pub fn add_function_declaration(
        &mut self,
        data: FunctionDeclarationData,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data_index = self.function_decls.len() as u32;
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::FUNCTION_DECLARATION,
            pos,
            end,
            data_index,
        ));
        self.set_parent(data.name, idx);
        self.set_parent_list(&data.parameters, idx);
        self.set_parent(data.return_type, idx);
        self.function_decls.push(data);
        idx
    }

    pub fn add_decorator_application(
        &mut self,
        data: DecoratorApplicationData,
        pos: u32,
        end: u32,
    ) -> NodeIndex {
        let data_index = self.decorator_apps.len() as u32;
        let idx = self.push_node(Node::with_data(
            syntax_kind_ext::DECORATOR_APPLICATION,
            pos,
            end,
            data_index,
        ));
        self.set_parent(data.target, idx);
        self.set_parent_list(&data.arguments, idx);
        self.decorator_apps.push(data);
        idx
    }

    pub fn add_script(&mut self, data: ScriptData, pos: u32, end: u32) -> NodeIndex {
        let data_index = self.scripts.len() as u32;
        let idx = self.push_node(Node::with_data(syntax_kind_ext::SCRIPT, pos, end, data_index));
        // usings and in_scope_namespaces alias nodes inside `statements`;
        // parents come from the statement tree alone.
        self.set_parent_list(&data.statements, idx);
        self.scripts.push(data);
        idx
    }
}
