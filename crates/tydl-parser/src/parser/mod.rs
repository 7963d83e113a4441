//! Recursive-descent parser for tydl source files.
//!
//! The parser is deliberately small: it produces thin-node ASTs for the
//! declaration forms the front end understands (namespaces, models, aliases,
//! using directives, extern decorator/function declarations) and records
//! parse diagnostics instead of failing. One `NodeArena` spans a whole
//! program; `ParserState::with_arena` threads the arena through successive
//! files so `NodeIndex` stays unique program-wide.

use crate::syntax::base::{NodeIndex, NodeList};
use crate::syntax::node::{
    AliasData, DecoratorApplicationData, DecoratorDeclarationData, FunctionDeclarationData,
    ModelData, NamespaceData, NodeArena, ScriptData,
};
use crate::syntax::{node_flags, syntax_kind_ext};
use tydl_common::diagnostics::{Diagnostic, codes};
use tydl_common::{Atom, Span};
use tydl_scanner::{ScannerState, SyntaxKind};

pub struct ParserState<'a> {
    scanner: ScannerState<'a>,
    arena: NodeArena,
    file_name: String,
    diagnostics: Vec<Diagnostic>,
    last_token_end: u32,
}

impl<'a> ParserState<'a> {
    pub fn new(file_name: &str, source: &'a str) -> ParserState<'a> {
        ParserState::with_arena(NodeArena::new(), file_name, source)
    }

    /// Parse into an existing arena (used when one arena spans many files).
    pub fn with_arena(arena: NodeArena, file_name: &str, source: &'a str) -> ParserState<'a> {
        let mut scanner = ScannerState::new(source);
        scanner.scan();
        ParserState {
            scanner,
            arena,
            file_name: file_name.to_string(),
            diagnostics: Vec::new(),
            last_token_end: 0,
        }
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Hand the arena (and any accumulated diagnostics) back to the caller.
    pub fn into_parts(self) -> (NodeArena, Vec<Diagnostic>) {
        (self.arena, self.diagnostics)
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    #[inline]
    fn token(&self) -> SyntaxKind {
        self.scanner.token
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start
    }

    fn next_token(&mut self) {
        self.last_token_end = self.scanner.token_end;
        self.scanner.scan();
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.token() == kind
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) {
        if !self.eat(kind) {
            self.error_at_token(format!(
                "expected {}, found {}",
                kind.describe(),
                self.token().describe()
            ));
        }
    }

    fn error_at_token(&mut self, message: String) {
        let span = self.scanner.token_span();
        self.diagnostics.push(Diagnostic::error(
            self.file_name.clone(),
            span,
            codes::PARSE_ERROR,
            message,
        ));
    }

    /// Skip ahead to a statement boundary after a parse error.
    fn recover(&mut self) {
        loop {
            match self.token() {
                SyntaxKind::EndOfFile | SyntaxKind::CloseBrace => return,
                SyntaxKind::Semicolon => {
                    self.next_token();
                    return;
                }
                _ => self.next_token(),
            }
        }
    }

    // =========================================================================
    // Entry point
    // =========================================================================

    /// Parse one source file, returning the script node.
    pub fn parse_script(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut statements = Vec::new();
        let mut usings = Vec::new();
        let mut in_scope_namespaces = Vec::new();

        while !self.at(SyntaxKind::EndOfFile) {
            self.parse_statement(
                &mut statements,
                &mut usings,
                Some(&mut in_scope_namespaces),
            );
        }

        let script = self.arena.add_script(
            ScriptData {
                file_name: self.file_name.clone(),
                statements: NodeList::new(statements),
                usings: NodeList::new(usings),
                in_scope_namespaces: NodeList::new(in_scope_namespaces),
            },
            pos,
            self.last_token_end,
        );
        tracing::debug!(file = %self.file_name, nodes = self.arena.len(), "parsed script");
        script
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse one statement into `statements`. `in_scope_namespaces` is `Some`
    /// only at file level, where blockless namespaces are legal.
    fn parse_statement(
        &mut self,
        statements: &mut Vec<NodeIndex>,
        usings: &mut Vec<NodeIndex>,
        in_scope_namespaces: Option<&mut Vec<NodeIndex>>,
    ) {
        let decorators = self.parse_decorator_applications();

        match self.token() {
            SyntaxKind::NamespaceKeyword => {
                self.parse_namespace(decorators, statements, usings, in_scope_namespaces);
            }
            SyntaxKind::ModelKeyword => {
                let model = self.parse_model_statement(decorators);
                statements.push(model);
            }
            SyntaxKind::AliasKeyword => {
                self.reject_decorators(&decorators);
                let alias = self.parse_alias();
                statements.push(alias);
            }
            SyntaxKind::UsingKeyword => {
                self.reject_decorators(&decorators);
                let using = self.parse_using();
                statements.push(using);
                usings.push(using);
            }
            SyntaxKind::ExternKeyword => {
                self.reject_decorators(&decorators);
                let decl = self.parse_extern_declaration();
                if decl.is_some() {
                    statements.push(decl);
                }
            }
            _ => {
                self.error_at_token(format!(
                    "expected a declaration, found {}",
                    self.token().describe()
                ));
                // A stray close brace would stall recovery at statement
                // level; consume it and move on.
                if self.at(SyntaxKind::CloseBrace) {
                    self.next_token();
                } else {
                    self.recover();
                }
            }
        }
    }

    fn reject_decorators(&mut self, decorators: &Option<NodeList>) {
        if decorators.is_some() {
            self.error_at_token("decorators are not allowed here".to_string());
        }
    }

    fn parse_decorator_applications(&mut self) -> Option<NodeList> {
        let mut apps = Vec::new();
        while self.at(SyntaxKind::At) {
            let pos = self.token_pos();
            self.next_token();
            let target = self.parse_member_path();
            let mut arguments = Vec::new();
            if self.eat(SyntaxKind::OpenParen) {
                while !self.at(SyntaxKind::CloseParen) && !self.at(SyntaxKind::EndOfFile) {
                    arguments.push(self.parse_value_expression());
                    if !self.eat(SyntaxKind::Comma) {
                        break;
                    }
                }
                self.expect(SyntaxKind::CloseParen);
            }
            apps.push(self.arena.add_decorator_application(
                DecoratorApplicationData {
                    target,
                    arguments: NodeList::new(arguments),
                },
                pos,
                self.last_token_end,
            ));
        }
        if apps.is_empty() { None } else { Some(NodeList::new(apps)) }
    }

    /// Parse a namespace statement. Dotted names desugar to nested
    /// namespaces; the blockless form appends one namespace node per path
    /// segment so the binder can scope the remainder of the file.
    fn parse_namespace(
        &mut self,
        decorators: Option<NodeList>,
        statements: &mut Vec<NodeIndex>,
        usings: &mut Vec<NodeIndex>,
        in_scope_namespaces: Option<&mut Vec<NodeIndex>>,
    ) {
        let pos = self.token_pos();
        self.next_token();

        let mut segments = vec![self.parse_identifier()];
        while self.eat(SyntaxKind::Dot) {
            segments.push(self.parse_identifier());
        }

        if self.eat(SyntaxKind::OpenBrace) {
            let mut body = Vec::new();
            while !self.at(SyntaxKind::CloseBrace) && !self.at(SyntaxKind::EndOfFile) {
                self.parse_statement(&mut body, usings, None);
            }
            self.expect(SyntaxKind::CloseBrace);
            let end = self.last_token_end;

            // Innermost namespace owns the body; outer segments wrap it.
            let mut node = self.arena.add_namespace(
                NamespaceData {
                    decorators,
                    name: segments.pop().unwrap_or(NodeIndex::NONE),
                    statements: Some(NodeList::new(body)),
                },
                0,
                pos,
                end,
            );
            while let Some(name) = segments.pop() {
                node = self.arena.add_namespace(
                    NamespaceData {
                        decorators: None,
                        name,
                        statements: Some(NodeList::new(vec![node])),
                    },
                    0,
                    pos,
                    end,
                );
            }
            statements.push(node);
        } else {
            self.expect(SyntaxKind::Semicolon);
            let end = self.last_token_end;

            match in_scope_namespaces {
                Some(in_scope) => {
                    // One blockless node per segment, outermost first; the
                    // binder nests them in statement order. The in-scope list
                    // is innermost-first for identifier resolution.
                    let mut created = Vec::with_capacity(segments.len());
                    for name in segments {
                        let node = self.arena.add_namespace(
                            NamespaceData {
                                decorators: None,
                                name,
                                statements: None,
                            },
                            node_flags::BLOCKLESS,
                            pos,
                            end,
                        );
                        statements.push(node);
                        created.push(node);
                    }
                    for node in created.into_iter().rev() {
                        in_scope.push(node);
                    }
                }
                None => {
                    self.diagnostics.push(Diagnostic::error(
                        self.file_name.clone(),
                        Span::new(pos, end),
                        codes::PARSE_ERROR,
                        "blockless namespaces are only allowed at the top level of a file"
                            .to_string(),
                    ));
                }
            }
        }
    }

    fn parse_model_statement(&mut self, decorators: Option<NodeList>) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();

        let name = self.parse_identifier();
        let template_parameters = self.parse_template_parameters();

        let mut extends_ref = NodeIndex::NONE;
        let mut is_ref = NodeIndex::NONE;
        loop {
            if self.at(SyntaxKind::ExtendsKeyword) {
                if extends_ref.is_some() {
                    self.error_at_token("duplicate 'extends' clause".to_string());
                }
                self.next_token();
                extends_ref = self.parse_reference_expression();
            } else if self.at(SyntaxKind::IsKeyword) {
                if is_ref.is_some() {
                    self.error_at_token("duplicate 'is' clause".to_string());
                }
                self.next_token();
                is_ref = self.parse_reference_expression();
            } else {
                break;
            }
        }

        let properties = self.parse_model_body();

        self.arena.add_model(
            syntax_kind_ext::MODEL_STATEMENT,
            ModelData {
                decorators,
                name,
                template_parameters,
                extends_ref,
                is_ref,
                properties,
            },
            pos,
            self.last_token_end,
        )
    }

    fn parse_model_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let properties = self.parse_model_body();
        self.arena.add_model(
            syntax_kind_ext::MODEL_EXPRESSION,
            ModelData {
                decorators: None,
                name: NodeIndex::NONE,
                template_parameters: None,
                extends_ref: NodeIndex::NONE,
                is_ref: NodeIndex::NONE,
                properties,
            },
            pos,
            self.last_token_end,
        )
    }

    fn parse_model_body(&mut self) -> NodeList {
        let mut properties = Vec::new();
        self.expect(SyntaxKind::OpenBrace);
        while !self.at(SyntaxKind::CloseBrace) && !self.at(SyntaxKind::EndOfFile) {
            if self.at(SyntaxKind::Ellipsis) {
                let pos = self.token_pos();
                self.next_token();
                let target = self.parse_reference_expression();
                properties.push(self.arena.add_spread_property(target, pos, self.last_token_end));
            } else if self.at(SyntaxKind::Identifier) {
                let pos = self.token_pos();
                let name = self.parse_identifier();
                self.expect(SyntaxKind::Colon);
                let value = self.parse_value_expression();
                properties.push(
                    self.arena
                        .add_model_property(name, value, pos, self.last_token_end),
                );
            } else {
                self.error_at_token(format!(
                    "expected a model property, found {}",
                    self.token().describe()
                ));
                self.recover();
                continue;
            }
            // Properties are separated by ';' or ','; the last separator is
            // optional.
            if !self.eat(SyntaxKind::Semicolon) && !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::CloseBrace);
        NodeList::new(properties)
    }

    fn parse_alias(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();

        let name = self.parse_identifier();
        let template_parameters = self.parse_template_parameters();
        self.expect(SyntaxKind::Equals);
        let value = self.parse_value_expression();
        self.expect(SyntaxKind::Semicolon);

        self.arena.add_alias(
            AliasData {
                name,
                template_parameters,
                value,
            },
            pos,
            self.last_token_end,
        )
    }

    fn parse_using(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();
        let target = self.parse_member_path();
        self.expect(SyntaxKind::Semicolon);
        self.arena.add_using(target, pos, self.last_token_end)
    }

    fn parse_extern_declaration(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.next_token();

        if self.eat(SyntaxKind::DecKeyword) {
            let name_text = if self.at(SyntaxKind::Identifier) {
                Some(format!("@{}", self.scanner.token_text()))
            } else {
                None
            };
            let name = self.parse_identifier();
            let symbol_name = match name_text {
                Some(text) => self.arena.intern(&text),
                None => Atom::NONE,
            };
            let parameters = self.parse_parameter_list();
            self.expect(SyntaxKind::Semicolon);
            self.arena.add_decorator_declaration(
                DecoratorDeclarationData {
                    name,
                    symbol_name,
                    parameters,
                },
                pos,
                self.last_token_end,
            )
        } else if self.eat(SyntaxKind::FnKeyword) {
            let name = self.parse_identifier();
            let parameters = self.parse_parameter_list();
            let return_type = if self.eat(SyntaxKind::Colon) {
                self.parse_value_expression()
            } else {
                NodeIndex::NONE
            };
            self.expect(SyntaxKind::Semicolon);
            self.arena.add_function_declaration(
                FunctionDeclarationData {
                    name,
                    parameters,
                    return_type,
                },
                pos,
                self.last_token_end,
            )
        } else {
            self.error_at_token(format!(
                "expected 'dec' or 'fn' after 'extern', found {}",
                self.token().describe()
            ));
            self.recover();
            NodeIndex::NONE
        }
    }

    fn parse_parameter_list(&mut self) -> NodeList {
        let mut parameters = Vec::new();
        self.expect(SyntaxKind::OpenParen);
        while self.at(SyntaxKind::Identifier) {
            let pos = self.token_pos();
            let name = self.parse_identifier();
            let type_ref = if self.eat(SyntaxKind::Colon) {
                self.parse_value_expression()
            } else {
                NodeIndex::NONE
            };
            parameters.push(self.arena.add_parameter(name, type_ref, pos, self.last_token_end));
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::CloseParen);
        NodeList::new(parameters)
    }

    fn parse_template_parameters(&mut self) -> Option<NodeList> {
        if !self.eat(SyntaxKind::LessThan) {
            return None;
        }
        let mut params = Vec::new();
        while self.at(SyntaxKind::Identifier) {
            let pos = self.token_pos();
            let name = self.parse_identifier();
            params.push(self.arena.add_template_parameter(name, pos, self.last_token_end));
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::GreaterThan);
        Some(NodeList::new(params))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parse a property/argument/alias value: a string literal type, a model
    /// expression, or a type reference.
    fn parse_value_expression(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::StringLiteral => {
                let pos = self.token_pos();
                let atom = self.arena.intern(self.scanner.string_value());
                let end = self.scanner.token_end;
                self.next_token();
                self.arena.add_string_literal_type(atom, pos, end)
            }
            SyntaxKind::OpenBrace => self.parse_model_expression(),
            _ => self.parse_reference_expression(),
        }
    }

    /// Parse `path` or `path<args>` as a type-reference node.
    fn parse_reference_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let target = self.parse_member_path();
        let arguments = if self.eat(SyntaxKind::LessThan) {
            let mut args = Vec::new();
            while !self.at(SyntaxKind::GreaterThan) && !self.at(SyntaxKind::EndOfFile) {
                args.push(self.parse_value_expression());
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.expect(SyntaxKind::GreaterThan);
            Some(NodeList::new(args))
        } else {
            None
        };
        self.arena
            .add_type_ref(target, arguments, pos, self.last_token_end)
    }

    /// Parse `a` or `a.b.c` into an identifier / nested member expression.
    fn parse_member_path(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut node = self.parse_identifier();
        while self.eat(SyntaxKind::Dot) {
            let id = self.parse_identifier();
            node = self.arena.add_member_expr(node, id, pos, self.last_token_end);
        }
        node
    }

    fn parse_identifier(&mut self) -> NodeIndex {
        if self.at(SyntaxKind::Identifier) {
            let pos = self.token_pos();
            let end = self.scanner.token_end;
            let atom = self.arena.intern(self.scanner.token_text());
            self.next_token();
            self.arena.add_identifier(atom, pos, end)
        } else {
            self.error_at_token(format!(
                "expected identifier, found {}",
                self.token().describe()
            ));
            // Missing identifier placeholder keeps the tree well-formed.
            self.arena
                .add_identifier(Atom::NONE, self.token_pos(), self.token_pos())
        }
    }
}
