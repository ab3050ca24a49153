//! Parser state: recursive-descent parsing of source files and snippets.
//!
//! The grammar is the subset the evaluator needs: imports, classes with
//! fields/methods/constructors/static blocks, functions, `let`/`const`,
//! `if`, `return`, blocks and the usual binary/unary/call/member/`new`/`as`
//! expressions. Nodes are added to a borrowed session arena.

use super::base::{NodeIndex, NodeList};
use super::flags::{modifier_flags, node_flags};
use super::node::*;
use crate::scanner::{Scanner, SyntaxKind};
use dbgeval_common::diagnostics::{Diagnostic, diagnostic_codes};
use tracing::trace;

pub struct ParserState<'a> {
    arena: &'a mut NodeArena,
    scanner: Scanner,
    current_token: SyntaxKind,
    /// End of the last consumed token.
    prev_end: u32,
    file_name: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ParserState<'a> {
    pub fn new(arena: &'a mut NodeArena, file_name: impl Into<String>, source_text: &str) -> Self {
        let mut state = ParserState {
            arena,
            scanner: Scanner::new(source_text),
            current_token: SyntaxKind::Unknown,
            prev_end: 0,
            file_name: file_name.into(),
            diagnostics: Vec::new(),
        };
        state.next_token();
        state
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // =========================================================================
    // Token Helpers
    // =========================================================================

    fn next_token(&mut self) -> SyntaxKind {
        self.prev_end = self.scanner.token_end();
        self.current_token = self.scanner.scan();
        if self.current_token == SyntaxKind::StringLiteral && self.scanner.is_unterminated() {
            self.error_at_current_token(diagnostic_codes::UNTERMINATED_STRING_LITERAL, &[]);
        } else if self.current_token == SyntaxKind::Unknown {
            self.error_at_current_token(diagnostic_codes::INVALID_CHARACTER, &[]);
        }
        self.current_token
    }

    #[inline]
    fn token(&self) -> SyntaxKind {
        self.current_token
    }

    #[inline]
    fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start()
    }

    fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        let text = kind.token_text().unwrap_or("token");
        self.error_at_current_token(diagnostic_codes::EXPECTED_TOKEN, &[text]);
        false
    }

    fn error_at_current_token(&mut self, code: u32, args: &[&str]) {
        let start = self.scanner.token_start();
        let length = self.scanner.token_end().saturating_sub(start);
        // One diagnostic per position keeps recovery from cascading.
        if self.diagnostics.last().is_some_and(|d| d.start == start) {
            return;
        }
        self.diagnostics.push(Diagnostic::from_code(
            self.file_name.clone(),
            start,
            length,
            code,
            args,
        ));
    }

    fn current_text(&self) -> String {
        match self.token() {
            SyntaxKind::Identifier
            | SyntaxKind::NumericLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::Unknown => self.scanner.token_value().to_string(),
            SyntaxKind::EndOfFileToken => "end of file".to_string(),
            kind => kind.token_text().unwrap_or_default().to_string(),
        }
    }

    fn is_identifier(&self) -> bool {
        self.is_token(SyntaxKind::Identifier) || self.token().is_contextual_keyword()
    }

    /// Parse an identifier; keywords are accepted when `allow_keywords` is set (member names).
    fn parse_identifier_name(&mut self, allow_keywords: bool) -> NodeIndex {
        let pos = self.token_pos();
        let text = if self.is_identifier() {
            self.current_text()
        } else if allow_keywords && let Some(text) = self.token().token_text()
            && text.chars().all(|c| c.is_ascii_alphabetic())
        {
            text.to_string()
        } else {
            self.error_at_current_token(diagnostic_codes::IDENTIFIER_EXPECTED, &[]);
            let index = self.arena.add_identifier(pos, pos, "");
            self.arena
                .add_node_flags(index, node_flags::THIS_NODE_HAS_ERROR);
            return index;
        };
        self.next_token();
        self.arena.add_identifier(pos, self.prev_end, text)
    }

    fn parse_identifier(&mut self) -> NodeIndex {
        self.parse_identifier_name(false)
    }

    // =========================================================================
    // Source Files and Statement Lists
    // =========================================================================

    /// Parse the whole input as a source file belonging to `module_name`.
    pub fn parse_source_file(&mut self, module_name: &str) -> NodeIndex {
        let statements = self.parse_statement_list();
        let end = self.scanner.token_end();
        trace!(
            file = %self.file_name,
            statements = statements.len(),
            "parsed source file"
        );
        self.arena.add_source_file(
            0,
            end,
            SourceFileData {
                file_name: self.file_name.clone(),
                module_name: module_name.to_string(),
                statements,
            },
        )
    }

    /// Parse statements until end of input.
    pub fn parse_statement_list(&mut self) -> NodeList {
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::EndOfFileToken) {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let start = self.token_pos();
            let statement = self.parse_statement();
            if statement.is_some() {
                statements.push(statement);
            }
            if self.token_pos() == start && !self.is_token(SyntaxKind::EndOfFileToken) {
                let text = self.current_text();
                self.error_at_current_token(diagnostic_codes::UNEXPECTED_TOKEN, &[&text]);
                self.next_token();
            }
        }
        NodeList::from_vec(statements)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn parse_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let modifiers = self.parse_declaration_modifiers();
        match self.token() {
            SyntaxKind::ImportKeyword if modifiers == 0 => self.parse_import_declaration(),
            SyntaxKind::ClassKeyword => self.parse_class_declaration(pos, modifiers),
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(pos, modifiers),
            SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                self.parse_variable_statement(pos, modifiers)
            }
            _ if modifiers != 0 => {
                self.error_at_current_token(diagnostic_codes::EXPECTED_TOKEN, &["class"]);
                NodeIndex::NONE
            }
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::OpenBraceToken => self.parse_block(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_declaration_modifiers(&mut self) -> u32 {
        let mut flags = modifier_flags::NONE;
        loop {
            let flag = match self.token() {
                SyntaxKind::ExportKeyword => modifier_flags::EXPORT,
                SyntaxKind::DeclareKeyword => modifier_flags::DECLARE,
                SyntaxKind::AbstractKeyword => modifier_flags::ABSTRACT,
                _ => return flags,
            };
            flags |= flag;
            self.next_token();
        }
    }

    fn parse_import_declaration(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::ImportKeyword);
        let mut specifiers = Vec::new();
        if self.is_token(SyntaxKind::AsteriskToken) {
            let spec_pos = self.token_pos();
            self.next_token();
            self.parse_expected(SyntaxKind::AsKeyword);
            let name = self.parse_identifier();
            specifiers.push(self.arena.add_specifier(
                SyntaxKind::NamespaceImport,
                spec_pos,
                self.prev_end,
                SpecifierData {
                    property_name: NodeIndex::NONE,
                    name,
                },
            ));
        } else {
            self.parse_expected(SyntaxKind::OpenBraceToken);
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                let spec_pos = self.token_pos();
                let first = self.parse_identifier_name(true);
                let (property_name, name) = if self.parse_optional(SyntaxKind::AsKeyword) {
                    (first, self.parse_identifier())
                } else {
                    (NodeIndex::NONE, first)
                };
                specifiers.push(self.arena.add_specifier(
                    SyntaxKind::ImportSpecifier,
                    spec_pos,
                    self.prev_end,
                    SpecifierData {
                        property_name,
                        name,
                    },
                ));
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        self.parse_expected(SyntaxKind::FromKeyword);
        let module_specifier = if self.is_token(SyntaxKind::StringLiteral) {
            self.parse_literal()
        } else {
            self.error_at_current_token(diagnostic_codes::EXPECTED_TOKEN, &["string literal"]);
            NodeIndex::NONE
        };
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.arena.add_import_decl(
            pos,
            self.prev_end,
            ImportDeclData {
                specifiers: NodeList::from_vec(specifiers),
                module_specifier,
            },
        )
    }

    fn parse_variable_statement(&mut self, pos: u32, modifiers: u32) -> NodeIndex {
        let flags = if self.is_token(SyntaxKind::ConstKeyword) {
            node_flags::CONST
        } else {
            node_flags::LET
        };
        self.next_token();
        let mut declarations = Vec::new();
        loop {
            let decl_pos = self.token_pos();
            let name = self.parse_identifier();
            let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
                self.parse_type()
            } else {
                NodeIndex::NONE
            };
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_assignment_expression()
            } else {
                NodeIndex::NONE
            };
            declarations.push(self.arena.add_variable_declaration(
                decl_pos,
                self.prev_end,
                VariableDeclarationData {
                    name,
                    type_annotation,
                    initializer,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_optional(SyntaxKind::SemicolonToken);
        let statement = self.arena.add_variable(
            pos,
            self.prev_end,
            flags,
            VariableData {
                declarations: NodeList::from_vec(declarations),
            },
        );
        self.arena.set_modifier_flags(statement, modifiers);
        statement
    }

    fn parse_return_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::ReturnKeyword);
        let expression = if self.is_token(SyntaxKind::SemicolonToken)
            || self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
        {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.arena.add_expr_statement(
            SyntaxKind::ReturnStatement,
            pos,
            self.prev_end,
            ExprStatementData { expression },
        )
    }

    fn parse_if_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::IfKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let then_statement = self.parse_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        self.arena.add_if_statement(
            pos,
            self.prev_end,
            IfStatementData {
                expression,
                then_statement,
                else_statement,
            },
        )
    }

    pub fn parse_block(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let start = self.token_pos();
            let statement = self.parse_statement();
            if statement.is_some() {
                statements.push(statement);
            }
            if self.token_pos() == start {
                let text = self.current_text();
                self.error_at_current_token(diagnostic_codes::UNEXPECTED_TOKEN, &[&text]);
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add_block(
            pos,
            self.prev_end,
            BlockData {
                statements: NodeList::from_vec(statements),
            },
        )
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let expression = self.parse_expression();
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.arena.add_expr_statement(
            SyntaxKind::ExpressionStatement,
            pos,
            self.prev_end,
            ExprStatementData { expression },
        )
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_function_declaration(&mut self, pos: u32, modifiers: u32) -> NodeIndex {
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let name = self.parse_identifier();
        let function = self.parse_function_rest(SyntaxKind::FunctionDeclaration, pos, name);
        self.arena.set_modifier_flags(function, modifiers);
        function
    }

    /// Parameters, return type and optional body, shared by functions and methods.
    fn parse_function_rest(&mut self, kind: SyntaxKind, pos: u32, name: NodeIndex) -> NodeIndex {
        let parameters = self.parse_parameter_list();
        let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_optional(SyntaxKind::SemicolonToken);
            NodeIndex::NONE
        };
        self.arena.add_function(
            kind,
            pos,
            self.prev_end,
            FunctionData {
                name,
                parameters,
                type_annotation,
                body,
            },
        )
    }

    fn parse_parameter_list(&mut self) -> NodeList {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut parameters = Vec::new();
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos = self.token_pos();
            let name = self.parse_identifier();
            let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
                self.parse_type()
            } else {
                NodeIndex::NONE
            };
            parameters.push(self.arena.add_parameter(
                pos,
                self.prev_end,
                ParameterData {
                    name,
                    type_annotation,
                },
            ));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList::from_vec(parameters)
    }

    fn parse_class_declaration(&mut self, pos: u32, modifiers: u32) -> NodeIndex {
        self.parse_expected(SyntaxKind::ClassKeyword);
        let name = self.parse_identifier();
        let heritage = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            self.parse_type_reference()
        } else {
            NodeIndex::NONE
        };
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut members = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let start = self.token_pos();
            let member = self.parse_class_member();
            if member.is_some() {
                members.push(member);
            }
            if self.token_pos() == start {
                let text = self.current_text();
                self.error_at_current_token(diagnostic_codes::UNEXPECTED_TOKEN, &[&text]);
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        let class = self.arena.add_class(
            pos,
            self.prev_end,
            ClassData {
                name,
                heritage,
                members: NodeList::from_vec(members),
            },
        );
        self.arena.set_modifier_flags(class, modifiers);
        class
    }

    fn parse_member_modifiers(&mut self) -> u32 {
        let mut flags = modifier_flags::NONE;
        loop {
            let flag = match self.token() {
                SyntaxKind::StaticKeyword => modifier_flags::STATIC,
                SyntaxKind::ReadonlyKeyword => modifier_flags::READONLY,
                SyntaxKind::PrivateKeyword => modifier_flags::PRIVATE,
                SyntaxKind::ProtectedKeyword => modifier_flags::PROTECTED,
                SyntaxKind::PublicKeyword => modifier_flags::PUBLIC,
                SyntaxKind::AbstractKeyword => modifier_flags::ABSTRACT,
                SyntaxKind::DeclareKeyword => modifier_flags::DECLARE,
                _ => return flags,
            };
            // `static {` opens a static block, not a modifier list.
            if flag == modifier_flags::STATIC {
                let snapshot = self.scanner.save_state();
                let next = self.scanner.scan();
                self.scanner.restore_state(snapshot);
                if next == SyntaxKind::OpenBraceToken {
                    return flags;
                }
            }
            flags |= flag;
            self.next_token();
        }
    }

    fn parse_class_member(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let modifiers = self.parse_member_modifiers();

        if self.is_token(SyntaxKind::StaticKeyword) {
            self.next_token();
            let body = self.parse_block();
            return self.arena.add_function(
                SyntaxKind::ClassStaticBlockDeclaration,
                pos,
                self.prev_end,
                FunctionData {
                    name: NodeIndex::NONE,
                    parameters: NodeList::new(),
                    type_annotation: NodeIndex::NONE,
                    body,
                },
            );
        }

        if self.is_token(SyntaxKind::ConstructorKeyword) {
            self.next_token();
            let ctor = self.parse_function_rest(SyntaxKind::Constructor, pos, NodeIndex::NONE);
            self.arena.set_modifier_flags(ctor, modifiers);
            return ctor;
        }

        let name = self.parse_identifier_name(true);
        if self.is_token(SyntaxKind::OpenParenToken) {
            let method = self.parse_function_rest(SyntaxKind::MethodDeclaration, pos, name);
            self.arena.set_modifier_flags(method, modifiers);
            return method;
        }

        let type_annotation = if self.parse_optional(SyntaxKind::ColonToken) {
            self.parse_type()
        } else {
            NodeIndex::NONE
        };
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        self.parse_optional(SyntaxKind::SemicolonToken);
        let property = self.arena.add_property_decl(
            pos,
            self.prev_end,
            PropertyDeclData {
                name,
                type_annotation,
                initializer,
            },
        );
        self.arena.set_modifier_flags(property, modifiers);
        property
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn parse_type(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut ty = if self.token().is_type_keyword() {
            let kind = self.token();
            self.next_token();
            self.arena.add_token(kind, pos, self.prev_end)
        } else {
            self.parse_type_reference()
        };
        while self.is_token(SyntaxKind::OpenBracketToken) {
            self.next_token();
            self.parse_expected(SyntaxKind::CloseBracketToken);
            ty = self
                .arena
                .add_array_type(pos, self.prev_end, ArrayTypeData { element_type: ty });
        }
        ty
    }

    fn parse_type_reference(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let type_name = self.parse_identifier();
        self.arena.add_type_ref(
            pos,
            self.prev_end,
            TypeRefData {
                type_name,
                binary_name: None,
            },
        )
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn parse_expression(&mut self) -> NodeIndex {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let left = self.parse_binary_expression(0);
        if self.is_token(SyntaxKind::EqualsToken) {
            self.next_token();
            let right = self.parse_assignment_expression();
            return self.arena.add_binary_expr(
                pos,
                self.prev_end,
                BinaryExprData {
                    left,
                    operator_token: SyntaxKind::EqualsToken,
                    right,
                },
            );
        }
        left
    }

    fn binary_precedence(kind: SyntaxKind) -> Option<u8> {
        Some(match kind {
            SyntaxKind::BarBarToken => 1,
            SyntaxKind::AmpersandAmpersandToken => 2,
            SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::EqualsEqualsEqualsToken
            | SyntaxKind::ExclamationEqualsEqualsToken => 3,
            SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::AsKeyword => 4,
            SyntaxKind::PlusToken | SyntaxKind::MinusToken => 5,
            SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 6,
            _ => return None,
        })
    }

    /// Precedence climbing over left-associative binary operators; `as` binds at
    /// relational precedence.
    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let pos = self.token_pos();
        let mut left = self.parse_unary_expression();
        while let Some(precedence) = Self::binary_precedence(self.token()) {
            if precedence <= min_precedence {
                break;
            }
            let operator = self.token();
            self.next_token();
            if operator == SyntaxKind::AsKeyword {
                let type_node = self.parse_type();
                left = self.arena.add_wrapped_expr(
                    SyntaxKind::AsExpression,
                    pos,
                    self.prev_end,
                    WrappedExprData {
                        expression: left,
                        type_node,
                    },
                );
                continue;
            }
            let right = self.parse_binary_expression(precedence);
            left = self.arena.add_binary_expr(
                pos,
                self.prev_end,
                BinaryExprData {
                    left,
                    operator_token: operator,
                    right,
                },
            );
        }
        left
    }

    fn parse_unary_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::ExclamationToken | SyntaxKind::MinusToken | SyntaxKind::PlusToken => {
                let operator = self.token();
                self.next_token();
                let operand = self.parse_unary_expression();
                self.arena.add_unary_expr(
                    pos,
                    self.prev_end,
                    UnaryExprData { operator, operand },
                )
            }
            _ => self.parse_left_hand_side_expression(),
        }
    }

    fn parse_left_hand_side_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let mut expression = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        loop {
            match self.token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_identifier_name(true);
                    expression = self.arena.add_access_expr(
                        pos,
                        self.prev_end,
                        AccessExprData { expression, name },
                    );
                }
                SyntaxKind::OpenParenToken => {
                    let arguments = self.parse_argument_list();
                    expression = self.arena.add_call_expr(
                        SyntaxKind::CallExpression,
                        pos,
                        self.prev_end,
                        CallExprData {
                            expression,
                            arguments,
                        },
                    );
                }
                _ => return expression,
            }
        }
    }

    fn parse_new_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        self.parse_expected(SyntaxKind::NewKeyword);
        let mut expression = self.parse_identifier();
        while self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            let name = self.parse_identifier_name(true);
            expression = self.arena.add_access_expr(
                pos,
                self.prev_end,
                AccessExprData { expression, name },
            );
        }
        let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_argument_list()
        } else {
            NodeList::new()
        };
        self.arena.add_call_expr(
            SyntaxKind::NewExpression,
            pos,
            self.prev_end,
            CallExprData {
                expression,
                arguments,
            },
        )
    }

    fn parse_argument_list(&mut self) -> NodeList {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut arguments = Vec::new();
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            arguments.push(self.parse_assignment_expression());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        NodeList::from_vec(arguments)
    }

    fn parse_literal(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let kind = self.token();
        let text = self.scanner.token_value().to_string();
        let value = if kind == SyntaxKind::NumericLiteral {
            text.parse::<f64>().ok()
        } else {
            None
        };
        self.next_token();
        self.arena
            .add_literal(kind, pos, self.prev_end, LiteralData { text, value })
    }

    fn parse_primary_expression(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::NumericLiteral | SyntaxKind::StringLiteral => self.parse_literal(),
            SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::ThisKeyword
            | SyntaxKind::SuperKeyword => {
                let kind = self.token();
                self.next_token();
                self.arena.add_token(kind, pos, self.prev_end)
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let expression = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena.add_wrapped_expr(
                    SyntaxKind::ParenthesizedExpression,
                    pos,
                    self.prev_end,
                    WrappedExprData {
                        expression,
                        type_node: NodeIndex::NONE,
                    },
                )
            }
            _ if self.is_identifier() => self.parse_identifier(),
            _ => {
                self.error_at_current_token(diagnostic_codes::EXPRESSION_EXPECTED, &[]);
                let index = self.arena.add_identifier(pos, pos, "");
                self.arena
                    .add_node_flags(index, node_flags::THIS_NODE_HAS_ERROR);
                index
            }
        }
    }
}

/// Parse `source_text` as a complete source file in `arena`.
pub fn parse_source(
    arena: &mut NodeArena,
    file_name: &str,
    module_name: &str,
    source_text: &str,
) -> (NodeIndex, Vec<Diagnostic>) {
    let mut parser = ParserState::new(arena, file_name, source_text);
    let root = parser.parse_source_file(module_name);
    (root, parser.take_diagnostics())
}
