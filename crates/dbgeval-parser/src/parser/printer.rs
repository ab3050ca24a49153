//! Source printer for arena nodes.
//!
//! Output is single-spaced and normalized; it is used to inspect synthesized
//! declarations in logs and tests, not to round-trip user formatting.

use super::base::NodeIndex;
use super::flags::{modifier_flags, node_flags};
use super::node::NodeArena;
use crate::scanner::SyntaxKind;

pub struct Printer<'a> {
    arena: &'a NodeArena,
    out: String,
    indent: usize,
}

/// Print a node (statement, declaration, expression or type) as source text.
pub fn print_node(arena: &NodeArena, index: NodeIndex) -> String {
    let mut printer = Printer::new(arena);
    printer.emit(index);
    printer.out
}

impl<'a> Printer<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        Printer {
            arena,
            out: String::new(),
            indent: 0,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn emit_modifiers(&mut self, index: NodeIndex) {
        let flags = self.arena.modifier_flags(index);
        for (flag, text) in [
            (modifier_flags::EXPORT, "export "),
            (modifier_flags::DECLARE, "declare "),
            (modifier_flags::PUBLIC, "public "),
            (modifier_flags::PRIVATE, "private "),
            (modifier_flags::PROTECTED, "protected "),
            (modifier_flags::ABSTRACT, "abstract "),
            (modifier_flags::STATIC, "static "),
            (modifier_flags::READONLY, "readonly "),
        ] {
            if flags & flag != 0 {
                self.write(text);
            }
        }
    }

    fn emit_list(&mut self, items: &[NodeIndex], separator: &str) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.emit(item);
        }
    }

    fn emit_type_annotation(&mut self, type_annotation: NodeIndex) {
        if type_annotation.is_some() {
            self.write(": ");
            self.emit(type_annotation);
        }
    }

    fn emit_block_body(&mut self, statements: &[NodeIndex]) {
        self.write("{");
        self.indent += 1;
        for &statement in statements {
            self.newline();
            self.emit(statement);
        }
        self.indent -= 1;
        if !statements.is_empty() {
            self.newline();
        }
        self.write("}");
    }

    pub fn emit(&mut self, index: NodeIndex) {
        let arena = self.arena;
        let Some(node) = arena.get(index) else {
            return;
        };
        match node.kind {
            SyntaxKind::Identifier => {
                if let Some(data) = arena.get_identifier(node) {
                    self.write(&data.escaped_text);
                }
            }
            SyntaxKind::NumericLiteral => {
                if let Some(data) = arena.get_literal(node) {
                    self.write(&data.text);
                }
            }
            SyntaxKind::StringLiteral => {
                if let Some(data) = arena.get_literal(node) {
                    self.write("\"");
                    self.write(&data.text.replace('\\', "\\\\").replace('"', "\\\""));
                    self.write("\"");
                }
            }
            SyntaxKind::SourceFile => {
                if let Some(data) = arena.get_source_file(node) {
                    for (i, statement) in data.statements.iter().enumerate() {
                        if i > 0 {
                            self.newline();
                        }
                        self.emit(statement);
                    }
                }
            }
            SyntaxKind::Block => {
                if let Some(data) = arena.get_block(node) {
                    self.emit_block_body(&data.statements.nodes);
                }
            }
            SyntaxKind::VariableStatement => {
                if let Some(data) = arena.get_variable(node) {
                    self.emit_modifiers(index);
                    self.write(if node.has_flag(node_flags::CONST) {
                        "const "
                    } else {
                        "let "
                    });
                    self.emit_list(&data.declarations.nodes, ", ");
                    self.write(";");
                }
            }
            SyntaxKind::VariableDeclaration => {
                if let Some(data) = arena.get_variable_declaration(node) {
                    self.emit(data.name);
                    self.emit_type_annotation(data.type_annotation);
                    if data.initializer.is_some() {
                        self.write(" = ");
                        self.emit(data.initializer);
                    }
                }
            }
            SyntaxKind::ExpressionStatement => {
                if let Some(data) = arena.get_expr_statement(node) {
                    self.emit(data.expression);
                    self.write(";");
                }
            }
            SyntaxKind::ReturnStatement => {
                if let Some(data) = arena.get_expr_statement(node) {
                    self.write("return");
                    if data.expression.is_some() {
                        self.write(" ");
                        self.emit(data.expression);
                    }
                    self.write(";");
                }
            }
            SyntaxKind::IfStatement => {
                if let Some(data) = arena.get_if_statement(node) {
                    self.write("if (");
                    self.emit(data.expression);
                    self.write(") ");
                    self.emit(data.then_statement);
                    if data.else_statement.is_some() {
                        self.write(" else ");
                        self.emit(data.else_statement);
                    }
                }
            }
            SyntaxKind::ClassDeclaration => {
                if let Some(data) = arena.get_class(node) {
                    self.emit_modifiers(index);
                    self.write("class ");
                    self.emit(data.name);
                    if data.heritage.is_some() {
                        self.write(" extends ");
                        self.emit(data.heritage);
                    }
                    self.write(" ");
                    self.emit_block_body(&data.members.nodes);
                }
            }
            SyntaxKind::PropertyDeclaration => {
                if let Some(data) = arena.get_property_decl(node) {
                    self.emit_modifiers(index);
                    self.emit(data.name);
                    self.emit_type_annotation(data.type_annotation);
                    if data.initializer.is_some() {
                        self.write(" = ");
                        self.emit(data.initializer);
                    }
                    self.write(";");
                }
            }
            SyntaxKind::FunctionDeclaration
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::Constructor
            | SyntaxKind::ClassStaticBlockDeclaration => {
                if let Some(data) = arena.get_function(node) {
                    self.emit_modifiers(index);
                    match node.kind {
                        SyntaxKind::FunctionDeclaration => {
                            self.write("function ");
                            self.emit(data.name);
                        }
                        SyntaxKind::Constructor => self.write("constructor"),
                        SyntaxKind::ClassStaticBlockDeclaration => self.write("static "),
                        _ => self.emit(data.name),
                    }
                    if node.kind != SyntaxKind::ClassStaticBlockDeclaration {
                        self.write("(");
                        self.emit_list(&data.parameters.nodes, ", ");
                        self.write(")");
                        self.emit_type_annotation(data.type_annotation);
                    }
                    if data.body.is_some() {
                        if node.kind != SyntaxKind::ClassStaticBlockDeclaration {
                            self.write(" ");
                        }
                        self.emit(data.body);
                    } else {
                        self.write(";");
                    }
                }
            }
            SyntaxKind::Parameter => {
                if let Some(data) = arena.get_parameter(node) {
                    self.emit(data.name);
                    self.emit_type_annotation(data.type_annotation);
                }
            }
            SyntaxKind::ImportDeclaration => {
                if let Some(data) = arena.get_import_decl(node) {
                    self.write("import ");
                    let namespace = data
                        .specifiers
                        .iter()
                        .any(|s| arena.kind(s) == Some(SyntaxKind::NamespaceImport));
                    if namespace {
                        self.emit_list(&data.specifiers.nodes, ", ");
                    } else {
                        self.write("{ ");
                        self.emit_list(&data.specifiers.nodes, ", ");
                        self.write(" }");
                    }
                    self.write(" from ");
                    self.emit(data.module_specifier);
                    self.write(";");
                }
            }
            SyntaxKind::ImportSpecifier => {
                if let Some(data) = arena.get_specifier(node) {
                    if data.property_name.is_some() {
                        self.emit(data.property_name);
                        self.write(" as ");
                    }
                    self.emit(data.name);
                }
            }
            SyntaxKind::NamespaceImport => {
                if let Some(data) = arena.get_specifier(node) {
                    self.write("* as ");
                    self.emit(data.name);
                }
            }
            SyntaxKind::BinaryExpression => {
                if let Some(data) = arena.get_binary_expr(node) {
                    self.emit(data.left);
                    self.write(" ");
                    self.write(data.operator_token.token_text().unwrap_or("?"));
                    self.write(" ");
                    self.emit(data.right);
                }
            }
            SyntaxKind::PrefixUnaryExpression => {
                if let Some(data) = arena.get_unary_expr(node) {
                    self.write(data.operator.token_text().unwrap_or("?"));
                    self.emit(data.operand);
                }
            }
            SyntaxKind::CallExpression | SyntaxKind::NewExpression => {
                if let Some(data) = arena.get_call_expr(node) {
                    if node.kind == SyntaxKind::NewExpression {
                        self.write("new ");
                    }
                    self.emit(data.expression);
                    self.write("(");
                    self.emit_list(&data.arguments.nodes, ", ");
                    self.write(")");
                }
            }
            SyntaxKind::PropertyAccessExpression => {
                if let Some(data) = arena.get_access_expr(node) {
                    self.emit(data.expression);
                    self.write(".");
                    self.emit(data.name);
                }
            }
            SyntaxKind::ParenthesizedExpression => {
                if let Some(data) = arena.get_wrapped_expr(node) {
                    self.write("(");
                    self.emit(data.expression);
                    self.write(")");
                }
            }
            SyntaxKind::AsExpression => {
                if let Some(data) = arena.get_wrapped_expr(node) {
                    self.emit(data.expression);
                    self.write(" as ");
                    self.emit(data.type_node);
                }
            }
            SyntaxKind::TypeReference => {
                if let Some(data) = arena.get_type_ref(node) {
                    self.emit(data.type_name);
                }
            }
            SyntaxKind::ArrayType => {
                if let Some(data) = arena.get_array_type(node) {
                    self.emit(data.element_type);
                    self.write("[]");
                }
            }
            kind => {
                if let Some(text) = kind.token_text() {
                    self.write(text);
                }
            }
        }
    }
}
