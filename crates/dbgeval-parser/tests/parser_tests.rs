//! Tests for the snippet parser and printer.

use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_parser::parser::printer::print_node;
use dbgeval_parser::parser::{NodeArena, NodeIndex, ParserState, modifier_flags, node_flags};
use dbgeval_parser::{SyntaxKind, parse_source};

fn parse(text: &str) -> (NodeArena, NodeIndex) {
    let mut arena = NodeArena::new();
    let (root, diagnostics) = parse_source(&mut arena, "test.ets", "test", text);
    assert!(
        diagnostics.is_empty(),
        "unexpected parse diagnostics: {diagnostics:?}"
    );
    (arena, root)
}

fn first_statement(arena: &NodeArena, root: NodeIndex) -> NodeIndex {
    let node = arena.get(root).expect("root node");
    arena.get_source_file(node).expect("source file").statements.nodes[0]
}

#[test]
fn test_source_file_records_module_name() {
    let (arena, root) = parse("let x: int = 1;");
    let node = arena.get(root).expect("root node");
    let data = arena.get_source_file(node).expect("source file");
    assert_eq!(data.module_name, "test");
    assert_eq!(data.file_name, "test.ets");
    assert_eq!(data.statements.len(), 1);
}

#[test]
fn test_class_round_trips_through_printer() {
    let source = "export declare abstract class B extends A { x: number; static count: int; \
                  get(): number { return this.x; } constructor() { super(); } }";
    let (arena, root) = parse(source);
    let class = first_statement(&arena, root);
    assert_eq!(
        arena.modifier_flags(class),
        modifier_flags::EXPORT | modifier_flags::DECLARE | modifier_flags::ABSTRACT
    );
    let expected = "export declare abstract class B extends A {\n    x: number;\n    static count: int;\n    get(): number {\n        return this.x;\n    }\n    constructor() {\n        super();\n    }\n}";
    assert_eq!(print_node(&arena, class), expected);
}

#[test]
fn test_static_block_is_not_a_modifier() {
    let (arena, root) = parse("class C { static { return; } static x: int; }");
    let class = first_statement(&arena, root);
    let node = arena.get(class).expect("class");
    let members = arena.get_class(node).expect("class data").members.nodes.clone();
    assert_eq!(
        arena.kind(members[0]),
        Some(SyntaxKind::ClassStaticBlockDeclaration)
    );
    assert_eq!(arena.kind(members[1]), Some(SyntaxKind::PropertyDeclaration));
    assert!(arena.has_modifier(members[1], modifier_flags::STATIC));
}

#[test]
fn test_binary_precedence() {
    let (arena, root) = parse("a + b * c;");
    let statement = first_statement(&arena, root);
    let expr = arena
        .get_expr_statement(arena.get(statement).expect("statement"))
        .expect("expression statement")
        .expression;
    let data = arena
        .get_binary_expr(arena.get(expr).expect("binary"))
        .expect("binary data");
    assert_eq!(data.operator_token, SyntaxKind::PlusToken);
    assert_eq!(arena.kind(data.right), Some(SyntaxKind::BinaryExpression));
    assert_eq!(print_node(&arena, expr), "a + b * c");
}

#[test]
fn test_as_expression_wraps_call() {
    let (arena, root) = parse("let v: int = DebuggerAPI.getLocalInt(0) as int;");
    let statement = first_statement(&arena, root);
    let node = arena.get(statement).expect("statement");
    assert!(node.has_flag(node_flags::LET));
    let declaration = arena.get_variable(node).expect("variable").declarations.nodes[0];
    let initializer = arena
        .get_variable_declaration(arena.get(declaration).expect("declaration"))
        .expect("declaration data")
        .initializer;
    assert_eq!(arena.kind(initializer), Some(SyntaxKind::AsExpression));
    let wrapped = arena
        .get_wrapped_expr(arena.get(initializer).expect("as"))
        .expect("as data");
    assert_eq!(arena.kind(wrapped.expression), Some(SyntaxKind::CallExpression));
    assert_eq!(arena.kind(wrapped.type_node), Some(SyntaxKind::IntKeyword));
}

#[test]
fn test_new_and_member_access() {
    let (arena, root) = parse("new B().x + new B().get();");
    let statement = first_statement(&arena, root);
    assert_eq!(print_node(&arena, statement), "new B().x + new B().get();");
}

#[test]
fn test_imports() {
    let (arena, root) = parse("import { a as b, c } from \"m\";\nimport * as M from \"n\";");
    let node = arena.get(root).expect("root");
    let statements = arena.get_source_file(node).expect("file").statements.nodes.clone();
    assert_eq!(
        print_node(&arena, statements[0]),
        "import { a as b, c } from \"m\";"
    );
    assert_eq!(print_node(&arena, statements[1]), "import * as M from \"n\";");
}

#[test]
fn test_parent_pointers() {
    let (arena, root) = parse("class C { m(): int { return 1; } }");
    let class = first_statement(&arena, root);
    assert_eq!(arena.parent_of(class), root);
    let members = arena
        .get_class(arena.get(class).expect("class"))
        .expect("class data")
        .members
        .nodes
        .clone();
    let body = arena
        .get_function(arena.get(members[0]).expect("method"))
        .expect("method data")
        .body;
    assert_eq!(arena.parent_of(body), members[0]);
    let ret = arena
        .get_block(arena.get(body).expect("body"))
        .expect("block")
        .statements
        .nodes[0];
    assert_eq!(arena.parent_of(ret), body);
    assert_eq!(arena.source_file_of(ret), Some(root));
    assert_eq!(arena.find_ancestor(ret, SyntaxKind::ClassDeclaration), Some(class));
}

#[test]
fn test_function_overload_without_body() {
    let (arena, root) = parse("export declare function f(arg0: int): int;");
    let function = first_statement(&arena, root);
    let data = arena
        .get_function(arena.get(function).expect("function"))
        .expect("function data");
    assert!(data.body.is_none());
    assert_eq!(data.parameters.len(), 1);
    assert_eq!(
        print_node(&arena, function),
        "export declare function f(arg0: int): int;"
    );
}

#[test]
fn test_missing_identifier_reports_diagnostic() {
    let mut arena = NodeArena::new();
    let (_, diagnostics) = parse_source(&mut arena, "bad.ets", "bad", "let = 5;");
    assert_eq!(diagnostics.len(), 1, "got {diagnostics:?}");
    assert_eq!(diagnostics[0].code, diagnostic_codes::IDENTIFIER_EXPECTED);
    assert_eq!(diagnostics[0].file, "bad.ets");
}

#[test]
fn test_unterminated_string_reports_diagnostic() {
    let mut arena = NodeArena::new();
    let (_, diagnostics) = parse_source(&mut arena, "bad.ets", "bad", "let s = \"abc");
    assert!(
        diagnostics
            .iter()
            .any(|d| d.code == diagnostic_codes::UNTERMINATED_STRING_LITERAL),
        "got {diagnostics:?}"
    );
}

#[test]
fn test_garbage_terminates() {
    let mut arena = NodeArena::new();
    let (_, diagnostics) = parse_source(&mut arena, "bad.ets", "bad", ") ] } # @");
    assert!(!diagnostics.is_empty());
}

#[test]
fn test_statement_list_snippet() {
    let mut arena = NodeArena::new();
    let mut parser = ParserState::new(&mut arena, "snippet", "x = 1; if (x > 0) { return; } else return;");
    let statements = parser.parse_statement_list();
    assert!(parser.diagnostics().is_empty());
    assert_eq!(statements.len(), 2);
    assert_eq!(arena.kind(statements.nodes[1]), Some(SyntaxKind::IfStatement));
}
