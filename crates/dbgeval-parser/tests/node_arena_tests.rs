//! Tests for node construction and list mutation on `NodeArena`.

use dbgeval_parser::SyntaxKind;
use dbgeval_parser::parser::node::{BlockData, CallExprData, ExprStatementData, LiteralData};
use dbgeval_parser::parser::printer::print_node;
use dbgeval_parser::parser::{NodeArena, NodeIndex, NodeList, node_flags};

fn return_statement(arena: &mut NodeArena, value: &str) -> NodeIndex {
    let literal = arena.add_literal(
        SyntaxKind::NumericLiteral,
        10,
        11,
        LiteralData {
            text: value.to_string(),
            value: value.parse().ok(),
        },
    );
    arena.add_expr_statement(
        SyntaxKind::ReturnStatement,
        3,
        12,
        ExprStatementData {
            expression: literal,
        },
    )
}

#[test]
fn test_node_index_sentinel() {
    let index = NodeIndex(0);
    assert!(index.is_some());
    assert!(!index.is_none());
    assert!(NodeIndex::NONE.is_none());
    assert_eq!(NodeIndex::default(), NodeIndex::NONE);
    assert_eq!(NodeIndex::NONE.into_option(), None);
}

#[test]
fn test_add_sets_parent_pointers() {
    let mut arena = NodeArena::new();
    let callee = arena.add_identifier(0, 1, "f");
    let arg = arena.add_identifier(2, 3, "x");
    let call = arena.add_call_expr(
        SyntaxKind::CallExpression,
        0,
        4,
        CallExprData {
            expression: callee,
            arguments: NodeList::from_vec(vec![arg]),
        },
    );
    assert_eq!(arena.parent_of(callee), call);
    assert_eq!(arena.parent_of(arg), call);
    assert!(arena.parent_of(call).is_none());
    assert_eq!(arena.children(call), vec![callee, arg]);
}

#[test]
fn test_typed_getter_rejects_wrong_kind() {
    let mut arena = NodeArena::new();
    let ident = arena.add_identifier(0, 1, "a");
    let node = *arena.get(ident).expect("identifier");
    assert!(arena.get_identifier(&node).is_some());
    assert!(arena.get_literal(&node).is_none());
    assert!(arena.get_class(&node).is_none());
    assert!(arena.get_block_mut(ident).is_none());
}

#[test]
fn test_insert_block_statements_keeps_order() {
    let mut arena = NodeArena::new();
    let body = return_statement(&mut arena, "1");
    let block = arena.add_block(
        0,
        20,
        BlockData {
            statements: NodeList::from_vec(vec![body]),
        },
    );
    let first = return_statement(&mut arena, "0");
    let second = return_statement(&mut arena, "2");
    let last = return_statement(&mut arena, "3");

    assert!(arena.insert_block_statements(block, &[first, second], &[last]));

    let statements = arena
        .get_block(arena.get(block).expect("block"))
        .expect("block data")
        .statements
        .nodes
        .clone();
    assert_eq!(statements, vec![first, second, body, last]);
    assert!(statements.iter().all(|&s| arena.parent_of(s) == block));
}

#[test]
fn test_insert_block_statements_on_non_block_fails() {
    let mut arena = NodeArena::new();
    let ident = arena.add_identifier(0, 1, "a");
    assert!(!arena.insert_block_statements(ident, &[], &[]));
}

#[test]
fn test_strip_positions_marks_subtree() {
    let mut arena = NodeArena::new();
    let statement = return_statement(&mut arena, "7");
    arena.strip_positions(statement);
    for index in [statement, arena.children(statement)[0]] {
        let node = arena.get(index).expect("node");
        assert_eq!((node.pos, node.end), (0, 0));
        assert!(node.has_flag(node_flags::SYNTHESIZED));
    }
    assert_eq!(print_node(&arena, statement), "return 7;");
}

#[test]
fn test_synthesized_type_ref_keeps_binary_name() {
    let mut arena = NodeArena::new();
    let type_ref = arena.synthesized_type_ref("Foo", Some("Lapp/Foo;".to_string()));
    let data = arena
        .get_type_ref(arena.get(type_ref).expect("type ref"))
        .expect("type ref data");
    assert_eq!(data.binary_name.as_deref(), Some("Lapp/Foo;"));
    assert_eq!(arena.identifier_text(data.type_name), Some("Foo"));
    assert!(arena.is_in_type_position(data.type_name));
}
