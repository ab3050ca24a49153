//! NodeArena creation methods (add_* methods) and list mutation helpers.
//!
//! Nodes are built bottom-up: children exist before their parent, and every
//! `add_*` method points the children's `parent` at the new node.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use crate::scanner::SyntaxKind;

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    // ============================================================================
    // Parent Mapping Helpers
    // ============================================================================

    /// Set the parent for a single child node.
    #[inline]
    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if child.is_some()
            && let Some(info) = self.extended_info.get_mut(child.0 as usize)
        {
            info.parent = parent;
        }
    }

    /// Set the parent for a list of children.
    #[inline]
    fn set_parent_list(&mut self, list: &NodeList, parent: NodeIndex) {
        for &child in &list.nodes {
            self.set_parent(child, parent);
        }
    }

    fn push_node(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        self.extended_info.push(ExtendedNodeInfo::default());
        NodeIndex(index)
    }

    // ============================================================================
    // Node Creation Methods
    // ============================================================================

    /// Add a token node (keywords, `this`, `super`, literals without payload)
    pub fn add_token(&mut self, kind: SyntaxKind, pos: u32, end: u32) -> NodeIndex {
        self.push_node(Node::new(kind, pos, end))
    }

    pub fn add_identifier(&mut self, pos: u32, end: u32, text: impl Into<String>) -> NodeIndex {
        let data_index = self.identifiers.len() as u32;
        self.identifiers.push(IdentifierData {
            escaped_text: text.into(),
        });
        self.push_node(Node::with_data(SyntaxKind::Identifier, pos, end, data_index))
    }

    pub fn add_literal(&mut self, kind: SyntaxKind, pos: u32, end: u32, data: LiteralData) -> NodeIndex {
        let data_index = self.literals.len() as u32;
        self.literals.push(data);
        self.push_node(Node::with_data(kind, pos, end, data_index))
    }

    pub fn add_binary_expr(&mut self, pos: u32, end: u32, data: BinaryExprData) -> NodeIndex {
        let (left, right) = (data.left, data.right);
        let data_index = self.binary_exprs.len() as u32;
        self.binary_exprs.push(data);
        let parent = self.push_node(Node::with_data(
            SyntaxKind::BinaryExpression,
            pos,
            end,
            data_index,
        ));
        self.set_parent(left, parent);
        self.set_parent(right, parent);
        parent
    }

    pub fn add_unary_expr(&mut self, pos: u32, end: u32, data: UnaryExprData) -> NodeIndex {
        let operand = data.operand;
        let data_index = self.unary_exprs.len() as u32;
        self.unary_exprs.push(data);
        let parent = self.push_node(Node::with_data(
            SyntaxKind::PrefixUnaryExpression,
            pos,
            end,
            data_index,
        ));
        self.set_parent(operand, parent);
        parent
    }

    /// Add a call or `new` expression
    pub fn add_call_expr(&mut self, kind: SyntaxKind, pos: u32, end: u32, data: CallExprData) -> NodeIndex {
        let expression = data.expression;
        let arguments = data.arguments.clone();
        let data_index = self.call_exprs.len() as u32;
        self.call_exprs.push(data);
        let parent = self.push_node(Node::with_data(kind, pos, end, data_index));
        self.set_parent(expression, parent);
        self.set_parent_list(&arguments, parent);
        parent
    }

    pub fn add_access_expr(&mut self, pos: u32, end: u32, data: AccessExprData) -> NodeIndex {
        let (expression, name) = (data.expression, data.name);
        let data_index = self.access_exprs.len() as u32;
        self.access_exprs.push(data);
        let parent = self.push_node(Node::with_data(
            SyntaxKind::PropertyAccessExpression,
            pos,
            end,
            data_index,
        ));
        self.set_parent(expression, parent);
        self.set_parent(name, parent);
        parent
    }

    /// Add a parenthesized or `as` expression
    pub fn add_wrapped_expr(&mut self, kind: SyntaxKind, pos: u32, end: u32, data: WrappedExprData) -> NodeIndex {
        let (expression, type_node) = (data.expression, data.type_node);
        let data_index = self.wrapped_exprs.len() as u32;
        self.wrapped_exprs.push(data);
        let parent = self.push_node(Node::with_data(kind, pos, end, data_index));
        self.set_parent(expression, parent);
        self.set_parent(type_node, parent);
        parent
    }

    pub fn add_block(&mut self, pos: u32, end: u32, data: BlockData) -> NodeIndex {
        let statements = data.statements.clone();
        let data_index = self.blocks.len() as u32;
        self.blocks.push(data);
        let parent = self.push_node(Node::with_data(SyntaxKind::Block, pos, end, data_index));
        self.set_parent_list(&statements, parent);
        parent
    }

    /// Add a variable statement; `flags` carries `LET`/`CONST`
    pub fn add_variable(&mut self, pos: u32, end: u32, flags: u16, data: VariableData) -> NodeIndex {
        let declarations = data.declarations.clone();
        let data_index = self.variables.len() as u32;
        self.variables.push(data);
        let mut node = Node::with_data(SyntaxKind::VariableStatement, pos, end, data_index);
        node.flags = flags;
        let parent = self.push_node(node);
        self.set_parent_list(&declarations, parent);
        parent
    }

    pub fn add_variable_declaration(&mut self, pos: u32, end: u32, data: VariableDeclarationData) -> NodeIndex {
        let children = [data.name, data.type_annotation, data.initializer];
        let data_index = self.variable_declarations.len() as u32;
        self.variable_declarations.push(data);
        let parent = self.push_node(Node::with_data(
            SyntaxKind::VariableDeclaration,
            pos,
            end,
            data_index,
        ));
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    /// Add an expression or return statement
    pub fn add_expr_statement(&mut self, kind: SyntaxKind, pos: u32, end: u32, data: ExprStatementData) -> NodeIndex {
        let expression = data.expression;
        let data_index = self.expr_statements.len() as u32;
        self.expr_statements.push(data);
        let parent = self.push_node(Node::with_data(kind, pos, end, data_index));
        self.set_parent(expression, parent);
        parent
    }

    pub fn add_if_statement(&mut self, pos: u32, end: u32, data: IfStatementData) -> NodeIndex {
        let children = [data.expression, data.then_statement, data.else_statement];
        let data_index = self.if_statements.len() as u32;
        self.if_statements.push(data);
        let parent = self.push_node(Node::with_data(SyntaxKind::IfStatement, pos, end, data_index));
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    pub fn add_class(&mut self, pos: u32, end: u32, data: ClassData) -> NodeIndex {
        let (name, heritage) = (data.name, data.heritage);
        let members = data.members.clone();
        let data_index = self.classes.len() as u32;
        self.classes.push(data);
        let parent = self.push_node(Node::with_data(
            SyntaxKind::ClassDeclaration,
            pos,
            end,
            data_index,
        ));
        self.set_parent(name, parent);
        self.set_parent(heritage, parent);
        self.set_parent_list(&members, parent);
        parent
    }

    pub fn add_property_decl(&mut self, pos: u32, end: u32, data: PropertyDeclData) -> NodeIndex {
        let children = [data.name, data.type_annotation, data.initializer];
        let data_index = self.property_decls.len() as u32;
        self.property_decls.push(data);
        let parent = self.push_node(Node::with_data(
            SyntaxKind::PropertyDeclaration,
            pos,
            end,
            data_index,
        ));
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    /// Add a function, method, constructor or static block
    pub fn add_function(&mut self, kind: SyntaxKind, pos: u32, end: u32, data: FunctionData) -> NodeIndex {
        let (name, type_annotation, body) = (data.name, data.type_annotation, data.body);
        let parameters = data.parameters.clone();
        let data_index = self.functions.len() as u32;
        self.functions.push(data);
        let parent = self.push_node(Node::with_data(kind, pos, end, data_index));
        self.set_parent(name, parent);
        self.set_parent_list(&parameters, parent);
        self.set_parent(type_annotation, parent);
        self.set_parent(body, parent);
        parent
    }

    pub fn add_parameter(&mut self, pos: u32, end: u32, data: ParameterData) -> NodeIndex {
        let (name, type_annotation) = (data.name, data.type_annotation);
        let data_index = self.parameters.len() as u32;
        self.parameters.push(data);
        let parent = self.push_node(Node::with_data(SyntaxKind::Parameter, pos, end, data_index));
        self.set_parent(name, parent);
        self.set_parent(type_annotation, parent);
        parent
    }

    pub fn add_import_decl(&mut self, pos: u32, end: u32, data: ImportDeclData) -> NodeIndex {
        let module_specifier = data.module_specifier;
        let specifiers = data.specifiers.clone();
        let data_index = self.import_decls.len() as u32;
        self.import_decls.push(data);
        let parent = self.push_node(Node::with_data(
            SyntaxKind::ImportDeclaration,
            pos,
            end,
            data_index,
        ));
        self.set_parent_list(&specifiers, parent);
        self.set_parent(module_specifier, parent);
        parent
    }

    /// Add an import specifier or namespace import
    pub fn add_specifier(&mut self, kind: SyntaxKind, pos: u32, end: u32, data: SpecifierData) -> NodeIndex {
        let (property_name, name) = (data.property_name, data.name);
        let data_index = self.specifiers.len() as u32;
        self.specifiers.push(data);
        let parent = self.push_node(Node::with_data(kind, pos, end, data_index));
        self.set_parent(property_name, parent);
        self.set_parent(name, parent);
        parent
    }

    pub fn add_type_ref(&mut self, pos: u32, end: u32, data: TypeRefData) -> NodeIndex {
        let type_name = data.type_name;
        let data_index = self.type_refs.len() as u32;
        self.type_refs.push(data);
        let parent = self.push_node(Node::with_data(SyntaxKind::TypeReference, pos, end, data_index));
        self.set_parent(type_name, parent);
        parent
    }

    pub fn add_array_type(&mut self, pos: u32, end: u32, data: ArrayTypeData) -> NodeIndex {
        let element_type = data.element_type;
        let data_index = self.array_types.len() as u32;
        self.array_types.push(data);
        let parent = self.push_node(Node::with_data(SyntaxKind::ArrayType, pos, end, data_index));
        self.set_parent(element_type, parent);
        parent
    }

    pub fn add_source_file(&mut self, pos: u32, end: u32, data: SourceFileData) -> NodeIndex {
        let statements = data.statements.clone();
        let data_index = self.source_files.len() as u32;
        self.source_files.push(data);
        let parent = self.push_node(Node::with_data(SyntaxKind::SourceFile, pos, end, data_index));
        self.set_parent_list(&statements, parent);
        parent
    }

    // ============================================================================
    // Synthesis Conveniences
    // ============================================================================

    /// Identifier with no source span, flagged as synthesized.
    pub fn synthesized_identifier(&mut self, text: impl Into<String>) -> NodeIndex {
        let index = self.add_identifier(0, 0, text);
        self.add_node_flags(index, super::flags::node_flags::SYNTHESIZED);
        index
    }

    /// Type reference to a named class, optionally carrying its binary name.
    pub fn synthesized_type_ref(&mut self, name: &str, binary_name: Option<String>) -> NodeIndex {
        let type_name = self.synthesized_identifier(name);
        self.add_type_ref(
            0,
            0,
            TypeRefData {
                type_name,
                binary_name,
            },
        )
    }

    pub fn add_node_flags(&mut self, index: NodeIndex, flags: u16) {
        if let Some(node) = self.get_mut(index) {
            node.flags |= flags;
        }
    }

    pub fn set_modifier_flags(&mut self, index: NodeIndex, flags: u32) {
        if let Some(info) = self.get_extended_mut(index) {
            info.modifier_flags = flags;
        }
    }

    // ============================================================================
    // List Mutation
    // ============================================================================

    /// Append a top-level statement to a source file or block.
    pub fn push_statement(&mut self, container: NodeIndex, statement: NodeIndex) -> bool {
        let pushed = if let Some(data) = self.get_source_file_mut(container) {
            data.statements.nodes.push(statement);
            true
        } else if let Some(data) = self.get_block_mut(container) {
            data.statements.nodes.push(statement);
            true
        } else {
            false
        };
        if pushed {
            self.set_parent(statement, container);
        }
        pushed
    }

    /// Insert `prologue` before and `epilogue` after the existing statements of a block.
    pub fn insert_block_statements(
        &mut self,
        block: NodeIndex,
        prologue: &[NodeIndex],
        epilogue: &[NodeIndex],
    ) -> bool {
        let Some(data) = self.get_block_mut(block) else {
            return false;
        };
        let existing = std::mem::take(&mut data.statements.nodes);
        let mut statements = Vec::with_capacity(prologue.len() + existing.len() + epilogue.len());
        statements.extend_from_slice(prologue);
        statements.extend(existing);
        statements.extend_from_slice(epilogue);
        data.statements.nodes = statements;
        for &statement in prologue.iter().chain(epilogue) {
            self.set_parent(statement, block);
        }
        true
    }

    pub fn push_class_member(&mut self, class: NodeIndex, member: NodeIndex) -> bool {
        let Some(data) = self.get_class_mut(class) else {
            return false;
        };
        data.members.nodes.push(member);
        self.set_parent(member, class);
        true
    }

    /// Re-point a subtree's root at a new parent (used when attaching detached nodes).
    pub fn reparent(&mut self, child: NodeIndex, parent: NodeIndex) {
        self.set_parent(child, parent);
    }

    /// Zero the source span of a subtree; synthesized code has no real positions.
    pub fn strip_positions(&mut self, root: NodeIndex) {
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            if let Some(node) = self.get_mut(index) {
                node.pos = 0;
                node.end = 0;
                node.flags |= super::flags::node_flags::SYNTHESIZED;
            }
            stack.extend(self.children(index));
        }
    }
}
