//! NodeArena access methods.
//!
//! Typed getters check the node kind before indexing a pool, so a getter on
//! the wrong kind returns `None` rather than unrelated data.

use super::base::NodeIndex;
use super::node::*;
use crate::scanner::SyntaxKind;

macro_rules! typed_getters {
    ($($(#[$meta:meta])* $get:ident, $get_mut:ident => $pool:ident: $data:ty [$($kind:ident)|+];)+) => {
        $(
            $(#[$meta])*
            #[inline]
            pub fn $get(&self, node: &Node) -> Option<&$data> {
                if node.has_data() && matches!(node.kind, $(SyntaxKind::$kind)|+) {
                    self.$pool.get(node.data_index as usize)
                } else {
                    None
                }
            }

            #[inline]
            pub fn $get_mut(&mut self, index: NodeIndex) -> Option<&mut $data> {
                let node = *self.get(index)?;
                if node.has_data() && matches!(node.kind, $(SyntaxKind::$kind)|+) {
                    self.$pool.get_mut(node.data_index as usize)
                } else {
                    None
                }
            }
        )+
    };
}

impl NodeArena {
    /// Get a thin node by index
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Get a mutable thin node by index
    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Get extended info for a node
    #[inline]
    pub fn get_extended(&self, index: NodeIndex) -> Option<&ExtendedNodeInfo> {
        if index.is_none() {
            None
        } else {
            self.extended_info.get(index.0 as usize)
        }
    }

    /// Get mutable extended info for a node
    #[inline]
    pub fn get_extended_mut(&mut self, index: NodeIndex) -> Option<&mut ExtendedNodeInfo> {
        if index.is_none() {
            None
        } else {
            self.extended_info.get_mut(index.0 as usize)
        }
    }

    #[inline]
    pub fn kind(&self, index: NodeIndex) -> Option<SyntaxKind> {
        self.get(index).map(|node| node.kind)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    typed_getters! {
        get_identifier, get_identifier_mut => identifiers: IdentifierData [Identifier];
        get_literal, get_literal_mut => literals: LiteralData [StringLiteral | NumericLiteral];
        get_binary_expr, get_binary_expr_mut => binary_exprs: BinaryExprData [BinaryExpression];
        get_unary_expr, get_unary_expr_mut => unary_exprs: UnaryExprData [PrefixUnaryExpression];
        /// Call and `new` expressions.
        get_call_expr, get_call_expr_mut => call_exprs: CallExprData [CallExpression | NewExpression];
        get_access_expr, get_access_expr_mut => access_exprs: AccessExprData [PropertyAccessExpression];
        /// Parenthesized and `as` expressions.
        get_wrapped_expr, get_wrapped_expr_mut => wrapped_exprs: WrappedExprData [ParenthesizedExpression | AsExpression];
        get_block, get_block_mut => blocks: BlockData [Block];
        get_variable, get_variable_mut => variables: VariableData [VariableStatement];
        get_variable_declaration, get_variable_declaration_mut => variable_declarations: VariableDeclarationData [VariableDeclaration];
        /// Expression and return statements.
        get_expr_statement, get_expr_statement_mut => expr_statements: ExprStatementData [ExpressionStatement | ReturnStatement];
        get_if_statement, get_if_statement_mut => if_statements: IfStatementData [IfStatement];
        get_class, get_class_mut => classes: ClassData [ClassDeclaration];
        get_property_decl, get_property_decl_mut => property_decls: PropertyDeclData [PropertyDeclaration];
        /// Functions, methods, constructors and static blocks.
        get_function, get_function_mut => functions: FunctionData [FunctionDeclaration | MethodDeclaration | Constructor | ClassStaticBlockDeclaration];
        get_parameter, get_parameter_mut => parameters: ParameterData [Parameter];
        get_import_decl, get_import_decl_mut => import_decls: ImportDeclData [ImportDeclaration];
        get_specifier, get_specifier_mut => specifiers: SpecifierData [ImportSpecifier | NamespaceImport];
        get_type_ref, get_type_ref_mut => type_refs: TypeRefData [TypeReference];
        get_array_type, get_array_type_mut => array_types: ArrayTypeData [ArrayType];
        get_source_file, get_source_file_mut => source_files: SourceFileData [SourceFile];
    }

    /// Text of an identifier node.
    #[inline]
    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        self.get_identifier(node).map(|data| data.escaped_text.as_str())
    }

    /// Declared name of a declaration node (class, function, member, variable, parameter).
    pub fn declaration_name(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        let name = match node.kind {
            SyntaxKind::ClassDeclaration => self.get_class(node)?.name,
            SyntaxKind::FunctionDeclaration | SyntaxKind::MethodDeclaration => {
                self.get_function(node)?.name
            }
            SyntaxKind::PropertyDeclaration => self.get_property_decl(node)?.name,
            SyntaxKind::VariableDeclaration => self.get_variable_declaration(node)?.name,
            SyntaxKind::Parameter => self.get_parameter(node)?.name,
            SyntaxKind::ImportSpecifier | SyntaxKind::NamespaceImport => {
                self.get_specifier(node)?.name
            }
            SyntaxKind::Constructor => return Some("constructor"),
            _ => return None,
        };
        self.identifier_text(name)
    }

    /// Parent pointer, `NONE` for roots.
    #[inline]
    pub fn parent_of(&self, index: NodeIndex) -> NodeIndex {
        self.get_extended(index)
            .map_or(NodeIndex::NONE, |info| info.parent)
    }

    #[inline]
    pub fn modifier_flags(&self, index: NodeIndex) -> u32 {
        self.get_extended(index)
            .map_or(0, |info| info.modifier_flags)
    }

    #[inline]
    pub fn has_modifier(&self, index: NodeIndex, flag: u32) -> bool {
        self.modifier_flags(index) & flag != 0
    }

    /// Walk parents until a node of `kind` is found (the start node included).
    pub fn find_ancestor(&self, index: NodeIndex, kind: SyntaxKind) -> Option<NodeIndex> {
        let mut current = index;
        let mut iterations = 0usize;
        while current.is_some() {
            iterations += 1;
            if iterations > dbgeval_common::limits::MAX_SCOPE_WALK_ITERATIONS {
                return None;
            }
            if self.kind(current)? == kind {
                return Some(current);
            }
            current = self.parent_of(current);
        }
        None
    }

    /// The source file a node belongs to.
    pub fn source_file_of(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.find_ancestor(index, SyntaxKind::SourceFile)
    }

    /// Direct children in source order.
    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let Some(node) = self.get(index) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut push = |child: NodeIndex| {
            if child.is_some() {
                out.push(child);
            }
        };
        match node.kind {
            SyntaxKind::SourceFile => {
                if let Some(data) = self.get_source_file(node) {
                    data.statements.iter().for_each(&mut push);
                }
            }
            SyntaxKind::Block => {
                if let Some(data) = self.get_block(node) {
                    data.statements.iter().for_each(&mut push);
                }
            }
            SyntaxKind::VariableStatement => {
                if let Some(data) = self.get_variable(node) {
                    data.declarations.iter().for_each(&mut push);
                }
            }
            SyntaxKind::VariableDeclaration => {
                if let Some(data) = self.get_variable_declaration(node) {
                    push(data.name);
                    push(data.type_annotation);
                    push(data.initializer);
                }
            }
            SyntaxKind::ExpressionStatement | SyntaxKind::ReturnStatement => {
                if let Some(data) = self.get_expr_statement(node) {
                    push(data.expression);
                }
            }
            SyntaxKind::IfStatement => {
                if let Some(data) = self.get_if_statement(node) {
                    push(data.expression);
                    push(data.then_statement);
                    push(data.else_statement);
                }
            }
            SyntaxKind::ClassDeclaration => {
                if let Some(data) = self.get_class(node) {
                    push(data.name);
                    push(data.heritage);
                    data.members.iter().for_each(&mut push);
                }
            }
            SyntaxKind::PropertyDeclaration => {
                if let Some(data) = self.get_property_decl(node) {
                    push(data.name);
                    push(data.type_annotation);
                    push(data.initializer);
                }
            }
            SyntaxKind::FunctionDeclaration
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::Constructor
            | SyntaxKind::ClassStaticBlockDeclaration => {
                if let Some(data) = self.get_function(node) {
                    push(data.name);
                    data.parameters.iter().for_each(&mut push);
                    push(data.type_annotation);
                    push(data.body);
                }
            }
            SyntaxKind::Parameter => {
                if let Some(data) = self.get_parameter(node) {
                    push(data.name);
                    push(data.type_annotation);
                }
            }
            SyntaxKind::ImportDeclaration => {
                if let Some(data) = self.get_import_decl(node) {
                    data.specifiers.iter().for_each(&mut push);
                    push(data.module_specifier);
                }
            }
            SyntaxKind::ImportSpecifier | SyntaxKind::NamespaceImport => {
                if let Some(data) = self.get_specifier(node) {
                    push(data.property_name);
                    push(data.name);
                }
            }
            SyntaxKind::BinaryExpression => {
                if let Some(data) = self.get_binary_expr(node) {
                    push(data.left);
                    push(data.right);
                }
            }
            SyntaxKind::PrefixUnaryExpression => {
                if let Some(data) = self.get_unary_expr(node) {
                    push(data.operand);
                }
            }
            SyntaxKind::CallExpression | SyntaxKind::NewExpression => {
                if let Some(data) = self.get_call_expr(node) {
                    push(data.expression);
                    data.arguments.iter().for_each(&mut push);
                }
            }
            SyntaxKind::PropertyAccessExpression => {
                if let Some(data) = self.get_access_expr(node) {
                    push(data.expression);
                    push(data.name);
                }
            }
            SyntaxKind::ParenthesizedExpression | SyntaxKind::AsExpression => {
                if let Some(data) = self.get_wrapped_expr(node) {
                    push(data.expression);
                    push(data.type_node);
                }
            }
            SyntaxKind::TypeReference => {
                if let Some(data) = self.get_type_ref(node) {
                    push(data.type_name);
                }
            }
            SyntaxKind::ArrayType => {
                if let Some(data) = self.get_array_type(node) {
                    push(data.element_type);
                }
            }
            _ => {}
        }
        out
    }

    /// Whether `index` lies in a type position (annotation, cast target, heritage).
    pub fn is_in_type_position(&self, index: NodeIndex) -> bool {
        matches!(
            self.kind(self.parent_of(index)),
            Some(SyntaxKind::TypeReference)
        )
    }

    /// Whether `index` is the name slot of a property access (`x.name`).
    pub fn is_property_name(&self, index: NodeIndex) -> bool {
        let parent = self.parent_of(index);
        self.get(parent)
            .and_then(|node| self.get_access_expr(node))
            .is_some_and(|data| data.name == index)
    }
}
