//! Thin node headers and the typed data pools backing them.
//!
//! Every node is a 16-byte-ish `Node` header. Kind-specific payload lives in a
//! per-kind pool of `NodeArena`, addressed by `Node::data_index`. Pools shared
//! by several kinds are noted on the data struct.

use super::base::{NodeIndex, NodeList};
use crate::scanner::SyntaxKind;
use serde::Serialize;

/// Node header: kind, flags, source span and payload index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: SyntaxKind,
    pub flags: u16,
    pub pos: u32,
    pub end: u32,
    /// Index into the kind's data pool, `u32::MAX` for token nodes.
    pub data_index: u32,
}

impl Node {
    pub const NO_DATA: u32 = u32::MAX;

    #[inline]
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index: Self::NO_DATA,
        }
    }

    #[inline]
    pub fn with_data(kind: SyntaxKind, pos: u32, end: u32, data_index: u32) -> Node {
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

    #[inline]
    pub fn has_flag(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }
}

/// Per-node side data that is not part of the thin header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExtendedNodeInfo {
    pub parent: NodeIndex,
    pub modifier_flags: u32,
}

impl Default for ExtendedNodeInfo {
    fn default() -> Self {
        ExtendedNodeInfo {
            parent: NodeIndex::NONE,
            modifier_flags: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IdentifierData {
    pub escaped_text: String,
}

/// String and numeric literals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LiteralData {
    pub text: String,
    /// Parsed value for numeric literals.
    pub value: Option<f64>,
}

/// Binary operators, assignment included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BinaryExprData {
    pub left: NodeIndex,
    pub operator_token: SyntaxKind,
    pub right: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnaryExprData {
    pub operator: SyntaxKind,
    pub operand: NodeIndex,
}

/// Shared by `CallExpression` and `NewExpression`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CallExprData {
    pub expression: NodeIndex,
    pub arguments: NodeList,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AccessExprData {
    pub expression: NodeIndex,
    pub name: NodeIndex,
}

/// Shared by `ParenthesizedExpression` (no type) and `AsExpression`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WrappedExprData {
    pub expression: NodeIndex,
    pub type_node: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockData {
    pub statements: NodeList,
}

/// `VariableStatement`; `let`/`const` live in the node flags.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariableData {
    pub declarations: NodeList,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariableDeclarationData {
    pub name: NodeIndex,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Shared by `ExpressionStatement` and `ReturnStatement` (bare return has no expression).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExprStatementData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IfStatementData {
    pub expression: NodeIndex,
    pub then_statement: NodeIndex,
    pub else_statement: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassData {
    pub name: NodeIndex,
    /// `TypeReference` of the `extends` clause.
    pub heritage: NodeIndex,
    pub members: NodeList,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropertyDeclData {
    pub name: NodeIndex,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Shared by functions, methods, constructors and static blocks.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionData {
    pub name: NodeIndex,
    pub parameters: NodeList,
    pub type_annotation: NodeIndex,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterData {
    pub name: NodeIndex,
    pub type_annotation: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportDeclData {
    /// `ImportSpecifier`s, or a single `NamespaceImport`.
    pub specifiers: NodeList,
    pub module_specifier: NodeIndex,
}

/// `ImportSpecifier` (`a as b`) and `NamespaceImport` (`* as M`, no property name).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpecifierData {
    pub property_name: NodeIndex,
    pub name: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeRefData {
    pub type_name: NodeIndex,
    /// Mangled binary name when the reference was synthesized from debug info.
    pub binary_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArrayTypeData {
    pub element_type: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceFileData {
    pub file_name: String,
    pub module_name: String,
    pub statements: NodeList,
}

/// Session-wide node storage.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
    pub extended_info: Vec<ExtendedNodeInfo>,
    pub identifiers: Vec<IdentifierData>,
    pub literals: Vec<LiteralData>,
    pub binary_exprs: Vec<BinaryExprData>,
    pub unary_exprs: Vec<UnaryExprData>,
    pub call_exprs: Vec<CallExprData>,
    pub access_exprs: Vec<AccessExprData>,
    pub wrapped_exprs: Vec<WrappedExprData>,
    pub blocks: Vec<BlockData>,
    pub variables: Vec<VariableData>,
    pub variable_declarations: Vec<VariableDeclarationData>,
    pub expr_statements: Vec<ExprStatementData>,
    pub if_statements: Vec<IfStatementData>,
    pub classes: Vec<ClassData>,
    pub property_decls: Vec<PropertyDeclData>,
    pub functions: Vec<FunctionData>,
    pub parameters: Vec<ParameterData>,
    pub import_decls: Vec<ImportDeclData>,
    pub specifiers: Vec<SpecifierData>,
    pub type_refs: Vec<TypeRefData>,
    pub array_types: Vec<ArrayTypeData>,
    pub source_files: Vec<SourceFileData>,
}
