//! Identifier reference resolution over a subtree.

use dbgeval_parser::parser::node::NodeArena;
use dbgeval_parser::{NodeIndex, SyntaxKind};
use tracing::{debug, trace};

use super::state::BinderState;

impl BinderState {
    /// Resolve every identifier reference under `root` against the scope chain
    /// and record the hits. Returns the references that did not resolve, in
    /// source order; callers decide whether a miss is an error.
    pub fn resolve_references(&mut self, arena: &NodeArena, root: NodeIndex) -> Vec<NodeIndex> {
        let mut unresolved = Vec::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let Some(node) = arena.get(idx) else {
                continue;
            };
            if node.kind == SyntaxKind::Identifier {
                if self.resolved_references.contains_key(&idx.0)
                    || !is_reference_position(arena, idx)
                {
                    continue;
                }
                let Some(name) = arena.identifier_text(idx) else {
                    continue;
                };
                if name.is_empty() {
                    continue;
                }
                match self.resolve_name(arena, idx, name) {
                    Some(symbol) => {
                        trace!(name, node = idx.0, symbol = symbol.0, "resolved reference");
                        self.resolved_references.insert(idx.0, symbol);
                    }
                    None => unresolved.push(idx),
                }
                continue;
            }
            let mut children = arena.children(idx);
            children.reverse();
            stack.extend(children);
        }
        if !unresolved.is_empty() {
            debug!(
                root = root.0,
                unresolved = unresolved.len(),
                "resolve_references left unresolved identifiers"
            );
        }
        unresolved
    }
}

/// Whether an identifier names something to look up, rather than declaring a
/// name or naming a member.
pub fn is_reference_position(arena: &NodeArena, idx: NodeIndex) -> bool {
    let parent = arena.parent_of(idx);
    let Some(parent_node) = arena.get(parent) else {
        return true;
    };
    match parent_node.kind {
        SyntaxKind::PropertyAccessExpression => arena
            .get_access_expr(parent_node)
            .is_none_or(|data| data.name != idx),
        SyntaxKind::ImportSpecifier | SyntaxKind::NamespaceImport => false,
        SyntaxKind::ClassDeclaration
        | SyntaxKind::FunctionDeclaration
        | SyntaxKind::MethodDeclaration
        | SyntaxKind::PropertyDeclaration
        | SyntaxKind::VariableDeclaration
        | SyntaxKind::Parameter => {
            // Only the name slot declares; initializers and types are references.
            let name = match parent_node.kind {
                SyntaxKind::ClassDeclaration => arena.get_class(parent_node).map(|d| d.name),
                SyntaxKind::PropertyDeclaration => {
                    arena.get_property_decl(parent_node).map(|d| d.name)
                }
                SyntaxKind::VariableDeclaration => {
                    arena.get_variable_declaration(parent_node).map(|d| d.name)
                }
                SyntaxKind::Parameter => arena.get_parameter(parent_node).map(|d| d.name),
                _ => arena.get_function(parent_node).map(|d| d.name),
            };
            name != Some(idx)
        }
        _ => true,
    }
}
