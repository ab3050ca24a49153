//! Diagnostic emission and type display.

use crate::context::CompilerContext;
use crate::types::{TypeId, TypeKey};
use dbgeval_common::diagnostics::{Diagnostic, diagnostic_codes, format_message, get_message_template};
use dbgeval_parser::NodeIndex;
use tracing::trace;

impl CompilerContext {
    // =========================================================================
    // Fundamental Error Emitters
    // =========================================================================

    /// Report an error at a specific node. Reported once per (node, code).
    pub(crate) fn error_at_node(&mut self, node_idx: NodeIndex, message: &str, code: u32) {
        if !self.reported.insert((node_idx.0, code)) {
            return;
        }
        let (start, length) = self
            .arena
            .get(node_idx)
            .map_or((0, 0), |node| (node.pos, node.end.saturating_sub(node.pos)));
        let file = self.file_of_node(node_idx);
        trace!(code, node = node_idx.0, file = %file, message, "checker diagnostic");
        self.diagnostics
            .push(Diagnostic::error(file, start, length, message.to_string(), code));
    }

    /// Emit a templated diagnostic error at a node.
    pub(crate) fn error_at_node_msg(&mut self, node_idx: NodeIndex, code: u32, args: &[&str]) {
        let template = get_message_template(code).unwrap_or("Unexpected checker diagnostic code.");
        let message = format_message(template, args);
        self.error_at_node(node_idx, &message, code);
    }

    // =========================================================================
    // Specific Reports
    // =========================================================================

    pub(crate) fn report_not_assignable(&mut self, node_idx: NodeIndex, source: TypeId, target: TypeId) {
        let source = self.type_to_string(source);
        let target = self.type_to_string(target);
        self.error_at_node_msg(
            node_idx,
            diagnostic_codes::TYPE_NOT_ASSIGNABLE,
            &[&source, &target],
        );
    }

    pub(crate) fn report_cannot_find_name(&mut self, node_idx: NodeIndex, name: &str) {
        self.error_at_node_msg(node_idx, diagnostic_codes::CANNOT_FIND_NAME, &[name]);
    }

    pub(crate) fn report_property_missing(&mut self, node_idx: NodeIndex, name: &str, on: TypeId) {
        let on = self.type_to_string(on);
        self.error_at_node_msg(
            node_idx,
            diagnostic_codes::PROPERTY_DOES_NOT_EXIST,
            &[name, &on],
        );
    }

    pub(crate) fn report_operator(&mut self, node_idx: NodeIndex, operator: &str, left: TypeId, right: TypeId) {
        let left = self.type_to_string(left);
        let right = self.type_to_string(right);
        self.error_at_node_msg(
            node_idx,
            diagnostic_codes::OPERATOR_CANNOT_BE_APPLIED,
            &[operator, &left, &right],
        );
    }

    // =========================================================================
    // Type Display
    // =========================================================================

    /// Render a type the way it is written in source.
    pub fn type_to_string(&self, id: TypeId) -> String {
        let Some(key) = self.types.lookup(id) else {
            return "error".to_string();
        };
        match key {
            TypeKey::Intrinsic(name) => match id {
                TypeId::DOUBLE => "number".to_string(),
                _ => (*name).to_string(),
            },
            TypeKey::Class(symbol) => self.symbol_name(*symbol),
            TypeKey::ClassObject(symbol) => format!("typeof {}", self.symbol_name(*symbol)),
            TypeKey::Array(element) => format!("{}[]", self.type_to_string(*element)),
            TypeKey::Function(symbol) => format!("function {}", self.symbol_name(*symbol)),
            TypeKey::Namespace(symbol) => format!("typeof import({})", self.symbol_name(*symbol)),
            TypeKey::Method { class, name, .. } => {
                format!("{}.{}", self.symbol_name(*class), name)
            }
        }
    }

    fn symbol_name(&self, symbol: dbgeval_binder::SymbolId) -> String {
        self.binder
            .get_symbol(symbol)
            .map_or_else(|| "?".to_string(), |s| s.escaped_name.clone())
    }
}
