//! Declare-once synthesis and cross-program imports.
//!
//! Every synthesized entity is declared in the proxy program of the module
//! that owns it. A program that refers to it from elsewhere gets one import
//! statement, `import { name as alias } from "<owning module>"`, created the
//! first time and reused afterwards.

use crate::check_coordinator::CheckRequest;
use crate::error::EvalError;
use crate::plugin::ScopedDebugInfoPlugin;
use crate::registry::{ImportEntry, ImportOrigin};
use dbgeval_binder::{ProgramId, SymbolId};
use dbgeval_checker::CompilerContext;
use dbgeval_parser::parser::node::{ImportDeclData, LiteralData, SpecifierData};
use dbgeval_parser::{NodeIndex, NodeList, SyntaxKind};
use std::rc::Rc;
use tracing::{debug, trace};

impl ScopedDebugInfoPlugin {
    /// Declare `decl_name` in the proxy program of `decl_path` (unless it is
    /// already there) and make it visible in `importer` as `imported_name`.
    ///
    /// `synthesize` builds the top-level statements for the entity in the
    /// declaring program; several statements (function overloads) merge into
    /// one symbol. Returns the symbol `importer` should bind the name to.
    pub(crate) fn import_global_entity<F>(
        &mut self,
        host: &mut CompilerContext,
        decl_path: &str,
        decl_name: &str,
        importer: ProgramId,
        imported_name: &str,
        synthesize: F,
    ) -> Result<SymbolId, EvalError>
    where
        F: FnOnce(&mut Self, &mut CompilerContext, ProgramId) -> Result<Vec<NodeIndex>, EvalError>,
    {
        host.with_stable_state(|host| {
            let (declaring, symbol) = self.declare_entity(host, decl_path, decl_name, synthesize)?;
            if declaring == importer {
                return Ok(symbol);
            }
            self.import_entity(host, declaring, decl_name, importer, imported_name)
        })
    }

    /// The declaring half of `import_global_entity`.
    pub(crate) fn declare_entity<F>(
        &mut self,
        host: &mut CompilerContext,
        decl_path: &str,
        decl_name: &str,
        synthesize: F,
    ) -> Result<(ProgramId, SymbolId), EvalError>
    where
        F: FnOnce(&mut Self, &mut CompilerContext, ProgramId) -> Result<Vec<NodeIndex>, EvalError>,
    {
        let store = Rc::clone(&self.store);
        let declaring = self.proxies.get_or_create(host, &store, decl_path)?;
        if let Some(symbol) = self.registries.declaration(declaring, decl_name) {
            trace!(name = %decl_name, path = %decl_path, "already declared");
            return Ok((declaring, symbol));
        }

        let statements = synthesize(self, host, declaring)?;
        let mut declared = SymbolId::NONE;
        for &statement in &statements {
            host.arena.strip_positions(statement);
            let symbol = host.append_statement(declaring, statement);
            if declared.is_none() && symbol.is_some() {
                // Registered before any check, so re-entrant lookups find it.
                self.registries
                    .get_or_create(declaring)
                    .insert_declaration(decl_name, symbol)?;
                declared = symbol;
            }
        }
        if declared.is_none() {
            return Err(EvalError::Host(format!(
                "declaration of {decl_name} in {decl_path} bound no symbol"
            )));
        }
        debug!(
            name = %decl_name,
            path = %decl_path,
            program = declaring.0,
            statements = statements.len(),
            "declared entity"
        );
        let scope = host.binder.program_scope(declaring);
        for statement in statements {
            self.check_new_node(
                host,
                CheckRequest {
                    node: statement,
                    scope,
                    parent_class: NodeIndex::NONE,
                    program: declaring,
                },
            )?;
        }
        Ok((declaring, declared))
    }

    /// The importing half: `import { decl_name as imported_name }` from the
    /// declaring program's module into `importer`, once per name. An alias
    /// already bound to a different entity is a fatal conflict.
    pub(crate) fn import_entity(
        &mut self,
        host: &mut CompilerContext,
        declaring: ProgramId,
        decl_name: &str,
        importer: ProgramId,
        imported_name: &str,
    ) -> Result<SymbolId, EvalError> {
        let origin = ImportOrigin {
            program: declaring,
            name: Some(decl_name.to_string()),
        };
        if let Some(existing) = self.registries.import(importer, imported_name) {
            if existing.origin == origin {
                return Ok(existing.symbol);
            }
            return Err(EvalError::DuplicateRegistration {
                name: imported_name.to_string(),
            });
        }
        let module = host
            .binder
            .program(declaring)
            .map(|p| p.module_name.clone())
            .unwrap_or_default();

        let property_name = host.arena.synthesized_identifier(decl_name);
        let name = host.arena.synthesized_identifier(imported_name);
        let specifier = host.arena.add_specifier(
            SyntaxKind::ImportSpecifier,
            0,
            0,
            SpecifierData {
                property_name,
                name,
            },
        );
        let module_specifier = host.arena.add_literal(
            SyntaxKind::StringLiteral,
            0,
            0,
            LiteralData {
                text: module.clone(),
                value: None,
            },
        );
        let import = host.arena.add_import_decl(
            0,
            0,
            ImportDeclData {
                specifiers: NodeList::from_vec(vec![specifier]),
                module_specifier,
            },
        );
        host.arena.strip_positions(import);
        let alias = host.append_statement(importer, import);
        self.registries
            .get_or_create(importer)
            .insert_import(imported_name, ImportEntry { symbol: alias, origin })?;
        self.stats.imports += 1;
        debug!(
            name = %decl_name,
            alias = %imported_name,
            %module,
            importer = importer.0,
            "imported entity"
        );
        let scope = host.binder.program_scope(importer);
        self.check_new_node(
            host,
            CheckRequest {
                node: import,
                scope,
                parent_class: NodeIndex::NONE,
                program: importer,
            },
        )?;
        Ok(alias)
    }

    /// Whether `name` was synthesized into `program` itself. Import aliases
    /// do not count.
    pub fn is_entity_declared(&self, program: ProgramId, name: &str) -> bool {
        self.registries.is_declared(program, name)
    }

    /// Whether `program` imports something under `alias`.
    pub fn is_entity_imported(&self, program: ProgramId, alias: &str) -> bool {
        self.registries.is_imported(program, alias)
    }
}
