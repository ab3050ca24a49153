//! Class member model, computed lazily per class symbol.
//!
//! Resolving a class's member types only resolves the *names* of the types
//! they mention; it never computes those classes' own members. That keeps
//! mutually referencing classes (`A { b: B }`, `B { a: A }`) from recursing.
//! Superclass chains are validated separately in `class_base`.

use crate::context::CompilerContext;
use crate::hook::{CheckAbort, EvalHook};
use crate::types::TypeId;
use dbgeval_binder::{SymbolId, symbol_flags};
use dbgeval_common::diagnostics::diagnostic_codes;
use dbgeval_common::limits::MAX_INHERITANCE_DEPTH;
use dbgeval_parser::parser::modifier_flags;
use dbgeval_parser::{NodeIndex, SyntaxKind};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::rc::Rc;
use tracing::{debug, trace};

/// One call signature of a method, constructor or function.
#[derive(Clone, Debug)]
pub struct SignatureInfo {
    pub declaration: NodeIndex,
    pub parameters: SmallVec<[TypeId; 4]>,
    pub return_type: TypeId,
    pub is_static: bool,
    pub is_abstract: bool,
}

#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub declaration: NodeIndex,
    pub type_id: TypeId,
    pub is_static: bool,
    pub is_readonly: bool,
}

/// Own members of a class, in declaration order.
#[derive(Clone, Debug)]
pub struct ClassInfo {
    pub symbol: SymbolId,
    pub name: String,
    pub declaration: NodeIndex,
    pub base: Option<SymbolId>,
    pub is_abstract: bool,
    pub fields: IndexMap<String, FieldInfo>,
    /// Overloads per method name.
    pub methods: IndexMap<String, Vec<SignatureInfo>>,
    pub constructors: Vec<SignatureInfo>,
}

impl CompilerContext {
    /// Declaration node of a class symbol.
    pub fn class_declaration(&self, symbol: SymbolId) -> Option<NodeIndex> {
        let data = self.binder.get_symbol(symbol)?;
        if !data.has_any_flags(symbol_flags::CLASS) {
            return None;
        }
        let decl = data.value_declaration;
        (self.arena.kind(decl) == Some(SyntaxKind::ClassDeclaration)).then_some(decl)
    }

    // =========================================================================
    // Superclass Chain
    // =========================================================================

    /// Direct superclass of `symbol`. Classes without `extends` derive from
    /// the prelude `Object`. A heritage cycle is reported once and breaks the
    /// chain at the class being resolved.
    pub fn class_base(
        &mut self,
        hook: &mut dyn EvalHook,
        symbol: SymbolId,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        if let Some(&base) = self.class_bases.get(&symbol) {
            return Ok(base);
        }
        if !self.classes_in_progress.insert(symbol) {
            return Ok(None);
        }
        let direct = self.resolve_direct_base(hook, symbol);
        let direct = match direct {
            Ok(direct) => direct,
            Err(abort) => {
                self.classes_in_progress.remove(&symbol);
                return Err(abort);
            }
        };

        // Walk the unvalidated part of the chain looking for `symbol`.
        let mut seen = FxHashSet::default();
        seen.insert(symbol);
        let mut current = direct;
        let mut depth = 0usize;
        let mut cyclic = false;
        while let Some(class) = current {
            depth += 1;
            if !seen.insert(class) || depth > MAX_INHERITANCE_DEPTH {
                cyclic = true;
                break;
            }
            if let Some(&cached) = self.class_bases.get(&class) {
                current = cached;
                continue;
            }
            current = match self.resolve_direct_base(hook, class) {
                Ok(next) => next,
                Err(abort) => {
                    self.classes_in_progress.remove(&symbol);
                    return Err(abort);
                }
            };
        }
        self.classes_in_progress.remove(&symbol);

        let base = if cyclic {
            let name = self
                .binder
                .get_symbol(symbol)
                .map(|s| s.escaped_name.clone())
                .unwrap_or_default();
            let at = self.class_declaration(symbol).unwrap_or(NodeIndex::NONE);
            debug!(class = %name, "circular base class");
            self.error_at_node_msg(at, diagnostic_codes::CIRCULAR_BASE_REFERENCE, &[&name]);
            None
        } else {
            direct
        };
        self.class_bases.insert(symbol, base);
        Ok(base)
    }

    fn resolve_direct_base(
        &mut self,
        hook: &mut dyn EvalHook,
        symbol: SymbolId,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        let Some(decl) = self.class_declaration(symbol) else {
            return Ok(None);
        };
        let heritage = self
            .arena
            .get(decl)
            .and_then(|node| self.arena.get_class(node))
            .map_or(NodeIndex::NONE, |data| data.heritage);
        if heritage.is_none() {
            let object = self.object_class().filter(|&object| object != symbol);
            return Ok(object);
        }
        let base_type = self.type_from_type_node(hook, heritage)?;
        Ok(self.types.class_symbol(base_type))
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Own members of a class, computed once.
    pub fn class_info(
        &mut self,
        hook: &mut dyn EvalHook,
        symbol: SymbolId,
    ) -> Result<Rc<ClassInfo>, CheckAbort> {
        if let Some(info) = self.class_infos.get(&symbol) {
            return Ok(Rc::clone(info));
        }
        let base = self.class_base(hook, symbol)?;
        let declaration = self.class_declaration(symbol).unwrap_or(NodeIndex::NONE);
        let name = self
            .binder
            .get_symbol(symbol)
            .map(|s| s.escaped_name.clone())
            .unwrap_or_default();
        let members = self
            .arena
            .get(declaration)
            .and_then(|node| self.arena.get_class(node))
            .map(|data| data.members.nodes.clone())
            .unwrap_or_default();

        let mut info = ClassInfo {
            symbol,
            name,
            declaration,
            base,
            is_abstract: self.arena.has_modifier(declaration, modifier_flags::ABSTRACT),
            fields: IndexMap::new(),
            methods: IndexMap::new(),
            constructors: Vec::new(),
        };

        for member in members {
            match self.arena.kind(member) {
                Some(SyntaxKind::PropertyDeclaration) => {
                    let Some(field_name) = self.arena.declaration_name(member).map(str::to_string)
                    else {
                        continue;
                    };
                    let type_id = self.declared_type_of(hook, member)?;
                    info.fields.insert(
                        field_name,
                        FieldInfo {
                            declaration: member,
                            type_id,
                            is_static: self.arena.has_modifier(member, modifier_flags::STATIC),
                            is_readonly: self.arena.has_modifier(member, modifier_flags::READONLY),
                        },
                    );
                }
                Some(SyntaxKind::MethodDeclaration) => {
                    let Some(method_name) = self.arena.declaration_name(member).map(str::to_string)
                    else {
                        continue;
                    };
                    let signature = self.signature_of(hook, member)?;
                    info.methods.entry(method_name).or_default().push(signature);
                }
                Some(SyntaxKind::Constructor) => {
                    let signature = self.signature_of(hook, member)?;
                    info.constructors.push(signature);
                }
                _ => {}
            }
        }
        trace!(
            class = %info.name,
            fields = info.fields.len(),
            methods = info.methods.len(),
            constructors = info.constructors.len(),
            "class_info"
        );
        let info = Rc::new(info);
        self.class_infos.insert(symbol, Rc::clone(&info));
        Ok(info)
    }

    /// Signature of a function, method or constructor declaration.
    pub(crate) fn signature_of(
        &mut self,
        hook: &mut dyn EvalHook,
        declaration: NodeIndex,
    ) -> Result<SignatureInfo, CheckAbort> {
        let Some((parameters, type_annotation)) = self
            .arena
            .get(declaration)
            .and_then(|node| self.arena.get_function(node))
            .map(|data| (data.parameters.nodes.clone(), data.type_annotation))
        else {
            return Ok(SignatureInfo {
                declaration,
                parameters: SmallVec::new(),
                return_type: TypeId::ERROR,
                is_static: false,
                is_abstract: false,
            });
        };
        let mut parameter_types = SmallVec::new();
        for parameter in parameters {
            parameter_types.push(self.declared_type_of(hook, parameter)?);
        }
        let return_type = if type_annotation.is_some() {
            self.type_from_type_node(hook, type_annotation)?
        } else {
            TypeId::VOID
        };
        Ok(SignatureInfo {
            declaration,
            parameters: parameter_types,
            return_type,
            is_static: self.arena.has_modifier(declaration, modifier_flags::STATIC),
            is_abstract: self.arena.has_modifier(declaration, modifier_flags::ABSTRACT),
        })
    }

    /// Field `name` of `class` or its nearest ancestor declaring it.
    pub fn find_field(
        &mut self,
        hook: &mut dyn EvalHook,
        class: SymbolId,
        name: &str,
        is_static: bool,
    ) -> Result<Option<FieldInfo>, CheckAbort> {
        let mut current = Some(class);
        let mut depth = 0usize;
        while let Some(owner) = current {
            depth += 1;
            if depth > MAX_INHERITANCE_DEPTH {
                break;
            }
            let info = self.class_info(hook, owner)?;
            if let Some(field) = info.fields.get(name)
                && field.is_static == is_static
            {
                return Ok(Some(field.clone()));
            }
            current = info.base;
        }
        Ok(None)
    }

    /// Class that declares method `name` nearest to `class` in its chain.
    pub fn find_method_owner(
        &mut self,
        hook: &mut dyn EvalHook,
        class: SymbolId,
        name: &str,
        is_static: bool,
    ) -> Result<Option<SymbolId>, CheckAbort> {
        let mut current = Some(class);
        let mut depth = 0usize;
        while let Some(owner) = current {
            depth += 1;
            if depth > MAX_INHERITANCE_DEPTH {
                break;
            }
            let info = self.class_info(hook, owner)?;
            if info
                .methods
                .get(name)
                .is_some_and(|sigs| sigs.iter().any(|sig| sig.is_static == is_static))
            {
                return Ok(Some(owner));
            }
            current = info.base;
        }
        Ok(None)
    }

    /// Overloads of `name` declared on `owner` with the given staticness.
    pub(crate) fn method_signatures(
        &mut self,
        hook: &mut dyn EvalHook,
        owner: SymbolId,
        name: &str,
        is_static: bool,
    ) -> Result<Vec<SignatureInfo>, CheckAbort> {
        let info = self.class_info(hook, owner)?;
        Ok(info
            .methods
            .get(name)
            .map(|sigs| {
                sigs.iter()
                    .filter(|sig| sig.is_static == is_static)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
