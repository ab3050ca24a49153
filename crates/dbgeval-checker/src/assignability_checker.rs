//! Assignability and cast compatibility.

use crate::context::CompilerContext;
use crate::hook::{CheckAbort, EvalHook};
use crate::types::{TypeId, TypeKey};
use dbgeval_binder::SymbolId;
use dbgeval_common::limits::MAX_INHERITANCE_DEPTH;

impl CompilerContext {
    /// Whether a value of `source` may be stored where `target` is expected.
    ///
    /// Numeric primitives widen, `null` goes to any reference type, classes
    /// go to their ancestors, and everything except `void` goes to `Object`.
    pub fn is_assignable(
        &mut self,
        hook: &mut dyn EvalHook,
        source: TypeId,
        target: TypeId,
    ) -> Result<bool, CheckAbort> {
        if source == target || source.is_error() || target.is_error() {
            return Ok(true);
        }
        if let (Some(from), Some(to)) = (source.numeric_rank(), target.numeric_rank()) {
            return Ok(from <= to);
        }
        if self.is_object_type(target) {
            return Ok(source != TypeId::VOID && self.is_value_type(source));
        }
        if source == TypeId::NULL {
            return Ok(self.types.is_reference(target));
        }
        match (
            self.types.lookup(source).cloned(),
            self.types.lookup(target).cloned(),
        ) {
            (Some(TypeKey::Class(derived)), Some(TypeKey::Class(base))) => {
                self.is_derived_from(hook, derived, base)
            }
            (Some(TypeKey::Array(a)), Some(TypeKey::Array(b))) => Ok(a == b),
            _ => Ok(false),
        }
    }

    /// Whether `value as target` is allowed: either direction assignable, or
    /// a numeric conversion.
    pub fn is_castable(
        &mut self,
        hook: &mut dyn EvalHook,
        source: TypeId,
        target: TypeId,
    ) -> Result<bool, CheckAbort> {
        if source.is_numeric() && target.is_numeric() {
            return Ok(true);
        }
        if self.is_assignable(hook, source, target)? {
            return Ok(true);
        }
        self.is_assignable(hook, target, source)
    }

    /// Walk `derived`'s superclass chain looking for `base`.
    pub fn is_derived_from(
        &mut self,
        hook: &mut dyn EvalHook,
        derived: SymbolId,
        base: SymbolId,
    ) -> Result<bool, CheckAbort> {
        let mut current = Some(derived);
        let mut depth = 0usize;
        while let Some(class) = current {
            if class == base {
                return Ok(true);
            }
            depth += 1;
            if depth > MAX_INHERITANCE_DEPTH {
                break;
            }
            current = self.class_base(hook, class)?;
        }
        Ok(false)
    }

    pub(crate) fn is_object_type(&self, id: TypeId) -> bool {
        self.object_class()
            .is_some_and(|object| self.types.class_symbol(id) == Some(object))
    }

    /// Types that denote runtime values (not class objects, namespaces or
    /// unbound methods).
    fn is_value_type(&self, id: TypeId) -> bool {
        id.is_intrinsic()
            || matches!(
                self.types.lookup(id),
                Some(TypeKey::Class(_) | TypeKey::Array(_))
            )
    }
}
