//! Type representation for the checker.
//!
//! Intrinsic types have fixed ids below `TypeId::FIRST_INTERNED`; class,
//! array and value-only types (class objects, functions, namespaces, bound
//! methods) are interned on demand so that structurally equal types share
//! one id and can be compared with `==`.

use dbgeval_binder::SymbolId;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Result of a failed computation; compatible with everything so one
    /// error does not cascade.
    pub const ERROR: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const BOOLEAN: TypeId = TypeId(2);
    pub const BYTE: TypeId = TypeId(3);
    pub const CHAR: TypeId = TypeId(4);
    pub const SHORT: TypeId = TypeId(5);
    pub const INT: TypeId = TypeId(6);
    pub const LONG: TypeId = TypeId(7);
    pub const FLOAT: TypeId = TypeId(8);
    /// `number` and `double` are the same type.
    pub const DOUBLE: TypeId = TypeId(9);
    pub const STRING: TypeId = TypeId(10);
    pub const NULL: TypeId = TypeId(11);

    pub const FIRST_INTERNED: u32 = 16;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_INTERNED
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    /// Widening rank of a numeric primitive (`byte < short < int < long < float < double`).
    /// `char` widens like an unsigned short.
    pub const fn numeric_rank(self) -> Option<u8> {
        match self.0 {
            3 => Some(1),
            4 | 5 => Some(2),
            6 => Some(3),
            7 => Some(4),
            8 => Some(5),
            9 => Some(6),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Primitive types that live in a slot by value.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.is_numeric() || self.0 == Self::BOOLEAN.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Intrinsic(&'static str),
    /// Instance type of a class.
    Class(SymbolId),
    /// The class itself used as a value (`A.staticField`, `new A()`).
    ClassObject(SymbolId),
    Array(TypeId),
    /// A (possibly overloaded) global function used as a value.
    Function(SymbolId),
    /// `import * as M` used as a value.
    Namespace(SymbolId),
    /// A method selected off a receiver, awaiting a call.
    Method {
        class: SymbolId,
        name: String,
        is_static: bool,
    },
}

pub struct TypeInterner {
    keys: Vec<TypeKey>,
    ids: FxHashMap<TypeKey, TypeId>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

const INTRINSIC_NAMES: [&str; 12] = [
    "error", "void", "boolean", "byte", "char", "short", "int", "long", "float", "double",
    "string", "null",
];

impl TypeInterner {
    pub fn new() -> TypeInterner {
        let mut interner = TypeInterner {
            keys: Vec::with_capacity(64),
            ids: FxHashMap::default(),
        };
        for name in INTRINSIC_NAMES {
            interner.keys.push(TypeKey::Intrinsic(name));
        }
        // Pad the reserved range so interned ids start at FIRST_INTERNED.
        while interner.keys.len() < TypeId::FIRST_INTERNED as usize {
            interner.keys.push(TypeKey::Intrinsic("reserved"));
        }
        interner
    }

    pub fn intern(&mut self, key: TypeKey) -> TypeId {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = TypeId(self.keys.len() as u32);
        self.keys.push(key.clone());
        self.ids.insert(key, id);
        id
    }

    #[inline]
    pub fn lookup(&self, id: TypeId) -> Option<&TypeKey> {
        self.keys.get(id.0 as usize)
    }

    pub fn class(&mut self, symbol: SymbolId) -> TypeId {
        self.intern(TypeKey::Class(symbol))
    }

    pub fn class_object(&mut self, symbol: SymbolId) -> TypeId {
        self.intern(TypeKey::ClassObject(symbol))
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.intern(TypeKey::Array(element))
    }

    pub fn function(&mut self, symbol: SymbolId) -> TypeId {
        self.intern(TypeKey::Function(symbol))
    }

    pub fn namespace(&mut self, symbol: SymbolId) -> TypeId {
        self.intern(TypeKey::Namespace(symbol))
    }

    pub fn method(&mut self, class: SymbolId, name: &str, is_static: bool) -> TypeId {
        self.intern(TypeKey::Method {
            class,
            name: name.to_string(),
            is_static,
        })
    }

    /// Class symbol of an instance type.
    pub fn class_symbol(&self, id: TypeId) -> Option<SymbolId> {
        match self.lookup(id)? {
            TypeKey::Class(symbol) => Some(*symbol),
            _ => None,
        }
    }

    pub fn array_element(&self, id: TypeId) -> Option<TypeId> {
        match self.lookup(id)? {
            TypeKey::Array(element) => Some(*element),
            _ => None,
        }
    }

    /// Types whose values are references (nullable, castable from `Object`).
    pub fn is_reference(&self, id: TypeId) -> bool {
        id == TypeId::STRING
            || matches!(
                self.lookup(id),
                Some(TypeKey::Class(_) | TypeKey::Array(_))
            )
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
