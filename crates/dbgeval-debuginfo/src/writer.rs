//! `BinaryBuilder`: assembles and serializes a container.
//!
//! Used by toolchain tests and fixtures to produce binaries for a module
//! without a compiler. Class names passed to the builder are simple names
//! and are mangled with the builder's module name; super-class names and
//! type descriptors are passed already encoded.

use crate::access_flags::AccessFlags;
use crate::descriptor::mangle_class_name;
use crate::error::FormatError;
use crate::file::{
    BinaryFile, ClassId, ClassRecord, EntryRecord, FieldRecord, LocalRecord, MethodId,
    MethodRecord, StringId,
};
use crate::{FORMAT_VERSION, GLOBAL_CLASS_NAME, MAGIC, OBJECT_DESCRIPTOR};
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::debug;

/// A live-variable table entry to add to a method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalVariableSpec {
    pub name: String,
    pub type_descriptor: String,
    pub register: u32,
    pub start_offset: u32,
    pub length: u32,
}

impl LocalVariableSpec {
    pub fn new(name: &str, type_descriptor: &str, register: u32, start_offset: u32, length: u32) -> Self {
        LocalVariableSpec {
            name: name.to_string(),
            type_descriptor: type_descriptor.to_string(),
            register,
            start_offset,
            length,
        }
    }
}

pub struct BinaryBuilder {
    strings: Vec<String>,
    string_ids: FxHashMap<String, StringId>,
    module: String,
    module_name: StringId,
    source_path: StringId,
    imports: Vec<EntryRecord>,
    exports: Vec<EntryRecord>,
    classes: Vec<ClassRecord>,
    global_class: Option<ClassId>,
}

impl BinaryBuilder {
    pub fn new(module_name: &str, source_path: &str) -> BinaryBuilder {
        let mut builder = BinaryBuilder {
            strings: Vec::new(),
            string_ids: FxHashMap::default(),
            module: module_name.to_string(),
            module_name: StringId::NONE,
            source_path: StringId::NONE,
            imports: Vec::new(),
            exports: Vec::new(),
            classes: Vec::new(),
            global_class: None,
        };
        builder.module_name = builder.intern(module_name);
        builder.source_path = builder.intern(source_path);
        builder
    }

    fn intern(&mut self, text: &str) -> StringId {
        if let Some(&id) = self.string_ids.get(text) {
            return id;
        }
        let id = StringId(self.strings.len() as u32);
        self.strings.push(text.to_string());
        self.string_ids.insert(text.to_string(), id);
        id
    }

    fn entry(&mut self, alias: &str, path: &str, name: &str) -> EntryRecord {
        EntryRecord {
            alias: self.intern(alias),
            path: self.intern(path),
            name: self.intern(name),
        }
    }

    /// `import { name as alias } from <path>`; alias `*` with name `*` is a
    /// wildcard import, name `*` alone a namespace import.
    pub fn import(&mut self, alias: &str, path: &str, name: &str) -> &mut Self {
        let entry = self.entry(alias, path, name);
        self.imports.push(entry);
        self
    }

    /// `export { name as alias }` of the entity `name` living in `path`;
    /// alias `*` re-exports all of `path`.
    pub fn export(&mut self, alias: &str, path: &str, name: &str) -> &mut Self {
        let entry = self.entry(alias, path, name);
        self.exports.push(entry);
        self
    }

    /// Add a class named `name` in this module. `super_class` is a mangled
    /// name; `None` makes a root class.
    pub fn class(&mut self, name: &str, super_class: Option<&str>, access: AccessFlags) -> ClassId {
        let mangled = mangle_class_name(&self.module, name);
        let name = self.intern(&mangled);
        let super_name = super_class.map_or(StringId::NONE, |s| self.intern(s));
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassRecord {
            name,
            super_name,
            access,
            fields: Vec::new(),
            methods: Vec::new(),
        });
        id
    }

    /// Mangled name of a class added to this builder.
    pub fn class_name(&self, class: ClassId) -> Option<&str> {
        let record = self.classes.get(class.0 as usize)?;
        self.strings.get(record.name.0 as usize).map(String::as_str)
    }

    pub fn field(&mut self, class: ClassId, name: &str, type_descriptor: &str, access: AccessFlags) -> &mut Self {
        let record = FieldRecord {
            name: self.intern(name),
            descriptor: self.intern(type_descriptor),
            access,
        };
        if let Some(class) = self.classes.get_mut(class.0 as usize) {
            class.fields.push(record);
        }
        self
    }

    /// Add a method. `return_type` and `parameters` are descriptors; the
    /// receiver is prepended for instance methods.
    pub fn method(
        &mut self,
        class: ClassId,
        name: &str,
        access: AccessFlags,
        return_type: &str,
        parameters: &[&str],
    ) -> MethodId {
        let mut proto = vec![self.intern(return_type)];
        if !access.is_static() {
            let receiver = self
                .classes
                .get(class.0 as usize)
                .map_or(StringId::NONE, |c| c.name);
            proto.push(receiver);
        }
        for parameter in parameters {
            proto.push(self.intern(parameter));
        }
        let name = self.intern(name);
        let Some(record) = self.classes.get_mut(class.0 as usize) else {
            return MethodId {
                class: ClassId::INVALID,
                index: 0,
            };
        };
        record.methods.push(MethodRecord {
            name,
            access,
            proto,
            locals: Vec::new(),
        });
        MethodId {
            class,
            index: (record.methods.len() - 1) as u32,
        }
    }

    pub fn local(&mut self, method: MethodId, local: LocalVariableSpec) -> &mut Self {
        let record = LocalRecord {
            name: self.intern(&local.name),
            descriptor: self.intern(&local.type_descriptor),
            register: local.register,
            start_offset: local.start_offset,
            length: local.length,
        };
        if let Some(method) = self
            .classes
            .get_mut(method.class.0 as usize)
            .and_then(|c| c.methods.get_mut(method.index as usize))
        {
            method.locals.push(record);
        }
        self
    }

    /// The module's global-holder class, created on first use.
    pub fn global_class(&mut self) -> ClassId {
        if let Some(id) = self.global_class {
            return id;
        }
        let id = self.class(GLOBAL_CLASS_NAME, Some(OBJECT_DESCRIPTOR), AccessFlags::PUBLIC | AccessFlags::FINAL);
        self.global_class = Some(id);
        id
    }

    pub fn global_variable(&mut self, name: &str, type_descriptor: &str) -> &mut Self {
        let global = self.global_class();
        self.field(global, name, type_descriptor, AccessFlags::PUBLIC | AccessFlags::STATIC)
    }

    pub fn global_function(&mut self, name: &str, return_type: &str, parameters: &[&str]) -> MethodId {
        let global = self.global_class();
        self.method(
            global,
            name,
            AccessFlags::PUBLIC | AccessFlags::STATIC,
            return_type,
            parameters,
        )
    }

    // =========================================================================
    // Output
    // =========================================================================

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Writer::default();
        out.bytes.extend_from_slice(MAGIC);
        out.u16(FORMAT_VERSION);
        out.u32(self.strings.len() as u32);
        for text in &self.strings {
            out.u32(text.len() as u32);
            out.bytes.extend_from_slice(text.as_bytes());
        }
        out.id(self.module_name);
        out.id(self.source_path);
        for entries in [&self.imports, &self.exports] {
            out.u32(entries.len() as u32);
            for entry in entries {
                out.id(entry.alias);
                out.id(entry.path);
                out.id(entry.name);
            }
        }
        out.u32(self.classes.len() as u32);
        for class in &self.classes {
            out.id(class.name);
            out.id(class.super_name);
            out.u32(class.access.bits());
            out.u32(class.fields.len() as u32);
            for field in &class.fields {
                out.id(field.name);
                out.id(field.descriptor);
                out.u32(field.access.bits());
            }
            out.u32(class.methods.len() as u32);
            for method in &class.methods {
                out.id(method.name);
                out.u32(method.access.bits());
                out.u32(method.proto.len() as u32);
                for &id in &method.proto {
                    out.id(id);
                }
                out.u32(method.locals.len() as u32);
                for local in &method.locals {
                    out.id(local.name);
                    out.id(local.descriptor);
                    out.u32(local.register);
                    out.u32(local.start_offset);
                    out.u32(local.length);
                }
            }
        }
        out.bytes
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let path = path.as_ref();
        let bytes = self.to_bytes();
        debug!(path = %path.display(), bytes = bytes.len(), module = %self.module, "writing debug-info container");
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Serialize and read back.
    pub fn build(&self) -> Result<BinaryFile, FormatError> {
        BinaryFile::parse(&self.to_bytes())
    }
}

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn id(&mut self, id: StringId) {
        self.u32(id.0);
    }
}
