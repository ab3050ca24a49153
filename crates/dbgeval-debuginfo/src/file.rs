//! `BinaryFile`: a parsed container and borrowed views over its records.

use crate::access_flags::AccessFlags;
use crate::descriptor::demangle_class_name;
use crate::error::FormatError;
use crate::reader::ByteReader;
use crate::{CONSTRUCTOR_NAME, FORMAT_VERSION, MAGIC, STATIC_INITIALIZER_NAME};
use std::path::Path;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(pub u32);

impl StringId {
    pub const NONE: StringId = StringId(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Index into a file's class table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    pub const INVALID: ClassId = ClassId(u32::MAX);

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    pub class: ClassId,
    pub index: u32,
}

// =============================================================================
// Records
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EntryRecord {
    pub alias: StringId,
    pub path: StringId,
    pub name: StringId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldRecord {
    pub name: StringId,
    pub descriptor: StringId,
    pub access: AccessFlags,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LocalRecord {
    pub name: StringId,
    pub descriptor: StringId,
    pub register: u32,
    pub start_offset: u32,
    pub length: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MethodRecord {
    pub name: StringId,
    pub access: AccessFlags,
    /// Return descriptor, then parameters; instance methods start with the receiver.
    pub proto: Vec<StringId>,
    pub locals: Vec<LocalRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClassRecord {
    pub name: StringId,
    pub super_name: StringId,
    pub access: AccessFlags,
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,
}

// =============================================================================
// BinaryFile
// =============================================================================

/// One parsed container. Immutable after load.
#[derive(Clone, Debug)]
pub struct BinaryFile {
    pub(crate) strings: Vec<String>,
    pub(crate) module_name: StringId,
    pub(crate) source_path: StringId,
    pub(crate) imports: Vec<EntryRecord>,
    pub(crate) exports: Vec<EntryRecord>,
    pub(crate) classes: Vec<ClassRecord>,
}

impl BinaryFile {
    pub fn open(path: impl AsRef<Path>) -> Result<BinaryFile, FormatError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "reading debug-info container");
        BinaryFile::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<BinaryFile, FormatError> {
        let mut reader = ByteReader::new(bytes);
        if reader.take(MAGIC.len())? != MAGIC {
            return Err(FormatError::BadMagic);
        }
        let version = reader.u16()?;
        if version != FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }

        let string_count = reader.count("string")?;
        let mut strings = Vec::with_capacity(string_count as usize);
        for _ in 0..string_count {
            strings.push(reader.string()?);
        }
        let mut ids = IdReader {
            reader,
            string_count,
        };

        let module_name = ids.id()?;
        let source_path = ids.id()?;
        let imports = ids.entries("import")?;
        let exports = ids.entries("export")?;

        let class_count = ids.reader.count("class")?;
        let mut classes = Vec::with_capacity(class_count as usize);
        for _ in 0..class_count {
            classes.push(ids.class()?);
        }
        let trailing = ids.reader.remaining();
        if trailing != 0 {
            return Err(FormatError::TrailingBytes(trailing));
        }

        let file = BinaryFile {
            strings,
            module_name,
            source_path,
            imports,
            exports,
            classes,
        };
        debug!(
            module = file.module_name(),
            source = file.source_path(),
            classes = file.classes.len(),
            "parsed debug-info container"
        );
        Ok(file)
    }

    /// String-table lookup.
    pub fn string(&self, id: StringId) -> Option<&str> {
        self.strings.get(id.0 as usize).map(String::as_str)
    }

    /// Ids are validated at parse time, so a miss only happens for `StringId::NONE`.
    #[inline]
    pub(crate) fn text(&self, id: StringId) -> &str {
        self.string(id).unwrap_or_default()
    }

    pub fn module_name(&self) -> &str {
        self.text(self.module_name)
    }

    pub fn source_path(&self) -> &str {
        self.text(self.source_path)
    }

    pub fn imports(&self) -> impl Iterator<Item = EntityEntry<'_>> {
        self.imports.iter().map(|entry| self.entity_entry(entry))
    }

    pub fn exports(&self) -> impl Iterator<Item = EntityEntry<'_>> {
        self.exports.iter().map(|entry| self.entity_entry(entry))
    }

    fn entity_entry(&self, entry: &EntryRecord) -> EntityEntry<'_> {
        EntityEntry {
            alias: self.text(entry.alias),
            path: self.text(entry.path),
            name: self.text(entry.name),
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> impl Iterator<Item = ClassDescriptor<'_>> {
        self.classes
            .iter()
            .enumerate()
            .map(|(index, record)| ClassDescriptor {
                file: self,
                id: ClassId(index as u32),
                record,
            })
    }

    pub fn class(&self, id: ClassId) -> Option<ClassDescriptor<'_>> {
        let record = self.classes.get(id.0 as usize)?;
        Some(ClassDescriptor {
            file: self,
            id,
            record,
        })
    }

    pub fn fields(&self, class: ClassId) -> Vec<FieldDescriptor<'_>> {
        self.class(class).map(|c| c.fields()).unwrap_or_default()
    }

    pub fn methods(&self, class: ClassId) -> Vec<MethodDescriptor<'_>> {
        self.class(class).map(|c| c.methods()).unwrap_or_default()
    }

    pub fn method(&self, id: MethodId) -> Option<MethodDescriptor<'_>> {
        let record = self
            .classes
            .get(id.class.0 as usize)?
            .methods
            .get(id.index as usize)?;
        Some(MethodDescriptor {
            file: self,
            id,
            record,
        })
    }

    /// Full prototype of a method: return type, then parameters (receiver included).
    pub fn signature_types(&self, method: MethodId) -> Vec<&str> {
        self.method(method)
            .map(|m| m.signature_types())
            .unwrap_or_default()
    }

    pub fn super_class_name(&self, class: ClassId) -> Option<&str> {
        self.class(class).and_then(|c| c.super_class_name())
    }

    pub fn demangle_class_name(&self, class: ClassId) -> Result<(String, String), FormatError> {
        let name = self
            .class(class)
            .map(|c| c.name())
            .ok_or_else(|| FormatError::BadClassName(format!("#{}", class.0)))?;
        demangle_class_name(name)
    }

    pub fn local_variable_table(&self, method: MethodId) -> Vec<LocalVariable<'_>> {
        self.method(method)
            .map(|m| m.local_variable_table())
            .unwrap_or_default()
    }
}

/// Reads string ids checked against the string table.
struct IdReader<'a> {
    reader: ByteReader<'a>,
    string_count: u32,
}

impl IdReader<'_> {
    fn id(&mut self) -> Result<StringId, FormatError> {
        let id = self.reader.u32()?;
        if id >= self.string_count {
            return Err(FormatError::StringIdOutOfRange(id));
        }
        Ok(StringId(id))
    }

    fn optional_id(&mut self) -> Result<StringId, FormatError> {
        let id = self.reader.u32()?;
        if id == u32::MAX {
            return Ok(StringId::NONE);
        }
        if id >= self.string_count {
            return Err(FormatError::StringIdOutOfRange(id));
        }
        Ok(StringId(id))
    }

    fn access(&mut self) -> Result<AccessFlags, FormatError> {
        Ok(AccessFlags::from_bits_retain(self.reader.u32()?))
    }

    fn entries(&mut self, what: &'static str) -> Result<Vec<EntryRecord>, FormatError> {
        let count = self.reader.count(what)?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(EntryRecord {
                alias: self.id()?,
                path: self.id()?,
                name: self.id()?,
            });
        }
        Ok(entries)
    }

    fn class(&mut self) -> Result<ClassRecord, FormatError> {
        let offset = self.reader.offset();
        let name = self.id()?;
        let super_name = self.optional_id()?;
        let access = self.access()?;
        let field_count = self.reader.count("field")?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(FieldRecord {
                name: self.id()?,
                descriptor: self.id()?,
                access: self.access()?,
            });
        }
        let method_count = self.reader.count("method")?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(self.method()?);
        }
        trace!(offset, fields = fields.len(), methods = methods.len(), "read class record");
        Ok(ClassRecord {
            name,
            super_name,
            access,
            fields,
            methods,
        })
    }

    fn method(&mut self) -> Result<MethodRecord, FormatError> {
        let name = self.id()?;
        let access = self.access()?;
        let proto_count = self.reader.count("prototype")?;
        let mut proto = Vec::with_capacity(proto_count as usize);
        for _ in 0..proto_count {
            proto.push(self.id()?);
        }
        let local_count = self.reader.count("local variable")?;
        let mut locals = Vec::with_capacity(local_count as usize);
        for _ in 0..local_count {
            locals.push(LocalRecord {
                name: self.id()?,
                descriptor: self.id()?,
                register: self.reader.u32()?,
                start_offset: self.reader.u32()?,
                length: self.reader.u32()?,
            });
        }
        Ok(MethodRecord {
            name,
            access,
            proto,
            locals,
        })
    }
}

// =============================================================================
// Views
// =============================================================================

/// One import or export record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityEntry<'a> {
    /// Local name (imports) or exported name (exports); `*` for wildcards.
    pub alias: &'a str,
    /// Source path of the module the entity comes from.
    pub path: &'a str,
    /// Entity name inside that module; `*` for a namespace.
    pub name: &'a str,
}

#[derive(Clone, Copy, Debug)]
pub struct ClassDescriptor<'a> {
    file: &'a BinaryFile,
    id: ClassId,
    record: &'a ClassRecord,
}

impl<'a> ClassDescriptor<'a> {
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Mangled name.
    pub fn name(&self) -> &'a str {
        self.file.text(self.record.name)
    }

    /// Unqualified class name.
    pub fn simple_name(&self) -> Result<String, FormatError> {
        demangle_class_name(self.name()).map(|(_, name)| name)
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.record.access
    }

    pub fn is_abstract(&self) -> bool {
        self.record.access.is_abstract()
    }

    pub fn super_class_name(&self) -> Option<&'a str> {
        if self.record.super_name.is_none() {
            None
        } else {
            self.file.string(self.record.super_name)
        }
    }

    pub fn fields(&self) -> Vec<FieldDescriptor<'a>> {
        let file = self.file;
        self.record
            .fields
            .iter()
            .map(|field| FieldDescriptor {
                name: file.text(field.name),
                type_descriptor: file.text(field.descriptor),
                access: field.access,
            })
            .collect()
    }

    pub fn methods(&self) -> Vec<MethodDescriptor<'a>> {
        let file = self.file;
        let class = self.id;
        self.record
            .methods
            .iter()
            .enumerate()
            .map(|(index, record)| MethodDescriptor {
                file,
                id: MethodId {
                    class,
                    index: index as u32,
                },
                record,
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor<'a> {
    pub name: &'a str,
    pub type_descriptor: &'a str,
    pub access: AccessFlags,
}

#[derive(Clone, Copy, Debug)]
pub struct MethodDescriptor<'a> {
    file: &'a BinaryFile,
    id: MethodId,
    record: &'a MethodRecord,
}

impl<'a> MethodDescriptor<'a> {
    pub fn id(&self) -> MethodId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.file.text(self.record.name)
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.record.access
    }

    pub fn is_static(&self) -> bool {
        self.record.access.is_static()
    }

    pub fn is_abstract(&self) -> bool {
        self.record.access.is_abstract()
    }

    pub fn is_constructor(&self) -> bool {
        self.name() == CONSTRUCTOR_NAME
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name() == STATIC_INITIALIZER_NAME
    }

    pub fn signature_types(&self) -> Vec<&'a str> {
        let file = self.file;
        self.record.proto.iter().map(|&id| file.text(id)).collect()
    }

    pub fn local_variable_table(&self) -> Vec<LocalVariable<'a>> {
        let file = self.file;
        self.record
            .locals
            .iter()
            .map(|local| LocalVariable {
                name: file.text(local.name),
                type_descriptor: file.text(local.descriptor),
                register: local.register,
                start_offset: local.start_offset,
                length: local.length,
            })
            .collect()
    }
}

/// One live-variable table entry: `name` lives in `register` over
/// `[start_offset, start_offset + length)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalVariable<'a> {
    pub name: &'a str,
    pub type_descriptor: &'a str,
    pub register: u32,
    pub start_offset: u32,
    pub length: u32,
}

impl LocalVariable<'_> {
    #[inline]
    pub fn covers(&self, offset: u32) -> bool {
        offset >= self.start_offset && offset - self.start_offset < self.length
    }
}
