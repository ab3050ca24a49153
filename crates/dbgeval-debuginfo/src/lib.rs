//! Debug-info binary container for the dbgeval evaluator.
//!
//! A container describes one compiled module: its name and source path, its
//! import/export records, and a class table whose methods carry prototypes
//! and local-variable tables. `BinaryFile` reads a container, `BinaryBuilder`
//! writes one.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic "DBGI" | u16 version
//! strings:  u32 count, { u32 len, utf-8 bytes }*
//! module:   name id, source path id, u32 n, import{alias, path, name}*, u32 n, export{..}*
//! classes:  u32 count, class*
//! class:    name id, super id | u32::MAX, u32 access, u32 n, field*, u32 n, method*
//! field:    name id, descriptor id, u32 access
//! method:   name id, u32 access, u32 n, proto descriptor id*, u32 n, local*
//! local:    name id, descriptor id, u32 register, u32 start, u32 length
//! ```

pub mod access_flags;
pub mod descriptor;
pub mod error;
pub mod file;
mod reader;
pub mod writer;

pub use access_flags::AccessFlags;
pub use descriptor::{TypeDescriptor, demangle_class_name, mangle_class_name};
pub use error::FormatError;
pub use file::{
    BinaryFile, ClassDescriptor, ClassId, EntityEntry, FieldDescriptor, LocalVariable,
    MethodDescriptor, MethodId, StringId,
};
pub use writer::{BinaryBuilder, LocalVariableSpec};

pub const MAGIC: &[u8; 4] = b"DBGI";
pub const FORMAT_VERSION: u16 = 1;

/// Class holding a module's global variables (static fields) and functions
/// (static methods).
pub const GLOBAL_CLASS_NAME: &str = "ETSGLOBAL";
/// Method name of an instance constructor.
pub const CONSTRUCTOR_NAME: &str = "<ctor>";
/// Method name of a static initializer.
pub const STATIC_INITIALIZER_NAME: &str = "<cctor>";

/// Root of every class hierarchy.
pub const OBJECT_DESCRIPTOR: &str = "Lstd/core/Object;";
pub const STRING_DESCRIPTOR: &str = "Lstd/core/String;";
/// Module prefix of runtime library classes.
pub const CORE_MODULE: &str = "std.core";

/// Import/export alias meaning "all of the module" (`export * from`).
pub const WILDCARD: &str = "*";
