//! Access flags of classes, fields and methods.

use bitflags::bitflags;

bitflags! {
    /// Access and property bits stored with every class, field and method record.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        /// `final` class or method; a final field is read-only.
        const FINAL = 0x0010;
        const ABSTRACT = 0x0400;
    }
}

impl AccessFlags {
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    #[inline]
    pub fn is_abstract(self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    #[inline]
    pub fn is_final(self) -> bool {
        self.contains(AccessFlags::FINAL)
    }
}
