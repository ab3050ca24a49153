//! Node and modifier flag constants.

/// Flags stored inline in the 16-bit `Node::flags` field.
pub mod node_flags {
    /// `let` declaration list.
    pub const LET: u16 = 1 << 0;
    /// `const` declaration list.
    pub const CONST: u16 = 1 << 1;
    /// Node was built by the evaluator rather than parsed from user text.
    pub const SYNTHESIZED: u16 = 1 << 2;
    /// Node was produced while recovering from a parse error.
    pub const THIS_NODE_HAS_ERROR: u16 = 1 << 3;
}

/// Declaration modifiers stored in `ExtendedNodeInfo::modifier_flags`.
pub mod modifier_flags {
    pub const NONE: u32 = 0;
    pub const EXPORT: u32 = 1 << 0;
    pub const DECLARE: u32 = 1 << 1;
    pub const ABSTRACT: u32 = 1 << 2;
    pub const STATIC: u32 = 1 << 3;
    pub const READONLY: u32 = 1 << 4;
    pub const PUBLIC: u32 = 1 << 5;
    pub const PRIVATE: u32 = 1 << 6;
    pub const PROTECTED: u32 = 1 << 7;

    pub const ACCESSIBILITY: u32 = PUBLIC | PRIVATE | PROTECTED;
}
