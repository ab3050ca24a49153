//! Centralized limits and thresholds for the evaluator.
//!
//! These values bound walks over data that comes from untrusted or
//! possibly-corrupt debug information, so a malformed binary produces a
//! diagnostic instead of a hang or a stack overflow.

// =============================================================================
// Walk Limits
// =============================================================================

/// Maximum number of parent hops when searching for an enclosing scope.
///
/// Used by the binder and checker when walking parent pointers from an
/// identifier up to the nearest scope-creating node.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Maximum number of `extends` hops the checker follows when walking a
/// synthesized class hierarchy for members or assignability.
pub const MAX_INHERITANCE_DEPTH: usize = 4_096;

/// Maximum depth for expression type checking.
///
/// Each nested expression adds a frame to the call stack; past this depth
/// the checker bails out with the error type.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

// =============================================================================
// Binary Format Limits
// =============================================================================

/// Maximum number of entries in any single table of a debug-info binary.
///
/// Guards pre-allocation against a corrupt count field.
pub const MAX_TABLE_ENTRIES: u32 = 1 << 22;

/// Maximum length of a single string-table entry, in bytes.
pub const MAX_STRING_LENGTH: u32 = 1 << 20;
