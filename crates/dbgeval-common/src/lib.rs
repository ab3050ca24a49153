//! Common types and utilities for the dbgeval expression evaluator.
//!
//! This crate provides foundational types used across all dbgeval crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, message templates)
//! - Centralized limits and thresholds

// Diagnostic types shared by parser, binder and checker
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, diagnostic_codes, diagnostic_messages};

// Centralized limits and thresholds
pub mod limits;
