//! Host AST for the dbgeval evaluator.
//!
//! - `scanner`: `SyntaxKind` and the tokenizer
//! - `parser`: thin nodes + typed pools in `NodeArena`, the node factory,
//!   `ParserState` for source files and snippets, and a source printer

pub mod parser;
pub mod scanner;

pub use parser::state::parse_source;
pub use parser::{NodeArena, NodeIndex, NodeList};
pub use scanner::SyntaxKind;
