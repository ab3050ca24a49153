//! Host AST: thin nodes, typed pools, factory, snippet parser and printer.

pub mod base;
pub mod flags;
pub mod node;
mod node_access;
mod node_arena;
pub mod printer;
pub mod state;

pub use base::{NodeIndex, NodeList};
pub use flags::{modifier_flags, node_flags};
pub use node::{Node, NodeArena};
pub use state::ParserState;
