//! Consumers of a loaded [`Grammar`](crate::grammar::Grammar).
//!
//! - `interpreter`: generate random sentences
//! - `json`: write grammars and automata to disk

pub mod interpreter;
pub mod json;
