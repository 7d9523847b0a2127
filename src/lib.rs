//! This library contains the classic transformations of formal language theory.
//!
//! It consists of
//! - __frontend__: Build grammars and automata programmatically or load them from JSON files.
//! - __transformations__:
//!   - [`convert`]: right-linear grammars to finite automata and back
//!   - [`automaton::determinize`]: subset construction
//!   - [`grammar::cnf`]: normalization into Chomsky Normal Form
//! - __backend__: Use the loaded grammar to do whatever you want.
//!   Current backends are
//!   - `interpreter`: Generate random sentences of a grammar
//!   - `json`: Write grammars and automata back to disk
//!
//! Two standalone tools ship alongside: an [`ArithmeticLexer`](lexer::ArithmeticLexer) and a
//! [`Pattern`](pattern::Pattern) expander.
//!
//! ## Getting Started
//! The first step always is to load a grammar. To do this use the [`Grammar::builder()`](grammar::Grammar::builder) method
//! that will give you access to a [`GrammarBuilder`](grammar::GrammarBuilder) like this:
//! ```
//! use formlang::{automaton::determinize, convert::grammar_to_automaton, grammar::Grammar};
//!
//! let grammar = Grammar::builder()
//!     // Load a grammar in JSON format
//!     .json_grammar("test-data/grammars/variant.json").unwrap()
//!     // Set the entrypoint
//!     .entrypoint("S")
//!     .build().unwrap();
//!
//! let automaton = grammar_to_automaton(&grammar).unwrap();
//! let dfa = determinize(&automaton);
//! assert!(dfa.accepts_str("acab"));
//! ```
//! Context-free grammars go through the CNF pipeline instead:
//! ```
//! use formlang::grammar::{cnf::is_in_cnf, CnfConverter, Grammar};
//!
//! let grammar = Grammar::builder()
//!     .json_grammar("test-data/grammars/cnf.json").unwrap()
//!     .build().unwrap();
//! assert!(is_in_cnf(&CnfConverter::new().strict(true).convert(&grammar)));
//! ```

#![warn(missing_docs)]

pub(crate) mod parser;

pub mod automaton;
pub mod backends;
pub mod convert;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod pattern;

#[cfg(test)]
mod tests;
