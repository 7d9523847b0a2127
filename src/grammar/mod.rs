//! Grammars and the transformations that operate on them.
//!
//! Build a grammar like so:
//! ```
//! use formlang::grammar::{Grammar, Symbol};
//!
//! let grammar = Grammar::builder()
//!     .non_terminals(["S", "A", "B"])
//!     .terminals(["a", "b"])
//!     .rules("S", ["aA", "bB"])
//!     .rules("A", ["b"])
//!     .rules("B", ["a"])
//!     .build()
//!     .unwrap();
//!
//! // The right-hand-side (rhs) of a rule is a sequence of terminals and non-terminals.
//! for rule in grammar.rules() {
//!     for symbol in rule.rhs() {
//!         match symbol {
//!             Symbol::Terminal(terminal) => println!("terminal: {}", terminal.content()),
//!             Symbol::NonTerminal(nonterm) => println!("non-terminal {}", nonterm.id()),
//!         }
//!     }
//! }
//! ```
//!
//! Context-free grammars can then be normalized with the [`CnfConverter`] or the individual
//! passes in [`cnf`].

mod builder;
mod cfg;
mod classify;
pub mod cnf;

pub use builder::*;
pub use cfg::*;
pub use classify::ChomskyType;
pub use cnf::{normalize_to_cnf, CnfConverter};

pub(crate) use cfg::format_rhs;
