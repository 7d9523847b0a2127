//! Finite automata and the determinization engine.
//!
//! An automaton is either assembled with an [`AutomatonBuilder`], loaded from a JSON file,
//! or produced by [`grammar_to_automaton`](crate::convert::grammar_to_automaton):
//! ```
//! use formlang::automaton::{determinize, FiniteAutomaton};
//!
//! let nfa = FiniteAutomaton::builder()
//!     .json_automaton("test-data/automata/nfa.json").unwrap()
//!     .build().unwrap();
//! let dfa = determinize(&nfa);
//! assert!(dfa.is_deterministic());
//! assert!(dfa.accepts_str("abb"));
//! ```

mod fa;
mod state;
mod subset;

pub use fa::{AutomatonBuilder, FiniteAutomaton};
pub use state::{StateId, StateSet, SymbolId, EPSILON, EPSILON_LABEL};
pub use subset::{determinize, epsilon_closure, is_deterministic};

pub use crate::parser::automaton::AutomatonDescription;
