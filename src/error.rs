//! Errors surfaced by the library.
//!
//! Construction errors ([`GrammarError`], [`AutomatonError`]) are raised once, when an entity
//! is built. The transformation passes operate on entities that already passed these checks,
//! so only the conversions have a failure mode of their own ([`ConversionError`]).

use std::path::PathBuf;
use thiserror::Error;

/// A grammar or automaton file could not be loaded.
#[derive(Debug, Error)]
pub struct ParsingError {
    path: PathBuf,
    msg: String,
}

impl ParsingError {
    pub(crate) fn new<P: Into<PathBuf>, S: Into<String>>(path: P, msg: S) -> Self {
        Self {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// The file that failed to load.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl std::fmt::Display for ParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParsingError in {}: {}", self.path.display(), self.msg)
    }
}

/// Errors raised while building a [`Grammar`](crate::grammar::Grammar).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    /// The start symbol is not a declared non-terminal
    #[error("The grammar does not contain the entrypoint '{0}' as a non-terminal")]
    MissingEntrypoint(String),

    /// A production references a symbol that is neither a terminal nor a non-terminal,
    /// or a left-hand side is not a non-terminal
    #[error("Malformed grammar: {0}")]
    MalformedGrammar(String),

    /// An identifier was declared as a terminal and as a non-terminal
    #[error("The symbol '{0}' is declared both as terminal and as non-terminal")]
    AmbiguousSymbol(String),
}

/// Errors raised by the grammar↔automaton conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// The input violates the shape precondition of the conversion
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),
}

/// Errors raised while building or traversing a
/// [`FiniteAutomaton`](crate::automaton::FiniteAutomaton).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AutomatonError {
    /// A transition, the start, the sink or an accepting state names an undeclared state
    #[error("The state '{0}' is referenced but never declared")]
    UnknownState(String),

    /// A transition or an input word uses a symbol outside of the alphabet
    #[error("The symbol '{0}' is not part of the alphabet")]
    UnknownSymbol(String),

    /// No start state was given
    #[error("The automaton has no start state")]
    MissingStart,

    /// The current states have no move on the next input symbol.
    /// Membership tests treat this as an ordinary rejection.
    #[error("No transition from {states} on '{symbol}'")]
    UndefinedTransition {
        /// The states the automaton was in, rendered as `{q0,q1}`
        states: String,
        /// The input symbol that could not be consumed
        symbol: String,
    },
}

/// Errors raised by the [`GrammarInterpreter`](crate::backends::interpreter::GrammarInterpreter).
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Writing to the output stream failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The derivation did not terminate within the configured number of expansions
    #[error("Gave up after {0} expansions")]
    ExpansionLimit(usize),

    /// A non-terminal without any production was expanded
    #[error("The non-terminal '{0}' has no productions")]
    NoProductions(String),
}

pub use crate::lexer::LexError;
pub use crate::pattern::PatternError;
