//! Generate sentences by interpreting the rules of the grammar.
//!
//! Use it like so:
//! ```
//! use formlang::{backends::interpreter::GrammarInterpreter, grammar::Grammar};
//!
//! // First, load a grammar from disk
//! let grammar = Grammar::builder()
//!     .json_grammar("test-data/grammars/variant.json").unwrap()
//!     .build().unwrap();
//!
//! // Then, generate one sentence and write it to a specified stream.
//! let mut stream = Vec::new();
//! GrammarInterpreter::new(&grammar).interpret(&mut stream).unwrap();
//! assert!(!stream.is_empty());
//! ```

use std::io::Write;

use crate::{
    error::GenerationError,
    grammar::{Grammar, Symbol},
};

const DEFAULT_SEED: usize = 0xDEADBEEF;

/// Number of non-terminal expansions after which [`GrammarInterpreter::interpret`] gives up.
pub const DEFAULT_MAX_EXPANSIONS: usize = 10_000;

/// The GrammarInterpreter interprets the rules of a grammar to generate sentences.
pub struct GrammarInterpreter<'a> {
    grammar: &'a Grammar,
    seed: usize,
    max_expansions: usize,
    stack: Vec<&'a Symbol>,
}

impl<'a> GrammarInterpreter<'a> {
    /// Create a new GrammarInterpreter.
    pub fn new(grammar: &'a Grammar) -> Self {
        Self {
            grammar,
            seed: DEFAULT_SEED,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            stack: Vec::with_capacity(4096),
        }
    }

    /// Seed the RNG of the GrammarInterpreter.
    pub fn seed(&mut self, seed: usize) {
        if seed == 0 {
            self.seed = DEFAULT_SEED;
        } else {
            self.seed = seed;
        }
    }

    /// Limit the number of non-terminal expansions per sentence.
    pub fn max_expansions(&mut self, max_expansions: usize) {
        self.max_expansions = max_expansions;
    }

    fn next_rand(&mut self) -> usize {
        let mut x = self.seed;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.seed = x;
        x
    }

    /// Generate one sentence and write it to the given output stream `stream`.
    /// Returns the number of bytes written to `stream`.
    pub fn interpret<S: Write>(&mut self, stream: &mut S) -> Result<usize, GenerationError> {
        let grammar = self.grammar;
        let mut generated = 0;
        let mut expansions = 0;

        self.stack.clear();
        let entrypoint = Symbol::NonTerminal(grammar.entrypoint().clone());

        // The entrypoint is owned by this frame, so it is expanded before entering the loop
        let mut pending = Some(&entrypoint);

        loop {
            let symbol = match pending.take().or_else(|| self.stack.pop()) {
                Some(symbol) => symbol,
                None => break,
            };

            match symbol {
                Symbol::Terminal(term) => {
                    let term = term.content().as_bytes();
                    generated += term.len();
                    stream.write_all(term)?;
                },
                Symbol::NonTerminal(nonterm) => {
                    if expansions >= self.max_expansions {
                        self.stack.clear();
                        return Err(GenerationError::ExpansionLimit(self.max_expansions));
                    }
                    expansions += 1;

                    let alternatives = match grammar.productions(nonterm) {
                        Some(alternatives) if !alternatives.is_empty() => alternatives,
                        _ => {
                            self.stack.clear();
                            return Err(GenerationError::NoProductions(nonterm.id().to_string()));
                        },
                    };

                    let rand = self.next_rand();

                    if let Some(rule) = alternatives.get_index(rand % alternatives.len()) {
                        self.stack.extend(rule.iter().rev());
                    }
                },
            }
        }

        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant() -> Grammar {
        Grammar::builder()
            .json_grammar("test-data/grammars/variant.json")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_interpreter() {
        let grammar = variant();
        let automaton = crate::convert::grammar_to_automaton(&grammar).unwrap();
        let mut interpreter = GrammarInterpreter::new(&grammar);
        interpreter.seed(1238);

        for _ in 0..50 {
            let mut buf = Vec::new();
            let len = interpreter.interpret(&mut buf).unwrap();
            assert_eq!(len, buf.len());

            let sentence = String::from_utf8(buf).unwrap();
            assert!(automaton.accepts_str(&sentence), "{}", sentence);
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let grammar = variant();
        let mut a = GrammarInterpreter::new(&grammar);
        let mut b = GrammarInterpreter::new(&grammar);
        a.seed(42);
        b.seed(42);

        for _ in 0..10 {
            let (mut x, mut y) = (Vec::new(), Vec::new());
            a.interpret(&mut x).unwrap();
            b.interpret(&mut y).unwrap();
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_expansion_limit() {
        let grammar = Grammar::builder()
            .non_terminals(["S"])
            .terminals(["a"])
            .rules("S", ["aS"])
            .build()
            .unwrap();
        let mut interpreter = GrammarInterpreter::new(&grammar);
        interpreter.max_expansions(100);
        let err = interpreter.interpret(&mut std::io::sink()).unwrap_err();
        assert!(matches!(err, GenerationError::ExpansionLimit(100)));
    }

    #[test]
    fn test_no_productions() {
        let grammar = Grammar::builder()
            .non_terminals(["S", "A"])
            .terminals(["a"])
            .rules("S", ["aA"])
            .build()
            .unwrap();
        let err = GrammarInterpreter::new(&grammar).interpret(&mut std::io::sink()).unwrap_err();
        assert!(matches!(err, GenerationError::NoProductions(name) if name == "A"));
    }
}
