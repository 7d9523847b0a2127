use std::path::Path;

use indexmap::{IndexMap, IndexSet};

use crate::{
    parser::grammar as grammar_format,
    grammar::{Grammar, NonTerminal, Rhs, Symbol, Terminal},
    error::{ParsingError, GrammarError},
};

/// The default non-terminal that is used as an entrypoint to the grammar
pub const DEFAULT_ENTRYPOINT: &str = "S";

/// Written in a compact right-hand side to denote the empty word.
pub const EPSILON: &str = "ε";

/// The GrammarBuilder collects symbol declarations and production rules and
/// returns a validated [`Grammar`].
///
/// Use it like so:
/// ```
/// use formlang::grammar::Grammar;
///
/// // Rules can be given in compact form where every character is one symbol
/// let grammar = Grammar::builder()
///     .non_terminals(["S", "A"])
///     .terminals(["a", "b"])
///     .rules("S", ["aA", "b"])
///     // or as a sequence of identifiers
///     .rule("A", ["b", "S"])
///     .build()
///     .unwrap();
/// assert_eq!(grammar.rule_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    non_terminals: IndexSet<String>,
    terminals: IndexSet<String>,
    rules: Vec<(String, Vec<String>)>,
    entrypoint: String,
}

impl GrammarBuilder {
    pub(crate) fn new() -> Self {
        Self {
            non_terminals: IndexSet::new(),
            terminals: IndexSet::new(),
            rules: Vec::new(),
            entrypoint: DEFAULT_ENTRYPOINT.to_string(),
        }
    }

    fn check_ambiguous(&self) -> Option<String> {
        self.non_terminals
            .iter()
            .find(|name| self.terminals.contains(*name))
            .cloned()
    }

    fn symbol_table(&self) -> IndexMap<&str, Symbol> {
        let mut table = IndexMap::with_capacity(self.non_terminals.len() + self.terminals.len());

        for name in &self.non_terminals {
            table.insert(name.as_str(), Symbol::non_terminal(name.as_str()));
        }

        for name in &self.terminals {
            table.insert(name.as_str(), Symbol::terminal(name.as_str()));
        }

        table
    }
}

impl GrammarBuilder {
    /// Declare a non-terminal.
    pub fn non_terminal<S: Into<String>>(mut self, name: S) -> Self {
        self.non_terminals.insert(name.into());
        self
    }

    /// Declare several non-terminals.
    pub fn non_terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_terminals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare a terminal.
    pub fn terminal<S: Into<String>>(mut self, name: S) -> Self {
        self.terminals.insert(name.into());
        self
    }

    /// Declare several terminals.
    pub fn terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add the production `lhs -> rhs` where `rhs` is a sequence of symbol identifiers.
    /// An empty sequence is an ε-production.
    pub fn rule<L, I, S>(mut self, lhs: L, rhs: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push((lhs.into(), rhs.into_iter().map(Into::into).collect()));
        self
    }

    /// Add productions for `lhs` in compact form: every character of an alternative is
    /// one symbol, and `"ε"` or `""` denote the empty right-hand side.
    pub fn rules<L, I, S>(mut self, lhs: L, alternatives: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lhs = lhs.into();

        for alternative in alternatives {
            let alternative = alternative.as_ref();
            let rhs = if alternative == EPSILON {
                Vec::new()
            } else {
                alternative.chars().map(String::from).collect()
            };
            self.rules.push((lhs.clone(), rhs));
        }

        self
    }

    /// Load a grammar from disk that is in the JSON grammar format. Symbols are declared
    /// implicitly: keys and `<...>` strings are non-terminals, everything else is a terminal.
    pub fn json_grammar<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ParsingError> {
        for (lhs, rhs) in grammar_format::parse_json(path.as_ref())? {
            for symbol in &rhs {
                match symbol {
                    Symbol::Terminal(term) => self.terminals.insert(term.content().to_string()),
                    Symbol::NonTerminal(nonterm) => self.non_terminals.insert(nonterm.id().to_string()),
                };
            }

            self.non_terminals.insert(lhs.id().to_string());
            self.rules.push((
                lhs.id().to_string(),
                rhs.iter().map(|symbol| symbol.name().to_string()).collect(),
            ));
        }

        Ok(self)
    }

    /// Set the start symbol. Defaults to [`DEFAULT_ENTRYPOINT`].
    pub fn entrypoint<S: Into<String>>(mut self, entrypoint: S) -> Self {
        self.entrypoint = entrypoint.into();
        self
    }

    /// Create a [`Grammar`].
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if let Some(name) = self.check_ambiguous() {
            return Err(GrammarError::AmbiguousSymbol(name));
        }

        if !self.non_terminals.contains(&self.entrypoint) {
            return Err(GrammarError::MissingEntrypoint(self.entrypoint));
        }

        let table = self.symbol_table();
        let mut productions = IndexMap::<NonTerminal, IndexSet<Rhs>>::new();

        for (lhs, rhs) in &self.rules {
            let lhs = match table.get(lhs.as_str()) {
                Some(Symbol::NonTerminal(nonterm)) => nonterm.clone(),
                Some(Symbol::Terminal(_)) => {
                    return Err(GrammarError::MalformedGrammar(format!("The left-hand side '{}' is a terminal", lhs)));
                },
                None => {
                    return Err(GrammarError::MalformedGrammar(format!("The left-hand side '{}' is not declared", lhs)));
                },
            };

            let mut symbols = Rhs::with_capacity(rhs.len());

            for name in rhs {
                match table.get(name.as_str()) {
                    Some(symbol) => symbols.push(symbol.clone()),
                    None => {
                        return Err(GrammarError::MalformedGrammar(format!(
                            "'{}' in a production of '{}' is neither a terminal nor a non-terminal",
                            name, lhs
                        )));
                    },
                }
            }

            productions.entry(lhs).or_default().insert(symbols);
        }

        let non_terminals = self.non_terminals.into_iter().map(NonTerminal::new).collect();
        let terminals = self.terminals.into_iter().map(Terminal::new).collect();

        Ok(Grammar::from_parts(
            non_terminals,
            terminals,
            productions,
            NonTerminal::new(self.entrypoint),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_symbol() {
        let err = Grammar::builder()
            .non_terminals(["S"])
            .terminals(["a"])
            .rules("S", ["aX"])
            .build()
            .unwrap_err();
        assert!(matches!(err, GrammarError::MalformedGrammar(_)));
    }

    #[test]
    fn test_terminal_lhs() {
        let err = Grammar::builder()
            .non_terminals(["S"])
            .terminals(["a"])
            .rules("S", ["a"])
            .rules("a", ["S"])
            .build()
            .unwrap_err();
        assert!(matches!(err, GrammarError::MalformedGrammar(_)));
    }

    #[test]
    fn test_missing_entrypoint() {
        let err = Grammar::builder()
            .non_terminals(["A"])
            .terminals(["a"])
            .rules("A", ["a"])
            .build()
            .unwrap_err();
        assert_eq!(err, GrammarError::MissingEntrypoint("S".to_string()));

        let grammar = Grammar::builder()
            .non_terminals(["A"])
            .terminals(["a"])
            .rules("A", ["a"])
            .entrypoint("A")
            .build()
            .unwrap();
        assert_eq!(grammar.entrypoint().id(), "A");
    }

    #[test]
    fn test_ambiguous_symbol() {
        let err = Grammar::builder()
            .non_terminals(["S", "a"])
            .terminals(["a"])
            .build()
            .unwrap_err();
        assert_eq!(err, GrammarError::AmbiguousSymbol("a".to_string()));
    }

    #[test]
    fn test_epsilon_and_multichar() {
        let grammar = Grammar::builder()
            .non_terminals(["S", "Expr"])
            .terminals(["num", "+"])
            .rule("S", ["Expr"])
            .rule("Expr", ["num", "+", "Expr"])
            .rule("Expr", ["num"])
            .rules("S", [EPSILON, ""])
            .build()
            .unwrap();

        let start = NonTerminal::new("S");
        assert!(grammar.has_rule(&start, &[]));
        assert!(grammar.has_rule(&start, &[Symbol::non_terminal("Expr")]));
        assert_eq!(grammar.productions(&start).unwrap().len(), 2);
        assert_eq!(grammar.productions(&NonTerminal::new("Expr")).unwrap().len(), 2);
    }

    #[test]
    fn test_json_grammar() {
        let grammar = Grammar::builder()
            .json_grammar("test-data/grammars/variant.json")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(grammar.non_terminals().len(), 3);
        assert_eq!(grammar.terminals().len(), 3);
        assert_eq!(grammar.rule_count(), 7);
    }
}
