use std::fmt::{Display, Formatter, Result as FmtResult};

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::grammar::{ChomskyType, GrammarBuilder};

/// A non-terminal, identified by its name.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct NonTerminal(String);

impl NonTerminal {
    /// Create a non-terminal with the given name.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// The name of this non-terminal.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// A terminal, identified by its content.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Terminal(String);

impl Terminal {
    /// Create a terminal with the given content.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// The content of this terminal.
    pub fn content(&self) -> &str {
        &self.0
    }
}

/// A symbol on the right-hand side of a production.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum Symbol {
    /// A terminal
    Terminal(Terminal),

    /// A non-terminal
    NonTerminal(NonTerminal),
}

impl Symbol {
    /// Shorthand for `Symbol::Terminal(Terminal::new(s))`.
    pub fn terminal<S: Into<String>>(s: S) -> Self {
        Symbol::Terminal(Terminal::new(s))
    }

    /// Shorthand for `Symbol::NonTerminal(NonTerminal::new(s))`.
    pub fn non_terminal<S: Into<String>>(s: S) -> Self {
        Symbol::NonTerminal(NonTerminal::new(s))
    }

    /// The identifier of the symbol, regardless of its kind.
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(term) => term.content(),
            Symbol::NonTerminal(nonterm) => nonterm.id(),
        }
    }

    /// Returns the non-terminal if this symbol is one.
    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(nonterm) => Some(nonterm),
            Symbol::Terminal(_) => None,
        }
    }

    /// Returns the terminal if this symbol is one.
    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Symbol::Terminal(term) => Some(term),
            Symbol::NonTerminal(_) => None,
        }
    }
}

/// The right-hand side of a production. The empty sequence is ε.
pub type Rhs = Vec<Symbol>;

/// A production, borrowed from a [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionRule<'a> {
    lhs: &'a NonTerminal,
    rhs: &'a [Symbol],
}

impl<'a> ProductionRule<'a> {
    /// The left-hand side of the rule.
    pub fn lhs(&self) -> &'a NonTerminal {
        self.lhs
    }

    /// The right-hand side of the rule. Empty for ε-productions.
    pub fn rhs(&self) -> &'a [Symbol] {
        self.rhs
    }

    /// `A -> B` where `B` is a non-terminal.
    pub fn is_unit(&self) -> bool {
        matches!(self.rhs, [Symbol::NonTerminal(_)])
    }

    /// `A -> ε`.
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

/// A context-free grammar: non-terminals, terminals, productions and a start symbol.
///
/// Values of this type can only be created through a [`GrammarBuilder`] or by one of the
/// transformations in this crate, so every symbol mentioned in a production is declared,
/// terminals and non-terminals are disjoint and the entrypoint is a non-terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    non_terminals: IndexSet<NonTerminal>,
    terminals: IndexSet<Terminal>,
    productions: IndexMap<NonTerminal, IndexSet<Rhs>>,
    entrypoint: NonTerminal,
}

impl Grammar {
    /// Get a [`GrammarBuilder`] to assemble a grammar.
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Assemble a grammar from parts that are already known to be consistent.
    /// Every non-terminal gets an entry in the production map, even if it has no productions.
    pub(crate) fn from_parts(
        non_terminals: IndexSet<NonTerminal>,
        terminals: IndexSet<Terminal>,
        mut productions: IndexMap<NonTerminal, IndexSet<Rhs>>,
        entrypoint: NonTerminal,
    ) -> Self {
        debug_assert!(non_terminals.contains(&entrypoint));

        productions.retain(|lhs, _| non_terminals.contains(lhs));
        let mut ordered = IndexMap::with_capacity(non_terminals.len());

        for nonterm in &non_terminals {
            let alternatives = productions.swap_remove(nonterm).unwrap_or_default();
            ordered.insert(nonterm.clone(), alternatives);
        }

        Self {
            non_terminals,
            terminals,
            productions: ordered,
            entrypoint,
        }
    }

    /// The start symbol.
    pub fn entrypoint(&self) -> &NonTerminal {
        &self.entrypoint
    }

    /// All non-terminals in declaration order.
    pub fn non_terminals(&self) -> &IndexSet<NonTerminal> {
        &self.non_terminals
    }

    /// All terminals in declaration order.
    pub fn terminals(&self) -> &IndexSet<Terminal> {
        &self.terminals
    }

    /// The production map. Every non-terminal has an entry.
    pub fn production_map(&self) -> &IndexMap<NonTerminal, IndexSet<Rhs>> {
        &self.productions
    }

    /// The alternatives of a single non-terminal.
    pub fn productions(&self, nonterm: &NonTerminal) -> Option<&IndexSet<Rhs>> {
        self.productions.get(nonterm)
    }

    /// Iterate over all production rules.
    pub fn rules(&self) -> impl Iterator<Item = ProductionRule<'_>> {
        self.productions.iter().flat_map(|(lhs, alternatives)| {
            alternatives.iter().map(move |rhs| ProductionRule {
                lhs,
                rhs: rhs.as_slice(),
            })
        })
    }

    /// Total number of production rules.
    pub fn rule_count(&self) -> usize {
        self.productions.values().map(IndexSet::len).sum()
    }

    /// Check whether `rhs` is a production of `nonterm`.
    pub fn has_rule(&self, nonterm: &NonTerminal, rhs: &[Symbol]) -> bool {
        self.productions.get(nonterm).is_some_and(|alternatives| alternatives.contains(rhs))
    }

    /// Resolve an identifier to the symbol it names in this grammar.
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        let nonterm = NonTerminal::new(name);

        if self.non_terminals.contains(&nonterm) {
            return Some(Symbol::NonTerminal(nonterm));
        }

        let term = Terminal::new(name);

        if self.terminals.contains(&term) {
            Some(Symbol::Terminal(term))
        } else {
            None
        }
    }

    /// Every production is of the form `A -> a`, `A -> a B` or `A -> ε`.
    pub fn is_right_linear(&self) -> bool {
        self.classify() == ChomskyType::Regular
    }
}

impl Display for NonTerminal {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.id())
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.content())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

pub(crate) fn format_rhs(rhs: &[Symbol]) -> String {
    if rhs.is_empty() {
        "ε".to_string()
    } else {
        rhs.iter().join(" ")
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "Entrypoint: {}", self.entrypoint)?;
        writeln!(f, "Non-terminals: {{{}}}", self.non_terminals.iter().join(", "))?;
        writeln!(f, "Terminals: {{{}}}", self.terminals.iter().join(", "))?;
        writeln!(f, "Rules:")?;

        for (lhs, alternatives) in &self.productions {
            if alternatives.is_empty() {
                continue;
            }

            writeln!(f, "  {} -> {}", lhs, alternatives.iter().map(|rhs| format_rhs(rhs)).join(" | "))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant() -> Grammar {
        Grammar::builder()
            .non_terminals(["S", "A", "B"])
            .terminals(["a", "b", "c"])
            .rules("S", ["aA", "bB"])
            .rules("A", ["bS", "cA", "aB"])
            .rules("B", ["aB", "b"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_symbol_lookup() {
        let grammar = variant();
        assert_eq!(grammar.symbol("S"), Some(Symbol::non_terminal("S")));
        assert_eq!(grammar.symbol("c"), Some(Symbol::terminal("c")));
        assert_eq!(grammar.symbol("z"), None);
    }

    #[test]
    fn test_rules() {
        let grammar = variant();
        assert_eq!(grammar.rule_count(), 7);
        assert!(grammar.has_rule(&NonTerminal::new("B"), &[Symbol::terminal("b")]));
        assert!(grammar.rules().all(|rule| !rule.is_unit() && !rule.is_epsilon()));
        assert!(grammar.is_right_linear());
    }

    #[test]
    fn test_display() {
        let grammar = variant();
        let text = grammar.to_string();
        assert!(text.contains("S -> a A | b B"));
        assert!(text.contains("B -> a B | b"));
    }
}
