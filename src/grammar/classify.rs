use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::grammar::{Grammar, Symbol};

/// The most specific class of the Chomsky hierarchy a [`Grammar`] belongs to.
///
/// Left-hand sides are always a single non-terminal, so every grammar is at least context-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChomskyType {
    /// Type-3: every production is `A -> a`, `A -> a B` or `A -> ε`
    Regular,

    /// Type-2
    ContextFree,
}

impl Grammar {
    /// Classify this grammar in the Chomsky hierarchy.
    pub fn classify(&self) -> ChomskyType {
        let regular = self.rules().all(|rule| {
            matches!(
                rule.rhs(),
                [] | [Symbol::Terminal(_)] | [Symbol::Terminal(_), Symbol::NonTerminal(_)]
            )
        });

        if regular {
            ChomskyType::Regular
        } else {
            ChomskyType::ContextFree
        }
    }
}

impl Display for ChomskyType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            ChomskyType::Regular => write!(f, "Type-3 (Regular)"),
            ChomskyType::ContextFree => write!(f, "Type-2 (Context-Free)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let regular = Grammar::builder()
            .json_grammar("test-data/grammars/variant.json")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(regular.classify(), ChomskyType::Regular);
        assert_eq!(regular.classify().to_string(), "Type-3 (Regular)");

        let context_free = Grammar::builder()
            .json_grammar("test-data/grammars/cnf.json")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(context_free.classify(), ChomskyType::ContextFree);
    }
}
