//! Conversions between right-linear grammars and finite automata.
//!
//! ```
//! use formlang::{convert::{automaton_to_grammar, grammar_to_automaton}, grammar::Grammar};
//!
//! let grammar = Grammar::builder()
//!     .non_terminals(["S", "A"])
//!     .terminals(["a", "b"])
//!     .rules("S", ["aA"])
//!     .rules("A", ["bS", "b"])
//!     .build()
//!     .unwrap();
//! let automaton = grammar_to_automaton(&grammar).unwrap();
//! assert!(automaton.accepts_str("abab"));
//!
//! let back = automaton_to_grammar(&automaton).unwrap();
//! assert!(back.is_right_linear());
//! ```

use indexmap::IndexSet;

use crate::{
    automaton::{FiniteAutomaton, StateId, SymbolId, EPSILON},
    error::ConversionError,
    grammar::{format_rhs, Grammar, NonTerminal, Symbol},
};

/// Name of the accept sink unless a non-terminal already uses it.
pub const SINK_NAME: &str = "X";

fn sink_name(grammar: &Grammar) -> String {
    let mut name = SINK_NAME.to_string();

    while grammar.non_terminals().contains(&NonTerminal::new(name.as_str())) {
        name.push('\'');
    }

    name
}

fn mismatch(lhs: &NonTerminal, rhs: &[Symbol], reason: &str) -> ConversionError {
    ConversionError::StructuralMismatch(format!("{} -> {}: {}", lhs, format_rhs(rhs), reason))
}

/// Collects the transitions of the automaton under construction.
struct Emitter<'a> {
    grammar: &'a Grammar,
    automaton: FiniteAutomaton,
    sink: StateId,
}

impl<'a> Emitter<'a> {
    fn state(&self, nonterm: &NonTerminal) -> StateId {
        // Non-terminals occupy the first indices in declaration order
        self.grammar.non_terminals().get_index_of(nonterm).unwrap_or_default() as StateId
    }

    fn symbol(&self, term: &Symbol) -> SymbolId {
        self.automaton.symbol_id(term.name()).unwrap_or(EPSILON)
    }

    /// Emit the transitions of `source` for the production `lhs -> rhs`.
    /// Returns the non-terminal of a unit production instead of emitting anything.
    fn emit<'g>(
        &mut self,
        source: StateId,
        lhs: &NonTerminal,
        rhs: &'g [Symbol],
    ) -> Result<Option<&'g NonTerminal>, ConversionError> {
        match rhs {
            [] => self.automaton.add_accepting(source),
            [term @ Symbol::Terminal(_)] => {
                let symbol = self.symbol(term);
                self.automaton.add_transition(source, symbol, self.sink);
            },
            [Symbol::NonTerminal(next)] => return Ok(Some(next)),
            [term @ Symbol::Terminal(_), Symbol::NonTerminal(next)] => {
                let symbol = self.symbol(term);
                let target = self.state(next);
                self.automaton.add_transition(source, symbol, target);
            },
            [_, _] => return Err(mismatch(lhs, rhs, "expected a terminal followed by a non-terminal")),
            _ => return Err(mismatch(lhs, rhs, "right-hand side is longer than two symbols")),
        }

        Ok(None)
    }
}

/// Build a finite automaton that accepts the language of a right-linear grammar.
///
/// Every non-terminal becomes a state, plus an accepting sink named [`SINK_NAME`]
/// (with primes appended if that name is taken). `A -> a B` becomes a transition from `A` to `B`
/// on `a`, `A -> a` a transition into the sink and `A -> ε` makes `A` accepting.
/// A unit production `A -> B` is resolved by copying the productions of `B` into `A`, but only
/// one level deep: unit productions of `B` are skipped with a warning.
pub fn grammar_to_automaton(grammar: &Grammar) -> Result<FiniteAutomaton, ConversionError> {
    if grammar.productions(grammar.entrypoint()).map_or(true, |alternatives| alternatives.is_empty()) {
        return Err(ConversionError::StructuralMismatch(format!(
            "The start symbol '{}' has no productions",
            grammar.entrypoint()
        )));
    }

    let sink = sink_name(grammar);
    let mut states: IndexSet<String> = grammar.non_terminals().iter().map(|nonterm| nonterm.id().to_string()).collect();
    states.insert(sink);
    let sink = (states.len() - 1) as StateId;

    let alphabet = grammar.terminals().iter().map(|term| term.content().to_string()).collect();
    let start = grammar.non_terminals().get_index_of(grammar.entrypoint()).unwrap_or_default() as StateId;

    let mut automaton = FiniteAutomaton::with_states(states, alphabet, start);
    automaton.set_sink(sink);

    let mut emitter = Emitter {
        grammar,
        automaton,
        sink,
    };

    for rule in grammar.rules() {
        let source = emitter.state(rule.lhs());

        let Some(unit) = emitter.emit(source, rule.lhs(), rule.rhs())? else {
            continue;
        };

        for rhs in grammar.productions(unit).into_iter().flatten() {
            if let Some(nested) = emitter.emit(source, unit, rhs)? {
                tracing::warn!(
                    "Skipping unit production {} -> {} reached through {} -> {}",
                    unit,
                    nested,
                    rule.lhs(),
                    unit
                );
            }
        }
    }

    Ok(emitter.automaton)
}

/// Build a right-linear grammar for the language of a finite automaton.
///
/// Every state except the sink becomes a non-terminal and every symbol a terminal.
/// A transition `(s, a, t)` becomes `s -> a t`, or `s -> a` if `t` is the sink. Transitions into
/// other accepting states produce both forms and an accepting start state produces `start -> ε`.
/// Such transitions therefore yield two productions instead of one, which keeps the language of
/// automata that were not built by [`grammar_to_automaton`].
///
/// Automata with ε-transitions have no such grammar; run
/// [`determinize`](crate::automaton::determinize) first.
pub fn automaton_to_grammar(automaton: &FiniteAutomaton) -> Result<Grammar, ConversionError> {
    if automaton.has_epsilon_transitions() {
        return Err(ConversionError::StructuralMismatch(
            "ε-transitions have no right-linear production form".to_string(),
        ));
    }

    let sink = automaton.sink_id();

    if sink == Some(automaton.start_id()) {
        return Err(ConversionError::StructuralMismatch("The start state is the sink".to_string()));
    }

    let mut builder = Grammar::builder()
        .non_terminals(
            automaton
                .states()
                .iter()
                .enumerate()
                .filter(|(idx, _)| Some(*idx as StateId) != sink)
                .map(|(_, name)| name.as_str()),
        )
        .terminals(automaton.alphabet().iter().map(String::as_str))
        .entrypoint(automaton.start());

    for (src, sym, dst) in automaton.transition_ids() {
        if Some(src) == sink {
            return Err(ConversionError::StructuralMismatch("The sink has outgoing transitions".to_string()));
        }

        let (Some(lhs), Some(symbol), Some(target)) =
            (automaton.state_name(src), automaton.symbol_name(sym), automaton.state_name(dst))
        else {
            continue;
        };

        if Some(dst) == sink {
            builder = builder.rule(lhs, [symbol]);
            continue;
        }

        builder = builder.rule(lhs, [symbol, target]);

        if automaton.accepting().contains(dst) {
            builder = builder.rule(lhs, [symbol]);
        }
    }

    if automaton.accepting().contains(automaton.start_id()) {
        builder = builder.rule(automaton.start(), Vec::<String>::new());
    }

    builder.build().map_err(|e| ConversionError::StructuralMismatch(e.to_string()))
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
    fn test_variant_automaton() {
        let automaton = grammar_to_automaton(&variant()).unwrap();

        assert_eq!(automaton.num_states(), 4);
        assert_eq!(automaton.sink(), Some("X"));
        assert_eq!(automaton.start(), "S");
        assert!(automaton.is_deterministic());

        for word in ["aab", "acab", "abaab", "bb", "bab"] {
            assert!(automaton.accepts_str(word), "{}", word);
        }

        for word in ["", "ac", "aabb", "ba", "abc"] {
            assert!(!automaton.accepts_str(word), "{}", word);
        }
    }

    #[test]
    fn test_sink_name_clash() {
        let grammar = Grammar::builder()
            .non_terminals(["S", "X"])
            .terminals(["a"])
            .rules("S", ["aX"])
            .rules("X", ["a"])
            .build()
            .unwrap();
        let automaton = grammar_to_automaton(&grammar).unwrap();
        assert_eq!(automaton.sink(), Some("X'"));
        assert!(automaton.accepts_str("aa"));
        assert!(!automaton.accepts_str("a"));
    }

    #[test]
    fn test_epsilon_and_unit() {
        let grammar = Grammar::builder()
            .non_terminals(["S", "A", "B"])
            .terminals(["a", "b"])
            .rules("S", ["A", "bS"])
            .rules("A", ["aA", "ε", "B"])
            .rules("B", ["b"])
            .build()
            .unwrap();
        let automaton = grammar_to_automaton(&grammar).unwrap();

        // S inherits `A -> ε` and `A -> aA` but not the nested `A -> B`
        assert!(automaton.is_accepting("S"));
        assert!(automaton.is_accepting("A"));
        assert!(automaton.accepts_str(""));
        assert!(automaton.accepts_str("b"));
        assert!(automaton.accepts_str("bbaa"));
        assert!(automaton.accepts_str("ab"));
        assert!(!automaton.accepts_str("aba"));
    }

    #[test]
    fn test_nested_unit_is_skipped() {
        let grammar = Grammar::builder()
            .non_terminals(["S", "A", "B"])
            .terminals(["a", "b"])
            .rules("S", ["A", "a"])
            .rules("A", ["B"])
            .rules("B", ["b"])
            .build()
            .unwrap();
        let automaton = grammar_to_automaton(&grammar).unwrap();

        assert!(automaton.accepts_str("a"));
        assert!(!automaton.accepts_str("b"));
    }

    #[test]
    fn test_structural_mismatch() {
        let long = Grammar::builder()
            .non_terminals(["S"])
            .terminals(["a"])
            .rules("S", ["aaS"])
            .build()
            .unwrap();
        assert!(matches!(grammar_to_automaton(&long), Err(ConversionError::StructuralMismatch(_))));

        let left_linear = Grammar::builder()
            .non_terminals(["S"])
            .terminals(["a"])
            .rules("S", ["Sa", "a"])
            .build()
            .unwrap();
        assert!(matches!(grammar_to_automaton(&left_linear), Err(ConversionError::StructuralMismatch(_))));

        let empty = Grammar::builder()
            .non_terminals(["S", "A"])
            .terminals(["a"])
            .rules("A", ["a"])
            .build()
            .unwrap();
        assert!(matches!(grammar_to_automaton(&empty), Err(ConversionError::StructuralMismatch(_))));
    }

    #[test]
    fn test_automaton_to_grammar() {
        let nfa = FiniteAutomaton::builder()
            .json_automaton("test-data/automata/nfa.json")
            .unwrap()
            .build()
            .unwrap();
        let grammar = automaton_to_grammar(&nfa).unwrap();

        assert!(grammar.is_right_linear());
        assert_eq!(grammar.entrypoint().id(), "q0");
        assert_eq!(grammar.non_terminals().len(), 4);

        let q1 = NonTerminal::new("q1");
        assert!(grammar.has_rule(&q1, &[Symbol::terminal("a"), Symbol::non_terminal("q3")]));
        assert!(grammar.has_rule(&q1, &[Symbol::terminal("a")]));
        assert!(!grammar.has_rule(&q1, &[Symbol::terminal("b")]));
    }

    #[test]
    fn test_accepting_target_yields_two_rules() {
        let dfa = FiniteAutomaton::builder()
            .states(["p", "q"])
            .alphabet(["a"])
            .transition("p", "a", "q")
            .transition("q", "a", "q")
            .start("p")
            .accepting(["q"])
            .build()
            .unwrap();
        let grammar = automaton_to_grammar(&dfa).unwrap();

        assert_eq!(dfa.transitions().count(), 2);
        assert_eq!(grammar.rule_count(), 4);

        for lhs in ["p", "q"] {
            let lhs = NonTerminal::new(lhs);
            assert!(grammar.has_rule(&lhs, &[Symbol::terminal("a"), Symbol::non_terminal("q")]));
            assert!(grammar.has_rule(&lhs, &[Symbol::terminal("a")]));
        }
    }

    #[test]
    fn test_automaton_to_grammar_errors() {
        let epsilon = FiniteAutomaton::builder()
            .json_automaton("test-data/automata/epsilon.json")
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(automaton_to_grammar(&epsilon), Err(ConversionError::StructuralMismatch(_))));

        let sink_start = FiniteAutomaton::builder()
            .states(["X"])
            .alphabet(["a"])
            .start("X")
            .sink("X")
            .build()
            .unwrap();
        assert!(matches!(automaton_to_grammar(&sink_start), Err(ConversionError::StructuralMismatch(_))));

        let clash = FiniteAutomaton::builder()
            .states(["a", "b"])
            .alphabet(["a"])
            .transition("a", "a", "b")
            .start("a")
            .accepting(["b"])
            .build()
            .unwrap();
        assert!(matches!(automaton_to_grammar(&clash), Err(ConversionError::StructuralMismatch(_))));
    }

    #[test]
    fn test_round_trip() {
        let grammar = variant();
        let automaton = grammar_to_automaton(&grammar).unwrap();
        let back = automaton_to_grammar(&automaton).unwrap();

        assert!(back.is_right_linear());
        assert_eq!(back.non_terminals(), grammar.non_terminals());
        assert_eq!(back.terminals(), grammar.terminals());
        assert_eq!(back.rule_count(), grammar.rule_count());

        for rule in grammar.rules() {
            assert!(back.has_rule(rule.lhs(), rule.rhs()), "{} -> {}", rule.lhs(), format_rhs(rule.rhs()));
        }
    }
}
