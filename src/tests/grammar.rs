use crate::grammar::{
    cnf::{
        eliminate_non_productive, eliminate_unreachable, is_in_cnf, productive_symbols, reachable_symbols,
    },
    normalize_to_cnf, CnfConverter, Grammar, NonTerminal, Symbol,
};
use crate::tests::load_grammar;

fn assert_clean(grammar: &Grammar) {
    assert!(grammar.rules().all(|rule| !rule.is_unit()), "unit production left:\n{}", grammar);
    assert!(grammar.rules().all(|rule| !rule.is_epsilon()), "ε-production left:\n{}", grammar);

    let reachable = reachable_symbols(grammar);
    let productive = productive_symbols(grammar);

    for nonterm in grammar.non_terminals() {
        assert!(reachable.contains(nonterm), "{} is unreachable", nonterm);
        assert!(productive.contains(nonterm), "{} is non-productive", nonterm);
    }
}

#[test]
fn test_cnf_scenario() {
    let grammar = load_grammar("test-data/grammars/cnf.json");
    let cnf = normalize_to_cnf(&grammar);

    assert_clean(&cnf);
    assert!(!cnf.non_terminals().contains(&NonTerminal::new("D")));

    // B inherited the productions of A
    let b = NonTerminal::new("B");
    assert!(cnf.has_rule(&b, &[Symbol::terminal("d")]));
    assert!(cnf.has_rule(&b, &[Symbol::terminal("a")]));
    assert!(cnf.has_rule(&b, &[Symbol::non_terminal("T_d"), Symbol::non_terminal("S")]));

    // Shallow binarization leaves long non-terminal sequences alone
    assert!(cnf.has_rule(
        &NonTerminal::new("S"),
        &[Symbol::non_terminal("T_a"), Symbol::non_terminal("B"), Symbol::non_terminal("A")]
    ));
    assert!(!is_in_cnf(&cnf));
}

#[test]
fn test_strict_cnf_scenario() {
    let grammar = load_grammar("test-data/grammars/cnf.json");
    let cnf = CnfConverter::new().strict(true).convert(&grammar);

    assert_clean(&cnf);
    assert!(is_in_cnf(&cnf));
}

#[test]
fn test_nullable_scenario() {
    let grammar = load_grammar("test-data/grammars/nullable.json");
    let cnf = CnfConverter::new().strict(true).convert(&grammar);

    assert_clean(&cnf);
    assert!(is_in_cnf(&cnf));
    assert!(!cnf.non_terminals().contains(&NonTerminal::new("E")));
}

#[test]
fn test_passes_are_idempotent() {
    for path in [
        "test-data/grammars/cnf.json",
        "test-data/grammars/nullable.json",
        "test-data/grammars/variant.json",
    ] {
        let grammar = load_grammar(path);

        let once = eliminate_unreachable(&grammar);
        assert_eq!(eliminate_unreachable(&once), once, "{}", path);

        let once = eliminate_non_productive(&grammar);
        assert_eq!(eliminate_non_productive(&once), once, "{}", path);
    }
}

#[test]
fn test_input_is_not_modified() {
    let grammar = load_grammar("test-data/grammars/cnf.json");
    let copy = grammar.clone();
    let _ = normalize_to_cnf(&grammar);
    assert_eq!(grammar, copy);
}
