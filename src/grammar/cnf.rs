//! Conversion of context-free grammars into Chomsky Normal Form.
//!
//! The conversion is a sequence of passes, each of which consumes a [`Grammar`] and returns a
//! new one:
//! 1. [`eliminate_epsilon`]
//! 2. [`eliminate_unit`]
//! 3. [`eliminate_unreachable`]
//! 4. [`eliminate_non_productive`]
//! 5. [`binarize`]
//!
//! The order matters: every pass relies on the shape established by the passes before it.
//! [`CnfConverter`] runs all of them.

use fixedbitset::FixedBitSet;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use petgraph::{graphmap::DiGraphMap, visit::Dfs};

use crate::grammar::{Grammar, NonTerminal, Rhs, Symbol, Terminal};

/// Prefix of the auxiliary non-terminals that stand for a single terminal.
pub const TERMINAL_PREFIX: &str = "T_";

fn position(grammar: &Grammar, nonterm: &NonTerminal) -> Option<usize> {
    grammar.non_terminals().get_index_of(nonterm)
}

fn collect(grammar: &Grammar, bits: &FixedBitSet) -> IndexSet<NonTerminal> {
    grammar
        .non_terminals()
        .iter()
        .enumerate()
        .filter(|(idx, _)| bits.contains(*idx))
        .map(|(_, nonterm)| nonterm.clone())
        .collect()
}

fn used_terminals(grammar: &Grammar, productions: &IndexMap<NonTerminal, IndexSet<Rhs>>) -> IndexSet<Terminal> {
    let used: IndexSet<&Terminal> = productions
        .values()
        .flatten()
        .flatten()
        .filter_map(Symbol::as_terminal)
        .collect();

    grammar
        .terminals()
        .iter()
        .filter(|term| used.contains(term))
        .cloned()
        .collect()
}

/// Fixpoint over the non-terminals: a non-terminal is marked as soon as one of its
/// alternatives consists of terminals accepted by `terminal_ok` and already marked non-terminals.
fn fixpoint<F>(grammar: &Grammar, terminal_ok: F) -> FixedBitSet
where
    F: Fn(&Terminal) -> bool,
{
    let mut marked = FixedBitSet::with_capacity(grammar.non_terminals().len());
    let mut changed = true;

    while changed {
        changed = false;

        for (idx, nonterm) in grammar.non_terminals().iter().enumerate() {
            if marked.contains(idx) {
                continue;
            }

            let satisfied = grammar.productions(nonterm).into_iter().flatten().any(|rhs| {
                rhs.iter().all(|symbol| match symbol {
                    Symbol::Terminal(term) => terminal_ok(term),
                    Symbol::NonTerminal(other) => position(grammar, other).is_some_and(|i| marked.contains(i)),
                })
            });

            if satisfied {
                marked.insert(idx);
                changed = true;
            }
        }
    }

    marked
}

fn nullable_bits(grammar: &Grammar) -> FixedBitSet {
    fixpoint(grammar, |_| false)
}

fn productive_bits(grammar: &Grammar) -> FixedBitSet {
    fixpoint(grammar, |_| true)
}

/// Build a graph over non-terminal indices with an edge `A -> B` for every production of `A`
/// that `edge` maps to `B`.
fn dependency_graph<'a, F, I>(grammar: &'a Grammar, edges: F) -> DiGraphMap<usize, ()>
where
    F: Fn(&'a [Symbol]) -> I,
    I: Iterator<Item = &'a NonTerminal>,
{
    let mut graph = DiGraphMap::with_capacity(grammar.non_terminals().len(), grammar.rule_count());

    for idx in 0..grammar.non_terminals().len() {
        graph.add_node(idx);
    }

    for rule in grammar.rules() {
        let Some(src) = position(grammar, rule.lhs()) else {
            continue;
        };

        for target in edges(rule.rhs()) {
            if let Some(dst) = position(grammar, target) {
                graph.add_edge(src, dst, ());
            }
        }
    }

    graph
}

fn unit_graph(grammar: &Grammar) -> DiGraphMap<usize, ()> {
    dependency_graph(grammar, |rhs| match rhs {
        [Symbol::NonTerminal(target)] => Some(target).into_iter(),
        _ => None.into_iter(),
    })
}

fn is_unit(rhs: &[Symbol]) -> bool {
    matches!(rhs, [Symbol::NonTerminal(_)])
}

/// All non-terminals that derive the empty word.
pub fn nullable_symbols(grammar: &Grammar) -> IndexSet<NonTerminal> {
    collect(grammar, &nullable_bits(grammar))
}

/// All non-terminals that derive at least one word of terminals.
pub fn productive_symbols(grammar: &Grammar) -> IndexSet<NonTerminal> {
    collect(grammar, &productive_bits(grammar))
}

/// All non-terminals that occur in some sentential form derived from the entrypoint,
/// including the entrypoint itself.
pub fn reachable_symbols(grammar: &Grammar) -> IndexSet<NonTerminal> {
    let mut reachable = FixedBitSet::with_capacity(grammar.non_terminals().len());

    if let Some(start) = position(grammar, grammar.entrypoint()) {
        let graph = dependency_graph(grammar, |rhs| rhs.iter().filter_map(Symbol::as_non_terminal));
        let mut dfs = Dfs::new(&graph, start);

        while let Some(idx) = dfs.next(&graph) {
            reachable.insert(idx);
        }
    }

    collect(grammar, &reachable)
}

/// The non-terminals reachable from `nonterm` through unit productions, `nonterm` included.
pub fn unit_closure(grammar: &Grammar, nonterm: &NonTerminal) -> IndexSet<NonTerminal> {
    let mut closure = IndexSet::new();

    if let Some(start) = position(grammar, nonterm) {
        let graph = unit_graph(grammar);
        let mut dfs = Dfs::new(&graph, start);

        while let Some(idx) = dfs.next(&graph) {
            if let Some(reached) = grammar.non_terminals().get_index(idx) {
                closure.insert(reached.clone());
            }
        }
    }

    closure
}

/// Pass 1: remove ε-productions.
///
/// Every production is expanded into all variants that drop some of its nullable
/// occurrences, except the variant that drops everything. A non-terminal that is left
/// without any alternative keeps `ε` as its only production.
pub fn eliminate_epsilon(grammar: &Grammar) -> Grammar {
    let nullable = nullable_bits(grammar);
    let is_nullable = |symbol: &Symbol| {
        symbol
            .as_non_terminal()
            .and_then(|nonterm| position(grammar, nonterm))
            .is_some_and(|idx| nullable.contains(idx))
    };

    let mut productions = IndexMap::with_capacity(grammar.non_terminals().len());

    for (idx, (lhs, alternatives)) in grammar.production_map().iter().enumerate() {
        let mut rewritten = IndexSet::new();

        for rhs in alternatives {
            let optional: Vec<usize> = rhs.iter().positions(is_nullable).collect();

            for dropped in optional.into_iter().powerset() {
                let variant: Rhs = rhs
                    .iter()
                    .enumerate()
                    .filter(|(pos, _)| !dropped.contains(pos))
                    .map(|(_, symbol)| symbol.clone())
                    .collect();

                if !variant.is_empty() {
                    rewritten.insert(variant);
                }
            }
        }

        if rewritten.is_empty() && nullable.contains(idx) {
            rewritten.insert(Rhs::new());
        }

        productions.insert(lhs.clone(), rewritten);
    }

    let result = Grammar::from_parts(
        grammar.non_terminals().clone(),
        grammar.terminals().clone(),
        productions,
        grammar.entrypoint().clone(),
    );

    tracing::debug!(
        nullable = nullable.count_ones(..),
        rules = result.rule_count(),
        "eliminated epsilon productions"
    );

    result
}

/// Pass 2: remove unit productions `A -> B`.
///
/// `A` receives its own non-unit productions and the non-unit productions of every
/// non-terminal in its unit closure.
pub fn eliminate_unit(grammar: &Grammar) -> Grammar {
    let graph = unit_graph(grammar);
    let mut productions = IndexMap::with_capacity(grammar.non_terminals().len());

    for (idx, lhs) in grammar.non_terminals().iter().enumerate() {
        let mut rewritten = IndexSet::new();
        let mut dfs = Dfs::new(&graph, idx);

        while let Some(reached) = dfs.next(&graph) {
            let alternatives = grammar
                .non_terminals()
                .get_index(reached)
                .and_then(|nonterm| grammar.productions(nonterm));

            for rhs in alternatives.into_iter().flatten() {
                if !is_unit(rhs) {
                    rewritten.insert(rhs.clone());
                }
            }
        }

        productions.insert(lhs.clone(), rewritten);
    }

    let result = Grammar::from_parts(
        grammar.non_terminals().clone(),
        grammar.terminals().clone(),
        productions,
        grammar.entrypoint().clone(),
    );

    tracing::debug!(rules = result.rule_count(), "eliminated unit productions");

    result
}

/// Pass 3: remove non-terminals that cannot be reached from the entrypoint.
/// Terminals that are no longer used are removed as well.
pub fn eliminate_unreachable(grammar: &Grammar) -> Grammar {
    let reachable = reachable_symbols(grammar);

    let productions: IndexMap<NonTerminal, IndexSet<Rhs>> = grammar
        .production_map()
        .iter()
        .filter(|(lhs, _)| reachable.contains(*lhs))
        .map(|(lhs, alternatives)| (lhs.clone(), alternatives.clone()))
        .collect();

    let terminals = used_terminals(grammar, &productions);
    let removed = grammar.non_terminals().len() - reachable.len();
    let result = Grammar::from_parts(reachable, terminals, productions, grammar.entrypoint().clone());

    tracing::debug!(removed, rules = result.rule_count(), "eliminated unreachable symbols");

    result
}

/// Pass 4: remove non-terminals that derive no terminal word, together with every
/// production that mentions one of them.
///
/// If the entrypoint itself is non-productive the language is empty; the entrypoint is kept
/// as a non-terminal without productions.
pub fn eliminate_non_productive(grammar: &Grammar) -> Grammar {
    let productive = productive_symbols(grammar);
    let entrypoint = grammar.entrypoint().clone();

    let productions: IndexMap<NonTerminal, IndexSet<Rhs>> = grammar
        .production_map()
        .iter()
        .filter(|(lhs, _)| productive.contains(*lhs))
        .map(|(lhs, alternatives)| {
            let kept = alternatives
                .iter()
                .filter(|rhs| {
                    rhs.iter()
                        .filter_map(Symbol::as_non_terminal)
                        .all(|nonterm| productive.contains(nonterm))
                })
                .cloned()
                .collect();
            (lhs.clone(), kept)
        })
        .collect();

    let non_terminals: IndexSet<NonTerminal> = grammar
        .non_terminals()
        .iter()
        .filter(|nonterm| productive.contains(*nonterm) || **nonterm == entrypoint)
        .cloned()
        .collect();

    if !productive.contains(&entrypoint) {
        tracing::warn!(entrypoint = entrypoint.id(), "the language of the grammar is empty");
    }

    let terminals = used_terminals(grammar, &productions);
    let removed = grammar.non_terminals().len() - non_terminals.len();
    let result = Grammar::from_parts(non_terminals, terminals, productions, entrypoint);

    tracing::debug!(removed, rules = result.rule_count(), "eliminated non-productive symbols");

    result
}

struct Binarizer {
    strict: bool,
    taken: IndexSet<String>,
    auxiliaries: IndexMap<Terminal, NonTerminal>,
    chains: IndexMap<Rhs, NonTerminal>,
    non_terminals: IndexSet<NonTerminal>,
    productions: IndexMap<NonTerminal, IndexSet<Rhs>>,
    counter: usize,
}

impl Binarizer {
    fn new(grammar: &Grammar, strict: bool) -> Self {
        let taken = grammar
            .non_terminals()
            .iter()
            .map(|nonterm| nonterm.id().to_string())
            .chain(grammar.terminals().iter().map(|term| term.content().to_string()))
            .collect();

        Self {
            strict,
            taken,
            auxiliaries: IndexMap::new(),
            chains: IndexMap::new(),
            non_terminals: grammar.non_terminals().clone(),
            productions: IndexMap::new(),
            counter: 0,
        }
    }

    fn fresh(&mut self, mut name: String) -> NonTerminal {
        while self.taken.contains(&name) {
            name.push('\'');
        }

        self.taken.insert(name.clone());
        let nonterm = NonTerminal::new(name);
        self.non_terminals.insert(nonterm.clone());
        nonterm
    }

    fn add(&mut self, lhs: NonTerminal, rhs: Rhs) {
        self.productions.entry(lhs).or_default().insert(rhs);
    }

    fn auxiliary(&mut self, term: &Terminal) -> NonTerminal {
        if let Some(nonterm) = self.auxiliaries.get(term) {
            return nonterm.clone();
        }

        let nonterm = self.fresh(format!("{}{}", TERMINAL_PREFIX, term.content()));
        self.auxiliaries.insert(term.clone(), nonterm.clone());
        self.add(nonterm.clone(), vec![Symbol::Terminal(term.clone())]);
        nonterm
    }

    /// Split `A -> X1 X2 ... Xn` into `A -> X1 C1`, `C1 -> X2 C2`, ...; suffixes are shared.
    fn split(&mut self, lhs: &NonTerminal, symbols: Rhs) -> Rhs {
        if symbols.len() <= 2 {
            return symbols;
        }

        let tail = symbols[1..].to_vec();
        let tail_nonterm = match self.chains.get(&tail).cloned() {
            Some(nonterm) => nonterm,
            None => {
                self.counter += 1;
                let nonterm = self.fresh(format!("{}_{}", lhs.id(), self.counter));
                self.chains.insert(tail.clone(), nonterm.clone());
                let rhs = self.split(lhs, tail);
                self.add(nonterm.clone(), rhs);
                nonterm
            },
        };

        vec![symbols[0].clone(), Symbol::NonTerminal(tail_nonterm)]
    }

    fn rewrite(&mut self, lhs: &NonTerminal, rhs: &[Symbol]) {
        match rhs {
            [] | [Symbol::Terminal(_)] => self.add(lhs.clone(), rhs.to_vec()),
            _ => {
                let replaced: Rhs = rhs
                    .iter()
                    .map(|symbol| match symbol {
                        Symbol::Terminal(term) => Symbol::NonTerminal(self.auxiliary(term)),
                        Symbol::NonTerminal(_) => symbol.clone(),
                    })
                    .collect();

                let replaced = if self.strict {
                    self.split(lhs, replaced)
                } else {
                    replaced
                };

                self.add(lhs.clone(), replaced);
            },
        }
    }
}

/// Pass 5: bring the productions into Chomsky Normal Form.
///
/// Single-terminal productions are kept. In all other productions every terminal is replaced by
/// an auxiliary non-terminal `T_<terminal>` with the sole production `T_<terminal> -> terminal`.
/// Unless `strict` is set, right-hand sides with more than two non-terminals are left as they are.
/// With `strict`, they are split into chains of binary productions.
pub fn binarize(grammar: &Grammar, strict: bool) -> Grammar {
    let mut binarizer = Binarizer::new(grammar, strict);

    for rule in grammar.rules() {
        binarizer.rewrite(rule.lhs(), rule.rhs());
    }

    let added = binarizer.non_terminals.len() - grammar.non_terminals().len();
    let result = Grammar::from_parts(
        binarizer.non_terminals,
        grammar.terminals().clone(),
        binarizer.productions,
        grammar.entrypoint().clone(),
    );

    tracing::debug!(added, strict, rules = result.rule_count(), "binarized grammar");

    result
}

/// Check whether every production is `A -> a` or `A -> B C`. The entrypoint may derive `ε`
/// if it does not occur on any right-hand side.
pub fn is_in_cnf(grammar: &Grammar) -> bool {
    let entrypoint = grammar.entrypoint();
    let start_on_rhs = grammar
        .rules()
        .any(|rule| rule.rhs().iter().any(|symbol| symbol.as_non_terminal() == Some(entrypoint)));

    grammar.rules().all(|rule| match rule.rhs() {
        [Symbol::Terminal(_)] | [Symbol::NonTerminal(_), Symbol::NonTerminal(_)] => true,
        [] => rule.lhs() == entrypoint && !start_on_rhs,
        _ => false,
    })
}

/// Runs all passes of the CNF conversion in order.
///
/// ```
/// use formlang::grammar::{Grammar, CnfConverter};
///
/// let grammar = Grammar::builder()
///     .non_terminals(["S", "A"])
///     .terminals(["a", "b"])
///     .rules("S", ["aAb", "A"])
///     .rules("A", ["a", "ε"])
///     .build()
///     .unwrap();
///
/// let cnf = CnfConverter::new().strict(true).convert(&grammar);
/// assert!(formlang::grammar::cnf::is_in_cnf(&cnf));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CnfConverter {
    strict: bool,
}

impl CnfConverter {
    /// Create a converter that performs the shallow binarization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also split long right-hand sides into binary productions.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Convert `grammar`. The input is not modified.
    pub fn convert(&self, grammar: &Grammar) -> Grammar {
        let grammar = eliminate_epsilon(grammar);
        let grammar = eliminate_unit(&grammar);
        let grammar = eliminate_unreachable(&grammar);
        let grammar = eliminate_non_productive(&grammar);
        // removing non-productive productions can orphan non-terminals
        let grammar = eliminate_unreachable(&grammar);
        binarize(&grammar, self.strict)
    }
}

/// Convert `grammar` with the default [`CnfConverter`].
pub fn normalize_to_cnf(grammar: &Grammar) -> Grammar {
    CnfConverter::new().convert(grammar)
}
