use std::collections::VecDeque;

use ahash::AHashMap;
use indexmap::IndexSet;
use itertools::Itertools;

use crate::automaton::{
    fa::FiniteAutomaton,
    state::{StateId, StateSet, SymbolId, EPSILON},
};

impl FiniteAutomaton {
    /// All states reachable from `states` through ε-transitions only, including `states`.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut worklist = states.to_vec();

        while let Some(state) = worklist.pop() {
            if let Some(targets) = self.targets(state, EPSILON) {
                for target in targets.iter() {
                    if closure.insert(target) {
                        worklist.push(target);
                    }
                }
            }
        }

        closure
    }

    /// The ε-closure of all states reachable from `states` on `symbol`.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        let mut result = StateSet::with_capacity(self.num_states());

        for state in states.iter() {
            if let Some(targets) = self.targets(state, symbol) {
                result.union_with(targets);
            }
        }

        self.epsilon_closure(&result)
    }

    /// Every `(state, symbol)` pair has at most one target and no transition is labelled
    /// with ε.
    pub fn is_deterministic(&self) -> bool {
        !self.has_epsilon_transitions()
            && self
                .transition_ids()
                .map(|(src, sym, _)| (src, sym))
                .counts()
                .values()
                .all(|&n| n <= 1)
    }
}

/// Free-function form of [`FiniteAutomaton::is_deterministic`].
pub fn is_deterministic(automaton: &FiniteAutomaton) -> bool {
    automaton.is_deterministic()
}

/// Free-function form of [`FiniteAutomaton::epsilon_closure`].
pub fn epsilon_closure(automaton: &FiniteAutomaton, states: &StateSet) -> StateSet {
    automaton.epsilon_closure(states)
}

/// Convert an automaton into an equivalent deterministic one by subset construction.
///
/// Subsets are discovered in breadth-first order starting from the ε-closure of the start
/// state and symbols are visited in alphabet order, so the result is stable across runs.
/// Each state of the result is named after its subset (`{q0,q1}`) and the mapping back
/// to the source states is available through [`FiniteAutomaton::subset`].
/// Unreachable subsets are never created. If two subsets render to the same name, primes are
/// appended to the later one.
pub fn determinize(automaton: &FiniteAutomaton) -> FiniteAutomaton {
    let capacity = automaton.num_states();
    let start = automaton.epsilon_closure(&StateSet::singleton(automaton.start_id(), capacity));

    let mut index: AHashMap<Vec<StateId>, StateId> = AHashMap::new();
    let mut subsets: Vec<StateSet> = Vec::new();
    let mut transitions: Vec<(StateId, SymbolId, StateId)> = Vec::new();
    let mut queue = VecDeque::new();

    index.insert(start.to_vec(), 0);
    subsets.push(start);
    queue.push_back(0);

    while let Some(current) = queue.pop_front() {
        for symbol in 0..automaton.alphabet().len() as SymbolId {
            let next = automaton.move_on_symbol(&subsets[current as usize], symbol);

            if next.is_empty() {
                continue;
            }

            let key = next.to_vec();
            let target = match index.get(&key) {
                Some(&target) => target,
                None => {
                    let target = subsets.len() as StateId;
                    index.insert(key, target);
                    subsets.push(next);
                    queue.push_back(target);
                    target
                },
            };

            transitions.push((current, symbol, target));
        }
    }

    let mut names = IndexSet::with_capacity(subsets.len());

    for subset in &subsets {
        // State names may contain `,{}` so two subsets can render alike
        let mut name = automaton.format_set(subset);

        while names.contains(&name) {
            name.push('\'');
        }

        names.insert(name);
    }

    let mut dfa = FiniteAutomaton::with_states(names, automaton.alphabet().clone(), 0);

    for (src, sym, dst) in transitions {
        dfa.add_transition(src, sym, dst);
    }

    for (id, subset) in subsets.iter().enumerate() {
        if subset.intersects(automaton.accepting()) {
            dfa.add_accepting(id as StateId);
        }

        if let Some(sink) = automaton.sink_id() {
            if subset.to_vec() == [sink] {
                dfa.set_sink(id as StateId);
            }
        }
    }

    dfa.set_subsets(
        subsets
            .iter()
            .map(|subset| {
                subset
                    .iter()
                    .filter_map(|state| automaton.state_name(state))
                    .map(str::to_string)
                    .collect()
            })
            .collect(),
    );

    tracing::debug!(
        "Determinized {} states into {} states",
        automaton.num_states(),
        dfa.num_states()
    );

    dfa
}
