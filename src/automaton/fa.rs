use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::{
    automaton::state::{StateId, StateSet, SymbolId, EPSILON, EPSILON_LABEL},
    error::{AutomatonError, ParsingError},
    parser::automaton::{self as description, AutomatonDescription},
};

/// A finite automaton, deterministic or not.
///
/// States and symbols have names; internally they are referred to by their index
/// ([`StateId`], [`SymbolId`]). Transitions map a `(state, symbol)` pair to a set of target
/// states, where the symbol may be [`EPSILON`].
#[derive(Debug, Clone)]
pub struct FiniteAutomaton {
    states: IndexSet<String>,
    alphabet: IndexSet<String>,
    transitions: IndexMap<(StateId, SymbolId), StateSet>,
    start: StateId,
    accepting: StateSet,
    sink: Option<StateId>,
    subsets: Option<Vec<Vec<String>>>,
}

impl FiniteAutomaton {
    /// Get an [`AutomatonBuilder`].
    pub fn builder() -> AutomatonBuilder {
        AutomatonBuilder::new()
    }

    /// Create an automaton without transitions and accepting states.
    /// `start` must be an index into `states`.
    pub(crate) fn with_states(states: IndexSet<String>, alphabet: IndexSet<String>, start: StateId) -> Self {
        debug_assert!((start as usize) < states.len());

        let capacity = states.len();

        Self {
            states,
            alphabet,
            transitions: IndexMap::new(),
            start,
            accepting: StateSet::with_capacity(capacity),
            sink: None,
            subsets: None,
        }
    }

    pub(crate) fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        let capacity = self.states.len();
        self.transitions
            .entry((source, symbol))
            .or_insert_with(|| StateSet::with_capacity(capacity))
            .insert(destination);
    }

    pub(crate) fn add_accepting(&mut self, state: StateId) {
        self.accepting.insert(state);
    }

    /// The sink is always accepting.
    pub(crate) fn set_sink(&mut self, state: StateId) {
        self.accepting.insert(state);
        self.sink = Some(state);
    }

    pub(crate) fn set_subsets(&mut self, subsets: Vec<Vec<String>>) {
        self.subsets = Some(subsets);
    }

    /// All state names, indexed by [`StateId`].
    pub fn states(&self) -> &IndexSet<String> {
        &self.states
    }

    /// All input symbols, indexed by [`SymbolId`].
    pub fn alphabet(&self) -> &IndexSet<String> {
        &self.alphabet
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Name of a state.
    pub fn state_name(&self, state: StateId) -> Option<&str> {
        self.states.get_index(state as usize).map(String::as_str)
    }

    /// Name of a symbol. [`EPSILON`] is named [`EPSILON_LABEL`].
    pub fn symbol_name(&self, symbol: SymbolId) -> Option<&str> {
        if symbol == EPSILON {
            Some(EPSILON_LABEL)
        } else {
            self.alphabet.get_index(symbol as usize).map(String::as_str)
        }
    }

    /// Look up a state by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states.get_index_of(name).map(|idx| idx as StateId)
    }

    /// Look up a symbol by name. [`EPSILON_LABEL`] resolves to [`EPSILON`].
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        if name == EPSILON_LABEL {
            Some(EPSILON)
        } else {
            self.alphabet.get_index_of(name).map(|idx| idx as SymbolId)
        }
    }

    /// The start state.
    pub fn start_id(&self) -> StateId {
        self.start
    }

    /// Name of the start state.
    pub fn start(&self) -> &str {
        self.state_name(self.start).unwrap_or_default()
    }

    /// The accepting states.
    pub fn accepting(&self) -> &StateSet {
        &self.accepting
    }

    /// Whether the named state is accepting.
    pub fn is_accepting(&self, name: &str) -> bool {
        self.state_id(name).is_some_and(|state| self.accepting.contains(state))
    }

    /// The accept sink, if this automaton has one.
    pub fn sink_id(&self) -> Option<StateId> {
        self.sink
    }

    /// Name of the accept sink, if this automaton has one.
    pub fn sink(&self) -> Option<&str> {
        self.sink.and_then(|state| self.state_name(state))
    }

    /// The targets of `(state, symbol)`.
    pub fn targets(&self, state: StateId, symbol: SymbolId) -> Option<&StateSet> {
        self.transitions.get(&(state, symbol))
    }

    /// Iterate over all transitions as `(source, symbol, destination)`.
    pub fn transition_ids(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&(src, sym), dests)| dests.iter().map(move |dst| (src, sym, dst)))
    }

    /// Iterate over all transitions by name. ε-transitions carry [`EPSILON_LABEL`].
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        self.transition_ids().filter_map(|(src, sym, dst)| {
            Some((self.state_name(src)?, self.symbol_name(sym)?, self.state_name(dst)?))
        })
    }

    /// Whether any transition is labelled with ε.
    pub fn has_epsilon_transitions(&self) -> bool {
        self.transitions.keys().any(|&(_, symbol)| symbol == EPSILON)
    }

    /// For automata created by [`determinize`](crate::automaton::determinize): the names of the
    /// source states that the given state stands for.
    pub fn subset(&self, name: &str) -> Option<&[String]> {
        let state = self.state_id(name)?;
        self.subsets
            .as_ref()
            .and_then(|subsets| subsets.get(state as usize))
            .map(Vec::as_slice)
    }

    /// Render a set of states as `{q0,q1}`.
    pub fn format_set(&self, states: &StateSet) -> String {
        format!("{{{}}}", states.iter().filter_map(|state| self.state_name(state)).join(","))
    }

    /// Run the automaton on `word` and return the set of states it ends in.
    ///
    /// The simulation tracks every state the automaton can be in, so it is exact for
    /// non-deterministic automata as well. A symbol outside of the alphabet yields
    /// [`AutomatonError::UnknownSymbol`], a symbol that none of the current states can consume
    /// yields [`AutomatonError::UndefinedTransition`].
    pub fn walk<I, S>(&self, word: I) -> Result<StateSet, AutomatonError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current = self.epsilon_closure(&StateSet::singleton(self.start, self.num_states()));

        for symbol in word {
            let symbol = symbol.as_ref();
            let id = match self.alphabet.get_index_of(symbol) {
                Some(id) => id as SymbolId,
                None => return Err(AutomatonError::UnknownSymbol(symbol.to_string())),
            };

            let next = self.move_on_symbol(&current, id);

            if next.is_empty() {
                return Err(AutomatonError::UndefinedTransition {
                    states: self.format_set(&current),
                    symbol: symbol.to_string(),
                });
            }

            current = next;
        }

        Ok(current)
    }

    /// Whether the automaton accepts `word`, a sequence of symbol names.
    /// Missing transitions and unknown symbols reject the word.
    pub fn accepts<I, S>(&self, word: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.walk(word) {
            Ok(states) => states.intersects(&self.accepting),
            Err(_) => false,
        }
    }

    /// Like [`accepts`](Self::accepts) for alphabets of single characters: every character of
    /// `word` is one symbol.
    pub fn accepts_str(&self, word: &str) -> bool {
        self.accepts(word.char_indices().map(|(idx, c)| &word[idx..idx + c.len_utf8()]))
    }
}

impl Display for FiniteAutomaton {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "States: {{{}}}", self.states.iter().join(", "))?;
        writeln!(f, "Alphabet: {{{}}}", self.alphabet.iter().join(", "))?;
        writeln!(f, "Start: {}", self.start())?;
        writeln!(
            f,
            "Accepting: {{{}}}",
            self.accepting.iter().filter_map(|state| self.state_name(state)).join(", ")
        )?;
        writeln!(f, "Transitions:")?;

        for (src, sym, dst) in self.transitions() {
            writeln!(f, "  {} -{}-> {}", src, sym, dst)?;
        }

        Ok(())
    }
}

/// Collects states, symbols and transitions by name and returns a validated
/// [`FiniteAutomaton`].
///
/// ```
/// use formlang::automaton::FiniteAutomaton;
///
/// let nfa = FiniteAutomaton::builder()
///     .states(["q0", "q1"])
///     .alphabet(["a"])
///     .transition("q0", "a", "q0")
///     .transition("q0", "a", "q1")
///     .start("q0")
///     .accepting(["q1"])
///     .build()
///     .unwrap();
/// assert!(nfa.accepts_str("aaa"));
/// assert!(!nfa.is_deterministic());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    states: IndexSet<String>,
    alphabet: IndexSet<String>,
    transitions: Vec<(String, String, String)>,
    start: Option<String>,
    accepting: Vec<String>,
    sink: Option<String>,
}

impl AutomatonBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Declare a state.
    pub fn state<S: Into<String>>(mut self, name: S) -> Self {
        self.states.insert(name.into());
        self
    }

    /// Declare several states.
    pub fn states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare several input symbols. ε is never part of the alphabet and is skipped.
    pub fn alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alphabet.extend(
            symbols
                .into_iter()
                .map(Into::into)
                .filter(|symbol| symbol != EPSILON_LABEL),
        );
        self
    }

    /// Add a transition. Use [`EPSILON_LABEL`] as `symbol` for an ε-transition.
    pub fn transition<A, B, C>(mut self, source: A, symbol: B, destination: C) -> Self
    where
        A: Into<String>,
        B: Into<String>,
        C: Into<String>,
    {
        self.transitions.push((source.into(), symbol.into(), destination.into()));
        self
    }

    /// Add an ε-transition.
    pub fn epsilon<A, C>(self, source: A, destination: C) -> Self
    where
        A: Into<String>,
        C: Into<String>,
    {
        self.transition(source, EPSILON_LABEL, destination)
    }

    /// Set the start state.
    pub fn start<S: Into<String>>(mut self, name: S) -> Self {
        self.start = Some(name.into());
        self
    }

    /// Mark states as accepting.
    pub fn accepting<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepting.extend(names.into_iter().map(Into::into));
        self
    }

    /// Designate the accept sink. The sink is accepting.
    pub fn sink<S: Into<String>>(mut self, name: S) -> Self {
        self.sink = Some(name.into());
        self
    }

    /// Add everything from an [`AutomatonDescription`].
    pub fn description(self, description: AutomatonDescription) -> Self {
        let AutomatonDescription {
            states,
            alphabet,
            transitions,
            start,
            accepting,
            sink,
        } = description;

        let mut builder = self.states(states).alphabet(alphabet).start(start).accepting(accepting);
        builder.transitions.extend(transitions);
        builder.sink = sink.or(builder.sink);
        builder
    }

    /// Load an automaton from disk that is in the JSON automaton format.
    pub fn json_automaton<P: AsRef<Path>>(self, path: P) -> Result<Self, ParsingError> {
        let description = description::parse_json(path.as_ref())?;
        Ok(self.description(description))
    }

    fn resolve_state(&self, name: &str) -> Result<StateId, AutomatonError> {
        match self.states.get_index_of(name) {
            Some(idx) => Ok(idx as StateId),
            None => Err(AutomatonError::UnknownState(name.to_string())),
        }
    }

    fn resolve_symbol(&self, name: &str) -> Result<SymbolId, AutomatonError> {
        if name == EPSILON_LABEL {
            return Ok(EPSILON);
        }

        match self.alphabet.get_index_of(name) {
            Some(idx) => Ok(idx as SymbolId),
            None => Err(AutomatonError::UnknownSymbol(name.to_string())),
        }
    }

    /// Create a [`FiniteAutomaton`].
    pub fn build(self) -> Result<FiniteAutomaton, AutomatonError> {
        let start = match &self.start {
            Some(start) => self.resolve_state(start)?,
            None => return Err(AutomatonError::MissingStart),
        };

        let mut transitions = Vec::with_capacity(self.transitions.len());

        for (source, symbol, destination) in &self.transitions {
            transitions.push((
                self.resolve_state(source)?,
                self.resolve_symbol(symbol)?,
                self.resolve_state(destination)?,
            ));
        }

        let accepting = self
            .accepting
            .iter()
            .map(|name| self.resolve_state(name))
            .collect::<Result<Vec<_>, _>>()?;

        let sink = self.sink.as_deref().map(|name| self.resolve_state(name)).transpose()?;

        let mut automaton = FiniteAutomaton::with_states(self.states, self.alphabet, start);

        for (source, symbol, destination) in transitions {
            automaton.add_transition(source, symbol, destination);
        }

        for state in accepting {
            automaton.add_accepting(state);
        }

        if let Some(sink) = sink {
            automaton.set_sink(sink);
        }

        Ok(automaton)
    }
}

impl From<&FiniteAutomaton> for AutomatonDescription {
    fn from(automaton: &FiniteAutomaton) -> Self {
        Self {
            states: automaton.states().iter().cloned().collect(),
            alphabet: automaton.alphabet().iter().cloned().collect(),
            transitions: automaton
                .transitions()
                .map(|(src, sym, dst)| (src.to_string(), sym.to_string(), dst.to_string()))
                .collect(),
            start: automaton.start().to_string(),
            accepting: automaton
                .accepting()
                .iter()
                .filter_map(|state| automaton.state_name(state))
                .map(str::to_string)
                .collect(),
            sink: automaton.sink().map(str::to_string),
        }
    }
}
