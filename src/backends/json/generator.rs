use serde::ser::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};
use std::{fs::File, io::Write, path::Path};

use crate::{
    automaton::{AutomatonDescription, FiniteAutomaton, EPSILON_LABEL},
    grammar::{Grammar, Symbol},
};

fn enclosed_in(s: &str, start: char, end: char) -> bool {
    s.len() >= 2 && s.starts_with(start) && s.ends_with(end)
}

fn terminal_string(content: &str) -> String {
    if enclosed_in(content, '<', '>') || enclosed_in(content, '\'', '\'') || content == EPSILON_LABEL {
        return format!("'{}'", content);
    }

    content.to_string()
}

/// This is the main struct of the [`json`](crate::backends::json) backend that serializes
/// grammars and automata.
pub struct JsonGenerator {}

impl JsonGenerator {
    /// Create a new JsonGenerator.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {}
    }

    /// Convert the production rules of `grammar` into the JSON grammar format.
    /// The entrypoint comes first, ε is written as `[]`.
    ///
    /// The format has no way to express a non-terminal without productions, so such
    /// non-terminals are left out. If this drops the entrypoint (the language is empty)
    /// a warning is logged and the output cannot be loaded again.
    pub fn grammar_value(&self, grammar: &Grammar) -> Value {
        let mut object = Map::new();
        let entrypoint = grammar.entrypoint();
        let ordered = grammar
            .production_map()
            .get_key_value(entrypoint)
            .into_iter()
            .chain(grammar.production_map().iter().filter(|(lhs, _)| *lhs != entrypoint));

        for (lhs, alternatives) in ordered {
            if alternatives.is_empty() {
                tracing::debug!(nonterm = lhs.id(), "skipping non-terminal without productions");
                continue;
            }

            let mut array = Vec::with_capacity(alternatives.len());

            for rhs in alternatives {
                let mut insert = Vec::with_capacity(rhs.len());

                for symbol in rhs {
                    match symbol {
                        Symbol::Terminal(term) => {
                            insert.push(Value::String(terminal_string(term.content())));
                        },
                        Symbol::NonTerminal(nonterm) => {
                            insert.push(Value::String(format!("<{}>", nonterm.id())));
                        },
                    }
                }

                array.push(Value::Array(insert));
            }

            object.insert(format!("<{}>", lhs.id()), Value::Array(array));
        }

        if !object.contains_key(&format!("<{}>", entrypoint.id())) {
            tracing::warn!(
                entrypoint = entrypoint.id(),
                "entrypoint has no productions, the written grammar cannot be loaded back"
            );
        }

        Value::Object(object)
    }

    fn write<T: Serialize, P: AsRef<Path>>(&self, path: P, value: &T) -> std::io::Result<()> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
        buf.push(b'\n');

        let mut file = File::create(path)?;
        file.write_all(&buf)
    }

    /// Write the production rules of the supplied `grammar` into the output file `path`.
    pub fn generate<P: AsRef<Path>>(&self, path: P, grammar: &Grammar) -> std::io::Result<()> {
        self.write(path, &self.grammar_value(grammar))
    }

    /// Write `automaton` into the output file `path` in the JSON automaton format.
    pub fn generate_automaton<P: AsRef<Path>>(&self, path: P, automaton: &FiniteAutomaton) -> std::io::Result<()> {
        self.write(path, &AutomatonDescription::from(automaton))
    }
}
