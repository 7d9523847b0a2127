use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use json_comments::{CommentSettings, StripComments};
use serde::{Deserialize, Serialize};
use serde_json as json;

use crate::error::ParsingError;

/// The on-disk form of a [`FiniteAutomaton`](crate::automaton::FiniteAutomaton).
///
/// ```json
/// {
///     "states": ["q0", "q1"],
///     "alphabet": ["a"],
///     "transitions": [["q0", "a", "q1"], ["q1", "ε", "q0"]],
///     "start": "q0",
///     "accepting": ["q1"],
///     "sink": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDescription {
    /// State names
    pub states: Vec<String>,
    /// Input symbols
    pub alphabet: Vec<String>,
    /// `(source, symbol, destination)` triples; `"ε"` labels ε-transitions
    pub transitions: Vec<(String, String, String)>,
    /// The start state
    pub start: String,
    /// Accepting states
    #[serde(default)]
    pub accepting: Vec<String>,
    /// The accept sink, if any
    #[serde(default)]
    pub sink: Option<String>,
}

pub(crate) fn parse_json(path: &Path) -> Result<AutomatonDescription, ParsingError> {
    let file = File::open(path).map_err(|e| ParsingError::new(path, e.to_string()))?;
    let reader = BufReader::new(file);
    let reader = StripComments::with_settings(CommentSettings::c_style(), reader);

    json::from_reader(reader).map_err(|e| ParsingError::new(path, format!("Invalid automaton: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfa() {
        let description = parse_json(Path::new("test-data/automata/nfa.json")).unwrap();
        assert_eq!(description.states.len(), 4);
        assert_eq!(description.start, "q0");
        assert_eq!(description.accepting, vec!["q3".to_string()]);
        assert_eq!(description.sink, None);
        assert_eq!(description.transitions[0], ("q0".to_string(), "a".to_string(), "q1".to_string()));
    }

    #[test]
    fn test_defaults() {
        let description: AutomatonDescription = json::from_value(json::json!({
            "states": ["q0"],
            "alphabet": [],
            "transitions": [],
            "start": "q0",
        }))
        .unwrap();
        assert!(description.accepting.is_empty());
        assert!(description.sink.is_none());
    }

    #[test]
    fn test_invalid() {
        assert!(parse_json(Path::new("test-data/grammars/variant.json")).is_err());
        assert!(parse_json(Path::new("test-data/does-not-exist.json")).is_err());
    }
}
