use std::path::Path;
use std::fs::File;
use std::io::BufReader;
use json_comments::{CommentSettings, StripComments};
use serde_json as json;

use crate::{
    grammar::{NonTerminal, Rhs, Symbol, Terminal, EPSILON},
    error::ParsingError,
};

fn parse_non_terminal(keyword: &str) -> Option<&str> {
    if keyword.len() > 2 && keyword.starts_with('<') && keyword.ends_with('>') {
        Some(&keyword[1..keyword.len() - 1])
    } else {
        None
    }
}

fn parse_terminal(keyword: &str) -> &str {
    if keyword.len() >= 2 && keyword.starts_with('\'') && keyword.ends_with('\'') {
        &keyword[1..keyword.len() - 1]
    } else {
        keyword
    }
}

pub(crate) fn parse_grammar(value: json::Value) -> Result<Vec<(NonTerminal, Rhs)>, String> {
    let mut rules = Vec::new();

    let object = match value {
        json::Value::Object(object) => object,
        _ => return Err("Grammar must be specified as an object".to_string()),
    };

    for (key, value) in &object {
        // LHS must be a non-terminal
        let lhs = match parse_non_terminal(key) {
            Some(lhs) => lhs,
            None => return Err(format!("'{}' is not a valid non-terminal", key)),
        };

        // RHS must be an array of arrays of strings; an empty inner array is ε
        let rhs = match value {
            json::Value::Array(rhs) => rhs,
            _ => return Err(format!("Right-hand-side of '{}' must be an array", key)),
        };

        if rhs.is_empty() {
            return Err(format!("Invalid production rule '{}': Must not be empty", key));
        }

        for rule in rhs {
            let tokens = match rule {
                json::Value::Array(tokens) => tokens,
                _ => return Err(format!("Right-hand-side of '{}' must be an array of arrays", key)),
            };

            let mut symbols = Rhs::new();

            for token in tokens {
                let token = match token.as_str() {
                    Some(token) => token,
                    _ => return Err(format!("Right-hand-side of '{}' must be an array of arrays of strings", key)),
                };

                if token == EPSILON {
                    if tokens.len() > 1 {
                        return Err(format!("Invalid production rule '{}': '{}' must stand alone", key, EPSILON));
                    }

                    continue;
                }

                if let Some(nonterm) = parse_non_terminal(token) {
                    symbols.push(Symbol::NonTerminal(NonTerminal::new(nonterm)));
                } else {
                    let term = parse_terminal(token);
                    symbols.push(Symbol::Terminal(Terminal::new(term)));
                }
            }

            rules.push((NonTerminal::new(lhs), symbols));
        }
    }

    Ok(rules)
}

pub(crate) fn parse_json(path: &Path) -> Result<Vec<(NonTerminal, Rhs)>, ParsingError> {
    let file = File::open(path).map_err(|e| ParsingError::new(path, e.to_string()))?;
    let reader = BufReader::new(file);
    let reader = StripComments::with_settings(CommentSettings::c_style(), reader);

    let value: json::Value = match json::from_reader(reader) {
        Ok(value) => value,
        Err(e) => {
            return Err(ParsingError::new(
                path,
                format!("Invalid JSON syntax: {}", e),
            ));
        },
    };

    parse_grammar(value).map_err(|e| ParsingError::new(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant() {
        let rules = parse_json(Path::new("test-data/grammars/variant.json")).unwrap();
        assert_eq!(rules.len(), 7);
        assert_eq!(rules[0].0.id(), "S");
        assert_eq!(rules[0].1, vec![Symbol::terminal("a"), Symbol::non_terminal("A")]);
    }

    #[test]
    fn test_epsilon_and_quotes() {
        let value = json::json!({
            "<S>": [["'<'", "<S>", "'>'"], []],
            "<A>": [["ε"]],
        });
        let rules = parse_grammar(value).unwrap();
        assert_eq!(rules[0].1, vec![Symbol::terminal("<"), Symbol::non_terminal("S"), Symbol::terminal(">")]);
        assert!(rules[1].1.is_empty());
        assert!(rules[2].1.is_empty());
    }

    #[test]
    fn test_invalid() {
        assert!(parse_grammar(json::json!([])).is_err());
        assert!(parse_grammar(json::json!({"S": [["a"]]})).is_err());
        assert!(parse_grammar(json::json!({"<S>": []})).is_err());
        assert!(parse_grammar(json::json!({"<S>": [["a", 1]]})).is_err());
        assert!(parse_json(Path::new("test-data/does-not-exist.json")).is_err());
    }
}
