mod grammar;

use crate::grammar::Grammar;

pub(crate) fn load_grammar(path: &str) -> Grammar {
    Grammar::builder().json_grammar(path).unwrap().build().unwrap()
}

/// Every word over `alphabet` of length at most `max_len`, shortest first.
pub(crate) fn words(alphabet: &[&str], max_len: usize) -> Vec<Vec<String>> {
    let mut all = vec![Vec::new()];
    let mut layer: Vec<Vec<String>> = vec![Vec::new()];

    for _ in 0..max_len {
        layer = layer
            .iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |symbol| {
                    let mut word = prefix.clone();
                    word.push(symbol.to_string());
                    word
                })
            })
            .collect();
        all.extend(layer.iter().cloned());
    }

    all
}
