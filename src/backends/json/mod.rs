//! Write grammars and automata in the JSON formats that the loaders understand.
//!
//! Use it like so:
//! ```no_run
//! use formlang::{backends::json::JsonGenerator, grammar::{normalize_to_cnf, Grammar}};
//!
//! let grammar = Grammar::builder()
//!     .json_grammar("my-grammar.json").unwrap()
//!     .build().unwrap();
//!
//! // Write the normalized grammar back to disk
//! JsonGenerator::new().generate("my-grammar-cnf.json", &normalize_to_cnf(&grammar)).unwrap();
//! ```

mod generator;

pub use generator::JsonGenerator;
