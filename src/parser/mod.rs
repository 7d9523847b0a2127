//! Loaders for the JSON file formats.

pub(crate) mod automaton;
pub(crate) mod grammar;
