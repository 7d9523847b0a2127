use clap::Parser;
use tracing_subscriber::EnvFilter;

use formlang::{
    automaton::{determinize, FiniteAutomaton},
    backends::json::JsonGenerator,
    convert::grammar_to_automaton,
    grammar::Grammar,
};

/// Determinize a finite automaton and check words against it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Automaton in JSON format
    #[arg(short, long, conflicts_with = "grammar", required_unless_present = "grammar")]
    automaton: Option<String>,

    /// Right-linear grammar in JSON format, converted into an automaton first
    #[arg(short, long)]
    grammar: Option<String>,

    /// Words to check. Every character is one input symbol.
    #[arg(short, long)]
    word: Vec<String>,

    /// Write the deterministic automaton to this file
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let automaton = match (args.automaton, args.grammar) {
        (Some(path), _) => FiniteAutomaton::builder().json_automaton(path)?.build()?,
        (None, Some(path)) => {
            let grammar = Grammar::builder().json_grammar(path)?.build()?;
            println!("Grammar ({}):\n{}", grammar.classify(), grammar);
            grammar_to_automaton(&grammar)?
        },
        (None, None) => return Err("You need to supply an automaton or a grammar".into()),
    };

    println!("Automaton:\n{}", automaton);
    println!("Deterministic: {}", automaton.is_deterministic());

    let dfa = determinize(&automaton);
    println!("\nAfter subset construction:\n{}", dfa);

    for word in &args.word {
        let verdict = if dfa.accepts_str(word) { "accepted" } else { "rejected" };
        println!("{:?}: {}", word, verdict);
    }

    if let Some(output) = args.output {
        JsonGenerator::new().generate_automaton(output, &dfa)?;
    }

    Ok(())
}
