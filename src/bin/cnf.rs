use clap::Parser;
use tracing_subscriber::EnvFilter;

use formlang::{
    backends::json::JsonGenerator,
    grammar::{cnf, Grammar},
};

/// Normalize a context-free grammar into Chomsky Normal Form, printing every stage.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    grammar: String,

    #[arg(short, long)]
    entrypoint: Option<String>,

    /// Split long right-hand sides into binary productions
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Write the final grammar to this file instead of printing it
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Grammar::builder().json_grammar(&args.grammar)?;

    if let Some(entrypoint) = args.entrypoint {
        builder = builder.entrypoint(entrypoint);
    }

    let grammar = builder.build()?;
    println!("Input grammar ({}):\n{}", grammar.classify(), grammar);

    let stages: [(&str, fn(&Grammar) -> Grammar); 5] = [
        ("Without ε-productions", cnf::eliminate_epsilon),
        ("Without unit productions", cnf::eliminate_unit),
        ("Without unreachable symbols", cnf::eliminate_unreachable),
        ("Without non-productive symbols", cnf::eliminate_non_productive),
        ("Without orphaned symbols", cnf::eliminate_unreachable),
    ];

    let mut current = grammar;

    for (title, pass) in stages {
        current = pass(&current);
        println!("{}:\n{}", title, current);
    }

    let result = cnf::binarize(&current, args.strict);

    if let Some(output) = args.output {
        JsonGenerator::new().generate(output, &result)?;
    } else {
        println!("Chomsky Normal Form:\n{}", result);
    }

    Ok(())
}
