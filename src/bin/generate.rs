use clap::Parser;
use std::io::{stdout, BufWriter, Write};
use tracing_subscriber::EnvFilter;

use formlang::{backends::interpreter::GrammarInterpreter, grammar::Grammar, pattern::Pattern};
use rand::{rngs::StdRng, SeedableRng};

/// Generate random sentences of a grammar or random expansions of a pattern.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, conflicts_with = "pattern", required_unless_present = "pattern")]
    grammar: Option<String>,

    /// A pattern like `M?N^2(O|P)^3Q*R+`
    #[arg(short, long)]
    pattern: Option<String>,

    #[arg(short, long)]
    entrypoint: Option<String>,

    #[arg(long, short, default_value_t = 1)]
    count: usize,

    #[arg(long, short)]
    seed: Option<usize>,

    /// Give up on a sentence after this many expansions
    #[arg(long)]
    max_expansions: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut stream = BufWriter::new(stdout());

    if let Some(pattern) = args.pattern {
        let pattern = Pattern::parse(&pattern)?;
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed as u64),
            None => StdRng::from_entropy(),
        };

        for _ in 0..args.count {
            writeln!(&mut stream, "{}", pattern.sample(&mut rng))?;
        }
    } else if let Some(path) = args.grammar {
        let mut builder = Grammar::builder().json_grammar(path)?;

        if let Some(entrypoint) = args.entrypoint {
            builder = builder.entrypoint(entrypoint);
        }

        let grammar = builder.build()?;
        let mut interpreter = GrammarInterpreter::new(&grammar);

        if let Some(seed) = args.seed {
            interpreter.seed(seed);
        }

        if let Some(max_expansions) = args.max_expansions {
            interpreter.max_expansions(max_expansions);
        }

        for _ in 0..args.count {
            interpreter.interpret(&mut stream)?;
            writeln!(&mut stream)?;
        }
    }

    stream.flush()?;
    Ok(())
}
