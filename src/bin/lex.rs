use clap::Parser;
use tracing_subscriber::EnvFilter;

use formlang::lexer::ArithmeticLexer;

/// Tokenize arithmetic expressions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = false)]
    ignore_whitespace: bool,

    #[arg(required = true)]
    expressions: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let lexer = ArithmeticLexer::new().ignore_whitespace(args.ignore_whitespace);
    let mut failed = false;

    for expression in &args.expressions {
        println!("{}", expression);

        match lexer.tokenize(expression) {
            Ok(tokens) => {
                for token in tokens {
                    println!("  {}", token);
                }
            },
            Err(e) => {
                tracing::error!("{}", e);
                println!("  error: {}", e);
                failed = true;
            },
        }
    }

    if failed {
        return Err("Some expressions could not be tokenized".into());
    }

    Ok(())
}
