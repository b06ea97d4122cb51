//! The `lexparse` command-line tool.
//!
//! Dumps the token stream of a file, or evaluates an arithmetic expression
//! with the bundled calculator grammar. Errors are rendered as miette reports.

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser as ClapParser, Subcommand};

use crate::{
    errors::{print_error, Result, SourceContext},
    lexer::{ConfigError, Lexer, LexerConfig},
    token::Token,
};

pub mod calc;

// ============================================================================
// CLI ARGUMENTS - Command-line argument definitions
// ============================================================================

#[derive(Debug, ClapParser)]
#[command(
    name = "lexparse",
    version,
    about = "Regex-driven lexing and packrat parsing from the command line."
)]
pub struct LexparseArgs {
    #[command(subcommand)]
    pub command: ArgsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Print the token stream of a file, one token per line.
    Tokens {
        /// The file to tokenize.
        #[arg(required = true)]
        file: PathBuf,
        /// Lexer configuration (YAML, or JSON with a `.json` extension).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit the tokens as a JSON array.
        #[arg(long)]
        json: bool,
    },
    /// Evaluate an arithmetic expression.
    Calc {
        /// The expression, e.g. "(2 + -7) * 8".
        #[arg(required = true)]
        expression: String,
    },
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

pub fn run() {
    init_tracing();
    let args = LexparseArgs::parse();

    let result = match args.command {
        ArgsCommand::Tokens { file, config, json } => {
            dump_tokens(&file, config.as_ref(), json)
        }
        ArgsCommand::Calc { expression } => calc::evaluate(&expression).map(|n| println!("{n}")),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

/// Installs a `RUST_LOG`-filtered subscriber; logging stays off otherwise.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn dump_tokens(file: &Path, config: Option<&PathBuf>, json: bool) -> Result<()> {
    let config = match config {
        Some(path) => LexerConfig::load(path)?,
        None => LexerConfig::default(),
    };
    let lexer = Lexer::new(config)?;
    let source = fs::read_to_string(file).map_err(|source| ConfigError::Io {
        path: file.display().to_string(),
        source,
    })?;
    let name = file.display().to_string();
    let tokens = lexer
        .list(&source, Some(&name))
        .map_err(|e| e.with_source(&SourceContext::new(name.as_str(), source.as_str())))?;

    if json {
        let text = serde_json::to_string_pretty(&tokens).map_err(ConfigError::from)?;
        println!("{text}");
    } else {
        for token in &tokens {
            print_token(token);
        }
    }
    Ok(())
}

fn print_token(token: &Token) {
    println!(
        "{:>4}  {:>5}..{:<5}  {}",
        token.line_number(),
        token.marker.start_index,
        token.marker.end_index,
        token.descriptor()
    );
}
