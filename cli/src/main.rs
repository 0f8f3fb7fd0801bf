#![deny(missing_docs)]

//! # RAML CLI
//!
//! Command Line Interface for the RAML 1.0 resolver.
//!
//! Supported Commands:
//! - `resolve`: parse, resolve and print a document as JSON or YAML.
//! - `preprocess`: print a document with its `!include` directives expanded.
//!
//! Logs go to stderr; `RUST_LOG` overrides the default filter.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod error;
mod options;
mod preprocess;
mod resolve;

const DEFAULT_FILTER: &str = "raml_core=info,raml_cli=info";
const VERBOSE_FILTER: &str = "raml_core=debug,raml_cli=debug";

#[derive(Parser, Debug)]
#[clap(author, version, about = "RAML 1.0 parser and resolver")]
struct Cli {
    /// Log every inclusion, library load and template application.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a document and print the result.
    Resolve(resolve::ResolveArgs),
    /// Expand `!include` directives only.
    Preprocess(preprocess::PreprocessArgs),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Resolve(args) => resolve::execute(args)?,
        Commands::Preprocess(args) => preprocess::execute(args)?,
    }

    Ok(())
}
