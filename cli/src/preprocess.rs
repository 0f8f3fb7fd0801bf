#![deny(missing_docs)]

//! # Preprocess Command
//!
//! Prints a document with every `!include` expanded, without decoding it.

use std::path::PathBuf;

use raml_core::RamlParser;

use crate::error::CliResult;
use crate::options::{write_output, ParserArgs};

/// Arguments for the preprocess command.
#[derive(clap::Args, Debug, Clone)]
pub struct PreprocessArgs {
    /// Path of the root document.
    pub input: PathBuf,

    /// Write the expanded text here instead of stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub parser: ParserArgs,
}

/// Executes the preprocess command.
pub fn execute(args: &PreprocessArgs) -> CliResult<()> {
    let parser = RamlParser::new(args.parser.config());
    let text = parser.preprocess_file(&args.input)?;
    write_output(args.output.as_deref(), &text)
}
