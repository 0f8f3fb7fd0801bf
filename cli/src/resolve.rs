#![deny(missing_docs)]

//! # Resolve Command
//!
//! Runs the full pipeline and prints the resolved document.

use std::path::PathBuf;

use raml_core::{ApiDefinition, Location, RamlParser};

use crate::error::CliResult;
use crate::options::{write_output, ParserArgs};

/// Rendering of the resolved document.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Arguments for the resolve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Path or http(s) URL of the root document.
    pub input: String,

    /// Output format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the document here instead of stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub parser: ParserArgs,
}

/// Executes the resolve command.
pub fn execute(args: &ResolveArgs) -> CliResult<()> {
    let parser = RamlParser::new(args.parser.config());
    let api = parser.parse_location(Location::parse(&args.input)?)?;
    let rendered = render(&api, args.format)?;
    write_output(args.output.as_deref(), &rendered)
}

/// Serializes a resolved document.
pub fn render(api: &ApiDefinition, format: OutputFormat) -> CliResult<String> {
    Ok(match format {
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(api)?;
            text.push('\n');
            text
        }
        OutputFormat::Yaml => serde_yaml::to_string(api)?,
    })
}
