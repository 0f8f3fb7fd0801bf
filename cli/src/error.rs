#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use raml_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// Parsing or resolution failed.
    #[display("{}", _0)]
    Core(AppError),

    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// The resolved document could not be rendered as JSON.
    #[display("JSON Error: {}", _0)]
    Json(serde_json::Error),

    /// The resolved document could not be rendered as YAML.
    #[display("YAML Error: {}", _0)]
    Yaml(serde_yaml::Error),
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Core(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Yaml(e) => Some(e),
        }
    }
}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
