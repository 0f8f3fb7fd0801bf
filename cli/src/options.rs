//! Flags shared by every subcommand, and output plumbing.

use crate::error::CliResult;
use raml_core::config::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_INCLUDE_DEPTH};
use raml_core::ParserConfig;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Parser settings, each overridable through the environment.
#[derive(clap::Args, Debug, Clone)]
pub struct ParserArgs {
    /// Timeout in seconds for each remote fetch.
    #[clap(long, env = "RAML_FETCH_TIMEOUT", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout: u64,

    /// Maximum nesting of `!include` directives.
    #[clap(long, env = "RAML_MAX_INCLUDE_DEPTH", default_value_t = DEFAULT_MAX_INCLUDE_DEPTH)]
    pub max_include_depth: usize,

    /// Refuse to fetch URL references.
    #[clap(long, env = "RAML_OFFLINE")]
    pub offline: bool,
}

impl ParserArgs {
    /// The core configuration these flags describe.
    pub fn config(&self) -> ParserConfig {
        ParserConfig::default()
            .with_fetch_timeout(Duration::from_secs(self.fetch_timeout))
            .with_max_include_depth(self.max_include_depth)
            .with_remote(!self.offline)
    }
}

/// Writes `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> CliResult<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
            tracing::info!(path = %path.display(), "output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
