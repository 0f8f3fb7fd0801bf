//! # Parser Configuration
//!
//! Knobs that bound the resources a single parse may consume.

use std::time::Duration;

/// Default timeout for a single remote fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default limit on nested `!include` directives.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// Settings for one parse run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Upper bound on the duration of each HTTP(S) fetch.
    pub fetch_timeout: Duration,
    /// How many levels of inclusion may nest before the parse is aborted.
    pub max_include_depth: usize,
    /// Whether URL references may be fetched at all.
    pub allow_remote: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            allow_remote: true,
        }
    }
}

impl ParserConfig {
    /// Returns a copy with a different fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Returns a copy with a different inclusion depth limit.
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Returns a copy that refuses (or allows) URL references.
    pub fn with_remote(mut self, allow: bool) -> Self {
        self.allow_remote = allow;
        self
    }
}
