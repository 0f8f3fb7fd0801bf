#![deny(missing_docs)]

//! # Source Loading
//!
//! Supplies raw bytes for a [`Location`]. The parser only talks to the
//! [`SourceLoader`] trait, so embedders can serve documents from memory or
//! any other store.

use crate::config::ParserConfig;
use crate::error::{AppError, AppResult};
use crate::raml::location::Location;
use std::collections::HashMap;
use std::fs;

/// Provides the bytes behind a location.
pub trait SourceLoader {
    /// Reads the full contents of `location`.
    fn load(&self, location: &Location) -> AppResult<Vec<u8>>;
}

/// Reads local files and, with the `remote` feature, fetches URLs with a
/// plain unauthenticated GET.
pub struct DefaultLoader {
    allow_remote: bool,
    #[cfg(feature = "remote")]
    agent: ureq::Agent,
}

impl DefaultLoader {
    /// Builds a loader honoring the timeout and remote settings of `config`.
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            allow_remote: config.allow_remote,
            #[cfg(feature = "remote")]
            agent: ureq::Agent::config_builder()
                .timeout_global(Some(config.fetch_timeout))
                .build()
                .into(),
        }
    }

    fn load_file(&self, location: &Location, path: &std::path::Path) -> AppResult<Vec<u8>> {
        if path.as_os_str().is_empty() {
            return Err(AppError::Fetch {
                reference: location.to_string(),
                message: "file name cannot be empty".into(),
            });
        }
        fs::read(path).map_err(|e| AppError::Fetch {
            reference: location.to_string(),
            message: e.to_string(),
        })
    }

    #[cfg(feature = "remote")]
    fn load_url(&self, url: &url::Url) -> AppResult<Vec<u8>> {
        let fail = |message: String| AppError::Fetch {
            reference: url.to_string(),
            message,
        };
        // Non-2xx statuses surface as `ureq::Error::StatusCode`.
        let mut response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|e| fail(e.to_string()))?;
        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| fail(e.to_string()))
    }

    #[cfg(not(feature = "remote"))]
    fn load_url(&self, url: &url::Url) -> AppResult<Vec<u8>> {
        Err(AppError::Fetch {
            reference: url.to_string(),
            message: "remote references require the `remote` feature".into(),
        })
    }
}

impl Default for DefaultLoader {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl SourceLoader for DefaultLoader {
    fn load(&self, location: &Location) -> AppResult<Vec<u8>> {
        match location {
            Location::File(path) => self.load_file(location, path),
            Location::Url(url) => {
                if !self.allow_remote {
                    return Err(AppError::Fetch {
                        reference: url.to_string(),
                        message: "remote references are disabled".into(),
                    });
                }
                tracing::debug!(url = %url, "fetching remote document");
                self.load_url(url)
            }
        }
    }
}

/// Serves documents from an in-memory map keyed by the location's display form.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `content` under `location`, returning `self` for chaining.
    pub fn with(mut self, location: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(location, content);
        self
    }

    /// Registers `content` under `location`.
    pub fn insert(&mut self, location: &str, content: impl Into<Vec<u8>>) {
        let key = Location::parse(location)
            .map(|l| l.to_string())
            .unwrap_or_else(|_| location.to_string());
        self.documents.insert(key, content.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, location: &Location) -> AppResult<Vec<u8>> {
        self.documents
            .get(&location.to_string())
            .cloned()
            .ok_or_else(|| AppError::Fetch {
                reference: location.to_string(),
                message: "no such document".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_loader_roundtrip() {
        let loader = MemoryLoader::new().with("specs/api.raml", "#%RAML 1.0\n");
        let loc = Location::parse("specs/api.raml").unwrap();
        assert_eq!(loader.load(&loc).unwrap(), b"#%RAML 1.0\n".to_vec());
    }

    #[test]
    fn test_memory_loader_missing() {
        let loader = MemoryLoader::new();
        let loc = Location::parse("nope.raml").unwrap();
        assert!(matches!(loader.load(&loc), Err(AppError::Fetch { .. })));
    }

    #[test]
    fn test_default_loader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.raml");
        fs::write(&path, "title: x").unwrap();
        let loader = DefaultLoader::default();
        let bytes = loader.load(&Location::File(path)).unwrap();
        assert_eq!(bytes, b"title: x".to_vec());
    }

    #[test]
    fn test_default_loader_missing_file_names_reference() {
        let loader = DefaultLoader::default();
        let err = loader
            .load(&Location::parse("/definitely/not/here.raml").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.raml"));
    }

    #[test]
    fn test_default_loader_offline_refuses_urls() {
        let loader = DefaultLoader::new(&ParserConfig::default().with_remote(false));
        let loc = Location::parse("https://example.com/api.raml").unwrap();
        let err = loader.load(&loc).unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }
}
