#![deny(missing_docs)]

//! # Resolution Orchestrator
//!
//! Runs the whole pipeline for one root document:
//!
//! 1. Version header check.
//! 2. `!include` expansion.
//! 3. YAML decoding and model building.
//! 4. Recursive library loading, relative to each importing document.
//! 5. Symbol tables and `securedBy` validation.
//! 6. Resource type and trait inheritance, parents before children.
//! 7. Shape normalization.
//!
//! Any error aborts the parse; no partially resolved document is returned.

use crate::config::ParserConfig;
use crate::error::{AppError, AppResult};
use crate::raml::builder::{build_api, build_library};
use crate::raml::inheritance::resolve_resources;
use crate::raml::libraries::SymbolTable;
use crate::raml::loader::{DefaultLoader, SourceLoader};
use crate::raml::location::Location;
use crate::raml::models::{ApiDefinition, Library};
use crate::raml::normalization::normalize_api;
use crate::raml::preprocess::Preprocessor;
use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, info};

/// The header every RAML 1.0 document (and library) starts with.
pub const VERSION_HEADER: &str = "#%RAML 1.0";

/// Parses and resolves RAML 1.0 documents.
pub struct RamlParser<L: SourceLoader = DefaultLoader> {
    config: ParserConfig,
    loader: L,
}

impl RamlParser<DefaultLoader> {
    /// Creates a parser reading from the filesystem and, when allowed, the network.
    pub fn new(config: ParserConfig) -> Self {
        let loader = DefaultLoader::new(&config);
        Self { config, loader }
    }
}

impl Default for RamlParser<DefaultLoader> {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl<L: SourceLoader> RamlParser<L> {
    /// Creates a parser that reads every document through `loader`.
    pub fn with_loader(config: ParserConfig, loader: L) -> Self {
        Self { config, loader }
    }

    /// The active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses and resolves the document at `path`.
    ///
    /// # Examples
    /// ```
    /// use raml_core::{ParserConfig, RamlParser};
    /// use raml_core::raml::loader::MemoryLoader;
    ///
    /// let loader = MemoryLoader::new().with("api.raml", "#%RAML 1.0\ntitle: Demo\n/ping:\n  get:\n");
    /// let parser = RamlParser::with_loader(ParserConfig::default(), loader);
    /// let api = parser.parse_file("api.raml").unwrap();
    /// assert_eq!(api.title, "Demo");
    /// assert!(api.resource("/ping").is_some());
    /// ```
    pub fn parse_file(&self, path: impl AsRef<Path>) -> AppResult<ApiDefinition> {
        self.parse_location(Location::from_path(path.as_ref()))
    }

    /// Parses and resolves the document behind an absolute URL.
    pub fn parse_url(&self, url: &str) -> AppResult<ApiDefinition> {
        self.parse_location(Location::parse(url)?)
    }

    /// Parses and resolves the document at `location`.
    pub fn parse_location(&self, location: Location) -> AppResult<ApiDefinition> {
        let text = self.read_text(&location)?;
        self.parse_str(&text, location)
    }

    /// Parses and resolves `text` as if it had been read from `location`.
    ///
    /// Relative `!include` and `uses` references resolve against `location`.
    pub fn parse_str(&self, text: &str, location: Location) -> AppResult<ApiDefinition> {
        let root = self.decode(text, &location)?;
        let mut api = build_api(&root, location)?;

        let mut stack = vec![api.location.to_string()];
        api.libraries = self.load_libraries(&api.uses, &api.location, &mut stack)?;

        let symbols = SymbolTable::build(&api);
        check_security(&api, &symbols)?;
        resolve_resources(&mut api, &symbols)?;
        normalize_api(&mut api);

        info!(
            location = %api.location,
            title = %api.title,
            resources = api.resources.len(),
            libraries = api.libraries.len(),
            "document resolved"
        );
        Ok(api)
    }

    /// Reads the document at `path` and returns its inclusion-expanded text.
    pub fn preprocess_file(&self, path: impl AsRef<Path>) -> AppResult<String> {
        let location = Location::from_path(path.as_ref());
        let text = self.read_text(&location)?;
        check_version(&text, &location)?;
        self.preprocessor().expand(&text, &location)
    }

    fn preprocessor(&self) -> Preprocessor<'_, L> {
        Preprocessor::new(&self.loader, self.config.max_include_depth)
    }

    fn read_text(&self, location: &Location) -> AppResult<String> {
        let bytes = self.loader.load(location)?;
        String::from_utf8(bytes).map_err(|e| AppError::Fetch {
            reference: location.to_string(),
            message: format!("not valid UTF-8: {}", e),
        })
    }

    fn decode(&self, text: &str, location: &Location) -> AppResult<serde_yaml::Value> {
        check_version(text, location)?;
        let expanded = self.preprocessor().expand(text, location)?;
        serde_yaml::from_str(&expanded).map_err(|e| AppError::Yaml {
            location: location.to_string(),
            message: e.to_string(),
        })
    }

    /// Loads every library in `uses`. `stack` holds the documents currently
    /// being loaded, outermost first.
    fn load_libraries(
        &self,
        uses: &IndexMap<String, String>,
        base: &Location,
        stack: &mut Vec<String>,
    ) -> AppResult<IndexMap<String, Library>> {
        let mut libraries = IndexMap::with_capacity(uses.len());
        for (alias, reference) in uses {
            let library = self
                .load_library(reference, base, stack)
                .map_err(|e| match e {
                    cycle @ AppError::LibraryCycle(_) => cycle,
                    other => AppError::Library {
                        alias: alias.clone(),
                        reference: reference.clone(),
                        source: Box::new(other),
                    },
                })?;
            libraries.insert(alias.clone(), library);
        }
        Ok(libraries)
    }

    fn load_library(
        &self,
        reference: &str,
        base: &Location,
        stack: &mut Vec<String>,
    ) -> AppResult<Library> {
        let location = base.join(reference)?;
        let key = location.to_string();
        if stack.contains(&key) {
            let mut chain = stack.clone();
            chain.push(key);
            return Err(AppError::LibraryCycle(chain));
        }

        debug!(library = %location, "loading library");
        let text = self.read_text(&location)?;
        let root = self.decode(&text, &location)?;
        let mut library = build_library(&root, location)?;

        stack.push(key);
        let nested = self.load_libraries(&library.uses, &library.location, stack);
        stack.pop();
        library.libraries = nested?;
        Ok(library)
    }
}

/// Rejects documents whose first line is not the RAML 1.0 header.
pub fn check_version(text: &str, location: &Location) -> AppResult<()> {
    let first = text
        .trim_start_matches('\u{feff}')
        .lines()
        .next()
        .unwrap_or_default();
    if first.trim_start().starts_with(VERSION_HEADER) {
        Ok(())
    } else {
        Err(AppError::Version {
            location: location.to_string(),
        })
    }
}

/// Validates the `securedBy` references the document states itself.
fn check_security(api: &ApiDefinition, symbols: &SymbolTable) -> AppResult<()> {
    symbols.check_secured_by(&api.secured_by, None)?;
    for id in api.resources.depth_first() {
        let resource = api.resources.get(id);
        symbols.check_secured_by(&resource.secured_by, None)?;
        for method in resource.methods.values() {
            symbols.check_secured_by(&method.secured_by, None)?;
        }
    }
    Ok(())
}
