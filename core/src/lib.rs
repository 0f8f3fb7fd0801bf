#![deny(missing_docs)]

//! # RAML Core
//!
//! Core library for parsing and resolving RAML 1.0 API descriptions.
//!
//! A parse expands `!include` directives, decodes the YAML into a typed model,
//! loads imported libraries, applies resource types and traits with parameter
//! substitution, and normalizes shape shortcuts. The result is a
//! self-contained [`ApiDefinition`].

/// Shared error types.
pub mod error;

/// Parser settings.
pub mod config;

/// The RAML pipeline and document model.
pub mod raml;

pub use config::ParserConfig;
pub use error::{AppError, AppResult};
pub use raml::loader::{DefaultLoader, MemoryLoader, SourceLoader};
pub use raml::location::Location;
pub use raml::models::{ApiDefinition, Library, Method, Resource, Verb};
pub use raml::parser::RamlParser;
