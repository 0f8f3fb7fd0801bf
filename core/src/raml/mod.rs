//! # RAML 1.0
//!
//! Everything between a root document on disk (or behind a URL) and a fully
//! resolved [`models::ApiDefinition`].

/// Where a document came from.
pub mod location;

/// Byte sources for locations.
pub mod loader;

/// `!include` expansion.
pub mod preprocess;

/// The typed document model.
pub mod models;

/// YAML node tree to model decoding.
pub mod builder;

/// Placeholder value transforms.
pub mod inflector;

/// `<<param>>` substitution.
pub mod substitution;

/// Symbol tables across imported libraries.
pub mod libraries;

/// Resource type and trait application.
pub mod inheritance;

/// Shortcut rewriting after inheritance.
pub mod normalization;

/// The end-to-end pipeline.
pub mod parser;
