//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every variant is fatal for the document being parsed: there is no
//! partial-success mode, callers either receive a fully resolved document or
//! one of these errors.

use derive_more::{Display, From};
use std::fmt;

/// The kind of named declaration a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReferenceKind {
    /// A `resourceTypes` entry.
    #[display("resource type")]
    ResourceType,
    /// A `traits` entry.
    #[display("trait")]
    Trait,
    /// A `securitySchemes` entry.
    #[display("security scheme")]
    SecurityScheme,
}

/// A single structural problem found while decoding the raw node tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeIssue {
    /// The entity being decoded, e.g. `resource /users` or `trait paged`.
    pub entity: String,
    /// The offending field name.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl fmt::Display for DecodeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.entity, self.field, self.message)
    }
}

/// All structural issues collected during one decode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeErrors {
    /// Issues in the order they were found.
    pub issues: Vec<DecodeIssue>,
}

impl DecodeErrors {
    /// Records an issue.
    pub fn push(
        &mut self,
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.issues.push(DecodeIssue {
            entity: entity.into(),
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns true when nothing went wrong.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Converts the collected issues into a result.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Decode(self))
        }
    }
}

impl fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} structural error(s):", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A file or URL could not be read.
    #[from(ignore)]
    #[display("could not read '{reference}': {message}")]
    Fetch {
        /// The path or URL that failed.
        reference: String,
        /// Underlying failure description.
        message: String,
    },

    /// An `!include` directive failed; wraps the underlying cause.
    #[from(ignore)]
    #[display("error including '{reference}': {source}")]
    Include {
        /// The reference named by the directive.
        reference: String,
        /// The underlying failure.
        source: Box<AppError>,
    },

    /// Nested inclusions went deeper than the configured limit.
    #[from(ignore)]
    #[display("inclusion of '{reference}' exceeds the maximum depth of {limit}")]
    IncludeDepth {
        /// The reference that would have exceeded the limit.
        reference: String,
        /// The configured limit.
        limit: usize,
    },

    /// A library listed under `uses` failed to load or resolve.
    #[from(ignore)]
    #[display("failed to load library '{alias}' ({reference}): {source}")]
    Library {
        /// The alias the library was imported under.
        alias: String,
        /// The reference it was imported from.
        reference: String,
        /// The underlying failure.
        source: Box<AppError>,
    },

    /// The document does not start with the RAML 1.0 version header.
    #[from(ignore)]
    #[display("'{location}' is not a RAML 1.0 document: it must start with #%RAML 1.0")]
    Version {
        /// The offending document.
        location: String,
    },

    /// The preprocessed text is not well-formed YAML.
    #[from(ignore)]
    #[display("failed to parse YAML in '{location}': {message}")]
    Yaml {
        /// The offending document.
        location: String,
        /// Decoder message.
        message: String,
    },

    /// One or more fields had the wrong shape.
    #[display("{_0}")]
    Decode(DecodeErrors),

    /// A resource type, trait or security scheme that is not declared anywhere reachable.
    #[from(ignore)]
    #[display("unknown {kind} '{name}'")]
    Reference {
        /// What kind of declaration was expected.
        kind: ReferenceKind,
        /// The missing identifier as written.
        name: String,
    },

    /// A placeholder used an inflector that does not exist.
    #[from(ignore)]
    #[display("unknown inflector '{_0}'")]
    UnknownInflector(String),

    /// Libraries import each other in a loop.
    #[from(ignore)]
    #[display("library import cycle: {}", _0.join(" -> "))]
    LibraryCycle(Vec<String>),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e) => Some(e),
            AppError::Include { source, .. } | AppError::Library { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
