#![deny(missing_docs)]

//! # Inclusion Preprocessor
//!
//! Expands `!include <reference>[#<fragment>]` directives textually, before the
//! YAML decoder ever sees the document.
//!
//! Rules:
//! - Only the text after the directive keyword is the reference; anything after
//!   a `#` is kept as a trailer line after the spliced content.
//! - The included text starts on a fresh line and every line is indented to the
//!   column of the directive, so it nests under the key that included it.
//! - A line declaring a `type` splices the content as a literal block scalar
//!   (`|`), since type bodies are opaque schema text.
//! - Content that is not valid UTF-8 is spliced as an empty inclusion.
//! - Included content is expanded recursively, relative to its own location.

use crate::error::{AppError, AppResult};
use crate::raml::loader::SourceLoader;
use crate::raml::location::Location;

/// The directive keyword.
pub const INCLUDE_DIRECTIVE: &str = "!include";

/// Expands inclusion directives using a [`SourceLoader`].
pub struct Preprocessor<'a, L: SourceLoader + ?Sized> {
    loader: &'a L,
    max_depth: usize,
}

impl<'a, L: SourceLoader + ?Sized> Preprocessor<'a, L> {
    /// Creates a preprocessor that aborts past `max_depth` nested inclusions.
    pub fn new(loader: &'a L, max_depth: usize) -> Self {
        Self { loader, max_depth }
    }

    /// Expands every directive in `text`, resolving references against `base`.
    pub fn expand(&self, text: &str, base: &Location) -> AppResult<String> {
        self.expand_at(text, base, 0)
    }

    fn expand_at(&self, text: &str, base: &Location, depth: usize) -> AppResult<String> {
        let mut out = String::with_capacity(text.len());

        for line in text.lines() {
            let Some(idx) = line.find(INCLUDE_DIRECTIVE) else {
                out.push_str(line);
                out.push('\n');
                continue;
            };

            let directive = parse_directive(&line[idx + INCLUDE_DIRECTIVE.len()..]);
            let included = self
                .include(&directive.reference, base, depth)
                .map_err(|e| AppError::Include {
                    reference: directive.reference.clone(),
                    source: Box::new(e),
                })?;

            out.push_str(&line[..idx]);

            let prefix = if declares_type(line) { "|\n" } else { "\n" };
            let indent = " ".repeat(line[..idx].chars().count());
            let spliced = format!("{}{}", prefix, included);
            for (i, included_line) in spliced.lines().enumerate() {
                if i > 0 {
                    out.push_str(&indent);
                }
                out.push_str(included_line);
                out.push('\n');
            }

            if let Some(fragment) = directive.fragment {
                out.push_str(&indent);
                out.push('#');
                out.push_str(&fragment);
                out.push('\n');
            }
        }

        Ok(out)
    }

    fn include(&self, reference: &str, base: &Location, depth: usize) -> AppResult<String> {
        if depth >= self.max_depth {
            return Err(AppError::IncludeDepth {
                reference: reference.to_string(),
                limit: self.max_depth,
            });
        }

        let target = base.join(reference)?;
        tracing::debug!(target = %target, depth, "expanding inclusion");
        let bytes = self.loader.load(&target)?;

        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                tracing::warn!(target = %target, "included content is not UTF-8; splicing nothing");
                String::new()
            }
        };

        self.expand_at(&content, &target, depth + 1)
    }
}

/// A parsed `!include` line fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    reference: String,
    fragment: Option<String>,
}

fn parse_directive(after_keyword: &str) -> Directive {
    match after_keyword.split_once('#') {
        Some((reference, fragment)) => Directive {
            reference: reference.trim().to_string(),
            fragment: Some(fragment.to_string()),
        },
        None => Directive {
            reference: after_keyword.trim().to_string(),
            fragment: None,
        },
    }
}

fn declares_type(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("type ") || trimmed.starts_with("type:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raml::loader::MemoryLoader;
    use pretty_assertions::assert_eq;

    fn expand(loader: &MemoryLoader, text: &str) -> AppResult<String> {
        let base = Location::parse("api/main.raml").unwrap();
        Preprocessor::new(loader, 8).expand(text, &base)
    }

    #[test]
    fn test_plain_text_passthrough() {
        let loader = MemoryLoader::new();
        let out = expand(&loader, "title: x\nversion: v1").unwrap();
        assert_eq!(out, "title: x\nversion: v1\n");
    }

    #[test]
    fn test_include_reindents_under_key() {
        let loader = MemoryLoader::new().with("api/traits/paged.raml", "queryParameters:\n  page: integer");
        let out = expand(&loader, "traits:\n  paged: !include traits/paged.raml").unwrap();
        assert_eq!(
            out,
            "traits:\n  paged: \n         queryParameters:\n           page: integer\n"
        );
        let value: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(
            value["traits"]["paged"]["queryParameters"]["page"],
            serde_yaml::Value::String("integer".into())
        );
    }

    #[test]
    fn test_type_line_becomes_block_scalar() {
        let loader = MemoryLoader::new().with("api/user.json", "{\n  \"type\": \"object\"\n}");
        let out = expand(&loader, "body:\n  type: !include user.json").unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(
            value["body"]["type"].as_str().unwrap(),
            "{\n  \"type\": \"object\"\n}\n"
        );
    }

    #[test]
    fn test_fragment_is_kept_as_trailer() {
        let loader = MemoryLoader::new().with("api/doc.md", "hello");
        let out = expand(&loader, "content: !include doc.md#intro").unwrap();
        assert_eq!(out, "content: \n         hello\n         #intro\n");
    }

    #[test]
    fn test_recursive_include_uses_own_base() {
        let loader = MemoryLoader::new()
            .with("api/types/user.raml", "properties: !include fields/user.raml")
            .with("api/types/fields/user.raml", "name: string");
        let out = expand(&loader, "User: !include types/user.raml").unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(value["User"]["properties"]["name"].as_str(), Some("string"));
    }

    #[test]
    fn test_non_utf8_is_empty_inclusion() {
        let loader = MemoryLoader::new().with("api/blob.bin", vec![0xff, 0xfe, 0x00]);
        let out = expand(&loader, "example: !include blob.bin").unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        assert!(value["example"].is_null());
    }

    #[test]
    fn test_missing_reference_aborts_with_name() {
        let loader = MemoryLoader::new();
        let err = expand(&loader, "types: !include missing.raml").unwrap_err();
        assert!(matches!(err, AppError::Include { ref reference, .. } if reference == "missing.raml"));
        assert!(err.to_string().contains("missing.raml"));
    }

    #[test]
    fn test_self_inclusion_hits_depth_limit() {
        let loader = MemoryLoader::new().with("api/loop.raml", "again: !include loop.raml");
        let err = expand(&loader, "start: !include loop.raml").unwrap_err();
        let mut cause: &dyn std::error::Error = &err;
        while let Some(next) = cause.source() {
            cause = next;
        }
        assert!(cause.to_string().contains("maximum depth of 8"));
    }

    #[test]
    fn test_parse_directive_splits_fragment() {
        let d = parse_directive(" schemas/a.json#/definitions/A");
        assert_eq!(d.reference, "schemas/a.json");
        assert_eq!(d.fragment.as_deref(), Some("/definitions/A"));
    }
}
