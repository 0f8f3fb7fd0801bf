#![deny(missing_docs)]

//! # Document Locations
//!
//! Identifies where a RAML document (or an included fragment) came from, so
//! that relative `!include` and `uses` references can be resolved against it.

use crate::error::{AppError, AppResult};
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// A local file path or an absolute HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Location {
    /// A file on the local filesystem.
    File(PathBuf),
    /// A remote document.
    Url(Url),
}

impl Location {
    /// Parses a user supplied reference: `http://` / `https://` become URLs,
    /// everything else is treated as a path.
    pub fn parse(reference: &str) -> AppResult<Self> {
        let reference = reference.trim();
        if is_url(reference) {
            let url = Url::parse(reference).map_err(|e| AppError::Fetch {
                reference: reference.to_string(),
                message: format!("invalid URL: {}", e),
            })?;
            return Ok(Location::Url(url));
        }
        Ok(Location::from_path(Path::new(reference)))
    }

    /// A file location with `.` and `..` segments collapsed.
    pub fn from_path(path: &Path) -> Self {
        Location::File(normalize_path(path))
    }

    /// Resolves `reference` relative to this location.
    ///
    /// Absolute URLs and absolute paths are returned as-is. A relative
    /// reference is resolved against the directory containing this document.
    pub fn join(&self, reference: &str) -> AppResult<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(AppError::Fetch {
                reference: self.to_string(),
                message: "empty reference".into(),
            });
        }
        if is_url(reference) {
            return Location::parse(reference);
        }
        match self {
            Location::File(path) => {
                let candidate = Path::new(reference);
                if candidate.is_absolute() {
                    return Ok(Location::File(normalize_path(candidate)));
                }
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Location::File(normalize_path(&dir.join(candidate))))
            }
            Location::Url(base) => base.join(reference).map(Location::Url).map_err(|e| {
                AppError::Fetch {
                    reference: reference.to_string(),
                    message: format!("cannot resolve against {}: {}", base, e),
                }
            }),
        }
    }

    /// Returns true when this location must be fetched over the network.
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Url(url) => write!(f, "{}", url),
        }
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.to_string()
    }
}

/// Collapses `.` and `..` segments without touching the filesystem, so the
/// same file always gets the same location. Leading `..` segments of a
/// relative path are kept.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Returns true if the reference is an HTTP(S) URL.
pub(crate) fn is_url(reference: &str) -> bool {
    (reference.starts_with("http://") || reference.starts_with("https://"))
        && Url::parse(reference).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_relative_file() {
        let base = Location::parse("specs/api.raml").unwrap();
        let joined = base.join("libs/common.raml").unwrap();
        assert_eq!(
            joined,
            Location::File(PathBuf::from("specs").join("libs/common.raml"))
        );
    }

    #[test]
    fn test_join_file_in_cwd() {
        let base = Location::parse("api.raml").unwrap();
        let joined = base.join("types.raml").unwrap();
        assert_eq!(joined, Location::File(PathBuf::from("types.raml")));
    }

    #[test]
    fn test_join_collapses_parent_segments() {
        let base = Location::parse("specs/sub/b.raml").unwrap();
        assert_eq!(
            base.join("../a.raml").unwrap(),
            Location::File(PathBuf::from("specs").join("a.raml"))
        );
        assert_eq!(
            base.join("./c.raml").unwrap(),
            Location::File(PathBuf::from("specs").join("sub").join("c.raml"))
        );

        let top = Location::parse("api.raml").unwrap();
        assert_eq!(
            top.join("../shared/lib.raml").unwrap(),
            Location::File(PathBuf::from("..").join("shared").join("lib.raml"))
        );
    }

    #[test]
    fn test_join_relative_url() {
        let base = Location::parse("https://example.com/raml/api.raml").unwrap();
        let joined = base.join("../shared/lib.raml").unwrap();
        assert_eq!(joined.to_string(), "https://example.com/shared/lib.raml");
        assert!(joined.is_remote());
    }

    #[test]
    fn test_join_absolute_url_from_file() {
        let base = Location::parse("api.raml").unwrap();
        let joined = base.join("http://example.com/x.raml").unwrap();
        assert!(joined.is_remote());
    }

    #[test]
    fn test_join_empty_reference_fails() {
        let base = Location::parse("api.raml").unwrap();
        assert!(matches!(base.join("  "), Err(AppError::Fetch { .. })));
    }
}
