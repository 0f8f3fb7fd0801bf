#![deny(missing_docs)]

//! # Methods, Responses and Bodies

use crate::raml::models::resource::DefinitionChoice;
use crate::raml::models::shape::{Annotations, Property, Shape};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// An HTTP verb a resource may expose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// GET
    #[default]
    Get,
    /// PATCH
    Patch,
    /// PUT
    Put,
    /// HEAD
    Head,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
}

impl Verb {
    /// Every verb, in the order methods are processed.
    pub const ALL: [Verb; 7] = [
        Verb::Get,
        Verb::Patch,
        Verb::Put,
        Verb::Head,
        Verb::Post,
        Verb::Delete,
        Verb::Options,
    ];

    /// Maps a lower-case mapping key (`get`, `post`, ...) to a verb.
    pub fn from_key(key: &str) -> Option<Verb> {
        Verb::ALL.into_iter().find(|v| v.key() == key)
    }

    /// Upper-case name, e.g. `GET`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Patch => "PATCH",
            Verb::Put => "PUT",
            Verb::Head => "HEAD",
            Verb::Post => "POST",
            Verb::Delete => "DELETE",
            Verb::Options => "OPTIONS",
        }
    }

    /// Lower-case mapping key, e.g. `get`.
    pub fn key(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Patch => "patch",
            Verb::Put => "put",
            Verb::Head => "head",
            Verb::Post => "post",
            Verb::Delete => "delete",
            Verb::Options => "options",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One verb handler on a resource (or the method-shaped body of a template).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    /// The verb this method answers to.
    #[serde(skip)]
    pub verb: Verb,
    /// Human friendly name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Description (markdown).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Query parameters. Mutually exclusive with `query_string`.
    pub query_parameters: IndexMap<String, Property>,
    /// Request headers.
    pub headers: IndexMap<String, Property>,
    /// Query string described as a single type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_string: Option<Shape>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
    /// Request body.
    #[serde(skip_serializing_if = "Bodies::is_empty")]
    pub body: Bodies,
    /// Protocols this method is served over.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,
    /// Traits applied to this method.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub is: Vec<DefinitionChoice>,
    /// Security schemes protecting this method.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secured_by: Vec<DefinitionChoice>,
    /// Annotations.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
    /// Name of the resource type this method was (partly) derived from.
    #[serde(skip)]
    pub resource_type_name: Option<String>,
}

impl Method {
    /// An empty method for `verb`.
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            ..Self::default()
        }
    }
}

/// One possible response of a method.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// HTTP status code as written in the document.
    #[serde(skip)]
    pub code: String,
    /// Description (markdown).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Response headers.
    pub headers: IndexMap<String, Property>,
    /// Response body.
    #[serde(skip_serializing_if = "Bodies::is_empty")]
    pub body: Bodies,
    /// Annotations.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

impl Response {
    /// An empty response for `code`.
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            ..Self::default()
        }
    }
}

/// One payload description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    /// Legacy schema text or schema name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// The payload type, description, example and properties.
    #[serde(flatten)]
    pub shape: Shape,
    /// Headers documented alongside the payload.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Property>,
}

impl Body {
    /// True when nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.shape.is_empty() && self.headers.is_empty()
    }
}

/// A request or response body.
///
/// Either a flat body that relies on the default media type, or a map from
/// media type to body. After resolution at most one of the two is populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bodies {
    /// Body declared without a media type key.
    pub default: Option<Body>,
    /// Bodies keyed by media type, e.g. `application/json`.
    pub for_media_type: IndexMap<String, Body>,
}

impl Bodies {
    /// True when neither representation is populated.
    pub fn is_empty(&self) -> bool {
        self.for_media_type.is_empty() && self.default.as_ref().map_or(true, Body::is_empty)
    }

    /// Looks up a media-type body.
    pub fn get(&self, media_type: &str) -> Option<&Body> {
        self.for_media_type.get(media_type)
    }

    /// Enforces the single-representation invariant.
    ///
    /// When both forms are present the media-type map wins; each of its bodies
    /// takes any field it lacks from the flat body, which is then dropped.
    pub fn collapse(&mut self) {
        if self.for_media_type.is_empty() {
            return;
        }
        let Some(flat) = self.default.take() else {
            return;
        };
        for body in self.for_media_type.values_mut() {
            if body.schema.is_none() {
                body.schema.clone_from(&flat.schema);
            }
            if body.shape.type_.is_none() {
                body.shape.type_.clone_from(&flat.shape.type_);
            }
            if body.shape.description.is_none() {
                body.shape.description.clone_from(&flat.shape.description);
            }
            if body.shape.example.is_none() {
                body.shape.example.clone_from(&flat.shape.example);
            }
            for (name, prop) in &flat.shape.properties {
                body.shape
                    .properties
                    .entry(name.clone())
                    .or_insert_with(|| prop.clone());
            }
        }
    }
}

impl Serialize for Bodies {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.for_media_type.is_empty() {
            return match &self.default {
                Some(body) => body.serialize(serializer),
                None => serializer.serialize_map(Some(0))?.end(),
            };
        }
        let mut map = serializer.serialize_map(Some(self.for_media_type.len()))?;
        for (media_type, body) in &self.for_media_type {
            map.serialize_entry(media_type, body)?;
        }
        map.end()
    }
}
