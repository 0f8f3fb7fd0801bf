#![deny(missing_docs)]

//! # Documents, Libraries and Declarations

use crate::raml::location::Location;
use crate::raml::models::method::{Method, Response, Verb};
use crate::raml::models::resource::{DefinitionChoice, Resource, ResourceTree};
use crate::raml::models::shape::{Annotations, Property, Shape};
use indexmap::IndexMap;
use serde::Serialize;

/// A parameterized partial method template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trait {
    /// Declared name.
    #[serde(skip)]
    pub name: String,
    /// Usage notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// The method fields the trait contributes.
    #[serde(flatten)]
    pub template: Method,
}

/// A parameterized resource template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    /// Declared name.
    #[serde(skip)]
    pub name: String,
    /// Usage notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Human friendly name template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Description template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Resource type this one inherits from.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<DefinitionChoice>,
    /// Traits applied to every method produced by this template.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub is: Vec<DefinitionChoice>,
    /// Security schemes contributed to the resource.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secured_by: Vec<DefinitionChoice>,
    /// URI parameter templates.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub uri_parameters: IndexMap<String, Property>,
    /// Method templates always copied into the resource.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub methods: IndexMap<Verb, Method>,
    /// Method templates (`get?`) applied only when the resource declares the verb.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub optional_methods: IndexMap<Verb, Method>,
    /// Annotations.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

/// The request/response pieces a security scheme contributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedBy {
    /// Headers the scheme accepts.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Property>,
    /// Query parameters the scheme accepts.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub query_parameters: IndexMap<String, Property>,
    /// Query string the scheme accepts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_string: Option<Shape>,
    /// Responses the scheme may produce.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Response>,
    /// Annotations.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

/// An authentication mechanism.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// Declared name.
    #[serde(skip)]
    pub name: String,
    /// Mechanism, e.g. `OAuth 2.0`, `Basic Authentication`, `x-custom`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    /// Human friendly name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Description (markdown).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Request/response pieces of the scheme.
    pub described_by: DescribedBy,
    /// Mechanism specific settings.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub settings: IndexMap<String, serde_yaml::Value>,
}

/// One section of user documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Documentation {
    /// Section title.
    pub title: String,
    /// Section body (markdown).
    pub content: String,
}

/// The reusable declarations a document or library exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Declarations {
    /// Data types.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub types: IndexMap<String, Shape>,
    /// Traits.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub traits: IndexMap<String, Trait>,
    /// Resource types.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub resource_types: IndexMap<String, ResourceType>,
    /// Security schemes.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
    /// Annotation types, kept as raw values.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotation_types: IndexMap<String, serde_yaml::Value>,
}

/// An importable document that only contributes declarations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Where the library was loaded from.
    pub location: Location,
    /// Usage notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Imports as written: alias to reference.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub uses: IndexMap<String, String>,
    /// Declarations.
    #[serde(flatten)]
    pub declarations: Declarations,
    /// Loaded imports keyed by alias.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub libraries: IndexMap<String, Library>,
    /// Annotations.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

impl Library {
    /// An empty library at `location`.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            usage: None,
            uses: IndexMap::new(),
            declarations: Declarations::default(),
            libraries: IndexMap::new(),
            annotations: Annotations::new(),
        }
    }
}

/// The root of a RAML API description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition {
    /// Where the root document was loaded from.
    pub location: Location,
    /// API title.
    pub title: String,
    /// API version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Description (markdown).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base URI, possibly templated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
    /// Parameters of a templated base URI.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub base_uri_parameters: IndexMap<String, Property>,
    /// Supported protocols.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,
    /// Default media types.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media_type: Vec<String>,
    /// User documentation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documentation: Vec<Documentation>,
    /// Security schemes applying to the whole API.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secured_by: Vec<DefinitionChoice>,
    /// Imports as written: alias to reference.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub uses: IndexMap<String, String>,
    /// Declarations.
    #[serde(flatten)]
    pub declarations: Declarations,
    /// Loaded imports keyed by alias.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub libraries: IndexMap<String, Library>,
    /// The resource forest, serialized as top-level `/uri` keys.
    #[serde(flatten)]
    pub resources: ResourceTree,
    /// Annotations.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

impl ApiDefinition {
    /// An empty definition at `location`.
    pub fn new(location: Location) -> Self {
        Self {
            location,
            title: String::new(),
            version: None,
            description: None,
            base_uri: None,
            base_uri_parameters: IndexMap::new(),
            protocols: Vec::new(),
            media_type: Vec::new(),
            documentation: Vec::new(),
            secured_by: Vec::new(),
            uses: IndexMap::new(),
            declarations: Declarations::default(),
            libraries: IndexMap::new(),
            resources: ResourceTree::new(),
            annotations: Annotations::new(),
        }
    }

    /// Looks up a resource by absolute path, e.g. `/users/{userId}`.
    pub fn resource(&self, full_uri: &str) -> Option<&Resource> {
        self.resources.resource(full_uri)
    }

    /// Looks up a security scheme by bare name or `alias.name`.
    pub fn security_scheme(&self, name: &str) -> Option<&SecurityScheme> {
        let name = name.trim();
        if let Some(scheme) = self.declarations.security_schemes.get(name) {
            return Some(scheme);
        }
        let (alias, local) = name.split_once('.')?;
        self.libraries
            .get(alias)?
            .declarations
            .security_schemes
            .get(local)
    }
}
