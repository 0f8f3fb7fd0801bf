#![deny(missing_docs)]

//! # Resources
//!
//! Resources form a forest keyed by relative URI. The forest is stored as an
//! arena: each node owns the handles of its children and keeps a plain handle
//! back to its parent, so full paths can be rebuilt without ownership cycles.

use crate::raml::models::method::{Method, Verb};
use crate::raml::models::shape::{Annotations, Property};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A reference to a resource type, trait or security scheme, with optional
/// template parameters: `name` or `{name: {param: value}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionChoice {
    /// Referenced name, possibly `alias.name`.
    pub name: String,
    /// Template parameter values, stringified.
    pub parameters: IndexMap<String, String>,
}

impl DefinitionChoice {
    /// A reference without parameters.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: IndexMap::new(),
        }
    }

    /// `securedBy: [null]` grants anonymous access.
    pub fn is_anonymous(&self) -> bool {
        self.name == "null"
    }
}

impl Serialize for DefinitionChoice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.parameters.is_empty() {
            return serializer.serialize_str(&self.name);
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.parameters)?;
        map.end()
    }
}

/// A node of the path tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    /// URI relative to the parent, e.g. `/{userId}`.
    pub uri: String,
    /// Human friendly name.
    pub display_name: Option<String>,
    /// Description (markdown).
    pub description: Option<String>,
    /// Resource type this resource inherits from.
    pub type_: Option<DefinitionChoice>,
    /// Traits applied to every method of this resource.
    pub is: Vec<DefinitionChoice>,
    /// Security schemes protecting every method of this resource.
    pub secured_by: Vec<DefinitionChoice>,
    /// URI parameters.
    pub uri_parameters: IndexMap<String, Property>,
    /// Methods keyed by verb.
    pub methods: IndexMap<Verb, Method>,
    /// Annotations.
    pub annotations: Annotations,
}

impl Resource {
    /// An empty resource at `uri`.
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.trim().to_string(),
            ..Self::default()
        }
    }

    /// The method for `verb`, if present.
    pub fn method(&self, verb: Verb) -> Option<&Method> {
        self.methods.get(&verb)
    }
}

/// Stable handle into a [`ResourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(usize);

#[derive(Debug, Clone, PartialEq)]
struct ResourceNode {
    resource: Resource,
    parent: Option<ResourceId>,
    children: Vec<ResourceId>,
}

/// The resource forest of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTree {
    nodes: Vec<ResourceNode>,
    roots: Vec<ResourceId>,
}

impl ResourceTree {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `resource` under `parent` (or as a root) and returns its handle.
    pub fn insert(&mut self, parent: Option<ResourceId>, resource: Resource) -> ResourceId {
        let id = ResourceId(self.nodes.len());
        self.nodes.push(ResourceNode {
            resource,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Number of resources in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no resources are declared.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level resources in declaration order.
    pub fn roots(&self) -> &[ResourceId] {
        &self.roots
    }

    /// The resource behind `id`.
    pub fn get(&self, id: ResourceId) -> &Resource {
        &self.nodes[id.0].resource
    }

    /// Mutable access to the resource behind `id`.
    pub fn get_mut(&mut self, id: ResourceId) -> &mut Resource {
        &mut self.nodes[id.0].resource
    }

    /// The parent handle, `None` for roots.
    pub fn parent(&self, id: ResourceId) -> Option<ResourceId> {
        self.nodes[id.0].parent
    }

    /// Nested resources in declaration order.
    pub fn children(&self, id: ResourceId) -> &[ResourceId] {
        &self.nodes[id.0].children
    }

    /// Handles in depth-first pre-order: every parent precedes its children.
    pub fn depth_first(&self) -> Vec<ResourceId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<ResourceId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// The absolute path of a resource, e.g. `/users/{userId}`.
    pub fn full_uri(&self, id: ResourceId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            segments.push(self.get(c).uri.trim_end_matches('/').to_string());
            current = self.parent(c);
        }
        segments.reverse();
        let joined = segments.concat();
        if joined.is_empty() {
            "/".to_string()
        } else {
            joined
        }
    }

    /// The rightmost path segment that is not a URI parameter, walking up to
    /// ancestors when needed. Empty when there is none.
    pub fn resource_path_name(&self, id: ResourceId) -> String {
        self.full_uri(id)
            .split('/')
            .rev()
            .find(|segment| !segment.is_empty() && !segment.contains('{'))
            .unwrap_or_default()
            .to_string()
    }

    /// Finds a resource by its absolute path.
    pub fn find(&self, full_uri: &str) -> Option<ResourceId> {
        self.depth_first()
            .into_iter()
            .find(|id| self.full_uri(*id) == full_uri)
    }

    /// Looks up a resource by its absolute path.
    pub fn resource(&self, full_uri: &str) -> Option<&Resource> {
        self.find(full_uri).map(|id| self.get(id))
    }

    fn view(&self, id: ResourceId) -> ResourceView<'_> {
        ResourceView { tree: self, id }
    }
}

impl Serialize for ResourceTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.roots.len()))?;
        for id in &self.roots {
            map.serialize_entry(&self.get(*id).uri, &self.view(*id))?;
        }
        map.end()
    }
}

/// Serializes a resource in document form: fields, verbs and nested `/uri` keys.
struct ResourceView<'a> {
    tree: &'a ResourceTree,
    id: ResourceId,
}

impl Serialize for ResourceView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let r = self.tree.get(self.id);
        let mut map = serializer.serialize_map(None)?;
        if let Some(v) = &r.display_name {
            map.serialize_entry("displayName", v)?;
        }
        if let Some(v) = &r.description {
            map.serialize_entry("description", v)?;
        }
        if let Some(v) = &r.type_ {
            map.serialize_entry("type", v)?;
        }
        if !r.is.is_empty() {
            map.serialize_entry("is", &r.is)?;
        }
        if !r.secured_by.is_empty() {
            map.serialize_entry("securedBy", &r.secured_by)?;
        }
        map.serialize_entry("uriParameters", &r.uri_parameters)?;
        if !r.annotations.is_empty() {
            map.serialize_entry("annotations", &r.annotations)?;
        }
        for (verb, method) in &r.methods {
            map.serialize_entry(verb.key(), method)?;
        }
        for child in self.tree.children(self.id) {
            map.serialize_entry(&self.tree.get(*child).uri, &self.tree.view(*child))?;
        }
        map.end()
    }
}

/// Derived names for a resource, used to seed template dictionaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    /// Absolute path.
    pub full_uri: String,
    /// Path relative to the parent.
    pub relative_uri: String,
    /// Rightmost non-parameter segment.
    pub path_name: String,
}

impl ResourceNames {
    /// Computes the names for `id`.
    pub fn of(tree: &ResourceTree, id: ResourceId) -> Self {
        Self {
            full_uri: tree.full_uri(id),
            relative_uri: tree.get(id).uri.clone(),
            path_name: tree.resource_path_name(id),
        }
    }
}
