#![deny(missing_docs)]

//! # RAML Models
//!
//! Typed representation of a RAML document.
//!
//! - **shape**: type expressions, schema fragments and named properties.
//! - **method**: verbs, methods, responses and bodies.
//! - **resource**: the resource arena and template references.
//! - **document**: root definitions, libraries and declarations.

pub mod document;
pub mod method;
pub mod resource;
pub mod shape;

pub use document::{
    ApiDefinition, Declarations, DescribedBy, Documentation, Library, ResourceType,
    SecurityScheme, Trait,
};
pub use method::{Bodies, Body, Method, Response, Verb};
pub use resource::{DefinitionChoice, Resource, ResourceId, ResourceNames, ResourceTree};
pub use shape::{split_optional, Annotations, Property, Shape, TypeExpr, BUILTIN_TYPES};
