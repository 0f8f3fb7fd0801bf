#![deny(missing_docs)]

//! # Shapes
//!
//! Schema fragments: the type expression of a field plus its facets. Used for
//! declared types, body payloads, headers, query and URI parameters alike.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Annotation values keyed by annotation name (without the parentheses).
pub type Annotations = IndexMap<String, serde_yaml::Value>;

/// Built-in RAML 1.0 type names.
pub const BUILTIN_TYPES: &[&str] = &[
    "any",
    "array",
    "boolean",
    "date-only",
    "datetime",
    "datetime-only",
    "file",
    "integer",
    "nil",
    "number",
    "object",
    "string",
    "time-only",
];

/// The value of a `type` (or `items`) field.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A built-in type such as `string` or `array`.
    Scalar(String),
    /// A named type (possibly `alias.Name`) or an expression kept verbatim
    /// (unions, inline schema text, unresolved placeholders).
    Reference(String),
    /// A nested type declaration.
    InlineShape(Box<Shape>),
    /// The compact `X[]` array form.
    ArrayOf(Box<TypeExpr>),
}

impl TypeExpr {
    /// Parses a type expression string.
    pub fn parse(expr: &str) -> Self {
        let expr = expr.trim();
        if is_verbatim(expr) {
            return TypeExpr::Reference(expr.to_string());
        }
        if let Some(inner) = expr.strip_suffix("[]") {
            if !inner.trim().is_empty() {
                return TypeExpr::ArrayOf(Box::new(TypeExpr::parse(inner)));
            }
        }
        if BUILTIN_TYPES.contains(&expr) {
            TypeExpr::Scalar(expr.to_string())
        } else {
            TypeExpr::Reference(expr.to_string())
        }
    }

    /// The string form of the expression. Inline shapes render as their own
    /// type, or `object` when they have none.
    pub fn type_string(&self) -> String {
        self.to_string()
    }

    /// True for the bare `array` keyword.
    pub fn is_array_keyword(&self) -> bool {
        matches!(self, TypeExpr::Scalar(s) if s == "array")
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Scalar(s) | TypeExpr::Reference(s) => f.write_str(s),
            TypeExpr::InlineShape(shape) => match &shape.type_ {
                Some(inner) => write!(f, "{}", inner),
                None => f.write_str("object"),
            },
            TypeExpr::ArrayOf(inner) => write!(f, "{}[]", inner),
        }
    }
}

impl Serialize for TypeExpr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TypeExpr::InlineShape(shape) => shape.serialize(serializer),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

fn is_verbatim(expr: &str) -> bool {
    expr.contains("<<")
        || expr.contains(['|', '(', ',', '{', '<', '\n'])
}

/// A type declaration and its facets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Type expression. `None` means unspecified (the RAML default applies).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<TypeExpr>,
    /// Element type for `array` shapes that have not been normalized yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<TypeExpr>,
    /// Object properties in declaration order. Keys are kept as written,
    /// including any optional marker.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Property>,
    /// Human friendly name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Description (markdown).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example, rendered as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,
    /// Enumerated values.
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_yaml::Value>,
    /// String pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Minimum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Numeric lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Numeric upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Numeric step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    /// Number or string format hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Minimum array size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Maximum array size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Whether array items must be unique.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    /// Whether unknown object properties are allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    /// Discriminator property for unions of object types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    /// Annotations applied to this declaration.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: Annotations,
}

impl Shape {
    /// A shape that only names a type.
    pub fn of_type(expr: &str) -> Self {
        Self {
            type_: Some(TypeExpr::parse(expr)),
            ..Self::default()
        }
    }

    /// The type as text, if declared.
    pub fn type_string(&self) -> Option<String> {
        self.type_.as_ref().map(TypeExpr::type_string)
    }

    /// True when nothing at all is declared.
    pub fn is_empty(&self) -> bool {
        *self == Shape::default()
    }

    /// Copies every non-textual facet the child leaves unset.
    ///
    /// Textual fields are placeholder-bearing and handled by the inheritance
    /// engine; these are plain values.
    pub fn fill_facets_from(&mut self, parent: &Shape) {
        fn fill<T: Clone>(child: &mut Option<T>, parent: &Option<T>) {
            if child.is_none() {
                child.clone_from(parent);
            }
        }

        fill(&mut self.default, &parent.default);
        fill(&mut self.min_length, &parent.min_length);
        fill(&mut self.max_length, &parent.max_length);
        fill(&mut self.minimum, &parent.minimum);
        fill(&mut self.maximum, &parent.maximum);
        fill(&mut self.multiple_of, &parent.multiple_of);
        fill(&mut self.min_items, &parent.min_items);
        fill(&mut self.max_items, &parent.max_items);
        fill(&mut self.unique_items, &parent.unique_items);
        fill(&mut self.additional_properties, &parent.additional_properties);
        if self.enum_values.is_empty() {
            self.enum_values.clone_from(&parent.enum_values);
        }
        for (name, value) in &parent.annotations {
            self.annotations
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

/// One named field: a property of an object type, a header, or a query/URI parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Name with any optional marker removed.
    pub name: String,
    /// Whether the field must be present.
    pub required: bool,
    /// The field's schema.
    #[serde(flatten)]
    pub shape: Shape,
}

impl Property {
    /// Creates a property for a mapping key, honoring a trailing `?` marker.
    pub fn from_key(key: &str) -> Self {
        let (name, optional) = split_optional(key);
        Self {
            name: name.to_string(),
            required: !optional,
            shape: Shape::default(),
        }
    }

    /// The type as text; properties without a declared type are strings.
    pub fn type_string(&self) -> String {
        self.shape
            .type_string()
            .unwrap_or_else(|| "string".to_string())
    }
}

/// Splits a trailing optional marker off a key: `name?` -> (`name`, true).
pub fn split_optional(key: &str) -> (&str, bool) {
    match key.strip_suffix('?') {
        Some(name) => (name, true),
        None => (key, false),
    }
}
