#![deny(missing_docs)]

//! # Document Model Builder
//!
//! Maps the generic YAML node tree into the typed model.
//!
//! Keys are partitioned while decoding: `/segment` keys become nested
//! resources, `(name)` keys become annotations, verb keys become methods and
//! everything else is an ordinary field. Unknown fields are ignored. Wrong
//! node kinds are collected as [`DecodeErrors`] and reported together.

use crate::error::{AppResult, DecodeErrors};
use crate::raml::location::Location;
use crate::raml::models::{
    split_optional, Annotations, ApiDefinition, Bodies, Body, Declarations, DefinitionChoice,
    DescribedBy, Documentation, Library, Method, Property, Resource, ResourceId, ResourceTree,
    ResourceType, Response, SecurityScheme, Shape, Trait, TypeExpr, Verb,
};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

/// Decodes the root document of an API.
pub fn build_api(root: &Value, location: Location) -> AppResult<ApiDefinition> {
    let mut d = Decoder::default();
    let mut api = ApiDefinition::new(location);
    let Some(map) = d.root(root) else {
        return d.finish(api);
    };
    let entity = "api";

    api.title = d.field_text(entity, map, "title").unwrap_or_default();
    api.version = d.field_text(entity, map, "version");
    api.description = d.field_text(entity, map, "description");
    api.base_uri = d.field_text(entity, map, "baseUri");
    api.base_uri_parameters = d.field_properties(entity, map, "baseUriParameters");
    api.protocols = d.field_strings(entity, map, "protocols");
    api.media_type = d.field_strings(entity, map, "mediaType");
    if let Some(v) = map.get("documentation") {
        api.documentation = d.documentation(entity, v);
    }
    api.secured_by = d.field_choices(entity, map, "securedBy");
    api.uses = d.uses(entity, map);
    api.declarations = d.declarations(entity, map);
    api.annotations = annotations(map);

    for (k, v) in map {
        if let Some(uri) = k.as_str().filter(|key| is_resource_key(key)) {
            d.resource(&mut api.resources, None, "", uri, v);
        }
    }
    d.finish(api)
}

/// Decodes a library document.
pub fn build_library(root: &Value, location: Location) -> AppResult<Library> {
    let mut d = Decoder::default();
    let mut lib = Library::new(location);
    let Some(map) = d.root(root) else {
        return d.finish(lib);
    };
    let entity = format!("library {}", lib.location);

    lib.usage = d.field_text(&entity, map, "usage");
    lib.uses = d.uses(&entity, map);
    lib.declarations = d.declarations(&entity, map);
    lib.annotations = annotations(map);
    d.finish(lib)
}

/// Mapping keys that denote nested resources.
pub fn is_resource_key(key: &str) -> bool {
    key.starts_with('/')
}

/// The annotation name of a `(name)` key.
pub fn annotation_name(key: &str) -> Option<&str> {
    key.strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

fn annotations(map: &Mapping) -> Annotations {
    map.iter()
        .filter_map(|(k, v)| {
            let name = annotation_name(k.as_str()?)?;
            Some((name.to_string(), v.clone()))
        })
        .collect()
}

fn untag(v: &Value) -> &Value {
    match v {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match untag(v) {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Default)]
struct Decoder {
    errors: DecodeErrors,
}

impl Decoder {
    fn finish<T>(self, value: T) -> AppResult<T> {
        self.errors.into_result().map(|()| value)
    }

    fn root<'v>(&mut self, root: &'v Value) -> Option<&'v Mapping> {
        match untag(root) {
            Value::Mapping(map) => Some(map),
            _ => {
                self.errors.push("document", "root", "expected a mapping");
                None
            }
        }
    }

    fn mapping<'v>(&mut self, entity: &str, field: &str, v: &'v Value) -> Option<&'v Mapping> {
        match untag(v) {
            Value::Mapping(map) => Some(map),
            Value::Null => None,
            _ => {
                self.errors.push(entity, field, "expected a mapping");
                None
            }
        }
    }

    fn text(&mut self, entity: &str, field: &str, v: &Value) -> Option<String> {
        let text = scalar_text(v);
        if text.is_none() && !untag(v).is_null() {
            self.errors.push(entity, field, "expected a scalar");
        }
        text
    }

    fn field_text(&mut self, entity: &str, map: &Mapping, field: &str) -> Option<String> {
        let v = map.get(field)?;
        self.text(entity, field, v)
    }

    fn field_u64(&mut self, entity: &str, map: &Mapping, field: &str) -> Option<u64> {
        let v = untag(map.get(field)?);
        let n = v.as_u64();
        if n.is_none() && !v.is_null() {
            self.errors
                .push(entity, field, "expected a non-negative integer");
        }
        n
    }

    fn field_f64(&mut self, entity: &str, map: &Mapping, field: &str) -> Option<f64> {
        let v = untag(map.get(field)?);
        let n = v.as_f64();
        if n.is_none() && !v.is_null() {
            self.errors.push(entity, field, "expected a number");
        }
        n
    }

    fn field_bool(&mut self, entity: &str, map: &Mapping, field: &str) -> Option<bool> {
        let v = untag(map.get(field)?);
        let b = v.as_bool();
        if b.is_none() && !v.is_null() {
            self.errors.push(entity, field, "expected a boolean");
        }
        b
    }

    /// A single string or a sequence of strings.
    fn field_strings(&mut self, entity: &str, map: &Mapping, field: &str) -> Vec<String> {
        let Some(v) = map.get(field) else {
            return Vec::new();
        };
        match untag(v) {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items
                .iter()
                .filter_map(|item| self.text(entity, field, item))
                .collect(),
            other => self.text(entity, field, other).into_iter().collect(),
        }
    }

    fn field_properties(
        &mut self,
        entity: &str,
        map: &Mapping,
        field: &str,
    ) -> IndexMap<String, Property> {
        match map.get(field) {
            Some(v) => self.properties(entity, field, v),
            None => IndexMap::new(),
        }
    }

    fn field_choices(&mut self, entity: &str, map: &Mapping, field: &str) -> Vec<DefinitionChoice> {
        match map.get(field) {
            Some(v) => self.choices(entity, field, v),
            None => Vec::new(),
        }
    }

    /// `name: value` pairs from a mapping, or from a sequence of single-key
    /// mappings.
    fn named_entries<'v>(
        &mut self,
        entity: &str,
        field: &str,
        v: &'v Value,
    ) -> Vec<(String, &'v Value)> {
        let mut out = Vec::new();
        let mut take = |d: &mut Self, map: &'v Mapping| {
            for (k, item) in map {
                match scalar_text(k) {
                    Some(name) => out.push((name, item)),
                    None => d.errors.push(entity, field, "names must be scalars"),
                }
            }
        };
        match untag(v) {
            Value::Null => {}
            Value::Mapping(map) => take(self, map),
            Value::Sequence(items) => {
                for item in items {
                    match untag(item) {
                        Value::Mapping(map) => take(self, map),
                        _ => self.errors.push(entity, field, "expected a mapping"),
                    }
                }
            }
            _ => self.errors.push(entity, field, "expected a mapping"),
        }
        out
    }

    fn uses(&mut self, entity: &str, map: &Mapping) -> IndexMap<String, String> {
        let Some(v) = map.get("uses") else {
            return IndexMap::new();
        };
        let mut out = IndexMap::new();
        for (alias, reference) in self.named_entries(entity, "uses", v) {
            if let Some(reference) = self.text(entity, "uses", reference) {
                out.insert(alias, reference);
            }
        }
        out
    }

    fn documentation(&mut self, entity: &str, v: &Value) -> Vec<Documentation> {
        let items = match untag(v) {
            Value::Sequence(items) => items,
            Value::Null => return Vec::new(),
            _ => {
                self.errors
                    .push(entity, "documentation", "expected a sequence");
                return Vec::new();
            }
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let Some(map) = self.mapping(entity, "documentation", item) {
                out.push(Documentation {
                    title: self.field_text(entity, map, "title").unwrap_or_default(),
                    content: self.field_text(entity, map, "content").unwrap_or_default(),
                });
            }
        }
        out
    }

    fn declarations(&mut self, entity: &str, map: &Mapping) -> Declarations {
        let mut decl = Declarations::default();

        // `types` is read first so it wins over the legacy `schemas` alias.
        for field in ["types", "schemas"] {
            let Some(v) = map.get(field) else { continue };
            for (name, tv) in self.named_entries(entity, field, v) {
                if decl.types.contains_key(&name) {
                    continue;
                }
                let shape = self.shape(&format!("type {}", name), tv);
                decl.types.insert(name, shape);
            }
        }
        if let Some(v) = map.get("traits") {
            for (name, tv) in self.named_entries(entity, "traits", v) {
                let t = self.trait_decl(&name, tv);
                decl.traits.insert(name, t);
            }
        }
        if let Some(v) = map.get("resourceTypes") {
            for (name, rv) in self.named_entries(entity, "resourceTypes", v) {
                let rt = self.resource_type(&name, rv);
                decl.resource_types.insert(name, rt);
            }
        }
        if let Some(v) = map.get("securitySchemes") {
            for (name, sv) in self.named_entries(entity, "securitySchemes", v) {
                let scheme = self.security_scheme(&name, sv);
                decl.security_schemes.insert(name, scheme);
            }
        }
        if let Some(v) = map.get("annotationTypes") {
            for (name, av) in self.named_entries(entity, "annotationTypes", v) {
                decl.annotation_types.insert(name, av.clone());
            }
        }
        decl
    }

    fn type_expr(&mut self, entity: &str, field: &str, v: &Value) -> Option<TypeExpr> {
        match untag(v) {
            Value::Null => None,
            Value::Mapping(_) => Some(TypeExpr::InlineShape(Box::new(self.shape(entity, v)))),
            Value::Sequence(_) => {
                self.errors
                    .push(entity, field, "multiple inheritance is not supported");
                None
            }
            other => scalar_text(other).map(|t| TypeExpr::parse(&t)),
        }
    }

    /// A type declaration: null, a type expression, or a mapping of facets.
    fn shape(&mut self, entity: &str, v: &Value) -> Shape {
        match untag(v) {
            Value::Null => Shape::default(),
            Value::Mapping(map) => self.shape_fields(entity, map),
            Value::Sequence(_) => {
                self.errors
                    .push(entity, "type", "expected a type expression or declaration");
                Shape::default()
            }
            other => scalar_text(other)
                .map(|t| Shape::of_type(&t))
                .unwrap_or_default(),
        }
    }

    fn shape_fields(&mut self, entity: &str, map: &Mapping) -> Shape {
        let type_ = map
            .get("type")
            .and_then(|v| self.type_expr(entity, "type", v));
        let items = map
            .get("items")
            .and_then(|v| self.type_expr(entity, "items", v));
        let enum_values = match map.get("enum").map(untag) {
            Some(Value::Sequence(values)) => values.clone(),
            None | Some(Value::Null) => Vec::new(),
            Some(_) => {
                self.errors.push(entity, "enum", "expected a sequence");
                Vec::new()
            }
        };
        let example = map.get("example").and_then(|v| self.example(entity, v));

        Shape {
            type_,
            items,
            properties: self.field_properties(entity, map, "properties"),
            display_name: self.field_text(entity, map, "displayName"),
            description: self.field_text(entity, map, "description"),
            example,
            default: map.get("default").cloned(),
            enum_values,
            pattern: self.field_text(entity, map, "pattern"),
            min_length: self.field_u64(entity, map, "minLength"),
            max_length: self.field_u64(entity, map, "maxLength"),
            minimum: self.field_f64(entity, map, "minimum"),
            maximum: self.field_f64(entity, map, "maximum"),
            multiple_of: self.field_f64(entity, map, "multipleOf"),
            format: self.field_text(entity, map, "format"),
            min_items: self.field_u64(entity, map, "minItems"),
            max_items: self.field_u64(entity, map, "maxItems"),
            unique_items: self.field_bool(entity, map, "uniqueItems"),
            additional_properties: self.field_bool(entity, map, "additionalProperties"),
            discriminator: self.field_text(entity, map, "discriminator"),
            annotations: annotations(map),
        }
    }

    fn example(&mut self, entity: &str, v: &Value) -> Option<String> {
        match untag(v) {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => match serde_json::to_string(other) {
                Ok(text) => Some(text),
                Err(e) => {
                    self.errors.push(entity, "example", e.to_string());
                    None
                }
            },
        }
    }

    /// Named fields keyed as written (an `?` suffix marks them optional).
    fn properties(&mut self, entity: &str, field: &str, v: &Value) -> IndexMap<String, Property> {
        let mut out = IndexMap::new();
        let Some(map) = self.mapping(entity, field, v) else {
            return out;
        };
        for (k, pv) in map {
            let Some(key) = scalar_text(k) else {
                self.errors.push(entity, field, "names must be scalars");
                continue;
            };
            if annotation_name(&key).is_some() {
                continue;
            }
            let context = format!("{} {} '{}'", entity, field, key);
            let mut prop = Property::from_key(&key);
            prop.shape = self.shape(&context, pv);
            if let Value::Mapping(m) = untag(pv) {
                if let Some(required) = self.field_bool(&context, m, "required") {
                    prop.required = required;
                }
            }
            out.insert(key, prop);
        }
        out
    }

    fn bodies(&mut self, entity: &str, v: &Value) -> Bodies {
        let mut bodies = Bodies::default();
        match untag(v) {
            Value::Null => {}
            Value::Mapping(map) => {
                let mut flat = Mapping::new();
                for (k, bv) in map {
                    match k.as_str() {
                        Some(media) if media.contains('/') => {
                            let body = self.body(&format!("{} body {}", entity, media), bv);
                            bodies.for_media_type.insert(media.to_string(), body);
                        }
                        _ => {
                            flat.insert(k.clone(), bv.clone());
                        }
                    }
                }
                if !flat.is_empty() {
                    let body = self.body_fields(&format!("{} body", entity), &flat);
                    if !body.is_empty() {
                        bodies.default = Some(body);
                    }
                }
            }
            Value::Sequence(_) => self
                .errors
                .push(entity, "body", "expected a mapping or type expression"),
            other => {
                bodies.default = scalar_text(other).map(|t| Body {
                    shape: Shape::of_type(&t),
                    ..Body::default()
                });
            }
        }
        bodies
    }

    fn body(&mut self, entity: &str, v: &Value) -> Body {
        match untag(v) {
            Value::Mapping(map) => self.body_fields(entity, map),
            Value::Null => Body::default(),
            Value::Sequence(_) => {
                self.errors
                    .push(entity, "body", "expected a mapping or type expression");
                Body::default()
            }
            other => Body {
                shape: scalar_text(other)
                    .map(|t| Shape::of_type(&t))
                    .unwrap_or_default(),
                ..Body::default()
            },
        }
    }

    fn body_fields(&mut self, entity: &str, map: &Mapping) -> Body {
        Body {
            schema: self.field_text(entity, map, "schema"),
            headers: self.field_properties(entity, map, "headers"),
            shape: self.shape_fields(entity, map),
        }
    }

    fn responses(&mut self, entity: &str, v: &Value) -> IndexMap<String, Response> {
        let mut out = IndexMap::new();
        let Some(map) = self.mapping(entity, "responses", v) else {
            return out;
        };
        for (k, rv) in map {
            let Some(code) = scalar_text(k) else {
                self.errors
                    .push(entity, "responses", "status codes must be scalars");
                continue;
            };
            if annotation_name(&code).is_some() {
                continue;
            }
            let response = self.response(&format!("{} response {}", entity, code), &code, rv);
            out.insert(code, response);
        }
        out
    }

    fn response(&mut self, entity: &str, code: &str, v: &Value) -> Response {
        let mut response = Response::new(code);
        let Some(map) = self.mapping(entity, code, v) else {
            return response;
        };
        response.description = self.field_text(entity, map, "description");
        response.headers = self.field_properties(entity, map, "headers");
        if let Some(b) = map.get("body") {
            response.body = self.bodies(entity, b);
        }
        response.annotations = annotations(map);
        response
    }

    fn method(&mut self, entity: &str, verb: Verb, v: &Value) -> Method {
        let mut method = Method::new(verb);
        if let Some(map) = self.mapping(entity, verb.key(), v) {
            self.method_fields(entity, map, &mut method);
        }
        method
    }

    fn method_fields(&mut self, entity: &str, map: &Mapping, method: &mut Method) {
        method.display_name = self.field_text(entity, map, "displayName");
        method.description = self.field_text(entity, map, "description");
        method.query_parameters = self.field_properties(entity, map, "queryParameters");
        method.headers = self.field_properties(entity, map, "headers");
        method.query_string = map
            .get("queryString")
            .map(|v| self.shape(&format!("{} queryString", entity), v));
        if let Some(v) = map.get("responses") {
            method.responses = self.responses(entity, v);
        }
        if let Some(v) = map.get("body") {
            method.body = self.bodies(entity, v);
        }
        method.protocols = self.field_strings(entity, map, "protocols");
        method.is = self.field_choices(entity, map, "is");
        method.secured_by = self.field_choices(entity, map, "securedBy");
        method.annotations = annotations(map);
    }

    /// `name`, `null` (anonymous security) or `{name: {param: value}}`.
    fn choice(&mut self, entity: &str, field: &str, v: &Value) -> Option<DefinitionChoice> {
        match untag(v) {
            Value::Null => Some(DefinitionChoice::named("null")),
            Value::Mapping(map) => {
                let mut entries = map.iter();
                let (Some((k, params)), None) = (entries.next(), entries.next()) else {
                    self.errors
                        .push(entity, field, "expected a single name with parameters");
                    return None;
                };
                let Some(name) = scalar_text(k) else {
                    self.errors.push(entity, field, "names must be scalars");
                    return None;
                };
                let mut choice = DefinitionChoice::named(name);
                match untag(params) {
                    Value::Null => {}
                    Value::Mapping(pm) => {
                        for (pk, pv) in pm {
                            match (scalar_text(pk), self.parameter_value(entity, field, pv)) {
                                (Some(key), Some(value)) => {
                                    choice.parameters.insert(key, value);
                                }
                                (None, _) => self.errors.push(
                                    entity,
                                    field,
                                    "parameter names must be scalars",
                                ),
                                _ => {}
                            }
                        }
                    }
                    _ => self
                        .errors
                        .push(entity, field, "template parameters must be a mapping"),
                }
                Some(choice)
            }
            Value::Sequence(_) => {
                self.errors
                    .push(entity, field, "expected a name or a single-key mapping");
                None
            }
            other => scalar_text(other).map(DefinitionChoice::named),
        }
    }

    fn parameter_value(&mut self, entity: &str, field: &str, v: &Value) -> Option<String> {
        match untag(v) {
            Value::Null => Some(String::new()),
            Value::Mapping(_) | Value::Sequence(_) => match serde_json::to_string(v) {
                Ok(text) => Some(text),
                Err(e) => {
                    self.errors.push(entity, field, e.to_string());
                    None
                }
            },
            other => scalar_text(other),
        }
    }

    fn choices(&mut self, entity: &str, field: &str, v: &Value) -> Vec<DefinitionChoice> {
        match untag(v) {
            Value::Sequence(items) => items
                .iter()
                .filter_map(|item| self.choice(entity, field, item))
                .collect(),
            Value::Null => Vec::new(),
            _ => self.choice(entity, field, v).into_iter().collect(),
        }
    }

    fn type_choice(&mut self, entity: &str, map: &Mapping) -> Option<DefinitionChoice> {
        let v = map.get("type").filter(|v| !untag(v).is_null())?;
        self.choice(entity, "type", v)
    }

    fn resource(
        &mut self,
        tree: &mut ResourceTree,
        parent: Option<ResourceId>,
        path: &str,
        uri: &str,
        v: &Value,
    ) {
        let full = format!("{}{}", path, uri.trim());
        let entity = format!("resource {}", full);
        let mut resource = Resource::new(uri);
        let mut nested = Vec::new();

        if let Some(map) = self.mapping(&entity, uri, v) {
            resource.display_name = self.field_text(&entity, map, "displayName");
            resource.description = self.field_text(&entity, map, "description");
            resource.type_ = self.type_choice(&entity, map);
            resource.is = self.field_choices(&entity, map, "is");
            resource.secured_by = self.field_choices(&entity, map, "securedBy");
            resource.uri_parameters = self.field_properties(&entity, map, "uriParameters");
            resource.annotations = annotations(map);
            for (k, mv) in map {
                let Some(key) = k.as_str() else { continue };
                if is_resource_key(key) {
                    nested.push((key, mv));
                } else if let Some(verb) = Verb::from_key(key) {
                    let method = self.method(&format!("method {} {}", verb, full), verb, mv);
                    resource.methods.insert(verb, method);
                }
            }
        }

        let id = tree.insert(parent, resource);
        for (child_uri, child) in nested {
            self.resource(tree, Some(id), &full, child_uri, child);
        }
    }

    fn resource_type(&mut self, name: &str, v: &Value) -> ResourceType {
        let entity = format!("resource type {}", name);
        let mut rt = ResourceType {
            name: name.to_string(),
            ..ResourceType::default()
        };
        let Some(map) = self.mapping(&entity, name, v) else {
            return rt;
        };
        rt.usage = self.field_text(&entity, map, "usage");
        rt.display_name = self.field_text(&entity, map, "displayName");
        rt.description = self.field_text(&entity, map, "description");
        rt.type_ = self.type_choice(&entity, map);
        rt.is = self.field_choices(&entity, map, "is");
        rt.secured_by = self.field_choices(&entity, map, "securedBy");
        rt.uri_parameters = self.field_properties(&entity, map, "uriParameters");
        rt.annotations = annotations(map);
        for (k, mv) in map {
            let Some(key) = k.as_str() else { continue };
            let (verb_key, optional) = split_optional(key);
            let Some(verb) = Verb::from_key(verb_key) else {
                continue;
            };
            let method = self.method(&format!("{} method {}", entity, key), verb, mv);
            if optional {
                rt.optional_methods.insert(verb, method);
            } else {
                rt.methods.insert(verb, method);
            }
        }
        rt
    }

    fn trait_decl(&mut self, name: &str, v: &Value) -> Trait {
        let entity = format!("trait {}", name);
        let mut t = Trait {
            name: name.to_string(),
            ..Trait::default()
        };
        if let Some(map) = self.mapping(&entity, name, v) {
            t.usage = self.field_text(&entity, map, "usage");
            self.method_fields(&entity, map, &mut t.template);
        }
        t
    }

    fn security_scheme(&mut self, name: &str, v: &Value) -> SecurityScheme {
        let entity = format!("security scheme {}", name);
        let mut scheme = SecurityScheme {
            name: name.to_string(),
            ..SecurityScheme::default()
        };
        let Some(map) = self.mapping(&entity, name, v) else {
            return scheme;
        };
        scheme.type_ = self.field_text(&entity, map, "type");
        scheme.display_name = self.field_text(&entity, map, "displayName");
        scheme.description = self.field_text(&entity, map, "description");
        if let Some(db) = map
            .get("describedBy")
            .and_then(|v| self.mapping(&entity, "describedBy", v))
        {
            let context = format!("{} describedBy", entity);
            scheme.described_by = DescribedBy {
                headers: self.field_properties(&context, db, "headers"),
                query_parameters: self.field_properties(&context, db, "queryParameters"),
                query_string: db.get("queryString").map(|v| self.shape(&context, v)),
                responses: match db.get("responses") {
                    Some(v) => self.responses(&context, v),
                    None => IndexMap::new(),
                },
                annotations: annotations(db),
            };
        }
        if let Some(settings) = map.get("settings") {
            for (key, value) in self.named_entries(&entity, "settings", settings) {
                scheme.settings.insert(key, value.clone());
            }
        }
        scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use pretty_assertions::assert_eq;

    fn api(yaml: &str) -> AppResult<ApiDefinition> {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        build_api(&value, Location::parse("api.raml").unwrap())
    }

    #[test]
    fn test_nested_resources_and_methods() {
        let api = api(r#"
title: Books
/users:
  (audited): true
  get:
    description: list
  /{userId}:
    uriParameters:
      userId: integer
    delete:
"#)
        .unwrap();
        assert_eq!(api.title, "Books");
        assert_eq!(api.resources.len(), 2);
        let users = api.resource("/users").unwrap();
        assert!(users.annotations.contains_key("audited"));
        assert_eq!(
            users.method(Verb::Get).unwrap().description.as_deref(),
            Some("list")
        );
        let user = api.resource("/users/{userId}").unwrap();
        assert!(user.method(Verb::Delete).is_some());
        assert_eq!(user.uri_parameters["userId"].type_string(), "integer");
    }

    #[test]
    fn test_property_shortcuts() {
        let api = api(r#"
title: T
types:
  User:
    properties:
      name:
      age: integer
      nickname?: string
      email:
        type: string
        required: false
"#)
        .unwrap();
        let props = &api.declarations.types["User"].properties;
        assert_eq!(props["name"].type_string(), "string");
        assert!(props["name"].required);
        assert_eq!(props["age"].type_string(), "integer");
        assert!(!props["nickname?"].required);
        assert_eq!(props["nickname?"].name, "nickname");
        assert!(!props["email"].required);
    }

    #[test]
    fn test_bodies_flat_and_media_types() {
        let api = api(r#"
title: T
/a:
  post:
    body: User
  put:
    body:
      application/json:
        type: User
        example: {name: x}
"#)
        .unwrap();
        let a = api.resource("/a").unwrap();
        let post = &a.method(Verb::Post).unwrap().body;
        assert_eq!(
            post.default.as_ref().and_then(|b| b.shape.type_string()).as_deref(),
            Some("User")
        );
        let put = a.method(Verb::Put).unwrap().body.get("application/json").unwrap();
        assert_eq!(put.shape.type_string().as_deref(), Some("User"));
        assert_eq!(put.shape.example.as_deref(), Some(r#"{"name":"x"}"#));
    }

    #[test]
    fn test_resource_type_optional_methods_and_choices() {
        let api = api(r#"
title: T
resourceTypes:
  collection:
    get:
      description: Get all <<resourceName>>s
    post?:
traits:
  - paged:
      queryParameters:
        page: integer
/users:
  type: { collection: { resourceName: user } }
  is: [paged]
"#)
        .unwrap();
        let rt = &api.declarations.resource_types["collection"];
        assert!(rt.methods.contains_key(&Verb::Get));
        assert!(rt.optional_methods.contains_key(&Verb::Post));
        assert!(api.declarations.traits.contains_key("paged"));

        let users = api.resource("/users").unwrap();
        let ty = users.type_.as_ref().unwrap();
        assert_eq!(ty.name, "collection");
        assert_eq!(ty.parameters["resourceName"], "user");
        assert_eq!(users.is, vec![DefinitionChoice::named("paged")]);
    }

    #[test]
    fn test_root_metadata_and_schema_alias() {
        let api = api(r#"
title: T
version: v1
baseUri: https://api.example.com/{version}
mediaType: application/json
protocols: [HTTP, HTTPS]
documentation:
  - title: Intro
    content: Hello
securedBy: [null, oauth]
uses:
  lib: lib.raml
types:
  User: object
schemas:
  User: string
  Legacy: |
    {"type": "object"}
"#)
        .unwrap();
        assert_eq!(api.version.as_deref(), Some("v1"));
        assert_eq!(api.media_type, vec!["application/json".to_string()]);
        assert_eq!(api.protocols.len(), 2);
        assert_eq!(api.documentation[0].title, "Intro");
        assert!(api.secured_by[0].is_anonymous());
        assert_eq!(api.uses["lib"], "lib.raml");
        assert_eq!(
            api.declarations.types["User"].type_string().as_deref(),
            Some("object")
        );
        assert!(api.declarations.types.contains_key("Legacy"));
    }

    #[test]
    fn test_security_scheme_fields() {
        let api = api(r#"
title: T
securitySchemes:
  oauth:
    type: OAuth 2.0
    describedBy:
      headers:
        Authorization:
      responses:
        401:
          description: Bad token
    settings:
      scopes: [read]
"#)
        .unwrap();
        let scheme = api.security_scheme("oauth").unwrap();
        assert_eq!(scheme.type_.as_deref(), Some("OAuth 2.0"));
        assert!(scheme.described_by.headers.contains_key("Authorization"));
        assert_eq!(
            scheme.described_by.responses["401"].description.as_deref(),
            Some("Bad token")
        );
        assert!(scheme.settings.contains_key("scopes"));
    }

    #[test]
    fn test_structural_errors_are_aggregated() {
        let err = api(r#"
title: T
/users:
  get:
    description: [not, text]
    headers:
      X-Limit:
        maxLength: lots
"#)
        .unwrap_err();
        let errors = match err {
            AppError::Decode(errors) => errors,
            other => panic!("expected decode errors, got {other}"),
        };
        assert_eq!(errors.issues.len(), 2);
        assert_eq!(errors.issues[0].entity, "method GET /users");
        assert_eq!(errors.issues[0].field, "description");
        assert_eq!(errors.issues[1].field, "maxLength");
    }

    #[test]
    fn test_root_must_be_a_mapping() {
        let value = Value::String("nope".into());
        let err = build_library(&value, Location::parse("lib.raml").unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }
}
