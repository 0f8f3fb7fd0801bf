#![deny(missing_docs)]

//! # Shape Normalization
//!
//! Rewrites shortcut forms once inheritance is complete:
//!
//! - `type: array` + `items: X` becomes `type: X[]`.
//! - `type: array` + `items: {type: X, ...}` becomes `type: X[]`, keeping the
//!   remaining item facets under `items`.
//! - Bodies that carry both a flat and a per-media-type form collapse to one.
//!
//! Every pass is idempotent.

use crate::raml::models::{
    ApiDefinition, Bodies, Declarations, Library, Method, Property, Response, Shape, TypeExpr,
};
use indexmap::IndexMap;

/// Normalizes every declared type and every resource of `api`.
pub fn normalize_api(api: &mut ApiDefinition) {
    normalize_declarations(&mut api.declarations);
    normalize_libraries(&mut api.libraries);
    normalize_properties(&mut api.base_uri_parameters);
    for id in api.resources.depth_first() {
        let resource = api.resources.get_mut(id);
        normalize_properties(&mut resource.uri_parameters);
        for method in resource.methods.values_mut() {
            normalize_method(method);
        }
    }
}

fn normalize_libraries(libraries: &mut IndexMap<String, Library>) {
    for lib in libraries.values_mut() {
        normalize_declarations(&mut lib.declarations);
        normalize_libraries(&mut lib.libraries);
    }
}

fn normalize_declarations(decl: &mut Declarations) {
    for shape in decl.types.values_mut() {
        normalize_shape(shape);
    }
}

/// Normalizes a method's parameters, bodies and responses.
pub fn normalize_method(method: &mut Method) {
    normalize_properties(&mut method.query_parameters);
    normalize_properties(&mut method.headers);
    if let Some(query_string) = &mut method.query_string {
        normalize_shape(query_string);
    }
    normalize_bodies(&mut method.body);
    for response in method.responses.values_mut() {
        normalize_response(response);
    }
}

fn normalize_response(response: &mut Response) {
    normalize_properties(&mut response.headers);
    normalize_bodies(&mut response.body);
}

/// Collapses the body representations and normalizes each payload.
pub fn normalize_bodies(bodies: &mut Bodies) {
    bodies.collapse();
    let flat = bodies.default.iter_mut();
    for body in flat.chain(bodies.for_media_type.values_mut()) {
        normalize_shape(&mut body.shape);
        normalize_properties(&mut body.headers);
    }
}

fn normalize_properties(props: &mut IndexMap<String, Property>) {
    for prop in props.values_mut() {
        normalize_shape(&mut prop.shape);
    }
}

/// Normalizes a shape and everything nested in it.
pub fn normalize_shape(shape: &mut Shape) {
    normalize_properties(&mut shape.properties);
    if let Some(TypeExpr::InlineShape(inner)) = &mut shape.type_ {
        normalize_shape(inner);
    }
    if let Some(TypeExpr::InlineShape(inner)) = &mut shape.items {
        normalize_shape(inner);
    }
    normalize_array(shape);
}

fn normalize_array(shape: &mut Shape) {
    if !shape
        .type_
        .as_ref()
        .is_some_and(TypeExpr::is_array_keyword)
    {
        return;
    }
    let Some(items) = shape.items.take() else {
        return;
    };
    match items {
        TypeExpr::InlineShape(mut inner) => match inner.type_.take() {
            Some(item_type) => {
                shape.type_ = Some(TypeExpr::ArrayOf(Box::new(item_type)));
                if !inner.is_empty() {
                    shape.items = Some(TypeExpr::InlineShape(inner));
                }
            }
            None => shape.items = Some(TypeExpr::InlineShape(inner)),
        },
        other => shape.type_ = Some(TypeExpr::ArrayOf(Box::new(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raml::location::Location;
    use crate::raml::models::Body;
    use pretty_assertions::assert_eq;

    fn array_of(items: TypeExpr) -> Shape {
        Shape {
            type_: Some(TypeExpr::parse("array")),
            items: Some(items),
            ..Shape::default()
        }
    }

    #[test]
    fn test_inline_items_type() {
        let mut shape = array_of(TypeExpr::InlineShape(Box::new(Shape::of_type("string"))));
        normalize_shape(&mut shape);
        assert_eq!(shape.type_string().as_deref(), Some("string[]"));
        assert!(shape.items.is_none());
    }

    #[test]
    fn test_named_items() {
        let mut shape = array_of(TypeExpr::parse("Person"));
        normalize_shape(&mut shape);
        assert_eq!(shape.type_string().as_deref(), Some("Person[]"));
        assert!(shape.items.is_none());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut shape = array_of(TypeExpr::parse("Person"));
        normalize_shape(&mut shape);
        let once = shape.clone();
        normalize_shape(&mut shape);
        assert_eq!(shape, once);
    }

    #[test]
    fn test_item_facets_are_kept() {
        let mut inner = Shape::of_type("string");
        inner.max_length = Some(3);
        let mut shape = array_of(TypeExpr::InlineShape(Box::new(inner)));
        normalize_shape(&mut shape);
        assert_eq!(shape.type_string().as_deref(), Some("string[]"));
        let Some(TypeExpr::InlineShape(items)) = &shape.items else {
            panic!("items should keep the remaining facets");
        };
        assert!(items.type_.is_none());
        assert_eq!(items.max_length, Some(3));
    }

    #[test]
    fn test_other_shapes_untouched() {
        let mut shape = Shape::of_type("object");
        shape
            .properties
            .insert("tags".into(), Property::from_key("tags"));
        let before = shape.clone();
        normalize_shape(&mut shape);
        assert_eq!(shape, before);
    }

    #[test]
    fn test_nested_property_arrays() {
        let mut tags = Property::from_key("tags");
        tags.shape = array_of(TypeExpr::parse("string"));
        let mut bodies = Bodies::default();
        let mut body = Body::default();
        body.shape.properties.insert("tags".into(), tags);
        bodies.for_media_type.insert("application/json".into(), body);

        normalize_bodies(&mut bodies);
        let tags = &bodies.get("application/json").unwrap().shape.properties["tags"];
        assert_eq!(tags.type_string(), "string[]");
    }

    #[test]
    fn test_nested_library_types() {
        let mut inner = Library::new(Location::parse("libs/inner.raml").unwrap());
        inner
            .declarations
            .types
            .insert("Names".into(), array_of(TypeExpr::parse("string")));
        let mut outer = Library::new(Location::parse("libs/outer.raml").unwrap());
        outer.libraries.insert("inner".into(), inner);
        let mut api = ApiDefinition::new(Location::parse("api.raml").unwrap());
        api.libraries.insert("outer".into(), outer);

        normalize_api(&mut api);
        let names = &api.libraries["outer"].libraries["inner"].declarations.types["Names"];
        assert_eq!(names.type_string().as_deref(), Some("string[]"));
        assert!(names.items.is_none());
    }
}
