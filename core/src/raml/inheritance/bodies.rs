//! Bodies and responses.

use super::params::{merge_named, merge_shape};
use super::{fill_annotations, plan_key, KeyPlan, MergeContext};
use crate::error::AppResult;
use crate::raml::models::{Bodies, Body, Response};
use indexmap::IndexMap;

/// Merges a parent request or response body into a child one.
///
/// A child that only declares a flat body keeps that form: every parent body,
/// flat or keyed by media type, is merged into it.
pub fn merge_bodies(child: &mut Bodies, parent: &Bodies, ctx: MergeContext<'_>) -> AppResult<()> {
    if child.for_media_type.is_empty() {
        if let Some(own) = child.default.as_mut() {
            for inherited in parent.default.iter().chain(parent.for_media_type.values()) {
                merge_body(own, inherited, ctx)?;
            }
            return Ok(());
        }
    }

    if let Some(inherited) = &parent.default {
        let body = child.default.get_or_insert_with(Body::default);
        merge_body(body, inherited, ctx)?;
    }
    for (media_type, inherited) in &parent.for_media_type {
        let body = child
            .for_media_type
            .entry(media_type.clone())
            .or_default();
        merge_body(body, inherited, ctx)?;
    }
    Ok(())
}

fn merge_body(child: &mut Body, parent: &Body, ctx: MergeContext<'_>) -> AppResult<()> {
    ctx.text(&mut child.schema, &parent.schema)?;
    merge_named(&mut child.headers, &parent.headers, ctx)?;
    merge_shape(&mut child.shape, &parent.shape, ctx)
}

/// Merges parent responses. `404?` style codes are only merged into
/// responses the child declares.
pub fn merge_responses(
    child: &mut IndexMap<String, Response>,
    parent: &IndexMap<String, Response>,
    ctx: MergeContext<'_>,
) -> AppResult<()> {
    for (code, inherited) in parent {
        match plan_key(code, child, ctx.dict)? {
            KeyPlan::Skip => {}
            KeyPlan::Merge(existing) => {
                if let Some(response) = child.get_mut(&existing) {
                    merge_response(response, inherited, ctx)?;
                }
            }
            KeyPlan::Insert(new_code) => {
                let mut response = Response::new(&new_code);
                merge_response(&mut response, inherited, ctx)?;
                child.insert(new_code, response);
            }
        }
    }
    Ok(())
}

fn merge_response(child: &mut Response, parent: &Response, ctx: MergeContext<'_>) -> AppResult<()> {
    ctx.text(&mut child.description, &parent.description)?;
    merge_named(&mut child.headers, &parent.headers, ctx)?;
    merge_bodies(&mut child.body, &parent.body, ctx)?;
    fill_annotations(&mut child.annotations, &parent.annotations);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raml::libraries::SymbolTable;
    use crate::raml::models::{Shape, TypeExpr};
    use crate::raml::substitution::Dictionary;
    use pretty_assertions::assert_eq;

    fn users_dict() -> Dictionary {
        let mut values = IndexMap::new();
        values.insert("resourcePathName".to_string(), "users".to_string());
        Dictionary::new(values)
    }

    fn response(code: &str, description: &str) -> (String, Response) {
        let mut r = Response::new(code);
        r.description = Some(description.to_string());
        (code.to_string(), r)
    }

    #[test]
    fn test_child_response_description_wins() {
        let dict = users_dict();
        let symbols = SymbolTable::default();
        let ctx = MergeContext::new(&dict, None, &symbols);

        let mut child: IndexMap<_, _> = [response("200", "Custom")].into_iter().collect();
        let parent: IndexMap<_, _> = [
            response("200", "<<resourcePathName>> list"),
            response("404", "No <<resourcePathName>>"),
            response("500?", "Oops"),
        ]
        .into_iter()
        .collect();
        merge_responses(&mut child, &parent, ctx).unwrap();

        assert_eq!(child["200"].description.as_deref(), Some("Custom"));
        assert_eq!(child["404"].description.as_deref(), Some("No users"));
        assert_eq!(child["404"].code, "404");
        assert!(!child.contains_key("500"));
        assert!(!child.contains_key("500?"));
    }

    #[test]
    fn test_media_type_bodies_are_added() {
        let dict = Dictionary::default();
        let symbols = SymbolTable::default();
        let ctx = MergeContext::new(&dict, None, &symbols);

        let mut parent = Bodies::default();
        parent.for_media_type.insert(
            "application/json".into(),
            Body {
                shape: Shape::of_type("User"),
                ..Body::default()
            },
        );
        let mut child = Bodies::default();
        merge_bodies(&mut child, &parent, ctx).unwrap();
        assert_eq!(
            child.get("application/json").and_then(|b| b.shape.type_.clone()),
            Some(TypeExpr::Reference("User".into()))
        );
    }

    #[test]
    fn test_flat_child_body_absorbs_media_type_parent() {
        let dict = users_dict();
        let symbols = SymbolTable::default();
        let ctx = MergeContext::new(&dict, None, &symbols);

        let mut parent = Bodies::default();
        parent.for_media_type.insert(
            "application/json".into(),
            Body {
                shape: Shape {
                    type_: Some(TypeExpr::parse("<<resourcePathName>>")),
                    description: Some("A <<resourcePathName>> payload".into()),
                    ..Shape::default()
                },
                ..Body::default()
            },
        );
        let mut child = Bodies {
            default: Some(Body {
                shape: Shape::of_type("Custom"),
                ..Body::default()
            }),
            for_media_type: IndexMap::new(),
        };
        merge_bodies(&mut child, &parent, ctx).unwrap();

        assert!(child.for_media_type.is_empty());
        let flat = child.default.as_ref().unwrap();
        assert_eq!(flat.shape.type_string().as_deref(), Some("Custom"));
        assert_eq!(flat.shape.description.as_deref(), Some("A users payload"));
    }
}
