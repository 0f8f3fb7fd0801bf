//! One method template into one method.

use super::bodies::{merge_bodies, merge_responses};
use super::params::{merge_named, merge_shape};
use super::{append_unique, fill_annotations, MergeContext};
use crate::error::AppResult;
use crate::raml::models::{Method, Shape};

/// Merges a trait body or a resource-type method into `child`.
///
/// Template `is` lists are not copied; the resource driver applies those
/// traits itself.
pub fn merge_method(child: &mut Method, parent: &Method, ctx: MergeContext<'_>) -> AppResult<()> {
    ctx.text(&mut child.display_name, &parent.display_name)?;
    ctx.text(&mut child.description, &parent.description)?;
    merge_named(&mut child.query_parameters, &parent.query_parameters, ctx)?;
    merge_named(&mut child.headers, &parent.headers, ctx)?;
    if let Some(inherited) = &parent.query_string {
        let own = child.query_string.get_or_insert_with(Shape::default);
        merge_shape(own, inherited, ctx)?;
    }
    merge_responses(&mut child.responses, &parent.responses, ctx)?;
    merge_bodies(&mut child.body, &parent.body, ctx)?;
    append_unique(&mut child.protocols, &parent.protocols);

    let mut secured_by = Vec::with_capacity(parent.secured_by.len());
    for choice in &parent.secured_by {
        secured_by.push(ctx.dict.apply_to_choice(choice)?);
    }
    append_unique(&mut child.secured_by, &secured_by);

    fill_annotations(&mut child.annotations, &parent.annotations);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raml::libraries::SymbolTable;
    use crate::raml::models::{DefinitionChoice, Property, Verb};
    use crate::raml::substitution::Dictionary;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trait_fields_are_added_without_overwriting() {
        let mut values = IndexMap::new();
        values.insert("maxItems".to_string(), "50".to_string());
        let dict = Dictionary::new(values);
        let symbols = SymbolTable::default();
        let ctx = MergeContext::new(&dict, None, &symbols);

        let mut parent = Method::default();
        parent.description = Some("Paged, at most <<maxItems>>".into());
        let mut page = Property::from_key("page");
        page.shape.description = Some("Up to <<maxItems>>".into());
        parent.query_parameters.insert("page".into(), page);
        parent.protocols = vec!["HTTPS".into()];
        parent.secured_by = vec![DefinitionChoice::named("oauth")];

        let mut child = Method::new(Verb::Get);
        child.description = Some("List".into());
        child.protocols = vec!["HTTPS".into(), "HTTP".into()];

        merge_method(&mut child, &parent, ctx).unwrap();
        assert_eq!(child.description.as_deref(), Some("List"));
        assert_eq!(
            child.query_parameters["page"].shape.description.as_deref(),
            Some("Up to 50")
        );
        assert_eq!(child.protocols, vec!["HTTPS", "HTTP"]);
        assert_eq!(child.secured_by, vec![DefinitionChoice::named("oauth")]);
        assert!(child.headers.is_empty());
        assert!(child.responses.is_empty());
    }

    #[test]
    fn test_query_string_is_inherited() {
        let dict = Dictionary::default();
        let symbols = SymbolTable::default();
        let ctx = MergeContext::new(&dict, None, &symbols);

        let mut parent = Method::default();
        parent.query_string = Some(Shape::of_type("Filter"));
        let mut child = Method::new(Verb::Get);
        merge_method(&mut child, &parent, ctx).unwrap();
        assert_eq!(
            child
                .query_string
                .and_then(|s| s.type_string())
                .as_deref(),
            Some("Filter")
        );
    }
}
