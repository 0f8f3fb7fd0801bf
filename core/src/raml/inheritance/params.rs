//! Named fields and shapes.

use super::{plan_key, KeyPlan, MergeContext};
use crate::error::AppResult;
use crate::raml::models::{Property, Shape, TypeExpr};
use crate::raml::substitution::{has_placeholder, substitute};
use indexmap::IndexMap;

/// Merges headers, query parameters or URI parameters.
///
/// Entries the child already has are merged field by field, child first.
pub fn merge_named(
    child: &mut IndexMap<String, Property>,
    parent: &IndexMap<String, Property>,
    ctx: MergeContext<'_>,
) -> AppResult<()> {
    for (key, inherited) in parent {
        match plan_key(key, child, ctx.dict)? {
            KeyPlan::Skip => {}
            KeyPlan::Merge(existing) => {
                if let Some(prop) = child.get_mut(&existing) {
                    merge_shape(&mut prop.shape, &inherited.shape, ctx)?;
                }
            }
            KeyPlan::Insert(name) => {
                let prop = inherit_property(&name, inherited, ctx)?;
                child.insert(name, prop);
            }
        }
    }
    Ok(())
}

/// Merges the properties of an object shape. Properties the child already
/// declares are left alone.
pub(crate) fn merge_properties(
    child: &mut IndexMap<String, Property>,
    parent: &IndexMap<String, Property>,
    ctx: MergeContext<'_>,
) -> AppResult<()> {
    for (key, inherited) in parent {
        if let KeyPlan::Insert(name) = plan_key(key, child, ctx.dict)? {
            let prop = inherit_property(&name, inherited, ctx)?;
            child.insert(name, prop);
        }
    }
    Ok(())
}

fn inherit_property(key: &str, parent: &Property, ctx: MergeContext<'_>) -> AppResult<Property> {
    let mut prop = Property::from_key(key);
    prop.required = prop.required && parent.required;
    merge_shape(&mut prop.shape, &parent.shape, ctx)?;
    Ok(prop)
}

/// Merges a parent shape into a child shape.
pub fn merge_shape(child: &mut Shape, parent: &Shape, ctx: MergeContext<'_>) -> AppResult<()> {
    merge_type(&mut child.type_, parent.type_.as_ref(), ctx)?;
    merge_type(&mut child.items, parent.items.as_ref(), ctx)?;
    merge_properties(&mut child.properties, &parent.properties, ctx)?;
    ctx.text(&mut child.display_name, &parent.display_name)?;
    ctx.text(&mut child.description, &parent.description)?;
    ctx.text(&mut child.example, &parent.example)?;
    ctx.text(&mut child.pattern, &parent.pattern)?;
    ctx.text(&mut child.format, &parent.format)?;
    ctx.text(&mut child.discriminator, &parent.discriminator)?;
    child.fill_facets_from(parent);
    Ok(())
}

/// Merges a type expression.
///
/// Names copied from the template are substituted and, when they name a type
/// of the template's own library, qualified with its alias. Names the child
/// states itself are kept.
pub(crate) fn merge_type(
    child: &mut Option<TypeExpr>,
    parent: Option<&TypeExpr>,
    ctx: MergeContext<'_>,
) -> AppResult<()> {
    let Some(parent) = parent else {
        return Ok(());
    };

    if let TypeExpr::InlineShape(inherited) = parent {
        match child {
            Some(TypeExpr::InlineShape(own)) => merge_shape(own, inherited, ctx)?,
            Some(_) => {}
            None => {
                let mut shape = Shape::default();
                merge_shape(&mut shape, inherited, ctx)?;
                *child = Some(TypeExpr::InlineShape(Box::new(shape)));
            }
        }
        return Ok(());
    }
    if matches!(child, Some(TypeExpr::InlineShape(_))) {
        return Ok(());
    }

    let current = child
        .as_ref()
        .map(TypeExpr::type_string)
        .unwrap_or_default();
    if !current.is_empty() && !has_placeholder(&current) {
        return Ok(());
    }
    let resolved = substitute(&current, &parent.type_string(), ctx.dict)?;
    let qualified = ctx.symbols.qualify_type(ctx.origin, &resolved);
    *child = (!qualified.trim().is_empty()).then(|| TypeExpr::parse(&qualified));
    Ok(())
}
