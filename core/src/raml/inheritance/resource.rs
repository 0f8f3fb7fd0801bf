//! Template chains, trait lists and the per-resource driver.

use super::method::merge_method;
use super::params::merge_named;
use super::{append_unique, fill_annotations, MergeContext};
use crate::error::{AppError, AppResult};
use crate::raml::libraries::SymbolTable;
use crate::raml::models::{
    ApiDefinition, DefinitionChoice, Method, ResourceId, ResourceNames, ResourceTree,
    ResourceType, Verb,
};
use crate::raml::substitution::Dictionary;
use indexmap::IndexMap;
use tracing::debug;

/// A resource type applied to one resource.
struct AppliedType<'s> {
    name: String,
    origin: Option<&'s str>,
    template: &'s ResourceType,
    parameters: IndexMap<String, String>,
}

impl<'s> AppliedType<'s> {
    fn method(&self, verb: Verb) -> Option<&'s Method> {
        self.template
            .methods
            .get(&verb)
            .or_else(|| self.template.optional_methods.get(&verb))
    }
}

/// Resolves every resource, parents before children.
pub fn resolve_resources(api: &mut ApiDefinition, symbols: &SymbolTable) -> AppResult<()> {
    for id in api.resources.depth_first() {
        resolve_resource(&mut api.resources, id, symbols)?;
    }
    Ok(())
}

/// Applies the resource type chain and every trait to one resource.
///
/// Resource level fields are merged first. Then, per method: the resource's
/// traits, the method's traits, the traits the templates declare, and finally
/// the template methods, nearest resource type first.
pub fn resolve_resource(
    tree: &mut ResourceTree,
    id: ResourceId,
    symbols: &SymbolTable,
) -> AppResult<()> {
    let names = ResourceNames::of(tree, id);
    let resource = tree.get_mut(id);
    let chain = type_chain(resource.type_.as_ref(), &names, symbols)?;

    for applied in &chain {
        debug!(
            resource = %names.full_uri,
            resource_type = %applied.name,
            "applying resource type"
        );
        let dict = Dictionary::for_resource_type(&names, &applied.parameters);
        let ctx = MergeContext::new(&dict, applied.origin, symbols);
        let rt = applied.template;
        ctx.text(&mut resource.display_name, &rt.display_name)?;
        ctx.text(&mut resource.description, &rt.description)?;
        merge_named(&mut resource.uri_parameters, &rt.uri_parameters, ctx)?;
        let secured_by = substitute_choices(&dict, &rt.secured_by)?;
        append_unique(&mut resource.secured_by, &secured_by);
        fill_annotations(&mut resource.annotations, &rt.annotations);
    }

    for applied in &chain {
        for verb in applied.template.methods.keys() {
            resource
                .methods
                .entry(*verb)
                .or_insert_with(|| Method::new(*verb));
        }
    }

    let resource_is = resource.is.clone();
    for (verb, method) in resource.methods.iter_mut() {
        let verb = *verb;
        let mut applied = Vec::new();

        let own: Vec<DefinitionChoice> = resource_is.iter().chain(&method.is).cloned().collect();
        apply_traits(method, &own, None, &names, symbols, &mut applied)?;

        for t in &chain {
            let dict = Dictionary::for_method(&names, verb, &t.parameters);
            let mut refs = substitute_choices(&dict, &t.template.is)?;
            if let Some(template) = t.method(verb) {
                refs.extend(substitute_choices(&dict, &template.is)?);
            }
            apply_traits(method, &refs, t.origin, &names, symbols, &mut applied)?;
        }

        for t in &chain {
            let Some(template) = t.method(verb) else {
                continue;
            };
            let dict = Dictionary::for_method(&names, verb, &t.parameters);
            merge_method(method, template, MergeContext::new(&dict, t.origin, symbols))?;
            if method.resource_type_name.is_none() {
                method.resource_type_name = Some(t.name.clone());
            }
        }
    }
    Ok(())
}

/// Follows `type:` references from the resource outwards. Parameter values
/// of each parent reference are substituted with the referring template's
/// dictionary.
fn type_chain<'s>(
    first: Option<&DefinitionChoice>,
    names: &ResourceNames,
    symbols: &'s SymbolTable,
) -> AppResult<Vec<AppliedType<'s>>> {
    let mut chain: Vec<AppliedType<'s>> = Vec::new();
    let mut next = first.cloned();
    let mut from: Option<&'s str> = None;

    while let Some(choice) = next.take() {
        let symbol = symbols.resource_type(&choice.name, from)?;
        if chain
            .iter()
            .any(|applied| std::ptr::eq(applied.template, &symbol.item))
        {
            let mut cycle: Vec<String> = chain.iter().map(|a| a.name.clone()).collect();
            cycle.push(choice.name);
            return Err(AppError::General(format!(
                "resource type cycle: {}",
                cycle.join(" -> ")
            )));
        }

        let dict = Dictionary::for_resource_type(names, &choice.parameters);
        next = match &symbol.item.type_ {
            Some(parent) => Some(dict.apply_to_choice(parent)?),
            None => None,
        };
        from = symbol.origin.as_deref();
        chain.push(AppliedType {
            name: choice.name,
            origin: from,
            template: &symbol.item,
            parameters: choice.parameters,
        });
    }
    Ok(chain)
}

/// Applies traits in order. Each trait is applied at most once per method;
/// traits a trait declares are applied right after it.
fn apply_traits(
    method: &mut Method,
    refs: &[DefinitionChoice],
    from: Option<&str>,
    names: &ResourceNames,
    symbols: &SymbolTable,
    applied: &mut Vec<(Option<String>, String)>,
) -> AppResult<()> {
    for choice in refs {
        let symbol = symbols.trait_def(&choice.name, from)?;
        let key = (symbol.origin.clone(), symbol.item.name.clone());
        if applied.contains(&key) {
            continue;
        }
        applied.push(key);

        debug!(
            resource = %names.full_uri,
            method = %method.verb,
            trait_name = %choice.name,
            "applying trait"
        );
        let dict = Dictionary::for_method(names, method.verb, &choice.parameters);
        let origin = symbol.origin.as_deref();
        merge_method(
            method,
            &symbol.item.template,
            MergeContext::new(&dict, origin, symbols),
        )?;

        if !symbol.item.template.is.is_empty() {
            let nested = substitute_choices(&dict, &symbol.item.template.is)?;
            apply_traits(method, &nested, origin, names, symbols, applied)?;
        }
    }
    Ok(())
}

fn substitute_choices(
    dict: &Dictionary,
    choices: &[DefinitionChoice],
) -> AppResult<Vec<DefinitionChoice>> {
    choices.iter().map(|c| dict.apply_to_choice(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReferenceKind;
    use crate::raml::builder::build_api;
    use crate::raml::location::Location;
    use pretty_assertions::assert_eq;

    fn resolve(yaml: &str) -> AppResult<ApiDefinition> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        let mut api = build_api(&value, Location::parse("api.raml").unwrap())?;
        let symbols = SymbolTable::build(&api);
        resolve_resources(&mut api, &symbols)?;
        Ok(api)
    }

    fn description(api: &ApiDefinition, path: &str, verb: Verb) -> Option<String> {
        api.resource(path)?.method(verb)?.description.clone()
    }

    #[test]
    fn test_resource_type_with_parameters() {
        let api = resolve(r#"
title: T
resourceTypes:
  collection:
    description: All <<resourcePathName>>
    get:
      description: Get all <<resourceName>>s
/users:
  type: { collection: { resourceName: user } }
"#)
        .unwrap();
        assert_eq!(
            description(&api, "/users", Verb::Get).as_deref(),
            Some("Get all users")
        );
        let users = api.resource("/users").unwrap();
        assert_eq!(users.description.as_deref(), Some("All users"));
        assert_eq!(
            users.method(Verb::Get).unwrap().resource_type_name.as_deref(),
            Some("collection")
        );
    }

    #[test]
    fn test_optional_verbs_need_a_declared_method() {
        let api = resolve(r#"
title: T
resourceTypes:
  item:
    delete?:
      description: Remove one <<resourcePathName | !singularize>>
/books:
  type: item
/users:
  type: item
  delete:
"#)
        .unwrap();
        assert!(api.resource("/books").unwrap().method(Verb::Delete).is_none());
        assert_eq!(
            description(&api, "/users", Verb::Delete).as_deref(),
            Some("Remove one user")
        );
    }

    #[test]
    fn test_chain_is_applied_nearest_first() {
        let api = resolve(r#"
title: T
resourceTypes:
  base:
    get:
      description: from base
      headers:
        X-Base:
  readonly:
    type: base
    get:
      description: from <<resourcePathName>>
/users:
  type: readonly
"#)
        .unwrap();
        let get = api.resource("/users").unwrap().method(Verb::Get).unwrap();
        assert_eq!(get.description.as_deref(), Some("from users"));
        assert!(get.headers.contains_key("X-Base"));
    }

    #[test]
    fn test_chain_cycle_is_an_error() {
        let err = resolve(r#"
title: T
resourceTypes:
  a:
    type: b
  b:
    type: a
/x:
  type: a
"#)
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "General Error: resource type cycle: a -> b -> a"
        );
    }

    #[test]
    fn test_first_trait_wins() {
        let api = resolve(r#"
title: T
traits:
  first:
    description: first <<methodName>>
    headers:
      X-Trace?:
        description: from first
  second:
    description: second
    headers:
      X-Trace?:
        description: from second
/users:
  is: [first]
  get:
    is: [second]
    headers:
      X-Trace:
"#)
        .unwrap();
        let get = api.resource("/users").unwrap().method(Verb::Get).unwrap();
        assert_eq!(get.description.as_deref(), Some("first get"));
        assert_eq!(
            get.headers["X-Trace"].shape.description.as_deref(),
            Some("from first")
        );
    }

    #[test]
    fn test_template_traits_apply_after_own_traits() {
        let api = resolve(r#"
title: T
traits:
  paged:
    queryParameters:
      limit:
        description: max <<max>>
  mine:
    description: mine
resourceTypes:
  collection:
    is: [ { paged: { max: <<pageSize>> } } ]
    get:
/users:
  type: { collection: { pageSize: 10 } }
  is: [mine]
"#)
        .unwrap();
        let get = api.resource("/users").unwrap().method(Verb::Get).unwrap();
        assert_eq!(get.description.as_deref(), Some("mine"));
        assert_eq!(
            get.query_parameters["limit"].shape.description.as_deref(),
            Some("max 10")
        );
    }

    #[test]
    fn test_missing_resource_type() {
        let err = resolve("title: T\n/x:\n  type: nosuch\n").unwrap_err();
        assert!(matches!(
            err,
            AppError::Reference { kind: ReferenceKind::ResourceType, ref name } if name == "nosuch"
        ));
    }

    #[test]
    fn test_missing_trait() {
        let err = resolve("title: T\n/x:\n  get:\n    is: [ghost]\n").unwrap_err();
        assert!(matches!(
            err,
            AppError::Reference { kind: ReferenceKind::Trait, .. }
        ));
    }
}
