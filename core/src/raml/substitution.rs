#![deny(missing_docs)]

//! # Substitution Engine
//!
//! Resolves `<<name>>` and `<<name | !inflector | ...>>` placeholders in
//! template text against a [`Dictionary`].

use crate::error::AppResult;
use crate::raml::inflector;
use crate::raml::models::{DefinitionChoice, ResourceNames, Verb};
use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Derived keys that are always present and override declared parameters.
pub const RESERVED_KEYS: &[&str] = &[
    "resourcePath",
    "resourceUri",
    "resourcePathName",
    "resourcePathNameSingular",
    "resourcePathNamePlural",
    "resourcePathNameCamel",
    "methodName",
];

fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"<<\s*([^<>]+?)\s*>>").expect("Invalid regex"))
}

/// Parameter values for one template application.
///
/// Built fresh for every merge and never stored in the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    values: IndexMap<String, String>,
}

impl Dictionary {
    /// A dictionary holding exactly `values`.
    pub fn new(values: IndexMap<String, String>) -> Self {
        Self { values }
    }

    /// The dictionary for applying a resource type to the resource `names`.
    pub fn for_resource_type(names: &ResourceNames, params: &IndexMap<String, String>) -> Self {
        let mut values = params.clone();
        let path_name = names.path_name.as_str();
        values.insert("resourcePath".into(), names.full_uri.clone());
        values.insert("resourceUri".into(), names.relative_uri.clone());
        values.insert("resourcePathName".into(), path_name.to_string());
        values.insert(
            "resourcePathNameSingular".into(),
            inflector::singularize(path_name),
        );
        values.insert(
            "resourcePathNamePlural".into(),
            inflector::pluralize(path_name),
        );
        values.insert(
            "resourcePathNameCamel".into(),
            path_name.to_lower_camel_case(),
        );
        Self { values }
    }

    /// The dictionary for applying a trait (or a resource-type method) to
    /// the `verb` method of the resource `names`.
    pub fn for_method(names: &ResourceNames, verb: Verb, params: &IndexMap<String, String>) -> Self {
        let mut dict = Self::for_resource_type(names, params);
        dict.values.insert("methodName".into(), verb.key().to_string());
        dict
    }

    /// Looks up a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Substitutes the parameter values of a nested template reference, so
    /// `type: {base: {name: <<resourcePathName>>}}` inside a template passes
    /// the concrete value down.
    pub fn apply_to_choice(&self, choice: &DefinitionChoice) -> AppResult<DefinitionChoice> {
        let mut parameters = IndexMap::with_capacity(choice.parameters.len());
        for (key, value) in &choice.parameters {
            parameters.insert(key.clone(), substitute("", value, self)?);
        }
        Ok(DefinitionChoice {
            name: substitute("", &choice.name, self)?,
            parameters,
        })
    }
}

/// True when `text` contains a placeholder marker.
pub fn has_placeholder(text: &str) -> bool {
    text.contains("<<") || text.contains(">>")
}

/// Resolves a child value against a template value.
///
/// A non-empty child without placeholder markers is returned unchanged. An
/// empty template returns the child. Otherwise every placeholder in the
/// template is replaced; names missing from `dict` leave their token as is.
pub fn substitute(child: &str, template: &str, dict: &Dictionary) -> AppResult<String> {
    if !child.is_empty() && !has_placeholder(child) {
        return Ok(child.to_string());
    }
    if template.is_empty() {
        return Ok(child.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder_re().captures_iter(template) {
        let Some(token) = caps.get(0) else { continue };
        out.push_str(&template[last..token.start()]);
        match resolve_token(&caps, dict)? {
            Some(value) => out.push_str(&value),
            None => out.push_str(token.as_str()),
        }
        last = token.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Optional text variant of [`substitute`]: `None` stays `None` unless the
/// template provides something.
pub fn substitute_opt(
    child: Option<&str>,
    template: Option<&str>,
    dict: &Dictionary,
) -> AppResult<Option<String>> {
    let resolved = substitute(child.unwrap_or_default(), template.unwrap_or_default(), dict)?;
    Ok((!resolved.is_empty()).then_some(resolved))
}

fn resolve_token(caps: &Captures<'_>, dict: &Dictionary) -> AppResult<Option<String>> {
    let inner = caps.get(1).map_or("", |m| m.as_str());
    let mut parts = inner.split('|');
    let name = parts.next().unwrap_or_default().trim();
    let Some(value) = dict.get(name) else {
        return Ok(None);
    };
    let mut value = value.to_string();
    for transform in parts {
        value = inflector::apply(transform, &value)?;
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use pretty_assertions::assert_eq;

    fn dict(pairs: &[(&str, &str)]) -> Dictionary {
        Dictionary::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_placeholder_free_child_is_unchanged() {
        let d = dict(&[("resourcePathName", "users")]);
        for text in ["Custom", "plain text", "a | b"] {
            assert_eq!(substitute(text, "<<resourcePathName>> list", &d).unwrap(), text);
            assert_eq!(substitute(text, "", &d).unwrap(), text);
        }
    }

    #[test]
    fn test_empty_template_returns_child() {
        let d = dict(&[]);
        assert_eq!(substitute("", "", &d).unwrap(), "");
        assert_eq!(substitute("<<x>>", "", &d).unwrap(), "<<x>>");
    }

    #[test]
    fn test_inflector_chain() {
        let d = dict(&[("resourcePathName", "Users")]);
        assert_eq!(
            substitute("", "Delete a <<resourcePathName | !singularize>>", &d).unwrap(),
            "Delete a User"
        );
        assert_eq!(
            substitute(
                "",
                "<<resourcePathName|!singularize|!upperunderscorecase>>_ID",
                &d
            )
            .unwrap(),
            "USER_ID"
        );
    }

    #[test]
    fn test_unknown_names_are_left_in_place() {
        let d = dict(&[("a", "1")]);
        assert_eq!(
            substitute("", "<<a>> and << b >>", &d).unwrap(),
            "1 and << b >>"
        );
    }

    #[test]
    fn test_unknown_inflector_fails() {
        let d = dict(&[("a", "x")]);
        let err = substitute("", "<<a | !reverse>>", &d).unwrap_err();
        assert!(matches!(err, AppError::UnknownInflector(_)));
    }

    #[test]
    fn test_resource_type_dictionary_reserved_keys_win() {
        let names = ResourceNames {
            full_uri: "/users/{id}/books".into(),
            relative_uri: "/books".into(),
            path_name: "books".into(),
        };
        let mut params = IndexMap::new();
        params.insert("resourcePathName".to_string(), "ignored".to_string());
        params.insert("item".to_string(), "Book".to_string());
        let d = Dictionary::for_method(&names, Verb::Post, &params);
        assert_eq!(d.get("resourcePathName"), Some("books"));
        assert_eq!(d.get("resourcePathNameSingular"), Some("book"));
        assert_eq!(d.get("resourcePath"), Some("/users/{id}/books"));
        assert_eq!(d.get("resourceUri"), Some("/books"));
        assert_eq!(d.get("methodName"), Some("post"));
        assert_eq!(d.get("item"), Some("Book"));
    }

    #[test]
    fn test_apply_to_choice_passes_values_down() {
        let d = dict(&[("resourcePathName", "users")]);
        let mut choice = DefinitionChoice::named("paged");
        choice
            .parameters
            .insert("what".into(), "<<resourcePathName | !uppercamelcase>>".into());
        let resolved = d.apply_to_choice(&choice).unwrap();
        assert_eq!(resolved.name, "paged");
        assert_eq!(resolved.parameters["what"], "Users");
    }
}
