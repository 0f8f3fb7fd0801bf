#![deny(missing_docs)]

//! # Library & Symbol Resolution
//!
//! Flattens the declarations of the root document and of every transitively
//! imported library into lookup tables. Root declarations are keyed by bare
//! name, library declarations by `alias.name` where `alias` is the name the
//! importing document gave the library.

use crate::error::{AppError, AppResult, ReferenceKind};
use crate::raml::models::{
    ApiDefinition, DefinitionChoice, Declarations, Library, ResourceType, SecurityScheme, Trait,
};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

/// A declaration together with the alias of the library it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol<T> {
    /// Alias of the declaring library, `None` for the root document.
    pub origin: Option<String>,
    /// The declaration itself.
    pub item: T,
}

/// Every resource type, trait and security scheme reachable from a document.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    resource_types: IndexMap<String, Symbol<ResourceType>>,
    traits: IndexMap<String, Symbol<Trait>>,
    security_schemes: IndexMap<String, Symbol<SecurityScheme>>,
    library_types: IndexMap<String, IndexSet<String>>,
}

impl SymbolTable {
    /// Builds the tables for `api` and its loaded libraries.
    pub fn build(api: &ApiDefinition) -> Self {
        let mut table = Self::default();
        table.add_declarations(None, &api.declarations);
        table.add_libraries(&api.libraries);
        debug!(
            resource_types = table.resource_types.len(),
            traits = table.traits.len(),
            security_schemes = table.security_schemes.len(),
            "symbol table built"
        );
        table
    }

    fn add_libraries(&mut self, libraries: &IndexMap<String, Library>) {
        for (alias, lib) in libraries {
            self.add_declarations(Some(alias), &lib.declarations);
            self.library_types
                .entry(alias.clone())
                .or_default()
                .extend(lib.declarations.types.keys().cloned());
            self.add_libraries(&lib.libraries);
        }
    }

    fn add_declarations(&mut self, origin: Option<&str>, decl: &Declarations) {
        let key = |name: &str| match origin {
            Some(alias) => format!("{}.{}", alias, name),
            None => name.to_string(),
        };
        for (name, rt) in &decl.resource_types {
            insert_first(&mut self.resource_types, key(name), origin, rt, "resource type");
        }
        for (name, t) in &decl.traits {
            insert_first(&mut self.traits, key(name), origin, t, "trait");
        }
        for (name, s) in &decl.security_schemes {
            insert_first(&mut self.security_schemes, key(name), origin, s, "security scheme");
        }
    }

    /// Looks up a resource type referenced from a template declared in `from`.
    pub fn resource_type(&self, name: &str, from: Option<&str>) -> AppResult<&Symbol<ResourceType>> {
        lookup(&self.resource_types, name, from, ReferenceKind::ResourceType)
    }

    /// Looks up a trait referenced from a template declared in `from`.
    pub fn trait_def(&self, name: &str, from: Option<&str>) -> AppResult<&Symbol<Trait>> {
        lookup(&self.traits, name, from, ReferenceKind::Trait)
    }

    /// Looks up a security scheme.
    pub fn security_scheme(
        &self,
        name: &str,
        from: Option<&str>,
    ) -> AppResult<&Symbol<SecurityScheme>> {
        lookup(&self.security_schemes, name, from, ReferenceKind::SecurityScheme)
    }

    /// Checks every `securedBy` entry; `null` (anonymous access) always passes.
    pub fn check_secured_by(&self, choices: &[DefinitionChoice], from: Option<&str>) -> AppResult<()> {
        for choice in choices.iter().filter(|c| !c.is_anonymous()) {
            self.security_scheme(&choice.name, from)?;
        }
        Ok(())
    }

    /// Rewrites a type name declared by the library `origin` to its qualified
    /// form: `Book[]` from library `lib` becomes `lib.Book[]`. Each member of a
    /// union is qualified on its own. Anything else is returned unchanged.
    pub fn qualify_type(&self, origin: Option<&str>, type_name: &str) -> String {
        let Some((alias, types)) = origin.and_then(|a| self.library_types.get_key_value(a)) else {
            return type_name.to_string();
        };
        let trimmed = type_name.trim();
        if trimmed.starts_with(['{', '<']) || trimmed.contains('\n') {
            return type_name.to_string();
        }
        if !trimmed.contains('|') {
            return qualify_member(types, alias, trimmed).unwrap_or_else(|| type_name.to_string());
        }
        trimmed
            .split('|')
            .map(|member| {
                qualify_member(types, alias, member).unwrap_or_else(|| member.trim().to_string())
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// `(Book[]` becomes `(lib.Book[]` when `Book` is one of the library's types.
fn qualify_member(types: &IndexSet<String>, alias: &str, member: &str) -> Option<String> {
    let member = member.trim();
    let rest = member.trim_start_matches('(');
    let prefix = &member[..member.len() - rest.len()];
    let base = rest.trim_end_matches(['[', ']', ')']);
    let suffix = &rest[base.len()..];
    types
        .contains(base)
        .then(|| format!("{}{}.{}{}", prefix, alias, base, suffix))
}

fn insert_first<T: Clone>(
    table: &mut IndexMap<String, Symbol<T>>,
    key: String,
    origin: Option<&str>,
    item: &T,
    kind: &str,
) {
    if table.contains_key(&key) {
        warn!(name = %key, "duplicate {} declaration ignored", kind);
        return;
    }
    table.insert(
        key,
        Symbol {
            origin: origin.map(str::to_string),
            item: item.clone(),
        },
    );
}

fn lookup<'a, T>(
    table: &'a IndexMap<String, Symbol<T>>,
    name: &str,
    from: Option<&str>,
    kind: ReferenceKind,
) -> AppResult<&'a Symbol<T>> {
    let name = name.trim();
    if let Some(symbol) = table.get(name) {
        return Ok(symbol);
    }
    if let Some(alias) = from.filter(|_| !name.contains('.')) {
        if let Some(symbol) = table.get(&format!("{}.{}", alias, name)) {
            return Ok(symbol);
        }
    }
    Err(AppError::Reference {
        kind,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raml::location::Location;
    use crate::raml::models::Shape;

    fn api_with_library() -> ApiDefinition {
        let mut api = ApiDefinition::new(Location::parse("api.raml").unwrap());
        api.declarations.traits.insert(
            "paged".into(),
            Trait {
                name: "paged".into(),
                ..Trait::default()
            },
        );

        let mut inner = Library::new(Location::parse("inner.raml").unwrap());
        inner.declarations.traits.insert(
            "secured".into(),
            Trait {
                name: "secured".into(),
                ..Trait::default()
            },
        );

        let mut lib = Library::new(Location::parse("lib.raml").unwrap());
        lib.declarations.resource_types.insert(
            "base".into(),
            ResourceType {
                name: "base".into(),
                ..ResourceType::default()
            },
        );
        lib.declarations
            .types
            .insert("Book".into(), Shape::of_type("object"));
        lib.declarations
            .types
            .insert("Error".into(), Shape::of_type("object"));
        lib.declarations.security_schemes.insert(
            "oauth".into(),
            SecurityScheme {
                name: "oauth".into(),
                ..SecurityScheme::default()
            },
        );
        lib.libraries.insert("inner".into(), inner);
        api.libraries.insert("lib".into(), lib);
        api
    }

    #[test]
    fn test_root_and_library_keys() {
        let table = SymbolTable::build(&api_with_library());
        assert!(table.trait_def("paged", None).unwrap().origin.is_none());
        let base = table.resource_type("lib.base", None).unwrap();
        assert_eq!(base.origin.as_deref(), Some("lib"));
        assert!(table.trait_def("inner.secured", None).is_ok());
    }

    #[test]
    fn test_bare_name_falls_back_to_origin_library() {
        let table = SymbolTable::build(&api_with_library());
        assert!(table.resource_type("base", None).is_err());
        assert!(table.resource_type("base", Some("lib")).is_ok());
    }

    #[test]
    fn test_missing_reference_names_identifier() {
        let table = SymbolTable::build(&api_with_library());
        let err = table.resource_type("nosuch", None).unwrap_err();
        assert_eq!(err.to_string(), "unknown resource type 'nosuch'");
    }

    #[test]
    fn test_check_secured_by() {
        let table = SymbolTable::build(&api_with_library());
        let ok = vec![DefinitionChoice::named("null"), DefinitionChoice::named("lib.oauth")];
        assert!(table.check_secured_by(&ok, None).is_ok());
        let bad = vec![DefinitionChoice::named("basic")];
        assert!(matches!(
            table.check_secured_by(&bad, None),
            Err(AppError::Reference {
                kind: ReferenceKind::SecurityScheme,
                ..
            })
        ));
    }

    #[test]
    fn test_qualify_type() {
        let table = SymbolTable::build(&api_with_library());
        assert_eq!(table.qualify_type(Some("lib"), "Book"), "lib.Book");
        assert_eq!(table.qualify_type(Some("lib"), "Book[]"), "lib.Book[]");
        assert_eq!(table.qualify_type(Some("lib"), "string"), "string");
        assert_eq!(table.qualify_type(None, "Book"), "Book");
    }

    #[test]
    fn test_qualify_union_members() {
        let table = SymbolTable::build(&api_with_library());
        assert_eq!(
            table.qualify_type(Some("lib"), "Book | Error"),
            "lib.Book | lib.Error"
        );
        assert_eq!(
            table.qualify_type(Some("lib"), "Book[] | nil"),
            "lib.Book[] | nil"
        );
        assert_eq!(
            table.qualify_type(Some("lib"), "(Book | Error)[]"),
            "(lib.Book | lib.Error)[]"
        );
    }
}
