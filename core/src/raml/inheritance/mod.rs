#![deny(missing_docs)]

//! # Inheritance Resolution
//!
//! Copy-merges resource types and traits into concrete resources and methods.
//!
//! - **params**: named fields (headers, query/URI parameters) and shapes.
//! - **bodies**: bodies and responses.
//! - **method**: one method template into one method.
//! - **resource**: template chains, trait lists and the per-resource driver.
//!
//! Every merge is additive: values the child states explicitly are never
//! replaced, and every value copied from a template goes through placeholder
//! substitution first.

mod bodies;
mod method;
mod params;
mod resource;

pub use bodies::{merge_bodies, merge_responses};
pub use method::merge_method;
pub use params::{merge_named, merge_shape};
pub use resource::{resolve_resource, resolve_resources};

use crate::error::AppResult;
use crate::raml::libraries::SymbolTable;
use crate::raml::models::Annotations;
use crate::raml::substitution::{substitute, substitute_opt, Dictionary};
use indexmap::IndexMap;

/// Everything one template application needs.
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a> {
    /// Parameter values for this application.
    pub dict: &'a Dictionary,
    /// Alias of the library the template was declared in.
    pub origin: Option<&'a str>,
    /// Lookup tables, used to qualify library type names.
    pub symbols: &'a SymbolTable,
}

impl<'a> MergeContext<'a> {
    /// Bundles the pieces of a merge.
    pub fn new(dict: &'a Dictionary, origin: Option<&'a str>, symbols: &'a SymbolTable) -> Self {
        Self {
            dict,
            origin,
            symbols,
        }
    }

    /// Merges an optional text field, child first.
    pub(crate) fn text(&self, child: &mut Option<String>, parent: &Option<String>) -> AppResult<()> {
        if parent.is_none() {
            return Ok(());
        }
        *child = substitute_opt(child.as_deref(), parent.as_deref(), self.dict)?;
        Ok(())
    }
}

/// What to do with one parent key of an ordered mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyPlan {
    /// The child already has this entry.
    Merge(String),
    /// Add the parent's entry under this key.
    Insert(String),
    /// Optional parent entry the child does not declare.
    Skip,
}

/// Decides how a parent key lands in `child`.
///
/// `name\?` is inserted as the optional `name?`. `name?` is only merged when
/// the child declares `name` (or `name?`) itself. Keys are substituted
/// before lookup.
pub(crate) fn plan_key<V>(
    key: &str,
    child: &IndexMap<String, V>,
    dict: &Dictionary,
) -> AppResult<KeyPlan> {
    let existing = |base: String| {
        let optional = format!("{}?", base);
        if child.contains_key(&base) {
            Some(base)
        } else if child.contains_key(&optional) {
            Some(optional)
        } else {
            None
        }
    };

    if let Some(base) = key.strip_suffix("\\?") {
        let base = substitute(base, base, dict)?;
        let optional = format!("{}?", base);
        return Ok(match existing(base) {
            Some(found) => KeyPlan::Merge(found),
            None => KeyPlan::Insert(optional),
        });
    }
    if let Some(base) = key.strip_suffix('?') {
        let base = substitute(base, base, dict)?;
        return Ok(match existing(base) {
            Some(found) => KeyPlan::Merge(found),
            None => KeyPlan::Skip,
        });
    }
    let key = substitute(key, key, dict)?;
    Ok(if child.contains_key(&key) {
        KeyPlan::Merge(key)
    } else {
        KeyPlan::Insert(key)
    })
}

/// Appends parent entries the child does not already list.
pub(crate) fn append_unique<T: PartialEq + Clone>(child: &mut Vec<T>, parent: &[T]) {
    for item in parent {
        if !child.contains(item) {
            child.push(item.clone());
        }
    }
}

/// Copies annotations the child does not set.
pub(crate) fn fill_annotations(child: &mut Annotations, parent: &Annotations) {
    for (name, value) in parent {
        child
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }
}
