//! External menu data sources referenced by `dataTable` blocks.
//!
//! A source file is either already keyed by category:
//!
//! ```json
//! { "Desserts": { "description": "...", "items": [ ... ] } }
//! ```
//!
//! or the upstream ordering-system export, an array of categories that may
//! nest `subCategories`. The latter is flattened on load so every sub-category
//! becomes a top-level key.

use crate::error::{Error, Result};
use crate::types::{Categories, Category, CategoryFilter, DataTableBlock};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// Bookkeeping fields of the upstream export that carry no menu content
const UPSTREAM_NOISE_FIELDS: &[&str] = &["code", "slug", "itemCount", "icon"];

/// Named menu data sets, keyed by path relative to the data directory
#[derive(Debug, Default)]
pub struct DataSources {
    sources: BTreeMap<String, Categories>,
}

impl DataSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, categories: Categories) {
        self.sources.insert(source_key(key), categories);
    }

    /// Look up a source by the URL a block references it with
    pub fn get(&self, url: &str) -> Option<&Categories> {
        self.sources.get(&source_key(url))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Canonical key for a data source reference.
///
/// `/data/menu.json`, `data/menu.json` and `menu.json` all map to `menu.json`.
pub fn source_key(url: &str) -> String {
    let trimmed = url.trim().trim_start_matches('/');
    let trimmed = trimmed.strip_prefix("static/").unwrap_or(trimmed);
    trimmed
        .strip_prefix("data/")
        .unwrap_or(trimmed)
        .replace('\\', "/")
}

/// Why a `dataTable` block could not produce categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryLookupError {
    UnknownSource(String),
}

impl std::fmt::Display for CategoryLookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryLookupError::UnknownSource(url) => {
                write!(f, "Menu data source '{}' not found", url)
            }
        }
    }
}

/// Categories a `dataTable` block displays, in display order.
///
/// Inline `categories` win over `categoriesDataUrl`. A filter list keeps the
/// list's order; names absent from the source are skipped.
pub fn resolve_categories<'a>(
    block: &'a DataTableBlock,
    sources: &'a DataSources,
) -> std::result::Result<Vec<(&'a str, &'a Category)>, CategoryLookupError> {
    let categories = match (&block.categories, &block.categories_data_url) {
        (Some(inline), _) => inline,
        (None, Some(url)) => sources
            .get(url)
            .ok_or_else(|| CategoryLookupError::UnknownSource(url.clone()))?,
        (None, None) => return Ok(Vec::new()),
    };

    let selected = match &block.categories_filter {
        None | Some(CategoryFilter::All) => categories
            .iter()
            .map(|(name, category)| (name.as_str(), category))
            .collect(),
        Some(CategoryFilter::Only(names)) => names
            .iter()
            .filter_map(|name| match categories.get_key_value(name) {
                Some((key, category)) => Some((key.as_str(), category)),
                None => {
                    log::warn!("category '{}' not present in menu data", name);
                    None
                }
            })
            .collect(),
    };

    Ok(selected)
}

/// Parse one data source file's JSON into ordered categories
pub fn parse_data_source(name: &str, value: Value) -> Result<Categories> {
    match value {
        Value::Object(entries) => Ok(collect_categories(name, entries)),
        Value::Array(entries) => Ok(collect_categories(
            name,
            flatten_upstream_categories(entries),
        )),
        _ => Err(Error::InvalidData(format!(
            "Menu data '{}' must be an object or an array",
            name
        ))),
    }
}

/// Deserialize each category on its own; a malformed one is logged and left out
fn collect_categories(
    name: &str,
    entries: impl IntoIterator<Item = (String, Value)>,
) -> Categories {
    entries
        .into_iter()
        .filter_map(
            |(key, value)| match serde_json::from_value::<Category>(value) {
                Ok(category) => Some((key, category)),
                Err(e) => {
                    log::warn!("{}: skipping category '{}': {}", name, key, e);
                    None
                }
            },
        )
        .collect()
}

fn flatten_upstream_categories(entries: Vec<Value>) -> IndexMap<String, Value> {
    let mut flattened: IndexMap<String, Value> = IndexMap::new();

    for entry in entries {
        let Value::Object(category) = entry else {
            continue;
        };
        let parent_name = category
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);

        let subcategories = category
            .get("subCategories")
            .and_then(Value::as_array)
            .filter(|subs| !subs.is_empty())
            .cloned();

        let Some(subs) = subcategories else {
            // Top-level categories have no parent to disambiguate with, so a repeat overwrites
            if let Some(parent) = parent_name {
                flattened.insert(parent, Value::Object(category));
            }
            continue;
        };

        for sub in subs {
            let Value::Object(mut sub) = sub else {
                continue;
            };
            let Some(sub_name) = sub.get("name").and_then(Value::as_str).map(str::to_string)
            else {
                continue;
            };

            let key = match &parent_name {
                Some(parent) if flattened.contains_key(&sub_name) => {
                    format!("{} - {}", parent, sub_name)
                }
                _ => sub_name,
            };

            for field in UPSTREAM_NOISE_FIELDS {
                sub.remove(*field);
            }
            flattened.insert(key, Value::Object(sub));
        }
    }

    flattened
}
