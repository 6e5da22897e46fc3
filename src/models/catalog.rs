use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::services::normalizer::CategoryNormalizer;

/// Group name used when an entry carries no group
pub const DEFAULT_GROUP: &str = "Ostalo";

/// Single catalog entry (channel, movie or episode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            group: None,
            logo: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Group name with the default applied to missing or blank groups
    pub fn group_or_default(&self) -> &str {
        match self.group.as_deref() {
            Some(g) if !g.trim().is_empty() => g,
            _ => DEFAULT_GROUP,
        }
    }
}

/// Group name -> ordered entries
pub type GroupMap = BTreeMap<String, Vec<CatalogEntry>>;

/// Catalog organized as raw category -> group -> entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: BTreeMap<String, GroupMap>,
}

impl Catalog {
    /// Build a catalog from any JSON payload the upstream may send.
    ///
    /// Accepts `{ "categories": { cat: { group: [entry] } } }` or a flat
    /// `[entry]` array. Anything unrecognized yields an empty catalog; malformed
    /// categories, groups and entries are skipped one by one.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(obj) => match obj.get("categories") {
                Some(Value::Object(categories)) => Self::from_categories(categories),
                Some(_) => {
                    tracing::warn!("Catalog field `categories` is not an object, treating as empty");
                    Self::default()
                }
                None => {
                    tracing::debug!("Catalog payload has no `categories` field");
                    Self::default()
                }
            },
            Value::Array(items) => Self::from_entries(items.iter().filter_map(parse_entry)),
            _ => {
                tracing::warn!("Unrecognized catalog payload, treating as empty");
                Self::default()
            }
        }
    }

    fn from_categories(categories: &Map<String, Value>) -> Self {
        let mut catalog = Self::default();

        for (category, groups) in categories {
            let Value::Object(groups) = groups else {
                tracing::debug!("Skipping malformed category {:?}", category);
                continue;
            };

            let group_map = catalog.categories.entry(category.clone()).or_default();
            for (group, items) in groups {
                let Value::Array(items) = items else {
                    tracing::debug!("Skipping malformed group {:?} in {:?}", group, category);
                    continue;
                };
                let entries: Vec<CatalogEntry> = items.iter().filter_map(parse_entry).collect();
                group_map.insert(group.clone(), entries);
            }
        }

        catalog
    }

    /// Build a catalog from a flat entry list (older catalog shape).
    /// Entries are grouped by their group name, and every group is filed under
    /// the logical category its name normalizes to.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            let group = entry.group_or_default().to_string();
            let category = CategoryNormalizer::classify(&group).to_string();
            catalog.push(category, group, entry);
        }
        catalog
    }

    /// Append an entry to a category/group, creating both when missing
    pub fn push(&mut self, category: String, group: String, entry: CatalogEntry) {
        self.categories
            .entry(category)
            .or_default()
            .entry(group)
            .or_default()
            .push(entry);
    }

    pub fn category(&self, key: &str) -> Option<&GroupMap> {
        self.categories.get(key)
    }

    pub fn category_keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn entry_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(|groups| groups.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}

fn parse_entry(value: &Value) -> Option<CatalogEntry> {
    match CatalogEntry::deserialize(value) {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::debug!("Skipping malformed catalog entry: {}", e);
            None
        }
    }
}
