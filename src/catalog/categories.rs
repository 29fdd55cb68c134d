//! Category index built from `data/domains.json`.
//!
//! The manifest is optional: a catalog under construction without one simply
//! has no categories. Entries keep manifest order; [`CategoryIndex::sorted`]
//! produces the display order.

use crate::catalog::model::{CategoryMetadata, read_optional_json};
use crate::error::Result;
use std::collections::BTreeMap;
use std::path::Path;

pub const DOMAINS_MANIFEST: &str = "domains.json";

// Categories without an `order` sort after every category that has one.
const UNORDERED: i64 = i64::MAX;

#[derive(Clone, Debug, Default)]
pub struct CategoryIndex {
    entries: Vec<CategoryMetadata>,
}

impl CategoryIndex {
    /// Load the manifest under `data_dir`. A missing manifest is an empty index.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(DOMAINS_MANIFEST);
        let entries: Vec<CategoryMetadata> = read_optional_json(&path)?.unwrap_or_default();
        tracing::debug!(path = %path.display(), count = entries.len(), "loaded categories");
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<CategoryMetadata>) -> Self {
        Self { entries }
    }

    /// Categories keyed by name. Later manifest entries do not displace earlier ones.
    pub fn by_name(&self) -> BTreeMap<&str, &CategoryMetadata> {
        let mut map = BTreeMap::new();
        for entry in &self.entries {
            map.entry(entry.name.as_str()).or_insert(entry);
        }
        map
    }

    pub fn get(&self, name: &str) -> Option<&CategoryMetadata> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in manifest order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Entries in manifest order.
    pub fn entries(&self) -> &[CategoryMetadata] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ascending by `order`; ties keep manifest order.
    pub fn sorted(&self) -> Vec<CategoryMetadata> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|entry| entry.order.unwrap_or(UNORDERED));
        sorted
    }
}
