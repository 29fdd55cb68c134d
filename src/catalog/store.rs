//! Schema store: every schema document under `data/<category>/schemas/`.
//!
//! Categories are discovered from the directory tree rather than from the
//! manifest, so a category folder can exist before it is listed. Each schema
//! is keyed by its file stem. A single malformed document fails the whole
//! load; the store never hands out a partial catalog.

use crate::catalog::model::{SchemaDefinition, load_schema_from_path};
use crate::config::DuplicatePolicy;
use crate::error::{RegistryError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const SCHEMAS_DIR: &str = "schemas";
pub const SCHEMA_EXTENSIONS: &[&str] = &["json"];

/// A schema document located on disk but not yet parsed.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct SchemaFile {
    pub category: String,
    pub name: String,
    pub path: PathBuf,
}

impl SchemaFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// A schema name claimed by more than one category.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DuplicateName {
    pub name: String,
    pub first: String,
    pub second: String,
}

#[derive(Clone, Debug, Default)]
pub struct SchemaStore {
    categories: BTreeMap<String, BTreeMap<String, SchemaDefinition>>,
    duplicates: Vec<DuplicateName>,
}

impl SchemaStore {
    /// Walk `data_dir` and parse every schema document.
    pub fn load(data_dir: &Path, policy: DuplicatePolicy) -> Result<Self> {
        let mut store = Self::default();
        for file in discover_schema_files(data_dir)? {
            let schema = load_schema_from_path(&file.path)?;
            store.insert(&file.category, &file.name, schema, policy)?;
        }
        tracing::debug!(
            data_dir = %data_dir.display(),
            categories = store.categories.len(),
            schemas = store.len(),
            "loaded schema store"
        );
        Ok(store)
    }

    /// Add one schema under `category`, applying the duplicate policy.
    pub fn insert(
        &mut self,
        category: &str,
        name: &str,
        schema: SchemaDefinition,
        policy: DuplicatePolicy,
    ) -> Result<()> {
        if let Some(first) = self.category_of(name).filter(|first| *first != category) {
            let duplicate = DuplicateName {
                name: name.to_string(),
                first: first.to_string(),
                second: category.to_string(),
            };
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(RegistryError::DuplicateSchema {
                        name: duplicate.name,
                        first: duplicate.first,
                        second: duplicate.second,
                    });
                }
                DuplicatePolicy::FirstMatch => {
                    tracing::warn!(
                        schema = name,
                        first = %duplicate.first,
                        second = category,
                        "duplicate schema name; lookups use the first category"
                    );
                    self.duplicates.push(duplicate);
                }
            }
        }
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(name.to_string(), schema);
        Ok(())
    }

    fn category_of(&self, name: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, schemas)| schemas.contains_key(name))
            .map(|(category, _)| category.as_str())
    }

    /// First schema with this name, searching categories in name order.
    pub fn find(&self, name: &str) -> Option<&SchemaDefinition> {
        self.categories
            .values()
            .find_map(|schemas| schemas.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Schemas of one category, or `None` when the category has none on disk.
    pub fn category(&self, category: &str) -> Option<&BTreeMap<String, SchemaDefinition>> {
        self.categories.get(category)
    }

    /// Unresolved schemas of `category`; empty when the category is unknown.
    pub fn schemas_in(&self, category: &str) -> Vec<SchemaDefinition> {
        self.category(category)
            .map(|schemas| schemas.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Category names that contributed at least one schema.
    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Every schema name, each listed once, in lookup order.
    pub fn names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.categories
            .values()
            .flat_map(|schemas| schemas.keys())
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect()
    }

    /// Every unresolved schema, category by category.
    pub fn all(&self) -> Vec<SchemaDefinition> {
        self.iter().map(|(_, _, schema)| schema.clone()).collect()
    }

    /// `(category, name, schema)` for every entry, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &SchemaDefinition)> {
        self.categories.iter().flat_map(|(category, schemas)| {
            schemas
                .iter()
                .map(move |(name, schema)| (category.as_str(), name.as_str(), schema))
        })
    }

    pub fn duplicates(&self) -> &[DuplicateName] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Schema files found under a data directory.
#[derive(Clone, Debug, Default)]
pub struct SchemaScan {
    /// Sorted by category then name.
    pub files: Vec<SchemaFile>,
    /// Category folders and schema files whose names are not UTF-8.
    pub skipped: Vec<PathBuf>,
}

/// List schema files under `data_dir`, sorted by category then name.
///
/// Paths skipped for non UTF-8 names are logged; use [`scan_schema_files`]
/// to get them back.
pub fn discover_schema_files(data_dir: &Path) -> Result<Vec<SchemaFile>> {
    let scan = scan_schema_files(data_dir)?;
    for path in &scan.skipped {
        tracing::warn!(path = %path.display(), "skipping schema path with a non UTF-8 name");
    }
    Ok(scan.files)
}

/// Walk `data_dir` for schema files.
///
/// A missing data directory, or a category without a `schemas/` folder,
/// contributes nothing.
pub fn scan_schema_files(data_dir: &Path) -> Result<SchemaScan> {
    let mut scan = SchemaScan::default();
    if !data_dir.is_dir() {
        return Ok(scan);
    }
    for category_dir in list_dir(data_dir)? {
        if !category_dir.is_dir() {
            continue;
        }
        let schemas_dir = category_dir.join(SCHEMAS_DIR);
        if !schemas_dir.is_dir() {
            continue;
        }
        let Some(category) = file_name(&category_dir) else {
            scan.skipped.push(category_dir);
            continue;
        };
        for path in list_dir(&schemas_dir)? {
            if !path.is_file() || !has_schema_extension(&path) {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(name) => scan.files.push(SchemaFile {
                    category: category.clone(),
                    name: name.to_string(),
                    path,
                }),
                None => scan.skipped.push(path),
            }
        }
    }
    scan.files.sort();
    Ok(scan)
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|err| RegistryError::io(dir, err))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| RegistryError::io(dir, err))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

fn has_schema_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCHEMA_EXTENSIONS.contains(&ext))
}
