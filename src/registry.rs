//! Query facade over the schema catalog.
//!
//! Every query pulls its components from the configured [`CatalogSource`];
//! with the default [`FreshSource`] that means a full re-read of the data
//! directory per call. Single-schema lookups are resolved, listings return
//! documents exactly as stored.

use crate::catalog::{
    CategoryIndex, CategoryMetadata, SchemaDefinition, SchemaStore, SolutionMetadata,
};
use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::error::{RegistryError, Result};
use crate::resolver::{Resolution, resolve_entry, resolve_entry_with_report};
use crate::source::{CatalogSource, FreshSource, source_for};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Summary of one schema inside a category listing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EntitySummary {
    pub name: String,
    pub description: String,
    pub file: String,
    pub path: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryListing {
    pub domain: CategoryMetadata,
    pub entities: Vec<EntitySummary>,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct EntityRecord {
    pub domain: CategoryMetadata,
    pub entity: SchemaDefinition,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionView {
    pub solution: SolutionMetadata,
    pub categories: Vec<CategoryMetadata>,
    pub schemas_by_category: BTreeMap<String, Vec<SchemaDefinition>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Overview {
    pub count: usize,
    pub domains: Vec<CategoryMetadata>,
}

#[derive(Debug)]
pub struct Registry<S = FreshSource> {
    source: S,
}

impl Registry<FreshSource> {
    /// Registry that re-reads `data_dir` on every query.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(FreshSource::new(data_dir, DuplicatePolicy::default()))
    }
}

impl Registry<Box<dyn CatalogSource + Send + Sync>> {
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(source_for(config))
    }
}

impl<S: CatalogSource> Registry<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drop cached components, if the source keeps any.
    pub fn invalidate(&self) {
        self.source.invalidate();
    }

    /// Resolved schema by name.
    pub fn schema(&self, name: &str) -> Result<SchemaDefinition> {
        let store = self.source.schemas()?;
        let schema = find_schema(&store, name)?;
        Ok(resolve_entry(name, schema, &store))
    }

    /// Resolved schema by name, with any problems found in its ancestor chain.
    pub fn schema_with_report(&self, name: &str) -> Result<Resolution> {
        let store = self.source.schemas()?;
        let schema = find_schema(&store, name)?;
        Ok(resolve_entry_with_report(name, schema, &store))
    }

    pub fn schema_names(&self) -> Result<Vec<String>> {
        Ok(self.source.schemas()?.names())
    }

    /// Every schema as stored (unresolved).
    pub fn schemas(&self) -> Result<Vec<SchemaDefinition>> {
        Ok(self.source.schemas()?.all())
    }

    /// Unresolved schemas of one category; empty when it has none.
    pub fn schemas_by_category(&self, category: &str) -> Result<Vec<SchemaDefinition>> {
        Ok(self.source.schemas()?.schemas_in(category))
    }

    /// Categories in display order.
    pub fn categories(&self) -> Result<Vec<CategoryMetadata>> {
        Ok(self.source.categories()?.sorted())
    }

    pub fn category(&self, name: &str) -> Result<CategoryMetadata> {
        let categories = self.source.categories()?;
        find_category(&categories, name).cloned()
    }

    pub fn solutions(&self) -> Result<Vec<SolutionMetadata>> {
        Ok((*self.source.solutions()?).clone())
    }

    pub fn solution(&self, name: &str) -> Result<SolutionMetadata> {
        let solutions = self.source.solutions()?;
        solutions
            .iter()
            .find(|solution| solution.name == name)
            .cloned()
            .ok_or_else(|| RegistryError::SolutionNotFound {
                name: name.to_string(),
                available: solutions.iter().map(|s| s.name.clone()).collect(),
            })
    }

    /// Categories in display order, limited to those the solution bundles.
    pub fn solution_categories(&self, name: &str) -> Result<Vec<CategoryMetadata>> {
        let solution = self.solution(name)?;
        Ok(self
            .categories()?
            .into_iter()
            .filter(|category| solution.includes(&category.name))
            .collect())
    }

    /// A solution with its categories and their unresolved schemas.
    pub fn solution_schemas(&self, name: &str) -> Result<SolutionView> {
        let solution = self.solution(name)?;
        let store = self.source.schemas()?;
        let categories: Vec<CategoryMetadata> = self
            .categories()?
            .into_iter()
            .filter(|category| solution.includes(&category.name))
            .collect();
        let schemas_by_category = categories
            .iter()
            .map(|category| (category.name.clone(), store.schemas_in(&category.name)))
            .collect();
        Ok(SolutionView {
            solution,
            categories,
            schemas_by_category,
        })
    }

    /// Entity summaries for a category listed in the manifest.
    pub fn category_entities(&self, category: &str) -> Result<CategoryListing> {
        let domain = self.category(category)?;
        let store = self.source.schemas()?;
        let entities: Vec<EntitySummary> = store
            .category(category)
            .map(|schemas| {
                schemas
                    .iter()
                    .map(|(key, schema)| EntitySummary {
                        name: schema.name.clone(),
                        description: schema.description.clone(),
                        file: format!("{key}.json"),
                        path: format!("/api/{category}/{key}"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(CategoryListing {
            domain,
            count: entities.len(),
            entities,
        })
    }

    /// One unresolved schema document, addressed by category and file stem.
    pub fn entity(&self, category: &str, entity: &str) -> Result<EntityRecord> {
        let domain = self.category(category)?;
        let store = self.source.schemas()?;
        let schemas = store.category(category);
        match schemas.and_then(|schemas| schemas.get(entity)) {
            Some(schema) => Ok(EntityRecord {
                domain,
                entity: schema.clone(),
            }),
            None => Err(RegistryError::EntityNotFound {
                category: category.to_string(),
                entity: entity.to_string(),
                available: schemas
                    .map(|schemas| schemas.keys().cloned().collect())
                    .unwrap_or_default(),
            }),
        }
    }

    /// Manifest categories in file order, with their count.
    pub fn overview(&self) -> Result<Overview> {
        let categories = self.source.categories()?;
        Ok(Overview {
            count: categories.len(),
            domains: categories.entries().to_vec(),
        })
    }
}

fn find_schema<'a>(store: &'a SchemaStore, name: &str) -> Result<&'a SchemaDefinition> {
    store
        .find(name)
        .ok_or_else(|| RegistryError::SchemaNotFound {
            name: name.to_string(),
            available: store.names(),
        })
}

fn find_category<'a>(categories: &'a CategoryIndex, name: &str) -> Result<&'a CategoryMetadata> {
    categories
        .get(name)
        .ok_or_else(|| RegistryError::CategoryNotFound {
            name: name.to_string(),
            available: categories.names(),
        })
}
