//! Where the registry gets its catalog components from.
//!
//! [`FreshSource`] reads the data directory on every call so edits on disk
//! show up in the next query. [`CachedSource`] keeps what it loaded until
//! [`CatalogSource::invalidate`] is called. Both hand out `Arc`s, so callers
//! never observe a component change underneath them mid-query.

use crate::catalog::{CategoryIndex, SchemaStore, SolutionMetadata, load_solutions};
use crate::config::{CacheMode, DuplicatePolicy, RegistryConfig};
use crate::error::Result;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub trait CatalogSource {
    fn data_dir(&self) -> &Path;
    fn categories(&self) -> Result<Arc<CategoryIndex>>;
    fn schemas(&self) -> Result<Arc<SchemaStore>>;
    fn solutions(&self) -> Result<Arc<Vec<SolutionMetadata>>>;

    /// Drop anything memoized. Sources that do not cache ignore this.
    fn invalidate(&self) {}
}

impl<S: CatalogSource + ?Sized> CatalogSource for Box<S> {
    fn data_dir(&self) -> &Path {
        (**self).data_dir()
    }

    fn categories(&self) -> Result<Arc<CategoryIndex>> {
        (**self).categories()
    }

    fn schemas(&self) -> Result<Arc<SchemaStore>> {
        (**self).schemas()
    }

    fn solutions(&self) -> Result<Arc<Vec<SolutionMetadata>>> {
        (**self).solutions()
    }

    fn invalidate(&self) {
        (**self).invalidate();
    }
}

/// Pick the source matching `config.cache`.
pub fn source_for(config: &RegistryConfig) -> Box<dyn CatalogSource + Send + Sync> {
    let fresh = FreshSource::new(&config.data_dir, config.duplicates);
    match config.cache {
        CacheMode::Off => Box::new(fresh),
        CacheMode::Manual => Box::new(CachedSource::new(fresh)),
    }
}

#[derive(Clone, Debug)]
pub struct FreshSource {
    data_dir: PathBuf,
    duplicates: DuplicatePolicy,
}

impl FreshSource {
    pub fn new(data_dir: impl Into<PathBuf>, duplicates: DuplicatePolicy) -> Self {
        Self {
            data_dir: data_dir.into(),
            duplicates,
        }
    }
}

impl CatalogSource for FreshSource {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn categories(&self) -> Result<Arc<CategoryIndex>> {
        CategoryIndex::load(&self.data_dir).map(Arc::new)
    }

    fn schemas(&self) -> Result<Arc<SchemaStore>> {
        SchemaStore::load(&self.data_dir, self.duplicates).map(Arc::new)
    }

    fn solutions(&self) -> Result<Arc<Vec<SolutionMetadata>>> {
        load_solutions(&self.data_dir).map(Arc::new)
    }
}

#[derive(Debug)]
pub struct CachedSource {
    inner: FreshSource,
    categories: RwLock<Option<Arc<CategoryIndex>>>,
    schemas: RwLock<Option<Arc<SchemaStore>>>,
    solutions: RwLock<Option<Arc<Vec<SolutionMetadata>>>>,
}

impl CachedSource {
    pub fn new(inner: FreshSource) -> Self {
        Self {
            inner,
            categories: RwLock::new(None),
            schemas: RwLock::new(None),
            solutions: RwLock::new(None),
        }
    }
}

impl CatalogSource for CachedSource {
    fn data_dir(&self) -> &Path {
        self.inner.data_dir()
    }

    fn categories(&self) -> Result<Arc<CategoryIndex>> {
        memoized(&self.categories, || self.inner.categories())
    }

    fn schemas(&self) -> Result<Arc<SchemaStore>> {
        memoized(&self.schemas, || self.inner.schemas())
    }

    fn solutions(&self) -> Result<Arc<Vec<SolutionMetadata>>> {
        memoized(&self.solutions, || self.inner.solutions())
    }

    fn invalidate(&self) {
        *self.categories.write() = None;
        *self.schemas.write() = None;
        *self.solutions.write() = None;
        tracing::debug!(data_dir = %self.inner.data_dir.display(), "catalog cache invalidated");
    }
}

// Failed loads are not cached; the next call retries.
fn memoized<T>(
    slot: &RwLock<Option<Arc<T>>>,
    load: impl FnOnce() -> Result<Arc<T>>,
) -> Result<Arc<T>> {
    if let Some(value) = slot.read().as_ref() {
        return Ok(Arc::clone(value));
    }
    let mut guard = slot.write();
    if let Some(value) = guard.as_ref() {
        return Ok(Arc::clone(value));
    }
    let value = load()?;
    *guard = Some(Arc::clone(&value));
    Ok(value)
}
