//! Read-only registry for a catalog of business-entity schemas.
//!
//! The catalog lives on disk as JSON: a domain manifest, a solution manifest
//! and one document per schema under `data/<domain>/schemas/`. The crate loads
//! those files, resolves schema inheritance and answers lookups through
//! [`Registry`]. Nothing here writes to the catalog.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub mod catalog;
pub mod config;
pub mod error;
pub mod lint;
pub mod registry;
pub mod resolver;
pub mod schema_loader;
pub mod source;

pub use catalog::{
    CategoryIndex, CategoryMetadata, PropertyMode, PropertyType, SchemaDefinition, SchemaProperty,
    SchemaStore, SolutionMetadata, TypeRef,
};
pub use config::{CacheMode, DuplicatePolicy, RegistryConfig};
pub use error::{RegistryError, Result};
pub use lint::{LintReport, lint_catalog};
pub use registry::{CategoryListing, EntityRecord, EntitySummary, Overview, Registry, SolutionView};
pub use resolver::{
    Resolution, ResolutionIssue, resolve, resolve_entry, resolve_entry_with_report,
    resolve_with_report,
};
pub use schema_loader::EntitySchema;
pub use source::{CachedSource, CatalogSource, FreshSource};

const DATA_DIR: &str = "data";

/// Returns true when `candidate` holds a catalog data directory.
fn has_data_dir(candidate: &Path) -> bool {
    candidate
        .join(DATA_DIR)
        .join(catalog::DOMAINS_MANIFEST)
        .is_file()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if has_data_dir(&dir) {
            return Some(dir.join(DATA_DIR));
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the catalog's `data/` directory.
///
/// Climbs from the current directory, then from the executable, looking for
/// `data/domains.json`. Set `ROCKETSCHEMA_DATA_DIR` (see
/// [`RegistryConfig::from_env`]) to skip the search.
pub fn find_data_dir() -> Result<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(dir) = search_upwards(&cwd) {
            return Ok(dir);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(dir) = search_upwards(exe_dir) {
                return Ok(dir);
            }
        }
    }

    Err(RegistryError::Config(format!(
        "unable to locate a catalog data directory; set {} to the directory holding domains.json",
        config::DATA_DIR_ENV
    )))
}
