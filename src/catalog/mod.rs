//! On-disk catalog wiring.
//!
//! This module wraps the JSON files under `data/`: the domain manifest, the
//! solution manifest and the per-category schema documents. Types here mirror
//! the file formats; [`CategoryIndex`] and [`SchemaStore`] provide lookups.

pub mod categories;
pub mod model;
pub mod solutions;
pub mod store;
pub mod typeref;

pub use categories::{CategoryIndex, DOMAINS_MANIFEST};
pub use model::{
    CategoryMetadata, PropertyMode, SCHEMA_CONTEXT, SCHEMA_TYPE, SchemaDefinition,
    SchemaProperty, SolutionMetadata, load_schema_from_path,
};
pub use solutions::{SOLUTIONS_MANIFEST, load_solutions};
pub use store::{
    DuplicateName, SCHEMA_EXTENSIONS, SCHEMAS_DIR, SchemaFile, SchemaScan, SchemaStore,
    discover_schema_files, scan_schema_files,
};
pub use typeref::{PropertyType, TypeRef};
