//! Loader for the entity JSON Schema that schema documents are linted against.
//!
//! The crate ships a copy under `schema/entity_schema.json`; a catalog can
//! point at its own contract instead. Either way the schema is compiled once
//! per lint run and validation failures come back as plain messages.

use crate::error::{RegistryError, Result};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

const BUNDLED_ENTITY_SCHEMA: &str = include_str!("../schema/entity_schema.json");

/// A compiled entity schema plus the document it came from.
pub struct EntitySchema {
    compiled: JSONSchema,
    raw: Arc<Value>,
    origin: String,
}

impl std::fmt::Debug for EntitySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySchema")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl EntitySchema {
    /// Load the override at `path` when given, the bundled copy otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    pub fn bundled() -> Result<Self> {
        let raw: Value = serde_json::from_str(BUNDLED_ENTITY_SCHEMA).map_err(|err| {
            RegistryError::EntitySchema(format!("parsing bundled entity schema: {err}"))
        })?;
        Self::compile(raw, "bundled entity schema".to_string())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| RegistryError::io(path, err))?;
        let raw: Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| RegistryError::parse(path, err))?;
        Self::compile(raw, path.display().to_string())
    }

    fn compile(raw: Value, origin: String) -> Result<Self> {
        let compiled = JSONSchema::compile(&raw)
            .map_err(|err| RegistryError::EntitySchema(format!("compiling {origin}: {err}")))?;
        tracing::debug!(%origin, "compiled entity schema");
        Ok(Self {
            compiled,
            raw: Arc::new(raw),
            origin,
        })
    }

    /// The schema document itself, for publishing alongside the catalog.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Every violation in `instance`, or nothing when it conforms.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let location = err.instance_path.to_string();
                    if location.is_empty() {
                        err.to_string()
                    } else {
                        format!("{location}: {err}")
                    }
                })
                .collect(),
        }
    }
}
