//! Runtime configuration for the registry.
//!
//! Defaults reproduce the stateless contract: no caching, duplicate schema
//! names rejected, bundled entity schema. Each knob can be set from the
//! environment or through the builder methods.

use crate::error::{RegistryError, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DATA_DIR_ENV: &str = "ROCKETSCHEMA_DATA_DIR";
pub const DUPLICATES_ENV: &str = "ROCKETSCHEMA_DUPLICATES";
pub const CACHE_ENV: &str = "ROCKETSCHEMA_CACHE";
pub const ENTITY_SCHEMA_ENV: &str = "ROCKETSCHEMA_ENTITY_SCHEMA";

/// What to do when two categories define a schema with the same name.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DuplicatePolicy {
    /// Fail the load with [`RegistryError::DuplicateSchema`].
    #[default]
    Reject,
    /// Keep both; lookups return the entry from the first category by name.
    FirstMatch,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Reject => "reject",
            DuplicatePolicy::FirstMatch => "first-match",
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = RegistryError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "first-match" | "first_match" => Ok(DuplicatePolicy::FirstMatch),
            other => Err(RegistryError::Config(format!(
                "unknown duplicate policy '{other}' (expected reject|first-match)"
            ))),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether catalog reads are memoized between queries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CacheMode {
    /// Re-read the data directory on every query.
    #[default]
    Off,
    /// Keep loaded components until explicitly invalidated.
    Manual,
}

impl FromStr for CacheMode {
    type Err = RegistryError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "off" | "none" => Ok(CacheMode::Off),
            "manual" => Ok(CacheMode::Manual),
            other => Err(RegistryError::Config(format!(
                "unknown cache mode '{other}' (expected off|manual)"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RegistryConfig {
    pub data_dir: PathBuf,
    pub duplicates: DuplicatePolicy,
    pub cache: CacheMode,
    /// Overrides the bundled entity JSON Schema used by the lint pass.
    pub entity_schema: Option<PathBuf>,
}

impl RegistryConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            duplicates: DuplicatePolicy::default(),
            cache: CacheMode::default(),
            entity_schema: None,
        }
    }

    /// Build a configuration from `ROCKETSCHEMA_*` variables.
    ///
    /// Without `ROCKETSCHEMA_DATA_DIR` the data directory is discovered with
    /// [`crate::find_data_dir`].
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_data_dir(None)
    }

    /// Like [`RegistryConfig::from_env`], but an explicit `data_dir` wins over
    /// the environment and discovery.
    pub fn from_env_with_data_dir(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir.or_else(|| env_value(DATA_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => crate::find_data_dir()?,
        };
        let mut config = Self::new(data_dir);
        if let Some(value) = env_value(DUPLICATES_ENV) {
            config.duplicates = value.parse()?;
        }
        if let Some(value) = env_value(CACHE_ENV) {
            config.cache = value.parse()?;
        }
        config.entity_schema = env_value(ENTITY_SCHEMA_ENV).map(PathBuf::from);
        Ok(config)
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_entity_schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.entity_schema = Some(path.into());
        self
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
