//! Error taxonomy for registry loads and queries.
//!
//! Lookups that miss are ordinary outcomes and carry the names a caller could
//! have asked for instead; use [`RegistryError::is_not_found`] to tell them
//! apart from failures that need operator attention (unreadable files,
//! malformed documents, ambiguous catalogs).

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("schema '{name}' not found")]
    SchemaNotFound { name: String, available: Vec<String> },

    #[error("domain '{name}' not found")]
    CategoryNotFound { name: String, available: Vec<String> },

    #[error("entity '{entity}' not found in domain '{category}'")]
    EntityNotFound {
        category: String,
        entity: String,
        available: Vec<String>,
    },

    #[error("solution '{name}' not found")]
    SolutionNotFound { name: String, available: Vec<String> },

    /// Reading a file or listing a directory failed.
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest or schema document is not valid for its type.
    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two categories define a schema under the same name.
    #[error("schema '{name}' is defined in both '{first}' and '{second}'")]
    DuplicateSchema {
        name: String,
        first: String,
        second: String,
    },

    #[error("entity schema: {0}")]
    EntitySchema(String),

    #[error("configuration: {0}")]
    Config(String),
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// True for the recoverable "nothing by that name" outcomes.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound { .. }
                | Self::CategoryNotFound { .. }
                | Self::EntityNotFound { .. }
                | Self::SolutionNotFound { .. }
        )
    }

    /// Names a caller could have asked for instead, for not-found outcomes.
    pub fn available(&self) -> Option<&[String]> {
        match self {
            Self::SchemaNotFound { available, .. }
            | Self::CategoryNotFound { available, .. }
            | Self::EntityNotFound { available, .. }
            | Self::SolutionNotFound { available, .. } => Some(available),
            _ => None,
        }
    }
}
