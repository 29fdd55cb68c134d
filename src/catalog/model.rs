//! Deserializable representation of the catalog files under `data/`.
//!
//! The types mirror the on-disk documents (`domains.json`, `solutions.json`
//! and one file per schema) so the rest of the crate never touches ad-hoc
//! JSON. Fields the registry does not interpret are carried in `extra` and
//! written back unchanged.

use crate::catalog::typeref::PropertyType;
use crate::error::{RegistryError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Discriminator every schema document declares in `@type`.
pub const SCHEMA_TYPE: &str = "Schema";
/// Context URI every schema document declares in `@context`.
pub const SCHEMA_CONTEXT: &str = "https://rocketschema.org/context";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One domain entry from `domains.json`.
pub struct CategoryMetadata {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A curated bundle of domains from `solutions.json`.
pub struct SolutionMetadata {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SolutionMetadata {
    pub fn includes(&self, category: &str) -> bool {
        self.domains.iter().any(|domain| domain == category)
    }
}

/// How a property value comes to exist.
///
/// Unknown modes still load as `Other` so one odd document does not take the
/// catalog down; the lint pass reports them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropertyMode {
    Stored,
    Computed,
    Enum,
    Other(String),
}

impl PropertyMode {
    pub fn as_str(&self) -> &str {
        match self {
            PropertyMode::Stored => "stored",
            PropertyMode::Computed => "computed",
            PropertyMode::Enum => "enum",
            PropertyMode::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value {
            "stored" => PropertyMode::Stored,
            "computed" => PropertyMode::Computed,
            "enum" => PropertyMode::Enum,
            other => PropertyMode::Other(other.to_string()),
        }
    }
}

impl Serialize for PropertyMode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// A single field of a schema.
pub struct SchemaProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: PropertyType,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<PropertyMode>,
    /// Allowed values; only meaningful when `mode` is `enum`.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Name of the schema that declared this property. Absent on raw
    /// documents; filled in by the resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SchemaProperty {
    /// Copy of this property attributed to `schema`.
    pub fn tagged(&self, schema: &str) -> Self {
        Self {
            source: Some(schema.to_string()),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A schema document. Before resolution `properties` holds only the fields
/// the document declares; after resolution it holds the merged list and
/// `inherited_properties` the ancestor block.
pub struct SchemaDefinition {
    #[serde(rename = "@type")]
    pub schema_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_properties: Option<Vec<SchemaProperty>>,
    pub properties: Vec<SchemaProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Read and parse one schema document without further validation.
pub fn load_schema_from_path(path: &Path) -> Result<SchemaDefinition> {
    read_json(path)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|err| RegistryError::io(path, err))?;
    serde_json::from_str(&data).map_err(|err| RegistryError::parse(path, err))
}

/// Like [`read_json`], but a missing file yields `None`.
pub(crate) fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data)
            .map(Some)
            .map_err(|err| RegistryError::parse(path, err)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(RegistryError::io(path, err)),
    }
}
