//! Schema inheritance resolution.
//!
//! A schema that `extends` another gets the properties of its whole ancestor
//! chain, oldest ancestor first, followed by its own. Every resolved property
//! carries `source`, the name of the schema that declared it. Resolution works
//! on borrowed store entries and always returns a fresh value.
//!
//! Two data problems do not stop resolution: a parent name that matches no
//! schema ends the chain, and a parent that was already visited ends it too.
//! [`resolve_with_report`] returns these as [`ResolutionIssue`]s; [`resolve`]
//! only logs them.

use crate::catalog::{SchemaDefinition, SchemaProperty, SchemaStore};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionIssue {
    /// `schema` extends `parent`, which is not in the store.
    DanglingParent { schema: String, parent: String },
    /// `schema` extends `repeated`, which is already part of the chain.
    Cycle { schema: String, repeated: String },
}

impl fmt::Display for ResolutionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionIssue::DanglingParent { schema, parent } => {
                write!(f, "{schema} extends unknown schema '{parent}'")
            }
            ResolutionIssue::Cycle { schema, repeated } => {
                write!(f, "{schema} extends '{repeated}', closing an inheritance cycle")
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Resolution {
    pub schema: SchemaDefinition,
    pub issues: Vec<ResolutionIssue>,
}

/// Resolve `schema` against `store`, logging any chain problems.
///
/// Ancestors are tracked by their store keys; `schema.name` stands in for the
/// key of `schema` itself. Use [`resolve_entry`] when the schema was looked up
/// under a file stem that may differ from its declared name.
pub fn resolve(schema: &SchemaDefinition, store: &SchemaStore) -> SchemaDefinition {
    resolve_entry(&schema.name, schema, store)
}

/// Resolve `schema` and report where its ancestor chain was cut short.
pub fn resolve_with_report(schema: &SchemaDefinition, store: &SchemaStore) -> Resolution {
    resolve_entry_with_report(&schema.name, schema, store)
}

/// Resolve the schema stored under `key`, logging any chain problems.
pub fn resolve_entry(
    key: &str,
    schema: &SchemaDefinition,
    store: &SchemaStore,
) -> SchemaDefinition {
    let Resolution { schema, issues } = resolve_entry_with_report(key, schema, store);
    for issue in &issues {
        tracing::warn!(schema = %schema.name, %issue, "inheritance chain cut short");
    }
    schema
}

/// Resolve the schema stored under `key` and report chain problems.
pub fn resolve_entry_with_report(
    key: &str,
    schema: &SchemaDefinition,
    store: &SchemaStore,
) -> Resolution {
    let Some(parent) = schema.extends.as_deref() else {
        return Resolution {
            schema: schema.clone(),
            issues: Vec::new(),
        };
    };

    let chain = ancestor_chain(key, parent, store);
    let inherited: Vec<SchemaProperty> = chain
        .ancestors
        .iter()
        .rev()
        .flat_map(|ancestor| {
            ancestor
                .properties
                .iter()
                .map(|property| property.tagged(&ancestor.name))
        })
        .collect();

    let mut properties = inherited.clone();
    properties.extend(
        schema
            .properties
            .iter()
            .map(|property| property.tagged(&schema.name)),
    );

    Resolution {
        schema: SchemaDefinition {
            inherited_properties: Some(inherited),
            properties,
            ..schema.clone()
        },
        issues: chain.issue.into_iter().collect(),
    }
}

struct AncestorChain<'a> {
    /// Nearest parent first.
    ancestors: Vec<&'a SchemaDefinition>,
    issue: Option<ResolutionIssue>,
}

// `visited` holds store keys only: `extends` values are keys, declared names
// are not.
fn ancestor_chain<'a>(key: &str, parent: &str, store: &'a SchemaStore) -> AncestorChain<'a> {
    let mut visited = BTreeSet::from([key.to_string()]);
    let mut ancestors = Vec::new();
    let mut child = key.to_string();
    let mut next = Some(parent.to_string());

    while let Some(name) = next {
        if !visited.insert(name.clone()) {
            return AncestorChain {
                ancestors,
                issue: Some(ResolutionIssue::Cycle {
                    schema: child,
                    repeated: name,
                }),
            };
        }
        let Some(ancestor) = store.find(&name) else {
            return AncestorChain {
                ancestors,
                issue: Some(ResolutionIssue::DanglingParent {
                    schema: child,
                    parent: name,
                }),
            };
        };
        ancestors.push(ancestor);
        child = name;
        next = ancestor.extends.clone();
    }

    AncestorChain {
        ancestors,
        issue: None,
    }
}
