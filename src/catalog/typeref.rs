//! Property type grammar.
//!
//! Schema documents encode a property's type either as a string (`"string"`,
//! `"Person"`, `"[Person]"`, `"Person | Organization"`) or as a list of such
//! strings meaning "any of". The text is parsed once, at deserialization, into
//! [`TypeRef`] so consumers never re-split strings. [`PropertyType`] keeps the
//! encoding alongside so a served document matches the file it came from.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Built-in scalar names; anything else is taken as a schema reference.
const PRIMITIVES: &[&str] = &[
    "string", "number", "integer", "boolean", "date", "datetime", "time", "object", "any",
];

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeRef {
    Primitive(String),
    Reference(String),
    ArrayOf(Box<TypeRef>),
    Union(Vec<TypeRef>),
}

impl TypeRef {
    /// Parse the textual encoding used in schema documents.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let members = split_union(trimmed);
        if members.len() > 1 {
            return TypeRef::Union(members.into_iter().map(TypeRef::parse).collect());
        }
        if let Some(inner) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return TypeRef::ArrayOf(Box::new(TypeRef::parse(inner)));
        }
        TypeRef::named(trimmed)
    }

    /// Build a union from the list encoding. A single entry is not wrapped.
    pub fn from_list<S: AsRef<str>>(items: &[S]) -> Self {
        match items {
            [single] => TypeRef::parse(single.as_ref()),
            _ => TypeRef::Union(items.iter().map(|item| TypeRef::parse(item.as_ref())).collect()),
        }
    }

    fn named(name: &str) -> Self {
        if name.is_empty() || is_primitive(name) {
            TypeRef::Primitive(name.to_string())
        } else {
            TypeRef::Reference(name.to_string())
        }
    }

    /// Every schema name this type points at, in encounter order.
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, acc: &mut Vec<&'a str>) {
        match self {
            TypeRef::Primitive(_) => {}
            TypeRef::Reference(name) => acc.push(name),
            TypeRef::ArrayOf(inner) => inner.collect_references(acc),
            TypeRef::Union(members) => {
                for member in members {
                    member.collect_references(acc);
                }
            }
        }
    }
}

fn is_primitive(name: &str) -> bool {
    PRIMITIVES
        .iter()
        .any(|primitive| primitive.eq_ignore_ascii_case(name))
}

/// Split on `|` outside of array brackets.
fn split_union(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in raw.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(raw[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(raw[start..].trim());
    parts
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(name) | TypeRef::Reference(name) => f.write_str(name),
            TypeRef::ArrayOf(inner) => write!(f, "[{inner}]"),
            TypeRef::Union(members) => {
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for TypeRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TypeRef::Union(members) => {
                let rendered: Vec<String> = members.iter().map(ToString::to_string).collect();
                rendered.serialize(serializer)
            }
            other => serializer.collect_str(other),
        }
    }
}

/// The `type` value exactly as a document wrote it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum RawType {
    One(String),
    Many(Vec<String>),
}

/// A property's `type`: the parsed [`TypeRef`] plus the encoding it was read
/// from. Serializes back to that encoding, so documents round-trip unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyType {
    parsed: TypeRef,
    raw: RawType,
}

impl PropertyType {
    pub fn parsed(&self) -> &TypeRef {
        &self.parsed
    }

    /// Every schema name this type points at, in encounter order.
    pub fn references(&self) -> Vec<&str> {
        self.parsed.references()
    }
}

impl From<TypeRef> for PropertyType {
    fn from(parsed: TypeRef) -> Self {
        let raw = match &parsed {
            TypeRef::Union(members) => {
                RawType::Many(members.iter().map(ToString::to_string).collect())
            }
            other => RawType::One(other.to_string()),
        };
        Self { parsed, raw }
    }
}

impl PartialEq<TypeRef> for PropertyType {
    fn eq(&self, other: &TypeRef) -> bool {
        self.parsed == *other
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.parsed, f)
    }
}

impl Serialize for PropertyType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawType::deserialize(deserializer)?;
        let parsed = match &raw {
            RawType::One(value) => TypeRef::parse(value),
            RawType::Many(values) if values.is_empty() => {
                return Err(serde::de::Error::custom(
                    "property type list must not be empty",
                ));
            }
            RawType::Many(values) => TypeRef::from_list(values),
        };
        Ok(Self { parsed, raw })
    }
}
