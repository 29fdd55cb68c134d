#![allow(dead_code)]

use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A catalog laid out under `<tmp>/data`, removed when dropped.
pub struct Catalog {
    root: TempDir,
}

impl Catalog {
    pub fn new() -> Self {
        let root = TempDir::new().expect("allocate catalog dir");
        fs::create_dir_all(root.path().join("data")).expect("create data dir");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    pub fn domains(&self, domains: Value) -> &Self {
        self.write(&self.data_dir().join("domains.json"), &domains.to_string())
    }

    pub fn solutions(&self, solutions: Value) -> &Self {
        self.write(&self.data_dir().join("solutions.json"), &solutions.to_string())
    }

    pub fn schema(&self, category: &str, name: &str, doc: Value) -> &Self {
        self.raw_schema(category, name, &doc.to_string())
    }

    pub fn raw_schema(&self, category: &str, name: &str, body: &str) -> &Self {
        self.write(&self.schema_path(category, name), body)
    }

    pub fn schema_path(&self, category: &str, name: &str) -> PathBuf {
        self.data_dir()
            .join(category)
            .join("schemas")
            .join(format!("{name}.json"))
    }

    fn write(&self, path: &Path, body: &str) -> &Self {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(path, body).expect("write fixture");
        self
    }
}

/// Property list where each entry is `(name, type)`.
pub fn schema_doc(name: &str, extends: Option<&str>, props: &[(&str, &str)]) -> Value {
    let properties: Vec<Value> = props
        .iter()
        .map(|(prop, ty)| json!({"name": prop, "type": ty, "description": format!("The {prop}")}))
        .collect();
    let mut doc = json!({
        "@type": "Schema",
        "@context": "https://rocketschema.org/context",
        "name": name,
        "description": format!("{name} entity"),
        "properties": properties
    });
    if let Some(parent) = extends {
        doc["extends"] = json!(parent);
    }
    doc
}

/// Three domains, an inheritance chain and one solution.
///
/// `support-types` holds `Person`, `crm` holds `Customer extends Person`,
/// `financial` holds `Invoice` which points at `Customer`.
pub fn sample_catalog() -> Catalog {
    let catalog = Catalog::new();
    catalog
        .domains(json!([
            {"name": "support-types", "label": "Support types", "description": "Shared types", "tags": ["core"]},
            {"name": "crm", "label": "CRM", "description": "Customers", "tags": ["sales"], "icon": "users", "order": 1},
            {"name": "financial", "label": "Financial", "description": "Money", "tags": [], "order": 2}
        ]))
        .solutions(json!([
            {
                "name": "sales-desk",
                "label": "Sales desk",
                "description": "CRM with its shared types",
                "icon": "briefcase",
                "color": "blue",
                "domains": ["support-types", "crm"],
                "features": ["pipelines"],
                "useCases": ["B2B sales"]
            }
        ]))
        .schema(
            "support-types",
            "Person",
            schema_doc("Person", None, &[("name", "string"), ("email", "string")]),
        )
        .schema(
            "crm",
            "Customer",
            schema_doc("Customer", Some("Person"), &[("company", "string")]),
        )
        .schema(
            "financial",
            "Invoice",
            schema_doc(
                "Invoice",
                None,
                &[("number", "string"), ("billedTo", "Customer"), ("lines", "[string]")],
            ),
        );
    catalog
}

pub fn names(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|value| value.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}
