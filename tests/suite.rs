// Integration suite for the registry: loads fixture catalogs from disk and
// drives every query, the cache layer and the lint pass through the public API.
mod support;

use anyhow::Result;
use rocketschema::lint::Severity;
use rocketschema::{
    CacheMode, CategoryIndex, DuplicatePolicy, EntitySchema, Registry, RegistryConfig,
    RegistryError, ResolutionIssue, SchemaStore, TypeRef, lint_catalog,
};
use serde_json::json;
use std::fs;
use support::{Catalog, sample_catalog, schema_doc};

fn category_names(categories: &[rocketschema::CategoryMetadata]) -> Vec<String> {
    categories.iter().map(|c| c.name.clone()).collect()
}

// Ordered domains come first by `order`; unordered ones trail in manifest order.
#[test]
fn categories_follow_display_order() -> Result<()> {
    let catalog = Catalog::new();
    catalog.domains(json!([
        {"name": "support-types", "label": "Support types", "description": "", "tags": []},
        {"name": "crm", "label": "CRM", "description": "", "tags": [], "order": 1}
    ]));
    let registry = Registry::open(catalog.data_dir());
    assert_eq!(
        category_names(&registry.categories()?),
        vec!["crm", "support-types"]
    );

    let sample = sample_catalog();
    let registry = Registry::open(sample.data_dir());
    assert_eq!(
        category_names(&registry.categories()?),
        vec!["crm", "financial", "support-types"]
    );
    Ok(())
}

// The overview keeps manifest order and counts entries.
#[test]
fn overview_reports_manifest_order() -> Result<()> {
    let catalog = sample_catalog();
    let overview = Registry::open(catalog.data_dir()).overview()?;
    assert_eq!(overview.count, 3);
    assert_eq!(
        category_names(&overview.domains),
        vec!["support-types", "crm", "financial"]
    );
    Ok(())
}

// Customer extends Person: inherited properties come first and every
// resolved property names its declaring schema.
#[test]
fn schema_lookup_merges_parent_properties() -> Result<()> {
    let catalog = sample_catalog();
    let registry = Registry::open(catalog.data_dir());
    let customer = registry.schema("Customer")?;

    let names: Vec<&str> = customer
        .properties
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["name", "email", "company"]);
    let sources: Vec<Option<&str>> = customer
        .properties
        .iter()
        .map(|p| p.source.as_deref())
        .collect();
    assert_eq!(
        sources,
        vec![Some("Person"), Some("Person"), Some("Customer")]
    );
    let inherited = customer.inherited_properties.as_ref().expect("inherited block");
    assert_eq!(inherited.len(), 2);
    assert_eq!(customer.extends.as_deref(), Some("Person"));

    let person = registry.schema("Person")?;
    assert!(person.inherited_properties.is_none());
    assert!(person.properties.iter().all(|p| p.source.is_none()));

    let rendered = serde_json::to_value(&customer)?;
    assert_eq!(rendered["inheritedProperties"][0]["source"], "Person");
    assert_eq!(rendered["@type"], "Schema");
    Ok(())
}

// Listing queries return documents exactly as stored.
#[test]
fn listings_are_unresolved() -> Result<()> {
    let catalog = sample_catalog();
    let registry = Registry::open(catalog.data_dir());

    assert_eq!(
        registry.schema_names()?,
        vec!["Customer", "Invoice", "Person"]
    );
    let all = registry.schemas()?;
    assert_eq!(all.len(), 3);
    let customer = all
        .iter()
        .find(|schema| schema.name == "Customer")
        .expect("customer listed");
    assert_eq!(customer.properties.len(), 1);
    assert!(customer.inherited_properties.is_none());

    let crm = registry.schemas_by_category("crm")?;
    assert_eq!(crm.len(), 1);
    assert!(registry.schemas_by_category("nowhere")?.is_empty());

    let invoice = registry.schema("Invoice")?;
    assert_eq!(
        invoice.properties[1].ty,
        TypeRef::Reference("Customer".to_string())
    );
    assert_eq!(
        invoice.properties[2].ty,
        TypeRef::ArrayOf(Box::new(TypeRef::Primitive("string".to_string())))
    );
    Ok(())
}

// A miss names every schema the caller could have asked for.
#[test]
fn unknown_schema_lists_available_names() -> Result<()> {
    let catalog = sample_catalog();
    let err = Registry::open(catalog.data_dir())
        .schema("DoesNotExist")
        .unwrap_err();
    assert!(err.is_not_found());
    match err {
        RegistryError::SchemaNotFound { name, available } => {
            assert_eq!(name, "DoesNotExist");
            assert_eq!(available, vec!["Customer", "Invoice", "Person"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    Ok(())
}

// Without manifests or schema folders the catalog is simply empty.
#[test]
fn empty_catalog_yields_empty_collections() -> Result<()> {
    let catalog = Catalog::new();
    let registry = Registry::open(catalog.data_dir());
    assert!(registry.categories()?.is_empty());
    assert!(registry.solutions()?.is_empty());
    assert!(registry.schemas()?.is_empty());
    assert!(registry.schema_names()?.is_empty());
    assert_eq!(registry.overview()?.count, 0);

    let missing = Registry::open(catalog.root().join("absent"));
    assert!(missing.schemas()?.is_empty());
    assert!(missing.categories()?.is_empty());
    Ok(())
}

// One malformed schema document fails every schema query, not just its own.
#[test]
fn malformed_schema_is_fatal() -> Result<()> {
    let catalog = sample_catalog();
    catalog.raw_schema("crm", "Lead", "{ \"name\": ");
    let registry = Registry::open(catalog.data_dir());

    let err = registry.schema("Person").unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err, RegistryError::Parse { .. }));
    assert!(err.to_string().contains("Lead.json"));
    assert!(registry.schemas().is_err());

    // Manifest-only queries do not touch schema files.
    assert_eq!(registry.categories()?.len(), 3);
    Ok(())
}

// Documents missing required fields are parse failures too.
#[test]
fn schema_without_properties_is_fatal() -> Result<()> {
    let catalog = sample_catalog();
    catalog.schema(
        "crm",
        "Lead",
        json!({"@type": "Schema", "@context": "https://rocketschema.org/context", "name": "Lead"}),
    );
    let err = Registry::open(catalog.data_dir())
        .schema("Lead")
        .unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }));
    Ok(())
}

// Category listings summarize each entity with its file and API path.
#[test]
fn category_entities_summarize_schemas() -> Result<()> {
    let catalog = sample_catalog();
    let registry = Registry::open(catalog.data_dir());
    let listing = registry.category_entities("crm")?;
    assert_eq!(listing.domain.name, "crm");
    assert_eq!(listing.count, 1);
    let entity = &listing.entities[0];
    assert_eq!(entity.name, "Customer");
    assert_eq!(entity.description, "Customer entity");
    assert_eq!(entity.file, "Customer.json");
    assert_eq!(entity.path, "/api/crm/Customer");

    let err = registry.category_entities("warehouse").unwrap_err();
    match err {
        RegistryError::CategoryNotFound { available, .. } => {
            assert_eq!(available, vec!["support-types", "crm", "financial"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    Ok(())
}

// A listed domain with no schema folder has zero entities.
#[test]
fn listed_domain_without_schemas_is_empty() -> Result<()> {
    let catalog = sample_catalog();
    catalog.domains(json!([
        {"name": "crm", "label": "CRM"},
        {"name": "hr", "label": "HR"}
    ]));
    let listing = Registry::open(catalog.data_dir()).category_entities("hr")?;
    assert_eq!(listing.count, 0);
    assert!(listing.entities.is_empty());
    Ok(())
}

// Stored documents come back byte-for-byte in shape, including how each
// property type was written.
#[test]
fn entity_documents_round_trip_type_encodings() -> Result<()> {
    let catalog = sample_catalog();
    let stored = json!({
        "@type": "Schema",
        "@context": "https://rocketschema.org/context",
        "name": "Deal",
        "description": "A sales opportunity",
        "properties": [
            {"name": "party", "type": "Person | Organization", "description": "Counterparty"},
            {"name": "owner", "type": ["Person", "Organization"], "description": "Owner"},
            {"name": "notes", "type": "[string]", "description": "Notes", "nullable": true},
            {"name": "stage", "type": "string", "description": "Stage", "required": true}
        ]
    });
    catalog.schema("crm", "Deal", stored.clone());
    let registry = Registry::open(catalog.data_dir());

    let record = registry.entity("crm", "Deal")?;
    assert_eq!(serde_json::to_value(&record.entity)?, stored);
    let listed = registry
        .schemas_by_category("crm")?
        .into_iter()
        .find(|schema| schema.name == "Deal")
        .expect("deal listed");
    assert_eq!(serde_json::to_value(&listed)?, stored);
    assert_eq!(
        record.entity.properties[0].ty.references(),
        vec!["Person", "Organization"]
    );
    Ok(())
}

// Entity lookup is addressed by domain and file stem and lists the
// alternatives on a miss.
#[test]
fn entity_lookup_by_domain_and_file() -> Result<()> {
    let catalog = sample_catalog();
    let registry = Registry::open(catalog.data_dir());
    let record = registry.entity("crm", "Customer")?;
    assert_eq!(record.domain.label, "CRM");
    assert_eq!(record.entity.properties.len(), 1);

    match registry.entity("crm", "Lead").unwrap_err() {
        RegistryError::EntityNotFound {
            category,
            entity,
            available,
        } => {
            assert_eq!(category, "crm");
            assert_eq!(entity, "Lead");
            assert_eq!(available, vec!["Customer"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(matches!(
        registry.entity("warehouse", "Customer").unwrap_err(),
        RegistryError::CategoryNotFound { .. }
    ));
    Ok(())
}

// Solutions scope categories and schemas to their bundled domains.
#[test]
fn solutions_scope_domains() -> Result<()> {
    let catalog = sample_catalog();
    let registry = Registry::open(catalog.data_dir());

    let solutions = registry.solutions()?;
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0].use_cases, vec!["B2B sales"]);

    assert_eq!(
        category_names(&registry.solution_categories("sales-desk")?),
        vec!["crm", "support-types"]
    );
    let view = registry.solution_schemas("sales-desk")?;
    assert_eq!(view.solution.name, "sales-desk");
    assert_eq!(
        view.schemas_by_category.keys().collect::<Vec<_>>(),
        vec!["crm", "support-types"]
    );
    assert_eq!(view.schemas_by_category["support-types"][0].name, "Person");
    let rendered = serde_json::to_value(&view)?;
    assert!(rendered.get("schemasByCategory").is_some());

    match registry.solution("retail").unwrap_err() {
        RegistryError::SolutionNotFound { available, .. } => {
            assert_eq!(available, vec!["sales-desk"]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    Ok(())
}

// Dangling parents and cycles cut the chain short without failing the lookup.
#[test]
fn broken_chains_resolve_with_issues() -> Result<()> {
    let catalog = sample_catalog();
    catalog
        .schema(
            "crm",
            "Lead",
            schema_doc("Lead", Some("Prospect"), &[("source", "string")]),
        )
        .schema("crm", "Alpha", schema_doc("Alpha", Some("Beta"), &[("a", "string")]))
        .schema("crm", "Beta", schema_doc("Beta", Some("Alpha"), &[("b", "string")]));
    let registry = Registry::open(catalog.data_dir());

    let lead = registry.schema_with_report("Lead")?;
    assert_eq!(lead.schema.properties.len(), 1);
    assert_eq!(
        lead.issues,
        vec![ResolutionIssue::DanglingParent {
            schema: "Lead".into(),
            parent: "Prospect".into()
        }]
    );

    let alpha = registry.schema_with_report("Alpha")?;
    let names: Vec<&str> = alpha
        .schema
        .properties
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(
        alpha.issues,
        vec![ResolutionIssue::Cycle {
            schema: "Beta".into(),
            repeated: "Alpha".into()
        }]
    );

    // Plain lookups still succeed.
    assert_eq!(registry.schema("Beta")?.properties.len(), 2);
    Ok(())
}

// A file stem that differs from the declared name still closes the cycle at
// the lookup key, so no property repeats.
#[test]
fn renamed_file_cycle_does_not_repeat_properties() -> Result<()> {
    let catalog = Catalog::new();
    catalog
        .schema(
            "crm",
            "Cust",
            schema_doc("Customer", Some("Person"), &[("company", "string")]),
        )
        .schema("crm", "Person", schema_doc("Person", Some("Cust"), &[("name", "string")]));
    let registry = Registry::open(catalog.data_dir());

    let resolved = registry.schema_with_report("Cust")?;
    let tagged: Vec<(&str, Option<&str>)> = resolved
        .schema
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.source.as_deref()))
        .collect();
    assert_eq!(
        tagged,
        vec![("name", Some("Person")), ("company", Some("Customer"))]
    );
    assert_eq!(resolved.issues.len(), 1);
    assert_eq!(registry.schema("Cust")?.properties.len(), 2);
    Ok(())
}

// Duplicate names are rejected unless the first-match policy is configured.
#[test]
fn duplicate_schema_names_follow_policy() -> Result<()> {
    let catalog = sample_catalog();
    catalog.schema(
        "financial",
        "Person",
        schema_doc("Person", None, &[("taxId", "string")]),
    );

    let err = Registry::open(catalog.data_dir())
        .schema("Person")
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateSchema { .. }));

    let config =
        RegistryConfig::new(catalog.data_dir()).with_duplicates(DuplicatePolicy::FirstMatch);
    let registry = Registry::from_config(&config);
    let person = registry.schema("Person")?;
    assert_eq!(person.properties[0].name, "taxId");
    assert_eq!(registry.schema_names()?.len(), 3);

    let store = SchemaStore::load(&catalog.data_dir(), DuplicatePolicy::FirstMatch)?;
    assert_eq!(store.duplicates().len(), 1);
    Ok(())
}

// The default source sees edits immediately; the cached one after invalidate.
#[test]
fn cache_mode_controls_freshness() -> Result<()> {
    let catalog = sample_catalog();
    let fresh = Registry::open(catalog.data_dir());
    let cached =
        Registry::from_config(&RegistryConfig::new(catalog.data_dir()).with_cache(CacheMode::Manual));
    assert_eq!(fresh.schema_names()?.len(), 3);
    assert_eq!(cached.schema_names()?.len(), 3);

    catalog.schema("crm", "Lead", schema_doc("Lead", None, &[("stage", "string")]));
    assert_eq!(fresh.schema_names()?.len(), 4);
    assert_eq!(cached.schema_names()?.len(), 3);

    cached.invalidate();
    assert_eq!(cached.schema_names()?.len(), 4);
    Ok(())
}

// The manifest index keeps file order for lookups and sorts for display.
#[test]
fn category_index_reads_manifest() -> Result<()> {
    let catalog = sample_catalog();
    let index = CategoryIndex::load(&catalog.data_dir())?;
    assert_eq!(index.names(), vec!["support-types", "crm", "financial"]);
    assert_eq!(index.get("crm").and_then(|c| c.icon.as_deref()), Some("users"));
    assert!(!index.contains("hr"));
    Ok(())
}

// The sample catalog is clean.
#[test]
fn lint_passes_clean_catalog() -> Result<()> {
    let catalog = sample_catalog();
    let report = lint_catalog(&RegistryConfig::new(catalog.data_dir()))?;
    assert!(report.passed(), "unexpected findings: {report:?}");
    let summary = report.summary();
    assert_eq!(summary.valid, 3);
    assert_eq!(summary.warnings, 0);
    assert_eq!(summary.invalid, 0);
    assert!(report.catalog.is_empty());
    Ok(())
}

// Every class of problem is reported in one run with the right severity.
#[test]
fn lint_collects_every_problem() -> Result<()> {
    let catalog = sample_catalog();
    catalog
        .solutions(json!([
            {"name": "sales-desk", "label": "Sales desk", "domains": ["crm", "ghost-domain"]}
        ]))
        .raw_schema("crm", "Broken", "{ not json")
        .schema(
            "crm",
            "BadContext",
            json!({
                "@type": "Schema",
                "@context": "https://example.com/elsewhere",
                "name": "BadContext",
                "description": "Wrong context",
                "properties": [{"name": "id", "type": "string", "description": "Identifier"}]
            }),
        )
        .schema("crm", "Lead", schema_doc("Lead", Some("Prospect"), &[("stage", "string")]))
        .schema("crm", "Stub", schema_doc("Stub", None, &[]))
        .schema("crm", "Renamed", schema_doc("Other", None, &[("id", "string")]))
        .schema("crm", "Alpha", schema_doc("Alpha", Some("Beta"), &[("a", "string")]))
        .schema("crm", "Beta", schema_doc("Beta", Some("Alpha"), &[("b", "Widget")]))
        .schema("scratch", "Note", schema_doc("Note", None, &[("body", "string")]));

    let report = lint_catalog(&RegistryConfig::new(catalog.data_dir()))?;
    assert!(!report.passed());

    let file = |schema: &str| {
        report
            .files
            .iter()
            .find(|file| file.schema == schema)
            .unwrap_or_else(|| panic!("no report for {schema}"))
    };
    let messages = |schema: &str| -> Vec<String> {
        file(schema)
            .findings
            .iter()
            .map(|finding| finding.message.clone())
            .collect()
    };

    assert!(file("Broken").has_errors());
    assert!(messages("Broken")[0].starts_with("invalid JSON"));
    assert!(file("BadContext").has_errors());
    assert!(messages("Lead").iter().any(|m| m.contains("'Prospect'")));
    assert!(!file("Lead").has_errors());
    assert!(messages("Stub").iter().any(|m| m.contains("stub")));
    assert!(messages("Renamed").iter().any(|m| m.contains("'Other'")));
    assert!(messages("Beta").iter().any(|m| m.contains("'Widget'")));
    assert!(file("Alpha").findings.is_empty());

    let catalog_messages: Vec<&str> = report
        .catalog
        .iter()
        .map(|finding| finding.message.as_str())
        .collect();
    let cycles: Vec<&&str> = catalog_messages
        .iter()
        .filter(|m| m.contains("cycle"))
        .collect();
    assert_eq!(cycles, vec![&"inheritance cycle: Alpha -> Beta -> Alpha"]);
    assert!(catalog_messages.iter().any(|m| m.contains("'scratch'")));
    assert!(catalog_messages.iter().any(|m| m.contains("'ghost-domain'")));
    assert!(
        report
            .catalog
            .iter()
            .all(|finding| finding.severity == Severity::Warning)
    );

    // Person, Customer, Invoice, Alpha and Note are clean.
    let summary = report.summary();
    assert_eq!(summary.invalid, 2);
    assert_eq!(summary.warnings, 4);
    assert_eq!(summary.valid, 5);

    let errors = report.errors_only();
    assert_eq!(errors.files.len(), 2);
    assert!(errors.catalog.is_empty());
    Ok(())
}

// Duplicates become warnings in the lint pass instead of aborting it.
#[test]
fn lint_reports_duplicates_as_warnings() -> Result<()> {
    let catalog = sample_catalog();
    catalog.schema(
        "financial",
        "Person",
        schema_doc("Person", None, &[("taxId", "string")]),
    );
    let report = lint_catalog(&RegistryConfig::new(catalog.data_dir()))?;
    assert!(report.passed());
    let duplicate = report
        .files
        .iter()
        .find(|file| file.category == "support-types" && file.schema == "Person")
        .expect("second Person reported");
    assert!(
        duplicate
            .findings
            .iter()
            .any(|finding| finding.message.contains("already defined in domain 'financial'"))
    );
    Ok(())
}

// A custom entity schema replaces the bundled one; a broken one aborts lint.
#[test]
fn lint_uses_configured_entity_schema() -> Result<()> {
    let catalog = sample_catalog();
    let strict = catalog.root().join("strict.json");
    fs::write(
        &strict,
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["version"]
        })
        .to_string(),
    )?;
    let config = RegistryConfig::new(catalog.data_dir()).with_entity_schema(&strict);
    let report = lint_catalog(&config)?;
    assert_eq!(report.summary().invalid, 3);
    assert_eq!(EntitySchema::load(Some(strict.as_path()))?.origin(), strict.display().to_string());

    let broken = catalog.root().join("broken.json");
    fs::write(&broken, "{")?;
    let err = lint_catalog(&RegistryConfig::new(catalog.data_dir()).with_entity_schema(&broken))
        .unwrap_err();
    assert!(!err.is_not_found());
    Ok(())
}

// Paths the scan cannot name are surfaced as catalog warnings.
#[cfg(target_os = "linux")]
#[test]
fn lint_warns_about_non_utf8_paths() -> Result<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let catalog = sample_catalog();
    let odd = catalog
        .data_dir()
        .join("crm/schemas")
        .join(OsStr::from_bytes(b"Lead\xff.json"));
    fs::write(&odd, schema_doc("Lead", None, &[("stage", "string")]).to_string())?;

    let report = lint_catalog(&RegistryConfig::new(catalog.data_dir()))?;
    assert!(report.passed());
    assert_eq!(report.summary().valid, 3);
    assert!(
        report
            .catalog
            .iter()
            .any(|finding| finding.message.contains("not valid UTF-8"))
    );
    Ok(())
}

// A cycle is reported once however many of its members are linted, and a
// schema leading into it adds nothing new.
#[test]
fn lint_reports_each_cycle_once() -> Result<()> {
    let catalog = sample_catalog();
    catalog
        .schema("crm", "Gamma", schema_doc("Gamma", Some("Alpha"), &[("g", "string")]))
        .schema("crm", "Alpha", schema_doc("Alpha", Some("Beta"), &[("a", "string")]))
        .schema("crm", "Beta", schema_doc("Beta", Some("Gamma"), &[("b", "string")]))
        .schema("crm", "Lead", schema_doc("Lead", Some("Beta"), &[("l", "string")]))
        .schema("crm", "Loop", schema_doc("Loop", Some("Loop"), &[("x", "string")]));

    let report = lint_catalog(&RegistryConfig::new(catalog.data_dir()))?;
    let cycles: Vec<&str> = report
        .catalog
        .iter()
        .map(|finding| finding.message.as_str())
        .filter(|message| message.contains("cycle"))
        .collect();
    assert_eq!(
        cycles,
        vec![
            "inheritance cycle: Alpha -> Beta -> Gamma -> Alpha",
            "inheritance cycle: Loop -> Loop",
        ]
    );
    Ok(())
}
