//! Offline integrity checks for a catalog.
//!
//! The query path tolerates several data problems (dangling parents, cycles,
//! unlisted categories) so browsing keeps working. This pass is where they
//! surface. Findings are collected rather than short-circuiting so one run
//! shows every issue. Parse failures and entity-schema violations are errors;
//! everything else is a warning.

use crate::catalog::{
    CategoryIndex, SchemaDefinition, SchemaFile, SchemaStore, load_solutions, scan_schema_files,
};
use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::error::Result;
use crate::resolver::{ResolutionIssue, resolve_entry_with_report};
use crate::schema_loader::EntitySchema;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Findings for one schema file.
#[derive(Clone, Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub category: String,
    pub schema: String,
    pub findings: Vec<Finding>,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity == Severity::Warning)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct LintReport {
    pub files: Vec<FileReport>,
    /// Findings about manifests and cross-file structure.
    pub catalog: Vec<Finding>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct LintSummary {
    pub valid: usize,
    pub warnings: usize,
    pub invalid: usize,
}

impl LintReport {
    pub fn summary(&self) -> LintSummary {
        let mut summary = LintSummary::default();
        for file in &self.files {
            if file.has_errors() {
                summary.invalid += 1;
            } else if file.has_warnings() {
                summary.warnings += 1;
            } else {
                summary.valid += 1;
            }
        }
        summary
    }

    /// True when no file and no manifest has an error.
    pub fn passed(&self) -> bool {
        !self.files.iter().any(FileReport::has_errors)
            && !self
                .catalog
                .iter()
                .any(|finding| finding.severity == Severity::Error)
    }

    /// Copy of the report with warnings removed.
    pub fn errors_only(&self) -> Self {
        let keep = |findings: &[Finding]| -> Vec<Finding> {
            findings
                .iter()
                .filter(|finding| finding.severity == Severity::Error)
                .cloned()
                .collect()
        };
        Self {
            files: self
                .files
                .iter()
                .filter(|file| file.has_errors())
                .map(|file| FileReport {
                    findings: keep(&file.findings),
                    ..file.clone()
                })
                .collect(),
            catalog: keep(&self.catalog),
        }
    }
}

/// Lint every schema file and manifest under `config.data_dir`.
///
/// Only a missing or broken entity schema, or an unreadable data directory,
/// aborts the run.
pub fn lint_catalog(config: &RegistryConfig) -> Result<LintReport> {
    let entity_schema = EntitySchema::load(config.entity_schema.as_deref())?;
    let scan = scan_schema_files(&config.data_dir)?;
    let files = scan.files;

    let mut report = LintReport::default();
    report.catalog.extend(scan.skipped.iter().map(|path| {
        Finding::warning(format!(
            "skipped '{}': name is not valid UTF-8",
            path.display()
        ))
    }));
    let mut store = SchemaStore::default();
    let mut parsed: Vec<(usize, SchemaDefinition)> = Vec::new();

    for file in &files {
        let (file_report, schema) = lint_file(file, &entity_schema);
        let idx = report.files.len();
        report.files.push(file_report);
        let Some(schema) = schema else {
            continue;
        };
        // FirstMatch never errors; it records the duplicate instead.
        let before = store.duplicates().len();
        store.insert(
            &file.category,
            &file.name,
            schema.clone(),
            DuplicatePolicy::FirstMatch,
        )?;
        if let Some(duplicate) = store.duplicates().get(before) {
            report.files[idx].findings.push(Finding::warning(format!(
                "schema name '{}' is already defined in domain '{}'",
                duplicate.name, duplicate.first
            )));
        }
        parsed.push((idx, schema));
    }

    let mut cycles = BTreeSet::new();
    for (idx, schema) in &parsed {
        let findings = &mut report.files[*idx].findings;
        if let Some(parent) = schema.extends.as_deref() {
            if !store.contains(parent) {
                findings.push(Finding::warning(format!(
                    "extends unknown schema '{parent}'"
                )));
            }
        }
        for property in &schema.properties {
            for reference in property.ty.references() {
                if !store.contains(reference) {
                    findings.push(Finding::warning(format!(
                        "property '{}' references unknown schema '{reference}'",
                        property.name
                    )));
                }
            }
        }
        let key = report.files[*idx].schema.as_str();
        for issue in resolve_entry_with_report(key, schema, &store).issues {
            if let ResolutionIssue::Cycle { repeated, .. } = issue {
                cycles.insert(cycle_members(&store, &repeated));
            }
        }
    }
    report.catalog.extend(cycles.into_iter().map(|members| {
        let mut path = members.join(" -> ");
        if let Some(first) = members.first() {
            path.push_str(" -> ");
            path.push_str(first);
        }
        Finding::warning(format!("inheritance cycle: {path}"))
    }));

    lint_manifests(config, &store, &mut report.catalog);

    let summary = report.summary();
    tracing::info!(
        valid = summary.valid,
        warnings = summary.warnings,
        invalid = summary.invalid,
        catalog_findings = report.catalog.len(),
        "lint finished"
    );
    Ok(report)
}

/// The cycle `start` sits on, rotated to begin at its smallest key so every
/// member reports the same sequence.
fn cycle_members(store: &SchemaStore, start: &str) -> Vec<String> {
    let mut members = vec![start.to_string()];
    let mut next = store.find(start).and_then(|schema| schema.extends.clone());
    while let Some(name) = next {
        if let Some(pos) = members.iter().position(|member| *member == name) {
            members.drain(..pos);
            break;
        }
        next = store.find(&name).and_then(|schema| schema.extends.clone());
        members.push(name);
    }
    if let Some(smallest) = members
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(idx, _)| idx)
    {
        members.rotate_left(smallest);
    }
    members
}

fn lint_file(
    file: &SchemaFile,
    entity_schema: &EntitySchema,
) -> (FileReport, Option<SchemaDefinition>) {
    let mut report = FileReport {
        path: file.path.clone(),
        category: file.category.clone(),
        schema: file.name.clone(),
        findings: Vec::new(),
    };

    let data = match fs::read_to_string(&file.path) {
        Ok(data) => data,
        Err(err) => {
            report
                .findings
                .push(Finding::error(format!("unable to read: {err}")));
            return (report, None);
        }
    };
    let value: Value = match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(err) => {
            report
                .findings
                .push(Finding::error(format!("invalid JSON: {err}")));
            return (report, None);
        }
    };

    report.findings.extend(
        entity_schema
            .violations(&value)
            .into_iter()
            .map(Finding::error),
    );

    let schema: SchemaDefinition = match serde_json::from_value(value) {
        Ok(schema) => schema,
        Err(err) => {
            if !report.has_errors() {
                report
                    .findings
                    .push(Finding::error(format!("not a schema document: {err}")));
            }
            return (report, None);
        }
    };

    if schema.properties.is_empty() {
        report
            .findings
            .push(Finding::warning("properties array is empty (stub schema)"));
    }
    if schema.name != file.name {
        report.findings.push(Finding::warning(format!(
            "declared name '{}' differs from file name '{}'",
            schema.name,
            file.file_name()
        )));
    }
    (report, Some(schema))
}

fn lint_manifests(config: &RegistryConfig, store: &SchemaStore, findings: &mut Vec<Finding>) {
    let categories = match CategoryIndex::load(&config.data_dir) {
        Ok(categories) => categories,
        Err(err) => {
            findings.push(Finding::error(err.to_string()));
            return;
        }
    };
    let known = categories.by_name();

    for category in store.category_names() {
        if !known.contains_key(category.as_str()) {
            findings.push(Finding::warning(format!(
                "domain directory '{category}' is not listed in domains.json"
            )));
        }
    }

    match load_solutions(&config.data_dir) {
        Ok(solutions) => {
            for solution in &solutions {
                for domain in &solution.domains {
                    if !known.contains_key(domain.as_str()) {
                        findings.push(Finding::warning(format!(
                            "solution '{}' references unknown domain '{domain}'",
                            solution.name
                        )));
                    }
                }
            }
        }
        Err(err) => findings.push(Finding::error(err.to_string())),
    }
}
