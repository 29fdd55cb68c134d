//! Command-line front end for the schema registry.
//!
//! Each subcommand runs one registry query and prints the result as JSON on
//! stdout. Lookups that miss print a `{"success": false, ...}` document with
//! the names that do exist and exit with status 2; load failures go to stderr
//! with status 1. Logging goes to stderr and is controlled by `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rocketschema::{
    DuplicatePolicy, EntitySchema, Registry, RegistryConfig, RegistryError, lint_catalog,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;

/// Browse a RocketSchema catalog from the command line.
#[derive(Parser, Debug)]
#[command(name = "rocketschema", version, about)]
struct Cli {
    /// Catalog data directory (defaults to ROCKETSCHEMA_DATA_DIR, then discovery).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// How to treat schema names defined in more than one domain.
    #[arg(long, global = true)]
    duplicates: Option<DuplicatePolicy>,

    /// Entity JSON Schema used by `lint` and `entity-schema`.
    #[arg(long, global = true)]
    entity_schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Domain count and the domain manifest in file order.
    Overview,
    /// One schema with inherited properties merged in.
    Schema {
        name: String,
        /// Include problems found while walking the inheritance chain.
        #[arg(long)]
        report: bool,
    },
    /// Every schema name.
    Names,
    /// Schemas as stored, optionally limited to one domain.
    Schemas {
        #[arg(long)]
        category: Option<String>,
    },
    /// Domains in display order.
    Categories,
    /// One domain with a summary of its entities.
    Category { name: String },
    /// One schema document addressed by domain and file name.
    Entity { category: String, entity: String },
    /// Every solution bundle.
    Solutions,
    /// One solution with its domains and their schemas.
    Solution { name: String },
    /// The entity JSON Schema documents are checked against.
    EntitySchema,
    /// Check every schema file and manifest for integrity problems.
    Lint {
        /// Also list files that only have warnings.
        #[arg(long)]
        show_warnings: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            if let Some(registry_err) = err.downcast_ref::<RegistryError>() {
                if registry_err.is_not_found() {
                    return print_not_found(registry_err);
                }
            }
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = build_config(&cli)?;
    let registry = Registry::from_config(&config);

    match cli.command {
        Command::Overview => {
            let overview = registry.overview()?;
            print_json(&json!({
                "success": true,
                "count": overview.count,
                "domains": overview.domains,
            }))?;
        }
        Command::Schema { name, report } => {
            if report {
                let resolution = registry.schema_with_report(&name)?;
                print_json(&json!({
                    "schema": resolution.schema,
                    "issues": resolution.issues,
                }))?;
            } else {
                print_json(&registry.schema(&name)?)?;
            }
        }
        Command::Names => print_json(&registry.schema_names()?)?,
        Command::Schemas { category } => match category {
            Some(category) => print_json(&registry.schemas_by_category(&category)?)?,
            None => print_json(&registry.schemas()?)?,
        },
        Command::Categories => print_json(&registry.categories()?)?,
        Command::Category { name } => {
            let listing = registry.category_entities(&name)?;
            print_json(&json!({
                "success": true,
                "domain": listing.domain,
                "entities": listing.entities,
                "count": listing.count,
            }))?;
        }
        Command::Entity { category, entity } => {
            let record = registry.entity(&category, &entity)?;
            print_json(&json!({
                "success": true,
                "domain": record.domain,
                "entity": record.entity,
            }))?;
        }
        Command::Solutions => print_json(&registry.solutions()?)?,
        Command::Solution { name } => print_json(&registry.solution_schemas(&name)?)?,
        Command::EntitySchema => {
            let schema = EntitySchema::load(config.entity_schema.as_deref())?;
            print_json(schema.raw())?;
        }
        Command::Lint { show_warnings } => {
            let report = lint_catalog(&config)?;
            let summary = report.summary();
            let shown = if show_warnings {
                report.clone()
            } else {
                report.errors_only()
            };
            print_json(&json!({
                "success": report.passed(),
                "summary": summary,
                "files": shown.files,
                "catalog": shown.catalog,
            }))?;
            if !report.passed() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn build_config(cli: &Cli) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::from_env_with_data_dir(cli.data_dir.clone())
        .context("resolving catalog configuration")?;
    if let Some(duplicates) = cli.duplicates {
        config.duplicates = duplicates;
    }
    if let Some(path) = &cli.entity_schema {
        config.entity_schema = Some(path.clone());
    }
    tracing::debug!(data_dir = %config.data_dir.display(), duplicates = %config.duplicates, "configured registry");
    Ok(config)
}

fn print_not_found(err: &RegistryError) -> ExitCode {
    let key = match err {
        RegistryError::CategoryNotFound { .. } => "availableDomains",
        RegistryError::EntityNotFound { .. } => "availableEntities",
        RegistryError::SolutionNotFound { .. } => "availableSolutions",
        _ => "availableSchemas",
    };
    let mut body = json!({
        "success": false,
        "error": err.to_string(),
    });
    body[key] = Value::from(err.available().unwrap_or_default().to_vec());
    match print_json(&body) {
        Ok(()) => ExitCode::from(2),
        Err(print_err) => {
            eprintln!("{print_err:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{rendered}");
    Ok(())
}
