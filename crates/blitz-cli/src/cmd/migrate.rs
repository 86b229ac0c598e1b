use super::{load_config, reporter};
use crate::output::{print_json, print_table};
use anyhow::Context;
use blitz_core::alembic::{AlembicManager, PatchOutcome};
use blitz_core::command::SystemRunner;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum MigrateSubcommand {
    /// Autogenerate a revision and add schema creation to its upgrade
    Revision {
        /// Revision message; also used to find the generated file
        label: String,
        /// Schema to create (repeatable; defaults to workspace.schemas)
        #[arg(long = "schema", value_name = "SCHEMA")]
        schemas: Vec<String>,
    },

    /// Add schema creation to an existing revision
    Patch {
        /// Text contained in the revision's file name
        label: String,
        /// Schema to create (repeatable)
        #[arg(long = "schema", value_name = "SCHEMA", required = true)]
        schemas: Vec<String>,
    },

    /// Apply all migrations (`alembic upgrade head`)
    Upgrade,
}

pub fn run(root: &Path, subcmd: MigrateSubcommand, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let reporter = reporter(json);
    let manager = AlembicManager::new(root, &config, &config.postgres, &SystemRunner, &reporter);

    match subcmd {
        MigrateSubcommand::Revision { label, schemas } => {
            let schemas = if schemas.is_empty() {
                config.workspace.schemas.clone()
            } else {
                schemas
            };
            let file = manager
                .generate_migration(&label, &schemas)
                .with_context(|| format!("failed to generate migration '{label}'"))?;
            if json {
                print_json(&serde_json::json!({
                    "file": file,
                    "schemas": schemas,
                }))?;
            } else {
                println!("Generated {}", file.display());
            }
        }
        MigrateSubcommand::Patch { label, schemas } => {
            let mut file = None;
            let mut rows = Vec::with_capacity(schemas.len());
            for schema in &schemas {
                let (patched, outcome) = manager
                    .modify_migration_for_schema(schema, &label)
                    .with_context(|| format!("failed to patch migration '{label}'"))?;
                file = Some(patched);
                rows.push((schema.clone(), outcome));
            }
            let file = file.context("no schema given")?;
            if json {
                let patched: Vec<_> = rows
                    .iter()
                    .map(|(schema, outcome)| {
                        serde_json::json!({
                            "schema": schema,
                            "outcome": outcome_label(*outcome),
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "file": file,
                    "schemas": patched,
                }))?;
            } else {
                println!("\n{}", file.display());
                print_table(
                    &["SCHEMA", "RESULT"],
                    rows.into_iter()
                        .map(|(schema, outcome)| vec![schema, outcome_label(outcome).to_string()])
                        .collect(),
                );
            }
        }
        MigrateSubcommand::Upgrade => {
            let out = manager.upgrade_head().context("alembic upgrade failed")?;
            if json {
                print_json(&serde_json::json!({ "output": out }))?;
            } else if !out.is_empty() {
                println!("{out}");
            }
        }
    }
    Ok(())
}

fn outcome_label(outcome: PatchOutcome) -> &'static str {
    match outcome {
        PatchOutcome::Inserted => "inserted",
        PatchOutcome::AlreadyPresent => "already present",
    }
}
