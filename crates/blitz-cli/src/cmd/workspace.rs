use super::{load_config, reporter};
use crate::output::{print_json, print_pairs};
use anyhow::Context;
use blitz_core::alembic::{AlembicManager, ProvisionOptions};
use blitz_core::command::SystemRunner;
use blitz_core::paths::WorkspacePaths;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum WorkspaceSubcommand {
    /// Create the migration workspace and its generated files
    Init {
        /// Only write files; skip `pip install` and `alembic init`
        #[arg(long)]
        skip_tooling: bool,
    },

    /// Show the resolved workspace paths
    Show,
}

pub fn run(root: &Path, subcmd: WorkspaceSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        WorkspaceSubcommand::Init { skip_tooling } => init(root, skip_tooling, json),
        WorkspaceSubcommand::Show => show(root, json),
    }
}

fn init(root: &Path, skip_tooling: bool, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let reporter = reporter(json);
    let manager = AlembicManager::new(root, &config, &config.postgres, &SystemRunner, &reporter);

    manager
        .provision(ProvisionOptions { skip_tooling })
        .context("workspace provisioning failed")?;

    if json {
        return print_paths(manager.paths(), true);
    }
    println!(
        "\nWorkspace ready at {}",
        manager.paths().root.display()
    );
    println!("Next: blitz migrate revision <label>");
    Ok(())
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let paths = WorkspacePaths::new(root, &config.workspace.name);
    print_paths(&paths, json)
}

fn print_paths(paths: &WorkspacePaths, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "root": paths.root,
            "alembic_ini": paths.alembic_ini,
            "migrations": paths.migrations,
            "versions": paths.versions,
            "env_script": paths.env_script,
            "models": paths.models,
            "exists": paths.root.is_dir(),
        }));
    }
    print_pairs(&[
        ("root", paths.root.display().to_string()),
        ("alembic.ini", paths.alembic_ini.display().to_string()),
        ("migrations", paths.migrations.display().to_string()),
        ("versions", paths.versions.display().to_string()),
        ("env.py", paths.env_script.display().to_string()),
        ("models", paths.models.display().to_string()),
    ]);
    Ok(())
}
