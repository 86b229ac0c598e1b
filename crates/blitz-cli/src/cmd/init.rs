use crate::output::print_json;
use anyhow::Context;
use blitz_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    io::ensure_dir(root).with_context(|| format!("failed to create {}", root.display()))?;

    let config_path = paths::config_path(root);
    let created = if config_path.exists() {
        false
    } else {
        Config::new(&project_name)
            .save(root)
            .context("failed to write blitz.yaml")?;
        true
    };

    if json {
        return print_json(&serde_json::json!({
            "path": config_path,
            "created": created,
        }));
    }

    println!("Initializing blitz in: {}", root.display());
    if created {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }
    println!("\nNext: blitz workspace init");
    Ok(())
}
