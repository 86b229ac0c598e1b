use super::{load_config, reporter, require_docker};
use crate::output::print_json;
use anyhow::Context;
use blitz_core::command::SystemRunner;
use blitz_core::docker::{DockerManager, PgAdminManager};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum PgAdminSubcommand {
    /// Recreate the pgAdmin container
    Up {
        /// Login email (overrides pgadmin.email)
        #[arg(long)]
        email: Option<String>,
        /// Login password (overrides pgadmin.password)
        #[arg(long, env = "BLITZ_PGADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Stop and remove the pgAdmin container
    Down,
}

pub fn run(root: &Path, subcmd: PgAdminSubcommand, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    require_docker()?;
    let reporter = reporter(json);
    let runner = SystemRunner;
    let admin = PgAdminManager::new(DockerManager::new(&runner), &config.pgadmin, &reporter);

    match subcmd {
        PgAdminSubcommand::Up { email, password } => {
            let email = email.unwrap_or_else(|| config.pgadmin.email.clone());
            let password = password.unwrap_or_else(|| config.pgadmin.password.clone());
            admin
                .up(&email, &password)
                .context("failed to start pgAdmin")?;
            if json {
                print_json(&serde_json::json!({
                    "container": admin.container_name(),
                    "url": format!("http://localhost:{}", config.pgadmin.port),
                    "email": email,
                }))?;
            }
        }
        PgAdminSubcommand::Down => {
            admin
                .remove_container()
                .context("failed to remove pgAdmin container")?;
            if json {
                print_json(&serde_json::json!({ "removed": admin.container_name() }))?;
            } else {
                println!("Removed '{}'", admin.container_name());
            }
        }
    }
    Ok(())
}
