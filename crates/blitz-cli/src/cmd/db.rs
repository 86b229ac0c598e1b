use super::{load_config, reporter, require_docker};
use crate::output::{print_json, print_pairs};
use anyhow::Context;
use blitz_core::command::SystemRunner;
use blitz_core::docker::{DockerManager, PostgresManager};
use clap::Subcommand;
use std::path::Path;
use std::time::Duration;

#[derive(Subcommand)]
pub enum DbSubcommand {
    /// Pull the image, recreate the container with a data volume, and create the database
    Up {
        /// Superuser password (overrides postgres.password)
        #[arg(long, env = "BLITZ_POSTGRES_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Stop and remove the PostgreSQL container
    Down,

    /// Show whether the container exists and accepts connections
    Status,

    /// Wait until PostgreSQL accepts connections
    Ready {
        /// Seconds to wait (default: postgres.ready_timeout_secs)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

pub fn run(root: &Path, subcmd: DbSubcommand, json: bool) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    require_docker()?;
    let reporter = reporter(json);
    let runner = SystemRunner;

    if let DbSubcommand::Up {
        password: Some(password),
    } = &subcmd
    {
        config.postgres.password = password.clone();
    }
    let pg = PostgresManager::new(DockerManager::new(&runner), &config.postgres, &reporter);

    match subcmd {
        DbSubcommand::Up { .. } => {
            pg.up(&config.postgres.password)
                .context("failed to bring up PostgreSQL")?;
            if json {
                print_json(&serde_json::json!({
                    "container": pg.container_name(),
                    "database": config.postgres.database,
                    "port": config.postgres.port,
                }))?;
            } else {
                println!(
                    "\nPostgreSQL '{}' is up on port {}",
                    pg.container_name(),
                    config.postgres.port
                );
            }
        }
        DbSubcommand::Down => {
            pg.remove_container()
                .context("failed to remove PostgreSQL container")?;
            if json {
                print_json(&serde_json::json!({ "removed": pg.container_name() }))?;
            } else {
                println!("Removed '{}'", pg.container_name());
            }
        }
        DbSubcommand::Status => {
            let exists = pg.container_exists().context("failed to query docker")?;
            let ready = exists && pg.is_ready();
            if json {
                print_json(&serde_json::json!({
                    "container": pg.container_name(),
                    "exists": exists,
                    "ready": ready,
                }))?;
            } else {
                print_pairs(&[
                    ("container", pg.container_name().to_string()),
                    ("exists", exists.to_string()),
                    ("ready", ready.to_string()),
                ]);
            }
        }
        DbSubcommand::Ready { timeout } => {
            let timeout = timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.postgres.ready_timeout());
            let elapsed = pg.wait_for_ready(timeout)?;
            if json {
                print_json(&serde_json::json!({
                    "ready": true,
                    "elapsed_secs": elapsed.as_secs_f64(),
                }))?;
            }
        }
    }
    Ok(())
}
