pub mod config;
pub mod db;
pub mod docker;
pub mod init;
pub mod migrate;
pub mod pgadmin;
pub mod workspace;

use anyhow::Context;
use blitz_core::config::Config;
use blitz_core::docker::DockerManager;
use blitz_core::reporter::ConsoleReporter;
use blitz_core::BlitzError;
use std::path::Path;

pub(crate) fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load(root).context("failed to load blitz.yaml")
}

/// Progress lines go to stdout unless JSON output was requested.
pub(crate) fn reporter(json: bool) -> ConsoleReporter {
    if json {
        ConsoleReporter::quiet()
    } else {
        ConsoleReporter::default()
    }
}

pub(crate) fn require_docker() -> anyhow::Result<()> {
    if !DockerManager::is_installed() {
        return Err(BlitzError::DockerMissing.into());
    }
    Ok(())
}
