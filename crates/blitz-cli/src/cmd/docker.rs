use crate::output::print_json;
use anyhow::Context;
use blitz_core::command::SystemRunner;
use blitz_core::docker::DockerManager;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum DockerSubcommand {
    /// Install docker.io with apt and enable the service (uses sudo)
    Install,
}

pub fn run(subcmd: DockerSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DockerSubcommand::Install => install(json),
    }
}

fn install(json: bool) -> anyhow::Result<()> {
    let already = DockerManager::is_installed();
    if !already {
        if !json {
            println!("Installing Docker...");
        }
        DockerManager::new(&SystemRunner)
            .install()
            .context("docker installation failed")?;
    }

    if json {
        print_json(&serde_json::json!({ "installed": true, "already_present": already }))?;
    } else if already {
        println!("Docker is already installed.");
    } else {
        println!("Docker installed.");
    }
    Ok(())
}
