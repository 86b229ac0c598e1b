mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, db::DbSubcommand, docker::DockerSubcommand,
    migrate::MigrateSubcommand, pgadmin::PgAdminSubcommand, workspace::WorkspaceSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "blitz",
    about = "Provision Alembic migration workspaces and a local PostgreSQL/pgAdmin stack",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from blitz.yaml or .git/)
    #[arg(long, global = true, env = "BLITZ_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write blitz.yaml with defaults in the project root
    Init,

    /// Create and inspect the migration workspace
    Workspace {
        #[command(subcommand)]
        subcommand: WorkspaceSubcommand,
    },

    /// Generate, patch, and apply migrations
    Migrate {
        #[command(subcommand)]
        subcommand: MigrateSubcommand,
    },

    /// Manage the local PostgreSQL container
    Db {
        #[command(subcommand)]
        subcommand: DbSubcommand,
    },

    /// Manage the local pgAdmin container
    Pgadmin {
        #[command(subcommand)]
        subcommand: PgAdminSubcommand,
    },

    /// Set up Docker on this machine
    Docker {
        #[command(subcommand)]
        subcommand: DockerSubcommand,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Docker { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Workspace { subcommand } => cmd::workspace::run(&root, subcommand, cli.json),
        Commands::Migrate { subcommand } => cmd::migrate::run(&root, subcommand, cli.json),
        Commands::Db { subcommand } => cmd::db::run(&root, subcommand, cli.json),
        Commands::Pgadmin { subcommand } => cmd::pgadmin::run(&root, subcommand, cli.json),
        Commands::Docker { subcommand } => cmd::docker::run(subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
