use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlitzError {
    #[error("not initialized: run 'blitz init'")]
    NotInitialized,

    #[error("invalid identifier '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),

    #[error("upgrade signature 'def upgrade() -> None:' not found in {}", .0.display())]
    MarkerNotFound(PathBuf),

    #[error("no migration file matching '{label}' in {}", .dir.display())]
    MigrationNotFound { label: String, dir: PathBuf },

    #[error("no '{key}' line in {}", .path.display())]
    SettingNotFound { key: String, path: PathBuf },

    #[error("failed to spawn '{program}': {reason}")]
    CommandSpawn { program: String, reason: String },

    #[error("'{program}' exited with {}: {stderr}", .code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("timed out after {}s waiting for {what}", .after.as_secs_f64())]
    Timeout { what: String, after: Duration },

    #[error("docker is not installed: run 'blitz docker install'")]
    DockerMissing,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, BlitzError>;
