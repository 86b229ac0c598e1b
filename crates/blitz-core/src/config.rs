use crate::error::{BlitzError, Result};
use crate::models::ModelDefinition;
use crate::paths::{self, validate_identifier};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// WorkspaceConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_workspace_name")]
    pub name: String,
    /// Directory (relative to the project root) whose `*.py` files are copied
    /// into the workspace models directory.
    #[serde(default = "default_models_source")]
    pub models_source: String,
    #[serde(default = "default_schemas")]
    pub schemas: Vec<String>,
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
}

fn default_workspace_name() -> String {
    "alembic_workspace".to_string()
}

fn default_models_source() -> String {
    "blitzkrieg/db/models".to_string()
}

fn default_schemas() -> Vec<String> {
    ["project_management", "event_management", "workspace_management"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: default_workspace_name(),
            models_source: default_models_source(),
            schemas: default_schemas(),
            models: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PostgresConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default = "default_pg_container")]
    pub container_name: String,
    #[serde(default = "default_pg_image")]
    pub image: String,
    #[serde(default = "default_pg_host")]
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default = "default_pg_user")]
    pub user: String,
    #[serde(default = "default_pg_password")]
    pub password: String,
    #[serde(default = "default_pg_database")]
    pub database: String,
    #[serde(default = "default_pg_volume")]
    pub volume: String,
    #[serde(default = "default_pg_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
    #[serde(default = "default_ready_interval")]
    pub ready_interval_secs: u64,
}

fn default_pg_container() -> String {
    "blitz-postgres".to_string()
}

fn default_pg_image() -> String {
    "postgres:latest".to_string()
}

fn default_pg_host() -> String {
    "localhost".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_user() -> String {
    "postgres".to_string()
}

fn default_pg_password() -> String {
    "postgres".to_string()
}

fn default_pg_database() -> String {
    "blitz".to_string()
}

fn default_pg_volume() -> String {
    "postgres_data".to_string()
}

fn default_pg_extensions() -> Vec<String> {
    vec!["cube".to_string()]
}

fn default_ready_timeout() -> u64 {
    60
}

fn default_ready_interval() -> u64 {
    2
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            container_name: default_pg_container(),
            image: default_pg_image(),
            host: default_pg_host(),
            port: default_pg_port(),
            user: default_pg_user(),
            password: default_pg_password(),
            database: default_pg_database(),
            volume: default_pg_volume(),
            extensions: default_pg_extensions(),
            ready_timeout_secs: default_ready_timeout(),
            ready_interval_secs: default_ready_interval(),
        }
    }
}

impl PostgresConfig {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn ready_interval(&self) -> Duration {
        Duration::from_secs(self.ready_interval_secs)
    }
}

// ---------------------------------------------------------------------------
// PgAdminConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PgAdminConfig {
    #[serde(default = "default_pgadmin_container")]
    pub container_name: String,
    #[serde(default = "default_pgadmin_image")]
    pub image: String,
    #[serde(default = "default_pgadmin_port")]
    pub port: u16,
    #[serde(default = "default_pgadmin_email")]
    pub email: String,
    #[serde(default = "default_pgadmin_password")]
    pub password: String,
}

fn default_pgadmin_container() -> String {
    "pgadmin4".to_string()
}

fn default_pgadmin_image() -> String {
    "dpage/pgadmin4".to_string()
}

fn default_pgadmin_port() -> u16 {
    80
}

fn default_pgadmin_email() -> String {
    "admin@example.com".to_string()
}

fn default_pgadmin_password() -> String {
    "admin".to_string()
}

impl Default for PgAdminConfig {
    fn default() -> Self {
        Self {
            container_name: default_pgadmin_container(),
            image: default_pgadmin_image(),
            port: default_pgadmin_port(),
            email: default_pgadmin_email(),
            password: default_pgadmin_password(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: String,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub pgadmin: PgAdminConfig,
}

impl Config {
    pub fn new(project: &str) -> Self {
        let database = identifier_from(project);
        Self {
            project: project.to_string(),
            workspace: WorkspaceConfig::default(),
            postgres: PostgresConfig {
                container_name: format!("{project}-postgres"),
                database,
                ..PostgresConfig::default()
            },
            pgadmin: PgAdminConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(BlitzError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        if validate_identifier(&self.workspace.name).is_err() {
            error(format!(
                "workspace.name '{}' is not a valid directory/module name",
                self.workspace.name
            ));
        }
        for schema in &self.workspace.schemas {
            if validate_identifier(schema).is_err() {
                error(format!("workspace.schemas: '{schema}' is not a valid identifier"));
            }
        }
        if validate_identifier(&self.postgres.database).is_err() {
            error(format!(
                "postgres.database '{}' is not a valid identifier",
                self.postgres.database
            ));
        }
        for ext in &self.postgres.extensions {
            if validate_identifier(ext).is_err() {
                error(format!("postgres.extensions: '{ext}' is not a valid identifier"));
            }
        }
        if self.postgres.ready_timeout_secs == 0 {
            error("postgres.ready_timeout_secs must be greater than zero".to_string());
        }
        if self.postgres.ready_interval_secs == 0 {
            error("postgres.ready_interval_secs must be greater than zero".to_string());
        }

        let mut tables = HashSet::new();
        for model in &self.workspace.models {
            if let Err(e) = model.validate() {
                error(format!("workspace.models: {}: {e}", model.class_name));
            }
            let key = (model.schema.clone(), model.table_name.clone());
            if !tables.insert(key) {
                error(format!(
                    "workspace.models: table '{}' is declared more than once",
                    model.table_name
                ));
            }
        }

        if self.postgres.password.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "postgres.password is empty; the postgres image refuses to start without one"
                    .to_string(),
            });
        }
        if self.pgadmin.password.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "pgadmin.password is empty".to_string(),
            });
        }
        if self.postgres.container_name == self.pgadmin.container_name {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "postgres and pgadmin cannot share a container name".to_string(),
            });
        }

        warnings
    }
}

/// Turn an arbitrary project name into a plain SQL identifier.
fn identifier_from(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out.truncate(63);
    out
}
