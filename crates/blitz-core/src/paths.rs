use crate::error::{BlitzError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File and directory names
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "blitz.yaml";

pub const ALEMBIC_INI: &str = "alembic.ini";
pub const MIGRATIONS_DIR: &str = "migrations";
pub const VERSIONS_DIR: &str = "versions";
pub const ENV_SCRIPT: &str = "env.py";
pub const MODELS_DIR: &str = "sqlalchemy_models";
pub const INIT_FILE: &str = "__init__.py";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolved locations inside one migration workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub alembic_ini: PathBuf,
    pub migrations: PathBuf,
    pub versions: PathBuf,
    pub env_script: PathBuf,
    pub models: PathBuf,
}

impl WorkspacePaths {
    pub fn new(project_root: &Path, workspace_name: &str) -> Self {
        let root = project_root.join(workspace_name);
        let migrations = root.join(MIGRATIONS_DIR);
        Self {
            alembic_ini: root.join(ALEMBIC_INI),
            versions: migrations.join(VERSIONS_DIR),
            env_script: migrations.join(ENV_SCRIPT),
            models: root.join(MODELS_DIR),
            migrations,
            root,
        }
    }

    /// Directories that must carry an `__init__.py` so the workspace is importable.
    pub fn package_dirs(&self) -> [&Path; 4] {
        [&self.root, &self.models, &self.migrations, &self.versions]
    }
}

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

static IDENT_RE: OnceLock<Regex> = OnceLock::new();

fn ident_re() -> &'static Regex {
    IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

/// Accepts names that are safe to splice into SQL and Python source unquoted.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.len() > 63 || !ident_re().is_match(name) {
        return Err(BlitzError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_identifiers() {
        for name in ["project_management", "_private", "Issue", "t1"] {
            validate_identifier(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_identifiers() {
        for name in [
            "",
            "1abc",
            "has space",
            "drop;table",
            "x'--",
            "dash-name",
        ] {
            assert!(validate_identifier(name).is_err(), "expected invalid: {name}");
        }
        assert!(validate_identifier(&"a".repeat(64)).is_err());
    }

    #[test]
    fn workspace_layout() {
        let ws = WorkspacePaths::new(Path::new("/tmp/proj"), "alembic_workspace");
        assert_eq!(ws.root, PathBuf::from("/tmp/proj/alembic_workspace"));
        assert_eq!(
            ws.alembic_ini,
            PathBuf::from("/tmp/proj/alembic_workspace/alembic.ini")
        );
        assert_eq!(
            ws.versions,
            PathBuf::from("/tmp/proj/alembic_workspace/migrations/versions")
        );
        assert_eq!(
            ws.env_script,
            PathBuf::from("/tmp/proj/alembic_workspace/migrations/env.py")
        );
        assert_eq!(ws.package_dirs().len(), 4);
    }
}
