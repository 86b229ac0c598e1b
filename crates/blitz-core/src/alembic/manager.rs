use super::migration::{self, Splice};
use super::runner::AlembicCommandRunner;
use super::templates;
use crate::command::CommandRunner;
use crate::config::{Config, PostgresConfig};
use crate::error::{BlitzError, Result};
use crate::io;
use crate::models::{ModelDefinition, ModelManager};
use crate::paths::{self, validate_identifier, WorkspacePaths};
use crate::reporter::Reporter;
use std::path::{Path, PathBuf};

/// Supplies the database URL written into `alembic.ini` and `env.py`.
pub trait ConnectionSource {
    fn sqlalchemy_uri(&self) -> String;
}

impl ConnectionSource for PostgresConfig {
    fn sqlalchemy_uri(&self) -> String {
        format!(
            "postgresql+psycopg2://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionOptions {
    /// Skip `pip install` and `alembic init`; only write files.
    pub skip_tooling: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Inserted,
    AlreadyPresent,
}

pub struct AlembicManager<'a> {
    paths: WorkspacePaths,
    models_source: PathBuf,
    models: Vec<ModelDefinition>,
    connection: &'a dyn ConnectionSource,
    reporter: &'a dyn Reporter,
    commands: AlembicCommandRunner<'a>,
}

impl<'a> AlembicManager<'a> {
    pub fn new(
        root: &Path,
        config: &Config,
        connection: &'a dyn ConnectionSource,
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        let paths = WorkspacePaths::new(root, &config.workspace.name);
        let commands = AlembicCommandRunner::new(runner, reporter, &paths.root);
        Self {
            models_source: root.join(&config.workspace.models_source),
            models: config.workspace.models.clone(),
            paths,
            connection,
            reporter,
            commands,
        }
    }

    pub fn paths(&self) -> &WorkspacePaths {
        &self.paths
    }

    /// Report a failed step before handing the error back to the caller.
    fn reported<T>(&self, what: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.reporter.error(&format!("Failed to {what}: {e}"));
        }
        result
    }

    // -----------------------------------------------------------------------
    // Workspace files
    // -----------------------------------------------------------------------

    pub fn create_workspace_directory(&self) -> Result<bool> {
        let created = self.reported(
            "create workspace directory",
            io::ensure_dir(&self.paths.root),
        )?;
        if created {
            self.reporter.success(&format!(
                "Created workspace at {}",
                self.paths.root.display()
            ));
        }
        Ok(created)
    }

    pub fn create_alembic_ini_file(&self) -> Result<()> {
        self.reporter.wait("Creating alembic.ini file...");
        let path = &self.paths.alembic_ini;
        self.reported(
            "create alembic.ini file",
            io::atomic_write(path, templates::alembic_ini().as_bytes()),
        )?;
        self.reporter
            .success(&format!("Created alembic.ini file at {}", path.display()));
        self.reporter.display_file(path);
        Ok(())
    }

    /// Make sure every workspace package directory has an `__init__.py`.
    /// Returns only the files created by this call.
    pub fn create_init_files(&self) -> Result<Vec<PathBuf>> {
        let result = (|| -> Result<Vec<PathBuf>> {
            let mut created = Vec::new();
            for dir in self.paths.package_dirs() {
                io::ensure_dir(dir)?;
                let init = dir.join(paths::INIT_FILE);
                if io::touch_if_missing(&init)? {
                    self.reporter
                        .info(&format!("Created __init__.py file at {}", dir.display()));
                    created.push(init);
                }
            }
            Ok(created)
        })();
        let created = self.reported("create init files", result)?;
        self.reporter
            .success("All __init__.py files created successfully.");
        Ok(created)
    }

    pub fn create_sqlalchemy_models_directory(&self) -> Result<bool> {
        let created = self.reported(
            "create sqlalchemy_models directory",
            io::ensure_dir(&self.paths.models),
        )?;
        if created {
            self.reporter.success(&format!(
                "Created sqlalchemy_models directory at {}",
                self.paths.models.display()
            ));
        }
        Ok(created)
    }

    /// Copy the project's own `*.py` model modules into the workspace.
    /// A missing source directory is reported and skipped.
    pub fn copy_sqlalchemy_models(&self) -> Result<Vec<PathBuf>> {
        if !self.models_source.is_dir() {
            self.reporter.info(&format!(
                "No models directory at {}; skipping copy",
                self.models_source.display()
            ));
            return Ok(Vec::new());
        }
        let copied = self.reported(
            "copy SQLAlchemy models",
            io::ensure_dir(&self.paths.models).and_then(|_| {
                io::copy_files_with_extension(&self.models_source, &self.paths.models, "py")
            }),
        )?;
        self.reporter.success(&format!(
            "Copied {} SQLAlchemy model file(s) from {} to {}",
            copied.len(),
            self.models_source.display(),
            self.paths.models.display()
        ));
        Ok(copied)
    }

    /// Render every model declared in the config, plus the shared base module.
    pub fn build_sqlalchemy_model_files(&self) -> Result<Vec<PathBuf>> {
        let manager = ModelManager::new(&self.paths.models, self.reporter);
        let result = (|| -> Result<Vec<PathBuf>> {
            manager.ensure_base()?;
            self.models
                .iter()
                .map(|m| manager.create_model(m))
                .collect::<Result<Vec<_>>>()
        })();
        self.reported("build SQLAlchemy model files", result)
    }

    /// Point the `sqlalchemy.url` line of `alembic.ini` at the configured database.
    /// Every other line is written back unchanged.
    pub fn update_sqlalchemy_uri(&self) -> Result<usize> {
        let path = &self.paths.alembic_ini;
        let uri = self.connection.sqlalchemy_uri();
        let result = (|| -> Result<usize> {
            let content = std::fs::read_to_string(path)?;
            let line = format!("{} = {uri}", templates::SQLALCHEMY_URL_KEY);
            let (updated, replaced) =
                io::replace_prefixed_lines(&content, templates::SQLALCHEMY_URL_KEY, &line);
            if replaced == 0 {
                return Err(BlitzError::SettingNotFound {
                    key: templates::SQLALCHEMY_URL_KEY.to_string(),
                    path: path.clone(),
                });
            }
            io::atomic_write(path, updated.as_bytes())?;
            Ok(replaced)
        })();
        let replaced = self.reported("update SQLAlchemy URI", result)?;
        self.reporter.success(&format!(
            "SQLAlchemy URI updated in the Alembic configuration: '{}' now points to '{uri}'.",
            templates::SQLALCHEMY_URL_KEY
        ));
        Ok(replaced)
    }

    pub fn update_alembic_env(&self) -> Result<()> {
        let path = &self.paths.env_script;
        let script = templates::env_script(&self.connection.sqlalchemy_uri());
        self.reported(
            "write alembic env.py",
            io::atomic_write(path, script.as_bytes()),
        )?;
        self.reporter.info(
            "Alembic env.py updated with target metadata and dynamic loading of sqlalchemy_models.",
        );
        self.reporter.display_file(path);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Alembic CLI
    // -----------------------------------------------------------------------

    pub fn install_alembic(&self) -> Result<()> {
        self.reported("install alembic", self.commands.install_alembic())
    }

    pub fn initialize_alembic(&self) -> Result<bool> {
        self.reported("initialize alembic", self.commands.initialize_alembic())
    }

    pub fn create_revision(&self, label: &str) -> Result<String> {
        self.reported("generate migration", self.commands.create_revision(label))
    }

    pub fn upgrade_head(&self) -> Result<String> {
        self.reported("apply migrations", self.commands.upgrade_head())
    }

    // -----------------------------------------------------------------------
    // Migration patching
    // -----------------------------------------------------------------------

    /// First revision script (by file name) whose name contains `label`,
    /// either verbatim or as alembic's slug of it.
    pub fn find_migration_file(&self, label: &str) -> Result<PathBuf> {
        let dir = &self.paths.versions;
        let not_found = || BlitzError::MigrationNotFound {
            label: label.to_string(),
            dir: dir.clone(),
        };
        if !dir.is_dir() {
            return Err(not_found());
        }
        let slug = revision_slug(label);
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "py"))
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy())
                    .is_some_and(|n| n.contains(label) || (!slug.is_empty() && n.contains(&slug)))
            })
            .collect();
        candidates.sort();
        let found = candidates.into_iter().next().ok_or_else(not_found)?;
        self.reporter
            .info(&format!("Found migration file: {}", found.display()));
        Ok(found)
    }

    /// Splice `CREATE SCHEMA IF NOT EXISTS <schema>` right after the upgrade
    /// signature of `migration_file`. The file is not written when the
    /// signature is missing or the statement is already there.
    pub fn insert_schema_creation_sql(
        &self,
        migration_file: &Path,
        schema: &str,
    ) -> Result<PatchOutcome> {
        let result = (|| -> Result<PatchOutcome> {
            validate_identifier(schema)?;
            let content = std::fs::read_to_string(migration_file)?;
            match migration::splice_schema_statement(&content, schema) {
                None => Err(BlitzError::MarkerNotFound(migration_file.to_path_buf())),
                Some(Splice::AlreadyPresent) => Ok(PatchOutcome::AlreadyPresent),
                Some(Splice::Inserted(updated)) => {
                    io::atomic_write(migration_file, updated.as_bytes())?;
                    Ok(PatchOutcome::Inserted)
                }
            }
        })();
        let outcome = self.reported("insert schema creation SQL", result)?;
        match outcome {
            PatchOutcome::Inserted => self.reporter.success(&format!(
                "Inserted schema creation SQL for '{schema}' into {}",
                migration_file.display()
            )),
            PatchOutcome::AlreadyPresent => self.reporter.info(&format!(
                "Schema '{schema}' is already created in {}",
                migration_file.display()
            )),
        }
        Ok(outcome)
    }

    /// Locate the revision for `label` and patch it for `schema`.
    pub fn modify_migration_for_schema(
        &self,
        schema: &str,
        label: &str,
    ) -> Result<(PathBuf, PatchOutcome)> {
        self.reporter.wait(&format!(
            "Modifying migration file for schema creation: {schema}. Migration label: {label}..."
        ));
        let file = self.reported("find migration file", self.find_migration_file(label))?;
        let outcome = self.insert_schema_creation_sql(&file, schema)?;
        Ok((file, outcome))
    }

    /// Autogenerate a revision named `label`, then patch it for each schema.
    pub fn generate_migration(&self, label: &str, schemas: &[String]) -> Result<PathBuf> {
        for schema in schemas {
            self.reported("generate migration", validate_identifier(schema))?;
        }
        self.create_revision(label)?;
        let file = self.reported("find migration file", self.find_migration_file(label))?;
        for schema in schemas {
            self.insert_schema_creation_sql(&file, schema)?;
        }
        Ok(file)
    }

    // -----------------------------------------------------------------------
    // Full sequence
    // -----------------------------------------------------------------------

    pub fn provision(&self, options: ProvisionOptions) -> Result<()> {
        self.create_workspace_directory()?;
        if !options.skip_tooling {
            self.install_alembic()?;
            self.initialize_alembic()?;
        }
        self.create_alembic_ini_file()?;
        self.update_sqlalchemy_uri()?;
        self.create_sqlalchemy_models_directory()?;
        self.copy_sqlalchemy_models()?;
        self.build_sqlalchemy_model_files()?;
        self.create_init_files()?;
        self.update_alembic_env()?;
        Ok(())
    }
}

/// Longest slug alembic puts in a revision file name.
const TRUNCATE_SLUG_LENGTH: usize = 40;

/// Alembic's file-name slug for a revision message. Slugs over the limit
/// are cut back to the last `_` inside it and keep a trailing `_`.
fn revision_slug(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_sep = false;
    for c in label.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.chars().count() <= TRUNCATE_SLUG_LENGTH {
        return slug;
    }
    let head: String = slug.chars().take(TRUNCATE_SLUG_LENGTH).collect();
    let kept = head.rsplit_once('_').map_or(head.as_str(), |(kept, _)| kept);
    format!("{kept}_")
}
