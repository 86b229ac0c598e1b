use crate::command::{CommandRunner, CommandSpec};
use crate::error::Result;
use crate::paths::MIGRATIONS_DIR;
use crate::reporter::Reporter;
use std::path::{Path, PathBuf};

/// Python packages needed to autogenerate and apply migrations.
pub const ALEMBIC_PACKAGES: &[&str] = &["alembic", "sqlalchemy", "psycopg2-binary"];

/// Drives the `pip` and `alembic` executables from inside a workspace.
pub struct AlembicCommandRunner<'a> {
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
    workspace: PathBuf,
}

impl<'a> AlembicCommandRunner<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
        workspace: &Path,
    ) -> Self {
        Self {
            runner,
            reporter,
            workspace: workspace.to_path_buf(),
        }
    }

    fn alembic(&self) -> CommandSpec {
        CommandSpec::new("alembic").current_dir(&self.workspace)
    }

    pub fn install_alembic(&self) -> Result<()> {
        self.reporter.wait("Installing alembic...");
        let spec = CommandSpec::new("pip")
            .arg("install")
            .args(ALEMBIC_PACKAGES.iter().copied())
            .current_dir(&self.workspace);
        self.runner.run(&spec)?;
        self.reporter.success("Installed alembic");
        Ok(())
    }

    /// `alembic init migrations`. Skipped if the migrations directory already
    /// has an environment script, since alembic refuses to init into it.
    pub fn initialize_alembic(&self) -> Result<bool> {
        let env = self.workspace.join(MIGRATIONS_DIR).join(crate::paths::ENV_SCRIPT);
        if env.exists() {
            self.reporter
                .info("Alembic already initialized; skipping 'alembic init'");
            return Ok(false);
        }
        self.reporter.wait("Initializing alembic...");
        self.runner
            .run(&self.alembic().args(["init", MIGRATIONS_DIR]))?;
        self.reporter.success(&format!(
            "Initialized alembic in {}",
            self.workspace.join(MIGRATIONS_DIR).display()
        ));
        Ok(true)
    }

    pub fn create_revision(&self, label: &str) -> Result<String> {
        self.reporter
            .wait(&format!("Generating migration '{label}'..."));
        let out = self
            .runner
            .run(&self.alembic().args(["revision", "--autogenerate", "-m", label]))?;
        self.reporter.success(&format!("Generated migration '{label}'"));
        Ok(out)
    }

    pub fn upgrade_head(&self) -> Result<String> {
        self.reporter.wait("Applying migrations...");
        let out = self.runner.run(&self.alembic().args(["upgrade", "head"]))?;
        self.reporter.success("Database upgraded to head");
        Ok(out)
    }
}
