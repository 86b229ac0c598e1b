use super::engine::DockerManager;
use crate::config::PostgresConfig;
use crate::error::Result;
use crate::paths::validate_identifier;
use crate::poll::Poll;
use crate::reporter::Reporter;
use std::time::Duration;

/// Runs PostgreSQL in a local container and prepares the project database.
pub struct PostgresManager<'a> {
    docker: DockerManager<'a>,
    config: PostgresConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> PostgresManager<'a> {
    pub fn new(
        docker: DockerManager<'a>,
        config: &PostgresConfig,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            docker,
            config: config.clone(),
            reporter,
        }
    }

    pub fn container_name(&self) -> &str {
        &self.config.container_name
    }

    fn run_args(&self, password: &str, volume: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--name".to_string(),
            self.config.container_name.clone(),
            "-e".to_string(),
            format!("POSTGRES_USER={}", self.config.user),
            "-e".to_string(),
            format!("POSTGRES_PASSWORD={password}"),
            "-p".to_string(),
            format!("{}:5432", self.config.port),
        ];
        if let Some(volume) = volume {
            args.push("-v".to_string());
            args.push(format!("{volume}:/var/lib/postgresql/data"));
        }
        args.push("-d".to_string());
        args.push(self.config.image.clone());
        args
    }

    /// `docker run` without a data volume.
    pub fn start_container(&self, password: &str) -> Result<()> {
        self.reporter.wait(&format!(
            "Starting PostgreSQL container '{}'...",
            self.config.container_name
        ));
        let spec = self.docker.docker().args(self.run_args(password, None));
        self.docker.runner().run(&spec)?;
        Ok(())
    }

    /// Replace any existing container with one that keeps its data in a
    /// named volume.
    pub fn ensure_data_persistence(&self, password: &str) -> Result<()> {
        self.remove_container()?;
        self.reporter
            .info("Setting up Docker volume for data persistence...");
        let spec = self
            .docker
            .docker()
            .args(self.run_args(password, Some(&self.config.volume)));
        self.docker.runner().run(&spec)?;
        self.reporter.success(&format!(
            "Started '{}' with volume '{}'",
            self.config.container_name, self.config.volume
        ));
        Ok(())
    }

    /// `pg_isready` reports accepting connections. Any failure counts as not ready.
    pub fn is_ready(&self) -> bool {
        match self.docker.exec(&self.config.container_name, &["pg_isready"]) {
            Ok(out) => out.contains("accepting connections"),
            Err(e) => {
                tracing::debug!("pg_isready failed: {e}");
                false
            }
        }
    }

    pub fn wait_for_ready(&self, timeout: Duration) -> Result<Duration> {
        let poll = Poll::fixed(self.config.ready_interval(), timeout);
        self.wait_for_ready_with(&poll)
    }

    pub fn wait_for_ready_with(&self, poll: &Poll) -> Result<Duration> {
        self.reporter.wait("Waiting for PostgreSQL to accept connections...");
        let elapsed = poll.until("PostgreSQL to be ready", || self.is_ready())?;
        self.reporter.success(&format!(
            "PostgreSQL ready after {:.1}s",
            elapsed.as_secs_f64()
        ));
        Ok(elapsed)
    }

    fn psql(&self, extra: &[&str]) -> Result<String> {
        let mut argv = vec!["psql", "-U", self.config.user.as_str()];
        argv.extend_from_slice(extra);
        self.docker.exec(&self.config.container_name, &argv)
    }

    pub fn database_exists(&self, db_name: &str) -> Result<bool> {
        validate_identifier(db_name)?;
        let query = format!("SELECT 1 FROM pg_database WHERE datname='{db_name}'");
        let out = self.psql(&["-tAc", &query])?;
        Ok(!out.trim().is_empty())
    }

    /// Create the configured database if missing, then enable extensions.
    pub fn setup_database(&self) -> Result<()> {
        let db = self.config.database.as_str();
        validate_identifier(db)?;
        for ext in &self.config.extensions {
            validate_identifier(ext)?;
        }

        if self.database_exists(db)? {
            self.reporter.info(&format!("Database '{db}' already exists"));
        } else {
            self.psql(&["-c", &format!("CREATE DATABASE {db};")])?;
            self.reporter.success(&format!("Created database '{db}'"));
        }
        for ext in &self.config.extensions {
            self.psql(&["-d", db, "-c", &format!("CREATE EXTENSION IF NOT EXISTS {ext};")])?;
            self.reporter.info(&format!("Enabled extension '{ext}'"));
        }
        Ok(())
    }

    pub fn container_exists(&self) -> Result<bool> {
        self.docker.container_exists(&self.config.container_name)
    }

    pub fn remove_container(&self) -> Result<()> {
        let name = &self.config.container_name;
        if !self.container_exists()? {
            return Ok(());
        }
        self.reporter.info(&format!(
            "Container with name {name} already exists. Stopping and removing..."
        ));
        self.docker.remove_container(name)
    }

    /// Pull, recreate with persistent storage, wait, and prepare the database.
    pub fn up(&self, password: &str) -> Result<()> {
        self.reporter
            .wait(&format!("Pulling image {}...", self.config.image));
        self.docker.pull_image(&self.config.image)?;
        self.ensure_data_persistence(password)?;
        self.wait_for_ready(self.config.ready_timeout())?;
        self.setup_database()
    }
}
