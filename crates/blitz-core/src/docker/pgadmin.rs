use super::engine::DockerManager;
use crate::config::PgAdminConfig;
use crate::error::Result;
use crate::reporter::Reporter;

/// Runs the pgAdmin web UI in a local container.
pub struct PgAdminManager<'a> {
    docker: DockerManager<'a>,
    config: PgAdminConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> PgAdminManager<'a> {
    pub fn new(
        docker: DockerManager<'a>,
        config: &PgAdminConfig,
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

    pub fn start_container(&self, email: &str, password: &str) -> Result<()> {
        self.reporter.wait(&format!(
            "Starting pgAdmin container '{}'...",
            self.config.container_name
        ));
        let spec = self.docker.docker().args([
            "run".to_string(),
            "--name".to_string(),
            self.config.container_name.clone(),
            "-p".to_string(),
            format!("{}:80", self.config.port),
            "-e".to_string(),
            format!("PGADMIN_DEFAULT_EMAIL={email}"),
            "-e".to_string(),
            format!("PGADMIN_DEFAULT_PASSWORD={password}"),
            "-d".to_string(),
            self.config.image.clone(),
        ]);
        self.docker.runner().run(&spec)?;
        self.reporter.success(&format!(
            "pgAdmin available at http://localhost:{}",
            self.config.port
        ));
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

    /// Recreate the container from scratch.
    pub fn up(&self, email: &str, password: &str) -> Result<()> {
        self.remove_container()?;
        self.start_container(email, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ScriptedRunner;
    use crate::poll::Poll;
    use crate::reporter::RecordingReporter;
    use std::time::Duration;

    #[test]
    fn start_container_argv() {
        let runner = ScriptedRunner::new();
        let reporter = RecordingReporter::default();
        let cfg = PgAdminConfig::default();
        let admin = PgAdminManager::new(DockerManager::new(&runner), &cfg, &reporter);
        admin.start_container("me@example.com", "hunter2").unwrap();
        assert_eq!(
            runner.calls_joined(),
            vec![
                "docker run --name pgadmin4 -p 80:80 -e PGADMIN_DEFAULT_EMAIL=me@example.com -e PGADMIN_DEFAULT_PASSWORD=hunter2 -d dpage/pgadmin4"
            ]
        );
        assert!(reporter.has_success("http://localhost:80"));
    }

    #[test]
    fn up_replaces_existing_container() {
        let runner = ScriptedRunner::new()
            .ok(&["docker", "ps"], "abc")
            .ok(&["docker", "ps"], "");
        let reporter = RecordingReporter::default();
        let cfg = PgAdminConfig::default();
        let docker = DockerManager::new(&runner)
            .with_release_poll(Poll::fixed(Duration::from_millis(1), Duration::from_millis(50)));
        let admin = PgAdminManager::new(docker, &cfg, &reporter);
        admin.up("me@example.com", "pw").unwrap();

        let calls = runner.calls_joined();
        assert_eq!(calls[1], "docker stop pgadmin4");
        assert_eq!(calls[2], "docker rm pgadmin4");
        assert!(calls.last().unwrap().starts_with("docker run --name pgadmin4"));
    }
}
