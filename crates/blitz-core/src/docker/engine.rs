use crate::command::{CommandRunner, CommandSpec};
use crate::error::Result;
use crate::poll::Poll;
use std::time::Duration;

/// How long `remove_container` waits for docker to release a container name.
pub const NAME_RELEASE_TIMEOUT: Duration = Duration::from_secs(10);
pub const NAME_RELEASE_INTERVAL: Duration = Duration::from_millis(250);

/// Thin wrapper over the `docker` CLI.
pub struct DockerManager<'a> {
    runner: &'a dyn CommandRunner,
    release_poll: Poll,
}

impl<'a> DockerManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            release_poll: Poll::fixed(NAME_RELEASE_INTERVAL, NAME_RELEASE_TIMEOUT),
        }
    }

    /// Override how removal waits for the name to be released.
    pub fn with_release_poll(mut self, poll: Poll) -> Self {
        self.release_poll = poll;
        self
    }

    pub fn runner(&self) -> &'a dyn CommandRunner {
        self.runner
    }

    pub fn docker(&self) -> CommandSpec {
        CommandSpec::new("docker")
    }

    pub fn is_installed() -> bool {
        which::which("docker").is_ok()
    }

    /// Install docker.io from apt and enable the daemon.
    pub fn install(&self) -> Result<()> {
        let steps: [&[&str]; 4] = [
            &["apt", "update"],
            &["apt", "install", "-y", "docker.io"],
            &["systemctl", "start", "docker"],
            &["systemctl", "enable", "docker"],
        ];
        for step in steps {
            let spec = CommandSpec::new("sudo").args(step.iter().copied());
            self.runner.run(&spec)?;
        }
        Ok(())
    }

    pub fn pull_image(&self, image: &str) -> Result<()> {
        self.runner.run(&self.docker().args(["pull", image]))?;
        Ok(())
    }

    /// True if a container with exactly this name exists, running or not.
    pub fn container_exists(&self, name: &str) -> Result<bool> {
        let filter = format!("name=^{name}$");
        let ids = self
            .runner
            .run(&self.docker().args(["ps", "-a", "-q", "-f", filter.as_str()]))?;
        Ok(!ids.trim().is_empty())
    }

    /// Stop and remove a container, then wait until docker no longer lists
    /// its name so it can be reused immediately.
    pub fn remove_container(&self, name: &str) -> Result<()> {
        self.runner.run(&self.docker().args(["stop", name]))?;
        self.runner.run(&self.docker().args(["rm", name]))?;
        self.wait_until_absent(name)
    }

    pub fn wait_until_absent(&self, name: &str) -> Result<()> {
        let what = format!("container name '{name}' to be released");
        self.release_poll
            .until(&what, || matches!(self.container_exists(name), Ok(false)))?;
        Ok(())
    }

    /// `docker exec <container> <argv...>`
    pub fn exec(&self, container: &str, argv: &[&str]) -> Result<String> {
        let spec = self
            .docker()
            .args(["exec", container])
            .args(argv.iter().copied());
        self.runner.run(&spec)
    }
}
