//! Synchronous subprocess execution.
//!
//! Every external program (docker, psql inside a container, pip, alembic)
//! is invoked through a [`CommandRunner`] with an explicit argument vector.
//! Nothing is ever passed through a shell, so container names, passwords and
//! labels cannot inject extra commands.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{BlitzError, Result};

/// A program plus its arguments and optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Program followed by arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

pub trait CommandRunner {
    /// Run to completion and return trimmed stdout. A non-zero exit is an error
    /// carrying the captured stderr.
    fn run(&self, spec: &CommandSpec) -> Result<String>;
}

/// Runs commands on the host with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<String> {
        tracing::debug!("exec: {spec}");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().map_err(|e| BlitzError::CommandSpawn {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!("error executing '{spec}': {stderr}");
            return Err(BlitzError::CommandFailed {
                program: spec.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedRunner;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_display_joins_argv() {
        let spec = CommandSpec::new("docker").args(["ps", "-a", "-q"]);
        assert_eq!(spec.to_string(), "docker ps -a -q");
        assert_eq!(spec.argv(), vec!["docker", "ps", "-a", "-q"]);
    }

    #[test]
    fn args_with_metacharacters_stay_single_arguments() {
        let spec = CommandSpec::new("docker").arg("name=x; rm -rf /");
        assert_eq!(spec.args.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_returns_trimmed_stdout() {
        let out = SystemRunner
            .run(&CommandSpec::new("echo").arg("  hello  "))
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_surfaces_stderr_on_failure() {
        let err = SystemRunner
            .run(&CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 3"]))
            .unwrap_err();
        match err {
            BlitzError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_honors_cwd() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = SystemRunner
            .run(&CommandSpec::new("pwd").current_dir(dir.path()))
            .unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(std::path::PathBuf::from(out).canonicalize().unwrap(), expected);
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = SystemRunner
            .run(&CommandSpec::new("definitely-not-a-real-binary-blitz"))
            .unwrap_err();
        assert!(matches!(err, BlitzError::CommandSpawn { .. }));
    }

    #[test]
    fn scripted_runner_queues_then_repeats() {
        let runner = ScriptedRunner::new()
            .ok(&["docker", "ps"], "abc")
            .ok(&["docker", "ps"], "");
        let ps = CommandSpec::new("docker").args(["ps", "-a"]);
        assert_eq!(runner.run(&ps).unwrap(), "abc");
        assert_eq!(runner.run(&ps).unwrap(), "");
        assert_eq!(runner.run(&ps).unwrap(), "");
        assert_eq!(runner.count_prefix(&["docker", "ps"]), 3);
    }
}
