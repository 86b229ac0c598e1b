//! Leveled progress reporting for long-running provisioning steps.
//!
//! The library never prints directly; it hands user-facing messages to a
//! [`Reporter`]. The CLI uses [`ConsoleReporter`]; tests record messages.

use std::path::Path;

pub trait Reporter {
    /// A step is about to start.
    fn wait(&self, message: &str);
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    /// Show the contents of a generated file.
    fn display_file(&self, path: &Path);
}

/// Writes to stdout (stderr for errors) and mirrors every message to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct ConsoleReporter {
    /// Suppress `display_file` output.
    pub quiet_files: bool,
    /// Keep stdout clean (e.g. for JSON output); progress goes to `tracing` only.
    pub quiet: bool,
}

impl ConsoleReporter {
    pub fn quiet() -> Self {
        Self {
            quiet_files: true,
            quiet: true,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn wait(&self, message: &str) {
        tracing::debug!(target: "blitz", "{message}");
        if !self.quiet {
            println!("  ... {message}");
        }
    }

    fn info(&self, message: &str) {
        tracing::debug!(target: "blitz", "{message}");
        if !self.quiet {
            println!("  {message}");
        }
    }

    fn success(&self, message: &str) {
        tracing::info!(target: "blitz", "{message}");
        if !self.quiet {
            println!("  ok: {message}");
        }
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "blitz", "{message}");
        eprintln!("  error: {message}");
    }

    fn display_file(&self, path: &Path) {
        if self.quiet_files {
            return;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => {
                println!("--- {} ---", path.display());
                println!("{}", content.trim_end());
                println!("---");
            }
            Err(e) => tracing::warn!("cannot display {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
pub(crate) use recording::RecordingReporter;


#[cfg(test)]
pub(crate) use recording::Level;
