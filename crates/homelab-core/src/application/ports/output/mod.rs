//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `homelab-adapters` crate provides implementations.

use std::fmt;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::domain::Distribution;
use crate::error::HomelabResult;

// ── Commands ──────────────────────────────────────────────────────────────────

/// Description of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    sensitive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            sensitive: false,
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

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Arguments of sensitive commands are never logged or displayed.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        if self.sensitive {
            return f.write_str(" [REDACTED]");
        }
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Short reason for a failed command: trimmed stderr, or the exit status.
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.exit_code {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Port for running external commands.
///
/// Implemented by:
/// - `homelab_adapters::runner::ProcessRunner` (production)
/// - `homelab_adapters::runner::RecordingRunner` (testing, dry runs)
///
/// A runner returns `Err` only when the command could not be started; a
/// non-zero exit is reported through [`CommandOutput`] and judged by the
/// caller.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandSpec) -> HomelabResult<CommandOutput>;
}

// ── Templates ─────────────────────────────────────────────────────────────────

/// Why a loader could not return a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("template not found")]
    NotFound,

    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// Port for raw template retrieval.
///
/// Implemented by:
/// - `homelab_adapters::template_loader::BuiltinTemplateLoader` (compiled in)
/// - `homelab_adapters::template_loader::FilesystemTemplateLoader` (user templates)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateLoader: Send + Sync {
    /// Fetch the raw structured value stored under `name`.
    fn load(&self, name: &str) -> Result<Value, LoadError>;

    /// Names this loader can resolve, sorted.
    fn available(&self) -> Vec<String>;
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Port for writing generated configuration.
///
/// Implemented by:
/// - `homelab_adapters::filesystem::LocalFilesystem` (production)
/// - `homelab_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait ConfigWriter: Send + Sync {
    /// Create parent directories recursively, then write `content`.
    fn write_config(&self, path: &Path, content: &str) -> HomelabResult<()>;

    /// Remove a previously written file.
    fn remove_config(&self, path: &Path) -> HomelabResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// Port for host distribution detection.
#[cfg_attr(test, mockall::automock)]
pub trait PlatformProbe: Send + Sync {
    /// Identify the host; unsupported hosts yield `DistributionNotSupported`.
    fn detect(&self) -> HomelabResult<Distribution>;
}
