//! Application layer errors.
//!
//! These errors represent failures while driving the ports (loading,
//! writing, running commands), not rule violations. Rule violations are
//! `DomainError` from `crate::domain`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ServiceType;
use crate::error::ErrorCategory;

/// Step of a service installation, reported with every install failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallStage {
    Validation,
    DependencyCheck,
    ConfigGeneration,
    BringUp,
}

impl InstallStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::DependencyCheck => "dependency check",
            Self::ConfigGeneration => "config generation",
            Self::BringUp => "bring-up",
        }
    }
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that occur during orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A specific service failed at a specific stage.
    #[error("Installation of '{service}' failed during {stage}: {reason}")]
    ServiceInstallation {
        service: ServiceType,
        stage: InstallStage,
        reason: String,
    },

    /// The template loader could not produce the named template.
    #[error("Template '{name}' could not be loaded: {reason}")]
    TemplateLoad { name: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// An external command could not be started or returned non-zero.
    #[error("Command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// The host platform could not be determined.
    #[error("Platform detection failed: {reason}")]
    PlatformDetection { reason: String },

    /// A lifecycle step was called out of order.
    #[error("Service '{service}' cannot move from {from} to {to}")]
    InvalidTransition {
        service: ServiceType,
        from: &'static str,
        to: &'static str,
    },

    /// Cache access failed (lock poisoned).
    #[error("Cache lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ServiceInstallation {
                service, stage, ..
            } => match stage {
                InstallStage::Validation | InstallStage::ConfigGeneration => vec![
                    format!("Check the settings and credentials used by '{}'", service),
                    "Run: homelab plan to validate without installing".into(),
                ],
                InstallStage::DependencyCheck => vec![
                    format!("A service '{}' depends on is not running", service),
                    "Select its dependencies and list them before it".into(),
                ],
                InstallStage::BringUp => vec![
                    format!("Inspect the container: docker compose logs {}", service),
                    "Ensure the docker daemon is running and reachable".into(),
                ],
            },
            Self::TemplateLoad { name, .. } => vec![
                format!("No usable template named '{}'", name),
                "Try: homelab templates to list available templates".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::CommandFailed { command, .. } => vec![
                format!("External command failed: {}", command),
                "Ensure docker is installed and in your PATH".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ServiceInstallation { .. } => ErrorCategory::Installation,
            Self::TemplateLoad { .. } => ErrorCategory::Template,
            Self::PlatformDetection { .. } => ErrorCategory::Environment,
            Self::FilesystemError { .. }
            | Self::CommandFailed { .. }
            | Self::InvalidTransition { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
