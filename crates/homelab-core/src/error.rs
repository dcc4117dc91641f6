//! Unified error handling for the homelab core.
//!
//! [`HomelabError`] wraps domain and application errors. Every error is
//! fatal for the current run and none is retried; [`HomelabError::kind`]
//! maps it onto the taxonomy the error handler reports.

use std::fmt;
use thiserror::Error;

use crate::application::{ApplicationError, InstallStage};
use crate::domain::{DomainError, ServiceType};

/// Root error type for homelab core operations.
#[derive(Debug, Error, Clone)]
pub enum HomelabError {
    /// Errors from the domain layer (rule violations).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

/// The error taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid or missing configuration; raised before any side effect.
    Configuration,
    /// A specific service failed to install.
    ServiceInstallation,
    /// Malformed template or unresolved placeholder.
    Template,
    /// The host is not a supported environment.
    DistributionNotSupported,
    /// A service type with no catalog entry.
    UnknownService,
    /// Anything else (I/O plumbing, poisoned locks, bugs).
    Internal,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "ConfigurationError",
            Self::ServiceInstallation => "ServiceInstallationError",
            Self::Template => "TemplateError",
            Self::DistributionNotSupported => "DistributionNotSupportedError",
            Self::UnknownService => "UnknownServiceError",
            Self::Internal => "InternalError",
        }
    }

    /// `true` for kinds detected before anything is touched on the host.
    pub const fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::Configuration | Self::DistributionNotSupported | Self::UnknownService
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HomelabError {
    /// Shorthand for a service installation failure.
    pub fn installation(
        service: ServiceType,
        stage: InstallStage,
        reason: impl Into<String>,
    ) -> Self {
        ApplicationError::ServiceInstallation {
            service,
            stage,
            reason: reason.into(),
        }
        .into()
    }

    /// Taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => match e {
                DomainError::InvalidConfiguration { .. } | DomainError::MissingCredential { .. } => {
                    ErrorKind::Configuration
                }
                DomainError::UnknownService(_) => ErrorKind::UnknownService,
                DomainError::UnsupportedDistribution(_) => ErrorKind::DistributionNotSupported,
                DomainError::InvalidTemplate { .. } | DomainError::UnresolvedPlaceholder { .. } => {
                    ErrorKind::Template
                }
            },
            Self::Application(e) => match e {
                ApplicationError::ServiceInstallation { .. } => ErrorKind::ServiceInstallation,
                ApplicationError::TemplateLoad { .. } => ErrorKind::Template,
                ApplicationError::PlatformDetection { .. } => ErrorKind::DistributionNotSupported,
                _ => ErrorKind::Internal,
            },
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// The service this error is about, when there is one.
    pub fn service(&self) -> Option<ServiceType> {
        match self {
            Self::Application(ApplicationError::ServiceInstallation { service, .. })
            | Self::Application(ApplicationError::InvalidTransition { service, .. }) => {
                Some(*service)
            }
            _ => None,
        }
    }

    /// The install stage this error is about, when there is one.
    pub fn stage(&self) -> Option<InstallStage> {
        match self {
            Self::Application(ApplicationError::ServiceInstallation { stage, .. }) => Some(*stage),
            _ => None,
        }
    }

    /// The template this error is about, when there is one.
    pub fn template(&self) -> Option<&str> {
        match self {
            Self::Domain(DomainError::InvalidTemplate { name, .. })
            | Self::Domain(DomainError::UnresolvedPlaceholder { template: name, .. })
            | Self::Application(ApplicationError::TemplateLoad { name, .. }) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "This appears to be a bug in the provisioner".into(),
                "Please report it with the output of -vv".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Environment => ErrorCategory::Environment,
                crate::domain::ErrorCategory::Template => ErrorCategory::Template,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Environment,
    Template,
    Installation,
    Internal,
}

/// Convenient result type alias.
pub type HomelabResult<T> = Result<T, HomelabError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> HomelabResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> HomelabResult<T> {
        self.map_err(|e| HomelabError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}
