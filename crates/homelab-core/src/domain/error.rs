// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (carried into reports after rollback)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("invalid configuration field '{field}': {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("service '{service}' requires credential '{credential}' but it is missing or empty")]
    MissingCredential {
        service: String,
        credential: &'static str,
    },

    // ========================================================================
    // Environment Errors
    // ========================================================================
    #[error("distribution '{0}' is not supported")]
    UnsupportedDistribution(String),

    // ========================================================================
    // Template Errors
    // ========================================================================
    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("template '{template}' references unresolved placeholder '{placeholder}'")]
    UnresolvedPlaceholder {
        template: String,
        placeholder: String,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidConfiguration { field, reason } => vec![
                format!("Fix the '{}' setting: {}", field, reason),
                "Check the [homelab] section of your config file".into(),
            ],
            Self::UnknownService(name) => vec![
                format!("'{}' is not a known service", name),
                "Try: homelab services to see what can be installed".into(),
            ],
            Self::MissingCredential { credential, .. } => vec![
                format!("Set '{}' in the [credentials] section", credential),
                format!(
                    "Or export HOMELAB_CREDENTIALS__{}",
                    credential.to_ascii_uppercase()
                ),
            ],
            Self::UnsupportedDistribution(id) => vec![
                format!("Detected distribution: {}", id),
                "Supported: ubuntu, debian, fedora, arch, macos".into(),
            ],
            Self::UnresolvedPlaceholder { placeholder, .. } => vec![
                format!("Provide a value for '{{{{{}}}}}'", placeholder),
                "Or remove the placeholder from the template".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration { .. } | Self::MissingCredential { .. } => {
                ErrorCategory::Validation
            }
            Self::UnknownService(_) => ErrorCategory::NotFound,
            Self::UnsupportedDistribution(_) => ErrorCategory::Environment,
            Self::InvalidTemplate { .. } | Self::UnresolvedPlaceholder { .. } => {
                ErrorCategory::Template
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Environment,
    Template,
}
