//! Error Handler - classification, logging and the shutdown path.
//!
//! [`ErrorHandler::handle_error`] only describes an error.
//! [`ErrorHandler::graceful_shutdown`] is the one place that unwinds a run,
//! for failures and cancellation alike.

use tracing::{error, info, warn};

use crate::{
    application::{InstallStage, services::recovery::{RecoveryManager, RollbackReport}},
    domain::ServiceType,
    error::{ErrorCategory, ErrorKind, HomelabError},
};

/// Everything a front end needs to present one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub category: ErrorCategory,
    pub message: String,
    pub service: Option<ServiceType>,
    pub stage: Option<InstallStage>,
    pub template: Option<String>,
    pub suggestions: Vec<String>,
}

/// Why a run is being shut down.
#[derive(Debug, Clone, Copy)]
pub enum ShutdownReason<'a> {
    Failure(&'a HomelabError),
    Cancelled,
}

/// Result of [`ErrorHandler::graceful_shutdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Present when the shutdown was caused by an error.
    pub error: Option<ErrorReport>,
    /// Present when pending actions were rolled back.
    pub rollback: Option<RollbackReport>,
}

impl ShutdownReport {
    pub fn was_cancelled(&self) -> bool {
        self.error.is_none()
    }
}

/// Stateless classifier and shutdown driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn new() -> Self {
        Self
    }

    /// Classify and log `err`. Touches no state.
    pub fn handle_error(&self, err: &HomelabError) -> ErrorReport {
        let report = ErrorReport {
            kind: err.kind(),
            category: err.category(),
            message: err.to_string(),
            service: err.service(),
            stage: err.stage(),
            template: err.template().map(str::to_string),
            suggestions: err.suggestions(),
        };

        let service = report.service.map(|s| s.to_string()).unwrap_or_default();
        let stage = report.stage.map(|s| s.as_str()).unwrap_or_default();

        if report.kind.is_preflight() {
            warn!(kind = %report.kind, "{}", report.message);
        } else {
            error!(
                kind = %report.kind,
                service = %service,
                stage = %stage,
                "{}",
                report.message
            );
        }

        report
    }

    /// Unwind the run if anything is pending.
    pub fn graceful_shutdown(
        &self,
        reason: ShutdownReason<'_>,
        recovery: &mut RecoveryManager,
    ) -> ShutdownReport {
        let error = match reason {
            ShutdownReason::Failure(err) => Some(self.handle_error(err)),
            ShutdownReason::Cancelled => {
                info!("Run cancelled by user");
                None
            }
        };

        let rollback = if recovery.has_pending() {
            Some(recovery.execute_rollback())
        } else {
            info!("Nothing to roll back");
            None
        };

        ShutdownReport { error, rollback }
    }
}
