//! Recovery Manager - ordered, best-effort unwinding of completed steps.
//!
//! Every reversible side effect (network created, file written, containers
//! started) registers a [`RollbackAction`] the moment it succeeds. On
//! failure or cancellation the actions run newest first.

use std::fmt;

use tracing::{info, warn};

use crate::error::HomelabResult;

type Reversal = Box<dyn FnOnce() -> HomelabResult<()> + Send>;

/// A description plus the operation that reverses one completed step.
pub struct RollbackAction {
    description: String,
    reversal: Reversal,
}

impl RollbackAction {
    pub fn new<F>(description: impl Into<String>, reversal: F) -> Self
    where
        F: FnOnce() -> HomelabResult<()> + Send + 'static,
    {
        Self {
            description: description.into(),
            reversal: Box::new(reversal),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for RollbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollbackAction")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// What a rollback pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Descriptions of actions that reversed cleanly, in execution order.
    pub succeeded: Vec<String>,
    /// `(description, error)` for actions that failed.
    pub failed: Vec<(String, String)>,
}

impl RollbackReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Ordered list of pending rollback actions for one run.
#[derive(Debug, Default)]
pub struct RecoveryManager {
    actions: Vec<RollbackAction>,
}

impl RecoveryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action. Registration order is preserved.
    pub fn register_action(&mut self, action: RollbackAction) {
        info!(action = %action.description, "Registered rollback action");
        self.actions.push(action);
    }

    pub fn pending(&self) -> usize {
        self.actions.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Pending action descriptions in registration order.
    pub fn descriptions(&self) -> Vec<&str> {
        self.actions.iter().map(RollbackAction::description).collect()
    }

    /// Run every action in reverse registration order, then clear the list.
    ///
    /// A failing action is logged and recorded; the remaining actions still
    /// run.
    pub fn execute_rollback(&mut self) -> RollbackReport {
        let mut report = RollbackReport::default();
        if self.actions.is_empty() {
            return report;
        }

        info!(actions = self.actions.len(), "Starting rollback");
        for action in self.actions.drain(..).rev() {
            let RollbackAction {
                description,
                reversal,
            } = action;

            match reversal() {
                Ok(()) => {
                    info!(action = %description, "Rolled back");
                    report.succeeded.push(description);
                }
                Err(e) => {
                    warn!(action = %description, error = %e, "Rollback action failed");
                    report.failed.push((description, e.to_string()));
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Rollback finished"
        );
        report
    }

    /// Forget all actions without running them. Used once a run commits.
    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
