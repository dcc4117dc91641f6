//! Application layer for the homelab provisioner.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (Provisioner, ServiceRegistry,
//!   TemplateEngine, RecoveryManager, ErrorHandler)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! Per-service rules (ports, dependencies, credentials) live in
//! `crate::domain`; this layer drives them through the ports.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    CancellationFlag, ErrorHandler, ErrorReport, InstallPlan, InstallSummary, InstalledService,
    LifecycleState, Provisioner, RecoveryManager, RollbackAction, RollbackReport, RunContext,
    RunOutcome, ServiceInstaller, ServiceLifecycle, ServiceRegistry, ShutdownReason,
    ShutdownReport, TemplateEngine,
};

pub use ports::{CommandRunner, ConfigWriter, PlatformProbe, TemplateLoader};

pub use error::{ApplicationError, InstallStage};
