//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "install the selected services" or
//! "render a named template".

pub mod error_handler;
pub mod lifecycle;
pub mod orchestrator;
pub mod recovery;
pub mod registry;
pub mod template_engine;

pub use error_handler::{ErrorHandler, ErrorReport, ShutdownReason, ShutdownReport};
pub use lifecycle::{InstalledService, LifecycleState, ServiceInstaller, ServiceLifecycle};
pub use orchestrator::{
    CancellationFlag, InstallPlan, InstallSummary, Provisioner, RunContext, RunOutcome,
};
pub use recovery::{RecoveryManager, RollbackAction, RollbackReport};
pub use registry::ServiceRegistry;
pub use template_engine::TemplateEngine;
