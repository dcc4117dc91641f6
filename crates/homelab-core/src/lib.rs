//! Homelab Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the homelab
//! provisioner: a catalog of self-hosted services, a placeholder template
//! engine, per-service installation, and rollback of a failed run.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           homelab-cli (CLI)             │
//! │   (config, signals, rendering output)   │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (Provisioner, ServiceRegistry,         │
//! │   TemplateEngine, RecoveryManager)      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (CommandRunner, TemplateLoader,         │
//! │  ConfigWriter, PlatformProbe)           │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    homelab-adapters (Infrastructure)    │
//! │ (ProcessRunner, LocalFilesystem, etc)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use homelab_core::prelude::*;
//!
//! let config = HomelabConfig::builder()
//!     .ip("192.168.1.10")
//!     .domain("home.lan")
//!     .service(ServiceType::Redis)
//!     .build();
//!
//! // Ports are supplied by homelab-adapters.
//! let provisioner = Provisioner::new(runner, loader, writer, probe);
//! let mut run = RunContext::new();
//! let outcome = provisioner.run(&config, &mut run)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CancellationFlag, ErrorHandler, InstallPlan, Provisioner, RecoveryManager, RollbackAction,
        RunContext, RunOutcome, ServiceRegistry, TemplateEngine,
        ports::{CommandRunner, ConfigWriter, PlatformProbe, TemplateLoader},
    };
    pub use crate::domain::{
        Distribution, HomelabConfig, HomelabConfigBuilder, ServiceDescriptor, ServiceType,
        Template, TemplateContext,
    };
    pub use crate::error::{ErrorKind, HomelabError, HomelabResult};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
