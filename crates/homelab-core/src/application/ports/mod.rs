//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `homelab-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `CommandRunner`: External commands (container runtime)
//!   - `TemplateLoader`: Raw template retrieval
//!   - `ConfigWriter`: Generated file writes
//!   - `PlatformProbe`: Host distribution detection
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by `Provisioner`)

pub mod output;

pub use output::{
    CommandOutput, CommandRunner, CommandSpec, ConfigWriter, LoadError, PlatformProbe,
    TemplateLoader,
};

#[cfg(test)]
pub use output::{MockCommandRunner, MockConfigWriter, MockPlatformProbe, MockTemplateLoader};
