//! Infrastructure adapters for the homelab provisioner.
//!
//! This crate implements the ports defined in `homelab-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_templates;
pub mod filesystem;
pub mod platform;
pub mod runner;
pub mod template_loader;

// Re-export commonly used adapters
pub use builtin_templates::BuiltinTemplateLoader;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use platform::{OsReleaseProbe, StaticProbe};
pub use runner::{ProcessRunner, RecordingRunner};
pub use template_loader::{FilesystemTemplateLoader, LayeredTemplateLoader};
