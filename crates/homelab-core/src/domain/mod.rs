// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for the homelab provisioner.
//!
//! This module contains pure logic with no I/O. Filesystem writes, template
//! loading and container commands are reached through ports defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or process calls
//! - **Immutable config**: `HomelabConfig` has no setters
//! - **Data-driven services**: per-product behaviour lives in the catalog
//!
pub mod catalog;
pub mod config;
pub mod entities;
pub mod error;
pub mod value_objects;

pub use catalog::{
    COMPOSE_FILE, ConfigFileDef, SERVICE_CATALOG, ServiceDef, container_name, core_services,
    find_service, optional_services,
};
pub use config::{Credentials, HomelabConfig, HomelabConfigBuilder};
pub use entities::{ServiceDescriptor, Template, TemplateContext, VariableType, placeholders};
pub use error::{DomainError, ErrorCategory};
pub use value_objects::{Credential, Distribution, ServiceType};
