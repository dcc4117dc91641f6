//! Per-run homelab configuration.
//!
//! [`HomelabConfig`] is created once per run by the caller and then only
//! read. There are no setters; every field is reached through an accessor.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Credential, ServiceType};

/// Default logical container network.
pub const DEFAULT_NETWORK: &str = "homelab";

/// Default root for generated configuration files.
pub const DEFAULT_INSTALL_ROOT: &str = "/opt/homelab";

/// Operator-supplied secrets. Absent and empty are treated the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub postgres_password: Option<String>,
    pub minio_root_password: Option<String>,
}

impl Credentials {
    /// The raw credential value, if one was supplied.
    pub fn get(&self, credential: Credential) -> Option<&str> {
        match credential {
            Credential::PostgresPassword => self.postgres_password.as_deref(),
            Credential::MinioRootPassword => self.minio_root_password.as_deref(),
        }
    }

    /// `true` when the credential is present and non-empty.
    pub fn is_present(&self, credential: Credential) -> bool {
        self.get(credential).is_some_and(|v| !v.is_empty())
    }
}

/// Immutable description of what to install and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomelabConfig {
    ip: String,
    domain: String,
    network: String,
    selected_services: Vec<ServiceType>,
    #[serde(skip_serializing)]
    credentials: Credentials,
    install_root: PathBuf,
}

impl HomelabConfig {
    pub fn builder() -> HomelabConfigBuilder {
        HomelabConfigBuilder::default()
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// Selected services in the order the operator listed them.
    pub fn selected_services(&self) -> &[ServiceType] {
        &self.selected_services
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }
}

/// Builder for [`HomelabConfig`].
///
/// Building never fails: shape checks belong to
/// `ServiceRegistry::validate_configuration`, which reports them as
/// configuration errors before any side effect.
#[derive(Debug, Clone, Default)]
pub struct HomelabConfigBuilder {
    ip: String,
    domain: String,
    network: Option<String>,
    selected_services: Vec<ServiceType>,
    credentials: Credentials,
    install_root: Option<PathBuf>,
}

impl HomelabConfigBuilder {
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn service(mut self, service: ServiceType) -> Self {
        self.selected_services.push(service);
        self
    }

    pub fn services(mut self, services: impl IntoIterator<Item = ServiceType>) -> Self {
        self.selected_services.extend(services);
        self
    }

    pub fn postgres_password(mut self, password: impl Into<String>) -> Self {
        self.credentials.postgres_password = Some(password.into());
        self
    }

    pub fn minio_root_password(mut self, password: impl Into<String>) -> Self {
        self.credentials.minio_root_password = Some(password.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = Some(root.into());
        self
    }

    /// Finish the config. Repeated services keep their first position.
    pub fn build(self) -> HomelabConfig {
        let mut selected = Vec::with_capacity(self.selected_services.len());
        for service in self.selected_services {
            if !selected.contains(&service) {
                selected.push(service);
            }
        }

        HomelabConfig {
            ip: self.ip,
            domain: self.domain,
            network: self.network.unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
            selected_services: selected,
            credentials: self.credentials,
            install_root: self
                .install_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_ROOT)),
        }
    }
}
