//! Per-run service descriptor.
//!
//! A [`ServiceDescriptor`] pairs a static catalog entry with the run's
//! configuration and the secrets generated for it. The registry creates one
//! per [`ServiceType`] and hands out shared references to it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::catalog::{COMPOSE_FILE, ServiceDef};
use crate::domain::config::HomelabConfig;
use crate::domain::entities::template::TemplateContext;
use crate::domain::error::DomainError;
use crate::domain::value_objects::{Credential, ServiceType};

/// In-memory representation of one service for a given run.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    def: &'static ServiceDef,
    config: Arc<HomelabConfig>,
    secrets: BTreeMap<String, String>,
}

impl ServiceDescriptor {
    /// Create a descriptor, generating the service's secrets.
    pub fn new(def: &'static ServiceDef, config: Arc<HomelabConfig>) -> Self {
        let secrets = def
            .secrets
            .iter()
            .map(|name| (name.to_string(), Uuid::new_v4().simple().to_string()))
            .collect();

        Self {
            def,
            config,
            secrets,
        }
    }

    pub fn def(&self) -> &'static ServiceDef {
        self.def
    }

    pub fn name(&self) -> &'static str {
        self.def.name()
    }

    pub fn display_name(&self) -> &'static str {
        self.def.display_name
    }

    pub fn service_type(&self) -> ServiceType {
        self.def.service_type
    }

    pub fn is_core(&self) -> bool {
        self.def.is_core
    }

    pub fn dependencies(&self) -> &'static [ServiceType] {
        self.def.dependencies
    }

    pub fn config(&self) -> &HomelabConfig {
        &self.config
    }

    pub fn container_name(&self) -> String {
        self.def.container_name()
    }

    /// `<install_root>/<service>`.
    pub fn install_dir(&self) -> PathBuf {
        self.config.install_root().join(self.name())
    }

    pub fn compose_path(&self) -> PathBuf {
        self.install_dir().join(COMPOSE_FILE)
    }

    /// Credentials this service needs but the config does not provide.
    pub fn missing_credentials(&self) -> Vec<Credential> {
        self.def
            .credentials
            .iter()
            .copied()
            .filter(|c| !self.config.credentials().is_present(*c))
            .collect()
    }

    /// Where users reach the service. Computable before installation.
    pub fn access_url(&self) -> String {
        (self.def.access_url)(self.def, &self.config)
    }

    /// Variables handed to the template engine for this service.
    ///
    /// Credentials default to `""` when absent; services that require one
    /// fail here instead of rendering an unusable file.
    pub fn template_context(&self) -> Result<TemplateContext, DomainError> {
        let config = &self.config;
        let mut ctx = TemplateContext::new()
            .with("ip", config.ip())
            .with("domain", config.domain())
            .with("network", config.network())
            .with("service_name", self.name())
            .with("container_name", self.container_name())
            .with("image", self.def.image)
            .with("port", self.def.port)
            .with(
                "install_dir",
                self.install_dir().to_string_lossy().into_owned(),
            )
            .with("access_url", self.access_url());

        for credential in [Credential::PostgresPassword, Credential::MinioRootPassword] {
            ctx.insert(
                credential.as_str(),
                config.credentials().get(credential).unwrap_or_default(),
            );
        }

        for (name, value) in &self.secrets {
            ctx.insert(name.clone(), value.clone());
        }

        (self.def.extend_context)(config, &mut ctx)?;
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::find_service;
    use std::path::Path;

    fn descriptor(ty: ServiceType, config: HomelabConfig) -> ServiceDescriptor {
        ServiceDescriptor::new(find_service(ty).unwrap(), Arc::new(config))
    }

    fn base() -> crate::domain::config::HomelabConfigBuilder {
        HomelabConfig::builder()
            .ip("192.168.1.5")
            .domain("home.lan")
            .install_root("/srv/homelab")
    }

    #[test]
    fn context_defaults_absent_credentials_to_empty() {
        let d = descriptor(ServiceType::Redis, base().build());
        let ctx = d.template_context().unwrap();

        assert_eq!(ctx.get("postgres_password").unwrap(), "");
        assert_eq!(ctx.get("minio_root_password").unwrap(), "");
        assert_eq!(ctx.get("container_name").unwrap(), "homelab-redis");
        assert_eq!(ctx.get("port").unwrap(), 6379);
        assert_eq!(ctx.get("network").unwrap(), "homelab");
    }

    #[test]
    fn secrets_are_generated_once_per_descriptor() {
        let d = descriptor(ServiceType::Outline, base().postgres_password("pw").build());
        let first = d.template_context().unwrap();
        let second = d.template_context().unwrap();

        let key = first.get("secret_key").unwrap().as_str().unwrap().to_string();
        assert_eq!(key.len(), 32);
        assert_eq!(first, second);
        assert_ne!(first.get("secret_key"), first.get("utils_secret"));
    }

    #[test]
    fn context_fails_without_required_credential() {
        let d = descriptor(ServiceType::Postgresql, base().postgres_password("").build());

        assert!(matches!(
            d.template_context(),
            Err(DomainError::MissingCredential { .. })
        ));
        assert_eq!(d.missing_credentials(), vec![Credential::PostgresPassword]);
    }

    #[test]
    fn paths_live_under_install_root() {
        let d = descriptor(ServiceType::N8n, base().build());

        assert_eq!(d.install_dir(), Path::new("/srv/homelab/n8n"));
        assert_eq!(
            d.compose_path(),
            Path::new("/srv/homelab/n8n/docker-compose.yml")
        );
        assert_eq!(d.access_url(), "https://n8n.home.lan");
    }
}
