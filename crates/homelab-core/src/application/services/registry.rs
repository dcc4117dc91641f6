//! Service Registry - descriptor factory, validation and ordering.
//!
//! The registry owns one [`ServiceDescriptor`] per [`ServiceType`] for the
//! lifetime of its cache. Callers get shared references; two requests for
//! the same type return the same `Arc`.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, RwLock};

use tracing::{debug, instrument, warn};

use crate::{
    application::{ApplicationError, InstallStage},
    domain::{
        DomainError, HomelabConfig, ServiceDescriptor, ServiceType, catalog, find_service,
    },
    error::{HomelabError, HomelabResult},
};

/// Memoising factory for service descriptors.
#[derive(Default)]
pub struct ServiceRegistry {
    cache: RwLock<HashMap<ServiceType, Arc<ServiceDescriptor>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached descriptor for `service_type`, creating it on first
    /// request.
    pub fn create_service(
        &self,
        service_type: ServiceType,
        config: &Arc<HomelabConfig>,
    ) -> HomelabResult<Arc<ServiceDescriptor>> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| ApplicationError::StoreLockError)?;
            if let Some(descriptor) = cache.get(&service_type) {
                return Ok(Arc::clone(descriptor));
            }
        }

        let def = find_service(service_type)
            .ok_or_else(|| DomainError::UnknownService(service_type.to_string()))?;

        let mut cache = self
            .cache
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let descriptor = cache.entry(service_type).or_insert_with(|| {
            debug!(service = %service_type, "Creating service descriptor");
            Arc::new(ServiceDescriptor::new(def, Arc::clone(config)))
        });
        Ok(Arc::clone(descriptor))
    }

    /// Parse a service name and create its descriptor.
    pub fn create_service_by_name(
        &self,
        name: &str,
        config: &Arc<HomelabConfig>,
    ) -> HomelabResult<Arc<ServiceDescriptor>> {
        let service_type: ServiceType = name.parse()?;
        self.create_service(service_type, config)
    }

    /// Every core service plus every selected service, core first.
    ///
    /// Declared dependencies are not added; a missing dependency is caught
    /// by the dependency check at install time.
    #[instrument(skip_all)]
    pub fn create_services(
        &self,
        config: &Arc<HomelabConfig>,
    ) -> HomelabResult<Vec<Arc<ServiceDescriptor>>> {
        let mut types = catalog::core_services();
        for selected in config.selected_services() {
            if !types.contains(selected) {
                types.push(*selected);
            }
        }

        types
            .into_iter()
            .map(|ty| self.create_service(ty, config))
            .collect()
    }

    /// Check a configuration before anything touches the host.
    #[instrument(skip_all)]
    pub fn validate_configuration(&self, config: &HomelabConfig) -> HomelabResult<()> {
        if config.ip().parse::<IpAddr>().is_err() {
            return Err(DomainError::InvalidConfiguration {
                field: "ip",
                reason: format!("'{}' is not an IP address", config.ip()),
            }
            .into());
        }
        if config.domain().trim().is_empty() {
            return Err(DomainError::InvalidConfiguration {
                field: "domain",
                reason: "must not be empty".into(),
            }
            .into());
        }
        if config.network().trim().is_empty() {
            return Err(DomainError::InvalidConfiguration {
                field: "network",
                reason: "must not be empty".into(),
            }
            .into());
        }

        for &service_type in config.selected_services() {
            let def = find_service(service_type)
                .ok_or_else(|| DomainError::UnknownService(service_type.to_string()))?;

            if let Some(missing) = def
                .credentials
                .iter()
                .find(|c| !config.credentials().is_present(**c))
            {
                return Err(HomelabError::installation(
                    service_type,
                    InstallStage::Validation,
                    format!("required credential '{missing}' is missing or empty"),
                ));
            }
        }

        debug!("Configuration valid");
        Ok(())
    }

    /// Core services first, then optional ones; each group keeps its input
    /// order.
    ///
    /// Dependencies are not used for ordering. A dependency placed after its
    /// dependent is reported, not moved.
    pub fn installation_order(
        &self,
        services: &[Arc<ServiceDescriptor>],
    ) -> Vec<Arc<ServiceDescriptor>> {
        let (core, optional): (Vec<_>, Vec<_>) =
            services.iter().cloned().partition(|s| s.is_core());
        let ordered: Vec<_> = core.into_iter().chain(optional).collect();

        for (position, service) in ordered.iter().enumerate() {
            for dependency in service.dependencies() {
                let later = ordered[position + 1..]
                    .iter()
                    .any(|s| s.service_type() == *dependency);
                if later {
                    warn!(
                        service = %service.service_type(),
                        dependency = %dependency,
                        "Dependency is ordered after the service that needs it"
                    );
                }
            }
        }

        ordered
    }

    pub fn core_services(&self) -> Vec<ServiceType> {
        catalog::core_services()
    }

    pub fn optional_services(&self) -> Vec<ServiceType> {
        catalog::optional_services()
    }

    /// Drop every cached descriptor; later requests build fresh ones.
    pub fn clear_cache(&self) -> HomelabResult<()> {
        self.cache
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .clear();
        Ok(())
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}
