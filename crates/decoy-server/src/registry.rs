//! ServiceRegistry - the fixed set of mocked services built at startup.
//!
//! Services and their operations are created once from configuration and
//! never added or removed while the server runs; only operation state
//! (custom responses, counters, ledgers) changes.

use crate::config::{Config, ServiceConfig};
use crate::error::MockError;
use crate::identify::{is_multi_segment, NamespaceRules};
use crate::operation::Operation;
use anyhow::Context;
use std::collections::BTreeMap;
use tracing::info;

pub use crate::config::ServiceType;

/// A mocked service and its operations
#[derive(Debug)]
pub struct Service {
    name: String,
    service_type: ServiceType,
    resource_paths_enabled: bool,
    operations: BTreeMap<String, Operation>,
}

impl Service {
    pub fn new(name: impl Into<String>, service_type: ServiceType) -> Self {
        Self {
            name: name.into(),
            service_type,
            resource_paths_enabled: false,
            operations: BTreeMap::new(),
        }
    }

    pub fn with_resource_paths(mut self, enabled: bool) -> Self {
        self.resource_paths_enabled = enabled;
        self
    }

    /// Register an operation under its name. Replaces an operation with the same name.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations
            .insert(operation.name().to_string(), operation);
        self
    }

    fn from_config(config: &ServiceConfig, base_dir: &std::path::Path) -> Result<Self, anyhow::Error> {
        let mut service = Service::new(&config.name, config.service_type)
            .with_resource_paths(config.resource_paths_enabled());
        for operation_config in &config.operations {
            let defaults = operation_config
                .load_default_response(base_dir)
                .with_context(|| {
                    format!(
                        "Failed to load default response for {}/{}",
                        config.name, operation_config.name
                    )
                })?;
            let namespaces = operation_config
                .namespaces
                .as_deref()
                .map(NamespaceRules::parse)
                .unwrap_or_default();
            service = service.with_operation(
                Operation::new(&operation_config.name, defaults).with_namespaces(namespaces),
            );
        }
        Ok(service)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn resource_paths_enabled(&self) -> bool {
        self.resource_paths_enabled
    }

    pub fn operation(&self, key: &str) -> Result<&Operation, MockError> {
        self.operations
            .get(key)
            .ok_or_else(|| MockError::operation_not_found(&self.name, key))
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Reject multi-segment resource paths unless the service enables them.
    /// A single id segment is always accepted.
    pub fn validate_resource_path(&self, raw: &str) -> Result<(), MockError> {
        if !self.resource_paths_enabled && is_multi_segment(raw) {
            return Err(MockError::NotFound(format!(
                "Resource path '{raw}' not supported: resource paths are disabled for service {}",
                self.name
            )));
        }
        Ok(())
    }
}

/// All mocked services by name
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Service>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.services.insert(service.name.clone(), service);
        self
    }

    /// Build the registry, loading every default response file
    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        let mut registry = Self::new();
        for service_config in &config.services {
            let service = Service::from_config(service_config, &config.base_dir)?;
            info!(
                service = %service.name,
                service_type = %service.service_type,
                operations = service.operations.len(),
                "Service registered"
            );
            registry = registry.with_service(service);
        }
        Ok(registry)
    }

    pub fn resolve(&self, name: &str) -> Result<&Service, MockError> {
        self.services
            .get(name)
            .ok_or_else(|| MockError::service_not_found(name))
    }

    pub fn resolve_operation(&self, service: &str, key: &str) -> Result<&Operation, MockError> {
        self.resolve(service)?.operation(key)
    }

    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
