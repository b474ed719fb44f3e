//! RequestDispatcher - routes mock endpoint calls to operations.
//!
//! Dispatch order: resolve service, check the resource path, identify the
//! operation, record the request, then ask the operation for its response.

use crate::error::MockError;
use crate::identify::identify;
use crate::operation::{MockResponse, RecordedRequest};
use crate::registry::{ServiceRegistry, ServiceType};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Transport-independent view of a mock endpoint call
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: String,
    pub body: String,
    pub headers: BTreeMap<String, String>,
    pub query: Option<String>,
    /// Raw (still percent-encoded) path below `/endpoint/`
    pub resource_path: Option<String>,
}

impl InboundRequest {
    pub fn new(method: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_resource_path(mut self, resource_path: impl Into<String>) -> Self {
        self.resource_path = Some(resource_path.into());
        self
    }

    fn decoded_resource_path(&self) -> Option<String> {
        self.resource_path.as_deref().map(|raw| {
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
    }
}

/// Dispatches mock endpoint calls against a shared registry
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    registry: Arc<ServiceRegistry>,
}

impl RequestDispatcher {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn dispatch(
        &self,
        service_name: &str,
        request: InboundRequest,
    ) -> Result<MockResponse, MockError> {
        let service = self.registry.resolve(service_name)?;

        if service.service_type() == ServiceType::Rest {
            if let Some(raw) = request.resource_path.as_deref() {
                service.validate_resource_path(raw).inspect_err(|_| {
                    warn!(service = service_name, path = raw, "Resource path rejected");
                })?;
            }
        }

        let identified = identify(service.service_type(), &request.method, &request.body)
            .inspect_err(|e| {
                warn!(service = service_name, error = %e, "Could not identify operation");
            })?;
        let operation = service.operation(&identified.operation_key)?;

        let resource_path = request.decoded_resource_path();
        let recorded = RecordedRequest::new(request.body)
            .with_headers(request.headers)
            .with_query(request.query)
            .with_resource_path(resource_path);
        let invocation = operation.record_invocation(recorded);
        debug!(
            service = service_name,
            operation = operation.name(),
            invocation,
            "Request recorded"
        );

        operation
            .next_response(invocation, identified.soap_message.as_ref())
            .inspect_err(|e| {
                warn!(
                    service = service_name,
                    operation = operation.name(),
                    error = %e,
                    "Request rejected"
                );
            })
    }
}
