//! Directory handlers: service listing, operation detail, health.

use crate::http_api::types::*;
use crate::operation::Operation;
use crate::registry::{Service, ServiceRegistry, ServiceType};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// GET /health - Health check
pub fn handle_health() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({"status": "ok"}))
}

/// GET /services - List services and their operations
pub fn handle_list(registry: &ServiceRegistry, base_url: &str) -> Response<Full<Bytes>> {
    let services = registry
        .services()
        .map(|service| {
            let service_type = service.service_type().as_str();
            ServiceSummary {
                name: service.name().to_string(),
                service_type: service_type.to_string(),
                enable_resource_paths: service.resource_paths_enabled(),
                endpoint: make_endpoint_link(base_url, service_type, service.name()),
                operations: service
                    .operations()
                    .map(|operation| OperationSummary {
                        name: operation.name().to_string(),
                        links: links_for(base_url, service, operation),
                    })
                    .collect(),
            }
        })
        .collect();
    json_response(StatusCode::OK, &ListServicesResponse { services })
}

/// GET /services/:type/:service/operations/:op - Operation state
pub fn handle_operation(
    service: &Service,
    operation: &Operation,
    base_url: &str,
) -> Response<Full<Bytes>> {
    let defaults = operation.defaults();
    let detail = OperationDetail {
        service: service.name().to_string(),
        service_type: service.service_type().as_str().to_string(),
        name: operation.name().to_string(),
        invocation_count: operation.invocation_count(),
        number_of_requests: operation.recorder().len(),
        custom_responses: operation.custom_response_count(),
        default_response_code: defaults.status_code,
        default_response_content_type: defaults.content_type,
        namespaces: operation.namespaces().allowed().to_vec(),
        links: links_for(base_url, service, operation),
    };
    json_response(StatusCode::OK, &detail)
}

fn links_for(base_url: &str, service: &Service, operation: &Operation) -> OperationLinks {
    let resource_paths = match service.service_type() {
        ServiceType::Rest => Some(service.resource_paths_enabled()),
        ServiceType::Soap => None,
    };
    make_operation_links(
        base_url,
        service.service_type().as_str(),
        service.name(),
        operation.name(),
        resource_paths,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::DefaultResponse;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_services() {
        let registry = ServiceRegistry::new().with_service(
            Service::new("dummy-rest", ServiceType::Rest)
                .with_operation(Operation::new("GET", DefaultResponse::default())),
        );
        let json = body_json(handle_list(&registry, "http://localhost:8080")).await;
        let service = &json["services"][0];
        assert_eq!(service["name"], "dummy-rest");
        assert_eq!(service["type"], "REST");
        assert_eq!(service["enableResourcePaths"], false);
        assert_eq!(
            service["endpoint"]["href"],
            "http://localhost:8080/services/REST/dummy-rest/endpoint"
        );
        assert_eq!(
            service["operations"][0]["_links"]["recordedResourceIds"]["href"],
            "http://localhost:8080/services/REST/dummy-rest/operations/GET/recorded-resource-ids"
        );
    }

    #[tokio::test]
    async fn test_operation_detail() {
        let service = Service::new("hello-soap", ServiceType::Soap);
        let operation = Operation::new("sayHello", DefaultResponse::default());
        operation.next_invocation_number();
        let json = body_json(handle_operation(&service, &operation, "http://h")).await;
        assert_eq!(json["invocationCount"], 1);
        assert_eq!(json["numberOfRequests"], 0);
        assert_eq!(json["defaultResponseCode"], 200);
        assert!(json["_links"].get("recordedResourceIds").is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let json = body_json(handle_health()).await;
        assert_eq!(json["status"], "ok");
    }
}
