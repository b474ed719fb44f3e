//! Verification handlers: views over an operation's request ledger.

use crate::error::MockError;
use crate::http_api::types::{
    build_headers_xml, build_list_xml, error_to_response, parse_query_string, xml_response,
};
use crate::operation::Operation;
use crate::registry::{Service, ServiceType};
use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;

/// GET .../recorded-requests[?requestElement=name]
pub fn handle_recorded_requests(operation: &Operation, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_string(query);
    let element = params.get("requestElement").map(String::as_str);
    xml_response(build_list_xml(
        &operation.recorder().bodies(),
        "recorded-requests",
        element,
        false,
    ))
}

/// GET .../recorded-request-headers
pub fn handle_recorded_headers(operation: &Operation) -> Response<Full<Bytes>> {
    xml_response(build_headers_xml(&operation.recorder().headers()))
}

/// GET .../recorded-request-params
pub fn handle_recorded_params(operation: &Operation) -> Response<Full<Bytes>> {
    xml_response(build_list_xml(
        &operation.recorder().url_params(),
        "recorded-request-params",
        Some("recorded-request-param"),
        true,
    ))
}

/// GET .../recorded-resource-ids (REST services with resource paths disabled)
pub fn handle_recorded_resource_ids(service: &Service, operation: &Operation) -> Response<Full<Bytes>> {
    if service.service_type() != ServiceType::Rest || service.resource_paths_enabled() {
        return unavailable("recorded-resource-ids", service);
    }
    xml_response(build_list_xml(
        &operation.recorder().resource_paths(),
        "recorded-resource-ids",
        Some("recorded-resource-id"),
        false,
    ))
}

/// GET .../recorded-resource-paths (REST services with resource paths enabled)
pub fn handle_recorded_resource_paths(
    service: &Service,
    operation: &Operation,
) -> Response<Full<Bytes>> {
    if service.service_type() != ServiceType::Rest || !service.resource_paths_enabled() {
        return unavailable("recorded-resource-paths", service);
    }
    xml_response(build_list_xml(
        &operation.recorder().resource_paths(),
        "recorded-resource-paths",
        Some("recorded-resource-path"),
        false,
    ))
}

fn unavailable(view: &str, service: &Service) -> Response<Full<Bytes>> {
    let err = MockError::NotFound(format!("{view} not available for {}", service.name()));
    error_to_response(&err, false)
}
